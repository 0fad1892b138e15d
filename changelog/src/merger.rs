use crate::config::ChangelogConfig;
use crate::error::ChangelogError;
use crate::position::{find_marker_position, find_next_section_position, line_spans};
use crate::types::Result;
use crate::utils::issue_numbers;

/// Byte span of the region that follows the marker line.
///
/// `start` is the offset just past the marker line (its terminator included)
/// and `end` is the offset of the next release heading, or the document length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnedRegion {
    pub marker_line: usize,
    pub start: usize,
    pub end: usize,
    pub newline: &'static str,
}

impl OwnedRegion {
    #[must_use]
    pub fn slice<'d>(&self, document: &'d str) -> &'d str {
        &document[self.start..self.end]
    }
}

pub trait ChangelogMerger: Send + Sync {
    /// Locates the region owned by `marker`
    ///
    /// # Errors
    /// Returns `MarkerNotFound` if no line equals `marker`
    fn owned_region(&self, existing: &str, marker: &str) -> Result<OwnedRegion>;

    /// Replaces the owned region of `existing` with `section`
    ///
    /// # Errors
    /// Returns `MarkerNotFound` if no line equals `marker`
    fn merge(&self, existing: &str, marker: &str, section: &str) -> Result<String>;
}

/// Rewrites the span between the marker line and the next release heading.
///
/// Bytes before the owned region and from the next release heading onwards are
/// copied verbatim. The owned region is always replaced as a whole, so merging
/// the same section twice gives the same document.
#[derive(Debug, Clone)]
pub struct RegionMerger {
    release_header_prefixes: Vec<String>,
}

impl Default for RegionMerger {
    fn default() -> Self {
        Self::new(ChangelogConfig::default().release_header_prefixes)
    }
}

impl RegionMerger {
    #[must_use]
    pub const fn new(release_header_prefixes: Vec<String>) -> Self {
        Self {
            release_header_prefixes,
        }
    }

    #[must_use]
    pub fn from_config(config: &ChangelogConfig) -> Self {
        Self::new(config.release_header_prefixes.clone())
    }
}

impl ChangelogMerger for RegionMerger {
    fn owned_region(&self, existing: &str, marker: &str) -> Result<OwnedRegion> {
        let lines = line_spans(existing);
        let marker_idx = find_marker_position(&lines, marker)
            .ok_or_else(|| ChangelogError::marker_not_found(marker))?;

        let marker_line = lines[marker_idx];
        let next_idx =
            find_next_section_position(&lines, marker_idx, &self.release_header_prefixes);
        let end = lines.get(next_idx).map_or(existing.len(), |line| line.start);
        let newline = if existing[marker_line.start..marker_line.end].ends_with("\r\n") {
            "\r\n"
        } else {
            "\n"
        };

        Ok(OwnedRegion {
            marker_line: marker_idx,
            start: marker_line.end,
            end,
            newline,
        })
    }

    fn merge(&self, existing: &str, marker: &str, section: &str) -> Result<String> {
        let region = self.owned_region(existing, marker)?;
        let newline = region.newline;

        let mut merged = String::with_capacity(existing.len() + section.len() + 4);
        merged.push_str(&existing[..region.start]);
        if !merged.ends_with('\n') {
            merged.push_str(newline);
        }
        merged.push_str(newline);

        if !section.is_empty() {
            let normalized = section.replace("\r\n", "\n");
            let mut body = if newline == "\n" {
                normalized
            } else {
                normalized.replace('\n', newline)
            };
            if !body.ends_with('\n') {
                body.push_str(newline);
            }
            merged.push_str(&body);
        }

        merged.push_str(&existing[region.end..]);
        Ok(merged)
    }
}

/// Replaces the region after `marker` with `section`, ending the region at
/// the default release heading prefixes
///
/// # Errors
/// Returns `MarkerNotFound` if no line of `existing` equals `marker`
pub fn merge(existing: &str, marker: &str, section: &str) -> Result<String> {
    RegionMerger::default().merge(existing, marker, section)
}

/// Issue numbers that changed between the previous owned region and the new one
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub added: Vec<u64>,
    pub removed: Vec<u64>,
    pub retained: Vec<u64>,
}

impl MergeReport {
    #[must_use]
    pub fn between(previous: &str, current: &str) -> Self {
        let before = issue_numbers(previous);
        let after = issue_numbers(current);

        Self {
            added: after.difference(&before).copied().collect(),
            removed: before.difference(&after).copied().collect(),
            retained: after.intersection(&before).copied().collect(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}
