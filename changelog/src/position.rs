/// A line of a document together with its byte span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSpan<'a> {
    /// Line content without `\n` or `\r\n`
    pub text: &'a str,
    pub start: usize,
    /// Offset just past the line terminator
    pub end: usize,
}

pub fn line_spans(content: &str) -> Vec<LineSpan<'_>> {
    let mut offset = 0;
    content
        .split_inclusive('\n')
        .map(|raw| {
            let text = raw.strip_suffix('\n').unwrap_or(raw);
            let text = text.strip_suffix('\r').unwrap_or(text);
            let span = LineSpan {
                text,
                start: offset,
                end: offset + raw.len(),
            };
            offset += raw.len();
            span
        })
        .collect()
}

/// Index of the first line that is exactly `marker`
pub fn find_marker_position(lines: &[LineSpan<'_>], marker: &str) -> Option<usize> {
    lines.iter().position(|line| line.text == marker)
}

pub fn is_release_heading(line: &str, prefixes: &[String]) -> bool {
    prefixes.iter().any(|prefix| line.starts_with(prefix.as_str()))
}

/// Index of the first release heading after `marker_idx`, or `lines.len()`
pub fn find_next_section_position(
    lines: &[LineSpan<'_>],
    marker_idx: usize,
    prefixes: &[String],
) -> usize {
    lines
        .iter()
        .skip(marker_idx + 1)
        .position(|line| is_release_heading(line.text, prefixes))
        .map_or(lines.len(), |pos| pos + marker_idx + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefixes() -> Vec<String> {
        vec!["## ".to_string(), "### ".to_string()]
    }

    #[test]
    fn spans_cover_the_whole_document() {
        let content = "a\r\nbb\nccc";
        let lines = line_spans(content);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].text, "a");
        assert_eq!((lines[0].start, lines[0].end), (0, 3));
        assert_eq!(lines[1].text, "bb");
        assert_eq!(lines[2].text, "ccc");
        assert_eq!(lines[2].end, content.len());
    }

    #[test]
    fn marker_must_match_the_whole_line() {
        let lines = line_spans("### Latest Changes soon\n### Latest Changes\n");
        assert_eq!(find_marker_position(&lines, "### Latest Changes"), Some(1));
        assert_eq!(find_marker_position(&lines, "### latest changes"), None);
    }

    #[test]
    fn next_section_stops_at_release_heading() {
        let lines = line_spans("### Latest Changes\n\n#### Fixes\n\n- x (#1)\n\n### 0.1.0\n");
        assert_eq!(find_next_section_position(&lines, 0, &prefixes()), 6);
    }

    #[test]
    fn next_section_defaults_to_end_of_document() {
        let lines = line_spans("### Latest Changes\n\n#### Fixes\n- x (#1)\n");
        assert_eq!(find_next_section_position(&lines, 0, &prefixes()), lines.len());
    }
}
