//! Turns closed issues into the "latest changes" section of a changelog.
//!
//! The pipeline is [`route`] per issue, [`classify`] over all issues,
//! [`render`] to markdown and [`merge`] into the existing document.
//! [`ChangelogUpdater`] wires the four steps from a [`ChangelogConfig`].

mod classifier;
mod config;
mod core;
mod error;
mod formatter;
mod merger;
mod position;
mod router;
mod types;
mod utils;

pub use classifier::{Classifier, classify};
pub use config::{
    ChangelogConfig, DEFAULT_LABEL_HEADER_PREFIX, DEFAULT_LATEST_CHANGES_HEADER,
    EmptySectionPolicy, LabelConfig, UnlabeledConfig,
};
pub use crate::core::{ChangelogUpdater, RenderedSection, UpdateOutcome};
pub use error::ChangelogError;
pub use formatter::{
    MarkdownSectionFormatter, SectionFormatter, TemplateSectionFormatter, format_issue_line, render,
};
pub use merger::{ChangelogMerger, MergeReport, OwnedRegion, RegionMerger, merge};
pub use router::{FirstMatchRouter, LabelRouter, route};
pub use types::{CategoryBuckets, Issue, LabelRule, LabelSet, RawIssue, RawLabel, Result};
pub use utils::issue_numbers;
