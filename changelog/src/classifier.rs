use crate::router::{FirstMatchRouter, LabelRouter};
use crate::types::{CategoryBuckets, Issue, LabelRule, Result};
use std::collections::HashSet;

/// Groups issues into per-rule buckets using a [`LabelRouter`]
pub struct Classifier<'a> {
    router: &'a dyn LabelRouter,
    fallback: Option<LabelRule>,
}

impl<'a> Classifier<'a> {
    pub fn new(router: &'a dyn LabelRouter) -> Self {
        Self {
            router,
            fallback: None,
        }
    }

    /// Files issues that match no rule under `rule`, appended after the
    /// configured rules. They are still reported as unmatched.
    #[must_use]
    pub fn with_fallback(mut self, rule: LabelRule) -> Self {
        self.fallback = Some(rule);
        self
    }

    /// Classifies `issues` in input order.
    ///
    /// Every issue is validated before anything is grouped, so a malformed
    /// record never yields a partial result. Repeated issue numbers are kept
    /// once, at their first occurrence.
    ///
    /// # Errors
    /// Returns `MalformedIssue` for the first invalid issue
    pub fn classify(&self, issues: &[Issue], rules: &[LabelRule]) -> Result<CategoryBuckets> {
        for issue in issues {
            issue.validate()?;
        }

        let mut all_rules = rules.to_vec();
        let fallback_idx = self.fallback.as_ref().map(|rule| {
            all_rules.push(rule.clone());
            all_rules.len() - 1
        });

        let mut buckets = CategoryBuckets::new(&all_rules);
        let mut seen = HashSet::with_capacity(issues.len());

        for issue in issues {
            if !seen.insert(issue.number) {
                continue;
            }
            match self.router.resolve(&issue.labels, rules) {
                Some(idx) => buckets.push(idx, issue.clone()),
                None => {
                    if let Some(idx) = fallback_idx {
                        buckets.push(idx, issue.clone());
                    }
                    buckets.push_unmatched(issue.clone());
                }
            }
        }

        Ok(buckets)
    }
}

/// Classifies `issues` with first-match-wins routing and no fallback
///
/// # Errors
/// Returns `MalformedIssue` for the first invalid issue
pub fn classify(issues: &[Issue], rules: &[LabelRule]) -> Result<CategoryBuckets> {
    Classifier::new(&FirstMatchRouter).classify(issues, rules)
}
