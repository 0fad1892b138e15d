use crate::types::{LabelRule, LabelSet};

/// Picks the category rule for an issue's labels
pub trait LabelRouter: Send + Sync {
    /// Index of the winning rule in `rules`, or `None` when no rule applies
    fn resolve(&self, labels: &LabelSet, rules: &[LabelRule]) -> Option<usize>;
}

/// Walks the rules in configured order and takes the first one whose label
/// the issue carries
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstMatchRouter;

impl LabelRouter for FirstMatchRouter {
    fn resolve(&self, labels: &LabelSet, rules: &[LabelRule]) -> Option<usize> {
        rules.iter().position(|rule| labels.contains(&rule.label))
    }
}

/// Returns the first rule in `rules` whose label is in `labels`
#[must_use]
pub fn route<'r>(labels: &LabelSet, rules: &'r [LabelRule]) -> Option<&'r LabelRule> {
    FirstMatchRouter
        .resolve(labels, rules)
        .and_then(|idx| rules.get(idx))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> Vec<LabelRule> {
        vec![
            LabelRule::new("feature", "Features", "#### "),
            LabelRule::new("bug", "Fixes", "#### "),
        ]
    }

    #[test]
    fn first_configured_rule_wins() {
        let rules = rules();
        let labels: LabelSet = ["bug", "feature"].into_iter().collect();
        assert_eq!(route(&labels, &rules).map(|r| r.header.as_str()), Some("Features"));

        let reversed: Vec<_> = rules.iter().rev().cloned().collect();
        assert_eq!(route(&labels, &reversed).map(|r| r.header.as_str()), Some("Fixes"));
    }

    #[test]
    fn no_match_returns_none() {
        let rules = rules();
        assert!(route(&LabelSet::new(), &rules).is_none());

        let labels: LabelSet = ["Bug", "question"].into_iter().collect();
        assert!(route(&labels, &rules).is_none());
    }

    #[test]
    fn resolve_reports_rule_index() {
        let labels: LabelSet = ["bug"].into_iter().collect();
        assert_eq!(FirstMatchRouter.resolve(&labels, &rules()), Some(1));
        assert_eq!(FirstMatchRouter.resolve(&labels, &[]), None);
    }
}
