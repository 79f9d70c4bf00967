//! Ordered, immutable collection of rules.

use serde::Serialize;
use std::borrow::Cow;
use std::path::Path;

use super::rule::{MatchMode, Rule};

/// Rules sorted by ascending priority; ties keep declaration order.
///
/// Rules compose: each one sees the output of the rule before it. A rule whose
/// output can be matched again (by itself or a later rule) is only idempotent if
/// its author made it so. Nothing here re-runs rules to a fixpoint.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

/// Number of replacements one rule made in one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleHit {
    pub rule: String,
    pub replacements: usize,
}

/// Result of applying a rule set to one piece of content.
#[derive(Debug, Clone)]
pub struct Applied {
    pub content: String,
    pub hits: Vec<RuleHit>,
}

impl Applied {
    pub fn replacements(&self) -> usize {
        self.hits.iter().map(|h| h.replacements).sum()
    }
}

/// Rule as shown in listings and reports.
#[derive(Debug, Clone, Serialize)]
pub struct RuleSummary {
    pub order: usize,
    pub name: String,
    pub find: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replace: Option<String>,
    pub mode: MatchMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    pub priority: i32,
}

impl RuleSet {
    pub fn new(mut rules: Vec<Rule>) -> Self {
        // sort_by_key is stable, which is what makes declaration order the tiebreak
        rules.sort_by_key(|r| r.priority);
        RuleSet { rules }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn apply(&self, content: &str, path: &Path) -> String {
        self.apply_counted(content, path).content
    }

    pub fn apply_counted(&self, content: &str, path: &Path) -> Applied {
        let mut current: Cow<str> = Cow::Borrowed(content);
        let mut hits = Vec::new();

        for rule in self.rules.iter().filter(|r| r.applies_to(path)) {
            let (next, count) = rule.apply(&current);
            if count == 0 {
                continue;
            }
            let next = next.into_owned();
            current = Cow::Owned(next);
            hits.push(RuleHit {
                rule: rule.name.clone(),
                replacements: count,
            });
        }

        Applied {
            content: current.into_owned(),
            hits,
        }
    }

    pub fn summaries(&self) -> Vec<RuleSummary> {
        self.rules
            .iter()
            .enumerate()
            .map(|(i, r)| RuleSummary {
                order: i + 1,
                name: r.name.clone(),
                find: r.find().to_string(),
                replace: r.replacement().describe().map(str::to_string),
                mode: r.mode(),
                scope: r.scope().map(str::to_string),
                priority: r.priority,
            })
            .collect()
    }
}
