//! A single find/replace transformation.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::error::{Error, Result};

/// How a rule's `find` text is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Exact substring. Backslashes, dots and `$` mean themselves on both sides.
    #[default]
    Literal,
    /// Regular expression; the replacement may reference `$1` / `${name}`.
    Regex,
}

pub type ReplaceFn = Arc<dyn Fn(&Captures) -> String + Send + Sync>;

#[derive(Clone)]
pub enum Replacement {
    Template(String),
    Function(ReplaceFn),
}

impl fmt::Debug for Replacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Replacement::Template(t) => f.debug_tuple("Template").field(t).finish(),
            Replacement::Function(_) => f.write_str("Function(..)"),
        }
    }
}

impl Replacement {
    pub fn describe(&self) -> Option<&str> {
        match self {
            Replacement::Template(t) => Some(t),
            Replacement::Function(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Rule {
    pub name: String,
    /// Lower runs first.
    pub priority: i32,
    find: String,
    mode: MatchMode,
    replacement: Replacement,
    /// Glob limiting which files the rule touches. `None` means every file.
    scope: Option<String>,
    matcher: Regex,
}

impl Rule {
    pub fn new(
        name: impl Into<String>,
        find: impl Into<String>,
        mode: MatchMode,
        replacement: Replacement,
    ) -> Result<Self> {
        let name = name.into();
        let find = find.into();

        if find.is_empty() {
            return Err(Error::config_invalid_value(
                format!("rules.{}.find", name),
                None,
                "find text must not be empty",
            ));
        }

        let source: Cow<str> = match mode {
            MatchMode::Literal => Cow::Owned(regex::escape(&find)),
            MatchMode::Regex => Cow::Borrowed(find.as_str()),
        };
        let matcher =
            Regex::new(&source).map_err(|e| Error::rule_invalid_pattern(&name, &find, e))?;

        Ok(Rule {
            name,
            find,
            mode,
            replacement,
            scope: None,
            priority: 0,
            matcher,
        })
    }

    /// Exact-substring rule; `replace` is inserted verbatim.
    pub fn literal(find: &str, replace: &str) -> Result<Self> {
        Self::new(
            find,
            find,
            MatchMode::Literal,
            Replacement::Template(replace.to_string()),
        )
    }

    pub fn regex(pattern: &str, template: &str) -> Result<Self> {
        Self::new(
            pattern,
            pattern,
            MatchMode::Regex,
            Replacement::Template(template.to_string()),
        )
    }

    pub fn regex_fn<F>(pattern: &str, f: F) -> Result<Self>
    where
        F: Fn(&Captures) -> String + Send + Sync + 'static,
    {
        Self::new(pattern, pattern, MatchMode::Regex, Replacement::Function(Arc::new(f)))
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn find(&self) -> &str {
        &self.find
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    pub fn replacement(&self) -> &Replacement {
        &self.replacement
    }

    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    /// Whether this rule's scope admits `path`.
    ///
    /// A scope without `/` is matched against the file name. A scope with `/`
    /// is matched against the path, anchored at any directory boundary, so
    /// `components/ui/*.tsx` matches `/repo/src/app/components/ui/button.tsx`.
    pub fn applies_to(&self, path: &Path) -> bool {
        let Some(scope) = self.scope.as_deref() else {
            return true;
        };

        if !scope.contains('/') {
            return path
                .file_name()
                .map(|n| glob_match::glob_match(scope, &n.to_string_lossy()))
                .unwrap_or(false);
        }

        let full = path.to_string_lossy().replace('\\', "/");
        let scope = scope.trim_start_matches("./");
        if glob_match::glob_match(scope, &full) {
            return true;
        }
        full.match_indices('/')
            .any(|(i, _)| glob_match::glob_match(scope, &full[i + 1..]))
    }

    /// Replace every non-overlapping match, returning the new text and match count.
    pub fn apply<'a>(&self, content: &'a str) -> (Cow<'a, str>, usize) {
        let mut out = String::new();
        let mut last = 0;
        let mut count = 0;

        for caps in self.matcher.captures_iter(content) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            out.push_str(&content[last..whole.start()]);
            match (&self.replacement, self.mode) {
                (Replacement::Template(t), MatchMode::Literal) => out.push_str(t),
                (Replacement::Template(t), MatchMode::Regex) => caps.expand(t, &mut out),
                (Replacement::Function(f), _) => out.push_str(&f(&caps)),
            }
            last = whole.end();
            count += 1;
        }

        if count == 0 {
            return (Cow::Borrowed(content), 0);
        }

        out.push_str(&content[last..]);
        (Cow::Owned(out), count)
    }
}
