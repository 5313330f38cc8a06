//! Rules and rule sets
//!
//! A [`RuleDef`] is the declarative form (pattern, replacement, optional file
//! filter). Compiling it yields a [`Rule`], whose identity is its category and
//! its position inside that category. A [`RuleSet`] is the ordered sequence of
//! compiled rules applied in one run; its order is exactly the order in which
//! categories and rules were supplied.

use fancy_regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;
use crate::filter::{FileFilter, FileFilterSpec};
use crate::template::Template;

/// Declarative rule definition
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RuleDef {
    /// Regular expression to search for
    pub pattern: String,

    /// Replacement template (`$1`, `${1}`, `$$`)
    pub replace: String,

    /// Human-readable note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Restrict the rule to matching files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<FileFilterSpec>,
}

impl RuleDef {
    pub fn new(pattern: impl Into<String>, replace: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            replace: replace.into(),
            description: None,
            files: None,
        }
    }

    pub fn with_files(mut self, files: FileFilterSpec) -> Self {
        self.files = Some(files);
        self
    }
}

/// A compiled, immutable substitution rule
#[derive(Debug, Clone)]
pub struct Rule {
    id: String,
    category: String,
    position: usize,
    regex: Regex,
    template: Template,
    filter: Option<FileFilter>,
    description: Option<String>,
}

impl Rule {
    /// Compile a definition. Fails on an invalid pattern, a malformed
    /// template, a template referencing a group the pattern does not have,
    /// or an invalid path glob.
    pub fn compile(category: &str, position: usize, def: &RuleDef) -> Result<Self, ConfigError> {
        let id = format!("{}:{}", category, position);

        let regex = Regex::new(&def.pattern).map_err(|e| ConfigError::InvalidPattern {
            rule: id.clone(),
            pattern: def.pattern.clone(),
            source: Box::new(e),
        })?;

        let template = Template::parse(&def.replace).map_err(|e| ConfigError::MalformedTemplate {
            rule: id.clone(),
            template: def.replace.clone(),
            source: e,
        })?;

        // captures_len counts the implicit whole-match group 0
        let available = regex.captures_len().saturating_sub(1);
        if let Some(group) = template.max_group() {
            if group > available {
                return Err(ConfigError::UnknownGroup {
                    rule: id,
                    group,
                    available,
                });
            }
        }

        let filter = def
            .files
            .as_ref()
            .map(FileFilter::compile)
            .transpose()
            .map_err(|(glob, source)| ConfigError::InvalidFilter {
                rule: id.clone(),
                glob,
                source,
            })?;

        Ok(Self {
            id,
            category: category.to_string(),
            position,
            regex,
            template,
            filter,
            description: def.description.clone(),
        })
    }

    /// Stable identifier, `"<category>:<position>"`
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Whether the rule's file filter (if any) admits `path`
    pub fn applies_to(&self, path: &Path) -> bool {
        self.filter.as_ref().map_or(true, |f| f.matches(path))
    }

    pub(crate) fn regex(&self) -> &Regex {
        &self.regex
    }
}

/// Ordered sequence of rules for one run
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Compile groups of definitions, one group per category, in the given
    /// order. Every rule is validated before anything is returned.
    pub fn compile<I, C, D>(groups: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (C, D)>,
        C: AsRef<str>,
        D: AsRef<[RuleDef]>,
    {
        let mut rules = Vec::new();
        for (category, defs) in groups {
            for (position, def) in defs.as_ref().iter().enumerate() {
                rules.push(Rule::compile(category.as_ref(), position, def)?);
            }
        }
        Ok(Self { rules })
    }

    /// Append another set after this one
    pub fn extend(&mut self, other: RuleSet) {
        self.rules.extend(other.rules);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Distinct category names in application order
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for rule in &self.rules {
            if !seen.contains(&rule.category()) {
                seen.push(rule.category());
            }
        }
        seen
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}
