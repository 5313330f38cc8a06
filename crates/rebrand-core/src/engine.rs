//! Ordered substitution over a single file's content
//!
//! Rules run one after another against a single working copy. Each rule
//! sweeps the working copy once, left to right, replacing every
//! non-overlapping match; the next rule sees the result. Later rules may
//! therefore correct or refine what earlier rules produced, and reordering
//! rules changes the outcome.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::EngineError;
use crate::rule::{Rule, RuleSet};

/// One replaced occurrence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub rule_id: String,
    pub category: String,
    /// Byte offset of the match in the content the rule swept
    pub offset: usize,
    /// 1-based line of `offset`
    pub line: usize,
    /// 1-based column of `offset`, in characters
    pub column: usize,
    pub before: String,
    pub after: String,
}

/// Outcome of running a rule set over one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    pub content: String,
    pub changes: Vec<ChangeRecord>,
    pub changed: bool,
}

/// Apply `rules` in order to `content`. `path` is only consulted for rule
/// file filters.
pub fn apply(rules: &RuleSet, path: &Path, content: &str) -> Result<Substitution, EngineError> {
    let mut working = content.to_string();
    let mut changes = Vec::new();

    for rule in rules {
        if !rule.applies_to(path) {
            continue;
        }
        if let Some(next) = sweep(rule, &working, &mut changes)? {
            working = next;
        }
    }

    let changed = working != content;
    Ok(Substitution {
        content: working,
        changes,
        changed,
    })
}

/// One pass of `rule` over `input`. Returns `None` when nothing was replaced.
fn sweep(
    rule: &Rule,
    input: &str,
    changes: &mut Vec<ChangeRecord>,
) -> Result<Option<String>, EngineError> {
    let mut output = String::new();
    let mut last = 0;
    let mut replaced = 0usize;
    let mut cursor = LineCursor::new(input);

    for caps in rule.regex().captures_iter(input) {
        let caps = caps.map_err(|e| EngineError::Match {
            rule: rule.id().to_string(),
            source: Box::new(e),
        })?;
        let Some(whole) = caps.get(0) else { continue };

        let after = rule.template().expand(&caps);
        if after == whole.as_str() {
            continue;
        }

        if replaced == 0 {
            output.reserve(input.len());
        }
        output.push_str(&input[last..whole.start()]);
        output.push_str(&after);
        last = whole.end();
        replaced += 1;

        let (line, column) = cursor.locate(whole.start());
        changes.push(ChangeRecord {
            rule_id: rule.id().to_string(),
            category: rule.category().to_string(),
            offset: whole.start(),
            line,
            column,
            before: whole.as_str().to_string(),
            after,
        });
    }

    if replaced == 0 {
        return Ok(None);
    }

    tracing::trace!(rule = rule.id(), replaced, "rule applied");
    output.push_str(&input[last..]);
    Ok(Some(output))
}

/// Incremental byte offset to (line, column) conversion for increasing offsets
struct LineCursor<'a> {
    source: &'a str,
    offset: usize,
    line: usize,
    column: usize,
}

impl<'a> LineCursor<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    fn locate(&mut self, target: usize) -> (usize, usize) {
        let end = target.min(self.source.len());
        if end > self.offset {
            for ch in self.source[self.offset..end].chars() {
                if ch == '\n' {
                    self.line += 1;
                    self.column = 1;
                } else {
                    self.column += 1;
                }
            }
            self.offset = end;
        }
        (self.line, self.column)
    }
}
