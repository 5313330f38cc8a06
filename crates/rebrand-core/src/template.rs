//! Replacement templates
//!
//! A template is literal text with positional references to the pattern's
//! capture groups: `$1` or `${1}`. `$$` produces a literal dollar sign; any
//! other `$` is rejected when the template is parsed.

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("stray `$` at byte {offset} (use `$N`, `${{N}}` or `$$`)")]
pub struct TemplateError {
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Literal(String),
    Group(usize),
}

/// A parsed replacement template
#[derive(Debug, Clone)]
pub struct Template {
    source: String,
    pieces: Vec<Piece>,
}

fn token_regex() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| Regex::new(r"\$(?:(\$)|\{(\d+)\}|(\d+))?").unwrap())
}

impl Template {
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut pieces = Vec::new();
        let mut last = 0;

        for caps in token_regex().captures_iter(source) {
            let Some(token) = caps.get(0) else { continue };
            push_literal(&mut pieces, &source[last..token.start()]);

            if caps.get(1).is_some() {
                push_literal(&mut pieces, "$");
            } else if let Some(digits) = caps.get(2).or_else(|| caps.get(3)) {
                let index = digits
                    .as_str()
                    .parse::<usize>()
                    .map_err(|_| TemplateError {
                        offset: token.start(),
                    })?;
                pieces.push(Piece::Group(index));
            } else {
                return Err(TemplateError {
                    offset: token.start(),
                });
            }

            last = token.end();
        }
        push_literal(&mut pieces, &source[last..]);

        Ok(Self {
            source: source.to_string(),
            pieces,
        })
    }

    /// The template as written
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Highest capture group referenced, if any
    pub fn max_group(&self) -> Option<usize> {
        self.pieces
            .iter()
            .filter_map(|piece| match piece {
                Piece::Group(index) => Some(*index),
                Piece::Literal(_) => None,
            })
            .max()
    }

    /// Build the replacement text for one match. Groups that did not
    /// participate in the match expand to nothing.
    pub fn expand(&self, caps: &fancy_regex::Captures<'_>) -> String {
        let mut out = String::new();
        for piece in &self.pieces {
            match piece {
                Piece::Literal(text) => out.push_str(text),
                Piece::Group(index) => {
                    if let Some(m) = caps.get(*index) {
                        out.push_str(m.as_str());
                    }
                }
            }
        }
        out
    }
}

fn push_literal(pieces: &mut Vec<Piece>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Piece::Literal(prev)) = pieces.last_mut() {
        prev.push_str(text);
    } else {
        pieces.push(Piece::Literal(text.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fancy_regex::Regex as FancyRegex;

    fn expand_first(pattern: &str, template: &str, input: &str) -> String {
        let re = FancyRegex::new(pattern).unwrap();
        let caps = re.captures(input).unwrap().unwrap();
        Template::parse(template).unwrap().expand(&caps)
    }

    #[test]
    fn test_literal_only() {
        let template = Template::parse("PinnacleAiIcon").unwrap();
        assert_eq!(template.max_group(), None);
        assert_eq!(template.pieces, vec![Piece::Literal("PinnacleAiIcon".into())]);
    }

    #[test]
    fn test_group_forms() {
        let template = Template::parse("a$1b${2}c$$").unwrap();
        assert_eq!(
            template.pieces,
            vec![
                Piece::Literal("a".into()),
                Piece::Group(1),
                Piece::Literal("b".into()),
                Piece::Group(2),
                Piece::Literal("c$".into()),
            ]
        );
        assert_eq!(template.max_group(), Some(2));
    }

    #[test]
    fn test_stray_dollar_rejected() {
        assert_eq!(Template::parse("cost: $x").unwrap_err().offset, 6);
        assert_eq!(Template::parse("${name}").unwrap_err().offset, 0);
        assert!(Template::parse("trailing $").is_err());
    }

    #[test]
    fn test_expand_with_captures() {
        assert_eq!(
            expand_first(r"bg-void-border-(\d+)", "bg-pinnacleai-border-${1}", "bg-void-border-3"),
            "bg-pinnacleai-border-3"
        );
    }

    #[test]
    fn test_expand_unmatched_optional_group() {
        assert_eq!(
            expand_first(r"void-tooltip(-[a-z]+)?", "pinnacleai-tooltip$1", "void-tooltip"),
            "pinnacleai-tooltip"
        );
        assert_eq!(
            expand_first(r"void-tooltip(-[a-z]+)?", "pinnacleai-tooltip$1", "void-tooltip-top"),
            "pinnacleai-tooltip-top"
        );
    }
}
