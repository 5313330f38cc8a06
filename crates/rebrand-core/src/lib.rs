//! rebrand-core: ordered text substitution for codebase rebranding
//!
//! This crate provides:
//! - `Rule` / `RuleSet`: compiled pattern → replacement rules in a fixed order
//! - `Template`: positional capture-group replacement templates
//! - `FileFilter`: extension and path-glob scoping for rules
//! - `apply()`: run a rule set over one file's content, recording each change

mod engine;
mod error;
mod filter;
mod rule;
mod template;

pub use engine::{apply, ChangeRecord, Substitution};
pub use error::{ConfigError, EngineError};
pub use filter::{dotted_extension, FileFilter, FileFilterSpec};
pub use rule::{Rule, RuleDef, RuleSet};
pub use template::{Template, TemplateError};
