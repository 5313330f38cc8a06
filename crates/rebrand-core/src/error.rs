//! Error types for rule construction and application

use thiserror::Error;

use crate::template::TemplateError;

/// A rule that cannot be built. Always raised before any file is touched.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("rule {rule}: invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        rule: String,
        pattern: String,
        #[source]
        source: Box<fancy_regex::Error>,
    },

    #[error("rule {rule}: malformed replacement `{template}`: {source}")]
    MalformedTemplate {
        rule: String,
        template: String,
        #[source]
        source: TemplateError,
    },

    #[error("rule {rule}: replacement references group {group} but the pattern has {available} capture group(s)")]
    UnknownGroup {
        rule: String,
        group: usize,
        available: usize,
    },

    #[error("rule {rule}: invalid path glob `{glob}`: {source}")]
    InvalidFilter {
        rule: String,
        glob: String,
        #[source]
        source: glob::PatternError,
    },
}

/// Failure while sweeping a single file's content
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("rule {rule}: pattern could not be evaluated: {source}")]
    Match {
        rule: String,
        #[source]
        source: Box<fancy_regex::Error>,
    },
}
