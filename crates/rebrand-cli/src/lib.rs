//! rebrand-cli: file discovery, parallel runs and reporting for `rebrand`

pub mod collect;
pub mod config;
pub mod output;
pub mod process;

/// Extensions processed when neither the command line nor the config file
/// name any
pub const DEFAULT_EXTENSIONS: &[&str] = &[".ts", ".tsx", ".js", ".jsx", ".css", ".scss", ".md", ".html"];
