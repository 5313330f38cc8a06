//! rebrand-rules: built-in rebranding rule catalog
//!
//! Categories (applied in this order when `all` is requested):
//! - css: Tailwind utility classes, CSS variables and scope markers
//! - component: React component names
//! - action: action identifier constants
//! - service: service interface names
//! - types: type names
//! - function: function and variable names
//! - import: relative import paths
//! - string: user-facing strings and well-known file names
//! - react: import path corrections and short component names in JSX
//! - fixups: corrections applied after the rename passes

pub mod catalog;
pub mod category;

pub use catalog::{Catalog, CatalogError, CategoryRules};
pub use category::Category;
