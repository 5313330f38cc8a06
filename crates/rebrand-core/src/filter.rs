//! File filters restricting where a rule applies

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Declarative form of a filter, as written in rule tables
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct FileFilterSpec {
    /// Extensions with their leading dot (e.g. ".css"); case-sensitive
    pub extensions: Vec<String>,
    /// Path globs (e.g. "**/react/**")
    pub paths: Vec<String>,
}

/// A compiled filter. A path passes when it satisfies every non-empty
/// criterion: its extension is listed and it matches at least one glob.
#[derive(Debug, Clone)]
pub struct FileFilter {
    extensions: Vec<String>,
    paths: Vec<glob::Pattern>,
}

impl FileFilter {
    pub fn compile(spec: &FileFilterSpec) -> Result<Self, (String, glob::PatternError)> {
        let paths = spec
            .paths
            .iter()
            .map(|p| glob::Pattern::new(p).map_err(|e| (p.clone(), e)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            extensions: spec.extensions.iter().map(|e| normalize_extension(e)).collect(),
            paths,
        })
    }

    /// Filter on extensions only
    pub fn extensions<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|e| normalize_extension(e.as_ref()))
                .collect(),
            paths: Vec::new(),
        }
    }

    pub fn matches(&self, path: &Path) -> bool {
        if !self.extensions.is_empty() {
            let Some(ext) = dotted_extension(path) else {
                return false;
            };
            if !self.extensions.iter().any(|e| *e == ext) {
                return false;
            }
        }

        if !self.paths.is_empty() {
            let file_name = path.file_name().map(|n| n.to_string_lossy());
            let hit = self.paths.iter().any(|pattern| {
                pattern.matches_path(path)
                    || file_name
                        .as_deref()
                        .is_some_and(|name| pattern.matches(name))
            });
            if !hit {
                return false;
            }
        }

        true
    }
}

/// The final extension of `path` including its leading dot
pub fn dotted_extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
}

fn normalize_extension(ext: &str) -> String {
    if ext.starts_with('.') {
        ext.to_string()
    } else {
        format!(".{}", ext)
    }
}
