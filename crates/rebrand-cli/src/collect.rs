//! Candidate file discovery
//!
//! Walks each root and keeps files whose extension is on the allow-list.
//! Results are sorted and de-duplicated so that runs over the same tree
//! always see files in the same order.

use anyhow::{Context, Result};
use rebrand_core::FileFilter;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Files found under the roots, plus roots that do not exist
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Collected {
    pub files: Vec<PathBuf>,
    pub missing: Vec<PathBuf>,
}

#[derive(Debug)]
enum Exclude {
    /// `name/`: any path with this directory component sequence
    Dir(String),
    Glob(glob::Pattern),
}

#[derive(Debug)]
pub struct Collector {
    filter: FileFilter,
    allow_none: bool,
    excludes: Vec<Exclude>,
}

impl Collector {
    pub fn new<S: AsRef<str>>(extensions: &[S]) -> Self {
        Self {
            filter: FileFilter::extensions(extensions),
            allow_none: extensions.is_empty(),
            excludes: Vec::new(),
        }
    }

    /// Skip paths matching any of `patterns`. A trailing `/` names a
    /// directory; anything else is a glob tried against the whole path and
    /// the file name.
    pub fn with_excludes<S: AsRef<str>>(mut self, patterns: &[S]) -> Result<Self> {
        for pattern in patterns {
            let pattern = pattern.as_ref();
            if let Some(dir) = pattern.strip_suffix('/') {
                self.excludes.push(Exclude::Dir(dir.to_string()));
            } else {
                let glob = glob::Pattern::new(pattern)
                    .with_context(|| format!("Invalid exclude pattern '{}'", pattern))?;
                self.excludes.push(Exclude::Glob(glob));
            }
        }
        Ok(self)
    }

    /// Walk `roots`. A root naming a regular file is taken as is; a root that
    /// is a symlink to a file is skipped. Directories are walked without
    /// following symlinks. Unreadable entries are logged and skipped.
    pub fn collect<P: AsRef<Path>>(&self, roots: &[P]) -> Collected {
        let mut files = BTreeSet::new();
        let mut missing = Vec::new();

        for root in roots {
            let root = root.as_ref();
            if is_symlink(root) && !root.is_dir() {
                tracing::warn!(path = %root.display(), "skipping symlinked file root");
                continue;
            }
            if root.is_file() {
                files.insert(root.to_path_buf());
                continue;
            }
            if !root.is_dir() {
                tracing::debug!(path = %root.display(), "root does not exist");
                missing.push(root.to_path_buf());
                continue;
            }

            let walker = WalkDir::new(root)
                .follow_links(false)
                .into_iter()
                .filter_entry(|entry| entry.depth() == 0 || !self.prune(entry));

            for entry in walker {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(err) => {
                        tracing::warn!(error = %err, "skipping unreadable path");
                        continue;
                    }
                };
                if entry.file_type().is_file() && self.accepts(entry.path()) {
                    files.insert(entry.into_path());
                }
            }
        }

        tracing::debug!(files = files.len(), missing = missing.len(), "collected files");
        Collected {
            files: files.into_iter().collect(),
            missing,
        }
    }

    fn accepts(&self, path: &Path) -> bool {
        !self.allow_none && self.filter.matches(path) && !self.is_excluded(path, false)
    }

    fn prune(&self, entry: &DirEntry) -> bool {
        entry.file_type().is_dir()
            && (entry.file_name() == ".git" || self.is_excluded(entry.path(), true))
    }

    fn is_excluded(&self, path: &Path, is_dir: bool) -> bool {
        let mut path_str = path.to_string_lossy().replace('\\', "/");
        if is_dir {
            path_str.push('/');
        }
        let file_name = path.file_name().map(|n| n.to_string_lossy());

        self.excludes.iter().any(|exclude| match exclude {
            Exclude::Dir(dir) => {
                path_str.contains(&format!("/{}/", dir)) || path_str.starts_with(&format!("{}/", dir))
            }
            Exclude::Glob(glob) => {
                glob.matches(&path_str)
                    || file_name.as_deref().is_some_and(|name| glob.matches(name))
            }
        })
    }
}

fn is_symlink(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok_and(|m| m.file_type().is_symlink())
}

/// Collect files under `roots` with no excludes
pub fn collect<P: AsRef<Path>, S: AsRef<str>>(roots: &[P], extensions: &[S]) -> Collected {
    Collector::new(extensions).collect(roots)
}
