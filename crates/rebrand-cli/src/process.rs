//! File processing and run coordination for rebrand
//!
//! Each file is read once, run through the whole rule set, and (unless this
//! is a dry run) written back atomically. Files are independent and are
//! processed on a bounded rayon pool; rules within a file run strictly in
//! order. A failure on one file is recorded in its result and never stops
//! the run.

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

use rebrand_core::{apply, ChangeRecord, RuleSet};

use crate::collect::Collector;

/// Per-file failure, recorded in the file's result
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FileError {
    #[error("failed to read file: {message}")]
    Read { message: String },

    #[error("failed to write file: {message}")]
    Write { message: String },

    #[error("rule {rule} failed: {message}")]
    Match { rule: String, message: String },
}

/// A file and its content as read at the start of processing
#[derive(Debug, Clone)]
pub struct FileTask {
    pub path: PathBuf,
    pub original_content: String,
}

impl FileTask {
    pub fn read(path: &Path) -> Result<Self, FileError> {
        let original_content = fs::read_to_string(path).map_err(|e| FileError::Read {
            message: e.to_string(),
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            original_content,
        })
    }
}

/// Result of processing a single file
#[derive(Debug, Clone, Serialize)]
pub struct FileResult {
    pub path: PathBuf,
    pub changed: bool,
    pub changes: Vec<ChangeRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<FileError>,
    #[serde(skip)]
    pub original_content: Option<String>,
    #[serde(skip)]
    pub final_content: Option<String>,
}

impl FileResult {
    fn failed(path: &Path, error: FileError) -> Self {
        Self {
            path: path.to_path_buf(),
            changed: false,
            changes: Vec::new(),
            error: Some(error),
            original_content: None,
            final_content: None,
        }
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Aggregated outcome of a run, sorted by path
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub files_scanned: usize,
    pub files_changed: usize,
    pub total_changes: usize,
    pub errors: usize,
    pub dry_run: bool,
    pub cancelled: bool,
    /// Categories in the order they were applied
    pub categories: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<PathBuf>,
    pub results: Vec<FileResult>,
}

impl RunReport {
    fn finalize(mut results: Vec<FileResult>, rules: &RuleSet, dry_run: bool, cancelled: bool) -> Self {
        results.sort_by(|a, b| a.path.cmp(&b.path));

        let ok = || results.iter().filter(|r| !r.has_error());
        let files_changed = ok().filter(|r| r.changed).count();
        let total_changes = ok().map(|r| r.changes.len()).sum();
        let errors = results.iter().filter(|r| r.has_error()).count();

        Self {
            files_scanned: results.len(),
            files_changed,
            total_changes,
            errors,
            dry_run,
            cancelled,
            categories: rules.categories().into_iter().map(str::to_string).collect(),
            missing: Vec::new(),
            results,
        }
    }

    /// Results that changed (or would change) their file
    pub fn changed(&self) -> impl Iterator<Item = &FileResult> {
        self.results.iter().filter(|r| r.changed && !r.has_error())
    }
}

/// Cooperative cancellation flag shared with the worker pool
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// No file is started after this; files in flight finish normally
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub dry_run: bool,
    /// Worker threads (0 = one per core)
    pub jobs: usize,
    pub cancel: CancelToken,
    /// Exclude patterns, as for [`Collector::with_excludes`]
    pub exclude: Vec<String>,
}

/// Collect files under `roots` and process them
pub fn run<P, S>(roots: &[P], extensions: &[S], rules: &RuleSet, options: &RunOptions) -> Result<RunReport>
where
    P: AsRef<Path>,
    S: AsRef<str>,
{
    let collected = Collector::new(extensions)
        .with_excludes(&options.exclude)?
        .collect(roots);

    let mut report = run_files(&collected.files, rules, options)?;
    report.missing = collected.missing;
    Ok(report)
}

/// Process an already collected file list
pub fn run_files(files: &[PathBuf], rules: &RuleSet, options: &RunOptions) -> Result<RunReport> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.jobs)
        .build()
        .context("Failed to start worker pool")?;

    tracing::debug!(
        files = files.len(),
        rules = rules.len(),
        threads = pool.current_num_threads(),
        dry_run = options.dry_run,
        "starting run"
    );

    let results: Vec<FileResult> = pool.install(|| {
        files
            .par_iter()
            .filter_map(|path| {
                if options.cancel.is_cancelled() {
                    return None;
                }
                Some(process_file(path, rules, options.dry_run))
            })
            .collect()
    });

    let cancelled = results.len() < files.len();
    if cancelled {
        tracing::warn!(
            skipped = files.len() - results.len(),
            "run cancelled before all files were processed"
        );
    }

    Ok(RunReport::finalize(results, rules, options.dry_run, cancelled))
}

/// Read, substitute and (unless `dry_run`) write back one file
pub fn process_file(path: &Path, rules: &RuleSet, dry_run: bool) -> FileResult {
    let task = match FileTask::read(path) {
        Ok(task) => task,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "skipping file");
            return FileResult::failed(path, e);
        }
    };

    let substitution = match apply(rules, &task.path, &task.original_content) {
        Ok(substitution) => substitution,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "skipping file");
            let error = match e {
                rebrand_core::EngineError::Match { rule, source } => FileError::Match {
                    rule,
                    message: source.to_string(),
                },
            };
            return FileResult::failed(path, error);
        }
    };

    let mut error = None;
    if substitution.changed && !dry_run {
        if let Err(e) = write_file_atomic(path, &substitution.content) {
            let message = format!("{:#}", e);
            tracing::debug!(path = %path.display(), error = %message, "write failed");
            error = Some(FileError::Write { message });
        }
    }

    tracing::debug!(
        path = %path.display(),
        changes = substitution.changes.len(),
        changed = substitution.changed,
        "processed file"
    );

    // contents are only needed to render diffs of changed files
    let (original_content, final_content) = if substitution.changed {
        (Some(task.original_content), Some(substitution.content))
    } else {
        (None, None)
    };

    FileResult {
        path: task.path,
        changed: substitution.changed,
        changes: substitution.changes,
        error,
        original_content,
        final_content,
    }
}

/// Replace `path` with `content` via a sibling temp file and a rename, so a
/// failed write leaves the original untouched
pub fn write_file_atomic(path: &Path, content: &str) -> Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .with_context(|| format!("Invalid path: {}", path.display()))?;
    let tmp_path = parent.join(format!(".{}.rebrand.tmp", file_name.to_string_lossy()));

    if let Err(e) = fs::write(&tmp_path, content) {
        // a partial temp file may remain; a directory in its place does not go
        let _ = fs::remove_file(&tmp_path);
        return Err(e).with_context(|| format!("Failed to write temp file: {}", tmp_path.display()));
    }
    // keep the original mode (e.g. executable scripts)
    if let Ok(metadata) = fs::metadata(path) {
        let _ = fs::set_permissions(&tmp_path, metadata.permissions());
    }

    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e).with_context(|| format!("Failed to replace file: {}", path.display()));
    }
    Ok(())
}
