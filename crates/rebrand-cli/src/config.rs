//! Configuration file support for rebrand
//!
//! Loads `.rebrand.toml` from current directory or parent directories.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::DEFAULT_EXTENSIONS;

pub const CONFIG_FILE_NAME: &str = ".rebrand.toml";

/// Configuration file structure
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub rules: RulesConfig,
    pub paths: PathsConfig,
    pub files: FilesConfig,
    pub run: RunConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Categories to apply, in order (`all` allowed)
    pub types: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Glob patterns to exclude from processing
    pub exclude: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FilesConfig {
    /// Extension allow-list, e.g. [".ts", ".css"]
    pub extensions: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Worker threads (0 = one per core)
    pub jobs: Option<usize>,
}

impl Config {
    /// Load config from `.rebrand.toml` searching from current directory upward
    pub fn load() -> Result<Option<(Config, PathBuf)>> {
        Self::load_from(std::env::current_dir()?)
    }

    /// Load config searching from the given directory upward
    pub fn load_from(start_dir: PathBuf) -> Result<Option<(Config, PathBuf)>> {
        let mut current = Some(start_dir.as_path());

        while let Some(dir) = current {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                let config = Self::load_path(&config_path)?;
                return Ok(Some((config, config_path)));
            }
            current = dir.parent();
        }

        Ok(None)
    }

    /// Load config from a specific path
    pub fn load_path(path: &Path) -> Result<Config> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Categories to run. The command line wins over the config file; with
    /// neither, every category runs.
    pub fn effective_types(&self, cli_types: &[String]) -> Vec<String> {
        if !cli_types.is_empty() {
            return cli_types.to_vec();
        }
        match &self.rules.types {
            Some(types) if !types.is_empty() => types.clone(),
            _ => vec!["all".to_string()],
        }
    }

    pub fn effective_extensions(&self, cli_extensions: &[String]) -> Vec<String> {
        if !cli_extensions.is_empty() {
            return cli_extensions.to_vec();
        }
        match &self.files.extensions {
            Some(extensions) => extensions.clone(),
            None => DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn effective_jobs(&self, cli_jobs: Option<usize>) -> usize {
        cli_jobs.or(self.run.jobs).unwrap_or(0)
    }
}
