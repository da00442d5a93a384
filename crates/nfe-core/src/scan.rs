//! Candidate discovery: directory walking and explicit file lists.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use glob::{glob_with, MatchOptions, Pattern};
use tracing::{debug, warn};

use crate::error::ScanError;
use crate::models::config::ScanConfig;

/// Finds the XML files a batch should process.
#[derive(Debug, Clone)]
pub struct CorpusScanner {
    extension: String,
}

impl Default for CorpusScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl CorpusScanner {
    /// Create a scanner for `.xml` files.
    pub fn new() -> Self {
        Self::from_config(&ScanConfig::default())
    }

    /// Create a scanner from configuration.
    pub fn from_config(config: &ScanConfig) -> Self {
        Self {
            extension: config.extension.trim_start_matches('.').to_string(),
        }
    }

    /// Recursively list matching regular files under `dir`, sorted by path.
    pub fn scan_directory(&self, dir: &Path) -> Result<Vec<PathBuf>, ScanError> {
        if !dir.is_dir() {
            return Err(ScanError::NotADirectory(dir.to_path_buf()));
        }

        let root = Pattern::escape(&dir.to_string_lossy());
        let pattern = format!("{}/**/*.{}", root.trim_end_matches('/'), self.extension);
        let options = MatchOptions {
            case_sensitive: false,
            ..MatchOptions::new()
        };

        let mut files: Vec<PathBuf> = glob_with(&pattern, options)
            .map_err(|e| ScanError::Pattern(e.to_string()))?
            .filter_map(|entry| match entry {
                Ok(path) => Some(path),
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    None
                }
            })
            .filter(|path| path.is_file() && self.matches(path))
            .collect();

        files.sort();
        debug!("Found {} candidate file(s) in {}", files.len(), dir.display());
        Ok(files)
    }

    /// Deduplicate an explicit selection, keeping the first occurrence.
    pub fn scan_files<I, P>(&self, files: I) -> Vec<PathBuf>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut seen = HashSet::new();
        files
            .into_iter()
            .map(Into::into)
            .filter(|path| seen.insert(path.clone()))
            .collect()
    }

    /// Whether `path` has the configured extension, ignoring case.
    pub fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(&self.extension))
    }
}
