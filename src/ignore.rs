//! Exclusion policy for tree replication.
//! Combines the built-in exclusions (VCS metadata, caches, virtual
//! environments, generated media, migrations, generator files) with extra
//! glob patterns read from a `.variantignore` file at the source root.

use crate::constants::{IGNORE_FILE, MANIFEST_FILE, REPORT_FILE, VARIANT_CONFIG_FILES};
use crate::error::{Error, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use log::debug;
use std::{fs::read_to_string, path::Path};

/// Directory names that are pruned before descent.
pub const DEFAULT_EXCLUDED_DIRS: [&str; 10] = [
    "__pycache__",
    ".git",
    "venv",
    "env",
    "ENV",
    "media",
    "staticfiles",
    ".vscode",
    ".idea",
    "migrations",
];

/// File name suffixes that are never copied.
pub const DEFAULT_EXCLUDED_SUFFIXES: [&str; 10] =
    [".pyc", ".pyo", ".pyd", ".db", ".sqlite3", ".log", ".pid", ".bak", ".swp", ".swo"];

/// Legacy generator entry point kept in old template trees.
pub const LEGACY_GENERATOR_FILE: &str = "generate_variant.py";

/// What never makes it into a generated variant.
#[derive(Debug, Clone)]
pub struct ExclusionPolicy {
    dir_names: Vec<String>,
    file_names: Vec<String>,
    suffixes: Vec<String>,
    patterns: GlobSet,
}

impl Default for ExclusionPolicy {
    fn default() -> Self {
        let mut file_names = vec![
            LEGACY_GENERATOR_FILE.to_string(),
            IGNORE_FILE.to_string(),
            MANIFEST_FILE.to_string(),
            REPORT_FILE.to_string(),
        ];
        file_names.extend(VARIANT_CONFIG_FILES.iter().map(|f| f.to_string()));

        Self {
            dir_names: DEFAULT_EXCLUDED_DIRS.iter().map(|d| d.to_string()).collect(),
            file_names,
            suffixes: DEFAULT_EXCLUDED_SUFFIXES.iter().map(|s| s.to_string()).collect(),
            patterns: GlobSet::empty(),
        }
    }
}

impl ExclusionPolicy {
    /// Default policy plus the patterns of `<source_root>/.variantignore`.
    ///
    /// # Errors
    /// * `Error::PatternError` if the ignore file holds an invalid glob
    pub fn load<P: AsRef<Path>>(source_root: P) -> Result<Self> {
        let patterns = parse_ignore_file(source_root.as_ref().join(IGNORE_FILE))?;
        Ok(Self::default().with_patterns(patterns))
    }

    /// Replaces the extra glob patterns.
    pub fn with_patterns(mut self, patterns: GlobSet) -> Self {
        self.patterns = patterns;
        self
    }

    /// Whether a directory (and everything below it) is skipped.
    ///
    /// # Arguments
    /// * `relative` - Path of the directory relative to the source root
    pub fn is_excluded_dir(&self, relative: &Path) -> bool {
        let by_name = relative
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| self.dir_names.iter().any(|d| d == name));
        by_name || self.patterns.is_match(relative)
    }

    /// Whether a file is skipped, by exact name, by suffix or by pattern.
    ///
    /// # Arguments
    /// * `relative` - Path of the file relative to the source root
    pub fn is_excluded_file(&self, relative: &Path) -> bool {
        let Some(name) = relative.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        self.file_names.iter().any(|f| f == name)
            || self.suffixes.iter().any(|s| name.ends_with(s.as_str()))
            || self.patterns.is_match(relative)
    }
}

/// Reads an ignore file into a set of glob patterns.
///
/// # Notes
/// - A missing file yields an empty set
/// - Blank lines and lines starting with `#` are skipped
/// - A trailing `/` is dropped so `cache/` prunes the `cache` directory
///
/// # Example
/// ```ignore
/// # Contents of .variantignore:
/// *.pyc
/// docs/
/// scripts/seed_*.py
/// ```
pub fn parse_ignore_file<P: AsRef<Path>>(ignore_path: P) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    if let Ok(contents) = read_to_string(ignore_path.as_ref()) {
        for line in contents.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let pattern = line.trim_end_matches('/');
            builder.add(Glob::new(pattern).map_err(|e| {
                Error::PatternError(format!("{IGNORE_FILE} loading failed: {e}"))
            })?);
        }
    } else {
        debug!("{IGNORE_FILE} does not exist")
    }
    let glob_set = builder
        .build()
        .map_err(|e| Error::PatternError(format!("{IGNORE_FILE} loading failed: {e}")))?;

    Ok(glob_set)
}
