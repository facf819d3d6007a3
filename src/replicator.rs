//! Tree replication.
//! Mirrors the template tree into the destination, pruning excluded
//! directories before descent and skipping excluded files. Individual copy
//! failures are collected as warnings; a directory that cannot be created
//! aborts the run.

use crate::error::{Error, Result};
use crate::ignore::ExclusionPolicy;
use log::{debug, warn};
use std::fs;
use std::io;
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

/// Outcome of a replication pass.
///
/// `copied + failed == eligible` always holds.
#[derive(Debug, Default)]
pub struct ReplicationSummary {
    /// Files that passed the exclusion policy
    pub eligible: usize,
    /// Files copied successfully
    pub copied: usize,
    /// Eligible files that could not be copied
    pub failed: usize,
    /// Files skipped by name, suffix or pattern
    pub excluded: usize,
    /// Directories created in the destination, root included
    pub directories: usize,
    /// Recoverable errors, in walk order
    pub warnings: Vec<Error>,
}

fn relative<'a>(entry: &'a DirEntry, root: &Path) -> &'a Path {
    entry.path().strip_prefix(root).unwrap_or(entry.path())
}

/// Copies a file's content, then its modification time and permissions.
///
/// Permissions go last so a read-only mode never blocks the time update.
/// Failing to carry over the time is only logged.
fn copy_file(source: &Path, dest: &Path) -> io::Result<()> {
    let mut reader = fs::File::open(source)?;
    let metadata = reader.metadata()?;
    let mut writer = fs::File::create(dest)?;
    io::copy(&mut reader, &mut writer)?;

    if let Err(e) = metadata.modified().and_then(|modified| writer.set_modified(modified)) {
        debug!("Could not preserve modification time of '{}': {e}", dest.display());
    }
    writer.set_permissions(metadata.permissions())
}

/// Replicates `source` into `destination` according to `policy`.
///
/// The destination root is expected to exist already; the orchestrator
/// wipes and re-creates it. Entries are visited in file name order so two
/// runs over the same tree behave identically.
///
/// # Errors
/// * `Error::DestinationPreparationFailed` if a destination directory cannot be created
pub fn replicate<S: AsRef<Path>, D: AsRef<Path>>(
    source: S,
    destination: D,
    policy: &ExclusionPolicy,
) -> Result<ReplicationSummary> {
    let source = source.as_ref();
    let destination = destination.as_ref();
    let mut summary = ReplicationSummary::default();

    let walker = WalkDir::new(source).sort_by_file_name().into_iter().filter_entry(|entry| {
        // Symlinks are not followed, so a linked `venv` is pruned by its own name
        let file_type = entry.file_type();
        let keep = entry.depth() == 0
            || !(file_type.is_dir() || file_type.is_symlink())
            || !policy.is_excluded_dir(relative(entry, source));
        if !keep {
            debug!("Pruning directory {}", entry.path().display());
        }
        keep
    });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().map(|p| p.display().to_string()).unwrap_or_default();
                let err = Error::FileCopyFailed { path, source: io::Error::from(e) };
                warn!("{err}");
                summary.warnings.push(err);
                continue;
            }
        };

        let rel = relative(&entry, source);
        let target = destination.join(rel);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| Error::DestinationPreparationFailed {
                path: target.display().to_string(),
                reason: e.to_string(),
            })?;
            summary.directories += 1;
            continue;
        }

        if policy.is_excluded_file(rel) {
            debug!("Skipping excluded file {}", rel.display());
            summary.excluded += 1;
            continue;
        }

        summary.eligible += 1;
        match copy_file(entry.path(), &target) {
            Ok(()) => {
                debug!("Copied {}", rel.display());
                summary.copied += 1;
            }
            Err(e) => {
                let err = Error::FileCopyFailed { path: rel.display().to_string(), source: e };
                warn!("{err}");
                summary.failed += 1;
                summary.warnings.push(err);
            }
        }
    }

    Ok(summary)
}
