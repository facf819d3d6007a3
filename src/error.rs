//! Error handling for variant-gen.
//! Defines the error type and result alias used throughout the crate.

use std::io;
use thiserror::Error;

/// All errors a generation run can produce.
///
/// Fatal variants abort the run before anything usable lands in the destination.
/// Recoverable variants are collected into summaries and enumerated in the
/// generation report instead of being returned to the caller.
#[derive(Error, Debug)]
pub enum Error {
    /// The requested variant id is not defined by any configuration source
    #[error("Variant {id} not found. Available: {}.", join_ids(.known))]
    ConfigNotFound { id: u32, known: Vec<u32> },

    /// An external variants file could not be read, parsed or is incomplete
    #[error("Configuration error: {0}.")]
    ConfigError(String),

    /// The destination could not be removed or created
    #[error("Failed to prepare destination '{path}': {reason}.")]
    DestinationPreparationFailed { path: String, reason: String },

    /// A single file could not be copied into the destination
    #[error("Failed to copy '{path}': {source}.")]
    FileCopyFailed { path: String, source: io::Error },

    /// A destination file could not be read or written back during rewriting
    #[error("Failed to rewrite '{path}': {source}.")]
    SubstitutionFailed { path: String, source: io::Error },

    /// The manifest or the report could not be written
    #[error("Failed to write report '{path}': {reason}.")]
    ReportWriteFailed { path: String, reason: String },

    /// Invalid glob in .variantignore or in a file role pattern
    #[error("Pattern error: {0}.")]
    PatternError(String),

    #[error("IO error: {0}.")]
    IoError(#[from] io::Error),

    #[error("Template rendering error: {0}.")]
    MinijinjaError(#[from] minijinja::Error),
}

impl Error {
    /// Whether this error aborts a generation run.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Error::FileCopyFailed { .. }
                | Error::SubstitutionFailed { .. }
                | Error::ReportWriteFailed { .. }
        )
    }
}

fn join_ids(ids: &[u32]) -> String {
    if ids.is_empty() {
        return "none".to_string();
    }
    ids.iter().map(u32::to_string).collect::<Vec<_>>().join(", ")
}

/// Convenience type alias for Results with [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Default error handler that prints the error and exits the program.
///
/// # Arguments
/// * `err` - The error to handle
///
/// # Behavior
/// Prints the error message to stderr and exits with status code 1
pub fn default_error_handler(err: Error) {
    eprintln!("{err}");
    std::process::exit(1);
}
