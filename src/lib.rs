//! variant-gen materializes numbered variants of a template project.
//! It copies the template tree, rewrites domain vocabulary (model names,
//! display labels, navigation text) with ordered literal substitutions and
//! leaves a manifest and a report in the generated tree.

/// Command-line interface module
pub mod cli;

/// Common constants: file names, output prefix, template app
pub mod constants;

/// Error types and handling
pub mod error;

/// Generation run orchestration
pub mod generator;

/// Exclusion policy and .variantignore patterns
pub mod ignore;

/// Logger set-up
pub mod logger;

/// MiniJinja rendering of the manifest and report
pub mod renderer;

/// Tree replication
pub mod replicator;

/// Manifest and report artifacts
pub mod report;

/// Variant resolution: variants file, then built-in table
pub mod resolver;

/// Ordered literal substitution per file role
pub mod substitution;

/// Variant configuration model
pub mod variant;
