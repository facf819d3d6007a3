//! Generation run orchestration.
//! Sequences config resolution, destination preparation, replication,
//! substitution and reporting. Only the first two stages can fail a run;
//! later stages record warnings and carry on.

use crate::constants::{OUTPUT_DIR_PREFIX, REPORT_FILE, TEMPLATE_APP};
use crate::error::{Error, Result};
use crate::ignore::ExclusionPolicy;
use crate::replicator::{replicate, ReplicationSummary};
use crate::report::{artifact_renderer, ReportEmitter, RunRecord};
use crate::resolver::Resolver;
use crate::substitution::{SubstitutionSummary, Substituter};
use crate::variant::VariantConfig;
use log::{debug, error, info, warn};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Stages of a run, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ResolvingConfig,
    PreparingDestination,
    Replicating,
    Substituting,
    Reporting,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::ResolvingConfig => "resolving config",
            Stage::PreparingDestination => "preparing destination",
            Stage::Replicating => "replicating",
            Stage::Substituting => "substituting",
            Stage::Reporting => "reporting",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Inputs of a run.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Variant id, positive
    pub variant: u32,
    /// Root of the template tree
    pub source: PathBuf,
    /// Destination root; see [`default_output_dir`] when not given
    pub output_dir: Option<PathBuf>,
    /// Explicit variants file, bypassing the search path
    pub config_file: Option<PathBuf>,
    /// List rules that matched nothing in the report
    pub report_unmatched: bool,
}

impl GenerateOptions {
    pub fn new<P: Into<PathBuf>>(variant: u32, source: P) -> Self {
        Self {
            variant,
            source: source.into(),
            output_dir: None,
            config_file: None,
            report_unmatched: false,
        }
    }

    /// The destination this run writes to.
    pub fn destination(&self) -> PathBuf {
        match &self.output_dir {
            Some(dir) => dir.clone(),
            None => default_output_dir(&self.source, self.variant),
        }
    }
}

/// `variant_NN` next to the source root.
pub fn default_output_dir<P: AsRef<Path>>(source: P, variant: u32) -> PathBuf {
    let name = format!("{OUTPUT_DIR_PREFIX}{variant:02}");
    let source = source.as_ref();
    match std::path::absolute(source).ok().as_deref().and_then(Path::parent) {
        Some(parent) => parent.join(name),
        None => source.join("..").join(name),
    }
}

/// What a completed run produced.
#[derive(Debug)]
pub struct GenerationOutcome {
    pub variant: VariantConfig,
    pub destination: PathBuf,
    pub replication: ReplicationSummary,
    pub substitution: SubstitutionSummary,
    /// Manifest or report files that could not be written
    pub report_failures: Vec<Error>,
}

impl GenerationOutcome {
    /// Recoverable problems across all stages.
    pub fn warning_count(&self) -> usize {
        self.replication.warnings.len()
            + self.substitution.warnings.len()
            + self.report_failures.len()
    }

    /// Path of the generation report, or `None` if it was not written.
    pub fn report_path(&self) -> Option<PathBuf> {
        let path = self.destination.join(REPORT_FILE);
        let written = self.report_failures.iter().all(|e| match e {
            Error::ReportWriteFailed { path: failed, .. } => Path::new(failed) != path,
            _ => false,
        });
        written.then_some(path)
    }
}

fn enter(stage: Stage) {
    debug!("Stage: {stage}");
}

fn preparation_failed(path: &Path, reason: impl fmt::Display) -> Error {
    Error::DestinationPreparationFailed {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

/// Absolute form of `path` with symlinks and `..` resolved, even when its
/// trailing components do not exist yet.
fn resolve_path(path: &Path) -> std::io::Result<PathBuf> {
    let mut existing = std::path::absolute(path)?;
    let mut tail = Vec::new();
    let base = loop {
        match fs::canonicalize(&existing) {
            Ok(base) => break base,
            Err(e) => {
                let Some(last) = existing.components().next_back() else {
                    return Err(e);
                };
                tail.push(last.as_os_str().to_os_string());
                if !existing.pop() {
                    return Err(e);
                }
            }
        }
    };

    let mut resolved = base;
    let mut climbed = false;
    for part in tail.iter().rev() {
        if part == ".." {
            resolved.pop();
            climbed = true;
        } else if part != "." {
            resolved.push(part);
        }
    }
    // Components after a `..` may exist and be symlinks themselves
    if climbed {
        resolve_path(&resolved)
    } else {
        Ok(resolved)
    }
}

/// Wipes and re-creates `destination`, refusing paths that overlap `source`.
///
/// # Errors
/// * `Error::DestinationPreparationFailed` on overlap or a filesystem failure
pub fn prepare_destination(source: &Path, destination: &Path) -> Result<()> {
    let source_abs = fs::canonicalize(source).map_err(|e| {
        preparation_failed(destination, format!("source '{}': {e}", source.display()))
    })?;
    let destination_abs =
        resolve_path(destination).map_err(|e| preparation_failed(destination, e))?;

    if destination_abs.starts_with(&source_abs) || source_abs.starts_with(&destination_abs) {
        return Err(preparation_failed(destination, "destination overlaps the source tree"));
    }

    if destination.exists() {
        warn!("Directory '{}' already exists. Removing it.", destination.display());
        fs::remove_dir_all(destination).map_err(|e| preparation_failed(destination, e))?;
    }
    fs::create_dir_all(destination).map_err(|e| preparation_failed(destination, e))?;
    info!("Created directory '{}'", destination.display());
    Ok(())
}

/// Makes sure the template app keeps an importable, empty migrations package.
fn ensure_migrations_package(destination: &Path) -> std::io::Result<()> {
    let migrations = destination.join(TEMPLATE_APP).join("migrations");
    if !destination.join(TEMPLATE_APP).is_dir() {
        return Ok(());
    }
    fs::create_dir_all(&migrations)?;
    let init = migrations.join("__init__.py");
    if !init.exists() {
        fs::write(init, "")?;
    }
    Ok(())
}

/// Runs a full generation with the standard resolver chain.
pub fn generate(options: &GenerateOptions) -> Result<GenerationOutcome> {
    let mut search_path = vec![options.source.clone()];
    if let Ok(cwd) = std::env::current_dir() {
        search_path.push(cwd);
    }
    let resolver = Resolver::with_defaults(options.config_file.clone(), search_path);
    generate_with(&resolver, options)
}

/// Runs a full generation, resolving the variant through `resolver`.
///
/// # Errors
/// * `Error::ConfigNotFound` / `Error::ConfigError` while resolving; nothing is written
/// * `Error::PatternError` for an invalid `.variantignore`; nothing is written
/// * `Error::DestinationPreparationFailed` if the destination or one of its
///   directories cannot be created
pub fn generate_with(resolver: &Resolver, options: &GenerateOptions) -> Result<GenerationOutcome> {
    enter(Stage::ResolvingConfig);
    let variant = resolver.resolve(options.variant)?;
    info!("Generating variant {}: {}", variant.id, variant.theme);

    enter(Stage::PreparingDestination);
    let source = options.source.as_path();
    let destination = options.destination();
    let policy = ExclusionPolicy::load(source)?;
    let substituter = Substituter::new(&VariantConfig::template(), &variant)?;
    prepare_destination(source, &destination)?;

    enter(Stage::Replicating);
    info!("Copying project files...");
    let replication = replicate(source, &destination, &policy)?;
    info!("Copied files: {}", replication.copied);

    enter(Stage::Substituting);
    info!("Rewriting variant files...");
    let mut substitution = substituter.run(&destination);
    if let Err(e) = ensure_migrations_package(&destination) {
        let err = Error::SubstitutionFailed {
            path: destination.join(TEMPLATE_APP).join("migrations").display().to_string(),
            source: e,
        };
        warn!("{err}");
        substitution.warnings.push(err);
    }
    for file in &substitution.rewritten {
        info!("{} updated", file.display());
    }
    let unmatched = substitution
        .unmatched
        .iter()
        .map(|u| format!("{}: '{}'", u.role, u.search))
        .chain(substitution.roles_without_files.iter().map(|r| format!("{r}: no files")));
    for line in unmatched {
        if options.report_unmatched {
            warn!("Unmatched rule {line}");
        } else {
            debug!("Unmatched rule {line}");
        }
    }

    enter(Stage::Reporting);
    let run = RunRecord {
        variant: &variant,
        source,
        destination: &destination,
        replication: &replication,
        substitution: &substitution,
        generated_at: chrono::Local::now(),
    };
    let report_failures = match artifact_renderer() {
        Ok(renderer) => ReportEmitter::new(&renderer, options.report_unmatched).emit(&run),
        Err(e) => {
            error!("{e}");
            vec![e]
        }
    };

    enter(Stage::Done);
    Ok(GenerationOutcome { variant, destination, replication, substitution, report_failures })
}
