//! Command line of `variant-gen`.

use crate::generator::GenerateOptions;
use clap::{error::ErrorKind, CommandFactory, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "variant-gen: generates a themed variant of a template project",
    long_about = None
)]
pub struct Args {
    /// Variant number
    #[arg(value_name = "VARIANT", value_parser = clap::value_parser!(u32).range(1..))]
    pub variant: u32,

    /// Directory for the generated project (default: variant_<NN> next to the source)
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Root of the template project
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub source: PathBuf,

    /// Variants file to use instead of searching for variants.yaml
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// List substitution rules that matched nothing in the generation report
    #[arg(long)]
    pub report_unmatched: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,
}

impl From<Args> for GenerateOptions {
    fn from(args: Args) -> Self {
        Self {
            variant: args.variant,
            source: args.source,
            output_dir: args.output_dir,
            config_file: args.config,
            report_unmatched: args.report_unmatched,
        }
    }
}

const SHORT_HELP: &str = "{about-section}
{usage-heading} {usage}

{all-args}
{after-help}
";

/// Parses the command line.
///
/// A bare invocation prints the short help and exits with status 1; other
/// argument errors go through clap's own reporting.
pub fn get_args() -> Args {
    Args::try_parse().unwrap_or_else(|e| {
        if e.kind() != ErrorKind::MissingRequiredArgument {
            e.exit();
        }
        let _ = Args::command().help_template(SHORT_HELP).print_help();
        std::process::exit(1)
    })
}
