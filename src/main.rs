//! variant-gen entry point.
//! Parses arguments, sets up logging, runs the generation and prints the
//! next steps for the generated project.

use variant_gen::{
    cli::get_args,
    constants::TEMPLATE_APP,
    error::{default_error_handler, Result},
    generator::{generate, GenerateOptions},
    logger::init_logger,
};

/// Main application entry point.
fn main() {
    let args = get_args();
    init_logger(args.verbose);

    if let Err(err) = run(args.into()) {
        default_error_handler(err);
    }
}

fn run(options: GenerateOptions) -> Result<()> {
    let outcome = generate(&options)?;
    let destination = outcome.destination.display();

    println!("\nVariant generated in: {destination}");
    println!("Theme: {}", outcome.variant.theme);
    println!(
        "Files copied: {}, rewritten: {}, warnings: {}",
        outcome.replication.copied,
        outcome.substitution.rewritten.len(),
        outcome.warning_count()
    );
    if outcome.warning_count() > 0 {
        if let Some(report) = outcome.report_path() {
            println!("See {} for details.", report.display());
        }
    }

    println!("\nNext steps:");
    println!("   1. cd {destination}");
    println!("   2. python -m venv venv");
    println!("   3. source venv/bin/activate  # or venv\\Scripts\\activate on Windows");
    println!("   4. pip install -r requirements.txt");
    println!("   5. python manage.py makemigrations {TEMPLATE_APP}");
    println!("   6. python manage.py migrate");
    println!("   7. python manage.py createsuperuser");
    println!("   8. python manage.py runserver");
    Ok(())
}
