use chrono::{Local, TimeZone};
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use variant_gen::constants::{MANIFEST_FILE, REPORT_FILE};
use variant_gen::error::Error;
use variant_gen::renderer::{MiniJinjaRenderer, TemplateRenderer};
use variant_gen::replicator::ReplicationSummary;
use variant_gen::report::{artifact_renderer, ReportEmitter, RunRecord};
use variant_gen::resolver::builtin_variants;
use variant_gen::substitution::{FileRole, SubstitutionSummary, UnmatchedRule};
use variant_gen::variant::VariantConfig;

fn book_store() -> VariantConfig {
    builtin_variants().shift_remove(&1).unwrap()
}

fn replication() -> ReplicationSummary {
    ReplicationSummary {
        eligible: 12,
        copied: 11,
        failed: 1,
        excluded: 4,
        directories: 5,
        warnings: vec![Error::FileCopyFailed {
            path: "static/logo.png".to_string(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
        }],
    }
}

fn substitution() -> SubstitutionSummary {
    SubstitutionSummary {
        rewritten: vec![PathBuf::from("products/models.py")],
        unchanged: 1,
        unmatched: vec![UnmatchedRule {
            role: FileRole::Model,
            search: "class Unit(".to_string(),
        }],
        roles_without_files: vec![FileRole::Form],
        ..Default::default()
    }
}

fn record<'a>(
    variant: &'a VariantConfig,
    destination: &'a Path,
    replication: &'a ReplicationSummary,
    substitution: &'a SubstitutionSummary,
) -> RunRecord<'a> {
    RunRecord {
        variant,
        source: Path::new("/work/template"),
        destination,
        replication,
        substitution,
        generated_at: Local.with_ymd_and_hms(2026, 3, 14, 9, 5, 7).unwrap(),
    }
}

#[test]
fn test_minijinja_renderer() {
    let renderer = MiniJinjaRenderer::new()
        .with_template("greeting", "Hello {{ name }}!")
        .unwrap()
        .with_template("value", "Value: {{ value }}\n")
        .unwrap();
    let context = serde_json::json!({ "name": "test", "value": 42 });

    assert_eq!(renderer.render("greeting", &context).unwrap(), "Hello test!");
    assert_eq!(renderer.render("value", &context).unwrap(), "Value: 42\n");
    assert!(renderer.render("greeting", &serde_json::json!({})).is_err());
    assert!(renderer.render("unknown", &context).is_err());
    assert!(MiniJinjaRenderer::new().with_template("broken", "{% if %}").is_err());
}

#[test]
fn test_manifest_content() {
    let renderer = artifact_renderer().unwrap();
    let emitter = ReportEmitter::new(&renderer, false);
    let variant = book_store();
    let generated_at = Local.with_ymd_and_hms(2026, 3, 14, 9, 5, 7).unwrap();

    let manifest = emitter.manifest(&variant, &generated_at).unwrap();

    assert!(manifest.starts_with("VARIANT MANIFEST\n"));
    assert!(manifest.contains("variant = 1\n"));
    assert!(manifest.contains("theme = \"Книжный магазин\"\n"));
    assert!(manifest.contains("generated_at = \"14.03.2026 09:05\"\n"));
    assert!(manifest.contains("main = Book (Книга / Книги)\n"));
    assert!(manifest.contains("category = Genre (Жанр / Жанры)\n"));
    assert!(manifest.contains("manufacturer = Publisher (Издательство / Издательства)\n"));
    assert!(manifest.contains("button_add = \"Добавить книгу\"\n"));
}

#[test]
fn test_report_content() {
    let renderer = artifact_renderer().unwrap();
    let (variant, replication, substitution) = (book_store(), replication(), substitution());
    let run = record(&variant, Path::new("/work/variant_01"), &replication, &substitution);

    let report = ReportEmitter::new(&renderer, false).report(&run).unwrap();

    assert!(report.contains("generated_at = \"14.03.2026 09:05:07\"\n"));
    assert!(report.contains("eligible = 12\ncopied = 11\nfailed = 1\nexcluded = 4\ndirectories = 5\n"));
    assert!(report.contains("rewritten = 1\n  ~ products/models.py\n"));
    assert!(report.contains("count = 1\n  - Failed to copy 'static/logo.png': permission denied.\n"));
    assert!(!report.contains("[unmatched]"));

    let report = ReportEmitter::new(&renderer, true).report(&run).unwrap();
    assert!(report.contains("[unmatched]\n  ? data model: class Unit(\n  ? form: no files\n"));
}

#[test]
fn test_emit_writes_both_artifacts() {
    let dir = TempDir::new().unwrap();
    let renderer = artifact_renderer().unwrap();
    let (variant, replication, substitution) = (book_store(), replication(), substitution());
    let run = record(&variant, dir.path(), &replication, &substitution);

    let failures = ReportEmitter::new(&renderer, false).emit(&run);

    assert!(failures.is_empty());
    let manifest = std::fs::read_to_string(dir.path().join(MANIFEST_FILE)).unwrap();
    assert!(manifest.contains("Книжный магазин"));
    assert!(dir.path().join(REPORT_FILE).is_file());
}

#[test]
fn test_emit_failures_are_returned_not_raised() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("gone");
    let renderer = artifact_renderer().unwrap();
    let (variant, replication, substitution) = (book_store(), replication(), substitution());
    let run = record(&variant, &missing, &replication, &substitution);

    let failures = ReportEmitter::new(&renderer, false).emit(&run);

    assert_eq!(failures.len(), 2);
    assert!(failures.iter().all(|e| matches!(e, Error::ReportWriteFailed { .. })));
}
