//! Variant manifest and generation report.
//!
//! Both artifacts are plain text written at the destination root for a human
//! to audit a run. Nothing reads them back. Failing to write either one is
//! logged and returned, never raised.

use crate::constants::{MANIFEST_FILE, REPORT_FILE};
use crate::error::{Error, Result};
use crate::renderer::{MiniJinjaRenderer, TemplateRenderer};
use crate::replicator::ReplicationSummary;
use crate::substitution::SubstitutionSummary;
use crate::variant::VariantConfig;
use chrono::{DateTime, Local};
use log::{error, info};
use serde_json::json;
use std::path::Path;

const MANIFEST_TEMPLATE: &str = r#"VARIANT MANIFEST

variant = {{ id }}
theme = "{{ theme }}"
generated_at = "{{ generated_at }}"

[entities]
{% for e in entities %}{{ e.role }} = {{ e.ident }} ({{ e.singular }} / {{ e.plural }})
{% endfor %}
[labels]
{% for l in labels %}{{ l.key }} = "{{ l.value }}"
{% endfor %}"#;

const REPORT_TEMPLATE: &str = r#"GENERATION REPORT

variant = {{ id }}
theme = "{{ theme }}"
generated_at = "{{ generated_at }}"
source = "{{ source }}"
destination = "{{ destination }}"

[files]
eligible = {{ eligible }}
copied = {{ copied }}
failed = {{ failed }}
excluded = {{ excluded }}
directories = {{ directories }}
rewritten = {{ rewritten|length }}
{% for path in rewritten %}  ~ {{ path }}
{% endfor %}
[warnings]
count = {{ warnings|length }}
{% for w in warnings %}  - {{ w }}
{% endfor %}{% if report_unmatched %}
[unmatched]
{% for u in unmatched %}  ? {{ u }}
{% endfor %}{% endif %}"#;

/// A renderer with the manifest and report templates registered under
/// their file names.
pub fn artifact_renderer() -> Result<MiniJinjaRenderer> {
    MiniJinjaRenderer::new()
        .with_template(MANIFEST_FILE, MANIFEST_TEMPLATE)?
        .with_template(REPORT_FILE, REPORT_TEMPLATE)
}

/// Everything the report describes.
pub struct RunRecord<'a> {
    pub variant: &'a VariantConfig,
    pub source: &'a Path,
    pub destination: &'a Path,
    pub replication: &'a ReplicationSummary,
    pub substitution: &'a SubstitutionSummary,
    pub generated_at: DateTime<Local>,
}

/// Writes the manifest and the report.
pub struct ReportEmitter<'a> {
    renderer: &'a dyn TemplateRenderer,
    report_unmatched: bool,
}

impl<'a> ReportEmitter<'a> {
    /// # Arguments
    /// * `renderer` - Engine holding the templates of [`artifact_renderer`]
    /// * `report_unmatched` - List rules that matched nothing in the report
    pub fn new(renderer: &'a dyn TemplateRenderer, report_unmatched: bool) -> Self {
        Self { renderer, report_unmatched }
    }

    /// Renders the variant manifest.
    pub fn manifest(
        &self,
        variant: &VariantConfig,
        generated_at: &DateTime<Local>,
    ) -> Result<String> {
        let entities: Vec<_> = variant
            .renamings
            .iter()
            .map(|(role, r)| {
                json!({
                    "role": role,
                    "ident": r.ident,
                    "singular": r.singular,
                    "plural": r.plural,
                })
            })
            .collect();
        let l = &variant.labels;
        let labels: Vec<_> = [
            ("site_name", &l.site_name),
            ("site_title", &l.site_title),
            ("nav_products", &l.nav_products),
            ("nav_orders", &l.nav_orders),
            ("page_title_list", &l.page_title_list),
            ("button_add", &l.button_add),
        ]
        .into_iter()
        .map(|(key, value)| json!({ "key": key, "value": value }))
        .collect();

        let context = json!({
            "id": variant.id,
            "theme": variant.theme,
            "generated_at": generated_at.format("%d.%m.%Y %H:%M").to_string(),
            "entities": entities,
            "labels": labels,
        });
        self.renderer.render(MANIFEST_FILE, &context)
    }

    /// Renders the generation report.
    pub fn report(&self, run: &RunRecord<'_>) -> Result<String> {
        let (replication, substitution) = (run.replication, run.substitution);
        let warnings: Vec<String> = replication
            .warnings
            .iter()
            .chain(&substitution.warnings)
            .map(ToString::to_string)
            .collect();
        let rewritten: Vec<String> =
            substitution.rewritten.iter().map(|p| p.display().to_string()).collect();
        let unmatched: Vec<String> = substitution
            .unmatched
            .iter()
            .map(|u| format!("{}: {}", u.role, u.search))
            .chain(substitution.roles_without_files.iter().map(|r| format!("{r}: no files")))
            .collect();

        let context = json!({
            "id": run.variant.id,
            "theme": run.variant.theme,
            "generated_at": run.generated_at.format("%d.%m.%Y %H:%M:%S").to_string(),
            "source": run.source.display().to_string(),
            "destination": run.destination.display().to_string(),
            "eligible": replication.eligible,
            "copied": replication.copied,
            "failed": replication.failed,
            "excluded": replication.excluded,
            "directories": replication.directories,
            "rewritten": rewritten,
            "warnings": warnings,
            "report_unmatched": self.report_unmatched,
            "unmatched": unmatched,
        });
        self.renderer.render(REPORT_FILE, &context)
    }

    /// Writes both artifacts into the destination root.
    ///
    /// # Returns
    /// * `Vec<Error>` - One `Error::ReportWriteFailed` per artifact that could not be written
    pub fn emit(&self, run: &RunRecord<'_>) -> Vec<Error> {
        let artifacts = [
            (MANIFEST_FILE, self.manifest(run.variant, &run.generated_at)),
            (REPORT_FILE, self.report(run)),
        ];

        let mut failures = Vec::new();
        for (name, rendered) in artifacts {
            let path = run.destination.join(name);
            let written = rendered
                .map_err(|e| e.to_string())
                .and_then(|text| std::fs::write(&path, text).map_err(|e| e.to_string()));
            match written {
                Ok(()) => info!("{name} written"),
                Err(reason) => {
                    let err =
                        Error::ReportWriteFailed { path: path.display().to_string(), reason };
                    error!("{err}");
                    failures.push(err);
                }
            }
        }
        failures
    }
}
