//! Ordered literal substitution.
//!
//! Every file of the generated tree belongs to at most one [`FileRole`]. Each
//! role owns a [`RuleSet`]: an explicit, ordered list of literal
//! `(search, replacement)` pairs built by pairing the template's vocabulary
//! with the variant's.
//!
//! Rules are applied in one left-to-right pass. At every position the rules
//! are tried in list order and the first one whose search text starts there
//! wins; scanning resumes after the matched text. Replacement output is never
//! rescanned, and a narrower rule listed before a broader one always takes
//! precedence where both could match. With `search == replacement` for every
//! rule the output is byte-identical to the input.

use crate::constants::TEMPLATE_APP;
use crate::error::{Error, Result};
use crate::variant::{EntityRole, VariantConfig};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use indexmap::IndexMap;
use log::{debug, warn};
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Kinds of files the engine rewrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileRole {
    Model,
    View,
    Admin,
    Form,
    Presentation,
}

impl FileRole {
    /// Every role, in processing order.
    pub const ALL: [FileRole; 5] =
        [FileRole::Model, FileRole::View, FileRole::Admin, FileRole::Form, FileRole::Presentation];

    /// Glob matched against paths relative to the destination root.
    pub fn pattern(self) -> String {
        match self {
            FileRole::Model => format!("{TEMPLATE_APP}/models.py"),
            FileRole::View => format!("{TEMPLATE_APP}/views.py"),
            FileRole::Admin => format!("{TEMPLATE_APP}/admin.py"),
            FileRole::Form => format!("{TEMPLATE_APP}/forms.py"),
            FileRole::Presentation => "templates/**/*.html".to_string(),
        }
    }
}

impl fmt::Display for FileRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FileRole::Model => "data model",
            FileRole::View => "view",
            FileRole::Admin => "admin registration",
            FileRole::Form => "form",
            FileRole::Presentation => "presentation",
        };
        f.write_str(name)
    }
}

/// A single literal rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rule {
    pub search: String,
    pub replacement: String,
}

impl Rule {
    pub fn new(search: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self { search: search.into(), replacement: replacement.into() }
    }
}

/// Result of applying a [`RuleSet`] to some content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub content: String,
    /// Whether `content` differs from the input
    pub changed: bool,
    /// Match count per rule, parallel to [`RuleSet::rules`]
    pub hits: Vec<usize>,
}

impl Rewrite {
    pub fn total_hits(&self) -> usize {
        self.hits.iter().sum()
    }
}

/// Ordered rules for one file role.
#[derive(Debug, Clone)]
pub struct RuleSet {
    role: FileRole,
    rules: Vec<Rule>,
    first_bytes: [bool; 256],
}

impl RuleSet {
    /// Creates a rule set, dropping rules with an empty search string.
    pub fn new(role: FileRole, rules: Vec<Rule>) -> Self {
        let rules: Vec<Rule> = rules.into_iter().filter(|r| !r.search.is_empty()).collect();
        let mut first_bytes = [false; 256];
        for rule in &rules {
            first_bytes[rule.search.as_bytes()[0] as usize] = true;
        }
        Self { role, rules, first_bytes }
    }

    /// Builds the rules that turn `template` vocabulary into `variant` vocabulary.
    ///
    /// Code roles get identifier rules only and the presentation role gets
    /// label rules only. Within a code role, declaration forms come before
    /// namespaced lookups, which come before bare identifiers.
    pub fn for_role(role: FileRole, template: &VariantConfig, variant: &VariantConfig) -> Self {
        let pairs = move || {
            EntityRole::ALL
                .into_iter()
                .map(move |entity| (template.renaming(entity), variant.renaming(entity)))
        };
        let mut rules = Vec::new();

        if role == FileRole::Model {
            for (from, to) in pairs() {
                rules.push(Rule::new(
                    format!("class {}(", from.ident),
                    format!("class {}(", to.ident),
                ));
            }
            for (from, to) in pairs() {
                for eq in ["=", " = "] {
                    rules.push(Rule::new(
                        format!("verbose_name_plural{eq}\"{}\"", from.plural),
                        format!("verbose_name_plural{eq}\"{}\"", to.plural),
                    ));
                }
            }
            for (from, to) in pairs() {
                for eq in ["=", " = "] {
                    rules.push(Rule::new(
                        format!("verbose_name{eq}\"{}\"", from.singular),
                        format!("verbose_name{eq}\"{}\"", to.singular),
                    ));
                }
            }
        }

        if role == FileRole::Presentation {
            let (from, to) = (&template.labels, &variant.labels);
            // Longest phrases first so a short caption never splits a longer one.
            for (search, replacement) in [
                (&from.site_title, &to.site_title),
                (&from.site_name, &to.site_name),
                (&from.page_title_list, &to.page_title_list),
                (&from.button_add, &to.button_add),
                (&from.nav_products, &to.nav_products),
                (&from.nav_orders, &to.nav_orders),
            ] {
                rules.push(Rule::new(search.as_str(), replacement.as_str()));
            }
        } else {
            for (from, to) in pairs() {
                rules.push(Rule::new(format!("{}.", from.ident), format!("{}.", to.ident)));
            }
            for (from, to) in pairs() {
                rules.push(Rule::new(from.ident.as_str(), to.ident.as_str()));
            }
        }

        Self::new(role, rules)
    }

    pub fn role(&self) -> FileRole {
        self.role
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Applies the rules in a single pass over `content`.
    pub fn apply(&self, content: &str) -> Rewrite {
        let bytes = content.as_bytes();
        let mut hits = vec![0; self.rules.len()];
        let mut out = String::with_capacity(content.len());
        let mut flushed = 0;
        let mut pos = 0;

        while pos < bytes.len() {
            if !self.first_bytes[bytes[pos] as usize] {
                pos += 1;
                continue;
            }
            let rest = &bytes[pos..];
            match self.rules.iter().position(|r| rest.starts_with(r.search.as_bytes())) {
                Some(index) => {
                    let rule = &self.rules[index];
                    // A match starts on a UTF-8 leading byte, so `pos` is a char boundary.
                    out.push_str(&content[flushed..pos]);
                    out.push_str(&rule.replacement);
                    pos += rule.search.len();
                    flushed = pos;
                    hits[index] += 1;
                }
                None => pos += 1,
            }
        }
        out.push_str(&content[flushed..]);
        let changed = out != content;

        Rewrite { content: out, changed, hits }
    }
}

/// A rule that matched nothing across all files of its role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnmatchedRule {
    pub role: FileRole,
    pub search: String,
}

/// Outcome of a substitution pass over a destination tree.
#[derive(Debug, Default)]
pub struct SubstitutionSummary {
    /// Files processed per role
    pub files_by_role: IndexMap<FileRole, usize>,
    /// Files whose content changed, relative to the destination root
    pub rewritten: Vec<PathBuf>,
    /// Files processed without any change
    pub unchanged: usize,
    /// Rules without a single match in their role
    pub unmatched: Vec<UnmatchedRule>,
    /// Roles no file belonged to
    pub roles_without_files: Vec<FileRole>,
    /// Recoverable errors, in walk order
    pub warnings: Vec<Error>,
}

/// Applies per-role rule sets to the files of a generated tree.
pub struct Substituter {
    rule_sets: IndexMap<FileRole, RuleSet>,
    matcher: GlobSet,
}

impl Substituter {
    /// Builds rule sets and role matchers for rewriting `template` into `variant`.
    ///
    /// # Errors
    /// * `Error::PatternError` if a role pattern fails to compile
    pub fn new(template: &VariantConfig, variant: &VariantConfig) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for role in FileRole::ALL {
            let glob = GlobBuilder::new(&role.pattern())
                .literal_separator(true)
                .build()
                .map_err(|e| Error::PatternError(format!("{role} pattern: {e}")))?;
            builder.add(glob);
        }
        let matcher = builder.build().map_err(|e| Error::PatternError(e.to_string()))?;

        let rule_sets = FileRole::ALL
            .into_iter()
            .map(|role| (role, RuleSet::for_role(role, template, variant)))
            .collect();

        Ok(Self { rule_sets, matcher })
    }

    pub fn rule_sets(&self) -> impl Iterator<Item = &RuleSet> {
        self.rule_sets.values()
    }

    /// The role of a file, given its path relative to the destination root.
    pub fn role_for<P: AsRef<Path>>(&self, relative: P) -> Option<FileRole> {
        self.matcher.matches(relative.as_ref()).into_iter().min().map(|i| FileRole::ALL[i])
    }

    /// Rewrites one file in place with the rules of `role`.
    ///
    /// The file is written back only when its content changes.
    ///
    /// # Errors
    /// * `Error::SubstitutionFailed` if the file cannot be read as UTF-8 or written back
    pub fn rewrite_file<P: AsRef<Path>>(&self, path: P, role: FileRole) -> Result<Rewrite> {
        let path = path.as_ref();
        let failed = |source: std::io::Error| Error::SubstitutionFailed {
            path: path.display().to_string(),
            source,
        };

        let content = fs::read_to_string(path).map_err(failed)?;
        let rewrite = self.rule_sets[&role].apply(&content);
        if rewrite.changed {
            fs::write(path, &rewrite.content).map_err(failed)?;
        }
        Ok(rewrite)
    }

    /// Rewrites every file under `destination` that belongs to a role.
    ///
    /// Failures on individual files are recorded and leave the file as copied.
    pub fn run<P: AsRef<Path>>(&self, destination: P) -> SubstitutionSummary {
        let destination = destination.as_ref();
        let mut summary = SubstitutionSummary::default();
        let mut hits: IndexMap<FileRole, Vec<usize>> = self
            .rule_sets
            .iter()
            .map(|(role, set)| (*role, vec![0; set.rules().len()]))
            .collect();

        for entry in WalkDir::new(destination).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().map(|p| p.display().to_string()).unwrap_or_default();
                    let err = Error::SubstitutionFailed { path, source: e.into() };
                    warn!("{err}");
                    summary.warnings.push(err);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry.path().strip_prefix(destination).unwrap_or(entry.path());
            let Some(role) = self.role_for(relative) else {
                continue;
            };
            *summary.files_by_role.entry(role).or_default() += 1;

            match self.rewrite_file(entry.path(), role) {
                Ok(rewrite) => {
                    if let Some(counts) = hits.get_mut(&role) {
                        counts.iter_mut().zip(&rewrite.hits).for_each(|(c, h)| *c += h);
                    }
                    if rewrite.changed {
                        debug!("Rewrote {} ({role})", relative.display());
                        summary.rewritten.push(relative.to_path_buf());
                    } else {
                        summary.unchanged += 1;
                    }
                }
                Err(err) => {
                    warn!("{err}");
                    summary.warnings.push(err);
                }
            }
        }

        for (role, counts) in hits {
            if !summary.files_by_role.contains_key(&role) {
                summary.roles_without_files.push(role);
                continue;
            }
            let rules = self.rule_sets[&role].rules();
            for (rule, count) in rules.iter().zip(counts) {
                if count == 0 {
                    summary.unmatched.push(UnmatchedRule { role, search: rule.search.clone() });
                }
            }
        }

        summary
    }
}
