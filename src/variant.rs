//! Variant configuration model.
//!
//! A variant is a numbered theme for the template project: five entity
//! renamings (one per template role) plus the free-text UI labels. The
//! template tree's own vocabulary is modelled as a variant too, see
//! [`VariantConfig::template`], so substitution rules are always built by
//! pairing two configs.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The model roles of the template application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityRole {
    Main,
    Category,
    Manufacturer,
    Supplier,
    Unit,
}

impl EntityRole {
    /// Every role, in the order rules and reports visit them.
    pub const ALL: [EntityRole; 5] = [
        EntityRole::Main,
        EntityRole::Category,
        EntityRole::Manufacturer,
        EntityRole::Supplier,
        EntityRole::Unit,
    ];

    /// Key prefix used by the flat variants file format.
    pub fn key(self) -> &'static str {
        match self {
            EntityRole::Main => "main_model",
            EntityRole::Category => "category",
            EntityRole::Manufacturer => "manufacturer",
            EntityRole::Supplier => "supplier",
            EntityRole::Unit => "unit",
        }
    }
}

impl fmt::Display for EntityRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityRole::Main => "main model",
            EntityRole::Category => "category model",
            EntityRole::Manufacturer => "manufacturer model",
            EntityRole::Supplier => "supplier model",
            EntityRole::Unit => "unit model",
        };
        f.write_str(name)
    }
}

/// New names for one template entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Renaming {
    /// Type identifier used in code, e.g. `Book`
    pub ident: String,
    /// Singular display label
    pub singular: String,
    /// Plural display label
    pub plural: String,
}

impl Renaming {
    pub fn new(
        ident: impl Into<String>,
        singular: impl Into<String>,
        plural: impl Into<String>,
    ) -> Self {
        Self { ident: ident.into(), singular: singular.into(), plural: plural.into() }
    }
}

/// One renaming per [`EntityRole`]. A struct rather than a map, so a
/// resolved config can never lack a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Renamings {
    pub main: Renaming,
    pub category: Renaming,
    pub manufacturer: Renaming,
    pub supplier: Renaming,
    pub unit: Renaming,
}

impl Renamings {
    pub fn get(&self, role: EntityRole) -> &Renaming {
        match role {
            EntityRole::Main => &self.main,
            EntityRole::Category => &self.category,
            EntityRole::Manufacturer => &self.manufacturer,
            EntityRole::Supplier => &self.supplier,
            EntityRole::Unit => &self.unit,
        }
    }

    /// Iterates renamings in [`EntityRole::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityRole, &Renaming)> {
        EntityRole::ALL.into_iter().map(move |role| (role, self.get(role)))
    }
}

/// Free-text labels shown in the presentation templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UiLabels {
    pub site_name: String,
    pub site_title: String,
    pub nav_products: String,
    pub nav_orders: String,
    pub page_title_list: String,
    pub button_add: String,
}

/// A fully resolved variant. Read-only once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantConfig {
    pub id: u32,
    pub theme: String,
    pub renamings: Renamings,
    pub labels: UiLabels,
}

/// Id reserved for the template's own vocabulary.
pub const TEMPLATE_VARIANT_ID: u32 = 0;

impl VariantConfig {
    /// The placeholders as they appear in the template tree.
    ///
    /// Used as the search side of every rule set. Passing it as the variant
    /// too yields rules whose search equals their replacement.
    pub fn template() -> Self {
        Self {
            id: TEMPLATE_VARIANT_ID,
            theme: "Магазин обуви".to_string(),
            renamings: Renamings {
                main: Renaming::new("Product", "Товар", "Товары"),
                category: Renaming::new("Category", "Категория", "Категории"),
                manufacturer: Renaming::new("Brand", "Бренд", "Бренды"),
                supplier: Renaming::new("Supplier", "Поставщик", "Поставщики"),
                unit: Renaming::new("Unit", "Единица измерения", "Единицы измерения"),
            },
            labels: UiLabels {
                site_name: "Магазин обуви".to_string(),
                site_title: "Система управления товарами".to_string(),
                nav_products: "Товары".to_string(),
                nav_orders: "Заказы".to_string(),
                page_title_list: "Список товаров".to_string(),
                button_add: "Добавить товар".to_string(),
            },
        }
    }

    pub fn renaming(&self, role: EntityRole) -> &Renaming {
        self.renamings.get(role)
    }

    /// Builds a config from a flat record, validating identifiers.
    ///
    /// # Errors
    /// * `Error::ConfigError` if any entity identifier is not a valid identifier
    pub fn from_record(id: u32, record: VariantRecord) -> Result<Self> {
        let template = Self::template();
        let unit_singular = record.unit_verbose.unwrap_or(template.renamings.unit.singular);
        let unit_plural = record.unit_plural.unwrap_or(template.renamings.unit.plural);

        let config = Self {
            id,
            theme: record.theme,
            renamings: Renamings {
                main: Renaming::new(
                    record.main_model,
                    record.main_model_verbose,
                    record.main_model_plural,
                ),
                category: Renaming::new(
                    record.category_model,
                    record.category_verbose,
                    record.category_plural,
                ),
                manufacturer: Renaming::new(
                    record.manufacturer_model,
                    record.manufacturer_verbose,
                    record.manufacturer_plural,
                ),
                supplier: Renaming::new(
                    record.supplier_model,
                    record.supplier_verbose,
                    record.supplier_plural,
                ),
                unit: Renaming::new(record.unit_model, unit_singular, unit_plural),
            },
            labels: UiLabels {
                site_name: record.site_name,
                site_title: record.site_title,
                nav_products: record.nav_products,
                nav_orders: record.nav_orders,
                page_title_list: record.page_title_list,
                button_add: record.button_add,
            },
        };

        for (role, renaming) in config.renamings.iter() {
            if !is_identifier(&renaming.ident) {
                let field = if role == EntityRole::Main {
                    role.key().to_string()
                } else {
                    format!("{}_model", role.key())
                };
                return Err(Error::ConfigError(format!(
                    "variant {id}: '{field}' must be a valid identifier, got '{}'",
                    renaming.ident
                )));
            }
        }

        Ok(config)
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Flat on-disk form of a variant, as found in `variants.yaml`.
///
/// Every key except `unit_verbose` and `unit_plural` is required; serde
/// reports the first missing one by name.
#[derive(Debug, Clone, Deserialize)]
pub struct VariantRecord {
    pub theme: String,
    pub main_model: String,
    pub main_model_verbose: String,
    pub main_model_plural: String,
    pub category_model: String,
    pub category_verbose: String,
    pub category_plural: String,
    pub manufacturer_model: String,
    pub manufacturer_verbose: String,
    pub manufacturer_plural: String,
    pub supplier_model: String,
    pub supplier_verbose: String,
    pub supplier_plural: String,
    pub unit_model: String,
    #[serde(default)]
    pub unit_verbose: Option<String>,
    #[serde(default)]
    pub unit_plural: Option<String>,
    pub site_name: String,
    pub site_title: String,
    pub nav_products: String,
    pub nav_orders: String,
    pub page_title_list: String,
    pub button_add: String,
}
