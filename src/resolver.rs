//! Variant resolution.
//! Resolves a variant id to a [`VariantConfig`] by asking a chain of
//! [`VariantSource`]s in order: an external variants file first, then the
//! built-in table.

use crate::constants::VARIANT_CONFIG_FILES;
use crate::error::{Error, Result};
use crate::variant::{Renaming, Renamings, UiLabels, VariantConfig, VariantRecord};
use indexmap::IndexMap;
use log::debug;
use std::path::{Path, PathBuf};

/// Result of asking a single source for a variant.
#[derive(Debug)]
pub enum Lookup {
    /// The source defines the variant
    Found(VariantConfig),
    /// The source exists but does not define the variant
    Missing { known: Vec<u32> },
    /// The source could not be located, the next one should be tried
    Unavailable,
}

/// A place variant definitions can come from.
pub trait VariantSource {
    /// Short human-readable name used in logs.
    fn name(&self) -> String;

    /// Looks up a variant by id.
    ///
    /// # Errors
    /// Only for a source that was located but is unusable (unreadable,
    /// malformed or incomplete). A missing source is [`Lookup::Unavailable`].
    fn lookup(&self, id: u32) -> Result<Lookup>;
}

/// Variants read from a YAML or JSON file.
///
/// The file maps ids to flat [`VariantRecord`]s:
///
/// ```yaml
/// 4:
///   theme: Зоомагазин
///   main_model: Pet
///   main_model_verbose: Питомец
///   # ...
/// ```
pub struct FileSource {
    explicit: Option<PathBuf>,
    search_path: Vec<PathBuf>,
}

impl FileSource {
    /// Searches each directory of `search_path` for one of [`VARIANT_CONFIG_FILES`].
    pub fn new(search_path: Vec<PathBuf>) -> Self {
        Self { explicit: None, search_path }
    }

    /// Uses exactly `path`, which must exist.
    pub fn explicit<P: Into<PathBuf>>(path: P) -> Self {
        Self { explicit: Some(path.into()), search_path: Vec::new() }
    }

    /// Returns the variants file to read, if any.
    ///
    /// # Errors
    /// * `Error::ConfigError` if an explicitly given file does not exist
    pub fn locate(&self) -> Result<Option<PathBuf>> {
        if let Some(path) = &self.explicit {
            if !path.is_file() {
                return Err(Error::ConfigError(format!(
                    "variants file '{}' does not exist",
                    path.display()
                )));
            }
            return Ok(Some(path.clone()));
        }

        for dir in &self.search_path {
            for file in VARIANT_CONFIG_FILES {
                let candidate = dir.join(file);
                if candidate.is_file() {
                    return Ok(Some(candidate));
                }
            }
        }
        Ok(None)
    }
}

/// Parses a variants file into an ordered table.
///
/// JSON is used for `.json` files, YAML for everything else.
pub fn load_variants_file<P: AsRef<Path>>(path: P) -> Result<IndexMap<u32, VariantRecord>> {
    let path = path.as_ref();
    debug!("Loading variants from {}", path.display());
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::ConfigError(format!("cannot read '{}': {e}", path.display()))
    })?;

    let is_json = path.extension().is_some_and(|ext| ext == "json");
    let parsed = if is_json {
        serde_json::from_str(&content).map_err(|e| e.to_string())
    } else {
        serde_yaml::from_str(&content).map_err(|e| e.to_string())
    };

    parsed.map_err(|e| Error::ConfigError(format!("invalid '{}': {e}", path.display())))
}

impl VariantSource for FileSource {
    fn name(&self) -> String {
        match &self.explicit {
            Some(path) => format!("variants file '{}'", path.display()),
            None => "variants file".to_string(),
        }
    }

    fn lookup(&self, id: u32) -> Result<Lookup> {
        let Some(path) = self.locate()? else {
            return Ok(Lookup::Unavailable);
        };
        let mut table = load_variants_file(&path)?;
        match table.shift_remove(&id) {
            Some(record) => Ok(Lookup::Found(VariantConfig::from_record(id, record)?)),
            None => Ok(Lookup::Missing { known: table.keys().copied().collect() }),
        }
    }
}

/// The variants shipped with the generator.
#[derive(Debug, Default)]
pub struct BuiltinSource;

impl BuiltinSource {
    pub fn new() -> Self {
        Self
    }
}

impl VariantSource for BuiltinSource {
    fn name(&self) -> String {
        "built-in table".to_string()
    }

    fn lookup(&self, id: u32) -> Result<Lookup> {
        let mut table = builtin_variants();
        match table.shift_remove(&id) {
            Some(config) => Ok(Lookup::Found(config)),
            None => Ok(Lookup::Missing { known: table.keys().copied().collect() }),
        }
    }
}

struct Builtin<'a> {
    theme: &'a str,
    entities: [(&'a str, &'a str, &'a str); 4],
    site_title: &'a str,
    nav_orders: &'a str,
    page_title_list: &'a str,
    button_add: &'a str,
}

impl Builtin<'_> {
    fn into_config(self, id: u32) -> VariantConfig {
        let [main, category, manufacturer, supplier] =
            self.entities.map(|(ident, one, many)| Renaming::new(ident, one, many));
        VariantConfig {
            id,
            theme: self.theme.to_string(),
            labels: UiLabels {
                site_name: self.theme.to_string(),
                site_title: self.site_title.to_string(),
                nav_products: main.plural.clone(),
                nav_orders: self.nav_orders.to_string(),
                page_title_list: self.page_title_list.to_string(),
                button_add: self.button_add.to_string(),
            },
            renamings: Renamings {
                main,
                category,
                manufacturer,
                supplier,
                unit: Renaming::new("Unit", "Единица измерения", "Единицы измерения"),
            },
        }
    }
}

/// The built-in variant table, ordered by id.
pub fn builtin_variants() -> IndexMap<u32, VariantConfig> {
    let table = [
        Builtin {
            theme: "Книжный магазин",
            entities: [
                ("Book", "Книга", "Книги"),
                ("Genre", "Жанр", "Жанры"),
                ("Publisher", "Издательство", "Издательства"),
                ("Supplier", "Поставщик", "Поставщики"),
            ],
            site_title: "Система управления книгами",
            nav_orders: "Заказы",
            page_title_list: "Список книг",
            button_add: "Добавить книгу",
        },
        Builtin {
            theme: "Магазин электроники",
            entities: [
                ("Product", "Товар", "Товары"),
                ("Category", "Категория", "Категории"),
                ("Brand", "Бренд", "Бренды"),
                ("Supplier", "Поставщик", "Поставщики"),
            ],
            site_title: "Система управления товарами",
            nav_orders: "Заказы",
            page_title_list: "Каталог товаров",
            button_add: "Добавить товар",
        },
        Builtin {
            theme: "Медицинский центр",
            entities: [
                ("Doctor", "Врач", "Врачи"),
                ("Specialization", "Специализация", "Специализации"),
                ("Clinic", "Клиника", "Клиники"),
                ("Supplier", "Поставщик", "Поставщики"),
            ],
            site_title: "Система записи к врачам",
            nav_orders: "Записи",
            page_title_list: "Наши врачи",
            button_add: "Добавить врача",
        },
    ];

    table
        .into_iter()
        .zip(1u32..)
        .map(|(builtin, id)| (id, builtin.into_config(id)))
        .collect()
}

/// Asks each source in turn; the first one that knows the id wins.
pub struct Resolver {
    sources: Vec<Box<dyn VariantSource>>,
}

impl Resolver {
    pub fn new(sources: Vec<Box<dyn VariantSource>>) -> Self {
        Self { sources }
    }

    /// The standard chain: a variants file (explicit, or searched for in
    /// `search_path`), then the built-in table.
    pub fn with_defaults(config_file: Option<PathBuf>, search_path: Vec<PathBuf>) -> Self {
        let file_source = match config_file {
            Some(path) => FileSource::explicit(path),
            None => FileSource::new(search_path),
        };
        Self::new(vec![Box::new(file_source), Box::new(BuiltinSource::new())])
    }

    /// Resolves `id` to a config.
    ///
    /// # Errors
    /// * `Error::ConfigNotFound` with every id known to the located sources
    /// * `Error::ConfigError` if a located source is unusable
    pub fn resolve(&self, id: u32) -> Result<VariantConfig> {
        let mut known = Vec::new();

        for source in &self.sources {
            match source.lookup(id)? {
                Lookup::Found(config) => {
                    debug!("Variant {id} resolved from {}", source.name());
                    return Ok(config);
                }
                Lookup::Missing { known: ids } => {
                    debug!("Variant {id} is not defined in {}", source.name());
                    known.extend(ids);
                }
                Lookup::Unavailable => debug!("{} is not available", source.name()),
            }
        }

        known.sort_unstable();
        known.dedup();
        Err(Error::ConfigNotFound { id, known })
    }
}
