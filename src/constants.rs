//! Common constants used throughout variant-gen.

/// External variant configuration file names, in lookup order
pub const VARIANT_CONFIG_FILES: [&str; 3] = ["variants.yaml", "variants.yml", "variants.json"];

/// Extra exclusion patterns file, read from the source root
pub const IGNORE_FILE: &str = ".variantignore";

/// Variant manifest written at the destination root
pub const MANIFEST_FILE: &str = "VARIANT_INFO.txt";

/// Generation report written at the destination root
pub const REPORT_FILE: &str = "GENERATION_REPORT.txt";

/// Prefix of the default destination directory name
pub const OUTPUT_DIR_PREFIX: &str = "variant_";

/// The template application whose files carry the model placeholders
pub const TEMPLATE_APP: &str = "products";
