//! Named text templates for the generator's own artifacts.
//! The template tree being replicated is never rendered, only rewritten.
use crate::error::{Error, Result};
use minijinja::{Environment, UndefinedBehavior};

/// Renders a registered template by name.
pub trait TemplateRenderer {
    /// # Errors
    /// * `Error::MinijinjaError` if `name` is unknown or a variable is undefined
    fn render(&self, name: &str, context: &serde_json::Value) -> Result<String>;
}

/// MiniJinja environment holding the registered templates.
pub struct MiniJinjaRenderer {
    env: Environment<'static>,
}

impl MiniJinjaRenderer {
    /// An empty environment. Trailing newlines are kept and undefined
    /// variables are errors.
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_keep_trailing_newline(true);
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        Self { env }
    }

    /// Registers `source` under `name`, parsing it immediately.
    pub fn with_template(mut self, name: &'static str, source: &'static str) -> Result<Self> {
        self.env.add_template(name, source).map_err(Error::MinijinjaError)?;
        Ok(self)
    }
}

impl Default for MiniJinjaRenderer {
    fn default() -> Self {
        MiniJinjaRenderer::new()
    }
}

impl TemplateRenderer for MiniJinjaRenderer {
    fn render(&self, name: &str, context: &serde_json::Value) -> Result<String> {
        let tmpl = self.env.get_template(name).map_err(Error::MinijinjaError)?;
        tmpl.render(context).map_err(Error::MinijinjaError)
    }
}
