//! Template rendering capability.
//!
//! The renderer only needs one thing from a template engine: turn a template
//! name plus page data into a string. [`TemplateEngine`] captures that, and
//! [`TeraEngine`] implements it on top of [Tera](https://keats.github.io/tera/).
//!
//! ## Template Functions
//!
//! Every `TeraEngine` exposes `get_data` to its templates, backed by the same
//! [`DataLoader`] the renderer decodes pages with:
//!
//! ```text
//! {% set menu = get_data(path="shared/menu.yml") %}
//! {% for item in menu.items %}<a href="{{ item.url }}">{{ item.title }}</a>{% endfor %}
//! ```
//!
//! Paths are relative to the origin directory. Further functions can be added
//! with [`TeraEngine::register_function`].

use crate::decode::{DataLoader, PageData};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tera::{Context, Tera, Value};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Template load error: {0}")]
    Load(String),
    #[error("Template '{0}' not found")]
    NotFound(String),
    #[error("Render error for '{template}': {message}")]
    Render { template: String, message: String },
}

/// Renders a named template against page data.
pub trait TemplateEngine {
    fn render(&self, name: &str, data: &PageData) -> Result<String, TemplateError>;
}

impl<E: TemplateEngine + ?Sized> TemplateEngine for Arc<E> {
    fn render(&self, name: &str, data: &PageData) -> Result<String, TemplateError> {
        (**self).render(name, data)
    }
}

/// Tera-backed engine with the `get_data` function registered.
#[derive(Debug)]
pub struct TeraEngine {
    tera: Tera,
}

impl TeraEngine {
    /// Load every file below `templates_dir`, named by its relative path.
    pub fn load(templates_dir: &Path, loader: Arc<DataLoader>) -> Result<Self, TemplateError> {
        if !templates_dir.is_dir() {
            return Err(TemplateError::Load(format!(
                "templates directory {} does not exist",
                templates_dir.display()
            )));
        }
        let glob = templates_dir.join("**").join("*");
        let tera = Tera::new(&glob.to_string_lossy())
            .map_err(|e| TemplateError::Load(error_chain(&e)))?;
        Ok(Self::with_tera(tera, loader))
    }

    /// Build an engine from in-memory `(name, source)` pairs.
    pub fn from_raw(templates: &[(&str, &str)], loader: Arc<DataLoader>) -> Result<Self, TemplateError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(templates.iter().copied())
            .map_err(|e| TemplateError::Load(error_chain(&e)))?;
        Ok(Self::with_tera(tera, loader))
    }

    fn with_tera(mut tera: Tera, loader: Arc<DataLoader>) -> Self {
        tera.register_function("get_data", get_data_function(loader));
        Self { tera }
    }

    /// Expose an extra function to templates.
    pub fn register_function<F: tera::Function + 'static>(&mut self, name: &str, function: F) {
        self.tera.register_function(name, function);
    }

    /// Names of all loaded templates, sorted.
    pub fn template_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tera.get_template_names().collect();
        names.sort_unstable();
        names
    }

    fn has_template(&self, name: &str) -> bool {
        self.tera.get_template_names().any(|n| n == name)
    }
}

impl TemplateEngine for TeraEngine {
    fn render(&self, name: &str, data: &PageData) -> Result<String, TemplateError> {
        if !self.has_template(name) {
            return Err(TemplateError::NotFound(name.to_string()));
        }
        let render_error = |e: tera::Error| TemplateError::Render {
            template: name.to_string(),
            message: error_chain(&e),
        };
        let context = Context::from_serialize(data).map_err(render_error)?;
        self.tera.render(name, &context).map_err(render_error)
    }
}

fn get_data_function(loader: Arc<DataLoader>) -> impl tera::Function {
    move |args: &HashMap<String, Value>| -> tera::Result<Value> {
        let path = args
            .get("path")
            .and_then(Value::as_str)
            .ok_or_else(|| tera::Error::msg("get_data requires a string `path` argument"))?;
        loader
            .get_data(path)
            .map(Value::Object)
            .map_err(|e| tera::Error::msg(e.to_string()))
    }
}

/// Tera nests the useful part of an error in its sources.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
