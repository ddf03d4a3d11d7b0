//! Standalone template renders.
//!
//! Not every output has a data file in the origin: a sitemap, a feed, or a
//! `robots.txt` is just a template rendered to a fixed path. Each
//! [`FileRender`] names a template, an output path, and optionally a data
//! file whose contents become the template context.
//!
//! ```toml
//! [[files]]
//! template = "sitemap.xml"
//! output = "public/sitemap.xml"
//! data = "data/site.yml"
//! ```
//!
//! Renders run in the order given and stop at the first error, like pages.

use crate::decode::{DataLoader, PageData};
use crate::engine::TemplateEngine;
use crate::render::{RenderError, write_output};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

/// One template → output pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileRender {
    pub template: String,
    pub output: PathBuf,
    /// Data file used as the template context (any registered format)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<PathBuf>,
}

/// Render each pair, returning the written output paths.
pub fn render_files(
    engine: &dyn TemplateEngine,
    loader: &DataLoader,
    renders: &[FileRender],
) -> Result<Vec<PathBuf>, RenderError> {
    let mut written = Vec::with_capacity(renders.len());
    for render in renders {
        let data = match &render.data {
            Some(path) => loader.load(path)?,
            None => PageData::new(),
        };
        let content = engine.render(&render.template, &data)?;
        write_output(&render.output, &content)?;
        debug!(template = %render.template, output = %render.output.display(), "Rendered file");
        written.push(render.output.clone());
    }
    Ok(written)
}
