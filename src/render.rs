//! The page rendering pipeline.
//!
//! [`PageRenderer::run`] walks the origin directory, decodes every data file
//! with a registered extension, and renders the template each page names:
//!
//! ```text
//! data/                               public/
//! ├── index.yml      template: home   ├── index.html
//! ├── about.json     template: page   ├── about.html
//! ├── blog/                           └── blog/
//! │   └── first.toml template: post       └── first.html
//! └── shared/
//!     └── menu.yml   (no template)    → skipped, still readable via get_data
//! ```
//!
//! ## Per-Page Steps
//!
//! 1. Decode the source through the shared [`DataLoader`].
//! 2. Skip it if `template` is missing, `null`, `false`, or empty.
//! 3. Derive the destination with the suffix rules (see [`crate::suffix`]).
//! 4. Call the `before_render` hook.
//! 5. Render the template and write the result, creating parent directories.
//! 6. Call the `after_render` hook.
//!
//! ## Failure
//!
//! The first error of any kind (decode, template, filesystem, hook) ends the
//! run. Pages already written stay on disk; nothing after the failing page is
//! rendered. There is no per-page error collection.
//!
//! Discovery order is whatever the directory walk yields and differs between
//! filesystems. Nothing in a run depends on it.

use crate::decode::{DataLoader, DecodeError, PageData, extension_of};
use crate::engine::{TemplateEngine, TemplateError};
use crate::suffix::{self, SuffixRule};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error("Filesystem error at {path}: {source}")]
    Filesystem {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Hook failed for {path}: {source}")]
    Hook { path: PathBuf, source: HookError },
    #[error("Failed to scan {path}: {source}")]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },
}

/// Error type hooks report failures with.
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

type BeforeRender = Box<dyn FnMut(&Path, &Path, &PageData) -> Result<(), HookError>>;
type AfterRender = Box<dyn FnMut(&Path, &Path, &str) -> Result<(), HookError>>;

/// A discovered data file and the extension its decoder is registered under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSource {
    pub path: PathBuf,
    pub format: String,
}

/// A page written during a run.
#[derive(Debug, Clone, Serialize)]
pub struct RenderedPage {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub template: String,
    /// Size of the written output in bytes
    pub bytes: usize,
}

/// Outcome of a completed run.
#[derive(Debug, Default, Serialize)]
pub struct RenderReport {
    pub rendered: Vec<RenderedPage>,
    /// Sources decoded but skipped for lacking a template
    pub skipped: Vec<PathBuf>,
}

impl RenderReport {
    pub fn rendered_count(&self) -> usize {
        self.rendered.len()
    }
}

/// What a run would do with one source, without rendering it.
#[derive(Debug, Clone, Serialize)]
pub struct PagePlan {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub template: Option<String>,
}

pub struct PageRenderer {
    loader: Arc<DataLoader>,
    destination: PathBuf,
    engine: Box<dyn TemplateEngine>,
    suffix_rules: Vec<SuffixRule>,
    before_render: Option<BeforeRender>,
    after_render: Option<AfterRender>,
}

impl PageRenderer {
    /// Pages are read from `loader.origin()` and written below `destination`.
    pub fn new(
        loader: Arc<DataLoader>,
        destination: impl Into<PathBuf>,
        engine: Box<dyn TemplateEngine>,
    ) -> Self {
        Self {
            loader,
            destination: destination.into(),
            engine,
            suffix_rules: Vec::new(),
            before_render: None,
            after_render: None,
        }
    }

    /// Append a suffix rule. Rules are tried in the order they are added.
    pub fn suffix_rule(mut self, rule: SuffixRule) -> Self {
        self.suffix_rules.push(rule);
        self
    }

    pub fn suffix_rules(mut self, rules: impl IntoIterator<Item = SuffixRule>) -> Self {
        self.suffix_rules.extend(rules);
        self
    }

    /// Called with `(source, destination, data)` before each page renders.
    pub fn before_render<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&Path, &Path, &PageData) -> Result<(), HookError> + 'static,
    {
        self.before_render = Some(Box::new(hook));
        self
    }

    /// Called with `(source, destination, content)` after each page is written.
    pub fn after_render<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&Path, &Path, &str) -> Result<(), HookError> + 'static,
    {
        self.after_render = Some(Box::new(hook));
        self
    }

    pub fn origin(&self) -> &Path {
        self.loader.origin()
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Find every regular file below the origin with a registered extension.
    pub fn discover(&self) -> Result<Vec<PageSource>, RenderError> {
        let origin = self.origin();
        let registry = self.loader.registry();
        let mut sources = Vec::new();

        for entry in WalkDir::new(origin).follow_links(true) {
            let entry = entry.map_err(|source| RenderError::Walk {
                path: origin.to_path_buf(),
                source,
            })?;
            if !entry.file_type().is_file() || !registry.supports(entry.path()) {
                continue;
            }
            let path = entry.into_path();
            let format = extension_of(&path).unwrap_or_default();
            sources.push(PageSource { path, format });
        }

        debug!(origin = %origin.display(), count = sources.len(), "Discovered page sources");
        Ok(sources)
    }

    /// Output path for a source below the origin.
    pub fn destination_for(&self, source: &Path) -> PathBuf {
        suffix::destination_for(self.origin(), &self.destination, source, &self.suffix_rules)
    }

    /// Resolve every page's template and destination without rendering.
    pub fn plan(&self) -> Result<Vec<PagePlan>, RenderError> {
        self.discover()?
            .into_iter()
            .map(|source| -> Result<PagePlan, RenderError> {
                let data = self.loader.load(&source.path)?;
                Ok(PagePlan {
                    destination: self.destination_for(&source.path),
                    template: template_name(&data),
                    source: source.path,
                })
            })
            .collect()
    }

    /// Render every page. Stops at the first error.
    pub fn run(&mut self) -> Result<RenderReport, RenderError> {
        let sources = self.discover()?;
        let mut report = RenderReport::default();

        for source in &sources {
            match self.render_page(source)? {
                Some(page) => report.rendered.push(page),
                None => report.skipped.push(source.path.clone()),
            }
        }

        info!(
            rendered = report.rendered_count(),
            skipped = report.skipped.len(),
            destination = %self.destination.display(),
            "Page render complete"
        );
        Ok(report)
    }

    fn render_page(&mut self, source: &PageSource) -> Result<Option<RenderedPage>, RenderError> {
        let data = self.loader.load(&source.path)?;

        let Some(template) = template_name(&data) else {
            debug!(source = %source.path.display(), "No template, skipping");
            return Ok(None);
        };

        let destination = self.destination_for(&source.path);

        if let Some(hook) = self.before_render.as_mut() {
            hook(&source.path, &destination, &data).map_err(|e| RenderError::Hook {
                path: source.path.clone(),
                source: e,
            })?;
        }

        let content = self.engine.render(&template, &data)?;
        write_output(&destination, &content)?;

        if let Some(hook) = self.after_render.as_mut() {
            hook(&source.path, &destination, &content).map_err(|e| RenderError::Hook {
                path: source.path.clone(),
                source: e,
            })?;
        }

        debug!(
            source = %source.path.display(),
            destination = %destination.display(),
            template = %template,
            "Rendered page"
        );

        Ok(Some(RenderedPage {
            source: source.path.clone(),
            destination,
            template,
            bytes: content.len(),
        }))
    }
}

impl fmt::Debug for PageRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageRenderer")
            .field("origin", &self.origin())
            .field("destination", &self.destination)
            .field("suffix_rules", &self.suffix_rules)
            .field("before_render", &self.before_render.is_some())
            .field("after_render", &self.after_render.is_some())
            .finish()
    }
}

/// The template a page names, if it names one.
///
/// Missing, `null`, `false`, `""`, `"0"`, and zero all mean "no template".
/// Other numbers are accepted as names; any other value is ignored.
pub fn template_name(data: &PageData) -> Option<String> {
    match data.get("template")? {
        Value::String(name) if !name.is_empty() && name != "0" => Some(name.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    }
}

/// Write a rendered file, creating its parent directories. Overwrites.
pub(crate) fn write_output(path: &Path, content: &str) -> Result<(), RenderError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| RenderError::Filesystem {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, content).map_err(|source| RenderError::Filesystem {
        path: path.to_path_buf(),
        source,
    })
}
