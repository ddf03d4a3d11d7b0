//! Page data decoding.
//!
//! Every page starts life as a structured data file in the origin directory.
//! Decoders turn the file's text into [`PageData`], a string-keyed mapping
//! whose `template` entry names the template to render.
//!
//! ## Registry
//!
//! Decoders are looked up by file extension through a [`DecoderRegistry`].
//! The stock registry knows four extensions:
//!
//! | Extension | Format |
//! |-----------|--------|
//! | `yml`, `yaml` | YAML document |
//! | `json` | JSON document |
//! | `toml` | TOML table |
//!
//! Markdown with YAML front matter (`md`) is opt-in via
//! [`DecoderRegistry::with_markdown`]. Anything else can be added with
//! [`DecoderRegistry::register`]; discovery only picks up extensions the
//! registry knows about.
//!
//! ## Top-Level Coercion
//!
//! A YAML or JSON document whose top level is not a mapping is still accepted:
//!
//! - empty document or `null` → empty mapping
//! - scalar → `{"0": scalar}`
//! - sequence → `{"0": first, "1": second, ...}`
//!
//! Pages decoded this way normally have no `template` key and are skipped,
//! but templates can still read them with `get_data`. Mappings keep their
//! source order, so coerced sequences iterate in list order.
//!
//! ## Shared Loader
//!
//! [`DataLoader`] pairs the registry with the origin directory. A single
//! instance is shared between the page renderer and the template engine, so
//! templates calling `get_data` decode files exactly the way the pipeline does.

use pulldown_cmark::{Options, Parser, html as md_html};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Decoded page data: string keys to arbitrary values.
pub type PageData = Map<String, Value>;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("The file {0} does not exist")]
    MissingSourceFile(PathBuf),
    #[error("No decoder registered for {0}")]
    UnsupportedFormat(PathBuf),
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid {format} in {path}: {message}")]
    Parse {
        path: PathBuf,
        format: String,
        message: String,
    },
}

/// Failure reported by a single decoder, before the registry attaches the path.
#[derive(Error, Debug)]
#[error("{0}")]
pub struct FormatError(pub String);

impl From<serde_yaml::Error> for FormatError {
    fn from(e: serde_yaml::Error) -> Self {
        FormatError(e.to_string())
    }
}

impl From<serde_json::Error> for FormatError {
    fn from(e: serde_json::Error) -> Self {
        FormatError(e.to_string())
    }
}

impl From<toml::de::Error> for FormatError {
    fn from(e: toml::de::Error) -> Self {
        FormatError(e.to_string())
    }
}

/// Turns the text of a data file into [`PageData`].
pub trait Decoder: Send + Sync {
    fn decode(&self, text: &str) -> Result<PageData, FormatError>;
}

impl<F> Decoder for F
where
    F: Fn(&str) -> Result<PageData, FormatError> + Send + Sync,
{
    fn decode(&self, text: &str) -> Result<PageData, FormatError> {
        self(text)
    }
}

/// Extension → decoder lookup table.
pub struct DecoderRegistry {
    decoders: BTreeMap<String, Box<dyn Decoder>>,
}

impl DecoderRegistry {
    /// A registry with no decoders at all.
    pub fn empty() -> Self {
        Self {
            decoders: BTreeMap::new(),
        }
    }

    /// The stock registry plus Markdown front matter pages.
    pub fn with_markdown() -> Self {
        let mut registry = Self::default();
        registry.register("md", decode_markdown);
        registry
    }

    /// Register (or replace) the decoder for an extension.
    ///
    /// Extensions are matched case-insensitively, without the leading dot.
    pub fn register(&mut self, extension: &str, decoder: impl Decoder + 'static) {
        let key = extension.trim_start_matches('.').to_ascii_lowercase();
        self.decoders.insert(key, Box::new(decoder));
    }

    /// Whether a path's extension has a registered decoder.
    pub fn supports(&self, path: &Path) -> bool {
        extension_of(path).is_some_and(|ext| self.decoders.contains_key(&ext))
    }

    /// Registered extensions in sorted order.
    pub fn extensions(&self) -> Vec<&str> {
        self.decoders.keys().map(String::as_str).collect()
    }

    /// Read and decode a data file.
    pub fn decode_file(&self, path: &Path) -> Result<PageData, DecodeError> {
        if !path.is_file() {
            return Err(DecodeError::MissingSourceFile(path.to_path_buf()));
        }

        let ext = extension_of(path).unwrap_or_default();
        let decoder = self
            .decoders
            .get(&ext)
            .ok_or_else(|| DecodeError::UnsupportedFormat(path.to_path_buf()))?;

        let text = fs::read_to_string(path).map_err(|source| DecodeError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        decoder.decode(&text).map_err(|e| DecodeError::Parse {
            path: path.to_path_buf(),
            format: ext,
            message: e.0,
        })
    }
}

impl Default for DecoderRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register("yml", decode_yaml);
        registry.register("yaml", decode_yaml);
        registry.register("json", decode_json);
        registry.register("toml", decode_toml);
        registry
    }
}

impl fmt::Debug for DecoderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecoderRegistry")
            .field("extensions", &self.extensions())
            .finish()
    }
}

/// Lowercased extension of a path, if any.
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
}

// =============================================================================
// Stock decoders
// =============================================================================

/// Decode a YAML document, coercing non-mapping top levels.
pub fn decode_yaml(text: &str) -> Result<PageData, FormatError> {
    if text.trim().is_empty() {
        return Ok(PageData::new());
    }
    let value: serde_yaml::Value = serde_yaml::from_str(text)?;
    Ok(coerce_to_mapping(yaml_to_json(&value)))
}

/// Decode a JSON document, coercing non-object top levels.
pub fn decode_json(text: &str) -> Result<PageData, FormatError> {
    let value: Value = serde_json::from_str(text)?;
    Ok(coerce_to_mapping(value))
}

/// Decode a TOML document.
pub fn decode_toml(text: &str) -> Result<PageData, FormatError> {
    let table: toml::Table = toml::from_str(text)?;
    match serde_json::to_value(table)? {
        Value::Object(map) => Ok(map),
        _ => Ok(PageData::new()),
    }
}

/// Decode a Markdown page with optional `---` delimited YAML front matter.
///
/// Front matter keys become page data. The raw markdown is stored under
/// `body` and its HTML rendering under `content`.
pub fn decode_markdown(text: &str) -> Result<PageData, FormatError> {
    let (front_matter, body) = split_front_matter(text);
    let mut data = match front_matter {
        Some(yaml) => decode_yaml(yaml)?,
        None => PageData::new(),
    };

    let parser = Parser::new_ext(body, Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH);
    let mut html = String::new();
    md_html::push_html(&mut html, parser);

    data.insert("body".to_string(), Value::String(body.to_string()));
    data.insert("content".to_string(), Value::String(html));
    Ok(data)
}

/// Split `---\n<yaml>\n---\n<body>` into its parts.
///
/// Returns `(None, text)` when the text does not open with a front matter
/// fence or the fence is never closed.
fn split_front_matter(text: &str) -> (Option<&str>, &str) {
    let Some(rest) = text.strip_prefix("---") else {
        return (None, text);
    };
    let Some(rest) = rest.strip_prefix("\r\n").or_else(|| rest.strip_prefix('\n')) else {
        return (None, text);
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return (Some(&rest[..offset]), &rest[offset + line.len()..]);
        }
        offset += line.len();
    }
    (None, text)
}

/// Wrap any top-level value into a mapping.
fn coerce_to_mapping(value: Value) -> PageData {
    match value {
        Value::Object(map) => map,
        Value::Null => PageData::new(),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, v)| (i.to_string(), v))
            .collect(),
        scalar => {
            let mut map = PageData::new();
            map.insert("0".to_string(), scalar);
            map
        }
    }
}

/// Convert a YAML value to JSON. Non-string keys are stringified and tags dropped.
fn yaml_to_json(value: &serde_yaml::Value) -> Value {
    use serde_yaml::Value as Yaml;
    match value {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(*b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
                    .unwrap_or(Value::Null)
            }
        }
        Yaml::String(s) => Value::String(s.clone()),
        Yaml::Sequence(items) => Value::Array(items.iter().map(yaml_to_json).collect()),
        Yaml::Mapping(mapping) => Value::Object(
            mapping
                .iter()
                .map(|(k, v)| (yaml_key(k), yaml_to_json(v)))
                .collect(),
        ),
        Yaml::Tagged(tagged) => yaml_to_json(&tagged.value),
    }
}

fn yaml_key(key: &serde_yaml::Value) -> String {
    use serde_yaml::Value as Yaml;
    match key {
        Yaml::String(s) => s.clone(),
        Yaml::Number(n) => n.to_string(),
        Yaml::Bool(b) => b.to_string(),
        Yaml::Null => String::new(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
    }
}

// =============================================================================
// Shared loader
// =============================================================================

/// The decoding service shared by the renderer and the template engine.
#[derive(Debug)]
pub struct DataLoader {
    origin: PathBuf,
    registry: DecoderRegistry,
}

impl DataLoader {
    pub fn new(origin: impl Into<PathBuf>, registry: DecoderRegistry) -> Self {
        Self {
            origin: origin.into(),
            registry,
        }
    }

    pub fn origin(&self) -> &Path {
        &self.origin
    }

    pub fn registry(&self) -> &DecoderRegistry {
        &self.registry
    }

    /// Decode another page's data by its path relative to the origin.
    pub fn get_data(&self, relative: &str) -> Result<PageData, DecodeError> {
        self.load(&self.origin.join(relative.trim_start_matches('/')))
    }

    /// Decode a data file at an arbitrary path.
    pub fn load(&self, path: &Path) -> Result<PageData, DecodeError> {
        self.registry.decode_file(path)
    }
}
