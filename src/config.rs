//! Build configuration.
//!
//! Handles loading, validating, and merging `pagewright.toml`. Every key is
//! optional: stock defaults are serialized to a TOML table and the user file
//! is merged on top, so a config only needs the values it changes.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! origin = "data"           # Directory scanned for page data files
//! destination = "public"    # Directory rendered pages are written to
//! templates = "templates"   # Template directory (loaded recursively)
//! markdown = false          # Also treat .md files with front matter as pages
//!
//! [[suffix_rules]]          # Output suffix overrides, first match wins
//! pattern = "\\.xml\\.ya?ml$"
//! suffix = ""
//!
//! [[files]]                 # Standalone template renders
//! template = "sitemap.xml"
//! output = "public/sitemap.xml"
//! data = "data/site.yml"    # Optional
//! ```
//!
//! Relative paths resolve against the working directory. Unknown keys are
//! rejected to catch typos early.

use crate::decode::DecoderRegistry;
use crate::files::FileRender;
use crate::suffix::SuffixRule;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "pagewright.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Build configuration loaded from `pagewright.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Directory scanned recursively for page data.
    pub origin: PathBuf,
    /// Directory rendered pages are written to.
    pub destination: PathBuf,
    /// Template directory.
    pub templates: PathBuf,
    /// Register the Markdown front matter decoder for `.md` files.
    pub markdown: bool,
    /// Ordered output suffix rules.
    pub suffix_rules: Vec<SuffixRuleConfig>,
    /// Standalone template renders, run after the pages.
    pub files: Vec<FileRender>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            origin: PathBuf::from("data"),
            destination: PathBuf::from("public"),
            templates: PathBuf::from("templates"),
            markdown: false,
            suffix_rules: Vec::new(),
            files: Vec::new(),
        }
    }
}

/// A suffix rule as written in the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SuffixRuleConfig {
    /// Regex matched against the origin-relative source path.
    pub pattern: String,
    /// Replacement for the source extension, including the dot.
    pub suffix: String,
}

impl BuildConfig {
    /// Validate paths, rule patterns, and file entries.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.origin.as_os_str().is_empty() {
            return Err(ConfigError::Validation("origin must not be empty".into()));
        }
        if self.destination.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "destination must not be empty".into(),
            ));
        }
        if self.origin == self.destination {
            return Err(ConfigError::Validation(
                "origin and destination must differ".into(),
            ));
        }
        self.compile_suffix_rules()?;
        for (i, file) in self.files.iter().enumerate() {
            if file.template.is_empty() || file.output.as_os_str().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "files[{i}] needs both template and output"
                )));
            }
        }
        Ok(())
    }

    /// Compile the configured suffix rules, in order.
    pub fn compile_suffix_rules(&self) -> Result<Vec<SuffixRule>, ConfigError> {
        self.suffix_rules
            .iter()
            .map(|rule| {
                SuffixRule::new(&rule.pattern, rule.suffix.clone()).map_err(|e| {
                    ConfigError::Validation(format!(
                        "invalid suffix rule pattern '{}': {e}",
                        rule.pattern
                    ))
                })
            })
            .collect()
    }

    /// Decoder registry matching the `markdown` switch.
    pub fn decoder_registry(&self) -> DecoderRegistry {
        if self.markdown {
            DecoderRegistry::with_markdown()
        } else {
            DecoderRegistry::default()
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(BuildConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// Tables merge key by key; any other overlay value (arrays included)
/// replaces the base value.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value. `Ok(None)` if it doesn't exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value and deserialize. Not validated.
pub fn merge_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<BuildConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: BuildConfig = merged.try_into()?;
    Ok(config)
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<BuildConfig, ConfigError> {
    let config = merge_config(base, overlay)?;
    config.validate()?;
    Ok(config)
}

/// Path settings given on the command line, applied over the config file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub origin: Option<PathBuf>,
    pub destination: Option<PathBuf>,
    pub templates: Option<PathBuf>,
}

/// Load a config file over the stock defaults.
pub fn load_config(path: &Path) -> Result<BuildConfig, ConfigError> {
    load_config_with(path, ConfigOverrides::default())
}

/// Load a config file, apply `overrides`, then validate the result once.
pub fn load_config_with(path: &Path, overrides: ConfigOverrides) -> Result<BuildConfig, ConfigError> {
    let mut config = merge_config(stock_defaults_value(), load_raw_config(path)?)?;
    if let Some(origin) = overrides.origin {
        config.origin = origin;
    }
    if let Some(destination) = overrides.destination {
        config.destination = destination;
    }
    if let Some(templates) = overrides.templates {
        config.templates = templates;
    }
    config.validate()?;
    Ok(config)
}

/// A fully commented stock `pagewright.toml`, printed by `gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# pagewright configuration
# ========================
# All settings are optional. Values shown are the defaults.
# Relative paths resolve against the directory pagewright runs in.
# Unknown keys will cause an error.

# Directory scanned (recursively) for page data files: .yml, .yaml, .json, .toml
origin = "data"

# Directory rendered pages are written to. Existing files are overwritten.
destination = "public"

# Template directory. Every file below it is loaded, named by its relative
# path (e.g. "layouts/post.html").
templates = "templates"

# Treat .md files as pages too. YAML front matter becomes page data; the
# markdown is available as `body` (raw) and `content` (HTML).
markdown = false

# ---------------------------------------------------------------------------
# Output suffixes
# ---------------------------------------------------------------------------
# A page's output path is its source path with the extension replaced.
# Rules are tried in order against the path relative to `origin`; the first
# matching pattern picks the suffix. Without a match the suffix is ".html".
#
# [[suffix_rules]]
# pattern = "\\.xml\\.ya?ml$"   # feed.xml.yml -> feed.xml
# suffix = ""

# ---------------------------------------------------------------------------
# Standalone renders
# ---------------------------------------------------------------------------
# Templates rendered to a fixed path after the pages. `data` is optional and
# may be any supported data file.
#
# [[files]]
# template = "sitemap.xml"
# output = "public/sitemap.xml"
# data = "data/site.yml"
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_paths() {
        let config = BuildConfig::default();
        assert_eq!(config.origin, PathBuf::from("data"));
        assert_eq!(config.destination, PathBuf::from("public"));
        assert_eq!(config.templates, PathBuf::from("templates"));
        assert!(!config.markdown);
        assert!(config.suffix_rules.is_empty());
    }

    #[test]
    fn stock_config_parses_to_defaults() {
        let config: BuildConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config, BuildConfig::default());
    }

    #[test]
    fn parse_partial_config() {
        let config = resolve_config(
            stock_defaults_value(),
            Some(toml::from_str("destination = \"dist\"\n").unwrap()),
        )
        .unwrap();
        assert_eq!(config.destination, PathBuf::from("dist"));
        assert_eq!(config.origin, PathBuf::from("data"));
    }

    #[test]
    fn parse_rules_and_files() {
        let toml = r##"
markdown = true

[[suffix_rules]]
pattern = "\\.md$"
suffix = ".htm"

[[suffix_rules]]
pattern = "^feeds/"
suffix = ".xml"

[[files]]
template = "sitemap.xml"
output = "public/sitemap.xml"

[[files]]
template = "feed.xml"
output = "public/feed.xml"
data = "data/site.yml"
"##;
        let config = resolve_config(stock_defaults_value(), Some(toml::from_str(toml).unwrap())).unwrap();

        let rules = config.compile_suffix_rules().unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].pattern(), r"\.md$");
        assert_eq!(rules[1].suffix(), ".xml");

        assert_eq!(config.files.len(), 2);
        assert_eq!(config.files[0].data, None);
        assert_eq!(config.files[1].data, Some(PathBuf::from("data/site.yml")));
        assert!(config.decoder_registry().extensions().contains(&"md"));
    }

    #[test]
    fn unknown_key_is_rejected() {
        let result = resolve_config(
            stock_defaults_value(),
            Some(toml::from_str("orgin = \"typo\"\n").unwrap()),
        );
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn invalid_suffix_pattern_is_rejected() {
        let toml = "[[suffix_rules]]\npattern = \"(oops\"\nsuffix = \".html\"\n";
        let result = resolve_config(stock_defaults_value(), Some(toml::from_str(toml).unwrap()));
        assert!(matches!(result, Err(ConfigError::Validation(msg)) if msg.contains("(oops")));
    }

    #[test]
    fn same_origin_and_destination_is_rejected() {
        let config = BuildConfig {
            destination: PathBuf::from("data"),
            ..BuildConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn file_entry_without_template_is_rejected() {
        let config = BuildConfig {
            files: vec![FileRender {
                template: String::new(),
                output: PathBuf::from("out.txt"),
                data: None,
            }],
            ..BuildConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Validation(msg)) if msg.contains("files[0]")));
    }

    #[test]
    fn merge_toml_overlays_nested_tables() {
        let base: toml::Value = toml::from_str("a = 1\n[t]\nx = 1\ny = 2\n").unwrap();
        let overlay: toml::Value = toml::from_str("[t]\ny = 3\n").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["a"].as_integer(), Some(1));
        assert_eq!(merged["t"]["x"].as_integer(), Some(1));
        assert_eq!(merged["t"]["y"].as_integer(), Some(3));
    }

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config, BuildConfig::default());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILE);
        fs::write(&path, "origin = \"content\"\ntemplates = \"layouts\"\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.origin, PathBuf::from("content"));
        assert_eq!(config.templates, PathBuf::from("layouts"));
        assert_eq!(config.destination, PathBuf::from("public"));
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILE);
        fs::write(&path, "this is not valid toml [[[").unwrap();

        assert!(matches!(load_config(&path), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn overrides_apply_before_validation() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILE);
        fs::write(&path, "destination = \"data\"\n").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Validation(_))));

        let overrides = ConfigOverrides {
            destination: Some(PathBuf::from("out")),
            ..ConfigOverrides::default()
        };
        let config = load_config_with(&path, overrides).unwrap();
        assert_eq!(config.destination, PathBuf::from("out"));
        assert_eq!(config.origin, PathBuf::from("data"));
    }

    #[test]
    fn override_can_make_config_invalid() {
        let tmp = TempDir::new().unwrap();
        let overrides = ConfigOverrides {
            origin: Some(PathBuf::from("public")),
            ..ConfigOverrides::default()
        };
        let result = load_config_with(&tmp.path().join(CONFIG_FILE), overrides);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }
}
