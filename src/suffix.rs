//! Destination path derivation.
//!
//! A page's output path mirrors its source path under the destination root,
//! with the data file's extension swapped for an output suffix:
//!
//! ```text
//! data/blog/first-post.yml   →  public/blog/first-post.html
//! data/feed.xml.yaml         →  public/feed.xml      (rule: "\.xml\.yaml$" → "")
//! ```
//!
//! Suffix rules are tried in registration order against the origin-relative
//! path (always `/`-separated). The first matching rule supplies the suffix;
//! without a match the suffix is [`DEFAULT_SUFFIX`].

use regex::Regex;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Suffix used when no rule matches.
pub const DEFAULT_SUFFIX: &str = ".html";

/// A pattern over the origin-relative source path and the suffix it selects.
#[derive(Debug, Clone)]
pub struct SuffixRule {
    pattern: Regex,
    suffix: String,
}

impl SuffixRule {
    pub fn new(pattern: &str, suffix: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            suffix: suffix.into(),
        })
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn matches(&self, relative: &str) -> bool {
        self.pattern.is_match(relative)
    }
}

/// Pick the suffix for an origin-relative path.
pub fn select_suffix<'a>(rules: &'a [SuffixRule], relative: &str) -> &'a str {
    rules
        .iter()
        .find(|rule| rule.matches(relative))
        .map(SuffixRule::suffix)
        .unwrap_or(DEFAULT_SUFFIX)
}

/// Compute where a source file renders to.
///
/// `source` must live under `origin`; a source outside it keeps its full
/// path below `destination`.
pub fn destination_for(
    origin: &Path,
    destination: &Path,
    source: &Path,
    rules: &[SuffixRule],
) -> PathBuf {
    let relative = source.strip_prefix(origin).unwrap_or(source);
    let suffix = select_suffix(rules, &slash_path(relative));

    let mut name = OsString::from(relative.with_extension(""));
    name.push(suffix);
    destination.join(name)
}

/// Render a relative path with `/` separators regardless of platform.
pub fn slash_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
