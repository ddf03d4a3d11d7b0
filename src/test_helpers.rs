//! Shared test utilities for the pagewright test suite.
//!
//! Provides file setup, page data construction, and a deterministic
//! [`StubEngine`] so pipeline tests can assert exact output without depending
//! on a real template language.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! write_file(tmp.path(), "data/index.yml", "template: home.html\n");
//!
//! let engine = StubEngine::new(&["home.html"]);
//! let expected = StubEngine::expected("home.html", &page_data(json!({"template": "home.html"})));
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;

use crate::decode::{DataLoader, DecoderRegistry, PageData};
use crate::engine::{TemplateEngine, TemplateError};

// =========================================================================
// Filesystem setup
// =========================================================================

/// Write `content` to `root/rel`, creating parent directories. Returns the path.
pub fn write_file(root: &Path, rel: &str, content: &str) -> PathBuf {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
}

/// A shared loader over `origin` with the stock decoders.
pub fn loader_for(origin: &Path) -> Arc<DataLoader> {
    Arc::new(DataLoader::new(origin, DecoderRegistry::default()))
}

// =========================================================================
// Page data
// =========================================================================

/// Build page data from a `json!` object literal. Panics on non-objects.
pub fn page_data(value: Value) -> PageData {
    match value {
        Value::Object(map) => map,
        other => panic!("page_data expects an object, got {other}"),
    }
}

// =========================================================================
// Stub engine
// =========================================================================

/// Template engine that knows a fixed set of names and renders each as
/// `name|<data as JSON>`.
pub struct StubEngine {
    known: Vec<String>,
}

impl StubEngine {
    pub fn new(known: &[&str]) -> Self {
        Self {
            known: known.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// What [`StubEngine`] renders for `name` and `data`.
    pub fn expected(name: &str, data: &PageData) -> String {
        format!("{name}|{}", serde_json::to_string(data).unwrap())
    }
}

impl TemplateEngine for StubEngine {
    fn render(&self, name: &str, data: &PageData) -> Result<String, TemplateError> {
        if self.known.iter().any(|k| k == name) {
            Ok(Self::expected(name, data))
        } else {
            Err(TemplateError::NotFound(name.to_string()))
        }
    }
}
