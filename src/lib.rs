//! # pagewright
//!
//! Render static pages from structured data files and templates.
//! Your data directory is the site map: every YAML, JSON, or TOML file that
//! names a `template` becomes one output page at the mirrored path.
//!
//! # Pipeline
//!
//! ```text
//! data/blog/first.yml ──decode──▶ PageData ──template──▶ public/blog/first.html
//!                                   │
//!                          template: post.html
//!                          title: First post
//! ```
//!
//! A run is strictly sequential: discover, then for each page decode, resolve
//! the destination, render, and write. The first error ends the run.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`decode`] | Decoder registry keyed by extension, stock decoders, and the shared [`decode::DataLoader`] |
//! | [`suffix`] | Suffix rules and destination path derivation |
//! | [`engine`] | The [`engine::TemplateEngine`] capability and its Tera implementation (with `get_data`) |
//! | [`render`] | [`render::PageRenderer`]: discovery, render loop, hooks, dry-run plan |
//! | [`files`] | Standalone template → output renders |
//! | [`config`] | `pagewright.toml` loading, merging over stock defaults, validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Decoders Are a Registry
//!
//! Data formats are looked up by extension in a [`decode::DecoderRegistry`]
//! rather than matched in the render loop. Discovery asks the same registry
//! which files count as pages, so registering a decoder is all it takes to
//! add a format.
//!
//! ## One Loader, Two Users
//!
//! Templates can pull in another page's data with `get_data(path=...)`. The
//! engine and the renderer share a single [`decode::DataLoader`], so both see
//! the same origin and the same decoders.
//!
//! ## Hooks Are Plain Closures
//!
//! `before_render` and `after_render` are synchronous `FnMut` values. A hook
//! returning an error ends the run like any other failure.
//!
//! ## No Partial Success
//!
//! Errors are not collected per page. A run either renders everything or
//! stops at the first failure; what was written before it stays on disk.

pub mod config;
pub mod decode;
pub mod engine;
pub mod files;
pub mod output;
pub mod render;
pub mod suffix;

#[cfg(test)]
pub(crate) mod test_helpers;
