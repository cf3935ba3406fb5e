//! # prepress
//!
//! Turns loosely-structured article markup into a cleaned,
//! semantically-tagged document ready for desktop-publishing import.
//!
//! The pipeline reads a WordPress-style XML export, selects the articles
//! belonging to one issue, and runs each through an ordered catalog of
//! transformation passes: caption restructuring, image and embed
//! localization, math compilation, code highlighting, and a battery of
//! typography fixes (directional quotes, dashes, ellipses, footnote
//! numbering, list flattening). The result serializes as a single
//! `<issue>` document.
//!
//! ## Quick Start
//!
//! ```no_run
//! use prepress::collab::{AssetStore, NullFetcher, NullMathCompiler, KeywordHighlighter};
//! use prepress::transform::PassContext;
//!
//! let dump = std::fs::read_to_string("dump.xml").unwrap();
//! let mut articles = prepress::import::parse_dump(&dump, "v141i3").unwrap();
//!
//! let assets = AssetStore::create("assets").unwrap();
//! let ctx = PassContext {
//!     fetcher: &NullFetcher,
//!     math: &NullMathCompiler,
//!     highlighter: &KeywordHighlighter,
//!     assets: &assets,
//! };
//! for article in &mut articles {
//!     prepress::transform::run_pipeline(article, &ctx).unwrap();
//! }
//! let issue = prepress::export::serialize_issue(&articles);
//! ```

pub mod collab;
pub mod error;
pub mod export;
pub mod import;
pub mod model;
pub mod transform;

pub use error::{Error, Result};
pub use model::{Article, Tree};
