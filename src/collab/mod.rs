//! External collaborators used by individual passes.
//!
//! Passes that touch the network, the filesystem, or an external compiler
//! do so only through these trait seams, so the transformation logic stays
//! independently testable. The bundle is constructed once per run and
//! threaded through the pipeline.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

#[cfg(feature = "http")]
mod http;
mod highlight;
mod latex;

#[cfg(feature = "http")]
pub use http::UreqFetcher;
pub use highlight::KeywordHighlighter;
pub use latex::PdfLatexCompiler;

/// Downloads remote resources (embed pages, images).
pub trait ResourceFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Compiles a math fragment into a rasterizable artifact.
pub trait MathCompiler {
    /// Compile `source` (math-mode markup, without delimiters) and write
    /// the artifact to `output` plus a `.pdf` extension. Returns the final
    /// artifact path.
    fn compile(&self, source: &str, display: bool, output: &Path) -> Result<PathBuf>;
}

/// Produces highlighting markup for a code block.
///
/// The returned string is parsed as a markup fragment, so implementations
/// must escape the source text and may only add elements from the `hl_*`
/// vocabulary around it. The text payload must be preserved exactly.
pub trait CodeHighlighter {
    fn highlight(&self, source: &str, options: &CodeOptions) -> String;
}

/// Options parsed from the `:name: value` block at the top of a code block.
#[derive(Debug, Clone, Default)]
pub struct CodeOptions(Vec<(String, String)>);

impl CodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an option. A missing value turns the option into a flag.
    pub fn insert(&mut self, name: &str, value: &str) {
        self.0.push((name.to_string(), value.to_string()));
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has(&self, name: &str) -> bool {
        self.0.iter().any(|(k, _)| k == name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// On-disk layout for generated assets (`img/` and `pdf/` subdirectories).
#[derive(Debug, Clone)]
pub struct AssetStore {
    root: PathBuf,
}

impl AssetStore {
    /// Create the store, making the `img/` and `pdf/` directories.
    pub fn create(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(root.join("img"))?;
        std::fs::create_dir_all(root.join("pdf"))?;
        Ok(Self { root })
    }

    pub fn image_path(&self, name: &str) -> PathBuf {
        self.root.join("img").join(name)
    }

    pub fn pdf_path(&self, name: &str) -> PathBuf {
        self.root.join("pdf").join(name)
    }

    /// Write image bytes, returning the stored path.
    pub fn write_image(&self, name: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.image_path(name);
        std::fs::write(&path, bytes)?;
        Ok(path)
    }
}

/// Fetcher that refuses every request. Keeps network-dependent passes inert
/// in tests and offline runs: the affected matches are left unconverted.
pub struct NullFetcher;

impl ResourceFetcher for NullFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        Err(Error::Fetch {
            url: url.to_string(),
            reason: "fetching disabled".to_string(),
        })
    }
}

/// Math compiler that refuses every fragment.
pub struct NullMathCompiler;

impl MathCompiler for NullMathCompiler {
    fn compile(&self, _source: &str, _display: bool, _output: &Path) -> Result<PathBuf> {
        Err(Error::MathCompile("math compilation disabled".to_string()))
    }
}

/// Highlighter that only escapes the source.
pub struct NullHighlighter;

impl CodeHighlighter for NullHighlighter {
    fn highlight(&self, source: &str, _options: &CodeOptions) -> String {
        crate::model::escape_text(source)
    }
}
