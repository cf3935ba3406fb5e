//! Error types for prepress operations.

use thiserror::Error;

/// Errors that can occur while importing, transforming, or exporting
/// articles.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Covers malformed dump structure and reader failures; fragment-level
    /// markup errors never surface here, the fragment parser recovers.
    #[error("Invalid export dump: {0}")]
    InvalidDump(String),

    /// A tree invariant was violated mid-pass. Fatal for the article being
    /// processed; the run continues with the remaining articles.
    #[error("Tree structure error: {0}")]
    Structure(String),

    /// Resource fetch failure (network collaborator). Recoverable: the
    /// offending match is left unconverted.
    #[error("Fetch error for {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// Math compilation failure (compiler collaborator). Recoverable.
    #[error("Math compile error: {0}")]
    MathCompile(String),
}

pub type Result<T> = std::result::Result<T, Error>;
