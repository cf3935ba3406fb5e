//! Tag vocabulary shared across passes.
//!
//! These names must match the downstream importer's expectations exactly,
//! so they live in one place instead of being scattered as string literals.

/// Tags whose text content must survive the pipeline byte-for-byte.
pub const VERBATIM_TAGS: &[&str] = &["pre", "code"];

/// Hyperlink tag. Punctuation-normalization passes must not rewrite inside
/// an already-resolved link.
pub const LINK: &str = "link";

/// Footnote marker container.
pub const SUP: &str = "sup";

/// Figure caption produced from bracket-tagged captions.
pub const FIGCAPTION: &str = "figcaption";

/// Combined bold+italic emphasis.
pub const EM2: &str = "em2";

/// Manual-highlight roles used inside code containers.
pub const HL_BOLD: &str = "hl_bold";
pub const HL_ITALIC: &str = "hl_italic";
pub const HL_UNDERLINE: &str = "hl_underline";

/// Line number element inside formatted code blocks.
pub const LINENO: &str = "lineno";

/// Unicode LINE SEPARATOR: survives desktop-publishing import as a line
/// break where a plain newline would become a paragraph break.
pub const LINE_SEPARATOR: char = '\u{2028}';

/// Hair space, used to defeat automatic fraction formatting.
pub const HAIR_SPACE: char = '\u{200A}';
