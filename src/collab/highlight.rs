//! Built-in line-oriented code highlighter.
//!
//! Emits markup reusing the manual-highlight vocabulary: keywords as
//! `hl_bold`, string literals as `hl_underline`, comments as `hl_italic`.
//! The text payload is escaped but otherwise untouched, so the verbatim
//! invariant holds.

use crate::model::escape_text;
use crate::model::tags::{HL_BOLD, HL_ITALIC, HL_UNDERLINE};

use super::{CodeHighlighter, CodeOptions};

struct LangSpec {
    names: &'static [&'static str],
    keywords: &'static [&'static str],
    comment: &'static str,
}

static LANGS: &[LangSpec] = &[
    LangSpec {
        names: &["rust", "rs"],
        keywords: &[
            "as", "break", "const", "continue", "crate", "else", "enum", "extern", "false", "fn",
            "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref",
            "return", "self", "static", "struct", "trait", "true", "type", "unsafe", "use",
            "where", "while",
        ],
        comment: "//",
    },
    LangSpec {
        names: &["python", "py"],
        keywords: &[
            "False", "None", "True", "and", "as", "assert", "break", "class", "continue", "def",
            "del", "elif", "else", "except", "finally", "for", "from", "global", "if", "import",
            "in", "is", "lambda", "not", "or", "pass", "raise", "return", "try", "while", "with",
            "yield",
        ],
        comment: "#",
    },
    LangSpec {
        names: &["c", "cpp", "c++"],
        keywords: &[
            "break", "case", "char", "const", "continue", "default", "do", "double", "else",
            "enum", "float", "for", "if", "int", "long", "return", "short", "signed", "sizeof",
            "static", "struct", "switch", "typedef", "union", "unsigned", "void", "while",
        ],
        comment: "//",
    },
];

fn find_lang(name: &str) -> Option<&'static LangSpec> {
    let lower = name.to_lowercase();
    LANGS.iter().find(|spec| spec.names.contains(&lower.as_str()))
}

/// Keyword/string/comment highlighter keyed by the `:lang:` option.
///
/// With no language (or an unknown one) the source is passed through
/// escaped, matching what an empty highlight step would produce.
pub struct KeywordHighlighter;

impl CodeHighlighter for KeywordHighlighter {
    fn highlight(&self, source: &str, options: &CodeOptions) -> String {
        let lang = options.get("lang").or_else(|| options.get("language"));
        let spec = match lang.and_then(find_lang) {
            Some(spec) => spec,
            None => return escape_text(source),
        };
        let lines: Vec<String> = source
            .split('\n')
            .map(|line| highlight_line(line, spec))
            .collect();
        lines.join("\n")
    }
}

fn highlight_line(line: &str, spec: &LangSpec) -> String {
    let mut out = String::with_capacity(line.len());
    let chars: Vec<char> = line.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let rest: String = chars[i..].iter().collect();

        // Comment runs to end of line.
        if rest.starts_with(spec.comment) {
            out.push_str(&format!("<{HL_ITALIC}>{}</{HL_ITALIC}>", escape_text(&rest)));
            break;
        }

        let c = chars[i];

        // String literal.
        if c == '"' {
            let mut j = i + 1;
            while j < chars.len() && chars[j] != '"' {
                if chars[j] == '\\' {
                    j += 1;
                }
                j += 1;
            }
            let end = (j + 1).min(chars.len());
            let literal: String = chars[i..end].iter().collect();
            out.push_str(&format!(
                "<{HL_UNDERLINE}>{}</{HL_UNDERLINE}>",
                escape_text(&literal)
            ));
            i = end;
            continue;
        }

        // Identifier or keyword.
        if c.is_alphabetic() || c == '_' {
            let mut j = i;
            while j < chars.len() && (chars[j].is_alphanumeric() || chars[j] == '_') {
                j += 1;
            }
            let word: String = chars[i..j].iter().collect();
            if spec.keywords.contains(&word.as_str()) {
                out.push_str(&format!("<{HL_BOLD}>{word}</{HL_BOLD}>"));
            } else {
                out.push_str(&escape_text(&word));
            }
            i = j;
            continue;
        }

        out.push_str(&escape_text(&c.to_string()));
        i += 1;
    }

    out
}
