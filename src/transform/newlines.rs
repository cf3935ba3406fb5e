//! Newline normalization and line-break conversion.

use crate::error::Result;
use crate::model::{tags, Article, NodeId, Tree};
use crate::transform::{is_protected, PassContext, Protect};

/// Normalizes Windows-style line endings to LF.
pub fn normalize_newlines(article: &mut Article, _ctx: &PassContext<'_>) -> Result<()> {
    for id in article.tree.text_nodes() {
        if is_protected(&article.tree, id, Protect::Verbatim) {
            continue;
        }
        if let Some(text) = article.tree.text(id) {
            if text.contains("\r\n") {
                let replaced = text.replace("\r\n", "\n");
                article.tree.set_text(id, replaced);
            }
        }
    }
    Ok(())
}

/// Splits `text` at single newlines. A newline adjacent to another
/// newline is a paragraph break and stays inside its part.
fn split_single_newlines(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut parts = Vec::new();
    let mut part = String::new();
    for (idx, &c) in chars.iter().enumerate() {
        if c == '\n' {
            let prev = idx.checked_sub(1).map(|i| chars[i]);
            let next = chars.get(idx + 1).copied();
            if prev != Some('\n') && next != Some('\n') {
                parts.push(std::mem::take(&mut part));
                continue;
            }
        }
        part.push(c);
    }
    parts.push(part);
    parts
}

fn has_sibling(tree: &Tree, id: NodeId, offset: isize) -> bool {
    let Some(node) = tree.get(id) else {
        return false;
    };
    let Some(parent) = node.parent else {
        return false;
    };
    let Some(index) = tree.child_index(id) else {
        return false;
    };
    let target = index as isize + offset;
    target >= 0 && (target as usize) < tree.children(parent).len()
}

/// Replaces single newlines with the line separator character, which the
/// importer renders as a line break instead of a paragraph break.
///
/// A single newline at the very edge of a text node that borders another
/// node is kept as a real newline. Without this, poetry-style markup like
/// `line one\n<em>line two</em>` would fuse both lines into one
/// paragraph.
pub fn convert_line_breaks(article: &mut Article, _ctx: &PassContext<'_>) -> Result<()> {
    for id in article.tree.text_nodes() {
        if is_protected(&article.tree, id, Protect::Verbatim) {
            continue;
        }
        let Some(text) = article.tree.text(id).map(str::to_string) else {
            continue;
        };
        let mut parts = split_single_newlines(&text);
        let mut prefix = "";
        let mut suffix = "";
        if parts.first().is_some_and(String::is_empty) && has_sibling(&article.tree, id, -1) {
            parts.remove(0);
            prefix = "\n";
        }
        if parts.last().is_some_and(String::is_empty)
            && parts.len() > 1
            && has_sibling(&article.tree, id, 1)
        {
            parts.pop();
            suffix = "\n";
        }
        let separator = tags::LINE_SEPARATOR.to_string();
        let joined = format!("{prefix}{}{suffix}", parts.join(&separator));
        if joined != text {
            article.tree.set_text(id, joined);
        }
    }
    Ok(())
}
