//! The span splicer: structural replacement of a matched substring.
//!
//! This is the primitive every pattern pass builds on. A match inside a
//! text node is consumed and replaced by an element; the surrounding text
//! is preserved in prefix/suffix text nodes threaded back into the sibling
//! sequence at the same position.

use crate::error::{Error, Result};
use crate::model::{NodeId, Tree};

/// Replace `start..end` of a text node's content with `replacement`.
///
/// The original node is replaced, in order, by the non-empty prefix text,
/// the replacement node, and the non-empty suffix text. Returns the suffix
/// node so a pass can continue scanning the remainder of the original
/// string without re-entering the replacement.
///
/// Total non-replacement character count is conserved apart from the
/// consumed match span, and sibling order is unchanged.
pub fn splice(
    tree: &mut Tree,
    text_id: NodeId,
    start: usize,
    end: usize,
    replacement: NodeId,
) -> Result<Option<NodeId>> {
    let content = tree
        .text(text_id)
        .ok_or_else(|| Error::Structure(format!("splice target {text_id:?} is not a text node")))?
        .to_string();

    if start > end || end > content.len() {
        return Err(Error::Structure(format!(
            "splice range {start}..{end} out of bounds for text of length {}",
            content.len()
        )));
    }
    if !content.is_char_boundary(start) || !content.is_char_boundary(end) {
        return Err(Error::Structure(format!(
            "splice range {start}..{end} not on character boundaries"
        )));
    }

    let prefix = &content[..start];
    let suffix = &content[end..];

    let mut replacements: Vec<NodeId> = Vec::with_capacity(3);
    if !prefix.is_empty() {
        replacements.push(tree.create_text(prefix));
    }
    replacements.push(replacement);
    let suffix_id = if suffix.is_empty() {
        None
    } else {
        let id = tree.create_text(suffix);
        replacements.push(id);
        Some(id)
    };

    if !tree.replace_with(text_id, &replacements) {
        return Err(Error::Structure(
            "splice target has no resolvable parent".to_string(),
        ));
    }

    Ok(suffix_id)
}
