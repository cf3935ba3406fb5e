//! Nested emphasis collapsing.

use crate::error::Result;
use crate::model::{tags, Article};
use crate::transform::PassContext;

/// Renames italics nested in bold (and bold nested in italics) to `em2`,
/// the importer's combined bold-italic style.
pub fn collapse_nested_emphasis(article: &mut Article, _ctx: &PassContext<'_>) -> Result<()> {
    for bold in article.tree.elements_named(&["b", "strong"]) {
        for id in article.tree.descendants(bold) {
            if matches!(article.tree.tag(id), Some("i" | "em")) {
                article.tree.set_tag(id, tags::EM2);
            }
        }
    }
    // Fresh snapshot so italics renamed above are no longer candidates.
    for italic in article.tree.elements_named(&["i", "em"]) {
        for id in article.tree.descendants(italic) {
            if matches!(article.tree.tag(id), Some("b" | "strong")) {
                article.tree.set_tag(id, tags::EM2);
            }
        }
    }
    Ok(())
}
