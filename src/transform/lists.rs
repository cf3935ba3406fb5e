//! List restructuring for the importer.
//!
//! The importer understands neither `li` nor nested lists. List items are
//! flattened into newline-separated runs, each nesting level gets its own
//! tag (`ul2`, `ul3`, ...), and the first item of a top-level list is
//! wrapped in a marker tag for first-line styling.

use crate::error::Result;
use crate::model::{Article, NodeId, Tree};
use crate::transform::PassContext;

const UL_FAMILY: &[&str] = &["ul", "ul2", "ul3", "ul4", "ul5"];
const OL_FAMILY: &[&str] = &["ol", "ol2", "ol3"];

fn flatten_items(tree: &mut Tree, list: NodeId) {
    let old_children = tree.children(list).to_vec();
    let mut new_children: Vec<NodeId> = Vec::new();
    for child in old_children {
        if tree.is_text(child) {
            tree.detach(child);
            continue;
        }
        if tree.tag(child) == Some("li") {
            let items = tree.children(child).to_vec();
            tree.detach(child);
            new_children.extend(items);
        } else {
            tree.detach(child);
        }
        let marker = tree.create_text("\n");
        new_children.push(marker);
    }
    // The trailing marker would render as an empty final line.
    if let Some(last) = new_children.pop() {
        if tree.text(last) != Some("\n") {
            new_children.push(last);
        }
    }
    for child in new_children {
        tree.append_child(list, child);
    }
}

fn family_depth(tree: &Tree, list: NodeId, family: &[&str]) -> usize {
    let nested = tree
        .ancestors(list)
        .filter(|&a| matches!(tree.tag(a), Some(t) if family.contains(&t)))
        .count();
    nested + 1
}

fn retag_by_depth(tree: &mut Tree, lists: &[NodeId], family: &[&str]) {
    for &list in lists {
        let depth = family_depth(tree, list, family);
        if depth > 1 {
            let variant = family[depth.min(family.len()) - 1];
            tree.set_tag(list, variant);
        } else if let Some(&first) = tree.children(list).first() {
            let marker = format!("{}_first", family[0]);
            tree.wrap(first, &marker);
        }
    }
}

/// Flattens `li` items into newline-separated runs and renames nested
/// lists to their depth variant.
pub fn restructure_lists(article: &mut Article, _ctx: &PassContext<'_>) -> Result<()> {
    for list in article.tree.elements_named(&["ul", "ol"]) {
        flatten_items(&mut article.tree, list);
    }

    // Snapshots are taken per family before any renaming, and the
    // elements come back in document order, so an inner list still counts
    // its ancestors whether or not they were renamed first.
    let uls = article.tree.elements_named(&["ul"]);
    retag_by_depth(&mut article.tree, &uls, UL_FAMILY);
    let ols = article.tree.elements_named(&["ol"]);
    retag_by_depth(&mut article.tree, &ols, OL_FAMILY);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodeId;
    use crate::transform::testutil::TestHarness;

    fn article_with(markup: &str) -> Article {
        let mut article = Article::new("1", "T");
        crate::import::parse_into(&mut article.tree, NodeId::ROOT, markup).unwrap();
        article
    }

    fn rendered(article: &Article) -> String {
        article.tree.render_markup(NodeId::ROOT)
    }

    #[test]
    fn test_flat_list() {
        let harness = TestHarness::new();
        let mut article = article_with("<ul><li>one</li><li>two</li></ul>");
        restructure_lists(&mut article, &harness.ctx()).unwrap();
        assert_eq!(
            rendered(&article),
            "<ul><ul_first>one</ul_first>\ntwo</ul>"
        );
    }

    #[test]
    fn test_nested_list_gets_depth_tag() {
        let harness = TestHarness::new();
        let mut article =
            article_with("<ul><li>outer<ul><li>inner</li></ul></li></ul>");
        restructure_lists(&mut article, &harness.ctx()).unwrap();
        assert_eq!(
            rendered(&article),
            "<ul><ul_first>outer</ul_first><ul2>inner</ul2></ul>"
        );
    }

    #[test]
    fn test_ordered_depth_capped() {
        let harness = TestHarness::new();
        let mut article = article_with(
            "<ol><li><ol><li><ol><li><ol><li>deep</li></ol></li></ol></li></ol></li></ol>",
        );
        restructure_lists(&mut article, &harness.ctx()).unwrap();
        // Depth four exceeds the ol family, so it stays at the deepest
        // variant instead of inventing ol4.
        assert_eq!(
            rendered(&article),
            "<ol><ol_first><ol2><ol3><ol3>deep</ol3></ol3></ol2></ol_first></ol>"
        );
    }

    #[test]
    fn test_whitespace_between_items_dropped() {
        let harness = TestHarness::new();
        let mut article = article_with("<ul>\n<li>a</li>\n<li>b</li>\n</ul>");
        restructure_lists(&mut article, &harness.ctx()).unwrap();
        assert_eq!(rendered(&article), "<ul><ul_first>a</ul_first>\nb</ul>");
    }

    #[test]
    fn test_mixed_families_count_separately() {
        let harness = TestHarness::new();
        let mut article =
            article_with("<ul><li><ol><li>num</li></ol></li></ul>");
        restructure_lists(&mut article, &harness.ctx()).unwrap();
        // The ol sits at ul depth 2 but ol depth 1, so it keeps its name
        // and gets a first-item marker.
        assert_eq!(
            rendered(&article),
            "<ul><ul_first><ol><ol_first>num</ol_first></ol></ul_first></ul>"
        );
    }
}
