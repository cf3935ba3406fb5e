//! Caption restructuring.
//!
//! The export format wraps the image inside its caption (sometimes as
//! `<img>`, sometimes `<a><img></a>`). The layout tool wants them apart:
//! images hoisted out, caption text in a `figcaption`.

use crate::error::Result;
use crate::model::tags::FIGCAPTION;
use crate::model::{Article, Tree};
use crate::transform::PassContext;

pub fn process_captions(article: &mut Article, _ctx: &PassContext<'_>) -> Result<()> {
    let tree = &mut article.tree;
    for caption in tree.elements_named(&["caption"]) {
        let kids = tree.children(caption).to_vec();

        let mut images = Vec::new();
        let mut non_images = Vec::new();
        for child in kids {
            if matches!(tree.tag(child), Some("a") | Some("img")) {
                images.push(child);
            } else {
                non_images.push(child);
            }
        }

        // The exporter likes to add a stray space at the start of the
        // caption text.
        strip_leading_space(tree, non_images.first().copied());

        let figcaption = tree.create_element(FIGCAPTION, Vec::new());
        for child in &non_images {
            tree.append_child(figcaption, *child);
        }

        let mut replacements = images;
        replacements.push(figcaption);
        if !tree.replace_with(caption, &replacements) {
            return Err(crate::error::Error::Structure(
                "caption has no parent to replace into".to_string(),
            ));
        }
    }
    Ok(())
}

fn strip_leading_space(tree: &mut Tree, first: Option<crate::model::NodeId>) {
    let Some(first) = first else { return };
    let Some(text) = tree.text(first) else { return };
    if let Some(stripped) = text.strip_prefix(' ') {
        let stripped = stripped.to_string();
        tree.set_text(first, stripped);
    }
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

    #[test]
    fn test_image_hoisted_and_text_captioned() {
        let mut article = article_with(r#"<caption><img src="a.png"/> A cat</caption>"#);
        let harness = TestHarness::new();
        process_captions(&mut article, &harness.ctx()).unwrap();

        let tree = &article.tree;
        let kids = tree.children(NodeId::ROOT).to_vec();
        assert_eq!(kids.len(), 2);
        assert_eq!(tree.tag(kids[0]), Some("img"));
        assert_eq!(tree.tag(kids[1]), Some("figcaption"));
        // Leading space stripped
        assert_eq!(tree.collect_text(kids[1]), "A cat");
        assert!(tree.elements_named(&["caption"]).is_empty());
    }

    #[test]
    fn test_anchor_wrapped_image_hoisted_whole() {
        let mut article =
            article_with(r#"<caption><a href="x"><img src="a.png"/></a>text</caption>"#);
        let harness = TestHarness::new();
        process_captions(&mut article, &harness.ctx()).unwrap();

        let tree = &article.tree;
        let kids = tree.children(NodeId::ROOT).to_vec();
        assert_eq!(tree.tag(kids[0]), Some("a"));
        assert_eq!(tree.tag(kids[1]), Some("figcaption"));
    }

    #[test]
    fn test_markup_inside_caption_preserved() {
        let mut article = article_with("<caption>a <em>fine</em> cat</caption>");
        let harness = TestHarness::new();
        process_captions(&mut article, &harness.ctx()).unwrap();

        let tree = &article.tree;
        let figs = tree.elements_named(&["figcaption"]);
        assert_eq!(figs.len(), 1);
        assert_eq!(tree.collect_text(figs[0]), "a fine cat");
        assert_eq!(tree.elements_named(&["em"]).len(), 1);
    }
}
