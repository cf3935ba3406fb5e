//! Issue serialization.
//!
//! Renders the transformed articles into a single `<issue>` document for
//! import. The layout favors one structural element per line so a human
//! can skim the output; content markup is emitted exactly as rendered
//! from the tree.

use crate::model::{escape_text, Article, NodeId};

/// Render an article's content, inserting the author byline.
///
/// The byline goes in front of the `footer` postscript when one exists,
/// otherwise at the end of the content.
fn render_content(article: &Article) -> String {
    let tree = &article.tree;
    let byline = article
        .author
        .as_deref()
        .map(|author| format!("<address>{}</address>", escape_text(author)));

    let mut out = String::new();
    let mut emitted_byline = byline.is_none();
    for &child in tree.children(NodeId::ROOT) {
        if !emitted_byline && tree.tag(child) == Some("footer") {
            if let Some(byline) = &byline {
                out.push_str(byline);
                out.push('\n');
            }
            emitted_byline = true;
        }
        out.push_str(&tree.render_node_markup(child));
    }
    if !emitted_byline {
        if let Some(byline) = &byline {
            out.push('\n');
            out.push_str(byline);
        }
    }
    out
}

fn serialize_article(article: &Article, out: &mut String) {
    out.push_str("<article>\n");
    out.push_str(&format!("<title>{}</title>\n", escape_text(&article.title)));
    if let Some(subtitle) = &article.subtitle {
        out.push_str(&format!(
            "<subtitle>{}</subtitle>\n",
            escape_text(subtitle)
        ));
    }
    out.push_str(&format!("<content>{}</content>\n", render_content(article)));
    out.push_str("</article>");
}

/// Serialize a full issue.
pub fn serialize_issue(articles: &[Article]) -> String {
    let mut out = String::from("<issue>\n");
    for article in articles {
        serialize_article(article, &mut out);
        out.push('\n');
    }
    out.push_str("</issue>\n");
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::NodeId;

    fn article_with(markup: &str) -> Article {
        let mut article = Article::new("1", "Untitled");
        crate::import::parse_into(&mut article.tree, NodeId::ROOT, markup).unwrap();
        article
    }

    #[test]
    fn test_issue_layout() {
        let mut article = article_with("Body text");
        article.title = "A & B".to_string();
        article.subtitle = Some("sub".to_string());
        let output = serialize_issue(&[article]);
        assert_eq!(
            output,
            "<issue>\n<article>\n<title>A &amp; B</title>\n\
             <subtitle>sub</subtitle>\n<content>Body text</content>\n\
             </article>\n</issue>\n"
        );
    }

    #[test]
    fn test_author_before_footer() {
        let mut article = article_with("Body\n<footer>ps</footer>");
        article.author = Some("teeth".to_string());
        let output = serialize_issue(&[article]);
        assert!(output.contains("Body\n<address>teeth</address>\n<footer>ps</footer>"));
    }

    #[test]
    fn test_author_appended_without_footer() {
        let mut article = article_with("Body");
        article.author = Some("teeth".to_string());
        let output = serialize_issue(&[article]);
        assert!(output.contains("<content>Body\n<address>teeth</address></content>"));
    }

    #[test]
    fn test_no_subtitle_line_when_absent() {
        let article = article_with("Body");
        let output = serialize_issue(&[article]);
        assert!(!output.contains("<subtitle>"));
    }
}
