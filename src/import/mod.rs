//! Export-dump importer.
//!
//! Reads a WordPress-style XML export (WXR), selects the articles tagged
//! for the requested issue that carry editorial approval, and builds an
//! [`Article`] with its content tree for each.

pub(crate) mod fragment;
mod markup;

pub use fragment::parse_into;
pub use markup::rewrite_brackets;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{Error, Result};
use crate::model::{Article, NodeId};

/// Category marking an article as approved for print.
pub const APPROVED_CATEGORY: &str = "Editor okayed";

#[derive(Default)]
struct RawItem {
    title: String,
    post_id: String,
    /// (domain attribute, category text)
    categories: Vec<(String, String)>,
    /// (meta_key, meta_value)
    metas: Vec<(String, String)>,
    content: String,
}

impl RawItem {
    /// An item belongs to the run iff it is tagged with the issue number
    /// and carries editorial approval.
    fn is_for_issue(&self, issue: &str) -> bool {
        let has_tag = self
            .categories
            .iter()
            .any(|(domain, text)| domain == "post_tag" && text == issue);
        let has_approval = self
            .categories
            .iter()
            .any(|(domain, text)| domain == "category" && text == APPROVED_CATEGORY);
        has_tag && has_approval
    }
}

/// Parse a dump and return the articles belonging to `issue`.
pub fn parse_dump(xml: &str, issue: &str) -> Result<Vec<Article>> {
    let mut reader = Reader::from_str(xml);

    let mut articles = Vec::new();
    let mut item: Option<RawItem> = None;
    // Path of open element names inside the current item.
    let mut path: Vec<String> = Vec::new();
    let mut buf_text = String::new();
    let mut category_domain = String::new();
    let mut meta_key = String::new();
    let mut meta_value = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if name == "item" && item.is_none() {
                    item = Some(RawItem::default());
                    continue;
                }
                if item.is_some() {
                    if name == "category" {
                        category_domain = e
                            .attributes()
                            .flatten()
                            .find(|a| a.key.as_ref() == b"domain")
                            .map(|a| String::from_utf8_lossy(&a.value).into_owned())
                            .unwrap_or_default();
                    }
                    path.push(name);
                    buf_text.clear();
                }
            }
            Ok(Event::Text(e)) => {
                if item.is_some() {
                    buf_text.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Ok(Event::CData(e)) => {
                if item.is_some() {
                    buf_text.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Ok(Event::GeneralRef(e)) => {
                if item.is_some() {
                    let entity = String::from_utf8_lossy(e.as_ref()).into_owned();
                    match fragment::resolve_entity(&entity) {
                        Some(resolved) => buf_text.push_str(&resolved),
                        None => buf_text.push_str(&format!("&{entity};")),
                    }
                }
            }
            Ok(Event::End(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if name == "item" {
                    if let Some(raw) = item.take() {
                        if raw.is_for_issue(issue) {
                            articles.push(build_article(raw)?);
                        }
                    }
                    path.clear();
                    continue;
                }
                let Some(raw) = item.as_mut() else { continue };
                match name.as_str() {
                    "title" if path.len() == 1 => raw.title = buf_text.clone(),
                    "wp:post_id" => raw.post_id = buf_text.trim().to_string(),
                    "category" => raw
                        .categories
                        .push((std::mem::take(&mut category_domain), buf_text.clone())),
                    "wp:meta_key" => meta_key = buf_text.clone(),
                    "wp:meta_value" => meta_value = buf_text.clone(),
                    "wp:postmeta" => raw
                        .metas
                        .push((std::mem::take(&mut meta_key), std::mem::take(&mut meta_value))),
                    "content:encoded" => raw.content = buf_text.clone(),
                    _ => {}
                }
                path.pop();
                buf_text.clear();
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(Error::InvalidDump(e.to_string())),
        }
    }

    Ok(articles)
}

/// Build an article from a raw dump item: apply the bracket rewrites,
/// parse the content fragment, and merge the postscript (wrapped in a
/// `footer`) into the content tree.
fn build_article(raw: RawItem) -> Result<Article> {
    let title = if raw.title.is_empty() {
        "[no title]".to_string()
    } else {
        raw.title
    };
    let mut article = Article::new(raw.post_id, title);

    let mut postscript = None;
    for (key, value) in &raw.metas {
        match key.as_str() {
            "mn_subtitle" => article.subtitle = Some(value.clone()),
            "mn_author" => article.author = Some(value.clone()),
            "mn_postscript" => postscript = Some(value.clone()),
            _ => {}
        }
    }

    let content = rewrite_brackets(&raw.content);
    fragment::parse_into(&mut article.tree, NodeId::ROOT, &content)?;

    if let Some(postscript) = postscript {
        let newline = article.tree.create_text("\n");
        article.tree.append_child(NodeId::ROOT, newline);
        let footer = article.tree.create_element("footer", Vec::new());
        article.tree.append_child(NodeId::ROOT, footer);
        fragment::parse_into(&mut article.tree, footer, &postscript)?;
    }

    tracing::debug!(
        id = %article.id,
        title = %article.title,
        nodes = article.tree.node_count(),
        "imported article"
    );
    Ok(article)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap_dump(items: &str) -> String {
        format!(
            "<?xml version=\"1.0\"?>\n<rss><channel><title>site</title>{items}</channel></rss>"
        )
    }

    fn item(title: &str, id: &str, issue: &str, approved: bool, content: &str) -> String {
        let approval = if approved {
            "<category domain=\"category\"><![CDATA[Editor okayed]]></category>"
        } else {
            ""
        };
        format!(
            "<item><title>{title}</title><wp:post_id>{id}</wp:post_id>\
             <category domain=\"post_tag\"><![CDATA[{issue}]]></category>{approval}\
             <content:encoded><![CDATA[{content}]]></content:encoded></item>"
        )
    }

    #[test]
    fn test_selects_approved_issue_items_only() {
        let dump = wrap_dump(&format!(
            "{}{}{}",
            item("Keep", "1", "v1i1", true, "hello"),
            item("Wrong issue", "2", "v1i2", true, "x"),
            item("Unapproved", "3", "v1i1", false, "x"),
        ));
        let articles = parse_dump(&dump, "v1i1").unwrap();
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title, "Keep");
        assert_eq!(articles[0].id, "1");
        assert_eq!(articles[0].tree.collect_text(NodeId::ROOT), "hello");
    }

    #[test]
    fn test_metadata_and_postscript() {
        let dump = wrap_dump(
            &format!(
                "<item><title>T</title><wp:post_id>9</wp:post_id>\
                 <category domain=\"post_tag\">v1i1</category>\
                 <category domain=\"category\">Editor okayed</category>\
                 <wp:postmeta><wp:meta_key>mn_author</wp:meta_key><wp:meta_value>A. Writer</wp:meta_value></wp:postmeta>\
                 <wp:postmeta><wp:meta_key>mn_subtitle</wp:meta_key><wp:meta_value>Sub</wp:meta_value></wp:postmeta>\
                 <wp:postmeta><wp:meta_key>mn_postscript</wp:meta_key><wp:meta_value><![CDATA[bye <em>now</em>]]></wp:meta_value></wp:postmeta>\
                 <content:encoded><![CDATA[body]]></content:encoded></item>"
            ),
        );
        let articles = parse_dump(&dump, "v1i1").unwrap();
        let article = &articles[0];
        assert_eq!(article.author.as_deref(), Some("A. Writer"));
        assert_eq!(article.subtitle.as_deref(), Some("Sub"));

        let tree = &article.tree;
        let footers = tree.elements_named(&["footer"]);
        assert_eq!(footers.len(), 1);
        assert_eq!(tree.collect_text(footers[0]), "bye now");
    }

    #[test]
    fn test_bracket_markup_becomes_elements() {
        let dump = wrap_dump(&item("T", "4", "v1i1", true, "[emphasis 2]hi[/emphasis 2]"));
        let articles = parse_dump(&dump, "v1i1").unwrap();
        let tree = &articles[0].tree;
        assert_eq!(tree.elements_named(&["em2"]).len(), 1);
    }

    #[test]
    fn test_missing_title_placeholder() {
        let dump = wrap_dump(&item("", "5", "v1i1", true, "x"));
        let articles = parse_dump(&dump, "v1i1").unwrap();
        assert_eq!(articles[0].title, "[no title]");
    }
}
