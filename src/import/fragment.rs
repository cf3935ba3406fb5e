//! Permissive markup fragment parser.
//!
//! Article content is HTML-like tag soup with ad-hoc element names
//! (`em2`, `aref`, `caption`, ...), so a conforming HTML parser is the
//! wrong tool: its content-model fixups would relocate or drop the ad-hoc
//! tags. This reads raw events and recovers from mismatched or stray end
//! tags with an open-element stack.

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::Result;
use crate::model::{NodeId, Tree};

/// Parse `markup` and append the resulting nodes as children of `parent`.
///
/// Recovery rules: an end tag with no matching open element is ignored; an
/// end tag matching a non-innermost open element closes everything inside
/// it; anything unparseable from the failure point on is kept as literal
/// text.
pub fn parse_into(tree: &mut Tree, parent: NodeId, markup: &str) -> Result<()> {
    let mut reader = Reader::from_str(markup);
    let config = reader.config_mut();
    config.check_end_names = false;
    config.allow_unmatched_ends = true;

    // Open-element stack; index 0 is the insertion parent.
    let mut stack: Vec<NodeId> = vec![parent];

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                let attrs = read_attrs(&e);
                let element = tree.create_element(&tag, attrs);
                let top = *stack.last().unwrap_or(&parent);
                tree.append_child(top, element);
                stack.push(element);
            }
            Ok(Event::Empty(e)) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                let attrs = read_attrs(&e);
                let element = tree.create_element(&tag, attrs);
                let top = *stack.last().unwrap_or(&parent);
                tree.append_child(top, element);
            }
            Ok(Event::End(e)) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                // Find the innermost open element with this tag; ignore the
                // end tag if there is none (stray closer stays harmless).
                if let Some(pos) = stack[1..]
                    .iter()
                    .rposition(|&id| tree.tag(id) == Some(tag.as_str()))
                {
                    stack.truncate(pos + 1);
                }
            }
            Ok(Event::Text(e)) => {
                let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                let top = *stack.last().unwrap_or(&parent);
                append_text(tree, top, &text);
            }
            Ok(Event::CData(e)) => {
                let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                let top = *stack.last().unwrap_or(&parent);
                append_text(tree, top, &text);
            }
            Ok(Event::GeneralRef(e)) => {
                let entity = String::from_utf8_lossy(e.as_ref()).into_owned();
                let top = *stack.last().unwrap_or(&parent);
                match resolve_entity(&entity) {
                    Some(resolved) => append_text(tree, top, &resolved),
                    // Unknown entity: keep it literally rather than dropping
                    // author text.
                    None => append_text(tree, top, &format!("&{entity};")),
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => {
                // Malformed from here on; keep the tail as literal text.
                let pos = (reader.buffer_position() as usize).min(markup.len());
                tracing::warn!(offset = pos, error = %err, "malformed markup, keeping tail as text");
                let top = *stack.last().unwrap_or(&parent);
                append_text(tree, top, &markup[pos..]);
                break;
            }
        }
    }

    Ok(())
}

fn read_attrs(e: &quick_xml::events::BytesStart<'_>) -> Vec<(String, String)> {
    e.attributes()
        .flatten()
        .map(|attr| {
            let name = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = match attr.unescape_value() {
                Ok(v) => v.into_owned(),
                Err(_) => String::from_utf8_lossy(&attr.value).into_owned(),
            };
            (name, value)
        })
        .collect()
}

/// Append text to `parent`, merging into a trailing text node.
fn append_text(tree: &mut Tree, parent: NodeId, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(&last) = tree.children(parent).last() {
        if let Some(existing) = tree.text(last) {
            let merged = format!("{existing}{text}");
            tree.set_text(last, merged);
            return;
        }
    }
    let node = tree.create_text(text);
    tree.append_child(parent, node);
}

pub(crate) fn resolve_entity(entity: &str) -> Option<String> {
    match entity {
        "apos" => return Some("'".to_string()),
        "quot" => return Some("\"".to_string()),
        "lt" => return Some("<".to_string()),
        "gt" => return Some(">".to_string()),
        "amp" => return Some("&".to_string()),
        "nbsp" => return Some("\u{00A0}".to_string()),
        "hellip" => return Some("\u{2026}".to_string()),
        "mdash" => return Some("\u{2014}".to_string()),
        "ndash" => return Some("\u{2013}".to_string()),
        _ => {}
    }

    if let Some(hex) = entity.strip_prefix("#x") {
        if let Ok(code) = u32::from_str_radix(hex, 16) {
            return char::from_u32(code).map(|c| c.to_string());
        }
    } else if let Some(dec) = entity.strip_prefix('#') {
        if let Ok(code) = dec.parse::<u32>() {
            return char::from_u32(code).map(|c| c.to_string());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(markup: &str) -> Tree {
        let mut tree = Tree::new();
        parse_into(&mut tree, NodeId::ROOT, markup).unwrap();
        tree
    }

    #[test]
    fn test_nested_elements_and_text() {
        let tree = parse("before <em>inner</em> after");
        let kids = tree.children(NodeId::ROOT).to_vec();
        assert_eq!(kids.len(), 3);
        assert_eq!(tree.text(kids[0]), Some("before "));
        assert_eq!(tree.tag(kids[1]), Some("em"));
        assert_eq!(tree.collect_text(kids[1]), "inner");
        assert_eq!(tree.text(kids[2]), Some(" after"));
    }

    #[test]
    fn test_ad_hoc_tags_survive() {
        let tree = parse("<caption width=\"300\">text <em2>x</em2></caption>");
        let kids = tree.children(NodeId::ROOT).to_vec();
        assert_eq!(tree.tag(kids[0]), Some("caption"));
        assert_eq!(tree.attr(kids[0], "width"), Some("300"));
        let inner = tree.children(kids[0]).to_vec();
        assert_eq!(tree.tag(inner[1]), Some("em2"));
    }

    #[test]
    fn test_stray_end_tag_ignored() {
        let tree = parse("a</em>b");
        assert_eq!(tree.collect_text(NodeId::ROOT), "ab");
    }

    #[test]
    fn test_unclosed_element_keeps_content() {
        let tree = parse("<em>open <strong>deep");
        let kids = tree.children(NodeId::ROOT).to_vec();
        assert_eq!(kids.len(), 1);
        assert_eq!(tree.tag(kids[0]), Some("em"));
        assert_eq!(tree.collect_text(kids[0]), "open deep");
    }

    #[test]
    fn test_entities_resolved() {
        let tree = parse("a &amp; b&nbsp;c &#8212; d");
        assert_eq!(tree.collect_text(NodeId::ROOT), "a & b\u{00A0}c \u{2014} d");
    }

    #[test]
    fn test_unknown_entity_kept_literal() {
        let tree = parse("x &weird; y");
        assert_eq!(tree.collect_text(NodeId::ROOT), "x &weird; y");
    }

    #[test]
    fn test_self_closing_element() {
        let tree = parse("an <img src=\"a.png\"/> image");
        let kids = tree.children(NodeId::ROOT).to_vec();
        assert_eq!(tree.tag(kids[1]), Some("img"));
        assert_eq!(tree.attr(kids[1], "src"), Some("a.png"));
    }
}
