//! Inline code, manual highlighting, and code block formatting.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::collab::CodeOptions;
use crate::error::Result;
use crate::import::parse_into;
use crate::model::{tags, Article};
use crate::transform::{is_protected, splice, PassContext, Protect};

static INLINE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([\s\S]+?)`").unwrap());

/// Replaces Markdown-style backtick spans with code elements.
pub fn convert_inline_code(article: &mut Article, _ctx: &PassContext<'_>) -> Result<()> {
    for id in article.tree.text_nodes() {
        if is_protected(&article.tree, id, Protect::Verbatim) {
            continue;
        }
        let mut current = id;
        loop {
            let Some(text) = article.tree.text(current) else {
                break;
            };
            let Some(caps) = INLINE_CODE.captures(text) else {
                break;
            };
            let whole = match caps.get(0) {
                Some(m) => m,
                None => break,
            };
            let (start, end) = (whole.start(), whole.end());
            let source = caps[1].to_string();
            let code = article.tree.create_element("code", Vec::new());
            let body = article.tree.create_text(source);
            article.tree.append_child(code, body);
            match splice(&mut article.tree, current, start, end, code)? {
                Some(suffix) => current = suffix,
                None => break,
            }
        }
    }
    Ok(())
}

/// Renames hand-written emphasis inside verbatim regions to the
/// highlight vocabulary, so authors can mark up their own code.
pub fn convert_manual_highlights(article: &mut Article, _ctx: &PassContext<'_>) -> Result<()> {
    for verbatim in article.tree.elements_named(tags::VERBATIM_TAGS) {
        for id in article.tree.descendants(verbatim) {
            match article.tree.tag(id) {
                Some("b" | "strong") => article.tree.set_tag(id, tags::HL_BOLD),
                Some("i" | "em") => article.tree.set_tag(id, tags::HL_ITALIC),
                Some("u") => article.tree.set_tag(id, tags::HL_UNDERLINE),
                _ => {}
            }
        }
    }
    Ok(())
}

static OPTION: Lazy<Regex> = Lazy::new(|| Regex::new(r":(\S+?):[ \t]*([^\n]*)").unwrap());
static OPTIONS_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\s*:\S+?:[ \t]*[^\n]*\n)+[ \t]*\n+").unwrap());

/// Splits the `:name: value` option block off the top of a code block.
fn take_options(contents: &str) -> (CodeOptions, &str) {
    let mut options = CodeOptions::new();
    let Some(block) = OPTIONS_BLOCK.find(contents) else {
        return (options, contents);
    };
    for caps in OPTION.captures_iter(block.as_str()) {
        options.insert(&caps[1], &caps[2]);
    }
    (options, &contents[block.end()..])
}

/// Resolves entity references produced by the markup renderer back into
/// plain text. The inverse of escaping, used before handing a code block
/// to the highlighter.
fn unescape_text(markup: &str) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut rest = markup;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp + 1..];
        match tail.find(';') {
            Some(semi) => {
                let entity = &tail[..semi];
                match crate::import::fragment::resolve_entity(entity) {
                    Some(resolved) => out.push_str(&resolved),
                    None => {
                        out.push('&');
                        out.push_str(entity);
                        out.push(';');
                    }
                }
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

fn number_lines(markup: &str) -> String {
    let lines: Vec<&str> = markup.split('\n').collect();
    let last = lines.len().saturating_sub(1);
    lines
        .iter()
        .enumerate()
        .map(|(idx, line)| {
            if idx == last && line.is_empty() {
                String::new()
            } else {
                format!("<{0}>{1}</{0}>{line}", tags::LINENO, idx + 1)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Formats `pre` blocks: parses the option block, runs the highlighter,
/// and numbers lines when requested. The result replaces the old block
/// as `pre > code`.
///
/// Blocks that already contain element markup (manual highlights) keep
/// it; the highlighter only sees all-text blocks.
pub fn format_code_blocks(article: &mut Article, ctx: &PassContext<'_>) -> Result<()> {
    for pre in article.tree.elements_named(&["pre"]) {
        let contents = article.tree.render_markup(pre);
        let (options, body) = take_options(&contents);
        let mut markup = if body.contains('<') {
            body.to_string()
        } else {
            ctx.highlighter.highlight(&unescape_text(body), &options)
        };
        if options.has("linenos") {
            markup = number_lines(&markup);
        }

        let staging = article.tree.create_element("pre", Vec::new());
        let code = article.tree.create_element("code", Vec::new());
        article.tree.append_child(staging, code);
        parse_into(&mut article.tree, code, &markup)?;
        if !article.tree.replace_with(pre, &[staging]) {
            return Err(crate::error::Error::Structure(
                "code block has no parent to replace into".to_string(),
            ));
        }
    }
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
    fn test_backticks_become_code() {
        let harness = TestHarness::new();
        let mut article = article_with("run `ls -la` twice");
        convert_inline_code(&mut article, &harness.ctx()).unwrap();
        assert_eq!(rendered(&article), "run <code>ls -la</code> twice");
    }

    #[test]
    fn test_backticks_inside_code_kept() {
        let harness = TestHarness::new();
        let mut article = article_with("<code>`raw`</code>");
        convert_inline_code(&mut article, &harness.ctx()).unwrap();
        assert_eq!(rendered(&article), "<code>`raw`</code>");
    }

    #[test]
    fn test_manual_highlight_tags_renamed() {
        let harness = TestHarness::new();
        let mut article =
            article_with("<pre><b>if</b> x. <i>note</i> <u>lit</u></pre> <b>keep</b>");
        convert_manual_highlights(&mut article, &harness.ctx()).unwrap();
        assert_eq!(
            rendered(&article),
            "<pre><hl_bold>if</hl_bold> x. <hl_italic>note</hl_italic> \
             <hl_underline>lit</hl_underline></pre> <b>keep</b>"
        );
    }

    #[test]
    fn test_take_options() {
        let (options, body) = take_options(":lang: python\n:linenos:\n\nx = 1\n");
        assert_eq!(options.get("lang"), Some("python"));
        assert!(options.has("linenos"));
        assert_eq!(body, "x = 1\n");
    }

    #[test]
    fn test_no_options_block() {
        let (options, body) = take_options("x = 1\n");
        assert!(options.is_empty());
        assert_eq!(body, "x = 1\n");
    }

    #[test]
    fn test_unescape_text() {
        assert_eq!(unescape_text("a &lt; b &amp;&amp; c"), "a < b && c");
        assert_eq!(unescape_text("no entities"), "no entities");
        assert_eq!(unescape_text("dangling & amp"), "dangling & amp");
    }

    #[test]
    fn test_number_lines() {
        assert_eq!(
            number_lines("a\nb\n"),
            "<lineno>1</lineno>a\n<lineno>2</lineno>b\n"
        );
    }

    #[test]
    fn test_formatted_block_detaches_old_pre() {
        let harness = TestHarness::new();
        let mut article = article_with("<pre>let x = 1;</pre>");
        let old = article.tree.elements_named(&["pre"])[0];
        format_code_blocks(&mut article, &harness.ctx()).unwrap();
        assert_eq!(article.tree.get(old).unwrap().parent, None);
        assert!(rendered(&article).starts_with("<pre><code>"));
    }

    #[test]
    fn test_code_block_highlighted() {
        let harness = TestHarness::new();
        let mut article = article_with("<pre>:lang: rust\n\nlet x = 1;</pre>");
        format_code_blocks(&mut article, &harness.ctx()).unwrap();
        assert_eq!(
            rendered(&article),
            "<pre><code><hl_bold>let</hl_bold> x = 1;</code></pre>"
        );
    }

    #[test]
    fn test_code_block_without_options_wrapped() {
        let harness = TestHarness::new();
        let mut article = article_with("<pre>plain text</pre>");
        format_code_blocks(&mut article, &harness.ctx()).unwrap();
        assert_eq!(rendered(&article), "<pre><code>plain text</code></pre>");
    }

    #[test]
    fn test_code_block_with_linenos() {
        let harness = TestHarness::new();
        let mut article = article_with("<pre>:linenos:\n\na\nb</pre>");
        format_code_blocks(&mut article, &harness.ctx()).unwrap();
        assert_eq!(
            rendered(&article),
            "<pre><code><lineno>1</lineno>a\n<lineno>2</lineno>b</code></pre>"
        );
    }

    #[test]
    fn test_manual_markup_block_preserved() {
        let harness = TestHarness::new();
        let mut article = article_with("<pre><hl_bold>if</hl_bold> x</pre>");
        format_code_blocks(&mut article, &harness.ctx()).unwrap();
        assert_eq!(
            rendered(&article),
            "<pre><code><hl_bold>if</hl_bold> x</code></pre>"
        );
    }
}
