//! Character-level typography passes: ellipses, bare links, dashes,
//! space collapsing, and rating fractions.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::Result;
use crate::model::{tags, Article};
use crate::transform::{is_protected, splice, PassContext, Protect};

/// Replaces `...` with a single ellipsis character.
pub fn replace_ellipses(article: &mut Article, _ctx: &PassContext<'_>) -> Result<()> {
    for id in article.tree.text_nodes() {
        if is_protected(&article.tree, id, Protect::Verbatim) {
            continue;
        }
        if let Some(text) = article.tree.text(id) {
            if text.contains("...") {
                let replaced = text.replace("...", "\u{2026}");
                article.tree.set_text(id, replaced);
            }
        }
    }
    Ok(())
}

// URL characters per RFC 3986, with the punctuation-free subset used for
// the final character so a trailing period or comma stays prose.
const URL_CHARS: &str = r"[A-Za-z0-9\-._~:/?#\[\]@!$&'()*+,;%=]";
const URL_CHARS_NO_PUNCT: &str = r"[A-Za-z0-9\-_~/#\[\]@$&'()*+%=]";

static BARE_LINK: Lazy<Regex> = Lazy::new(|| {
    let prefix = format!("{URL_CHARS}+");
    let suffix = format!("(?:{URL_CHARS}*{URL_CHARS_NO_PUNCT}+)?");
    Regex::new(&format!(
        r"({prefix}(?:\.com|\.ca|\.org|\.gov)(?:{suffix})?)"
    ))
    .unwrap()
});

/// Wraps bare URLs in link elements, keyed off a small set of TLDs.
pub fn convert_bare_links(article: &mut Article, _ctx: &PassContext<'_>) -> Result<()> {
    for id in article.tree.text_nodes() {
        if is_protected(&article.tree, id, Protect::Verbatim)
            || is_protected(&article.tree, id, Protect::Link)
        {
            continue;
        }
        let mut current = id;
        loop {
            let Some(text) = article.tree.text(current) else {
                break;
            };
            let Some(m) = BARE_LINK.find(text) else {
                break;
            };
            let url = m.as_str().to_string();
            let (start, end) = (m.start(), m.end());
            let link = article
                .tree
                .create_element(tags::LINK, vec![("href".to_string(), url.clone())]);
            let label = article.tree.create_text(url);
            article.tree.append_child(link, label);
            match splice(&mut article.tree, current, start, end, link)? {
                Some(suffix) => current = suffix,
                None => break,
            }
        }
    }
    Ok(())
}

static NUMERIC_RANGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d) ?--? ?(\d)").unwrap());

/// Replaces spacing hyphens with em dashes and numeric-range hyphens
/// with en dashes. The em dash ends up space-padded regardless of how
/// the author spaced the original hyphens.
pub fn replace_dashes(article: &mut Article, _ctx: &PassContext<'_>) -> Result<()> {
    for id in article.tree.text_nodes() {
        if is_protected(&article.tree, id, Protect::Verbatim)
            || is_protected(&article.tree, id, Protect::Link)
        {
            continue;
        }
        let Some(text) = article.tree.text(id) else {
            continue;
        };
        // Adjacent ranges like "1-2-3" overlap on the shared digit, and a
        // single sweep leaves the second hyphen behind. Two sweeps converge.
        let mut replaced = NUMERIC_RANGE
            .replace_all(text, "${1}\u{2013}${2}")
            .into_owned();
        replaced = NUMERIC_RANGE
            .replace_all(&replaced, "${1}\u{2013}${2}")
            .into_owned();
        let replaced = replaced
            .replace(" - ", "\u{2014}")
            .replace(" --- ", "\u{2014}")
            .replace("---", "\u{2014}")
            .replace(" -- ", "\u{2014}")
            .replace("--", "\u{2014}")
            .replace(" \u{2014} ", "\u{2014}")
            .replace('\u{2014}', " \u{2014} ");
        article.tree.set_text(id, replaced);
    }
    Ok(())
}

// Characters after which a run of spaces is collapsible. ASCII
// alphanumerics and punctuation, Latin-1 letters, and the interrobang.
const SINGLE_SPACED: &str = "[A-Za-z0-9\u{C0}-\u{D6}\u{D8}-\u{F6}\u{F8}-\u{FF}!-/:-@\\[-`{-~\u{203D}]";

static NBSP_SPACE_PAIRS: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("({SINGLE_SPACED})(?:\u{A0} )+")).unwrap());
static MULTI_SPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("({SINGLE_SPACED})  +")).unwrap());

/// Collapses runs of spaces after a word or punctuation character.
///
/// Some source documents arrive with punctuation followed by a
/// no-break-space/space pair, likely an editor artifact. Those pairs are
/// removed first so later passes never see a no-break space.
pub fn collapse_extra_spaces(article: &mut Article, _ctx: &PassContext<'_>) -> Result<()> {
    let mut removed = false;
    let mut nbsp_pairs = false;
    for id in article.tree.text_nodes() {
        if is_protected(&article.tree, id, Protect::Verbatim) {
            continue;
        }
        let Some(text) = article.tree.text(id).map(str::to_string) else {
            continue;
        };
        let depaired = NBSP_SPACE_PAIRS.replace_all(&text, "${1} ").into_owned();
        if depaired != text {
            nbsp_pairs = true;
        }
        let collapsed = MULTI_SPACE.replace_all(&depaired, "${1} ").into_owned();
        if collapsed != text {
            removed = true;
            article.tree.set_text(id, collapsed);
        }
    }
    if removed || nbsp_pairs {
        tracing::info!(
            article = %article.title,
            nbsp_pairs,
            "removed extraneous spaces"
        );
    }
    Ok(())
}

static RATING: Lazy<Regex> = Lazy::new(|| Regex::new(r"([0-9]+)/10").unwrap());

/// Surrounds the slash in N/10 ratings with hair spaces so the importer
/// does not typeset them as fractions.
pub fn hairspace_fractions(article: &mut Article, _ctx: &PassContext<'_>) -> Result<()> {
    let hair = tags::HAIR_SPACE;
    for id in article.tree.text_nodes() {
        if is_protected(&article.tree, id, Protect::Verbatim) {
            continue;
        }
        let Some(text) = article.tree.text(id).map(str::to_string) else {
            continue;
        };
        let replaced = RATING
            .replace_all(&text, format!("${{1}}{hair}/{hair}10"))
            .into_owned();
        if replaced != text {
            article.tree.set_text(id, replaced);
        }
    }
    Ok(())
}
