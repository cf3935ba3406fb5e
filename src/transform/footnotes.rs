//! Footnote marker numbering and placement.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::Result;
use crate::model::{tags, Article};
use crate::transform::{is_protected, splice, PassContext, Protect};

static MARKER_BEFORE_PUNCT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\[\d*\])([.,!?;:])").unwrap());

/// Moves footnote markers after adjacent trailing punctuation, so the
/// rendered superscript lands at the end of the sentence. Runs before
/// numbering while markers are still plain text.
pub fn markers_after_punctuation(article: &mut Article, _ctx: &PassContext<'_>) -> Result<()> {
    for id in article.tree.text_nodes() {
        if is_protected(&article.tree, id, Protect::Verbatim) {
            continue;
        }
        let Some(text) = article.tree.text(id).map(str::to_string) else {
            continue;
        };
        let replaced = MARKER_BEFORE_PUNCT.replace_all(&text, "$2$1").into_owned();
        if replaced != text {
            article.tree.set_text(id, replaced);
        }
    }
    Ok(())
}

static MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[(\d*)\]").unwrap());

/// Converts `[N]` and `[]` markers into numbered sup elements.
///
/// Empty markers take the running counter. An explicit number is kept
/// as written and pulls the counter forward when it is ahead of it; the
/// counter never moves backwards, so a stray low number cannot renumber
/// the rest of the article.
pub fn number_footnotes(article: &mut Article, _ctx: &PassContext<'_>) -> Result<()> {
    let mut counter: u32 = 1;
    for id in article.tree.text_nodes() {
        if is_protected(&article.tree, id, Protect::Verbatim) {
            continue;
        }
        let mut current = id;
        loop {
            let Some(text) = article.tree.text(current) else {
                break;
            };
            let Some(caps) = MARKER.captures(text) else {
                break;
            };
            let whole = caps.get(0).ok_or_else(|| {
                crate::error::Error::Structure("marker match without span".to_string())
            })?;
            let (start, end) = (whole.start(), whole.end());
            // A written number past u32::MAX clamps instead of falling
            // back to the counter, and the counter saturates so a huge
            // explicit marker cannot wrap it back to low numbers.
            let digits = &caps[1];
            let explicit = if digits.is_empty() {
                None
            } else {
                Some(digits.parse::<u32>().unwrap_or(u32::MAX))
            };
            let number = explicit.unwrap_or(counter);
            match explicit {
                None => counter = counter.saturating_add(1),
                Some(n) => counter = counter.max(n.saturating_add(1)),
            }
            let sup = article.tree.create_element(tags::SUP, Vec::new());
            let label = article.tree.create_text(number.to_string());
            article.tree.append_child(sup, label);
            match splice(&mut article.tree, current, start, end, sup)? {
                Some(suffix) => current = suffix,
                None => break,
            }
        }
    }
    Ok(())
}
