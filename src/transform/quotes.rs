//! Directional quotes and quote/punctuation ordering.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::Result;
use crate::model::Article;
use crate::transform::{is_protected, PassContext, Protect};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Opening,
    Closing,
}

/// A quote opens when nothing, whitespace, or opening punctuation
/// precedes it. Everything else closes.
fn quote_direction(before: Option<char>) -> Direction {
    match before {
        None => Direction::Opening,
        Some(c) if c.is_whitespace() => Direction::Opening,
        Some('(' | '[' | '{' | '\u{2018}' | '\u{201C}') => Direction::Opening,
        Some(_) => Direction::Closing,
    }
}

fn directional_double(direction: Direction) -> char {
    match direction {
        Direction::Opening => '\u{201C}',
        Direction::Closing => '\u{201D}',
    }
}

fn directional_single(direction: Direction) -> char {
    match direction {
        Direction::Opening => '\u{2018}',
        Direction::Closing => '\u{2019}',
    }
}

fn replace_directional_quotes(chars: &mut [char]) {
    for idx in 0..chars.len() {
        if chars[idx] != '"' && chars[idx] != '\'' {
            continue;
        }
        // Replacements made earlier in this array are deliberately visible
        // here, so a run like '"' '"' alternates open/close correctly.
        let before = if idx == 0 { None } else { Some(chars[idx - 1]) };
        let direction = quote_direction(before);
        chars[idx] = if chars[idx] == '"' {
            directional_double(direction)
        } else {
            directional_single(direction)
        };
    }
}

/// Replaces straight quotes with directional quotes, double and single.
///
/// A quote at the edge of a text node would otherwise see no neighbor and
/// pick the wrong direction (`"<em>text</em>"` puts the opening quote at
/// the end of its node). Each node is therefore processed with one
/// character glued on from each adjacent text node, taken from a snapshot
/// of the original contents, and the glue is stripped again afterwards.
pub fn add_directional_quotes(article: &mut Article, _ctx: &PassContext<'_>) -> Result<()> {
    let snapshot: Vec<_> = article
        .tree
        .text_nodes()
        .into_iter()
        .filter_map(|id| article.tree.text(id).map(|t| (id, t.to_string())))
        .collect();

    for (idx, (id, original)) in snapshot.iter().enumerate() {
        if is_protected(&article.tree, *id, Protect::Verbatim)
            || is_protected(&article.tree, *id, Protect::Link)
        {
            continue;
        }
        let glue_before = idx
            .checked_sub(1)
            .and_then(|i| snapshot[i].1.chars().next_back());
        let glue_after = snapshot.get(idx + 1).and_then(|(_, t)| t.chars().next());

        let mut chars: Vec<char> = Vec::with_capacity(original.chars().count() + 2);
        if let Some(c) = glue_before {
            chars.push(c);
        }
        chars.extend(original.chars());
        if let Some(c) = glue_after {
            chars.push(c);
        }

        replace_directional_quotes(&mut chars);

        let start = usize::from(glue_before.is_some());
        let end = chars.len() - usize::from(glue_after.is_some());
        let replaced: String = chars[start..end].iter().collect();
        if replaced != *original {
            article.tree.set_text(*id, replaced);
        }
    }
    Ok(())
}

static PUNCT_AFTER_QUOTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([\u{2019}\u{201D}])([.!?;:,])").unwrap());

/// Moves punctuation that trails a closing quote to inside the quote.
pub fn punctuation_into_quotes(article: &mut Article, _ctx: &PassContext<'_>) -> Result<()> {
    for id in article.tree.text_nodes() {
        if is_protected(&article.tree, id, Protect::Verbatim)
            || is_protected(&article.tree, id, Protect::Link)
        {
            continue;
        }
        let Some(text) = article.tree.text(id).map(str::to_string) else {
            continue;
        };
        let replaced = PUNCT_AFTER_QUOTE.replace_all(&text, "$2$1").into_owned();
        if replaced != text {
            article.tree.set_text(id, replaced);
        }
    }
    Ok(())
}
