//! Bracket-markup rewriting.
//!
//! Export content uses square-bracket shorthand for semantic tags
//! (`[emphasis 2]`, `[str1]`, `[caption width="300"]`, ...). These are
//! rewritten into element tags before the fragment is parsed.

use once_cell::sync::Lazy;
use regex::Regex;

static CAPTION_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[caption([^\]]*)\]").unwrap());

/// Non-caption substitutions, applied in order.
static SUBS: &[(&str, &str)] = &[
    (r"[/caption]", "</caption>"),
    (r"[emphasis 1]", "<em>"),
    (r"[/emphasis 1]", "</em>"),
    (r"[emphasis 2]", "<em2>"),
    (r"[/emphasis 2]", "</em2>"),
    (r"[emphasis 3]", "<em3>"),
    (r"[/emphasis 3]", "</em3>"),
    (r"[emphasis 4]", "<em4>"),
    (r"[/emphasis 4]", "</em4>"),
    (r"[em1]", "<em>"),
    (r"[/em1]", "</em>"),
    (r"[em2]", "<em2>"),
    (r"[/em2]", "</em2>"),
    (r"[em3]", "<em3>"),
    (r"[/em3]", "</em3>"),
    (r"[em4]", "<em4>"),
    (r"[/em4]", "</em4>"),
    (r"[stress 1]", "<strong>"),
    (r"[/stress 1]", "</strong>"),
    (r"[stress 2]", "<strong2>"),
    (r"[/stress 2]", "</strong2>"),
    (r"[str1]", "<strong>"),
    (r"[/str1]", "</strong>"),
    (r"[str2]", "<strong2>"),
    (r"[/str2]", "</strong2>"),
    (r"[article]", "<aref>"),
    (r"[/article]", "</aref>"),
    (r"[aref]", "<aref>"),
    (r"[/aref]", "</aref>"),
    (r"[math]", "<imath>"),
    (r"[/math]", "</imath>"),
];

/// Rewrite bracket markup into element tags. Unknown bracket sequences
/// (including `[embed]` and footnote markers) are left untouched; later
/// passes handle them.
pub fn rewrite_brackets(content: &str) -> String {
    let mut out = CAPTION_OPEN.replace_all(content, "<caption$1>").into_owned();
    for (pattern, replacement) in SUBS {
        out = out.replace(pattern, replacement);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emphasis_variants() {
        assert_eq!(
            rewrite_brackets("[emphasis 1]a[/emphasis 1] [em3]b[/em3]"),
            "<em>a</em> <em3>b</em3>"
        );
    }

    #[test]
    fn test_stress_and_aref() {
        assert_eq!(
            rewrite_brackets("[str2]x[/str2] [article]T[/article]"),
            "<strong2>x</strong2> <aref>T</aref>"
        );
    }

    #[test]
    fn test_caption_keeps_attributes() {
        assert_eq!(
            rewrite_brackets(r#"[caption id="a" width="300"]pic[/caption]"#),
            r#"<caption id="a" width="300">pic</caption>"#
        );
    }

    #[test]
    fn test_unknown_brackets_untouched() {
        assert_eq!(rewrite_brackets("note[1] and [embed]u[/embed]"), "note[1] and [embed]u[/embed]");
    }
}
