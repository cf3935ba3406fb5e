//! LaTeX math compilation.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::Result;
use crate::model::{tags, Article};
use crate::transform::{is_protected, splice, PassContext, Protect};

// \( ... \) inline and \[ ... \] display spans.
static MATH_SPAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\([\[(])([\s\S]+?)\\[\])]").unwrap());

/// Compiles math spans into PDF artifacts and replaces them with link
/// elements pointing at the artifact.
///
/// The artifact file name is the SHA-1 of the full span, so repeated
/// formulas compile once and reruns of the pipeline reuse the previous
/// output path. Spans that fail to compile are left in the text.
pub fn compile_math(article: &mut Article, ctx: &PassContext<'_>) -> Result<()> {
    // Memo of span -> artifact path. None marks a span that failed, so a
    // repeat of invalid markup is not recompiled.
    let mut compiled: HashMap<String, Option<std::path::PathBuf>> = HashMap::new();

    for id in article.tree.text_nodes() {
        if is_protected(&article.tree, id, Protect::Verbatim) {
            continue;
        }
        let mut current = id;
        let mut pos = 0;
        loop {
            let Some(text) = article.tree.text(current) else {
                break;
            };
            let Some(caps) = MATH_SPAN.captures_at(text, pos) else {
                break;
            };
            let whole = match caps.get(0) {
                Some(m) => m,
                None => break,
            };
            let (start, end) = (whole.start(), whole.end());
            let span = whole.as_str().to_string();
            let display = &caps[1] == "[";
            let source = caps[2].to_string();

            if !compiled.contains_key(&span) {
                let digest = sha1_smol::Sha1::from(span.as_bytes()).hexdigest();
                let output = ctx.assets.pdf_path(&article.pdf_asset_name(&digest));
                let artifact = match ctx.math.compile(&source, display, &output) {
                    Ok(path) => Some(path),
                    Err(e) => {
                        tracing::warn!(source = %source, error = %e, "math compilation failed");
                        None
                    }
                };
                compiled.insert(span.clone(), artifact);
            }
            let Some(Some(artifact)) = compiled.get(&span) else {
                pos = end;
                continue;
            };
            let href = format!("file://{}", artifact.display());
            let link = article
                .tree
                .create_element(tags::LINK, vec![("href".to_string(), href)]);
            match splice(&mut article.tree, current, start, end, link)? {
                Some(suffix) => {
                    current = suffix;
                    pos = 0;
                }
                None => break,
            }
        }
    }
    Ok(())
}
