//! Imgur embed conversion.
//!
//! WordPress leaves embeds as `[embed]https://imgur.com/...[/embed]`
//! markers in the article text. Direct image URLs convert straight into
//! `img` elements; gallery URLs without a file extension require fetching
//! the embed page and scraping the image URL out of it.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::Result;
use crate::model::{Article, Tree};
use crate::transform::{is_protected, splice, PassContext, Protect};

// Accepts i.imgur.com, bare hashes, gallery and album forms. The hash is
// an odd number of word characters.
const IMGUR_URL: &str = concat!(
    r"(?:https?:)?//",
    r"(?:i\.)?",
    r"imgur\.com/",
    r"(?P<scheme>a/|gallery/)?",
    r"(?P<hash>[0-9A-Za-z_]{5}(?:[0-9A-Za-z_][0-9A-Za-z_])*)",
    r".?",
    r"(?P<ext>\.[0-9A-Za-z_]+)?",
);

static EMBED: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"\[embed\]{IMGUR_URL}\[/embed\]")).unwrap());
static IMAGE_URL: Lazy<Regex> = Lazy::new(|| Regex::new(IMGUR_URL).unwrap());

static SCRAPED_IMAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"id="image"[\s\S]*?<img[^>]*class="[^"]*post[^"]*"[^>]*src="([^"]+)""#).unwrap()
});

fn direct_url(hash: &str, ext: &str) -> String {
    format!("https://i.imgur.com/{hash}{ext}")
}

/// Resolve a gallery embed to a direct image URL by scraping the embed
/// page. Only the first image of a gallery is supported.
fn scrape_image_url(ctx: &PassContext<'_>, scheme: &str, hash: &str) -> Option<String> {
    let page_url = format!("https://imgur.com/{scheme}{hash}/embed?pub=true");
    let body = match ctx.fetcher.fetch(&page_url) {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!(url = %page_url, error = %e, "imgur embed fetch failed");
            return None;
        }
    };
    let html = String::from_utf8_lossy(&body);
    let src = SCRAPED_IMAGE.captures(&html).map(|c| c[1].to_string())?;
    let resolved = IMAGE_URL.captures(&src)?;
    let ext = resolved.name("ext").map(|m| m.as_str()).unwrap_or("");
    Some(direct_url(&resolved["hash"], ext))
}

/// Converts imgur embed markers into `img` elements.
pub fn convert_embeds(article: &mut Article, ctx: &PassContext<'_>) -> Result<()> {
    for id in article.tree.text_nodes() {
        if is_protected(&article.tree, id, Protect::Verbatim) {
            continue;
        }
        let mut current = id;
        // Offset into the current node, advanced past failed matches so
        // they are not retried forever.
        let mut pos = 0;
        loop {
            let Some(text) = article.tree.text(current) else {
                break;
            };
            let Some(caps) = EMBED.captures_at(text, pos) else {
                break;
            };
            let whole = match caps.get(0) {
                Some(m) => m,
                None => break,
            };
            let (start, end) = (whole.start(), whole.end());
            let hash = caps["hash"].to_string();
            let img_url = match caps.name("ext") {
                Some(ext) => Some(direct_url(&hash, ext.as_str())),
                None => {
                    let scheme = caps.name("scheme").map(|m| m.as_str()).unwrap_or("");
                    scrape_image_url(ctx, scheme, &hash)
                }
            };
            let Some(img_url) = img_url else {
                pos = end;
                continue;
            };
            let img = new_img(&mut article.tree, &img_url);
            match splice(&mut article.tree, current, start, end, img)? {
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

fn new_img(tree: &mut Tree, url: &str) -> crate::model::NodeId {
    tree.create_element("img", vec![("src".to_string(), url.to_string())])
}
