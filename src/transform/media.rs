//! Remote image localization.

use crate::error::Result;
use crate::model::{tags, Article};
use crate::transform::PassContext;

/// Last path segment of a URL, with query and fragment stripped.
fn url_file_name(url: &str) -> &str {
    let path = url
        .split_once(['?', '#'])
        .map(|(path, _)| path)
        .unwrap_or(url);
    path.rsplit('/').next().unwrap_or(path)
}

/// Downloads every `img` source into the asset store and turns the
/// element into a `link` pointing at the local copy, which is the form
/// the importer understands.
///
/// Sourceless images are skipped, as are images whose download fails.
pub fn localize_images(article: &mut Article, ctx: &PassContext<'_>) -> Result<()> {
    for (index, img) in article.tree.elements_named(&["img"]).into_iter().enumerate() {
        let Some(url) = article.tree.attr(img, "src").map(str::to_string) else {
            continue;
        };
        let name = article.image_asset_name(url_file_name(&url), index);
        let bytes = match ctx.fetcher.fetch(&url) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "image download failed");
                continue;
            }
        };
        let local = ctx.assets.write_image(&name, &bytes)?;
        tracing::info!(url = %url, path = %local.display(), "stored image");
        article.tree.set_tag(img, tags::LINK);
        article
            .tree
            .set_attr(img, "href", &format!("file://{}", local.display()));
    }
    Ok(())
}
