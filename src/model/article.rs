//! Article representation.

use super::arena::Tree;

/// One article: export metadata plus its content tree.
///
/// Constructed by the importer, mutated in place by the pipeline, consumed
/// by the serializer.
#[derive(Debug, Clone)]
pub struct Article {
    /// Unique post ID from the export dump.
    pub id: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub author: Option<String>,
    /// Content tree (postscript, if any, is merged in before passes run).
    pub tree: Tree,
}

impl Article {
    /// Create an empty article with the given id and title.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            subtitle: None,
            author: None,
            tree: Tree::new(),
        }
    }

    /// Filesystem-safe slug: first 10 title characters with non-ASCII
    /// dropped, spaces as underscores, non-word characters removed, plus
    /// the article id to prevent title collisions.
    pub fn slug(&self) -> String {
        let mut prefix: String = self
            .title
            .chars()
            .take(10)
            .filter(|c| c.is_ascii())
            .map(|c| if c == ' ' { '_' } else { c })
            .collect();
        prefix.retain(|c| c.is_ascii_alphanumeric() || c == '_');
        format!("{}_{}", prefix, self.id)
    }

    /// Asset file name for the `index`-th image in this article.
    pub fn image_asset_name(&self, file: &str, index: usize) -> String {
        format!("{}_{:03}_{}", self.slug(), index, file)
    }

    /// Asset file name for a math artifact identified by content hash.
    pub fn pdf_asset_name(&self, hash: &str) -> String {
        format!("{}_{}", self.slug(), hash)
    }
}
