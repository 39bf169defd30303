//! Page Loader
//!
//! Resolves a requested slug against the published documents and fetches
//! that document's full block list, following pagination cursors.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use super::{CmsClient, CmsError, CmsResult, DocumentFilter, PageObject};
use crate::content::{Article, ArticleSummary, BlockKind, ContentBlock};
use crate::slug;

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Loads articles from a [`CmsClient`]
pub struct PageLoader {
    client: Arc<dyn CmsClient>,
    filter: DocumentFilter,
    fetch_nested: bool,
    max_depth: usize,
}

impl PageLoader {
    /// Create a loader; nested toggle children are not fetched by default
    pub fn new(client: Arc<dyn CmsClient>, filter: DocumentFilter) -> Self {
        Self {
            client,
            filter,
            fetch_nested: false,
            max_depth: crate::content::render::DEFAULT_MAX_DEPTH,
        }
    }

    /// Also fetch the children of toggle blocks, down to `max_depth` levels
    pub fn with_nested(mut self, fetch_nested: bool, max_depth: usize) -> Self {
        self.fetch_nested = fetch_nested;
        self.max_depth = max_depth;
        self
    }

    /// All published documents, in CMS order
    pub async fn documents(&self) -> CmsResult<Vec<PageObject>> {
        let mut documents = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let page = self
                .client
                .query_documents(&self.filter, cursor.as_deref())
                .await?;
            let next = page.continuation().map(str::to_string);
            documents.extend(page.results.into_iter().filter(PageObject::is_page));

            match next {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        tracing::debug!(count = documents.len(), "Loaded published documents");
        Ok(documents)
    }

    /// Slugs of all published documents that have a usable title
    pub async fn list_slugs(&self) -> CmsResult<Vec<String>> {
        Ok(self
            .list_articles()
            .await?
            .into_iter()
            .map(|summary| summary.slug)
            .collect())
    }

    /// Listing entries for all published documents that have a usable title
    pub async fn list_articles(&self) -> CmsResult<Vec<ArticleSummary>> {
        let summaries = self
            .documents()
            .await?
            .iter()
            .filter_map(|doc| {
                let title = doc.title()?;
                let slug = slug::slugify(title);
                if slug.is_empty() {
                    return None;
                }
                Some(ArticleSummary {
                    slug,
                    title: title.to_string(),
                    published: doc.published(),
                })
            })
            .collect();
        Ok(summaries)
    }

    /// First published document whose derived slug equals `slug`
    pub async fn resolve(&self, slug: &str) -> CmsResult<PageObject> {
        self.documents()
            .await?
            .into_iter()
            .find(|doc| doc.title().is_some_and(|title| slug::matches(title, slug)))
            .ok_or_else(|| CmsError::NotFound {
                slug: slug.to_string(),
            })
    }

    /// Every child block of `block_id`, concatenated in page order
    pub async fn fetch_blocks(&self, block_id: &str) -> CmsResult<Vec<ContentBlock>> {
        let mut blocks = Vec::new();
        let mut cursor: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let page = self.client.list_children(block_id, cursor.as_deref()).await?;
            pages += 1;
            let next = page.continuation().map(str::to_string);
            blocks.extend(page.results);

            match next {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        tracing::debug!(block_id, pages, count = blocks.len(), "Fetched block children");
        Ok(blocks)
    }

    /// Resolve `slug` and load the whole article
    pub async fn load(&self, slug: &str) -> CmsResult<Article> {
        let page = self.resolve(slug).await?;
        let mut blocks = self.fetch_blocks(&page.id).await?;

        if self.fetch_nested {
            self.attach_children(&mut blocks, 1).await?;
        }

        tracing::info!(slug, blocks = blocks.len(), "Loaded article");

        Ok(Article {
            slug: slug.to_string(),
            title: page.title().unwrap_or_default().to_string(),
            published: page.published(),
            last_edited: page.last_edited(),
            blocks,
        })
    }

    fn attach_children<'a>(
        &'a self,
        blocks: &'a mut [ContentBlock],
        depth: usize,
    ) -> BoxFuture<'a, CmsResult<()>> {
        Box::pin(async move {
            for block in blocks.iter_mut() {
                let needs_fetch = block.has_children
                    && matches!(&block.kind, BlockKind::Toggle(toggle) if toggle.children.is_empty());
                if !needs_fetch {
                    continue;
                }
                if depth > self.max_depth {
                    tracing::warn!(block_id = %block.id, depth, "Skipping children beyond nesting limit");
                    continue;
                }

                let mut children = self.fetch_blocks(&block.id).await?;
                self.attach_children(&mut children, depth + 1).await?;
                if let Some(slot) = block.children_mut() {
                    *slot = children;
                }
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cms::Paginated;
    use crate::content::{RichText, TextBlock, ToggleBlock};
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory CMS: each listing is split into pages chained by
    /// cursors named after the page index.
    #[derive(Default)]
    struct FakeCms {
        documents: Vec<Vec<PageObject>>,
        children: HashMap<String, Vec<Vec<ContentBlock>>>,
        calls: AtomicUsize,
    }

    fn paginate<T: Clone>(pages: &[Vec<T>], cursor: Option<&str>) -> Paginated<T> {
        let index = cursor
            .and_then(|c| c.strip_prefix("cursor-"))
            .and_then(|n| n.parse::<usize>().ok())
            .unwrap_or(0);
        let has_more = index + 1 < pages.len();
        Paginated {
            results: pages.get(index).cloned().unwrap_or_default(),
            has_more,
            next_cursor: has_more.then(|| format!("cursor-{}", index + 1)),
        }
    }

    #[async_trait]
    impl CmsClient for FakeCms {
        async fn query_documents(
            &self,
            _filter: &DocumentFilter,
            cursor: Option<&str>,
        ) -> CmsResult<Paginated<PageObject>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(paginate(&self.documents, cursor))
        }

        async fn list_children(
            &self,
            block_id: &str,
            cursor: Option<&str>,
        ) -> CmsResult<Paginated<ContentBlock>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let pages = self.children.get(block_id).cloned().unwrap_or_default();
            Ok(paginate(&pages, cursor))
        }
    }

    fn document(id: &str, title: &str) -> PageObject {
        serde_json::from_value(json!({
            "object": "page",
            "id": id,
            "properties": {
                "Name": { "title": [{ "plain_text": title }] },
                "Published": { "date": { "start": "2022-03-04" } },
                "LastEdited": { "last_edited_time": "2022-03-06T12:00:00.000Z" }
            }
        }))
        .unwrap()
    }

    fn paragraph(id: &str) -> ContentBlock {
        ContentBlock::new(
            id,
            BlockKind::Paragraph(TextBlock::new(vec![RichText::plain(id)])),
        )
    }

    fn loader(cms: FakeCms) -> PageLoader {
        PageLoader::new(Arc::new(cms), DocumentFilter::default())
    }

    #[tokio::test]
    async fn test_resolve_by_derived_slug() {
        let cms = FakeCms {
            documents: vec![vec![
                document("doc-1", "Hello World!"),
                document("doc-2", "Other Post"),
            ]],
            ..Default::default()
        };
        let loader = loader(cms);

        let page = loader.resolve("hello-world").await.unwrap();
        assert_eq!(page.id, "doc-1");

        let page = loader.resolve("other-post").await.unwrap();
        assert_eq!(page.id, "doc-2");
    }

    #[tokio::test]
    async fn test_resolve_missing_slug_fails() {
        let cms = FakeCms {
            documents: vec![vec![document("doc-1", "Hello World!")]],
            ..Default::default()
        };
        let err = loader(cms).resolve("nope").await.unwrap_err();
        assert!(matches!(err, CmsError::NotFound { slug } if slug == "nope"));
    }

    #[tokio::test]
    async fn test_resolve_follows_document_pages() {
        let cms = Arc::new(FakeCms {
            documents: vec![
                vec![document("doc-1", "First")],
                vec![document("doc-2", "Second Post")],
            ],
            ..Default::default()
        });
        let page = PageLoader::new(cms.clone(), DocumentFilter::default())
            .resolve("second-post")
            .await
            .unwrap();
        assert_eq!(page.id, "doc-2");
        assert_eq!(cms.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_fetch_blocks_concatenates_pages() {
        let pages = vec![
            vec![paragraph("a"), paragraph("b"), paragraph("c")],
            vec![paragraph("d")],
            vec![paragraph("e"), paragraph("f")],
        ];
        let mut children = HashMap::new();
        children.insert("doc-1".to_string(), pages);
        let cms = Arc::new(FakeCms {
            children,
            ..Default::default()
        });

        let loader = PageLoader::new(cms.clone(), DocumentFilter::default());
        let blocks = loader.fetch_blocks("doc-1").await.unwrap();
        let ids: Vec<&str> = blocks.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c", "d", "e", "f"]);
        assert_eq!(cms.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_load_article() {
        let mut children = HashMap::new();
        children.insert(
            "doc-1".to_string(),
            vec![vec![paragraph("a")], vec![paragraph("b")]],
        );
        let cms = FakeCms {
            documents: vec![vec![document("doc-1", "Hello World!")]],
            children,
            ..Default::default()
        };

        let article = loader(cms).load("hello-world").await.unwrap();
        assert_eq!(article.title, "Hello World!");
        assert_eq!(article.slug, "hello-world");
        assert_eq!(article.blocks.len(), 2);
        assert!(article.published.is_some());
        assert!(article.last_edited.is_some());
    }

    #[tokio::test]
    async fn test_list_slugs_skips_untitled() {
        let mut untitled = document("doc-3", "x");
        untitled.properties.remove("Name");
        let cms = FakeCms {
            documents: vec![vec![
                document("doc-1", "Hello World!"),
                untitled,
                document("doc-2", "Other Post"),
            ]],
            ..Default::default()
        };
        let slugs = loader(cms).list_slugs().await.unwrap();
        assert_eq!(slugs, vec!["hello-world", "other-post"]);
    }

    #[tokio::test]
    async fn test_nested_toggle_children_fetched() {
        let mut toggle = ContentBlock::new(
            "toggle-1",
            BlockKind::Toggle(ToggleBlock {
                rich_text: Some(vec![RichText::plain("More")]),
                children: vec![],
            }),
        );
        toggle.has_children = true;

        let mut children = HashMap::new();
        children.insert("doc-1".to_string(), vec![vec![paragraph("a"), toggle]]);
        children.insert("toggle-1".to_string(), vec![vec![paragraph("inner")]]);

        let cms = FakeCms {
            documents: vec![vec![document("doc-1", "Hello World!")]],
            children,
            ..Default::default()
        };

        let flat = loader(FakeCms {
            documents: cms.documents.clone(),
            children: cms.children.clone(),
            ..Default::default()
        })
        .load("hello-world")
        .await
        .unwrap();
        assert!(flat.blocks[1].children().unwrap().is_empty());

        let nested = loader(cms)
            .with_nested(true, 4)
            .load("hello-world")
            .await
            .unwrap();
        let inner = nested.blocks[1].children().unwrap();
        assert_eq!(inner.len(), 1);
        assert_eq!(inner[0].id, "inner");
        assert_eq!(nested.block_count(), 3);
    }
}
