use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::tagged_cache::{Tagged, TaggedCache};

/// How a path revalidation matches cached pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RevalidateType {
    /// Only the page at exactly this path.
    Page,
    /// The path and every page below it.
    Layout,
}

#[derive(Debug, Clone)]
pub struct CachedPage {
    pub html: Arc<str>,
    /// The path the visitor asked for, before the flag code was added.
    pub public_path: String,
    pub rendered_at: DateTime<Utc>,
}

/// Rendered pages keyed by rewritten path, so every flag combination of a
/// page is cached on its own.
#[derive(Clone)]
pub struct PageCache {
    inner: TaggedCache<String, CachedPage>,
}

impl PageCache {
    pub fn new(max_capacity: u64, ttl: Duration) -> Self {
        PageCache {
            inner: TaggedCache::new("pages", max_capacity, Some(ttl)),
        }
    }

    pub async fn get(&self, rewritten_path: &str) -> Option<CachedPage> {
        self.inner.get(&rewritten_path.to_string()).await
    }

    pub async fn insert(&self, rewritten_path: String, page: CachedPage, tags: &[&str]) {
        self.inner.insert(rewritten_path, page, tags).await;
    }

    pub fn generation(&self) -> u64 {
        self.inner.generation()
    }

    /// Caches a page rendered while the cache was at generation `seen`,
    /// unless a revalidation happened during the render.
    pub async fn insert_unless_revalidated(
        &self,
        rewritten_path: String,
        page: CachedPage,
        tags: &[&str],
        seen: u64,
    ) -> bool {
        self.inner
            .insert_unless_invalidated(rewritten_path, page, tags, seen)
            .await
    }

    pub fn revalidate_tag(&self, tag: &str) -> Result<(), moka::PredicateError> {
        self.inner.invalidate_tag(tag)
    }

    pub fn revalidate_path(
        &self,
        path: &str,
        kind: RevalidateType,
    ) -> Result<(), moka::PredicateError> {
        let target = normalize_path(path);
        self.inner
            .invalidate_where(move |_, entry: &Tagged<CachedPage>| {
                path_matches(&entry.value.public_path, &target, kind)
            })
    }
}

fn normalize_path(path: &str) -> String {
    let trimmed = path.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

pub fn path_matches(public_path: &str, target: &str, kind: RevalidateType) -> bool {
    let public_path = normalize_path(public_path);
    match kind {
        RevalidateType::Page => public_path == target,
        RevalidateType::Layout => {
            target == "/"
                || public_path == target
                || public_path
                    .strip_prefix(target)
                    .is_some_and(|rest| rest.starts_with('/'))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn page(public_path: &str) -> CachedPage {
        CachedPage {
            html: Arc::from("<html></html>"),
            public_path: public_path.to_string(),
            rendered_at: Utc::now(),
        }
    }

    #[rstest]
    #[case("/", "/", RevalidateType::Page, true)]
    #[case("/products/1", "/", RevalidateType::Page, false)]
    #[case("/products/1", "/", RevalidateType::Layout, true)]
    #[case("/products/1", "/products", RevalidateType::Layout, true)]
    #[case("/products/1", "/products/", RevalidateType::Layout, true)]
    #[case("/products/1", "/products/1", RevalidateType::Page, true)]
    #[case("/products/10", "/products/1", RevalidateType::Layout, false)]
    #[case("/productsale", "/products", RevalidateType::Layout, false)]
    #[case("/products/1", "products/1", RevalidateType::Page, true)]
    fn test_path_matches(
        #[case] public_path: &str,
        #[case] target: &str,
        #[case] kind: RevalidateType,
        #[case] expected: bool,
    ) {
        assert_eq!(
            path_matches(public_path, &normalize_path(target), kind),
            expected
        );
    }

    #[tokio::test]
    async fn test_revalidate_path_drops_every_variant_of_a_page() {
        let cache = PageCache::new(100, Duration::from_secs(60));
        cache.insert("/codeA".to_string(), page("/"), &["products"]).await;
        cache.insert("/codeB".to_string(), page("/"), &["products"]).await;
        cache
            .insert("/codeA/products/1".to_string(), page("/products/1"), &["products"])
            .await;

        cache.revalidate_path("/", RevalidateType::Page).unwrap();

        assert!(cache.get("/codeA").await.is_none());
        assert!(cache.get("/codeB").await.is_none());
        assert!(cache.get("/codeA/products/1").await.is_some());
    }

    #[tokio::test]
    async fn test_revalidate_tag_drops_tagged_pages() {
        let cache = PageCache::new(100, Duration::from_secs(60));
        cache.insert("/codeA".to_string(), page("/"), &["products"]).await;
        cache.insert("/codeA/other".to_string(), page("/other"), &[]).await;

        cache.revalidate_tag("products").unwrap();

        assert!(cache.get("/codeA").await.is_none());
        assert!(cache.get("/codeA/other").await.is_some());
    }

    #[tokio::test]
    async fn test_page_rendered_across_a_revalidation_is_not_cached() {
        let cache = PageCache::new(100, Duration::from_secs(60));
        let seen = cache.generation();

        cache.revalidate_path("/", RevalidateType::Page).unwrap();
        let cached = cache
            .insert_unless_revalidated("/codeA".to_string(), page("/"), &["products"], seen)
            .await;

        assert!(!cached);
        assert!(cache.get("/codeA").await.is_none());
    }
}
