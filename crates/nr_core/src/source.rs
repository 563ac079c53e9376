use async_trait::async_trait;
use crate::types::FeedItem;
use crate::Result;

#[async_trait]
pub trait ArticleSource: Send + Sync {
    /// Label stored in `Article::source`
    fn source_name(&self) -> &str;

    /// Fetch the current candidate items, unfiltered
    async fn fetch_candidates(&self) -> Result<Vec<FeedItem>>;
}
