use std::collections::HashSet;
use std::sync::Arc;
use chrono::{DateTime, Utc};
use nr_core::{Article, ArticleSource, FeedItem};
use nr_inference::corpus::matches_topic;
use tracing::{debug, info, warn};
use crate::clean::clean_html;

/// Parse an RSS (RFC 2822) or ISO-8601 (RFC 3339) timestamp.
pub fn parse_published_at(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map(|t| t.with_timezone(&Utc))
        .ok()
}

/// Pulls candidates from a source and turns the on-topic ones into articles.
pub struct NewsCollector {
    source: Arc<dyn ArticleSource>,
}

impl NewsCollector {
    pub fn new(source: Arc<dyn ArticleSource>) -> Self {
        Self { source }
    }

    fn to_article(&self, item: FeedItem) -> Article {
        let excerpt = clean_html(&item.excerpt_html);
        Article {
            source: self.source.source_name().to_string(),
            published_at: item.published_at_raw.as_deref().and_then(parse_published_at),
            text: format!("{}\n\n{}", item.title, excerpt),
            url: item.url,
            title: item.title,
        }
    }

    /// An unreachable source yields no articles rather than an error.
    pub async fn collect(&self, topic: &str, max_articles: usize) -> Vec<Article> {
        let candidates = match self.source.fetch_candidates().await {
            Ok(items) => items,
            Err(e) => {
                warn!("⚠️ Source {} unavailable: {}. Continuing with no articles.", self.source.source_name(), e);
                return Vec::new();
            }
        };
        let total = candidates.len();

        let mut seen_urls = HashSet::new();
        let articles: Vec<Article> = candidates
            .into_iter()
            .filter(|item| matches_topic(topic, &item.title, &item.excerpt_html))
            .filter(|item| seen_urls.insert(item.url.clone()))
            .take(max_articles)
            .map(|item| self.to_article(item))
            .collect();

        for article in &articles {
            debug!("🦗 Selected {} - {}", article.title, article.url);
        }
        info!("🦗 {} of {} items match topic '{}'", articles.len(), total, topic);
        articles
    }
}
