use std::fmt;
use std::time::Duration;
use async_trait::async_trait;
use nr_core::{ArticleSource, Error, FeedItem, Result};
use reqwest::Client;
use rss::Channel;
use tracing::info;
use url::Url;

pub const DEFAULT_FEED_URL: &str = "https://feeds.bbci.co.uk/news/technology/rss.xml";
pub const DEFAULT_SOURCE_NAME: &str = "bbc_technology";

#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub feed_url: String,
    pub source_name: String,
    pub timeout: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            feed_url: DEFAULT_FEED_URL.to_string(),
            source_name: DEFAULT_SOURCE_NAME.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Article source backed by one RSS 2.0 feed.
pub struct RssSource {
    client: Client,
    feed_url: Url,
    source_name: String,
}

impl fmt::Debug for RssSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RssSource")
            .field("feed_url", &self.feed_url.as_str())
            .field("source_name", &self.source_name)
            .finish()
    }
}

impl RssSource {
    pub fn new(config: &FeedConfig) -> Result<Self> {
        let feed_url = Url::parse(&config.feed_url)
            .map_err(|e| Error::InvalidUrl(format!("{}: {}", config.feed_url, e)))?;
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            feed_url,
            source_name: config.source_name.clone(),
        })
    }
}

/// Map every `<item>` of an RSS document to a candidate. Items with neither a
/// title nor a link are dropped.
pub fn parse_feed(xml: &[u8]) -> Result<Vec<FeedItem>> {
    let channel = Channel::read_from(xml).map_err(|e| Error::Feed(format!("Invalid RSS feed: {}", e)))?;

    Ok(channel
        .items()
        .iter()
        .filter_map(|item| {
            let title = item.title().unwrap_or_default().trim().to_string();
            let url = item
                .link()
                .map(str::to_string)
                .or_else(|| item.guid().filter(|g| g.is_permalink()).map(|g| g.value().to_string()))
                .unwrap_or_default()
                .trim()
                .to_string();
            if title.is_empty() && url.is_empty() {
                return None;
            }
            Some(FeedItem {
                title,
                excerpt_html: item.description().unwrap_or_default().to_string(),
                url,
                published_at_raw: item.pub_date().map(str::to_string),
            })
        })
        .collect())
}

#[async_trait]
impl ArticleSource for RssSource {
    fn source_name(&self) -> &str {
        &self.source_name
    }

    async fn fetch_candidates(&self) -> Result<Vec<FeedItem>> {
        info!("🦗 Fetching feed {}", self.feed_url);
        let response = self.client.get(self.feed_url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Feed(format!("{} returned {}", self.feed_url, status)));
        }
        let body = response.bytes().await?;
        let items = parse_feed(&body)?;
        info!("🦗 Feed returned {} items", items.len());
        Ok(items)
    }
}
