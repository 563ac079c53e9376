pub mod clean;
pub mod collector;
pub mod feed;
pub mod manager;
pub mod schedule;

pub use clean::clean_html;
pub use collector::NewsCollector;
pub use feed::{FeedConfig, RssSource};
pub use manager::ReportManager;
pub use schedule::{run_periodic, IntervalTicker, OverlapPolicy, Ticker};

pub mod prelude {
    pub use super::{FeedConfig, NewsCollector, ReportManager, RssSource};
    pub use super::schedule::{run_periodic, IntervalTicker, OverlapPolicy, Ticker};
    pub use nr_core::{Article, ArticleSource, Error, FeedItem, Result};
}
