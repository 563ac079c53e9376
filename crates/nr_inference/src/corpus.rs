use nr_core::Article;
use tracing::debug;

pub const DEFAULT_MAX_CORPUS_CHARS: usize = 8000;
pub const ARTICLE_DELIMITER: &str = "\n\n---\n\n";
pub const UNKNOWN_PUBLISHED_AT: &str = "unknown";

/// An article is on topic iff the topic appears, case-insensitively, in its
/// title or raw excerpt.
pub fn matches_topic(topic: &str, title: &str, excerpt: &str) -> bool {
    let topic = topic.to_lowercase();
    title.to_lowercase().contains(&topic) || excerpt.to_lowercase().contains(&topic)
}

/// One article's contribution to the corpus.
pub fn article_block(article: &Article) -> String {
    let published = article
        .published_at
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| UNKNOWN_PUBLISHED_AT.to_string());
    format!(
        "Title: {}\nURL: {}\nPublished: {}\n\n{}",
        article.title, article.url, published, article.text
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Corpus {
    pub text: String,
    /// Number of leading input articles that made it into `text`
    pub included: usize,
}

impl Corpus {
    pub fn is_empty(&self) -> bool {
        self.included == 0
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CorpusBuilder {
    max_chars: usize,
}

impl Default for CorpusBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CORPUS_CHARS)
    }
}

impl CorpusBuilder {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// Concatenate whole article blocks in order until the next block (plus
    /// its delimiter) would exceed the character budget.
    pub fn build(&self, articles: &[Article]) -> Corpus {
        let delimiter_len = ARTICLE_DELIMITER.chars().count();
        let mut text = String::new();
        let mut used = 0;
        let mut included = 0;

        for article in articles {
            let block = article_block(article);
            let separator = if included > 0 { delimiter_len } else { 0 };
            let cost = separator + block.chars().count();
            if used + cost > self.max_chars {
                debug!(
                    "🧠 Corpus budget of {} chars reached; dropping {} of {} articles",
                    self.max_chars,
                    articles.len() - included,
                    articles.len()
                );
                break;
            }
            if included > 0 {
                text.push_str(ARTICLE_DELIMITER);
            }
            text.push_str(&block);
            used += cost;
            included += 1;
        }

        Corpus { text, included }
    }
}
