use std::sync::Arc;
use nr_core::{ArticleSource, InferenceModel, Report, ReportStorage, Result};
use nr_inference::{CorpusBuilder, ReportSynthesizer};
use tracing::info;
use crate::collector::NewsCollector;

/// Runs one fetch → synthesize → persist cycle.
pub struct ReportManager {
    collector: NewsCollector,
    synthesizer: ReportSynthesizer,
    storage: Arc<dyn ReportStorage>,
}

impl ReportManager {
    pub fn new(
        source: Arc<dyn ArticleSource>,
        inference: Arc<dyn InferenceModel>,
        storage: Arc<dyn ReportStorage>,
        corpus: CorpusBuilder,
    ) -> Self {
        Self {
            collector: NewsCollector::new(source),
            synthesizer: ReportSynthesizer::new(inference, corpus),
            storage,
        }
    }

    /// Nothing is persisted when the model call fails.
    pub async fn run_cycle(&self, topic: &str, max_articles: usize) -> Result<Report> {
        info!("📰 Running report cycle for topic '{}'", topic);
        let articles = self.collector.collect(topic, max_articles).await;
        let report = self.synthesizer.synthesize(topic, &articles).await?;
        self.storage.save(&report).await?;
        info!(
            "✨ Report generated at {} ({} articles)",
            report.generated_at.to_rfc3339(),
            report.article_count
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use nr_core::FeedItem;
    use nr_inference::models::DummyModel;
    use nr_storage::{FileStorage, MemoryStorage};
    use tempfile::tempdir;

    struct OneItemSource;

    #[async_trait]
    impl ArticleSource for OneItemSource {
        fn source_name(&self) -> &str {
            "bbc_technology"
        }

        async fn fetch_candidates(&self) -> Result<Vec<FeedItem>> {
            Ok(vec![FeedItem {
                title: "AI regulation passed in EU".to_string(),
                excerpt_html: "<p>New rules apply.</p>".to_string(),
                url: "https://example.com/eu-ai".to_string(),
                published_at_raw: None,
            }])
        }
    }

    const STRUCTURED: &str =
        r#"{"summary":"...", "key_takeaways":["a","b","c"], "organizations_and_terms":["EU"]}"#;

    #[tokio::test]
    async fn test_matching_topic_end_to_end() {
        let temp_dir = tempdir().unwrap();
        let storage = Arc::new(FileStorage::new(temp_dir.path()).await.unwrap());
        let model = Arc::new(DummyModel::with_responses([STRUCTURED]));
        let manager = ReportManager::new(
            Arc::new(OneItemSource),
            model.clone(),
            storage.clone(),
            CorpusBuilder::default(),
        );

        let report = manager.run_cycle("AI", 5).await.unwrap();
        assert_eq!(report.article_count, 1);
        assert_eq!(report.organizations_and_terms, vec!["EU"]);
        assert_eq!(model.call_count(), 1);

        let persisted = storage.load_latest().await.unwrap().unwrap();
        assert_eq!(persisted, report);
        assert_eq!(persisted.articles[0].text, "AI regulation passed in EU\n\nNew rules apply.");
    }

    #[tokio::test]
    async fn test_unmatched_topic_end_to_end() {
        let storage = Arc::new(MemoryStorage::new());
        let model = Arc::new(DummyModel::with_responses([STRUCTURED]));
        let manager = ReportManager::new(
            Arc::new(OneItemSource),
            model.clone(),
            storage.clone(),
            CorpusBuilder::default(),
        );

        let report = manager.run_cycle("Space", 5).await.unwrap();
        assert_eq!(report.article_count, 0);
        assert!(report.articles.is_empty());
        assert!(report.summary.contains("No relevant articles"));
        assert_eq!(model.call_count(), 0);
        assert_eq!(storage.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_model_failure_persists_nothing() {
        let storage = Arc::new(MemoryStorage::new());
        let manager = ReportManager::new(
            Arc::new(OneItemSource),
            Arc::new(DummyModel::failing("connection refused")),
            storage.clone(),
            CorpusBuilder::default(),
        );

        assert!(manager.run_cycle("AI", 5).await.is_err());
        assert!(storage.load_latest().await.unwrap().is_none());
    }
}
