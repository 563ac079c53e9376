use async_trait::async_trait;
use nr_core::{Report, ReportStorage, Result};
use tokio::sync::RwLock;

/// Process-local report store. Reports are kept in insertion order.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    reports: RwLock<Vec<Report>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReportStorage for MemoryStorage {
    async fn save(&self, report: &Report) -> Result<()> {
        self.reports.write().await.push(report.clone());
        Ok(())
    }

    async fn load_latest(&self) -> Result<Option<Report>> {
        let reports = self.reports.read().await;
        // max_by_key keeps the last of equal keys, so a later save wins a tie
        Ok(reports.iter().max_by_key(|r| r.generated_at).cloned())
    }

    async fn list(&self) -> Result<Vec<Report>> {
        let mut reports = self.reports.read().await.clone();
        reports.sort_by_key(|r| r.generated_at);
        Ok(reports)
    }
}
