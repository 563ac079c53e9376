use async_trait::async_trait;
use crate::types::Report;
use crate::Result;

#[async_trait]
pub trait ReportStorage: Send + Sync {
    /// Persist a report. Reports are never overwritten or mutated.
    async fn save(&self, report: &Report) -> Result<()>;

    /// The report with the greatest `generated_at`, or `None` if the store is empty
    async fn load_latest(&self) -> Result<Option<Report>>;

    /// All stored reports, oldest first
    async fn list(&self) -> Result<Vec<Report>>;
}
