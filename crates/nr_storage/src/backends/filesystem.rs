use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use async_trait::async_trait;
use nr_core::{Error, Report, ReportStorage, Result};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use crate::render::render_markdown;

const FILE_PREFIX: &str = "report_";
const MAX_NAME_ATTEMPTS: usize = 1000;

/// Stores each report as `report_<timestamp>.json` plus a rendered
/// `report_<timestamp>.md` next to it.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub async fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).await.map_err(|e| {
            Error::Storage(format!("Failed to create reports directory {}: {}", dir.display(), e))
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn base_stem(report: &Report) -> String {
        format!(
            "{}{}",
            FILE_PREFIX,
            report.generated_at.format("%Y-%m-%dT%H-%M-%S%.6fZ")
        )
    }

    /// Create the JSON file under a name nobody else holds yet.
    async fn create_json_file(&self, report: &Report) -> Result<(fs::File, String)> {
        let base = Self::base_stem(report);
        for attempt in 0..MAX_NAME_ATTEMPTS {
            let stem = if attempt == 0 { base.clone() } else { format!("{}_{}", base, attempt) };
            let path = self.dir.join(format!("{}.json", stem));
            match fs::OpenOptions::new().write(true).create_new(true).open(&path).await {
                Ok(file) => return Ok((file, stem)),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Err(Error::Storage(format!("No free file name for report {}", base)))
    }

    /// Collision suffix of a report file name; `report_<ts>_2.json` gives 2.
    fn name_suffix(name: &str) -> usize {
        name.strip_prefix(FILE_PREFIX)
            .and_then(|n| n.strip_suffix(".json"))
            .and_then(|stem| stem.rsplit_once('_'))
            .and_then(|(_, n)| n.parse().ok())
            .unwrap_or(0)
    }

    /// Reports paired with their file name suffix, so reports sharing a
    /// timestamp order by save order.
    async fn read_reports(&self) -> Result<Vec<(Report, usize)>> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut reports = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let Some(name) = path
                .file_name()
                .and_then(|n| n.to_str())
                .filter(|n| n.starts_with(FILE_PREFIX) && n.ends_with(".json"))
            else {
                continue;
            };
            let suffix = Self::name_suffix(name);

            let raw = match fs::read_to_string(&path).await {
                Ok(raw) => raw,
                Err(e) => {
                    warn!("💾 Skipping unreadable report {}: {}", path.display(), e);
                    continue;
                }
            };
            match serde_json::from_str::<Report>(&raw) {
                Ok(report) => reports.push((report, suffix)),
                Err(e) => warn!("💾 Skipping unreadable report {}: {}", path.display(), e),
            }
        }
        debug!("💾 Read {} reports from {}", reports.len(), self.dir.display());
        Ok(reports)
    }

    /// Markdown goes first so the JSON only becomes readable once both exist.
    async fn write_files(file: &mut fs::File, json: &str, md_path: &Path, markdown: &str) -> Result<()> {
        fs::write(md_path, markdown).await?;
        file.write_all(json.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl ReportStorage for FileStorage {
    async fn save(&self, report: &Report) -> Result<()> {
        let json = serde_json::to_string_pretty(report)?;
        let markdown = render_markdown(report);
        let (mut file, stem) = self.create_json_file(report).await?;
        let json_path = self.dir.join(format!("{}.json", stem));
        let md_path = self.dir.join(format!("{}.md", stem));

        if let Err(e) = Self::write_files(&mut file, &json, &md_path, &markdown).await {
            drop(file);
            for path in [&json_path, &md_path] {
                if let Err(remove_err) = fs::remove_file(path).await {
                    if remove_err.kind() != ErrorKind::NotFound {
                        warn!("💾 Could not remove partial report {}: {}", path.display(), remove_err);
                    }
                }
            }
            return Err(e);
        }

        info!("💾 Saved report: {}", json_path.display());
        info!("💾 Saved human-readable report: {}", md_path.display());
        Ok(())
    }

    async fn load_latest(&self) -> Result<Option<Report>> {
        let reports = self.read_reports().await?;
        Ok(reports
            .into_iter()
            .max_by_key(|(r, suffix)| (r.generated_at, *suffix))
            .map(|(r, _)| r))
    }

    async fn list(&self) -> Result<Vec<Report>> {
        let mut reports = self.read_reports().await?;
        reports.sort_by_key(|(r, suffix)| (r.generated_at, *suffix));
        Ok(reports.into_iter().map(|(r, _)| r).collect())
    }
}
