use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use nr_core::{Error, ReportStorage, Result};

pub mod backends;
pub mod render;

pub use backends::*;
pub use render::render_markdown;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageKind {
    #[default]
    File,
    Memory,
}

impl FromStr for StorageKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "file" | "fs" => Ok(Self::File),
            "memory" => Ok(Self::Memory),
            other => Err(Error::Config(format!(
                "Unknown storage backend '{}'. Available: file, memory",
                other
            ))),
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Memory => write!(f, "memory"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub kind: StorageKind,
    pub reports_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            kind: StorageKind::File,
            reports_dir: PathBuf::from("reports"),
        }
    }
}

pub async fn create_storage(config: &StorageConfig) -> Result<Arc<dyn ReportStorage>> {
    match config.kind {
        StorageKind::File => Ok(Arc::new(FileStorage::new(&config.reports_dir).await?)),
        StorageKind::Memory => Ok(Arc::new(MemoryStorage::new())),
    }
}

pub mod prelude {
    pub use super::{create_storage, StorageConfig, StorageKind};
    pub use super::backends::*;
}
