use std::str::FromStr;
use std::time::Duration;
use nr_core::Error;

pub mod chat;
pub mod corpus;
pub mod models;
pub mod report;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelBackend {
    #[default]
    Ollama,
    LangChain,
    Dummy,
}

impl FromStr for ModelBackend {
    type Err = Error;

    fn from_str(s: &str) -> nr_core::Result<Self> {
        match s.to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "langchain" => Ok(Self::LangChain),
            "dummy" => Ok(Self::Dummy),
            other => Err(Error::Config(format!(
                "Unknown model '{}'. Available models: ollama (default), langchain, dummy",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct InferenceConfig {
    pub backend: ModelBackend,
    /// `http://host:port/model`; the path names the model
    pub model_url: Option<String>,
    /// Overrides the model named in `model_url`
    pub model_name: Option<String>,
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub temperature: f32,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            backend: ModelBackend::Ollama,
            model_url: None,
            model_name: None,
            timeout: Duration::from_secs(300),
            max_retries: 2,
            retry_delay: Duration::from_secs(2),
            temperature: 0.2,
        }
    }
}

pub mod prelude {
    pub use super::{InferenceConfig, ModelBackend};
    pub use super::chat::ChatAgent;
    pub use super::corpus::{Corpus, CorpusBuilder};
    pub use super::models::{create_model, ModelConfig};
    pub use super::report::{ParsedReport, ReportSynthesizer};
    pub use nr_core::{Article, Error, InferenceModel, Report, Result};
}

pub use chat::ChatAgent;
pub use corpus::{Corpus, CorpusBuilder};
pub use models::{create_model, ModelConfig};
pub use report::{ParsedReport, ReportSynthesizer};
