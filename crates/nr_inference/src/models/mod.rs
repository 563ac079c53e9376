use std::sync::Arc;
use std::time::Duration;
use nr_core::{Error, InferenceModel, Result};
use tracing::info;
use url::Url;
use crate::{InferenceConfig, ModelBackend};

pub mod dummy;
pub mod ollama;

#[cfg(feature = "langchain")]
pub mod langchain;

pub use dummy::DummyModel;
pub use ollama::OllamaModel;

#[cfg(feature = "langchain")]
pub use langchain::LangChainModel;

pub const DEFAULT_MODEL_URL: &str = "http://localhost:11434/llama3";
const DEFAULT_MODEL_NAME: &str = "llama3";
const DEFAULT_OLLAMA_PORT: u16 = 11434;

/// Connection settings for an Ollama-served model.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    ollama_host: String,
    ollama_port: u16,
    model_name: String,
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub temperature: f32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            ollama_host: "http://localhost".to_string(),
            ollama_port: DEFAULT_OLLAMA_PORT,
            model_name: DEFAULT_MODEL_NAME.to_string(),
            timeout: Duration::from_secs(300),
            max_retries: 2,
            retry_delay: Duration::from_secs(2),
            temperature: 0.2,
        }
    }
}

impl ModelConfig {
    pub fn from_inference_config(config: &InferenceConfig) -> Result<Self> {
        let raw = config.model_url.as_deref().unwrap_or(DEFAULT_MODEL_URL);
        let parsed_url = Url::parse(raw).map_err(|e| Error::InvalidUrl(format!("{}: {}", raw, e)))?;
        let host = parsed_url
            .host_str()
            .ok_or_else(|| Error::InvalidUrl(format!("{}: missing host", raw)))?;

        let path_model = parsed_url.path().trim_matches('/').to_string();
        let model_name = match &config.model_name {
            Some(name) if !name.is_empty() => name.clone(),
            _ if !path_model.is_empty() => path_model,
            _ => DEFAULT_MODEL_NAME.to_string(),
        };

        Ok(Self {
            ollama_host: format!("{}://{}", parsed_url.scheme(), host),
            ollama_port: parsed_url.port().unwrap_or(DEFAULT_OLLAMA_PORT),
            model_name,
            timeout: config.timeout,
            max_retries: config.max_retries,
            retry_delay: config.retry_delay,
            temperature: config.temperature,
        })
    }

    pub fn get_ollama_host(&self) -> &str {
        &self.ollama_host
    }

    pub fn get_ollama_port(&self) -> u16 {
        self.ollama_port
    }

    pub fn get_model_name(&self) -> &str {
        &self.model_name
    }

    pub fn base_url(&self) -> String {
        format!("{}:{}", self.ollama_host, self.ollama_port)
    }
}

pub async fn create_model(config: &InferenceConfig) -> Result<Arc<dyn InferenceModel>> {
    let model: Arc<dyn InferenceModel> = match config.backend {
        ModelBackend::Dummy => Arc::new(DummyModel::new()),
        ModelBackend::Ollama => {
            let model_config = ModelConfig::from_inference_config(config)?;
            Arc::new(OllamaModel::new(model_config)?)
        }
        #[cfg(feature = "langchain")]
        ModelBackend::LangChain => {
            let model_config = ModelConfig::from_inference_config(config)?;
            Arc::new(LangChainModel::new(&model_config))
        }
        #[cfg(not(feature = "langchain"))]
        ModelBackend::LangChain => {
            return Err(Error::Config(
                "The langchain model requires building with `--features langchain`".to_string(),
            ))
        }
    };
    info!("🧠 Inference model initialized (using {})", model.name());
    Ok(model)
}
