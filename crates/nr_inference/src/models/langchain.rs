use std::fmt;
use std::sync::Arc;
use async_trait::async_trait;
use langchain_rust::language_models::llm::LLM;
use langchain_rust::llm::ollama::client::{Ollama, OllamaClient};
use langchain_rust::schemas::Message as LcMessage;
use nr_core::{Error, InferenceModel, Message, Result, Role};
use super::ModelConfig;

/// Same contract as [`super::OllamaModel`], routed through langchain-rust.
pub struct LangChainModel {
    ollama: Ollama,
    model_name: String,
}

impl fmt::Debug for LangChainModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LangChainModel")
            .field("ollama_client", &"<Ollama>")
            .field("model", &self.model_name)
            .finish()
    }
}

impl LangChainModel {
    pub fn new(config: &ModelConfig) -> Self {
        let client = Arc::new(OllamaClient::new(
            config.get_ollama_host().to_string(),
            config.get_ollama_port(),
        ));
        Self {
            ollama: Ollama::new(client, config.get_model_name().to_string(), None),
            model_name: config.get_model_name().to_string(),
        }
    }
}

#[async_trait]
impl InferenceModel for LangChainModel {
    fn name(&self) -> &str {
        "LangChain"
    }

    async fn complete(&self, messages: &[Message]) -> Result<String> {
        let messages: Vec<LcMessage> = messages
            .iter()
            .map(|m| match m.role {
                Role::System => LcMessage::new_system_message(&m.content),
                Role::User => LcMessage::new_human_message(&m.content),
                Role::Assistant => LcMessage::new_ai_message(&m.content),
            })
            .collect();

        let result = self
            .ollama
            .generate(&messages)
            .await
            .map_err(|e| Error::Inference(format!("Ollama ({}) failed: {}", self.model_name, e)))?;
        Ok(result.generation)
    }
}
