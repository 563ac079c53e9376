use std::fmt;
use async_trait::async_trait;
use nr_core::{Error, InferenceModel, Message, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use super::ModelConfig;

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatOptions {
    temperature: f32,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    options: ChatOptions,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

/// Outcome of one request; only transient failures are retried.
enum Attempt {
    Transient(Error),
    Fatal(Error),
}

/// Talks to a local Ollama runtime through its `/api/chat` endpoint.
pub struct OllamaModel {
    client: Client,
    config: ModelConfig,
    endpoint: String,
}

impl fmt::Debug for OllamaModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OllamaModel")
            .field("client", &"<reqwest::Client>")
            .field("endpoint", &self.endpoint)
            .field("model", &self.config.get_model_name())
            .finish()
    }
}

impl OllamaModel {
    pub fn new(config: ModelConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        let endpoint = format!("{}/api/chat", config.base_url());
        Ok(Self { client, config, endpoint })
    }

    async fn send(&self, request: &ChatRequest<'_>) -> std::result::Result<String, Attempt> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| Attempt::Transient(e.into()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let error = Error::Inference(format!(
                "Ollama returned {} for model '{}': {}",
                status,
                self.config.get_model_name(),
                body
            ));
            return Err(if status.is_server_error() {
                Attempt::Transient(error)
            } else {
                Attempt::Fatal(error)
            });
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            Attempt::Fatal(Error::Inference(format!("Malformed Ollama response: {}", e)))
        })?;
        Ok(parsed.message.content)
    }
}

#[async_trait]
impl InferenceModel for OllamaModel {
    fn name(&self) -> &str {
        "Ollama"
    }

    async fn complete(&self, messages: &[Message]) -> Result<String> {
        let request = ChatRequest {
            model: self.config.get_model_name(),
            messages: messages
                .iter()
                .map(|m| ChatMessage { role: m.role.as_str(), content: &m.content })
                .collect(),
            stream: false,
            options: ChatOptions { temperature: self.config.temperature },
        };

        let mut attempt = 0;
        loop {
            match self.send(&request).await {
                Ok(content) => {
                    debug!("🧠 Ollama replied with {} chars", content.len());
                    return Ok(content);
                }
                Err(Attempt::Transient(e)) if attempt < self.config.max_retries => {
                    attempt += 1;
                    warn!(
                        "⚠️ Ollama request failed (attempt {}/{}): {}. Retrying...",
                        attempt,
                        self.config.max_retries + 1,
                        e
                    );
                    tokio::time::sleep(self.config.retry_delay).await;
                }
                Err(Attempt::Transient(e)) | Err(Attempt::Fatal(e)) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use crate::InferenceConfig;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn model_for(uri: &str, max_retries: u32) -> OllamaModel {
        let inference = InferenceConfig {
            model_url: Some(format!("{}/llama3", uri)),
            max_retries,
            retry_delay: Duration::from_millis(0),
            ..Default::default()
        };
        OllamaModel::new(ModelConfig::from_inference_config(&inference).unwrap()).unwrap()
    }

    fn reply(content: &str) -> serde_json::Value {
        serde_json::json!({
            "model": "llama3",
            "message": { "role": "assistant", "content": content },
            "done": true
        })
    }

    #[tokio::test]
    async fn test_invoke_posts_chat_request() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_partial_json(serde_json::json!({
                "model": "llama3",
                "stream": false,
                "messages": [
                    { "role": "system", "content": "be brief" },
                    { "role": "user", "content": "hello" }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply("hi there")))
            .expect(1)
            .mount(&mock_server)
            .await;

        let model = model_for(&mock_server.uri(), 0);
        let answer = model.invoke("be brief", "hello").await.unwrap();
        assert_eq!(answer, "hi there");
    }

    #[tokio::test]
    async fn test_server_error_is_retried() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("loading model"))
            .up_to_n_times(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply("recovered")))
            .mount(&mock_server)
            .await;

        let model = model_for(&mock_server.uri(), 2);
        assert_eq!(model.invoke("s", "u").await.unwrap(), "recovered");
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404).set_body_string("model 'llama3' not found"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let model = model_for(&mock_server.uri(), 3);
        let err = model.invoke("s", "u").await.unwrap_err();
        assert!(matches!(err, Error::Inference(_)));
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn test_retries_exhausted_surface_last_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(2)
            .mount(&mock_server)
            .await;

        let model = model_for(&mock_server.uri(), 1);
        assert!(model.invoke("s", "u").await.is_err());
    }

    #[tokio::test]
    async fn test_unreachable_runtime_is_transport_error() {
        // nothing listens on port 9 locally
        let model = model_for("http://127.0.0.1:9", 0);
        let err = model.invoke("s", "u").await.unwrap_err();
        assert!(matches!(err, Error::Http(_)));
    }
}
