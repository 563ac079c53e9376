use std::fmt;
use std::sync::Mutex;
use async_trait::async_trait;
use nr_core::{Error, InferenceModel, Message, Result, Role};

const ECHO_WORDS: usize = 60;

/// Offline model. Replays scripted responses in order (the last one repeats)
/// or, without a script, echoes the start of the last user message. Every
/// message list it receives is recorded.
#[derive(Default)]
pub struct DummyModel {
    responses: Vec<String>,
    failure: Option<String>,
    calls: Mutex<Vec<Vec<Message>>>,
}

impl fmt::Debug for DummyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DummyModel")
            .field("responses", &self.responses.len())
            .field("failing", &self.failure.is_some())
            .finish()
    }
}

impl DummyModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_responses<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: responses.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// A model whose every call fails like an unreachable runtime
    pub fn failing(reason: impl Into<String>) -> Self {
        Self { failure: Some(reason.into()), ..Self::default() }
    }

    pub fn calls(&self) -> Vec<Vec<Message>> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or_default()
    }

    fn echo(messages: &[Message]) -> String {
        messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.split_whitespace().take(ECHO_WORDS).collect::<Vec<_>>().join(" "))
            .unwrap_or_default()
    }
}

#[async_trait]
impl InferenceModel for DummyModel {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn complete(&self, messages: &[Message]) -> Result<String> {
        let call_index = {
            let mut calls = self
                .calls
                .lock()
                .map_err(|_| Error::Inference("dummy model state poisoned".to_string()))?;
            calls.push(messages.to_vec());
            calls.len() - 1
        };

        if let Some(reason) = &self.failure {
            return Err(Error::Inference(reason.clone()));
        }

        Ok(match self.responses.len() {
            0 => Self::echo(messages),
            n => self.responses[call_index.min(n - 1)].clone(),
        })
    }
}
