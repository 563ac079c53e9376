use std::fmt;
use async_trait::async_trait;
use crate::types::Message;
use crate::Result;

#[async_trait]
pub trait InferenceModel: Send + Sync + fmt::Debug {
    /// Short backend name for logging
    fn name(&self) -> &str;

    /// Send an ordered message list and return the model's reply text
    async fn complete(&self, messages: &[Message]) -> Result<String>;

    /// Single-shot call with one system and one user message
    async fn invoke(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        self.complete(&[Message::system(system_prompt), Message::user(user_prompt)])
            .await
    }
}
