use std::collections::VecDeque;
use std::sync::Arc;
use nr_core::{ConversationTurn, Error, InferenceModel, Message, Report, ReportStorage, Result, Speaker};
use tracing::{debug, info};

pub const DEFAULT_HISTORY_TURNS: usize = 20;

pub const CHAT_SYSTEM_PROMPT: &str = "You are a helpful AI news assistant.\n\
You answer questions about recent updates on a specific topic using ONLY the information \
in the provided report. Never add facts that are not in the report.\n\
If the user asks a vague question like 'What's happening nowadays?' or 'Any news?', \
do not decline: summarise the most important points from the report.\n\
If the user asks about something the report does not cover, say clearly that the report \
does not contain that information and steer them back to the report's topic. \
Do not make up an answer.";

/// The part of a report the chat model may draw on.
pub fn grounding_context(report: &Report) -> String {
    let mut lines = vec![
        format!("Topic: {}", report.topic),
        format!("Generated at: {}", report.generated_at.to_rfc3339()),
        String::new(),
        "Summary:".to_string(),
        report.summary.clone(),
        String::new(),
        "Key takeaways:".to_string(),
    ];
    lines.extend(report.key_takeaways.iter().map(|item| format!("- {}", item)));
    lines.push(String::new());
    lines.push("Organizations / Terms:".to_string());
    lines.extend(report.organizations_and_terms.iter().map(|item| format!("- {}", item)));
    lines.join("\n")
}

/// Answers questions from the latest stored report, keeping a bounded
/// history of the session.
pub struct ChatAgent {
    model: Arc<dyn InferenceModel>,
    storage: Arc<dyn ReportStorage>,
    report: Report,
    history: VecDeque<ConversationTurn>,
    max_turns: usize,
}

impl ChatAgent {
    /// Fails with [`Error::NoReport`] when the store is empty; the model is
    /// not contacted in that case.
    pub async fn start(
        model: Arc<dyn InferenceModel>,
        storage: Arc<dyn ReportStorage>,
        max_turns: usize,
    ) -> Result<Self> {
        let report = storage.load_latest().await?.ok_or(Error::NoReport)?;
        info!(
            "💬 Chatting about '{}' (report generated at {})",
            report.topic,
            report.generated_at.to_rfc3339()
        );
        Ok(Self {
            model,
            storage,
            report,
            history: VecDeque::new(),
            max_turns,
        })
    }

    pub fn report(&self) -> &Report {
        &self.report
    }

    pub fn history(&self) -> &VecDeque<ConversationTurn> {
        &self.history
    }

    fn build_messages(&self, question: &str) -> Vec<Message> {
        let mut messages = Vec::with_capacity(self.history.len() + 3);
        messages.push(Message::system(CHAT_SYSTEM_PROMPT));
        messages.push(Message::system(format!(
            "Here is the latest report:\n\n{}",
            grounding_context(&self.report)
        )));
        messages.extend(self.history.iter().map(Message::from));
        messages.push(Message::user(question));
        messages
    }

    /// History is only extended once the model has answered.
    pub async fn ask(&mut self, question: &str) -> Result<String> {
        let messages = self.build_messages(question);
        debug!("💬 Sending {} messages to {}", messages.len(), self.model.name());
        let answer = self.model.complete(&messages).await?;

        self.history.push_back(ConversationTurn::user(question));
        self.history.push_back(ConversationTurn::assistant(answer.clone()));
        // evict whole exchanges so replayed history never opens on an answer
        while self.history.len() > self.max_turns {
            self.history.pop_front();
            if matches!(self.history.front(), Some(turn) if turn.role == Speaker::Assistant) {
                self.history.pop_front();
            }
        }
        Ok(answer)
    }

    /// Switch to a newer report if one was stored since the session began.
    /// Returns whether the report changed; a switch clears the history.
    pub async fn reload(&mut self) -> Result<bool> {
        match self.storage.load_latest().await? {
            Some(latest) if latest.generated_at > self.report.generated_at => {
                info!("💬 Switched to report generated at {}", latest.generated_at.to_rfc3339());
                self.report = latest;
                self.history.clear();
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
