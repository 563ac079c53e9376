use std::sync::Arc;
use chrono::Utc;
use nr_core::{Article, InferenceModel, Report, ReportBody, Result};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};
use crate::corpus::CorpusBuilder;

pub const REPORT_SYSTEM_PROMPT: &str = "You are an AI assistant that writes concise news reports.\n\
You will receive a corpus of recent news items about a specific topic.\n\
Rely ONLY on the information in the corpus. Never introduce facts that are not in it.\n\
Produce exactly three fields:\n\
1) \"summary\": a single paragraph of 100-150 words.\n\
2) \"key_takeaways\": an array of 3-5 concise key takeaways.\n\
3) \"organizations_and_terms\": an array of the organizations, named entities and important terms mentioned.\n\
Respond with one strictly valid JSON object with exactly the keys \"summary\" (string), \
\"key_takeaways\" (array of strings) and \"organizations_and_terms\" (array of strings). \
Output nothing else: no prose before or after the JSON and no code fences.";

pub fn report_user_prompt(topic: &str, corpus: &str) -> String {
    format!(
        "Topic: {}\n\nNews corpus (separated by ---):\n\n{}\n\nRemember: output only valid JSON.",
        topic, corpus
    )
}

/// Body used when no article made it into the corpus.
pub fn no_articles_body(topic: &str) -> ReportBody {
    ReportBody {
        summary: format!("No relevant articles were found for topic '{}'.", topic),
        ..ReportBody::default()
    }
}

/// Body used when on-topic articles were found but none fit the corpus budget.
pub fn over_budget_body(topic: &str, dropped: usize, max_chars: usize) -> ReportBody {
    ReportBody {
        summary: format!(
            "{} relevant articles were found for topic '{}' but none fit within the corpus budget of {} characters.",
            dropped, topic, max_chars
        ),
        ..ReportBody::default()
    }
}

/// The model's answer, either in the requested shape or salvaged as prose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedReport {
    WellFormed(ReportBody),
    Fallback { raw: String },
}

impl ParsedReport {
    pub fn parse(raw: &str) -> Self {
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => ParsedReport::WellFormed(ReportBody {
                summary: map.get("summary").and_then(Value::as_str).unwrap_or_default().to_string(),
                key_takeaways: string_list(&map, "key_takeaways"),
                organizations_and_terms: string_list(&map, "organizations_and_terms"),
            }),
            _ => ParsedReport::Fallback { raw: raw.to_string() },
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, ParsedReport::Fallback { .. })
    }

    /// The whole raw response becomes the summary of a fallback body.
    pub fn into_body(self) -> ReportBody {
        match self {
            ParsedReport::WellFormed(body) => body,
            ParsedReport::Fallback { raw } => ReportBody {
                summary: raw,
                ..ReportBody::default()
            },
        }
    }
}

fn string_list(map: &Map<String, Value>, key: &str) -> Vec<String> {
    map.get(key)
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).map(str::to_string).collect())
        .unwrap_or_default()
}

/// Turns a set of articles into a report via the language model.
pub struct ReportSynthesizer {
    model: Arc<dyn InferenceModel>,
    corpus: CorpusBuilder,
}

impl ReportSynthesizer {
    pub fn new(model: Arc<dyn InferenceModel>, corpus: CorpusBuilder) -> Self {
        Self { model, corpus }
    }

    /// Model transport failures are returned as errors; malformed output is not.
    pub async fn synthesize(&self, topic: &str, articles: &[Article]) -> Result<Report> {
        let corpus = self.corpus.build(articles);
        let included = articles[..corpus.included].to_vec();

        let body = if articles.is_empty() {
            info!("🧠 No articles for '{}'; skipping model call", topic);
            no_articles_body(topic)
        } else if corpus.is_empty() {
            warn!(
                "⚠️ None of the {} articles for '{}' fit the corpus budget; skipping model call",
                articles.len(),
                topic
            );
            over_budget_body(topic, articles.len(), self.corpus.max_chars())
        } else {
            info!(
                "🧠 Asking {} for a report on '{}' ({} articles, {} chars)",
                self.model.name(),
                topic,
                corpus.included,
                corpus.text.chars().count()
            );
            let user_prompt = report_user_prompt(topic, &corpus.text);
            debug!("🧠 Report prompt:\n{}", user_prompt);

            let raw = self.model.invoke(REPORT_SYSTEM_PROMPT, &user_prompt).await?;
            let parsed = ParsedReport::parse(&raw);
            if parsed.is_fallback() {
                warn!("⚠️ Model output was not a JSON object; keeping it as an unstructured summary");
            }
            parsed.into_body()
        };

        Ok(Report::new(topic, Utc::now(), body, included))
    }
}
