use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A candidate item as delivered by an article source, before cleaning and
/// topic filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    pub title: String,
    pub excerpt_html: String,
    pub url: String,
    pub published_at_raw: Option<String>,
}

/// A cleaned article, embedded by value in the report it contributed to.
///
/// `text` is the title followed by the HTML-stripped excerpt and never
/// contains markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub source: String,
    pub url: String,
    pub title: String,
    pub published_at: Option<DateTime<Utc>>,
    pub text: String,
}

/// The three model-produced fields of a report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportBody {
    pub summary: String,
    pub key_takeaways: Vec<String>,
    pub organizations_and_terms: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub topic: String,
    pub article_count: usize,
    pub summary: String,
    pub key_takeaways: Vec<String>,
    pub organizations_and_terms: Vec<String>,
    pub articles: Vec<Article>,
}

impl Report {
    /// Assembles a report; `article_count` always equals `articles.len()`.
    pub fn new(
        topic: impl Into<String>,
        generated_at: DateTime<Utc>,
        body: ReportBody,
        articles: Vec<Article>,
    ) -> Self {
        Self {
            generated_at,
            topic: topic.into(),
            article_count: articles.len(),
            summary: body.summary,
            key_takeaways: body.key_takeaways,
            organizations_and_terms: body.organizations_and_terms,
            articles,
        }
    }

    pub fn body(&self) -> ReportBody {
        ReportBody {
            summary: self.summary.clone(),
            key_takeaways: self.key_takeaways.clone(),
            organizations_and_terms: self.organizations_and_terms.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One message of a prompt sent to a language model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Assistant,
}

/// A chat history entry. Lives only for the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationTurn {
    pub role: Speaker,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Speaker::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Speaker::Assistant, content: content.into() }
    }
}

impl From<&ConversationTurn> for Message {
    fn from(turn: &ConversationTurn) -> Self {
        match turn.role {
            Speaker::User => Message::user(turn.content.clone()),
            Speaker::Assistant => Message::assistant(turn.content.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_report() -> Report {
        let article = Article {
            source: "bbc_technology".to_string(),
            url: "https://example.com/eu-ai".to_string(),
            title: "AI regulation passed in EU".to_string(),
            published_at: None,
            text: "AI regulation passed in EU\n\nNew rules apply.".to_string(),
        };
        Report::new(
            "AI",
            Utc.with_ymd_and_hms(2026, 10, 19, 9, 30, 0).unwrap(),
            ReportBody {
                summary: "The EU passed AI rules.".to_string(),
                key_takeaways: vec!["a".to_string()],
                organizations_and_terms: vec!["EU".to_string()],
            },
            vec![article],
        )
    }

    #[test]
    fn test_report_counts_its_articles() {
        let report = sample_report();
        assert_eq!(report.article_count, 1);
        assert_eq!(report.body().organizations_and_terms, vec!["EU"]);
    }

    #[test]
    fn test_report_json_field_names() {
        let value = serde_json::to_value(sample_report()).unwrap();
        for key in [
            "generated_at",
            "topic",
            "article_count",
            "summary",
            "key_takeaways",
            "organizations_and_terms",
            "articles",
        ] {
            assert!(value.get(key).is_some(), "missing key {}", key);
        }
        assert_eq!(value["generated_at"], "2026-10-19T09:30:00Z");
        let article = &value["articles"][0];
        for key in ["source", "url", "title", "published_at", "text"] {
            assert!(article.get(key).is_some(), "missing article key {}", key);
        }
        assert!(article["published_at"].is_null());
    }

    #[test]
    fn test_turn_converts_to_message() {
        let message: Message = (&ConversationTurn::assistant("hi")).into();
        assert_eq!(message.role, Role::Assistant);
        assert_eq!(message.role.as_str(), "assistant");
        assert_eq!(Message::from(&ConversationTurn::user("q")).role, Role::User);
    }
}
