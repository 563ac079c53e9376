pub mod error;
pub mod models;
pub mod source;
pub mod storage;
pub mod types;

pub use error::{Error, Result};
pub use models::InferenceModel;
pub use source::ArticleSource;
pub use storage::ReportStorage;
pub use types::{Article, ConversationTurn, FeedItem, Message, Report, ReportBody, Role, Speaker};
