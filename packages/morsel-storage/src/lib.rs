pub mod models;
pub mod store;
pub mod time_serde;

mod error;

pub use error::{Error, Result};
pub use models::{AiConfig, InteractionLogEntry, PersistedRecommendation};
pub use store::{BoxFuture, DocumentStore};
