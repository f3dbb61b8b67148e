use std::{future::Future, pin::Pin};

use crate::{
	error::Result,
	models::{AiConfig, InteractionLogEntry, PersistedRecommendation},
};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The document-store boundary the advice core reads and writes through.
///
/// Real adapters live in the app layer; the core only assumes these five
/// operations. Every method may fail with [`crate::Error::Unavailable`] and
/// the fetches may fail with [`crate::Error::Malformed`] when a document does
/// not decode.
pub trait DocumentStore
where
	Self: Send + Sync,
{
	fn fetch_ai_config(&self) -> BoxFuture<'_, Result<Option<AiConfig>>>;

	/// Raw diary lines for one user and one calendar date label.
	fn fetch_diary_entries<'a>(
		&'a self,
		user_id: &'a str,
		date_label: &'a str,
	) -> BoxFuture<'a, Result<Vec<String>>>;

	fn fetch_recommendation<'a>(
		&'a self,
		user_id: &'a str,
	) -> BoxFuture<'a, Result<Option<PersistedRecommendation>>>;

	/// Overwrite the per-user recommendation document.
	fn store_recommendation<'a>(
		&'a self,
		rec: &'a PersistedRecommendation,
	) -> BoxFuture<'a, Result<()>>;

	/// Append one audit record; existing records are never touched.
	fn append_interaction<'a>(&'a self, entry: &'a InteractionLogEntry)
	-> BoxFuture<'a, Result<()>>;
}
