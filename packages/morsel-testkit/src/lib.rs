//! In-memory test doubles for the advice core.
//!
//! [`MemoryStore`] keeps raw JSON documents and decodes them through the same
//! rules as a real adapter, so tests exercise the full fetch path instead of
//! handing pre-built models to the service.

use std::{
	collections::HashMap,
	sync::{
		Mutex, MutexGuard,
		atomic::{AtomicUsize, Ordering},
	},
};

use serde_json::Value;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use morsel_config::{Cache, Config, ProviderConfig, Retry};
use morsel_storage::{
	AiConfig, BoxFuture, DocumentStore, Error, InteractionLogEntry, PersistedRecommendation, Result,
};

#[derive(Default)]
struct Inner {
	ai_config: Option<Value>,
	diaries: HashMap<(String, String), Vec<String>>,
	recommendations: HashMap<String, Value>,
	interactions: Vec<InteractionLogEntry>,
	fail_config_reads: bool,
	fail_diary_reads: bool,
	fail_recommendation_reads: bool,
	fail_recommendation_writes: bool,
	fail_log_appends: bool,
}

/// An in-memory [`DocumentStore`] with per-operation call counters and
/// injectable failures.
#[derive(Default)]
pub struct MemoryStore {
	inner: Mutex<Inner>,
	config_fetches: AtomicUsize,
	diary_fetches: AtomicUsize,
	recommendation_fetches: AtomicUsize,
	recommendation_writes: AtomicUsize,
	log_appends: AtomicUsize,
}
impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn put_ai_config(&self, cfg: &AiConfig) {
		let mut doc = serde_json::json!({
			"systemPrompt": cfg.system_prompt,
			"enabled": cfg.enabled,
			"maxResponseLength": cfg.max_response_length,
			"temperature": cfg.temperature,
		});

		if let Some(last_updated) = cfg.last_updated {
			doc["lastUpdated"] = Value::String(rfc3339(last_updated));
		}
		if let Some(updated_by) = &cfg.updated_by {
			doc["updatedBy"] = Value::String(updated_by.clone());
		}

		self.put_ai_config_document(doc);
	}

	/// Seed the config document verbatim, however malformed.
	pub fn put_ai_config_document(&self, doc: Value) {
		self.lock_inner().ai_config = Some(doc);
	}

	pub fn put_diary_entries(&self, user_id: &str, date_label: &str, entries: &[&str]) {
		let lines = entries.iter().map(|entry| entry.to_string()).collect();

		self.lock_inner().diaries.insert((user_id.to_string(), date_label.to_string()), lines);
	}

	pub fn put_diary_entries_today(&self, user_id: &str, entries: &[&str]) {
		self.put_diary_entries(user_id, &today_label(), entries);
	}

	pub fn put_recommendation(&self, user_id: &str, text: &str, timestamp: OffsetDateTime) {
		let doc = serde_json::json!({
			"lastRecommendation": text,
			"timestamp": rfc3339(timestamp),
		});

		self.put_recommendation_document(user_id, doc);
	}

	/// Seed the per-user recommendation document verbatim, however malformed.
	pub fn put_recommendation_document(&self, user_id: &str, doc: Value) {
		self.lock_inner().recommendations.insert(user_id.to_string(), doc);
	}

	pub fn fail_config_reads(&self, fail: bool) {
		self.lock_inner().fail_config_reads = fail;
	}

	pub fn fail_diary_reads(&self, fail: bool) {
		self.lock_inner().fail_diary_reads = fail;
	}

	pub fn fail_recommendation_reads(&self, fail: bool) {
		self.lock_inner().fail_recommendation_reads = fail;
	}

	pub fn fail_recommendation_writes(&self, fail: bool) {
		self.lock_inner().fail_recommendation_writes = fail;
	}

	pub fn fail_log_appends(&self, fail: bool) {
		self.lock_inner().fail_log_appends = fail;
	}

	pub fn recommendation_document(&self, user_id: &str) -> Option<Value> {
		self.lock_inner().recommendations.get(user_id).cloned()
	}

	pub fn interactions(&self) -> Vec<InteractionLogEntry> {
		self.lock_inner().interactions.clone()
	}

	pub fn config_fetches(&self) -> usize {
		self.config_fetches.load(Ordering::SeqCst)
	}

	pub fn diary_fetches(&self) -> usize {
		self.diary_fetches.load(Ordering::SeqCst)
	}

	pub fn recommendation_fetches(&self) -> usize {
		self.recommendation_fetches.load(Ordering::SeqCst)
	}

	pub fn recommendation_writes(&self) -> usize {
		self.recommendation_writes.load(Ordering::SeqCst)
	}

	pub fn log_appends(&self) -> usize {
		self.log_appends.load(Ordering::SeqCst)
	}

	fn lock_inner(&self) -> MutexGuard<'_, Inner> {
		self.inner.lock().unwrap_or_else(|err| err.into_inner())
	}
}
impl DocumentStore for MemoryStore {
	fn fetch_ai_config(&self) -> BoxFuture<'_, Result<Option<AiConfig>>> {
		self.config_fetches.fetch_add(1, Ordering::SeqCst);

		let result = {
			let inner = self.lock_inner();

			if inner.fail_config_reads {
				Err(Error::Unavailable { message: "Injected config read failure.".to_string() })
			} else {
				Ok(inner.ai_config.as_ref().map(AiConfig::from_document))
			}
		};

		Box::pin(async move { result })
	}

	fn fetch_diary_entries<'a>(
		&'a self,
		user_id: &'a str,
		date_label: &'a str,
	) -> BoxFuture<'a, Result<Vec<String>>> {
		self.diary_fetches.fetch_add(1, Ordering::SeqCst);

		let result = {
			let inner = self.lock_inner();

			if inner.fail_diary_reads {
				Err(Error::Unavailable { message: "Injected diary read failure.".to_string() })
			} else {
				Ok(inner
					.diaries
					.get(&(user_id.to_string(), date_label.to_string()))
					.cloned()
					.unwrap_or_default())
			}
		};

		Box::pin(async move { result })
	}

	fn fetch_recommendation<'a>(
		&'a self,
		user_id: &'a str,
	) -> BoxFuture<'a, Result<Option<PersistedRecommendation>>> {
		self.recommendation_fetches.fetch_add(1, Ordering::SeqCst);

		let result = {
			let inner = self.lock_inner();

			if inner.fail_recommendation_reads {
				Err(Error::Unavailable {
					message: "Injected recommendation read failure.".to_string(),
				})
			} else {
				inner
					.recommendations
					.get(user_id)
					.map(|doc| PersistedRecommendation::from_document(user_id, doc))
					.transpose()
			}
		};

		Box::pin(async move { result })
	}

	fn store_recommendation<'a>(
		&'a self,
		rec: &'a PersistedRecommendation,
	) -> BoxFuture<'a, Result<()>> {
		self.recommendation_writes.fetch_add(1, Ordering::SeqCst);

		let result = {
			let mut inner = self.lock_inner();

			if inner.fail_recommendation_writes {
				Err(Error::Unavailable {
					message: "Injected recommendation write failure.".to_string(),
				})
			} else {
				match serde_json::to_value(rec) {
					Ok(doc) => {
						inner.recommendations.insert(rec.user_id.clone(), doc);

						Ok(())
					},
					Err(err) => Err(Error::Malformed {
						message: format!("Failed to encode recommendation: {err}."),
					}),
				}
			}
		};

		Box::pin(async move { result })
	}

	fn append_interaction<'a>(
		&'a self,
		entry: &'a InteractionLogEntry,
	) -> BoxFuture<'a, Result<()>> {
		self.log_appends.fetch_add(1, Ordering::SeqCst);

		let result = {
			let mut inner = self.lock_inner();

			if inner.fail_log_appends {
				Err(Error::Unavailable { message: "Injected log append failure.".to_string() })
			} else {
				inner.interactions.push(entry.clone());

				Ok(())
			}
		};

		Box::pin(async move { result })
	}
}

/// The UTC calendar label the core uses to fetch today's diary.
pub fn today_label() -> String {
	let now = OffsetDateTime::now_utc();

	format!("{:04}-{:02}-{:02}", now.year(), u8::from(now.month()), now.day())
}

/// A valid service configuration with a backoff step short enough for tests.
pub fn sample_config() -> Config {
	Config {
		provider: ProviderConfig {
			api_base: "http://localhost:0".to_string(),
			api_key: "test-key".to_string(),
			path: "/v1/chat/completions".to_string(),
			model: "advice-small".to_string(),
			timeout_ms: 1_000,
			default_headers: serde_json::Map::new(),
		},
		retry: Retry { max_attempts: 3, backoff_step_ms: 1 },
		cache: Cache { freshness_window_days: 7 },
	}
}

fn rfc3339(timestamp: OffsetDateTime) -> String {
	// Rfc3339 cannot format some extreme years; fall back to Display.
	timestamp.format(&Rfc3339).unwrap_or_else(|_| timestamp.to_string())
}
