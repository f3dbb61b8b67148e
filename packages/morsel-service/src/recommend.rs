//! The recommendation cache: change detection, single-flight, and fallback.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use morsel_domain::{Fingerprint, is_fresh, truncate_to_chars};
use morsel_storage::{InteractionLogEntry, PersistedRecommendation};

use crate::{Error, MorselService, Result, retry};

pub const MSG_LOADING: &str = "Loading...";
pub const MSG_DISABLED: &str = "Advice is temporarily unavailable. Please check back later!";
pub const MSG_EMPTY_DIARY: &str = "Write something in your diary today to get advice!";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RecommendRequest {
	pub user_id: String,
	pub user_name: String,
	#[serde(default)]
	pub force_refresh: bool,
}

/// Non-fatal persistence failures, recorded so callers and tests can observe
/// them without the user-visible call failing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Warning {
	RecommendationPersistFailed { user_id: String },
	InteractionLogFailed { user_id: String },
}

/// Where a served recommendation came from, for the logs.
#[derive(Clone, Copy, Debug)]
enum Origin {
	ConfigDisabled,
	CacheHitMemory,
	CacheRestoredFromStore,
	GeneratingFresh,
	FallbackOnEmpty,
	FallbackOnError,
}

pub(crate) struct UserSlot {
	/// Serializes the whole decide-and-generate sequence for one user,
	/// including the retry backoff.
	gate: tokio::sync::Mutex<()>,
	/// Guards the observable per-user cache state; held only briefly and
	/// never across an await.
	state: Mutex<UserState>,
}

#[derive(Default)]
struct UserState {
	in_flight: bool,
	fingerprint: Option<Fingerprint>,
	cached: Option<CachedAdvice>,
}

/// In-memory copy of the last served recommendation. The text is never blank.
#[derive(Clone)]
struct CachedAdvice {
	text: String,
	generated_at: OffsetDateTime,
}

impl UserSlot {
	fn new() -> Self {
		Self { gate: tokio::sync::Mutex::new(()), state: Mutex::new(UserState::default()) }
	}

	fn lock_state(&self) -> MutexGuard<'_, UserState> {
		self.state.lock().unwrap_or_else(|err| err.into_inner())
	}
}

impl MorselService {
	/// Today's recommendation for one user, served from memory, the store, or
	/// a fresh generation, in that order of preference.
	///
	/// At most one generation runs per user at a time. A caller that arrives
	/// while one is running gets the current cached text, or [`MSG_LOADING`]
	/// when the cache is cold, without waiting for the generation to finish.
	pub async fn get_recommendation(&self, req: &RecommendRequest) -> Result<String> {
		let slot = self.slot(&req.user_id);

		{
			let state = slot.lock_state();

			if state.in_flight {
				let text = state
					.cached
					.as_ref()
					.map(|cached| cached.text.clone())
					.unwrap_or_else(|| MSG_LOADING.to_string());

				tracing::debug!(user = %req.user_id, "Generation in flight; serving interim text.");

				return Ok(text);
			}
		}

		let _gate = slot.gate.lock().await;
		let ai_cfg = self.config_cache.get(self.store.as_ref()).await;

		if !ai_cfg.enabled {
			tracing::info!(user = %req.user_id, origin = ?Origin::ConfigDisabled, "Recommendation served.");

			return Ok(MSG_DISABLED.to_string());
		}

		let now = OffsetDateTime::now_utc();
		let entries = match self.store.fetch_diary_entries(&req.user_id, &date_label(now)).await {
			Ok(entries) => entries,
			Err(err) => {
				tracing::error!(error = %err, user = %req.user_id, "Failed to fetch diary entries.");

				return self.recover_with_persisted(&req.user_id, err.into()).await;
			},
		};
		let fingerprint = Fingerprint::compute(&entries);

		// Change detection against the remembered fingerprint. A cold slot
		// first tries to restore the persisted value.
		let (is_cold, mut has_changes, mut cached) = {
			let state = slot.lock_state();

			(
				state.cached.is_none() && state.fingerprint.is_none(),
				state.fingerprint.as_ref() != Some(&fingerprint),
				state.cached.clone(),
			)
		};
		let mut restored = false;

		if is_cold && let Some(rec) = self.fresh_persisted(&req.user_id, now).await {
			let adopted =
				CachedAdvice { text: rec.last_recommendation, generated_at: rec.timestamp };
			let mut state = slot.lock_state();

			state.fingerprint = Some(fingerprint.clone());
			state.cached = Some(adopted.clone());
			cached = Some(adopted);
			has_changes = false;
			restored = true;
		}

		if !req.force_refresh
			&& !has_changes
			&& let Some(cached) = cached
		{
			let origin =
				if restored { Origin::CacheRestoredFromStore } else { Origin::CacheHitMemory };

			tracing::info!(user = %req.user_id, origin = ?origin, generated_at = %cached.generated_at, "Recommendation served.");

			return Ok(cached.text);
		}

		if entries.is_empty() {
			return self.serve_empty_diary(req, &slot, &fingerprint, now).await;
		}

		{
			let mut state = slot.lock_state();

			state.in_flight = true;
		}

		let prompt = build_prompt(&ai_cfg.system_prompt, &entries);
		let generated = retry::generate_with_retry(
			self.providers.advice.as_ref(),
			&self.cfg.provider,
			&self.cfg.retry,
			&prompt,
			ai_cfg.temperature,
		)
		.await;

		match generated {
			Ok(raw) => {
				let text = truncate_to_chars(&raw, ai_cfg.max_response_length);
				let generated_at = OffsetDateTime::now_utc();

				self.persist_success(req, &entries, &prompt, &text, generated_at).await;

				tracing::info!(
					user = %req.user_id,
					origin = ?Origin::GeneratingFresh,
					fingerprint = %fingerprint,
					"Recommendation served."
				);

				{
					let mut state = slot.lock_state();

					state.fingerprint = Some(fingerprint);
					state.cached = Some(CachedAdvice { text: text.clone(), generated_at });
					state.in_flight = false;
				}

				Ok(text)
			},
			Err(err) => {
				{
					let mut state = slot.lock_state();

					state.in_flight = false;
				}

				tracing::error!(error = %err, user = %req.user_id, "Generation failed.");

				self.recover_with_persisted(&req.user_id, err.into()).await
			},
		}
	}

	/// Forget every per-user slot and the cached admin settings. The next
	/// call re-fetches both and re-evaluates from scratch. Idempotent; an
	/// in-flight generation is not interrupted.
	pub async fn invalidate_cache(&self) {
		{
			let slots = self.slots.lock().unwrap_or_else(|err| err.into_inner());

			for slot in slots.values() {
				let mut state = slot.lock_state();

				state.fingerprint = None;
				state.cached = None;
			}
		}

		self.config_cache.invalidate().await;

		tracing::info!("Recommendation caches invalidated.");
	}

	fn slot(&self, user_id: &str) -> Arc<UserSlot> {
		let mut slots = self.slots.lock().unwrap_or_else(|err| err.into_inner());

		slots.entry(user_id.to_string()).or_insert_with(|| Arc::new(UserSlot::new())).clone()
	}

	async fn serve_empty_diary(
		&self,
		req: &RecommendRequest,
		slot: &UserSlot,
		fingerprint: &Fingerprint,
		now: OffsetDateTime,
	) -> Result<String> {
		if let Some(rec) = self.fresh_persisted(&req.user_id, now).await {
			let mut state = slot.lock_state();

			state.fingerprint = Some(fingerprint.clone());
			state.cached = Some(CachedAdvice {
				text: rec.last_recommendation.clone(),
				generated_at: rec.timestamp,
			});

			tracing::info!(user = %req.user_id, origin = ?Origin::FallbackOnEmpty, "Recommendation served.");

			return Ok(rec.last_recommendation);
		}

		// Remember the empty fingerprint so the next call sees no change.
		{
			let mut state = slot.lock_state();

			state.fingerprint = Some(fingerprint.clone());
		}

		tracing::info!(user = %req.user_id, origin = ?Origin::FallbackOnEmpty, "Recommendation served.");

		Ok(MSG_EMPTY_DIARY.to_string())
	}

	/// After a failed generation, any persisted value beats surfacing an
	/// error, regardless of age. The memory slot is left alone so the next
	/// call tries generation again.
	async fn recover_with_persisted(&self, user_id: &str, err: Error) -> Result<String> {
		match self.store.fetch_recommendation(user_id).await {
			Ok(Some(rec)) => {
				tracing::warn!(user = %user_id, origin = ?Origin::FallbackOnError, "Serving persisted recommendation after a failure.");

				Ok(rec.last_recommendation)
			},
			Ok(None) => Err(err),
			Err(fetch_err) => {
				tracing::warn!(error = %fetch_err, user = %user_id, "Fallback lookup failed.");

				Err(err)
			},
		}
	}

	/// The persisted recommendation, only if it is inside the freshness
	/// window. Read errors and malformed documents count as no value.
	async fn fresh_persisted(
		&self,
		user_id: &str,
		now: OffsetDateTime,
	) -> Option<PersistedRecommendation> {
		match self.store.fetch_recommendation(user_id).await {
			Ok(Some(rec))
				if is_fresh(rec.timestamp, now, self.cfg.cache.freshness_window_days) =>
				Some(rec),
			Ok(Some(rec)) => {
				tracing::debug!(user = %user_id, stored_at = %rec.timestamp, "Persisted recommendation is stale.");

				None
			},
			Ok(None) => None,
			Err(err) => {
				tracing::warn!(error = %err, user = %user_id, "Failed to read persisted recommendation.");

				None
			},
		}
	}

	async fn persist_success(
		&self,
		req: &RecommendRequest,
		entries: &[String],
		prompt: &str,
		text: &str,
		now: OffsetDateTime,
	) {
		let rec = PersistedRecommendation {
			user_id: req.user_id.clone(),
			last_recommendation: text.to_string(),
			timestamp: now,
		};

		if let Err(err) = self.store.store_recommendation(&rec).await {
			tracing::warn!(error = %err, user = %req.user_id, "Failed to persist recommendation.");
			self.record_warning(Warning::RecommendationPersistFailed {
				user_id: req.user_id.clone(),
			});
		}

		let entry = InteractionLogEntry {
			user_id: req.user_id.clone(),
			user_name: req.user_name.clone(),
			user_input: entries.join("\n"),
			ai_response: text.to_string(),
			timestamp: now,
			prompt_used: prompt.to_string(),
		};

		if let Err(err) = self.store.append_interaction(&entry).await {
			tracing::warn!(error = %err, user = %req.user_id, "Failed to append interaction log.");
			self.record_warning(Warning::InteractionLogFailed { user_id: req.user_id.clone() });
		}
	}
}

fn build_prompt(system_prompt: &str, entries: &[String]) -> String {
	let diary = entries.join("\n");

	if system_prompt.trim().is_empty() {
		return diary;
	}

	format!("{system_prompt}\n\n{diary}")
}

/// UTC calendar date in ISO form, the key diary entries are grouped under.
fn date_label(now: OffsetDateTime) -> String {
	let date = now.date();

	format!("{:04}-{:02}-{:02}", date.year(), u8::from(date.month()), date.day())
}
