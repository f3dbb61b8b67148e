use morsel_storage::{AiConfig, DocumentStore};
use tokio::sync::Mutex;

/// Process-lifetime cache of the admin generation settings.
///
/// The first call fetches once; concurrent first calls coalesce on the lock.
/// A fetch error falls back to [`AiConfig::default`] without caching it, so
/// the next call retries the fetch. A missing document is cached as the
/// default. Callers never see a failure.
pub(crate) struct ConfigCache {
	slot: Mutex<Option<AiConfig>>,
}

impl ConfigCache {
	pub(crate) fn new() -> Self {
		Self { slot: Mutex::new(None) }
	}

	pub(crate) async fn get(&self, store: &dyn DocumentStore) -> AiConfig {
		let mut slot = self.slot.lock().await;

		if let Some(cfg) = slot.as_ref() {
			return cfg.clone();
		}

		match store.fetch_ai_config().await {
			Ok(Some(cfg)) => {
				*slot = Some(cfg.clone());

				cfg
			},
			Ok(None) => {
				tracing::info!("No generation settings document; using defaults.");

				let cfg = AiConfig::default();

				*slot = Some(cfg.clone());

				cfg
			},
			Err(err) => {
				tracing::warn!(error = %err, "Failed to fetch generation settings; using defaults.");

				AiConfig::default()
			},
		}
	}

	pub(crate) async fn invalidate(&self) {
		*self.slot.lock().await = None;
	}
}
