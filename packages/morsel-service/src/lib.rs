pub mod recommend;

mod config_cache;
mod retry;

use std::{
	collections::HashMap,
	future::Future,
	pin::Pin,
	sync::{Arc, Mutex},
};

use morsel_config::{Config, ProviderConfig};
use morsel_providers::advice;
use morsel_storage::DocumentStore;

use config_cache::ConfigCache;
pub use recommend::{
	MSG_DISABLED, MSG_EMPTY_DIARY, MSG_LOADING, RecommendRequest, Warning,
};

pub type Result<T, E = Error> = std::result::Result<T, E>;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

const MAX_WARNINGS: usize = 64;

/// The completion backend. Implementations resolve with non-blank text or an
/// error; blank completions are reported as
/// [`morsel_providers::Error::EmptyCompletion`].
pub trait AdviceProvider
where
	Self: Send + Sync,
{
	fn generate<'a>(
		&'a self,
		cfg: &'a ProviderConfig,
		prompt: &'a str,
		temperature: f32,
	) -> BoxFuture<'a, morsel_providers::Result<String>>;
}

/// Errors surfaced to the caller. Display doubles as the user-facing message,
/// so every variant renders as a friendly sentence rather than a raw failure.
#[derive(Debug)]
pub enum Error {
	NetworkUnavailable,
	UpstreamOverloaded,
	UpstreamFailed { message: String },
	Unclassified { message: String },
}

#[derive(Clone)]
pub struct Providers {
	pub advice: Arc<dyn AdviceProvider>,
}

pub struct MorselService {
	pub cfg: Config,
	pub store: Arc<dyn DocumentStore>,
	pub providers: Providers,
	config_cache: ConfigCache,
	slots: Mutex<HashMap<String, Arc<recommend::UserSlot>>>,
	warnings: Mutex<Vec<Warning>>,
}

struct DefaultProviders;

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::NetworkUnavailable => {
				write!(f, "No connection right now. Check your internet and try again.")
			},
			Self::UpstreamOverloaded => {
				write!(f, "The advice service is very busy right now. Please try again in a moment.")
			},
			Self::UpstreamFailed { message } => {
				write!(f, "The advice service could not create a recommendation: {message}")
			},
			Self::Unclassified { message } => {
				write!(f, "Something went wrong while preparing your advice: {message}")
			},
		}
	}
}

impl std::error::Error for Error {}

impl From<morsel_providers::Error> for Error {
	fn from(err: morsel_providers::Error) -> Self {
		match err {
			morsel_providers::Error::Network { .. } => Self::NetworkUnavailable,
			morsel_providers::Error::Overloaded { .. } => Self::UpstreamOverloaded,
			morsel_providers::Error::Api { status, message } => {
				Self::UpstreamFailed { message: format!("status {status}: {message}") }
			},
			other => Self::Unclassified { message: other.to_string() },
		}
	}
}

impl From<morsel_storage::Error> for Error {
	fn from(err: morsel_storage::Error) -> Self {
		match err {
			morsel_storage::Error::Unavailable { .. } => Self::NetworkUnavailable,
			morsel_storage::Error::Malformed { message } => Self::Unclassified { message },
		}
	}
}

impl AdviceProvider for DefaultProviders {
	fn generate<'a>(
		&'a self,
		cfg: &'a ProviderConfig,
		prompt: &'a str,
		temperature: f32,
	) -> BoxFuture<'a, morsel_providers::Result<String>> {
		Box::pin(advice::generate(cfg, prompt, temperature))
	}
}

impl Providers {
	pub fn new(advice: Arc<dyn AdviceProvider>) -> Self {
		Self { advice }
	}
}

impl Default for Providers {
	fn default() -> Self {
		Self { advice: Arc::new(DefaultProviders) }
	}
}

impl MorselService {
	pub fn new(cfg: Config, store: Arc<dyn DocumentStore>) -> Self {
		Self::with_providers(cfg, store, Providers::default())
	}

	pub fn with_providers(cfg: Config, store: Arc<dyn DocumentStore>, providers: Providers) -> Self {
		Self {
			cfg,
			store,
			providers,
			config_cache: ConfigCache::new(),
			slots: Mutex::new(HashMap::new()),
			warnings: Mutex::new(Vec::new()),
		}
	}

	/// Take and clear the non-fatal persistence warnings recorded so far.
	pub fn drain_warnings(&self) -> Vec<Warning> {
		let mut warnings = self.warnings.lock().unwrap_or_else(|err| err.into_inner());

		std::mem::take(&mut *warnings)
	}

	pub(crate) fn record_warning(&self, warning: Warning) {
		let mut warnings = self.warnings.lock().unwrap_or_else(|err| err.into_inner());

		if warnings.len() < MAX_WARNINGS {
			warnings.push(warning);
		}
	}
}
