use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub provider: ProviderConfig,
	#[serde(default)]
	pub retry: Retry,
	#[serde(default)]
	pub cache: Cache,
}

#[derive(Debug, Deserialize)]
pub struct ProviderConfig {
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Retry {
	pub max_attempts: u32,
	pub backoff_step_ms: u64,
}
impl Default for Retry {
	fn default() -> Self {
		Self { max_attempts: 3, backoff_step_ms: 4_000 }
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Cache {
	pub freshness_window_days: i64,
}
impl Default for Cache {
	fn default() -> Self {
		Self { freshness_window_days: 7 }
	}
}
