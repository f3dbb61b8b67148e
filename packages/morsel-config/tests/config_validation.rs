use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use morsel_config::Error;

const SAMPLE_CONFIG_TOML: &str = r#"
[provider]
api_base   = "https://api.example.test"
api_key    = "test-key"
path       = "/v1/chat/completions"
model      = "advice-small"
timeout_ms = 30000

[retry]
max_attempts    = 3
backoff_step_ms = 4000

[cache]
freshness_window_days = 7
"#;

fn write_temp_config(payload: String) -> PathBuf {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("System time must be valid.")
		.as_nanos();
	let ordinal = COUNTER.fetch_add(1, Ordering::SeqCst);
	let pid = std::process::id();
	let mut path = env::temp_dir();

	path.push(format!("morsel_config_test_{nanos}_{pid}_{ordinal}.toml"));

	fs::write(&path, payload).expect("Failed to write test config.");

	path
}

fn load(payload: String) -> morsel_config::Result<morsel_config::Config> {
	let path = write_temp_config(payload);
	let result = morsel_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	result
}

#[test]
fn sample_config_is_valid() {
	let cfg = load(SAMPLE_CONFIG_TOML.to_string()).expect("Expected sample config to load.");

	assert_eq!(cfg.provider.model, "advice-small");
	assert_eq!(cfg.retry.max_attempts, 3);
	assert_eq!(cfg.retry.backoff_step_ms, 4_000);
	assert_eq!(cfg.cache.freshness_window_days, 7);
}

#[test]
fn retry_and_cache_sections_are_optional() {
	let payload = r#"
[provider]
api_base   = "https://api.example.test"
api_key    = "test-key"
path       = "/v1/chat/completions"
model      = "advice-small"
timeout_ms = 30000
"#;
	let cfg = load(payload.to_string()).expect("Expected config without retry/cache to load.");

	assert_eq!(cfg.retry.max_attempts, 3);
	assert_eq!(cfg.retry.backoff_step_ms, 4_000);
	assert_eq!(cfg.cache.freshness_window_days, 7);
}

#[test]
fn provider_strings_are_trimmed() {
	let payload = SAMPLE_CONFIG_TOML.replace("\"test-key\"", "\"  test-key \"");
	let cfg = load(payload).expect("Expected padded config to load.");

	assert_eq!(cfg.provider.api_key, "test-key");
}

#[test]
fn api_key_must_be_non_empty() {
	let payload = SAMPLE_CONFIG_TOML.replace("\"test-key\"", "\"   \"");
	let err = load(payload).expect_err("Expected api_key validation error.");

	assert!(
		err.to_string().contains("provider.api_key must be non-empty."),
		"Unexpected error: {err}"
	);
}

#[test]
fn model_must_be_non_empty() {
	let payload = SAMPLE_CONFIG_TOML.replace("\"advice-small\"", "\"\"");
	let err = load(payload).expect_err("Expected model validation error.");

	assert!(
		err.to_string().contains("provider.model must be non-empty."),
		"Unexpected error: {err}"
	);
}

#[test]
fn timeout_must_be_positive() {
	let payload = SAMPLE_CONFIG_TOML.replace("timeout_ms = 30000", "timeout_ms = 0");
	let err = load(payload).expect_err("Expected timeout validation error.");

	assert!(
		err.to_string().contains("provider.timeout_ms must be greater than zero."),
		"Unexpected error: {err}"
	);
}

#[test]
fn retry_attempts_must_be_positive() {
	let payload = SAMPLE_CONFIG_TOML.replace("max_attempts    = 3", "max_attempts    = 0");
	let err = load(payload).expect_err("Expected max_attempts validation error.");

	assert!(
		err.to_string().contains("retry.max_attempts must be greater than zero."),
		"Unexpected error: {err}"
	);
}

#[test]
fn backoff_step_must_be_positive() {
	let payload = SAMPLE_CONFIG_TOML.replace("backoff_step_ms = 4000", "backoff_step_ms = 0");
	let err = load(payload).expect_err("Expected backoff_step_ms validation error.");

	assert!(
		err.to_string().contains("retry.backoff_step_ms must be greater than zero."),
		"Unexpected error: {err}"
	);
}

#[test]
fn freshness_window_must_be_positive() {
	let payload =
		SAMPLE_CONFIG_TOML.replace("freshness_window_days = 7", "freshness_window_days = 0");
	let err = load(payload).expect_err("Expected freshness window validation error.");

	assert!(
		err.to_string().contains("cache.freshness_window_days must be greater than zero."),
		"Unexpected error: {err}"
	);
}

#[test]
fn malformed_toml_is_a_parse_error() {
	let err = load("[provider".to_string()).expect_err("Expected parse error.");

	assert!(matches!(err, Error::ParseConfig { .. }), "Unexpected error: {err}");
}

#[test]
fn missing_file_is_a_read_error() {
	let mut path = env::temp_dir();

	path.push("morsel_config_test_missing.toml");

	let err = morsel_config::load(&path).expect_err("Expected read error.");

	assert!(matches!(err, Error::ReadConfig { .. }), "Unexpected error: {err}");
}
