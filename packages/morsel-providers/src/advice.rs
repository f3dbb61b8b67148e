use std::time::Duration;

use morsel_config::ProviderConfig;
use reqwest::Client;
use serde_json::Value;

use crate::{Error, Result};

/// Ask the generation endpoint for one completion of `prompt`.
///
/// Overload statuses (429, 502, 503) come back as [`Error::Overloaded`] so
/// the caller can decide to retry; every other failure is final.
pub async fn generate(cfg: &ProviderConfig, prompt: &str, temperature: f32) -> Result<String> {
	let client = Client::builder()
		.timeout(Duration::from_millis(cfg.timeout_ms))
		.build()
		.map_err(|err| Error::Network { source: err })?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"temperature": temperature,
		"messages": [{ "role": "user", "content": prompt }],
	});
	let res = client
		.post(&url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await
		.map_err(|err| Error::Network { source: err })?;
	let status = res.status();

	if matches!(status.as_u16(), 429 | 502 | 503) {
		return Err(Error::Overloaded { status: status.as_u16() });
	}
	if !status.is_success() {
		let message = res.text().await.unwrap_or_default();

		return Err(Error::Api { status: status.as_u16(), message });
	}

	let json: Value = res.json().await.map_err(|_| Error::InvalidResponse {
		message: "Completion response is not valid JSON.".to_string(),
	})?;

	parse_completion(&json)
}

fn parse_completion(json: &Value) -> Result<String> {
	let content = json
		.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|msg| msg.get("content"))
		.and_then(|c| c.as_str())
		.ok_or_else(|| Error::InvalidResponse {
			message: "Completion response is missing message content.".to_string(),
		})?;
	let text = content.trim();

	if text.is_empty() {
		return Err(Error::EmptyCompletion);
	}

	Ok(text.to_string())
}
