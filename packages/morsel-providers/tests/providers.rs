use reqwest::header::AUTHORIZATION;
use serde_json::{Map, json};

#[test]
fn builds_bearer_auth_header() {
	let headers =
		morsel_providers::auth_headers("secret", &Map::new()).expect("Failed to build headers.");
	let value = headers.get(AUTHORIZATION).expect("Missing authorization header.");
	assert_eq!(value, "Bearer secret");
}

#[test]
fn forwards_string_default_headers() {
	let mut defaults = Map::new();
	defaults.insert("x-morsel-client".to_string(), json!("diary-app"));

	let headers =
		morsel_providers::auth_headers("secret", &defaults).expect("Failed to build headers.");
	let value = headers.get("x-morsel-client").expect("Missing default header.");
	assert_eq!(value, "diary-app");
}

#[test]
fn rejects_non_string_default_header() {
	let mut defaults = Map::new();
	defaults.insert("x-retry-budget".to_string(), json!(3));

	let err = morsel_providers::auth_headers("secret", &defaults)
		.expect_err("Expected non-string header value to be rejected.");

	assert!(
		matches!(err, morsel_providers::Error::InvalidConfig { .. }),
		"Unexpected error: {err}"
	);
}
