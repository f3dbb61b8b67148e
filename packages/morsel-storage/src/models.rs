use serde::Serialize;
use serde_json::Value;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::{
	error::{Error, Result},
	time_serde,
};

/// Admin-managed generation settings, one document for the whole app.
///
/// Store documents are written by hand from an admin panel, so every field is
/// optional on the wire; [`AiConfig::default`] supplies the value for anything
/// missing, null, or of the wrong type.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AiConfig {
	pub system_prompt: String,
	pub enabled: bool,
	pub max_response_length: usize,
	pub temperature: f32,
	#[serde(with = "time_serde::option")]
	pub last_updated: Option<OffsetDateTime>,
	pub updated_by: Option<String>,
}
impl Default for AiConfig {
	fn default() -> Self {
		Self {
			system_prompt: String::new(),
			enabled: true,
			max_response_length: 400,
			temperature: 0.7,
			last_updated: None,
			updated_by: None,
		}
	}
}
impl AiConfig {
	pub fn from_document(doc: &Value) -> Self {
		let mut cfg = Self::default();

		if let Some(value) = doc.get("systemPrompt").and_then(Value::as_str) {
			cfg.system_prompt = value.to_string();
		}
		if let Some(value) = doc.get("enabled").and_then(Value::as_bool) {
			cfg.enabled = value;
		}
		if let Some(value) = doc.get("maxResponseLength").and_then(Value::as_u64) {
			cfg.max_response_length = value as usize;
		}
		if let Some(value) = doc.get("temperature").and_then(Value::as_f64) {
			cfg.temperature = value as f32;
		}

		cfg.last_updated = doc
			.get("lastUpdated")
			.and_then(Value::as_str)
			.and_then(|raw| OffsetDateTime::parse(raw, &Rfc3339).ok());
		cfg.updated_by = doc.get("updatedBy").and_then(Value::as_str).map(str::to_string);

		cfg
	}
}

/// The last successfully generated recommendation, one document per user,
/// overwritten on every successful generation.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedRecommendation {
	#[serde(skip)]
	pub user_id: String,
	pub last_recommendation: String,
	#[serde(with = "time_serde")]
	pub timestamp: OffsetDateTime,
}
impl PersistedRecommendation {
	/// Decode the per-user document. Blank text or an absent or unparseable
	/// timestamp makes the document unusable as a fallback.
	pub fn from_document(user_id: &str, doc: &Value) -> Result<Self> {
		let text = doc
			.get("lastRecommendation")
			.and_then(Value::as_str)
			.filter(|text| !text.trim().is_empty())
			.ok_or_else(|| Error::Malformed {
				message: format!("Recommendation for {user_id} has no text."),
			})?;
		let raw_timestamp =
			doc.get("timestamp").and_then(Value::as_str).ok_or_else(|| Error::Malformed {
				message: format!("Recommendation for {user_id} has no timestamp."),
			})?;
		let timestamp =
			OffsetDateTime::parse(raw_timestamp, &Rfc3339).map_err(|_| Error::Malformed {
				message: format!("Recommendation for {user_id} has an invalid timestamp."),
			})?;

		Ok(Self { user_id: user_id.to_string(), last_recommendation: text.to_string(), timestamp })
	}
}

/// Append-only audit record of one generation; never read back by the core.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionLogEntry {
	pub user_id: String,
	pub user_name: String,
	pub user_input: String,
	pub ai_response: String,
	#[serde(with = "time_serde")]
	pub timestamp: OffsetDateTime,
	pub prompt_used: String,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn ai_config_defaults_apply_to_empty_document() {
		let cfg = AiConfig::from_document(&serde_json::json!({}));

		assert_eq!(cfg, AiConfig::default());
		assert!(cfg.enabled);
		assert_eq!(cfg.system_prompt, "");
		assert_eq!(cfg.max_response_length, 400);
		assert_eq!(cfg.temperature, 0.7);
	}

	#[test]
	fn ai_config_reads_explicit_fields() {
		let cfg = AiConfig::from_document(&serde_json::json!({
			"systemPrompt": "Eres un nutricionista amable.",
			"enabled": false,
			"maxResponseLength": 250,
			"temperature": 0.2,
			"lastUpdated": "2026-03-01T12:00:00Z",
			"updatedBy": "admin",
		}));

		assert_eq!(cfg.system_prompt, "Eres un nutricionista amable.");
		assert!(!cfg.enabled);
		assert_eq!(cfg.max_response_length, 250);
		assert_eq!(cfg.temperature, 0.2);
		assert!(cfg.last_updated.is_some());
		assert_eq!(cfg.updated_by.as_deref(), Some("admin"));
	}

	#[test]
	fn ai_config_nulls_and_wrong_types_fall_back_to_defaults() {
		let cfg = AiConfig::from_document(&serde_json::json!({
			"systemPrompt": null,
			"enabled": "yes",
			"maxResponseLength": "400",
			"temperature": null,
			"lastUpdated": "not a timestamp",
		}));

		assert_eq!(cfg, AiConfig::default());
	}

	#[test]
	fn recommendation_decodes_valid_document() {
		let rec = PersistedRecommendation::from_document(
			"user-1",
			&serde_json::json!({
				"lastRecommendation": "Prueba a añadir verdura en la cena.",
				"timestamp": "2026-03-01T12:00:00Z",
			}),
		)
		.expect("Expected document to decode.");

		assert_eq!(rec.user_id, "user-1");
		assert_eq!(rec.last_recommendation, "Prueba a añadir verdura en la cena.");
	}

	#[test]
	fn recommendation_rejects_blank_text() {
		let err = PersistedRecommendation::from_document(
			"user-1",
			&serde_json::json!({ "lastRecommendation": "   ", "timestamp": "2026-03-01T12:00:00Z" }),
		)
		.expect_err("Expected blank text to be rejected.");

		assert!(matches!(err, Error::Malformed { .. }), "Unexpected error: {err}");
	}

	#[test]
	fn recommendation_rejects_missing_timestamp() {
		let err = PersistedRecommendation::from_document(
			"user-1",
			&serde_json::json!({ "lastRecommendation": "Algo rico." }),
		)
		.expect_err("Expected missing timestamp to be rejected.");

		assert!(err.to_string().contains("no timestamp"), "Unexpected error: {err}");
	}

	#[test]
	fn recommendation_rejects_unparseable_timestamp() {
		let err = PersistedRecommendation::from_document(
			"user-1",
			&serde_json::json!({ "lastRecommendation": "Algo rico.", "timestamp": 1234 }),
		)
		.expect_err("Expected non-string timestamp to be rejected.");

		assert!(err.to_string().contains("no timestamp"), "Unexpected error: {err}");

		let err = PersistedRecommendation::from_document(
			"user-1",
			&serde_json::json!({ "lastRecommendation": "Algo rico.", "timestamp": "yesterday" }),
		)
		.expect_err("Expected unparseable timestamp to be rejected.");

		assert!(err.to_string().contains("invalid timestamp"), "Unexpected error: {err}");
	}

	#[test]
	fn recommendation_serializes_to_wire_names() {
		let rec = PersistedRecommendation {
			user_id: "user-1".to_string(),
			last_recommendation: "Más fruta mañana.".to_string(),
			timestamp: OffsetDateTime::from_unix_timestamp(1_760_000_000).unwrap(),
		};
		let doc = serde_json::to_value(&rec).expect("Expected recommendation to serialize.");

		assert!(doc.get("lastRecommendation").is_some());
		assert!(doc.get("timestamp").and_then(Value::as_str).is_some());
		assert!(doc.get("userId").is_none());

		let decoded = PersistedRecommendation::from_document("user-1", &doc)
			.expect("Expected serialized document to decode.");

		assert_eq!(decoded, rec);
	}

	#[test]
	fn interaction_log_serializes_to_wire_names() {
		let entry = InteractionLogEntry {
			user_id: "user-1".to_string(),
			user_name: "Lucía".to_string(),
			user_input: "🍎 Desayuno: manzana".to_string(),
			ai_response: "¡Buen desayuno!".to_string(),
			timestamp: OffsetDateTime::from_unix_timestamp(1_760_000_000).unwrap(),
			prompt_used: "Eres un nutricionista.\n\n🍎 Desayuno: manzana".to_string(),
		};
		let doc = serde_json::to_value(&entry).expect("Expected log entry to serialize.");

		assert_eq!(doc.get("userId").and_then(Value::as_str), Some("user-1"));
		assert_eq!(doc.get("aiResponse").and_then(Value::as_str), Some("¡Buen desayuno!"));
		assert!(doc.get("promptUsed").is_some());
	}
}
