use serde::{Deserialize, Serialize};

/// One meal-diary entry as the app records it.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiaryEntrySummary {
	/// Sticker the child picked for the meal, usually an emoji.
	pub sticker: String,
	/// Meal moment, e.g. "Desayuno" or "Cena".
	pub moment: String,
	/// Free-text description of what was eaten.
	pub description: String,
	/// Parent rating from 1 to 5, when given.
	#[serde(default)]
	pub rating: Option<u8>,
}

impl DiaryEntrySummary {
	/// Render the entry as one prompt line.
	pub fn render_line(&self) -> String {
		match self.rating {
			Some(rating) => format!(
				"{} {}: {} ({rating}/5)",
				self.sticker, self.moment, self.description
			),
			None => format!("{} {}: {}", self.sticker, self.moment, self.description),
		}
	}
}
