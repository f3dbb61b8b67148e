use std::fmt;

/// Reserved fingerprint for a day with no diary entries.
pub const EMPTY_FINGERPRINT: &str = "empty";

/// Normalized hash of a user's diary entry lines, used for change detection.
///
/// Two fingerprints are equal iff the source entry sets are equal modulo
/// ordering, whitespace padding, and letter case. Entry content itself is
/// preserved verbatim before hashing, so any textual change produces a new
/// fingerprint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fingerprint(String);

impl Fingerprint {
	pub fn compute(entries: &[String]) -> Self {
		if entries.is_empty() {
			return Self(EMPTY_FINGERPRINT.to_string());
		}

		let mut lines: Vec<String> = entries.iter().map(|entry| normalize_line(entry)).collect();

		lines.sort_unstable();

		let joined = lines.join("|");

		Self(blake3::hash(joined.as_bytes()).to_hex().to_string())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	pub fn is_empty_diary(&self) -> bool {
		self.0 == EMPTY_FINGERPRINT
	}
}

impl fmt::Display for Fingerprint {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

fn normalize_line(line: &str) -> String {
	line.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn entries(lines: &[&str]) -> Vec<String> {
		lines.iter().map(|line| line.to_string()).collect()
	}

	#[test]
	fn empty_input_uses_reserved_marker() {
		let fp = Fingerprint::compute(&[]);

		assert_eq!(fp.as_str(), EMPTY_FINGERPRINT);
		assert!(fp.is_empty_diary());
	}

	#[test]
	fn stable_under_permutation() {
		let a = Fingerprint::compute(&entries(&["🍎 Desayuno: manzana", "🥦 Cena: brocoli"]));
		let b = Fingerprint::compute(&entries(&["🥦 Cena: brocoli", "🍎 Desayuno: manzana"]));

		assert_eq!(a, b);
	}

	#[test]
	fn stable_under_case_and_whitespace_padding() {
		let a = Fingerprint::compute(&entries(&["🍎 Desayuno: manzana"]));
		let b = Fingerprint::compute(&entries(&["  🍎  desayuno: MANZANA "]));

		assert_eq!(a, b);
	}

	#[test]
	fn content_change_produces_new_fingerprint() {
		let a = Fingerprint::compute(&entries(&["🍎 Desayuno: manzana"]));
		let b = Fingerprint::compute(&entries(&["🍎 Desayuno: pera"]));

		assert_ne!(a, b);
		assert!(!a.is_empty_diary());
	}

	#[test]
	fn entry_count_changes_fingerprint() {
		let a = Fingerprint::compute(&entries(&["🍎 Desayuno: manzana"]));
		let b = Fingerprint::compute(&entries(&["🍎 Desayuno: manzana", "🍎 Desayuno: manzana"]));

		assert_ne!(a, b);
	}

	#[test]
	fn displays_the_stored_form() {
		let fp = Fingerprint::compute(&entries(&["🍎 Desayuno: manzana"]));

		assert_eq!(fp.to_string(), fp.as_str());
		assert_eq!(Fingerprint::compute(&[]).to_string(), EMPTY_FINGERPRINT);
	}
}
