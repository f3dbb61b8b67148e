use unicode_segmentation::UnicodeSegmentation;

/// How close to the character limit a space must be for the cut to move back
/// to it instead of splitting the word.
const WORD_BOUNDARY_SLACK: usize = 50;

const ELLIPSIS: &str = "...";

/// Cut `text` to at most `max_chars` characters plus an ellipsis.
///
/// The cut lands on a grapheme-cluster boundary, so multi-codepoint emoji are
/// never split. When a space falls within [`WORD_BOUNDARY_SLACK`] characters
/// of the limit, the cut moves back to it to keep whole words.
pub fn truncate_to_chars(text: &str, max_chars: usize) -> String {
	if text.chars().count() <= max_chars {
		return text.to_string();
	}

	let mut cut = 0;
	let mut included = 0usize;

	for (idx, grapheme) in text.grapheme_indices(true) {
		let grapheme_chars = grapheme.chars().count();

		if included + grapheme_chars > max_chars {
			break;
		}

		included += grapheme_chars;
		cut = idx + grapheme.len();
	}

	let mut head = &text[..cut];

	if let Some(space) = head.rfind(' ') {
		let chars_before_space = head[..space].chars().count();

		if max_chars - chars_before_space <= WORD_BOUNDARY_SLACK {
			head = &head[..space];
		}
	}

	let mut out = head.trim_end().to_string();

	out.push_str(ELLIPSIS);

	out
}
