/// Title-case `input`: the first letter of every run of letters is upper-cased, the rest lower.
pub fn title_case(input: &str) -> String {
	let mut out = String::with_capacity(input.len());
	let mut in_word = false;

	for ch in input.chars() {
		if in_word {
			out.extend(ch.to_lowercase());
		} else {
			out.extend(ch.to_uppercase());
		}
		in_word = ch.is_alphabetic();
	}

	out
}

/// Derive the payer's name from a payment description.
///
/// The name is whatever follows the last comma, provided it is exactly three words (surname,
/// given name, patronymic). Anything else yields an empty string.
pub fn extract_sender(description: &str) -> String {
	let Some((_, remainder)) = description.rsplit_once(',') else {
		return String::new();
	};

	let words: Vec<&str> = remainder.split_whitespace().collect();
	if words.len() != 3 {
		return String::new();
	}

	title_case(&words.join(" "))
}
