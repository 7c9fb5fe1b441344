use crate::config::types::Rule;
use crate::error::{Result, SpliceError};
use crate::rules::compiler::CompiledRule;

/// Parse a sed-like substitution, "s/pattern/replacement/flags", into a rule.
///
/// Any character after `s` is the delimiter; `\<delim>` escapes it. Flags:
/// `g` replaces every match (otherwise only the first), `s` lets `.` match
/// newlines, `i` ignores case, `m` makes `^`/`$` match at line boundaries.
/// Capture references like `$1` expand in the replacement.
pub fn parse_substitution(input: &str) -> Result<CompiledRule> {
	let invalid = |reason: &str| SpliceError::InvalidSubstitution {
		input: input.to_string(),
		reason: reason.to_string(),
	};

	let mut chars = input.chars();
	if chars.next() != Some('s') {
		return Err(invalid("must start with 's'"));
	}

	let delimiter = chars.next().ok_or_else(|| invalid("too short"))?;
	if delimiter.is_alphanumeric() || delimiter == '\\' || delimiter.is_whitespace() {
		return Err(invalid("delimiter must be punctuation"));
	}

	let parts = split_by_delimiter(chars.as_str(), delimiter);

	if parts.len() < 2 {
		return Err(invalid("must have pattern and replacement"));
	}
	if parts.len() > 3 {
		return Err(invalid("unescaped delimiter after flags"));
	}

	let flags = parts.get(2).map(String::as_str).unwrap_or("");
	let mut rule = Rule {
		description: Some(input.to_string()),
		pattern: Some(parts[0].clone()),
		replacement: parts[1].clone(),
		template: true,
		count: Some(1),
		..Default::default()
	};

	for flag in flags.chars() {
		match flag {
			'g' => rule.count = None,
			's' => rule.dot_all = true,
			'i' => rule.case_insensitive = true,
			'm' => rule.multi_line = true,
			other => return Err(invalid(&format!("unknown flag '{other}'"))),
		}
	}

	CompiledRule::from_rule(&rule)
}

/// Split a string by a delimiter, respecting backslash escapes.
fn split_by_delimiter(input: &str, delimiter: char) -> Vec<String> {
	let mut parts = Vec::new();
	let mut current = String::new();
	let mut chars = input.chars().peekable();
	let mut escape_next = false;

	while let Some(c) = chars.next() {
		if escape_next {
			current.push(c);
			escape_next = false;
		} else if c == '\\' {
			// Only an escaped delimiter loses its backslash
			if chars.peek() == Some(&delimiter) {
				escape_next = true;
			} else {
				current.push(c);
			}
		} else if c == delimiter {
			parts.push(current);
			current = String::new();
		} else {
			current.push(c);
		}
	}

	parts.push(current);

	parts
}
