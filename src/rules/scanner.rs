//! Delimiter scanning over raw source text.
//!
//! Field-lists may contain nested braces, string literals, and line breaks, so
//! the rules never use a regex to find where one ends. Instead they anchor on
//! the opening delimiter and count depth until it balances.

/// Find the byte index of the delimiter that closes the one at `open_idx`.
///
/// `text[open_idx]` must be `open`. String literals, char literals, and
/// comments are skipped so a brace inside `"{"`, `'}'`, or `// }` does not
/// affect depth. Returns `None` if the text ends before the delimiter balances.
pub fn find_closing(text: &str, open_idx: usize, open: u8, close: u8) -> Option<usize> {
	let bytes = text.as_bytes();
	if bytes.get(open_idx) != Some(&open) {
		return None;
	}

	let mut depth = 0usize;
	let mut i = open_idx;
	while i < bytes.len() {
		let b = bytes[i];
		if b == b'"' {
			i = skip_string(bytes, i)?;
			continue;
		}
		if b == b'\'' {
			i = skip_char_literal(bytes, i);
			continue;
		}
		if b == b'/' {
			match bytes.get(i + 1) {
				Some(b'/') => {
					i = skip_line_comment(bytes, i);
					continue;
				}
				Some(b'*') => {
					i = skip_block_comment(bytes, i)?;
					continue;
				}
				_ => {}
			}
		}
		if b == open {
			depth += 1;
		} else if b == close {
			depth -= 1;
			if depth == 0 {
				return Some(i);
			}
		}
		i += 1;
	}

	None
}

/// Return the index just past the closing quote of the string starting at `start`.
fn skip_string(bytes: &[u8], start: usize) -> Option<usize> {
	let mut i = start + 1;
	while i < bytes.len() {
		match bytes[i] {
			b'\\' => i += 2,
			b'"' => return Some(i + 1),
			_ => i += 1,
		}
	}
	None
}

/// Return the index of the newline ending the `//` comment at `start`.
fn skip_line_comment(bytes: &[u8], start: usize) -> usize {
	bytes[start..]
		.iter()
		.position(|&b| b == b'\n')
		.map_or(bytes.len(), |p| start + p)
}

/// Return the index just past the `*/` closing the block comment at `start`.
///
/// Block comments nest, as in Rust.
fn skip_block_comment(bytes: &[u8], start: usize) -> Option<usize> {
	let mut depth = 0usize;
	let mut i = start;
	while i + 1 < bytes.len() {
		match (bytes[i], bytes[i + 1]) {
			(b'/', b'*') => {
				depth += 1;
				i += 2;
			}
			(b'*', b'/') => {
				depth -= 1;
				i += 2;
				if depth == 0 {
					return Some(i);
				}
			}
			_ => i += 1,
		}
	}
	None
}

/// Skip a char literal like `'x'` or `'\n'`.
///
/// Lifetimes (`'a`) share the opening quote, so anything that does not close
/// within a few bytes is treated as a lone quote and stepped over.
fn skip_char_literal(bytes: &[u8], start: usize) -> usize {
	let rest = &bytes[start + 1..];
	let end = match rest {
		[b'\\', _, ..] => rest.iter().skip(2).take(8).position(|&b| b == b'\'').map(|p| p + 2),
		[_, b'\'', ..] => Some(1),
		_ => None,
	};
	match end {
		Some(offset) => start + 1 + offset + 1,
		None => start + 1,
	}
}

/// Index of the first byte at or after `idx` that is not whitespace.
pub fn skip_ws(text: &str, idx: usize) -> usize {
	let bytes = text.as_bytes();
	let mut i = idx;
	while i < bytes.len() && bytes[i].is_ascii_whitespace() {
		i += 1;
	}
	i
}

/// Like [`skip_ws`] but never crosses a line break.
pub fn skip_inline_ws(text: &str, idx: usize) -> usize {
	let bytes = text.as_bytes();
	let mut i = idx;
	while i < bytes.len() && matches!(bytes[i], b' ' | b'\t') {
		i += 1;
	}
	i
}

/// Match `tail` starting at `idx`, allowing spaces and tabs between its characters.
///
/// Returns the index just past the last matched character.
pub fn match_tail(text: &str, idx: usize, tail: &str) -> Option<usize> {
	let bytes = text.as_bytes();
	let mut i = idx;
	for (n, expected) in tail.bytes().enumerate() {
		if n > 0 {
			i = skip_inline_ws(text, i);
		}
		if bytes.get(i) != Some(&expected) {
			return None;
		}
		i += 1;
	}
	Some(i)
}

/// Read an identifier (`[A-Za-z0-9_]+`) starting at `idx`.
pub fn read_ident(text: &str, idx: usize) -> Option<(&str, usize)> {
	let bytes = text.as_bytes();
	let mut end = idx;
	while end < bytes.len() && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'_') {
		end += 1;
	}
	if end == idx {
		None
	} else {
		Some((&text[idx..end], end))
	}
}

/// Leading whitespace of the line containing byte `idx`.
pub fn line_indent(text: &str, idx: usize) -> &str {
	let line_start = text[..idx].rfind('\n').map_or(0, |i| i + 1);
	let line = &text[line_start..];
	let width = line.len() - line.trim_start_matches([' ', '\t']).len();
	&line[..width]
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_find_closing_flat() {
		let text = "X { a: 1 })";
		assert_eq!(find_closing(text, 2, b'{', b'}'), Some(9));
	}

	#[test]
	fn test_find_closing_nested() {
		let text = "{ a: Foo { b: 1 }, c }";
		assert_eq!(find_closing(text, 0, b'{', b'}'), Some(text.len() - 1));
	}

	#[test]
	fn test_find_closing_skips_string_literals() {
		let text = r#"{ name: "}{", c: '}' }"#;
		assert_eq!(find_closing(text, 0, b'{', b'}'), Some(text.len() - 1));
	}

	#[test]
	fn test_find_closing_escaped_quote_in_string() {
		let text = r#"{ s: "a\"}" }"#;
		assert_eq!(find_closing(text, 0, b'{', b'}'), Some(text.len() - 1));
	}

	#[test]
	fn test_find_closing_lifetime_is_not_a_char_literal() {
		let text = "{ r: &'a str }";
		assert_eq!(find_closing(text, 0, b'{', b'}'), Some(text.len() - 1));
	}

	#[test]
	fn test_find_closing_multiline() {
		let text = "{\n    channel: 0,\n    tone,\n}";
		assert_eq!(find_closing(text, 0, b'{', b'}'), Some(text.len() - 1));
	}

	#[test]
	fn test_find_closing_unbalanced() {
		assert_eq!(find_closing("{ a: { b }", 0, b'{', b'}'), None);
	}

	#[test]
	fn test_find_closing_skips_line_comments() {
		assert_eq!(find_closing("{ a: 1, // }\n b }", 0, b'{', b'}'), Some(16));
		assert_eq!(find_closing("{ // it's \"\n }", 0, b'{', b'}'), Some(13));
	}

	#[test]
	fn test_find_closing_skips_block_comments() {
		assert_eq!(find_closing("{ /* } */ x }", 0, b'{', b'}'), Some(12));
		assert_eq!(find_closing("{ /* /* } */ } */ }", 0, b'{', b'}'), Some(18));
		assert_eq!(find_closing("{ /* }", 0, b'{', b'}'), None);
	}

	#[test]
	fn test_find_closing_division_is_not_a_comment() {
		assert_eq!(find_closing("{ a / b }", 0, b'{', b'}'), Some(8));
	}

	#[test]
	fn test_find_closing_wrong_start() {
		assert_eq!(find_closing("a { }", 0, b'{', b'}'), None);
	}

	#[test]
	fn test_match_tail_allows_inline_whitespace() {
		assert_eq!(match_tail("}) );", 1, "));"), Some(5));
		assert_eq!(match_tail("}));", 1, "));"), Some(4));
		assert_eq!(match_tail("})\n);", 1, "));"), None);
		assert_eq!(match_tail("}]);", 1, "));"), None);
	}

	#[test]
	fn test_read_ident() {
		assert_eq!(read_ident("event {", 0), Some(("event", 5)));
		assert_eq!(read_ident(" event", 0), None);
	}

	#[test]
	fn test_line_indent() {
		let text = "fn a() {\n        if let x\n}";
		let idx = text.find("if").unwrap();
		assert_eq!(line_indent(text, idx), "        ");
		assert_eq!(line_indent(text, 0), "");
	}
}
