//! Whitespace field splitting with magic(5) backslash escapes.
//!
//! Escapes follow file(1)'s apprentice: `\n \r \t \b \a \f \v`, up to three
//! octal digits, `\x` plus up to two hex digits, and everything else
//! escapes to itself. Byte escapes become chars `U+0000..=U+00FF`.

/// Field separators. Non-breaking spaces and NEL are part of a field, the
/// ASCII information separators are not.
fn is_separator(c: char) -> bool {
	match c {
		'\u{1c}'..='\u{1f}' => true,
		'\u{a0}' | '\u{2007}' | '\u{202f}' | '\u{85}' => false,
		c => c.is_whitespace(),
	}
}

fn octal_digit(c: char) -> Option<u32> {
	match c {
		'0'..='7' => Some(c as u32 - '0' as u32),
		_ => None,
	}
}

/// Split `line` into at most `fields` fields.
///
/// Once `fields - 1` fields are out, the rest of the line (whitespace
/// included) lands in the last one. Fewer fields than asked for is not an
/// error here; callers check the length.
pub fn split_line(line: &str, fields: usize) -> Vec<String> {
	let mut parts = Vec::<String>::with_capacity(fields);
	let mut part = String::new();
	let mut chars = line.chars().peekable();

	while let Some(ch) = chars.next() {
		if is_separator(ch) {
			if parts.len() + 1 < fields {
				if !part.is_empty() {
					parts.push(std::mem::take(&mut part));
				}
			} else if !part.is_empty() {
				part.push(ch);
			}
			continue;
		}

		if ch != '\\' {
			part.push(ch);
			continue;
		}

		let esc = match chars.next() {
			Some(esc) => esc,
			// trailing backslash stays
			None => {
				part.push('\\');
				continue;
			}
		};

		match esc {
			'n' => part.push('\n'),
			'r' => part.push('\r'),
			't' => part.push('\t'),
			'b' => part.push('\u{8}'),
			'a' => part.push('\u{7}'),
			'f' => part.push('\u{c}'),
			'v' => part.push('\u{b}'),
			'0'..='7' => {
				let mut val = esc as u32 - '0' as u32;
				for _ in 0..2 {
					match chars.peek().and_then(|&c| octal_digit(c)) {
						Some(d) => {
							val = val * 8 + d;
							chars.next();
						}
						None => break,
					}
				}
				part.push(char::from((val & 0xff) as u8));
			}
			'x' => {
				let mut val = 0u32;
				let mut n = 0;
				while n < 2 {
					match chars.peek().and_then(|c| c.to_digit(16)) {
						Some(d) => {
							val = val * 16 + d;
							n += 1;
							chars.next();
						}
						None => break,
					}
				}
				if n > 0 {
					part.push(char::from(val as u8));
				} else {
					part.push('x');
				}
			}
			// `\ `, `\\`, `\>` and friends, plus anything unknown
			other => part.push(other),
		}
	}

	if !part.is_empty() {
		parts.push(part);
	}
	parts
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn plain_fields() {
		assert_eq!(split_line("1 2 3 4", 4), vec!["1", "2", "3", "4"]);
	}

	#[test]
	fn overflow_folds_into_last() {
		assert_eq!(split_line("1 2 3 4 5 6", 4), vec!["1", "2", "3", "4 5 6"]);
		assert_eq!(
			split_line(" 1  2  3  4  5  6 ", 4),
			vec!["1", "2", "3", "4  5  6 "]
		);
	}

	#[test]
	fn control_escapes() {
		let parts = split_line("1\\n 2\\t 3\\b 4\\\\", 4);
		assert_eq!(parts, vec!["1\n", "2\t", "3\u{8}", "4\\"]);
		assert_eq!(split_line("\\a\\f\\v\\r", 1), vec!["\u{7}\u{c}\u{b}\r"]);
	}

	#[test]
	fn byte_escapes() {
		let parts = split_line("1\\007 2\\377 3\\xff 4\\x00", 4);
		assert_eq!(parts, vec!["1\u{7}", "2\u{ff}", "3\u{ff}", "4\u{0}"]);
	}

	#[test]
	fn octal_stops_at_three_digits() {
		assert_eq!(split_line("\\1234", 1), vec!["S4"]);
		assert_eq!(split_line("\\08", 1), vec!["\u{0}8"]);
		// 0o777 masks to a byte
		assert_eq!(split_line("\\777", 1), vec!["\u{ff}"]);
	}

	#[test]
	fn hex_without_digits_is_x() {
		assert_eq!(split_line("\\xg", 1), vec!["xg"]);
		assert_eq!(split_line("\\x", 1), vec!["x"]);
		assert_eq!(split_line("\\x414", 1), vec!["A4"]);
	}

	#[test]
	fn escaped_whitespace_joins() {
		assert_eq!(split_line("1\\ 2\\t3", 4), vec!["1 2\t3"]);
	}

	#[test]
	fn literal_escapes_and_trailing_backslash() {
		assert_eq!(split_line("\\>\\<\\&\\^\\=\\!\\q", 1), vec!["><&^=!q"]);
		assert_eq!(split_line("ab\\", 1), vec!["ab\\"]);
	}

	#[test]
	fn short_lines() {
		assert!(split_line("", 4).is_empty());
		assert!(split_line("     ", 4).is_empty());
		assert_eq!(split_line("0\tstring\t\t\\<?xml\\ version=\"", 4), vec![
			"0",
			"string",
			"<?xml version=\"",
		]);
	}

	#[test]
	fn nbsp_is_not_a_separator() {
		assert_eq!(split_line("a\u{a0}b c", 4), vec!["a\u{a0}b", "c"]);
		assert_eq!(split_line("a\u{1f}b", 4), vec!["a", "b"]);
	}
}
