//! Test values of the string-like types and their `/` modifiers.

use std::fmt;
use regex::bytes::{Regex, RegexBuilder};
use crate::error::ConvertError;

/// Text as bytes: chars up to `U+00FF` are the bytes the escapes produced,
/// anything above is UTF-8.
pub fn to_bytes(text: &str) -> Vec<u8> {
	let mut out = Vec::with_capacity(text.len());
	for c in text.chars() {
		if (c as u32) <= 0xff {
			out.push(c as u32 as u8);
		} else {
			let mut buf = [0; 4];
			out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
		}
	}
	out
}

/// Inverse of `to_bytes` for display.
fn from_bytes(bytes: &[u8]) -> String {
	bytes.iter().map(|&b| char::from(b)).collect()
}

/// One `/`-separated modifier group: leading digits, then flag letters.
struct Modifiers<'a> {
	digits: &'a str,
	flags: &'a str,
}

impl<'a> Modifiers<'a> {
	/// The leading number, if the group has one.
	fn range(&self, kind: &'static str) -> Result<Option<usize>, ConvertError> {
		if self.digits.is_empty() {
			return Ok(None);
		}
		let range = self.digits.parse().map_err(|source| ConvertError::Range {
			kind,
			text: self.digits.to_string(),
			source,
		})?;
		Ok(Some(range))
	}
}

/// Everything after the type name, group by group.
fn modifier_groups(type_str: &str) -> impl Iterator<Item = Modifiers<'_>> {
	type_str.split('/').skip(1).map(|group| {
		let split = group.find(|c: char| !c.is_ascii_digit()).unwrap_or_else(|| group.len());
		let (digits, flags) = group.split_at(split);
		Modifiers { digits, flags }
	})
}

/// Flags of `string` and `search` (`string/cW`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StringFlags {
	/// `W`: whitespace in the pattern matches one or more in the content
	pub compact_whitespace: bool,
	/// `w`: whitespace in the pattern is optional
	pub optional_whitespace: bool,
	/// `c`: lower case in the pattern matches either case
	pub case_insensitive_lower: bool,
	/// `C`: upper case in the pattern matches either case
	pub case_insensitive_upper: bool,
	/// `t`: text test
	pub text: bool,
	/// `b`: binary test
	pub binary: bool,
	/// `T`: trim the matched string
	pub trim: bool,
	/// `f`: must match a full word
	pub full_word: bool,
}

impl StringFlags {
	fn set(&mut self, flag: char) -> bool {
		match flag {
			'W' => self.compact_whitespace = true,
			'w' => self.optional_whitespace = true,
			'c' => self.case_insensitive_lower = true,
			'C' => self.case_insensitive_upper = true,
			't' => self.text = true,
			'b' => self.binary = true,
			'T' => self.trim = true,
			'f' => self.full_word = true,
			_ => return false,
		}
		true
	}
}

/// Width and byte order of a `pstring` length prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PStringLength {
	/// `B`, the default
	Byte,
	/// `H`
	BigShort,
	/// `h`
	LittleShort,
	/// `L`
	BigLong,
	/// `l`
	LittleLong,
}

impl Default for PStringLength {
	fn default() -> Self {
		PStringLength::Byte
	}
}

/// A literal byte pattern for `string`, `search`, `pstring` and the
/// 16-bit strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringTest {
	pub pattern: Vec<u8>,
	pub flags: StringFlags,
	/// `search` only: how many bytes to scan.
	pub range: Option<usize>,
	/// `pstring` only.
	pub length: PStringLength,
	/// `pstring/J`: the length prefix counts itself.
	pub length_includes_prefix: bool,
}

impl StringTest {
	fn literal(text: &str) -> StringTest {
		StringTest {
			pattern: to_bytes(text),
			flags: StringFlags::default(),
			range: None,
			length: PStringLength::default(),
			length_includes_prefix: false,
		}
	}

	/// `string` and `search`; only `search` takes a range.
	pub fn parse(type_str: &str, text: &str, search: bool) -> Result<StringTest, ConvertError> {
		let kind = if search { "search" } else { "string" };
		let mut test = StringTest::literal(text);
		for group in modifier_groups(type_str) {
			if let Some(range) = group.range(kind)? {
				if !search {
					return Err(ConvertError::Modifier { kind, flag: first_char(type_str, '/') });
				}
				test.range = Some(range);
			}
			for flag in group.flags.chars() {
				if !test.flags.set(flag) {
					return Err(ConvertError::Modifier { kind, flag });
				}
			}
		}
		Ok(test)
	}

	/// `pstring/H`, `pstring/lJ`.
	pub fn parse_pstring(type_str: &str, text: &str) -> Result<StringTest, ConvertError> {
		let mut test = StringTest::literal(text);
		for group in modifier_groups(type_str) {
			if !group.digits.is_empty() {
				return Err(ConvertError::Modifier { kind: "pstring", flag: first_char(type_str, '/') });
			}
			for flag in group.flags.chars() {
				match flag {
					'B' => test.length = PStringLength::Byte,
					'H' => test.length = PStringLength::BigShort,
					'h' => test.length = PStringLength::LittleShort,
					'L' => test.length = PStringLength::BigLong,
					'l' => test.length = PStringLength::LittleLong,
					'J' => test.length_includes_prefix = true,
					_ => return Err(ConvertError::Modifier { kind: "pstring", flag }),
				}
			}
		}
		Ok(test)
	}

	/// `bestring16`/`lestring16`, which take no modifiers.
	pub fn parse_plain(text: &str) -> StringTest {
		StringTest::literal(text)
	}
}

/// First char after `sep` in `s`, for reporting a misplaced number.
fn first_char(s: &str, sep: char) -> char {
	s.split(sep).nth(1).and_then(|g| g.chars().next()).unwrap_or(sep)
}

impl fmt::Display for StringTest {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str(&from_bytes(&self.pattern))
	}
}

/// Flags of `regex` (`regex/20lc`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegexFlags {
	/// `c`
	pub case_insensitive: bool,
	/// `s`: the match offset is the start, not the end, of the match
	pub start_offset: bool,
	/// `l`: the count is in lines, not bytes
	pub lines: bool,
}

/// A compiled `regex` test.
#[derive(Debug, Clone)]
pub struct RegexTest {
	pub regex: Regex,
	pub flags: RegexFlags,
	/// How many bytes (or lines) to scan.
	pub count: Option<usize>,
	source: String,
}

impl RegexTest {
	pub fn parse(type_str: &str, text: &str) -> Result<RegexTest, ConvertError> {
		let mut flags = RegexFlags::default();
		let mut count = None;
		for group in modifier_groups(type_str) {
			if let Some(n) = group.range("regex")? {
				count = Some(n);
			}
			for flag in group.flags.chars() {
				match flag {
					'c' => flags.case_insensitive = true,
					's' => flags.start_offset = true,
					'l' => flags.lines = true,
					_ => return Err(ConvertError::Modifier { kind: "regex", flag }),
				}
			}
		}

		let regex = RegexBuilder::new(&byte_pattern(text))
			.unicode(false)
			.case_insensitive(flags.case_insensitive)
			.multi_line(true)
			.build()?;

		Ok(RegexTest {
			regex,
			flags,
			count,
			source: text.to_string(),
		})
	}

	/// The pattern as written.
	pub fn as_str(&self) -> &str {
		&self.source
	}
}

/// Rewrite non-ASCII chars as `\xHH` so they match raw bytes. A byte
/// already behind an unescaped backslash only gets the `xHH`.
fn byte_pattern(text: &str) -> String {
	let mut out = String::with_capacity(text.len());
	let mut escaped = false;
	for b in to_bytes(text) {
		if b.is_ascii() {
			out.push(char::from(b));
			escaped = b == b'\\' && !escaped;
		} else {
			let prefix = if escaped { "" } else { "\\" };
			out.push_str(&format!("{}x{:02x}", prefix, b));
			escaped = false;
		}
	}
	out
}

impl fmt::Display for RegexTest {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str(&self.source)
	}
}
