//! Compiles one line of a magic(5) file into a `MagicEntry`.
//!
//! ```text
//! 0	string	%PDF-	PDF document
//! !:mime	application/pdf
//! >5	byte	x	\b, version %c
//! >7	byte	x	\b.%c
//! ```
//!
//! A rule line is `[>...][&]offset type test [format]`. Lines starting
//! with `!:` attach extra data to the rule before them.

use crate::callback::ErrorCallback;
use crate::entry::{MagicEntry, Offset, UNKNOWN_NAME};
use crate::error::ParseError;
use crate::format::MagicFormatter;
use crate::types::{Builtin, MagicType, TestValue, TypeRegistry};

pub mod number;
pub mod offset;
pub mod split;

pub use self::split::split_line;

const CONTINUATION: &str = "!:";
const MIME_TYPE_LINE: &str = "!:mime";
const EXT_LINE: &str = "!:ext";
const APPLE_LINE: &str = "!:apple";

/// Test string that matches anything.
const WILDCARD: &str = "x";

/// What a `!:` line attaches to the rule before it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extension {
	/// `!:mime application/pdf`
	Mime(String),
	/// `!:ext jpeg/jpg/jpe`
	Ext(Vec<String>),
	/// `!:apple 8BIMTIFF`
	Apple(String),
	/// Any other key. Ignored.
	Unknown(String),
}

impl Extension {
	pub fn apply(self, entry: &mut MagicEntry) {
		match self {
			Extension::Mime(mime) => entry.mime_type = Some(mime),
			Extension::Ext(exts) => entry.extensions.extend(exts),
			Extension::Apple(code) => entry.apple = Some(code),
			Extension::Unknown(key) => tracing::trace!(key = %key, "ignoring unknown extension"),
		}
	}
}

/// The result of compiling one line.
#[derive(Debug, Clone)]
pub enum Line {
	Entry(MagicEntry),
	Extension(Extension),
}

/// Compile `line`, taking the previous entry for `!:` lines.
///
/// Returns the new entry, or `None` if the line was a continuation line or
/// could not be compiled. Failures go to `callback`; a continuation line
/// with no previous entry is dropped silently.
pub fn parse_line(
	previous: Option<&mut MagicEntry>,
	line: &str,
	callback: &mut dyn ErrorCallback,
) -> Option<MagicEntry> {
	parse_line_with(&Builtin, previous, line, callback)
}

/// `parse_line` against a custom set of types.
pub fn parse_line_with<R: TypeRegistry + ?Sized>(
	registry: &R,
	previous: Option<&mut MagicEntry>,
	line: &str,
	callback: &mut dyn ErrorCallback,
) -> Option<MagicEntry> {
	if line.starts_with(CONTINUATION) && previous.is_none() {
		tracing::trace!(line, "no entry to extend");
		return None;
	}

	match compile_line(registry, line) {
		Ok(Line::Entry(entry)) => Some(entry),
		Ok(Line::Extension(ext)) => {
			if let Some(prev) = previous {
				ext.apply(prev);
			}
			None
		}
		Err(err) => {
			callback.error(line, &err);
			None
		}
	}
}

/// Compile `line` without touching any other entry.
pub fn compile_line<R: TypeRegistry + ?Sized>(registry: &R, line: &str) -> Result<Line, ParseError> {
	if line.starts_with(CONTINUATION) {
		return parse_extension(line).map(Line::Extension);
	}

	let parts = split_line(line, 4);
	if parts.len() < 3 {
		return Err(ParseError::FieldCount);
	}

	let (level, add_offset, offset) = parse_level_offset(&parts[0])?;
	let (type_str, and_value) = split_and_value(&parts[1])?;
	let (magic_type, unsigned_type) = resolve_type(registry, type_str)?;
	let test_value = parse_test_value(&magic_type, type_str, &parts[2])?;

	let mut entry = MagicEntry {
		name: UNKNOWN_NAME.to_string(),
		level,
		add_offset,
		offset,
		magic_type,
		and_value,
		unsigned_type,
		test_value,
		format_space_prefix: true,
		clear_format: false,
		formatter: None,
		mime_type: None,
		extensions: Vec::new(),
		apple: None,
	};

	if let Some(format) = parts.get(3) {
		// A leading \b means no space when chaining onto the previous
		// output, a leading \r means start the output over.
		let format = if let Some(rest) = format.strip_prefix('\u{8}') {
			entry.format_space_prefix = false;
			rest
		} else if let Some(rest) = format.strip_prefix('\r') {
			entry.clear_format = true;
			rest
		} else {
			format.as_str()
		};
		entry.name = format_name(format).to_string();
		entry.formatter = Some(MagicFormatter::new(format));
	}

	Ok(Line::Entry(entry))
}

fn parse_extension(line: &str) -> Result<Extension, ParseError> {
	let parts = split_line(line, 3);
	if parts.len() < 2 {
		return Err(ParseError::ExtensionFields);
	}

	let value = parts[1].clone();
	let ext = match parts[0].as_str() {
		MIME_TYPE_LINE => Extension::Mime(value),
		EXT_LINE => Extension::Ext(
			value
				.split('/')
				.filter(|e| !e.is_empty())
				.map(String::from)
				.collect(),
		),
		APPLE_LINE => Extension::Apple(value),
		key => Extension::Unknown(key.to_string()),
	};
	Ok(ext)
}

/// `>>&(4.l+2)` into level 2, relative, indirect.
fn parse_level_offset(field: &str) -> Result<(u32, bool, Offset), ParseError> {
	let (level, offset_str) = match field.rfind('>') {
		Some(i) => (field[..i].chars().count() as u32 + 1, &field[i + 1..]),
		None => (0, field),
	};

	let (add_offset, offset_str) = match offset_str.strip_prefix('&') {
		Some(rest) => (true, rest),
		None => (false, offset_str),
	};
	if offset_str.is_empty() {
		return Err(ParseError::EmptyOffset(offset_str.to_string()));
	}

	let offset = if offset_str.starts_with('(') {
		Offset::Indirect(offset::parse_offset(offset_str)?)
	} else {
		let off = number::decode_int(offset_str).map_err(|source| ParseError::Offset {
			text: offset_str.to_string(),
			source,
		})?;
		Offset::Direct(off)
	};

	Ok((level, add_offset, offset))
}

/// `belong&0xfffffffe` into `belong` and the mask.
fn split_and_value(field: &str) -> Result<(&str, Option<i64>), ParseError> {
	let (type_str, and_value) = match field.find('&') {
		Some(i) => {
			let mask = &field[i + 1..];
			let value = number::decode_long(mask).map_err(|source| ParseError::AndMask {
				text: mask.to_string(),
				source,
			})?;
			(&field[..i], Some(value))
		}
		None => (field, None),
	};

	if type_str.is_empty() {
		return Err(ParseError::BlankType);
	}
	Ok((type_str, and_value))
}

/// Look up `type_str`, falling back to an unsigned `u` prefix or a
/// `/modifier` suffix.
fn resolve_type<R: TypeRegistry + ?Sized>(registry: &R, type_str: &str) -> Result<(MagicType, bool), ParseError> {
	if let Some(t) = registry.resolve(type_str) {
		return Ok((t, false));
	}

	let retry = if let Some(signed) = type_str.strip_prefix('u') {
		registry.resolve(signed).map(|t| (t, true))
	} else {
		match type_str.find('/') {
			Some(i) if i > 0 => registry.resolve(&type_str[..i]).map(|t| (t, false)),
			_ => None,
		}
	};

	retry.ok_or_else(|| ParseError::UnknownType(type_str.to_string()))
}

fn parse_test_value(magic_type: &MagicType, type_str: &str, test_str: &str) -> Result<Option<TestValue>, ParseError> {
	if test_str == WILDCARD {
		return Ok(None);
	}
	magic_type
		.convert_test_string(type_str, test_str)
		.map(Some)
		.map_err(|source| ParseError::TestValue {
			text: test_str.to_string(),
			source,
		})
}

/// First word of the trimmed format, or `"unknown"` when there is none.
fn format_name(format: &str) -> &str {
	// trim control chars too, a stray \b is not a name
	let trimmed = format.trim_matches(|c: char| c <= ' ');
	if trimmed.is_empty() {
		return UNKNOWN_NAME;
	}
	match trimmed.find(|c: char| c == ' ' || c == '\t') {
		Some(i) => &trimmed[..i],
		None => trimmed,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::endian::Endianness;
	use crate::entry::OffsetInfo;

	fn entry(line: &str) -> MagicEntry {
		match compile_line(&Builtin, line) {
			Ok(Line::Entry(e)) => e,
			other => panic!("{:?} from {:?}", other, line),
		}
	}

	#[test]
	fn levels() {
		assert_eq!(entry("0 byte 1").level(), 0);
		assert_eq!(entry(">0 byte 1").level(), 1);
		assert_eq!(entry(">>>8 byte 1").level(), 3);
	}

	#[test]
	fn offsets() {
		assert_eq!(*entry("0x10 byte 1").offset(), Offset::Direct(16));
		assert_eq!(*entry("010 byte 1").offset(), Offset::Direct(8));
		assert_eq!(*entry("-4 byte 1").offset(), Offset::Direct(-4));

		let e = entry(">&2 byte 1");
		assert!(e.add_offset());
		assert_eq!(*e.offset(), Offset::Direct(2));

		let e = entry(">>&(4.S-2) byte 1");
		assert_eq!(e.level(), 2);
		assert!(e.add_offset());
		assert_eq!(
			*e.offset(),
			Offset::Indirect(OffsetInfo { base: 4, endian: Endianness::Big, id3: false, size: 2, add: -2 })
		);
	}

	#[test]
	fn offset_errors() {
		assert!(matches!(compile_line(&Builtin, "0"), Err(ParseError::FieldCount)));
		assert!(matches!(compile_line(&Builtin, ">\tbyte 1"), Err(ParseError::EmptyOffset(_))));
		assert!(matches!(compile_line(&Builtin, "> byte 1 x y"), Err(ParseError::EmptyOffset(_))));
		assert!(matches!(compile_line(&Builtin, ">& byte 1"), Err(ParseError::EmptyOffset(_))));
		assert!(matches!(compile_line(&Builtin, ">a byte 1"), Err(ParseError::Offset { .. })));
		assert!(matches!(compile_line(&Builtin, "(8.s*16) byte 1"), Err(ParseError::OffsetPattern(_))));
	}

	#[test]
	fn masks_and_signedness() {
		let e = entry("0 belong&0xfffffffe 0xcafebabe");
		assert_eq!(e.and_value(), Some(0xffff_fffe));
		assert_eq!(e.magic_type().name(), "belong");
		assert!(!e.unsigned_type());

		let e = entry("0 ulelong 1");
		assert!(e.unsigned_type());
		assert_eq!(e.magic_type().name(), "lelong");

		let e = entry("0 string/cW hello");
		assert_eq!(e.magic_type().name(), "string");
		match e.test_value() {
			Some(TestValue::String(t)) => assert!(t.flags.case_insensitive_lower && t.flags.compact_whitespace),
			other => panic!("{:?}", other),
		}
	}

	#[test]
	fn type_errors() {
		assert!(matches!(compile_line(&Builtin, "0 short&a 1"), Err(ParseError::AndMask { .. })));
		assert!(matches!(compile_line(&Builtin, "0 &0 1"), Err(ParseError::BlankType)));
		assert!(matches!(compile_line(&Builtin, "0 unknowntype 1"), Err(ParseError::UnknownType(_))));
		assert!(matches!(compile_line(&Builtin, "0 /c 1"), Err(ParseError::UnknownType(_))));
		assert!(matches!(compile_line(&Builtin, "0 ustring/c 1"), Err(ParseError::UnknownType(_))));
	}

	#[test]
	fn wildcard_and_values() {
		assert!(entry("0 byte x").test_value().is_none());
		assert!(matches!(entry("0 byte =0x7f").test_value(), Some(TestValue::Integer(_))));
		assert!(matches!(
			compile_line(&Builtin, "0 byte =z format"),
			Err(ParseError::TestValue { .. })
		));
	}

	#[test]
	fn format_prefixes() {
		let e = entry(">6\tstring\t\tExif\t\t\u{8}, EXIF standard");
		assert!(!e.format_space_prefix());
		assert!(!e.clear_format());
		assert_eq!(e.name(), ",");
		assert_eq!(e.formatter().unwrap().to_string(), ", EXIF standard");

		let e = entry("0 byte 1 \\rreset here");
		assert!(e.format_space_prefix());
		assert!(e.clear_format());
		assert_eq!(e.name(), "reset");

		// only the first prefix counts
		let e = entry("0 byte 1 \\b\\rboth");
		assert!(!e.format_space_prefix());
		assert!(!e.clear_format());
		assert_eq!(e.formatter().unwrap().to_string(), "\rboth");
	}

	#[test]
	fn names() {
		assert_eq!(format_name("PDF document"), "PDF");
		assert_eq!(format_name("  GIF\timage data "), "GIF");
		assert_eq!(format_name("single"), "single");
		assert_eq!(format_name("   "), UNKNOWN_NAME);
		assert_eq!(format_name(""), UNKNOWN_NAME);
		assert_eq!(entry("0 byte 1").name(), UNKNOWN_NAME);
		assert!(entry("0 byte 1").formatter().is_none());
	}

	#[test]
	fn extensions() {
		assert_eq!(
			parse_extension("!:mime\tapplication/pdf").unwrap(),
			Extension::Mime("application/pdf".to_string())
		);
		assert_eq!(
			parse_extension("!:ext jpeg/jpg/jpe").unwrap(),
			Extension::Ext(vec!["jpeg".to_string(), "jpg".to_string(), "jpe".to_string()])
		);
		assert_eq!(parse_extension("!:apple 8BIMTIFF").unwrap(), Extension::Apple("8BIMTIFF".to_string()));
		assert_eq!(parse_extension("!:strength +10").unwrap(), Extension::Unknown("!:strength".to_string()));
		assert!(matches!(parse_extension("!:"), Err(ParseError::ExtensionFields)));
		assert!(matches!(parse_extension("!:mime   "), Err(ParseError::ExtensionFields)));
	}
}
