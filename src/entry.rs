use std::fmt;
use crate::endian::Endianness;
use crate::format::MagicFormatter;
use crate::types::{MagicType, TestValue};

/// Name given to rules without a usable format string.
pub const UNKNOWN_NAME: &str = "unknown";

/// Where a rule reads its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Offset {
	/// Fixed offset into the content.
	Direct(i32),
	/// Offset read from the content itself.
	Indirect(OffsetInfo),
}

/// An indirect offset, `(x[.[bsilBSILm]][+-]y)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetInfo {
	/// Where the offset value is read.
	pub base: i32,
	pub endian: Endianness,
	/// ID3 synchsafe value (`i`/`I`).
	pub id3: bool,
	/// 1, 2 or 4.
	pub size: u8,
	/// Added to the value read at `base`.
	pub add: i32,
}

impl OffsetInfo {
	/// Resolve against `content`. `None` when the value lies outside it.
	pub fn read_offset(&self, content: &[u8]) -> Option<i64> {
		if self.base < 0 {
			return None;
		}
		let start = self.base as usize;
		let bytes = content.get(start..start.checked_add(self.size as usize)?)?;
		let raw = if self.id3 {
			self.endian.convert_id3(bytes)?
		} else {
			self.endian.convert(bytes)?
		};
		Some(raw as i64 + i64::from(self.add))
	}

	/// The type letter of `(x.l+y)`.
	pub fn type_letter(&self) -> char {
		match (self.size, self.endian, self.id3) {
			(1, Endianness::Big, _) => 'B',
			(1, _, _) => 'b',
			(2, Endianness::Big, _) => 'S',
			(2, _, _) => 's',
			(_, Endianness::Big, true) => 'I',
			(_, _, true) => 'i',
			(_, Endianness::Big, false) => 'L',
			(_, Endianness::Middle, false) => 'm',
			_ => 'l',
		}
	}
}

/// Written back in magic(5) syntax, `(0x3c.l+4)`.
impl fmt::Display for OffsetInfo {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		if self.base < 0 {
			write!(f, "({}.{}", self.base, self.type_letter())?;
		} else {
			write!(f, "({:#x}.{}", self.base, self.type_letter())?;
		}
		if self.add != 0 {
			write!(f, "{:+}", self.add)?;
		}
		f.write_str(")")
	}
}

/// One compiled magic line.
#[derive(Debug, Clone)]
pub struct MagicEntry {
	pub(crate) name: String,
	pub(crate) level: u32,
	pub(crate) add_offset: bool,
	pub(crate) offset: Offset,
	pub(crate) magic_type: MagicType,
	pub(crate) and_value: Option<i64>,
	pub(crate) unsigned_type: bool,
	pub(crate) test_value: Option<TestValue>,
	pub(crate) format_space_prefix: bool,
	pub(crate) clear_format: bool,
	pub(crate) formatter: Option<MagicFormatter>,
	pub(crate) mime_type: Option<String>,
	pub(crate) extensions: Vec<String>,
	pub(crate) apple: Option<String>,
}

impl MagicEntry {
	/// First word of the format string, or `"unknown"`.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Nesting depth; 0 for a top-level test.
	pub fn level(&self) -> u32 {
		self.level
	}

	/// The offset is relative to the end of the parent's match (`&`).
	pub fn add_offset(&self) -> bool {
		self.add_offset
	}

	pub fn offset(&self) -> &Offset {
		&self.offset
	}

	pub fn magic_type(&self) -> &MagicType {
		&self.magic_type
	}

	/// Mask applied to the value read, before the signedness and the test.
	pub fn and_value(&self) -> Option<i64> {
		self.and_value
	}

	pub fn unsigned_type(&self) -> bool {
		self.unsigned_type
	}

	/// `None` for the `x` wildcard, which always matches.
	pub fn test_value(&self) -> Option<&TestValue> {
		self.test_value.as_ref()
	}

	/// Put a space between this rule's output and the previous one.
	pub fn format_space_prefix(&self) -> bool {
		self.format_space_prefix
	}

	/// Replace rather than append to the output so far.
	pub fn clear_format(&self) -> bool {
		self.clear_format
	}

	pub fn formatter(&self) -> Option<&MagicFormatter> {
		self.formatter.as_ref()
	}

	pub fn mime_type(&self) -> Option<&str> {
		self.mime_type.as_deref()
	}

	/// The attached MIME type, if it is well formed.
	pub fn mime(&self) -> Option<mime::Mime> {
		self.mime_type.as_ref()?.parse().ok()
	}

	pub fn set_mime_type(&mut self, mime_type: &str) {
		self.mime_type = Some(mime_type.to_string());
	}

	/// File extensions from `!:ext`.
	pub fn extensions(&self) -> &[String] {
		&self.extensions
	}

	/// Apple creator/type code from `!:apple`.
	pub fn apple(&self) -> Option<&str> {
		self.apple.as_deref()
	}
}

impl fmt::Display for MagicEntry {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "level {},name '{}'", self.level, self.name)?;
		if let Some(ref test) = self.test_value {
			write!(f, ",test '{}'", test)?;
		}
		if let Some(ref format) = self.formatter {
			write!(f, ",format '{}'", format)?;
		}
		Ok(())
	}
}
