//! The magic(5) types and how each one reads its test string.
//!
//! The compiler only needs two things from a type: whether a name resolves
//! to one, and how that type turns the raw test string into a value.
//! Custom type sets plug in through `TypeRegistry`.

use std::fmt;
use fnv::FnvHashMap;
use crate::endian::Endianness;
use crate::error::ConvertError;

pub mod number;
pub mod string;

pub use self::number::{FloatTest, NumericTest, Operator};
pub use self::string::{PStringLength, RegexFlags, RegexTest, StringFlags, StringTest};

/// What a type reads from the content and how it compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
	/// `byte`, `short`, `long`, `quad` and their byte-ordered forms.
	Integer { size: u8, endian: Endianness },
	/// `beid3`, `leid3`.
	Id3(Endianness),
	/// Seconds since the epoch; `local` for the `ldate` forms.
	Date { size: u8, endian: Endianness, local: bool },
	Float { size: u8, endian: Endianness },
	String,
	PString,
	Search,
	String16(Endianness),
	Regex,
	Default,
	Clear,
	Name,
	Use,
	Indirect,
	Offset,
	Der,
	Guid,
}

/// A resolved type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MagicType {
	name: &'static str,
	kind: TypeKind,
}

impl MagicType {
	pub fn new(name: &'static str, kind: TypeKind) -> MagicType {
		MagicType { name, kind }
	}

	pub fn name(&self) -> &'static str {
		self.name
	}

	pub fn kind(&self) -> TypeKind {
		self.kind
	}

	/// Turn a raw test string into this type's value.
	///
	/// `type_str` is the full type field without its AND-mask, modifiers
	/// included (`string/cW`, `search/1024`, `ulelong`).
	pub fn convert_test_string(&self, type_str: &str, test_str: &str) -> Result<TestValue, ConvertError> {
		let value = match self.kind {
			TypeKind::Integer { .. } | TypeKind::Id3(_) | TypeKind::Date { .. } => {
				TestValue::Integer(NumericTest::parse(test_str)?)
			}
			TypeKind::Float { .. } => TestValue::Float(FloatTest::parse(test_str)?),
			TypeKind::String => TestValue::String(StringTest::parse(type_str, test_str, false)?),
			TypeKind::Search => TestValue::String(StringTest::parse(type_str, test_str, true)?),
			TypeKind::PString => TestValue::String(StringTest::parse_pstring(type_str, test_str)?),
			TypeKind::String16(_) => TestValue::String(StringTest::parse_plain(test_str)),
			TypeKind::Regex => TestValue::Regex(RegexTest::parse(type_str, test_str)?),
			TypeKind::Default
			| TypeKind::Clear
			| TypeKind::Name
			| TypeKind::Use
			| TypeKind::Indirect
			| TypeKind::Offset
			| TypeKind::Der
			| TypeKind::Guid => TestValue::Text(test_str.to_string()),
		};
		Ok(value)
	}
}

impl fmt::Display for MagicType {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str(self.name)
	}
}

/// A converted test string.
#[derive(Debug, Clone)]
pub enum TestValue {
	Integer(NumericTest),
	Float(FloatTest),
	String(StringTest),
	Regex(RegexTest),
	/// Kept verbatim: `name`, `use`, `default` and the like.
	Text(String),
}

impl fmt::Display for TestValue {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match *self {
			TestValue::Integer(ref t) => fmt::Display::fmt(t, f),
			TestValue::Float(ref t) => fmt::Display::fmt(t, f),
			TestValue::String(ref t) => fmt::Display::fmt(t, f),
			TestValue::Regex(ref t) => fmt::Display::fmt(t, f),
			TestValue::Text(ref t) => f.write_str(t),
		}
	}
}

/// Looks up magic type names.
pub trait TypeRegistry {
	fn resolve(&self, name: &str) -> Option<MagicType>;
}

/// The magic(5) types.
#[derive(Debug, Clone, Copy, Default)]
pub struct Builtin;

impl TypeRegistry for Builtin {
	fn resolve(&self, name: &str) -> Option<MagicType> {
		TYPES.get_key_value(name).map(|(&name, &kind)| MagicType::new(name, kind))
	}
}

fn int(size: u8, endian: Endianness) -> TypeKind {
	TypeKind::Integer { size, endian }
}

fn date(size: u8, endian: Endianness, local: bool) -> TypeKind {
	TypeKind::Date { size, endian, local }
}

fn float(size: u8, endian: Endianness) -> TypeKind {
	TypeKind::Float { size, endian }
}

lazy_static! {
	static ref TYPES: FnvHashMap<&'static str, TypeKind> = {
		use crate::endian::Endianness::*;
		let native = Endianness::native();

		let table: &[(&'static str, TypeKind)] = &[
			("byte", int(1, native)),
			("short", int(2, native)),
			("long", int(4, native)),
			("quad", int(8, native)),
			("beshort", int(2, Big)),
			("belong", int(4, Big)),
			("bequad", int(8, Big)),
			("leshort", int(2, Little)),
			("lelong", int(4, Little)),
			("lequad", int(8, Little)),
			("melong", int(4, Middle)),

			("date", date(4, native, false)),
			("ldate", date(4, native, true)),
			("bedate", date(4, Big, false)),
			("beldate", date(4, Big, true)),
			("ledate", date(4, Little, false)),
			("leldate", date(4, Little, true)),
			("medate", date(4, Middle, false)),
			("meldate", date(4, Middle, true)),
			("qdate", date(8, native, false)),
			("qldate", date(8, native, true)),
			("beqdate", date(8, Big, false)),
			("beqldate", date(8, Big, true)),
			("leqdate", date(8, Little, false)),
			("leqldate", date(8, Little, true)),

			("float", float(4, native)),
			("befloat", float(4, Big)),
			("lefloat", float(4, Little)),
			("double", float(8, native)),
			("bedouble", float(8, Big)),
			("ledouble", float(8, Little)),

			("beid3", TypeKind::Id3(Big)),
			("leid3", TypeKind::Id3(Little)),

			("string", TypeKind::String),
			("pstring", TypeKind::PString),
			("search", TypeKind::Search),
			("bestring16", TypeKind::String16(Big)),
			("lestring16", TypeKind::String16(Little)),
			("regex", TypeKind::Regex),

			("default", TypeKind::Default),
			("clear", TypeKind::Clear),
			("name", TypeKind::Name),
			("use", TypeKind::Use),
			("indirect", TypeKind::Indirect),
			("offset", TypeKind::Offset),
			("der", TypeKind::Der),
			("guid", TypeKind::Guid),
		];

		let mut out = FnvHashMap::<&'static str, TypeKind>::default();
		out.extend(table.iter().cloned());
		out
	};
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn resolves_known_names() {
		let t = Builtin.resolve("belong").unwrap();
		assert_eq!(t.name(), "belong");
		assert_eq!(t.kind(), TypeKind::Integer { size: 4, endian: Endianness::Big });
		assert_eq!(Builtin.resolve("melong").unwrap().kind(), TypeKind::Integer { size: 4, endian: Endianness::Middle });
		assert_eq!(Builtin.resolve("string").unwrap().kind(), TypeKind::String);
		assert_eq!(Builtin.resolve("guid").unwrap().kind(), TypeKind::Guid);
	}

	#[test]
	fn modifiers_and_prefixes_do_not_resolve() {
		assert!(Builtin.resolve("string/c").is_none());
		assert!(Builtin.resolve("ubyte").is_none());
		assert!(Builtin.resolve("").is_none());
		assert!(Builtin.resolve("unknowntype").is_none());
	}

	#[test]
	fn converts_by_kind() {
		let long = Builtin.resolve("lelong").unwrap();
		assert!(matches!(
			long.convert_test_string("lelong", "0x1234"),
			Ok(TestValue::Integer(NumericTest { value: 0x1234, .. }))
		));
		assert!(long.convert_test_string("lelong", "=z").is_err());

		let string = Builtin.resolve("string").unwrap();
		match string.convert_test_string("string/c", "%PDF-") {
			Ok(TestValue::String(t)) => {
				assert_eq!(t.pattern, b"%PDF-".to_vec());
				assert!(t.flags.case_insensitive_lower);
			}
			other => panic!("unexpected {:?}", other),
		}

		let name = Builtin.resolve("use").unwrap();
		assert_eq!(name.convert_test_string("use", "elf-le").unwrap().to_string(), "elf-le");

		let double = Builtin.resolve("bedouble").unwrap();
		assert!(matches!(double.convert_test_string("bedouble", "0.5"), Ok(TestValue::Float(_))));
	}
}
