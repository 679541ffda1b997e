//! Error types for magic line compilation.
//!
//! Nothing here ever escapes a line: the compiler hands a `ParseError` to
//! the caller's `ErrorCallback` and moves on.

use std::num::{ParseFloatError, ParseIntError};
use thiserror::Error;

/// Failure to decode an integer literal (`123`, `0x7b`, `0173`, `-5`).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NumberError {
	#[error("empty number")]
	Empty,

	#[error("misplaced sign")]
	Sign,

	#[error("{0}")]
	Digits(#[from] ParseIntError),
}

/// A test string that the resolved magic type could not convert.
#[derive(Debug, Error)]
pub enum ConvertError {
	#[error("invalid number `{text}`")]
	Number {
		text: String,
		#[source]
		source: NumberError,
	},

	#[error("invalid float `{text}`")]
	Float {
		text: String,
		#[source]
		source: ParseFloatError,
	},

	#[error("invalid {kind} modifier `{flag}`")]
	Modifier { kind: &'static str, flag: char },

	#[error("invalid {kind} range `{text}`")]
	Range {
		kind: &'static str,
		text: String,
		#[source]
		source: ParseIntError,
	},

	#[error("invalid regex")]
	Regex(#[from] regex::Error),
}

/// Reasons a single magic line produced no rule.
#[derive(Debug, Error)]
pub enum ParseError {
	#[error("invalid extension line has less than 2 whitespace separated fields")]
	ExtensionFields,

	#[error("invalid number of whitespace separated fields, must be >= 3")]
	FieldCount,

	#[error("invalid offset number: {0}")]
	EmptyOffset(String),

	#[error("invalid offset number: {text}")]
	Offset {
		text: String,
		#[source]
		source: NumberError,
	},

	#[error("invalid offset pattern: {0}")]
	OffsetPattern(String),

	#[error("invalid long offset number: {text}")]
	IndirectBase {
		text: String,
		#[source]
		source: NumberError,
	},

	#[error("invalid long add value: {text}")]
	IndirectAdjustment {
		text: String,
		#[source]
		source: NumberError,
	},

	#[error("invalid type AND-number: {text}")]
	AndMask {
		text: String,
		#[source]
		source: NumberError,
	},

	#[error("blank type string")]
	BlankType,

	#[error("unknown magic type string: {0}")]
	UnknownType(String),

	#[error("could not convert magic test string: {text}")]
	TestValue {
		text: String,
		#[source]
		source: ConvertError,
	},
}
