//! Integer literals as they appear in magic files.
//!
//! `123`, `-123`, `0x7b`, `#7b`, `0173`. A leading `0` followed by more
//! digits is octal. A sign may only come first.

use std::borrow::Cow;
use std::num::IntErrorKind;
use crate::error::NumberError;

struct Literal<'a> {
	negative: bool,
	radix: u32,
	digits: &'a str,
}

impl<'a> Literal<'a> {
	fn split(s: &'a str) -> Result<Literal<'a>, NumberError> {
		if s.is_empty() {
			return Err(NumberError::Empty);
		}

		let (negative, rest) = match s.as_bytes()[0] {
			b'-' => (true, &s[1..]),
			b'+' => (false, &s[1..]),
			_ => (false, s),
		};

		let (radix, digits) = if rest.starts_with("0x") || rest.starts_with("0X") {
			(16, &rest[2..])
		} else if rest.starts_with('#') {
			(16, &rest[1..])
		} else if rest.starts_with('0') && rest.len() > 1 {
			(8, &rest[1..])
		} else {
			(10, rest)
		};

		if digits.starts_with('-') || digits.starts_with('+') {
			return Err(NumberError::Sign);
		}

		Ok(Literal { negative, radix, digits })
	}

	/// Digits with the sign put back, so `MIN` values parse.
	fn signed(&self) -> Cow<'a, str> {
		if self.negative {
			Cow::Owned(format!("-{}", self.digits))
		} else {
			Cow::Borrowed(self.digits)
		}
	}
}

/// Decode a 32-bit literal. Used for offsets.
pub fn decode_int(s: &str) -> Result<i32, NumberError> {
	let lit = Literal::split(s)?;
	Ok(i32::from_str_radix(&lit.signed(), lit.radix)?)
}

/// Decode a 64-bit literal. Used for AND-masks.
pub fn decode_long(s: &str) -> Result<i64, NumberError> {
	let lit = Literal::split(s)?;
	Ok(i64::from_str_radix(&lit.signed(), lit.radix)?)
}

/// Like `decode_long`, but a positive literal too large for `i64` keeps
/// its 64-bit pattern. Test values such as `0xffffffffffffffff` rely on it.
pub fn decode_wrapping(s: &str) -> Result<i64, NumberError> {
	match decode_long(s) {
		Err(NumberError::Digits(ref e)) if *e.kind() == IntErrorKind::PosOverflow => {
			let lit = Literal::split(s)?;
			Ok(u64::from_str_radix(lit.digits, lit.radix)? as i64)
		}
		other => other,
	}
}
