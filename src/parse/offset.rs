//! Indirect offsets, from magic(5):
//!
//! Indirect offsets are of the form `(x[.[bsilBSILm]][+-]y)`. The value of
//! `x` is used as an offset in the file; a byte, id3 length, short or long
//! is read there, depending on the type letter (upper case is big-endian,
//! lower case little-endian, `m` PDP-11). `y` is added to that value. The
//! default type is a 4-byte little-endian long.

use nom::bytes::complete::{take_while, take_while1};
use nom::character::complete::{char, one_of};
use nom::combinator::{all_consuming, opt};
use nom::sequence::{delimited, tuple};
use nom::IResult;

use crate::endian::Endianness;
use crate::entry::OffsetInfo;
use crate::error::ParseError;
use super::number::decode_int;

/// The pieces of `(x.ty+y)` before any number is decoded.
#[derive(Debug, PartialEq, Eq)]
struct RawIndirect<'a> {
	base: &'a str,
	tag: Option<char>,
	sign: Option<char>,
	add: &'a str,
}

fn is_number_char(c: char) -> bool {
	c.is_ascii_hexdigit() || c == 'x'
}

// (9.b+19)  (0x3c.l)  (4.S-2)
fn raw_indirect(input: &str) -> IResult<&str, RawIndirect<'_>> {
	let (rest, (base, _, tag, sign, add)) = delimited(
		char('('),
		tuple((
			take_while1(is_number_char),
			opt(char('.')),
			opt(one_of("bsilBSILm")),
			opt(one_of("+-")),
			take_while(is_number_char),
		)),
		char(')'),
	)(input)?;

	Ok((rest, RawIndirect { base, tag, sign, add }))
}

/// Size, byte order and ID3-ness of an indirect type letter.
fn tag_info(tag: Option<char>) -> (u8, Endianness, bool) {
	match tag {
		// byte order is moot for a single byte
		Some('b') => (1, Endianness::Little, false),
		Some('B') => (1, Endianness::Big, false),
		Some('s') => (2, Endianness::Little, false),
		Some('S') => (2, Endianness::Big, false),
		Some('i') => (4, Endianness::Little, true),
		Some('I') => (4, Endianness::Big, true),
		Some('l') => (4, Endianness::Little, false),
		Some('L') => (4, Endianness::Big, false),
		Some('m') => (4, Endianness::Middle, false),
		_ => (4, Endianness::Little, false),
	}
}

/// Parse an indirect offset field (everything after the `>`s and `&`).
pub fn parse_offset(offset: &str) -> Result<OffsetInfo, ParseError> {
	let raw = match all_consuming(raw_indirect)(offset) {
		Ok((_, raw)) => raw,
		Err(_) => return Err(ParseError::OffsetPattern(offset.to_string())),
	};

	let base = decode_int(raw.base).map_err(|source| ParseError::IndirectBase {
		text: offset.to_string(),
		source,
	})?;

	let (size, endian, id3) = tag_info(raw.tag);

	// The `+y` part is optional.
	let mut add = 0;
	if !raw.add.is_empty() {
		add = decode_int(raw.add).map_err(|source| ParseError::IndirectAdjustment {
			text: raw.add.to_string(),
			source,
		})?;
		if raw.sign == Some('-') {
			add = add.wrapping_neg();
		}
	}

	Ok(OffsetInfo { base, endian, id3, size, add })
}
