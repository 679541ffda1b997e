//! Test values of the integer, date and float types.

use std::fmt;
use crate::error::ConvertError;
use crate::parse::number::decode_wrapping;

/// How the value read is compared with the test value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
	/// `=` or nothing
	Equal,
	/// `!`
	NotEqual,
	/// `<`
	LessThan,
	/// `>`
	GreaterThan,
	/// `&`: every bit of the test value is set
	AllBitsSet,
	/// `^`: some bit of the test value is clear
	AnyBitClear,
	/// `~`: equal to the inverted test value
	Negated,
}

impl Operator {
	fn from_char(c: char) -> Option<Operator> {
		let op = match c {
			'=' => Operator::Equal,
			'!' => Operator::NotEqual,
			'<' => Operator::LessThan,
			'>' => Operator::GreaterThan,
			'&' => Operator::AllBitsSet,
			'^' => Operator::AnyBitClear,
			'~' => Operator::Negated,
			_ => return None,
		};
		Some(op)
	}

	fn symbol(self) -> &'static str {
		match self {
			Operator::Equal => "",
			Operator::NotEqual => "!",
			Operator::LessThan => "<",
			Operator::GreaterThan => ">",
			Operator::AllBitsSet => "&",
			Operator::AnyBitClear => "^",
			Operator::Negated => "~",
		}
	}

	/// Split a leading operator off `text`, if `allowed` accepts it.
	fn split(text: &str, allowed: impl Fn(Operator) -> bool) -> (Operator, &str) {
		let mut chars = text.chars();
		match chars.next().and_then(Operator::from_char) {
			Some(op) if allowed(op) => (op, chars.as_str()),
			_ => (Operator::Equal, text),
		}
	}
}

/// Integer comparison, for the integer and date types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumericTest {
	pub op: Operator,
	pub value: i64,
}

impl NumericTest {
	pub fn parse(text: &str) -> Result<NumericTest, ConvertError> {
		let (op, rest) = Operator::split(text, |_| true);
		let value = decode_wrapping(rest).map_err(|source| ConvertError::Number {
			text: text.to_string(),
			source,
		})?;
		Ok(NumericTest { op, value })
	}
}

impl fmt::Display for NumericTest {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "{}{}", self.op.symbol(), self.value)
	}
}

/// Float comparison. Only `= ! < >` apply.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatTest {
	pub op: Operator,
	pub value: f64,
}

impl FloatTest {
	pub fn parse(text: &str) -> Result<FloatTest, ConvertError> {
		let (op, rest) = Operator::split(text, |op| match op {
			Operator::Equal | Operator::NotEqual | Operator::LessThan | Operator::GreaterThan => true,
			_ => false,
		});
		let value = rest.parse::<f64>().map_err(|source| ConvertError::Float {
			text: text.to_string(),
			source,
		})?;
		Ok(FloatTest { op, value })
	}
}

impl fmt::Display for FloatTest {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "{}{}", self.op.symbol(), self.value)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn numeric_operators() {
		assert_eq!(NumericTest::parse("0x10").unwrap(), NumericTest { op: Operator::Equal, value: 16 });
		assert_eq!(NumericTest::parse("=7").unwrap().op, Operator::Equal);
		assert_eq!(NumericTest::parse("!7").unwrap().op, Operator::NotEqual);
		assert_eq!(NumericTest::parse("<7").unwrap().op, Operator::LessThan);
		assert_eq!(NumericTest::parse(">-7").unwrap(), NumericTest { op: Operator::GreaterThan, value: -7 });
		assert_eq!(NumericTest::parse("&0x80").unwrap().op, Operator::AllBitsSet);
		assert_eq!(NumericTest::parse("^0x80").unwrap().op, Operator::AnyBitClear);
		assert_eq!(NumericTest::parse("~0").unwrap().op, Operator::Negated);
	}

	#[test]
	fn numeric_failures() {
		assert!(NumericTest::parse("=z").is_err());
		assert!(NumericTest::parse("=").is_err());
		assert!(NumericTest::parse("").is_err());
		assert!(NumericTest::parse("1.5").is_err());
	}

	#[test]
	fn numeric_display() {
		assert_eq!(NumericTest::parse("0x10").unwrap().to_string(), "16");
		assert_eq!(NumericTest::parse(">0x10").unwrap().to_string(), ">16");
	}

	#[test]
	fn floats() {
		assert_eq!(FloatTest::parse("1.5").unwrap(), FloatTest { op: Operator::Equal, value: 1.5 });
		assert_eq!(FloatTest::parse("<-2e3").unwrap(), FloatTest { op: Operator::LessThan, value: -2000.0 });
		assert!(FloatTest::parse("&1.0").is_err());
		assert!(FloatTest::parse("one").is_err());
	}
}
