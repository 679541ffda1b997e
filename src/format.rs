//! printf-style format strings of magic rules (`PDF document, version %c`).
//!
//! A rule has one value, so every conversion in the template renders that
//! same value.

use std::fmt;

/// The value a rule produced, as handed to `MagicFormatter::render`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FormatArg<'a> {
	Int(i64),
	Float(f64),
	Str(&'a str),
}

impl<'a> FormatArg<'a> {
	fn as_i64(&self) -> i64 {
		match *self {
			FormatArg::Int(v) => v,
			FormatArg::Float(v) => v as i64,
			FormatArg::Str(s) => s.trim().parse().unwrap_or(0),
		}
	}

	fn as_f64(&self) -> f64 {
		match *self {
			FormatArg::Int(v) => v as f64,
			FormatArg::Float(v) => v,
			FormatArg::Str(s) => s.trim().parse().unwrap_or(0.0),
		}
	}

	fn to_text(&self) -> String {
		match *self {
			FormatArg::Int(v) => v.to_string(),
			FormatArg::Float(v) => v.to_string(),
			FormatArg::Str(s) => s.to_string(),
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Spec {
	left: bool,
	zero: bool,
	plus: bool,
	space: bool,
	alternate: bool,
	width: Option<usize>,
	precision: Option<usize>,
	conv: char,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
	Literal(String),
	Conversion(Spec),
}

/// A parsed format template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MagicFormatter {
	source: String,
	pieces: Vec<Piece>,
}

const CONVERSIONS: &str = "diuxXocseEfFgG";
const LENGTHS: &str = "hlqLjzt";
/// Widths and precisions past this are not taken as conversions.
const MAX_WIDTH: usize = 4096;

fn digits<I>(chars: &mut std::iter::Peekable<I>) -> Option<usize>
where
	I: Iterator<Item = char>,
{
	let mut val: Option<usize> = None;
	while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
		val = Some(val.unwrap_or(0).saturating_mul(10).saturating_add(d as usize));
		chars.next();
	}
	val
}

impl MagicFormatter {
	pub fn new(format: &str) -> MagicFormatter {
		let mut pieces = Vec::new();
		let mut literal = String::new();
		let mut chars = format.chars().peekable();

		while let Some(c) = chars.next() {
			if c != '%' {
				literal.push(c);
				continue;
			}
			if chars.peek() == Some(&'%') {
				chars.next();
				literal.push('%');
				continue;
			}

			// Keep the raw text in case this turns out not to be a conversion.
			let rest: String = chars.clone().collect();
			let mut spec = Spec::default();
			while let Some(&flag) = chars.peek() {
				match flag {
					'-' => spec.left = true,
					'0' => spec.zero = true,
					'+' => spec.plus = true,
					' ' => spec.space = true,
					'#' => spec.alternate = true,
					_ => break,
				}
				chars.next();
			}
			spec.width = digits(&mut chars);
			if chars.peek() == Some(&'.') {
				chars.next();
				spec.precision = Some(digits(&mut chars).unwrap_or(0));
			}
			while chars.peek().map_or(false, |c| LENGTHS.contains(*c)) {
				chars.next();
			}

			let oversized = spec.width.into_iter().chain(spec.precision).any(|n| n > MAX_WIDTH);
			match chars.next() {
				Some(conv) if CONVERSIONS.contains(conv) && !oversized => {
					spec.conv = conv;
					if !literal.is_empty() {
						pieces.push(Piece::Literal(std::mem::take(&mut literal)));
					}
					pieces.push(Piece::Conversion(spec));
				}
				_ => {
					literal.push('%');
					literal.push_str(&rest);
					break;
				}
			}
		}
		if !literal.is_empty() {
			pieces.push(Piece::Literal(literal));
		}

		MagicFormatter {
			source: format.to_string(),
			pieces,
		}
	}

	/// Whether the template has anything to substitute.
	pub fn has_conversion(&self) -> bool {
		self.pieces.iter().any(|p| matches!(p, Piece::Conversion(_)))
	}

	/// Substitute `arg` into every conversion.
	pub fn render(&self, arg: &FormatArg) -> String {
		let mut out = String::new();
		for piece in &self.pieces {
			match *piece {
				Piece::Literal(ref s) => out.push_str(s),
				Piece::Conversion(ref spec) => out.push_str(&convert(spec, arg)),
			}
		}
		out
	}
}

impl fmt::Display for MagicFormatter {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str(&self.source)
	}
}

fn convert(spec: &Spec, arg: &FormatArg) -> String {
	let (sign, prefix, body, numeric) = match spec.conv {
		'd' | 'i' => {
			let v = arg.as_i64();
			let sign = sign_of(spec, v < 0);
			let mut body = v.unsigned_abs().to_string();
			if let Some(p) = spec.precision {
				body = zero_extend(body, p);
			}
			(sign, "", body, true)
		}
		'u' | 'x' | 'X' | 'o' => {
			let v = arg.as_i64() as u64;
			let body = match spec.conv {
				'u' => v.to_string(),
				'x' => format!("{:x}", v),
				'X' => format!("{:X}", v),
				_ => format!("{:o}", v),
			};
			let prefix = match spec.conv {
				'x' if spec.alternate && v != 0 => "0x",
				'X' if spec.alternate && v != 0 => "0X",
				'o' if spec.alternate && v != 0 => "0",
				_ => "",
			};
			let body = match spec.precision {
				Some(p) => zero_extend(body, p),
				None => body,
			};
			("", prefix, body, true)
		}
		'c' => {
			let c = match *arg {
				FormatArg::Str(s) => s.chars().next().unwrap_or('\0'),
				_ => char::from(arg.as_i64() as u8),
			};
			("", "", c.to_string(), false)
		}
		's' => {
			let text = arg.to_text();
			let body = match spec.precision {
				Some(p) => text.chars().take(p).collect(),
				None => text,
			};
			("", "", body, false)
		}
		_ => {
			let v = arg.as_f64();
			let sign = sign_of(spec, v.is_sign_negative() && v != 0.0);
			let body = float_body(spec, v.abs());
			(sign, "", body, true)
		}
	};

	let len = sign.len() + prefix.len() + body.chars().count();
	let width = spec.width.unwrap_or(0);
	if len >= width {
		return format!("{}{}{}", sign, prefix, body);
	}
	let pad = width - len;
	if spec.left {
		format!("{}{}{}{}", sign, prefix, body, " ".repeat(pad))
	} else if spec.zero && numeric && (spec.precision.is_none() || !"diuxXo".contains(spec.conv)) {
		format!("{}{}{}{}", sign, prefix, "0".repeat(pad), body)
	} else {
		format!("{}{}{}{}", " ".repeat(pad), sign, prefix, body)
	}
}

fn sign_of(spec: &Spec, negative: bool) -> &'static str {
	if negative {
		"-"
	} else if spec.plus {
		"+"
	} else if spec.space {
		" "
	} else {
		""
	}
}

fn zero_extend(body: String, precision: usize) -> String {
	if body.len() >= precision {
		body
	} else {
		format!("{}{}", "0".repeat(precision - body.len()), body)
	}
}

/// `1.500000e+00` rather than Rust's `1.5e0`.
fn exponent_form(v: f64, precision: usize, upper: bool) -> String {
	let raw = format!("{:.*e}", precision, v);
	let (mantissa, exp) = match raw.find('e') {
		Some(i) => (&raw[..i], raw[i + 1..].parse::<i32>().unwrap_or(0)),
		None => (raw.as_str(), 0),
	};
	let e = if upper { 'E' } else { 'e' };
	let sign = if exp < 0 { '-' } else { '+' };
	format!("{}{}{}{:02}", mantissa, e, sign, exp.abs())
}

fn strip_zeros(s: String) -> String {
	if !s.contains('.') {
		return s;
	}
	let (num, exp) = match s.find(|c: char| c == 'e' || c == 'E') {
		Some(i) => (&s[..i], &s[i..]),
		None => (s.as_str(), ""),
	};
	let num = num.trim_end_matches('0').trim_end_matches('.');
	format!("{}{}", num, exp)
}

fn float_body(spec: &Spec, v: f64) -> String {
	if !v.is_finite() {
		let s = if v.is_nan() { "nan" } else { "inf" };
		return if spec.conv.is_ascii_uppercase() { s.to_uppercase() } else { s.to_string() };
	}
	let precision = spec.precision.unwrap_or(6);
	match spec.conv {
		'f' | 'F' => format!("{:.*}", precision, v),
		'e' | 'E' => exponent_form(v, precision, spec.conv == 'E'),
		_ => {
			let p = if precision == 0 { 1 } else { precision };
			// exponent after rounding to p digits, so 999999.7 counts as 1e+06
			let sci = format!("{:.*e}", p - 1, v);
			let exp = sci.find('e').and_then(|i| sci[i + 1..].parse::<i32>().ok()).unwrap_or(0);
			let s = if exp < -4 || exp >= p as i32 {
				exponent_form(v, p - 1, spec.conv == 'G')
			} else {
				format!("{:.*}", (p as i32 - 1 - exp).max(0) as usize, v)
			};
			if spec.alternate {
				s
			} else {
				strip_zeros(s)
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn render(format: &str, arg: FormatArg) -> String {
		MagicFormatter::new(format).render(&arg)
	}

	#[test]
	fn literal_only() {
		let f = MagicFormatter::new("PDF document");
		assert!(!f.has_conversion());
		assert_eq!(f.render(&FormatArg::Int(1)), "PDF document");
		assert_eq!(f.to_string(), "PDF document");
	}

	#[test]
	fn integers() {
		assert_eq!(render("version %d", FormatArg::Int(3)), "version 3");
		assert_eq!(render("%ld blocks", FormatArg::Int(-12)), "-12 blocks");
		assert_eq!(render("%5d|", FormatArg::Int(42)), "   42|");
		assert_eq!(render("%-5d|", FormatArg::Int(42)), "42   |");
		assert_eq!(render("%05d", FormatArg::Int(-42)), "-0042");
		assert_eq!(render("%+d", FormatArg::Int(7)), "+7");
		assert_eq!(render("%.3d", FormatArg::Int(7)), "007");
	}

	#[test]
	fn unsigned_hex_octal() {
		assert_eq!(render("%x", FormatArg::Int(255)), "ff");
		assert_eq!(render("%#X", FormatArg::Int(255)), "0XFF");
		assert_eq!(render("%#o", FormatArg::Int(8)), "010");
		assert_eq!(render("%08lx", FormatArg::Int(0xbeef)), "0000beef");
		assert_eq!(render("%u", FormatArg::Int(-1)), "18446744073709551615");
	}

	#[test]
	fn chars_and_strings() {
		assert_eq!(render("\u{8}, version %c", FormatArg::Int(0x31)), "\u{8}, version 1");
		assert_eq!(render("\"%s\"", FormatArg::Str("title")), "\"title\"");
		assert_eq!(render("%.2s", FormatArg::Str("title")), "ti");
		assert_eq!(render("%-6s|", FormatArg::Str("ab")), "ab    |");
	}

	#[test]
	fn floats() {
		assert_eq!(render("%f", FormatArg::Float(1.5)), "1.500000");
		assert_eq!(render("%.2f", FormatArg::Float(-1.005)), "-1.00");
		assert_eq!(render("%e", FormatArg::Float(1500.0)), "1.500000e+03");
		assert_eq!(render("%E", FormatArg::Float(0.015)), "1.500000E-02");
		assert_eq!(render("%g", FormatArg::Float(0.5)), "0.5");
		assert_eq!(render("%g", FormatArg::Float(1500000.0)), "1.5e+06");
		assert_eq!(render("%g", FormatArg::Float(44.1)), "44.1");
		assert_eq!(render("%g", FormatArg::Float(999999.7)), "1e+06");
		assert_eq!(render("%g", FormatArg::Float(99999.7)), "99999.7");
		assert_eq!(render("%.2g", FormatArg::Float(9.97)), "10");
		assert_eq!(render("%g", FormatArg::Float(0.0)), "0");
	}

	#[test]
	fn percent_and_bad_conversions() {
		assert_eq!(render("100%%", FormatArg::Int(0)), "100%");
		let f = MagicFormatter::new("50% and more");
		assert!(!f.has_conversion());
		assert_eq!(f.render(&FormatArg::Int(0)), "50% and more");
		assert_eq!(render("trailing %", FormatArg::Int(0)), "trailing %");
	}

	#[test]
	fn huge_width_or_precision_is_literal() {
		let f = MagicFormatter::new("%99999999999999999999d");
		assert!(!f.has_conversion());
		assert_eq!(f.render(&FormatArg::Int(1)), "%99999999999999999999d");

		let f = MagicFormatter::new("v%.99999999999999999999d");
		assert!(!f.has_conversion());
		assert_eq!(f.render(&FormatArg::Int(1)), "v%.99999999999999999999d");

		assert_eq!(render("%4096d", FormatArg::Int(1)).len(), 4096);
		assert_eq!(render("%.4097f", FormatArg::Float(1.0)), "%.4097f");
	}
}
