//! Where per-line compile failures go.

use std::error::Error as StdError;
use crate::error::ParseError;

/// Receives every recoverable failure while compiling magic lines.
///
/// The compiler keeps going after calling this; what to do with the
/// failure (ignore, count, abort the load) is up to the implementor.
pub trait ErrorCallback {
	fn error(&mut self, line: &str, err: &ParseError);
}

/// Drops every failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl ErrorCallback for Silent {
	fn error(&mut self, _line: &str, _err: &ParseError) {}
}

/// Forwards every failure to `tracing` at warn level.
#[derive(Debug, Clone, Copy, Default)]
pub struct Logger;

impl ErrorCallback for Logger {
	fn error(&mut self, line: &str, err: &ParseError) {
		match err.source() {
			Some(cause) => tracing::warn!(line, cause = %cause, "{}", err),
			None => tracing::warn!(line, "{}", err),
		}
	}
}

impl<F> ErrorCallback for F
where
	F: FnMut(&str, &ParseError),
{
	fn error(&mut self, line: &str, err: &ParseError) {
		self(line, err)
	}
}

/// A failure flattened to text, as collected by `Vec<Diagnostic>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
	pub line: String,
	pub message: String,
	pub cause: Option<String>,
}

impl<'a> From<(&'a str, &'a ParseError)> for Diagnostic {
	fn from((line, err): (&'a str, &'a ParseError)) -> Self {
		Diagnostic {
			line: line.to_string(),
			message: err.to_string(),
			cause: err.source().map(|cause| cause.to_string()),
		}
	}
}

impl ErrorCallback for Vec<Diagnostic> {
	fn error(&mut self, line: &str, err: &ParseError) {
		self.push(Diagnostic::from((line, err)));
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::NumberError;

	#[test]
	fn collects_message_and_cause() {
		let mut diags = Vec::<Diagnostic>::new();
		let err = ParseError::AndMask {
			text: "a".to_string(),
			source: NumberError::Empty,
		};
		diags.error("0 short&a x", &err);

		assert_eq!(diags.len(), 1);
		assert_eq!(diags[0].line, "0 short&a x");
		assert_eq!(diags[0].message, "invalid type AND-number: a");
		assert_eq!(diags[0].cause.as_deref(), Some("empty number"));
	}

	#[test]
	fn closures_are_callbacks() {
		let mut count = 0;
		{
			let mut cb = |_: &str, _: &ParseError| count += 1;
			cb.error("x", &ParseError::BlankType);
			cb.error("y", &ParseError::FieldCount);
		}
		assert_eq!(count, 2);
	}
}
