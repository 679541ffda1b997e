//! `magic5` compiles magic(5) signature files into typed rules.
//!
//! # About
//! A magic file is a list of tests, one per line, that `file(1)` style tools
//! run against the start of a file to name its type. Each line gives an
//! offset, a type, a value to compare against and a message to print. Lines
//! prefixed with `>` only run when the rule above them matched, so a file is
//! really a forest of rule trees.
//!
//! This crate turns those lines into `MagicEntry` values: offsets decoded
//! (direct or indirect), type names resolved, test values converted and the
//! output format parsed. Lines that do not compile are handed to an
//! `ErrorCallback` and skipped, so one bad rule never stops a whole file.
//!
//! # Feature flags
//! `cli`:        Enable building of `mdump` binary
//!
//! # Example
//! ```rust
//! extern crate magic5;
//!
//! let mut diagnostics = Vec::<magic5::Diagnostic>::new();
//!
//! let entry = magic5::parse_line(None, "0\tstring\t%PDF-\tPDF document", &mut diagnostics).unwrap();
//! assert_eq!(entry.name(), "PDF");
//! assert_eq!(entry.to_string(), "level 0,name 'PDF',test '%PDF-',format 'PDF document'");
//!
//! // Bad lines go to the callback instead
//! assert!(magic5::parse_line(None, "0 nosuchtype 1", &mut diagnostics).is_none());
//! assert_eq!(diagnostics.len(), 1);
//!
//! // Or compile a whole file at once
//! let rules = magic5::RuleSet::from_u8(b"0 string GIF8 GIF image\n!:mime image/gif\n", &mut diagnostics);
//! assert_eq!(rules.entries()[0].mime_type(), Some("image/gif"));
//! ```

#[macro_use] extern crate lazy_static;

pub mod callback;
pub mod endian;
pub mod entry;
pub mod error;
pub mod format;
pub mod parse;
pub mod ruleset;
pub mod types;

pub use crate::callback::{Diagnostic, ErrorCallback, Logger, Silent};
pub use crate::endian::Endianness;
pub use crate::entry::{MagicEntry, Offset, OffsetInfo, UNKNOWN_NAME};
pub use crate::error::{ConvertError, NumberError, ParseError};
pub use crate::format::{FormatArg, MagicFormatter};
pub use crate::parse::{compile_line, parse_line, parse_line_with, split_line, Extension, Line};
pub use crate::ruleset::{LineOutcome, RuleSet};
pub use crate::types::{Builtin, MagicType, TestValue, TypeKind, TypeRegistry};
