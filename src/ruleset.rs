//! Compiling a whole magic file.
//!
//! Rules are kept flat, in file order, each tagged with its level. The
//! signature trees can be rebuilt from that with `RuleSet::graph`.

use std::str::FromStr;
use petgraph::prelude::*;

use crate::callback::{ErrorCallback, Silent};
use crate::entry::MagicEntry;
use crate::parse::{compile_line, Line};
use crate::types::{Builtin, TypeRegistry};

/// What `RuleSet::push_line` did with a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
	/// A new rule, at this index.
	Added(usize),
	/// A `!:` line, attached to the rule at this index.
	Attached(usize),
	/// Blank line, comment, or a `!:` line with nothing before it.
	Skipped,
	/// Reported to the callback.
	Failed,
}

/// Compiled rules of one or more magic files.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
	entries: Vec<MagicEntry>,
}

impl RuleSet {
	pub fn new() -> RuleSet {
		RuleSet::default()
	}

	/// Compile a whole magic file.
	pub fn from_str_with(text: &str, callback: &mut dyn ErrorCallback) -> RuleSet {
		let mut set = RuleSet::new();
		set.extend_lines(&Builtin, text, callback);
		set
	}

	/// Compile raw magic file bytes. Bytes are taken as Latin-1, so any
	/// 8-bit value comes through as the matching char.
	pub fn from_u8(bytes: &[u8], callback: &mut dyn ErrorCallback) -> RuleSet {
		let text: String = bytes.iter().map(|&b| char::from(b)).collect();
		RuleSet::from_str_with(&text, callback)
	}

	/// Compile every line of `text` onto the end of this set.
	pub fn extend_lines<R: TypeRegistry + ?Sized>(
		&mut self,
		registry: &R,
		text: &str,
		callback: &mut dyn ErrorCallback,
	) {
		let before = self.entries.len();
		let mut failed = 0;
		for line in text.lines() {
			if self.push_line_with(registry, line, callback) == LineOutcome::Failed {
				failed += 1;
			}
		}
		tracing::debug!(added = self.entries.len() - before, failed, "compiled magic lines");
	}

	/// Compile one line against the builtin types.
	pub fn push_line(&mut self, line: &str, callback: &mut dyn ErrorCallback) -> LineOutcome {
		self.push_line_with(&Builtin, line, callback)
	}

	/// Compile one line. A `!:` line goes to the last rule compiled.
	pub fn push_line_with<R: TypeRegistry + ?Sized>(
		&mut self,
		registry: &R,
		line: &str,
		callback: &mut dyn ErrorCallback,
	) -> LineOutcome {
		let body = line.trim_start();
		if body.is_empty() || body.starts_with('#') {
			return LineOutcome::Skipped;
		}

		match compile_line(registry, line) {
			Ok(Line::Entry(entry)) => {
				self.entries.push(entry);
				LineOutcome::Added(self.entries.len() - 1)
			}
			Ok(Line::Extension(ext)) => match self.entries.last_mut() {
				Some(prev) => {
					ext.apply(prev);
					LineOutcome::Attached(self.entries.len() - 1)
				}
				None => {
					tracing::trace!(line, "no entry to extend");
					LineOutcome::Skipped
				}
			},
			Err(err) => {
				// continuation lines with nothing to attach to are not worth a report
				if self.entries.is_empty() && line.starts_with("!:") {
					return LineOutcome::Skipped;
				}
				callback.error(line, &err);
				LineOutcome::Failed
			}
		}
	}

	pub fn entries(&self) -> &[MagicEntry] {
		&self.entries
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Indices of the level-0 rules.
	pub fn roots(&self) -> Vec<usize> {
		self.entries
			.iter()
			.enumerate()
			.filter(|(_, e)| e.level() == 0)
			.map(|(i, _)| i)
			.collect()
	}

	/// The signature trees. Node weights are indices into `entries`; each
	/// edge runs from a rule to a child one level deeper.
	///
	/// A rule whose level skips past its predecessor's has no parent and is
	/// left unattached.
	pub fn graph(&self) -> DiGraph<usize, u32> {
		let mut graph = DiGraph::<usize, u32>::with_capacity(self.entries.len(), self.entries.len());
		let mut rulestack = Vec::<(u32, NodeIndex)>::new();

		for (i, entry) in self.entries.iter().enumerate() {
			let node = graph.add_node(i);
			let level = entry.level();

			while let Some(&(parent_level, _)) = rulestack.last() {
				if parent_level < level {
					break;
				}
				rulestack.pop();
			}

			match rulestack.last() {
				Some(&(parent_level, parent)) if parent_level + 1 == level => {
					graph.add_edge(parent, node, 1);
				}
				_ if level == 0 => {}
				_ => {
					tracing::warn!(index = i, level, name = entry.name(), "rule has no parent");
				}
			}
			rulestack.push((level, node));
		}

		graph
	}
}

impl FromStr for RuleSet {
	type Err = std::convert::Infallible;

	/// Compile a whole magic file, dropping failed lines.
	fn from_str(text: &str) -> Result<RuleSet, Self::Err> {
		Ok(RuleSet::from_str_with(text, &mut Silent))
	}
}
