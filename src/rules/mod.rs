//! Rewrite rules for the `Option<StateEvent>` to `Option<Vec<StateEvent>>` migration.
//!
//! This module handles:
//! - Single-pass rules that rewrite whole-file text left to right
//! - The multi-line span fixer that repairs construction closers across lines
//! - The fixed ordering in which rules run over one file

pub mod rewriter;
pub mod scanner;
pub mod span;

use crate::error::Result;
use tracing::debug;

pub use rewriter::{AssertCollapse, ConstructionClose, DisjunctionExpand, IfLetExpand};
pub use span::SpanClose;

/// How a rule sees the text it rewrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
	/// One matching pass over the entire text.
	SinglePass,
	/// Line-oriented: an opening line and a later closing line.
	Span,
}

/// Result of running one rule over a piece of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOutcome {
	/// The rewritten text (equal to the input when `rewrites == 0`).
	pub text: String,

	/// Number of occurrences rewritten.
	pub rewrites: usize,

	/// 1-based line numbers of span openings that never found a closing line.
	pub unmatched: Vec<usize>,
}

impl RuleOutcome {
	/// Outcome for a rule that found nothing to do.
	pub fn unchanged(text: &str) -> Self {
		RuleOutcome {
			text: text.to_string(),
			rewrites: 0,
			unmatched: Vec::new(),
		}
	}
}

/// A single text transformation: a recognition pattern and its rewrite.
pub trait Rule {
	/// Stable name used in logs and reports.
	fn name(&self) -> &'static str;

	/// Whether the rule is single-pass or line-oriented.
	fn kind(&self) -> RuleKind;

	/// Rewrite every recognized occurrence in `text`.
	///
	/// Never fails: text the rule does not recognize is returned unchanged.
	fn apply(&self, text: &str) -> RuleOutcome;
}

/// Per-rule tally for one run of a [`RuleSet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleHits {
	/// Name of the rule.
	pub rule: &'static str,

	/// Rewrites it performed.
	pub rewrites: usize,
}

/// Result of running a whole [`RuleSet`] over one file's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteOutcome {
	/// Whether `text` differs from the input.
	pub changed: bool,

	/// The new text (equal to the input when unchanged).
	pub text: String,

	/// Rewrites per rule, in rule order.
	pub hits: Vec<RuleHits>,

	/// Span openings left without a closing line.
	pub unmatched: Vec<usize>,
}

impl RewriteOutcome {
	/// Total rewrites across all rules.
	pub fn total_rewrites(&self) -> usize {
		self.hits.iter().map(|h| h.rewrites).sum()
	}
}

/// An ordered list of rules applied to each file.
///
/// Order is part of the contract: construction fixes run before assertion
/// rewrites, and the line-oriented span fixer runs last over whatever the
/// single-pass rules left behind.
pub struct RuleSet {
	rules: Vec<Box<dyn Rule>>,
}

impl std::fmt::Debug for RuleSet {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_list().entries(self.names()).finish()
	}
}

impl RuleSet {
	/// Build a rule set from rules in the order they should run.
	pub fn new(rules: Vec<Box<dyn Rule>>) -> Self {
		RuleSet { rules }
	}

	/// The migration's rules in their fixed order.
	pub fn standard() -> Result<Self> {
		Ok(RuleSet::new(vec![
			Box::new(ConstructionClose::new()?),
			Box::new(AssertCollapse::new()?),
			Box::new(IfLetExpand::new()?),
			Box::new(DisjunctionExpand::new()?),
			Box::new(SpanClose::new()),
		]))
	}

	/// Rule names in application order.
	pub fn names(&self) -> Vec<&'static str> {
		self.rules.iter().map(|r| r.name()).collect()
	}

	pub fn len(&self) -> usize {
		self.rules.len()
	}

	pub fn is_empty(&self) -> bool {
		self.rules.is_empty()
	}

	/// Run every rule in order, each over the previous rule's output.
	pub fn apply(&self, original: &str) -> RewriteOutcome {
		let mut text = original.to_string();
		let mut hits = Vec::with_capacity(self.rules.len());
		let mut unmatched = Vec::new();

		for rule in &self.rules {
			let outcome = rule.apply(&text);
			if outcome.rewrites > 0 {
				debug!(rule = rule.name(), rewrites = outcome.rewrites, "rule applied");
			}
			hits.push(RuleHits {
				rule: rule.name(),
				rewrites: outcome.rewrites,
			});
			unmatched.extend(outcome.unmatched);
			text = outcome.text;
		}

		RewriteOutcome {
			changed: text != original,
			text,
			hits,
			unmatched,
		}
	}
}
