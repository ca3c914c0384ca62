use crate::rules::{Rule, RuleKind, RuleOutcome};
use tracing::debug;

/// Marker that opens a one-element construction.
const OPEN_MARKER: &str = "Some(vec![StateEvent::";

/// Closer left over from the single-event shape.
const STALE_CLOSE: &str = "});";

/// Replacement for [`STALE_CLOSE`].
const FIXED_CLOSE: &str = "}]);";

/// Any closer already in the collection shape, with or without `;`.
const COLLECTION_CLOSE: &str = "}])";

/// Rule that repairs constructions whose closer sits on a later line.
///
/// An opening line contains `Some(vec![StateEvent::` and no closer of either
/// form. Scanning forward, the first line holding a closer ends the span: a
/// stale `});` there is rewritten to `}]);` once, a closer already shaped
/// like `}])` is left alone. Lines between the opening and the closer are
/// never touched.
///
/// Openings that reach the end of the text without a closer are reported in
/// [`RuleOutcome::unmatched`] rather than silently ignored.
#[derive(Debug, Default)]
pub struct SpanClose;

impl SpanClose {
	pub const NAME: &'static str = "span-close";

	pub fn new() -> Self {
		SpanClose
	}
}

fn is_opening(line: &str) -> bool {
	line.contains(OPEN_MARKER) && !has_closer(line)
}

fn has_closer(line: &str) -> bool {
	line.contains(STALE_CLOSE) || line.contains(COLLECTION_CLOSE)
}

impl Rule for SpanClose {
	fn name(&self) -> &'static str {
		Self::NAME
	}

	fn kind(&self) -> RuleKind {
		RuleKind::Span
	}

	fn apply(&self, text: &str) -> RuleOutcome {
		let mut lines: Vec<String> = text.split('\n').map(str::to_string).collect();
		let mut rewrites = 0;
		let mut unmatched = Vec::new();

		for i in 0..lines.len() {
			if !is_opening(&lines[i]) {
				continue;
			}

			let Some(j) = (i + 1..lines.len()).find(|&j| has_closer(&lines[j])) else {
				debug!(line = i + 1, "span opening without closing line");
				unmatched.push(i + 1);
				continue;
			};

			if !lines[j].contains(COLLECTION_CLOSE) {
				lines[j] = lines[j].replacen(STALE_CLOSE, FIXED_CLOSE, 1);
				rewrites += 1;
			}
		}

		if rewrites == 0 {
			return RuleOutcome {
				unmatched,
				..RuleOutcome::unchanged(text)
			};
		}

		RuleOutcome {
			text: lines.join("\n"),
			rewrites,
			unmatched,
		}
	}
}
