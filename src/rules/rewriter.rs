use crate::error::{MigrateError, Result};
use crate::rules::scanner::{find_closing, line_indent, match_tail, read_ident, skip_ws};
use crate::rules::{Rule, RuleKind, RuleOutcome};
use regex::{Captures, Regex};

/// Prefix shared by every construction the rules recognize:
/// `Some(vec![StateEvent::<Variant> {`. The variant is capture `variant`.
const CONSTRUCTION: &str = r"Some\(vec!\[StateEvent::(?P<variant>\w+)\s*\{";

/// A recognized `StateEvent::<Variant> { <fields> }` construction.
#[derive(Debug)]
struct Construction<'t> {
	variant: &'t str,

	/// Field-list text between the braces, verbatim.
	fields: &'t str,

	/// Index just past the closing brace.
	end: usize,
}

impl Construction<'_> {
	/// Render as `StateEvent::<Variant> {<fields>}`.
	fn render(&self) -> String {
		format!("StateEvent::{} {{{}}}", self.variant, self.fields)
	}
}

/// Locate the field-list for an anchor match that ends on its opening brace.
fn construction<'t>(text: &'t str, caps: &Captures<'t>) -> Option<Construction<'t>> {
	let anchor = caps.get(0)?;
	let variant = caps.name("variant")?.as_str();
	let open = anchor.end() - 1;
	let close = find_closing(text, open, b'{', b'}')?;
	Some(Construction {
		variant,
		fields: &text[open + 1..close],
		end: close + 1,
	})
}

/// Compile a rule's anchor pattern.
fn compile_anchor(rule: &str, pattern: &str) -> Result<Regex> {
	Regex::new(pattern).map_err(|source| MigrateError::InvalidPattern {
		rule: rule.to_string(),
		pattern: pattern.to_string(),
		source,
	})
}

/// Drive a single-pass rule over `text`.
///
/// `rewrite` is called for every anchor match, left to right. It returns the
/// end of the recognized span and its replacement, or `None` to leave the
/// candidate alone. Matches never overlap: scanning resumes after the
/// replaced span, or after the anchor when the candidate is rejected.
fn rewrite_matches<F>(text: &str, anchor: &Regex, mut rewrite: F) -> RuleOutcome
where
	F: FnMut(&str, &Captures<'_>) -> Option<(usize, String)>,
{
	let mut out = String::with_capacity(text.len());
	let mut last = 0;
	let mut search = 0;
	let mut rewrites = 0;

	while search <= text.len() {
		let Some(caps) = anchor.captures_at(text, search) else {
			break;
		};
		let Some(m) = caps.get(0) else {
			break;
		};

		match rewrite(text, &caps) {
			Some((end, replacement)) => {
				out.push_str(&text[last..m.start()]);
				out.push_str(&replacement);
				last = end;
				search = end;
				rewrites += 1;
			}
			None => search = m.end(),
		}
	}

	if rewrites == 0 {
		return RuleOutcome::unchanged(text);
	}

	out.push_str(&text[last..]);
	RuleOutcome {
		text: out,
		rewrites,
		unmatched: Vec::new(),
	}
}

/// Repair a one-element construction whose `]` went missing.
///
/// `Some(vec![StateEvent::X { .. }));` becomes `Some(vec![StateEvent::X { .. }]);`.
/// Spaces between the closing tokens are tolerated; the field-list is kept
/// verbatim and may span lines or contain nested braces.
#[derive(Debug)]
pub struct ConstructionClose {
	anchor: Regex,
}

impl ConstructionClose {
	pub const NAME: &'static str = "construction-close";

	pub fn new() -> Result<Self> {
		Ok(ConstructionClose {
			anchor: compile_anchor(Self::NAME, CONSTRUCTION)?,
		})
	}
}

impl Rule for ConstructionClose {
	fn name(&self) -> &'static str {
		Self::NAME
	}

	fn kind(&self) -> RuleKind {
		RuleKind::SinglePass
	}

	fn apply(&self, text: &str) -> RuleOutcome {
		rewrite_matches(text, &self.anchor, |text, caps| {
			let c = construction(text, caps)?;
			if c.fields.is_empty() {
				return None;
			}
			let end = match_tail(text, c.end, "));")?;
			Some((end, format!("Some(vec![{}]);", c.render())))
		})
	}
}

/// Collapse `assert!(matches!(name, Some(vec![StateEvent::X { .. }])));`
/// into a presence-and-length check.
///
/// The result is `assert!(name.is_some() && name.as_ref().unwrap().len() == 1);`
/// for wildcard and concrete field-lists alike. This is a deliberate weakening:
/// the variant and every field value stop being checked, so a test migrated by
/// this rule asserts strictly less than it did before.
#[derive(Debug)]
pub struct AssertCollapse {
	anchor: Regex,
}

impl AssertCollapse {
	pub const NAME: &'static str = "assert-collapse";

	pub fn new() -> Result<Self> {
		let pattern = format!(r"assert!\(matches!\((?P<name>\w+),\s*{CONSTRUCTION}");
		Ok(AssertCollapse {
			anchor: compile_anchor(Self::NAME, &pattern)?,
		})
	}
}

impl Rule for AssertCollapse {
	fn name(&self) -> &'static str {
		Self::NAME
	}

	fn kind(&self) -> RuleKind {
		RuleKind::SinglePass
	}

	fn apply(&self, text: &str) -> RuleOutcome {
		rewrite_matches(text, &self.anchor, |text, caps| {
			let c = construction(text, caps)?;
			let end = match_tail(text, c.end, "])));")?;
			let name = caps.name("name")?.as_str();
			Some((
				end,
				format!("assert!({name}.is_some() && {name}.as_ref().unwrap().len() == 1);"),
			))
		})
	}
}

/// Expand `if let Some(vec![StateEvent::X { fields }]) = ident` into a
/// let-chain over the collection.
///
/// ```text
/// if let Some(ref events) = ident
///     && events.len() == 1
///     && let StateEvent::X { fields } = &events[0]
/// ```
///
/// Continuation lines are indented four spaces past the `if`.
#[derive(Debug)]
pub struct IfLetExpand {
	anchor: Regex,
}

impl IfLetExpand {
	pub const NAME: &'static str = "if-let-expand";

	pub fn new() -> Result<Self> {
		let pattern = format!(r"\bif\s+let\s+{CONSTRUCTION}");
		Ok(IfLetExpand {
			anchor: compile_anchor(Self::NAME, &pattern)?,
		})
	}
}

impl Rule for IfLetExpand {
	fn name(&self) -> &'static str {
		Self::NAME
	}

	fn kind(&self) -> RuleKind {
		RuleKind::SinglePass
	}

	fn apply(&self, text: &str) -> RuleOutcome {
		rewrite_matches(text, &self.anchor, |text, caps| {
			let c = construction(text, caps)?;
			if c.fields.is_empty() {
				return None;
			}
			let after = match_tail(text, c.end, "])")?;
			let eq = skip_ws(text, after);
			if text.as_bytes().get(eq) != Some(&b'=') || text.as_bytes().get(eq + 1) == Some(&b'=') {
				return None;
			}
			let (ident, end) = read_ident(text, skip_ws(text, eq + 1))?;
			// Only a bare variable: `self.event` or `f()` would be cut short.
			if matches!(text.as_bytes().get(end), Some(b'.' | b'(' | b'[' | b':')) {
				return None;
			}

			let start = caps.get(0)?.start();
			let indent = format!("{}    ", line_indent(text, start));
			Some((
				end,
				format!(
					"if let Some(ref events) = {ident}\n{indent}&& events.len() == 1\n{indent}&& let {} = &events[0]",
					c.render()
				),
			))
		})
	}
}

/// Rewrite `x.is_none() || matches!(x, Some(vec![StateEvent::X { .. }]))`
/// so the second arm inspects the sole element of the collection.
///
/// Both sides must name the same identifier.
#[derive(Debug)]
pub struct DisjunctionExpand {
	anchor: Regex,
}

impl DisjunctionExpand {
	pub const NAME: &'static str = "disjunction-expand";

	pub fn new() -> Result<Self> {
		let pattern = format!(
			r"\b(?P<left>\w+)\.is_none\(\)\s*\|\|\s*matches!\((?P<right>\w+),\s*{CONSTRUCTION}"
		);
		Ok(DisjunctionExpand {
			anchor: compile_anchor(Self::NAME, &pattern)?,
		})
	}
}

impl Rule for DisjunctionExpand {
	fn name(&self) -> &'static str {
		Self::NAME
	}

	fn kind(&self) -> RuleKind {
		RuleKind::SinglePass
	}

	fn apply(&self, text: &str) -> RuleOutcome {
		rewrite_matches(text, &self.anchor, |text, caps| {
			let ident = caps.name("left")?.as_str();
			if caps.name("right")?.as_str() != ident {
				return None;
			}
			let c = construction(text, caps)?;
			let end = match_tail(text, c.end, "]))")?;
			Some((
				end,
				format!(
					"{ident}.is_none() || ({ident}.as_ref().map(|e| e.len() == 1 && matches!(&e[0], {})).unwrap_or(false))",
					c.render()
				),
			))
		})
	}
}
