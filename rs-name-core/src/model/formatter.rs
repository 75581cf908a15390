use std::fmt;
use std::sync::Arc;

use regex::{Captures, Regex, RegexBuilder};

use crate::error::Result;

/// Irish and Scottish surname roots written with an `O'` prefix.
const O_PREFIX_PATTERN: &str = r"^O(BR[IEYA]{2}N|BRYANT|GORMAN|FLANAGAN|HALLORAN|HARA|LOUGHLIN|SHAUGHNESSY|CONNOR|N[EAI]+LL?|CALLAG?HAN|SHEA|ROURKE|TOOLE?|GRADY|BANNON|BARR|SULLIVAN|DONOHUE|.ONN?ELL?Y?|KEEFE|DOHERTY|[KM][AE]LLE?Y|DONLEY|BAUGH|R[EI]{2}LLEY|BOYLE|.ARR.LL|DELL|HARROLL|DOUGHERTY|[CD]ON[AE]Ll?)(S?)$";

/// `ST` glued to a remainder that does not start with a vowel, R or Y.
const SAINT_PATTERN: &str = r"^ST([^AEIOURY]\w+$)";

const MC_PATTERN: &str = r"^MC(\w+)$";

/// Builds the replacement text of a rule from the captures of its match.
pub type Replacement = Arc<dyn Fn(&Captures<'_>) -> String + Send + Sync>;

/// A case-insensitive regex substitution applied to a name fragment.
#[derive(Clone)]
pub struct RepairRule {
	pattern: Regex,
	replace: Replacement,
}

impl RepairRule {
	/// Compiles `pattern` case-insensitively.
	///
	/// # Errors
	/// Returns `InvalidPattern` if the pattern does not compile.
	pub fn new<F>(pattern: &str, replace: F) -> Result<Self>
	where
		F: Fn(&Captures<'_>) -> String + Send + Sync + 'static,
	{
		let pattern = RegexBuilder::new(pattern).case_insensitive(true).build()?;
		Ok(Self {
			pattern,
			replace: Arc::new(replace),
		})
	}

	pub fn pattern(&self) -> &str {
		self.pattern.as_str()
	}

	/// Substitutes every match in `fragment`.
	pub fn apply(&self, fragment: &str) -> String {
		self.pattern
			.replace_all(fragment, |caps: &Captures<'_>| (self.replace)(caps))
			.into_owned()
	}
}

impl fmt::Debug for RepairRule {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RepairRule").field("pattern", &self.pattern.as_str()).finish_non_exhaustive()
	}
}

/// Uppercases the first character and lowercases the rest.
pub fn capitalize(fragment: &str) -> String {
	let mut chars = fragment.chars();
	match chars.next() {
		Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
		None => String::new(),
	}
}

fn group<'a>(caps: &Captures<'a>, index: usize) -> &'a str {
	caps.get(index).map_or("", |m| m.as_str())
}

/// Built-in surname repairs, in the order they must run:
/// 1. `OBRIEN` → `O'Brien`, `OCONNORS` → `O'Connors`
/// 2. `STMICHAEL` → `St. Michael` (but `STEVENS` is left alone)
/// 3. `MCDONALD` → `McDonald`
pub fn surname_rules() -> Result<Vec<RepairRule>> {
	Ok(vec![
		RepairRule::new(O_PREFIX_PATTERN, |caps| {
			format!("O'{}{}", capitalize(group(caps, 1)), group(caps, 2).to_lowercase())
		})?,
		RepairRule::new(SAINT_PATTERN, |caps| format!("St. {}", capitalize(group(caps, 1))))?,
		RepairRule::new(MC_PATTERN, |caps| format!("Mc{}", capitalize(group(caps, 1))))?,
	])
}

/// Formats one sampled fragment: optional capitalization, then each rule in order.
pub fn format_fragment<'a, I>(fragment: &str, rules: I, capitalize_first: bool) -> String
where
	I: IntoIterator<Item = &'a RepairRule>,
{
	let start = if capitalize_first { capitalize(fragment) } else { fragment.to_owned() };
	rules.into_iter().fold(start, |name, rule| rule.apply(&name))
}
