use std::collections::BTreeMap;

use super::formatter::RepairRule;

/// Per-call options for [`NameGenerator::generate`](super::generator::NameGenerator::generate).
///
/// Every field is optional: an empty input generates a name with the
/// generator's own template, capitalization and rules.
///
/// # Fields
/// - `template`: overrides the configured template for this call
/// - `capitalize`: overrides the configured capitalization
/// - `selectors`: per category, the selector keys to restrict sampling to
/// - `extra_rules`: per category, repair rules run after the built-in ones
#[derive(Clone, Debug, Default)]
pub struct GenerateInput {
	pub template: Option<String>,
	pub capitalize: Option<bool>,
	selectors: BTreeMap<String, Vec<String>>,
	extra_rules: BTreeMap<String, Vec<RepairRule>>,
}

impl GenerateInput {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_template(mut self, template: &str) -> Self {
		self.template = Some(template.to_owned());
		self
	}

	pub fn with_capitalize(mut self, capitalize: bool) -> Self {
		self.capitalize = Some(capitalize);
		self
	}

	/// Restricts `category` to a single selector, e.g. `("given", "female")`.
	pub fn with_selector(self, category: &str, selector: &str) -> Self {
		self.with_selectors(category, &[selector])
	}

	/// Restricts `category` to any of `selectors`; adds to earlier selectors.
	pub fn with_selectors(mut self, category: &str, selectors: &[&str]) -> Self {
		self.selectors
			.entry(category.to_owned())
			.or_default()
			.extend(selectors.iter().map(|s| (*s).to_owned()));
		self
	}

	/// Appends a repair rule for `category`, run after the configured ones.
	pub fn with_rule(mut self, category: &str, rule: RepairRule) -> Self {
		self.extra_rules.entry(category.to_owned()).or_default().push(rule);
		self
	}

	/// Selectors requested for `category`, empty if none.
	pub fn selectors(&self, category: &str) -> &[String] {
		self.selectors.get(category).map(Vec::as_slice).unwrap_or_default()
	}

	/// Extra rules supplied for `category`, empty if none.
	pub fn extra_rules(&self, category: &str) -> &[RepairRule] {
		self.extra_rules.get(category).map(Vec::as_slice).unwrap_or_default()
	}

	pub(crate) fn rule_categories(&self) -> impl Iterator<Item = &str> {
		self.extra_rules.keys().map(String::as_str)
	}

	pub(crate) fn selector_categories(&self) -> impl Iterator<Item = &str> {
		self.selectors.keys().map(String::as_str)
	}
}
