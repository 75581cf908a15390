use std::borrow::Cow;
use std::collections::HashMap;
use std::path::Path;

use log::debug;
use rand::Rng;

use crate::error::{NameError, Result};
use super::config::{ConfigBuilder, Configuration};
use super::formatter::format_fragment;
use super::generate_input::GenerateInput;
use super::sampler::sample;
use super::template::Template;

/// High-level name generator.
///
/// # Responsibilities
/// - Hold an immutable [`Configuration`]
/// - For each placeholder of the template: pick a source, draw a record,
///   format the fragment
/// - Substitute the fragments into the template
///
/// `generate` takes `&self`, so one generator can serve concurrent callers.
#[derive(Clone, Debug)]
pub struct NameGenerator {
	config: Configuration,
}

impl NameGenerator {
	pub fn new(config: Configuration) -> Self {
		Self { config }
	}

	/// Creates a generator over the US census tables found in a directory.
	///
	/// # Parameters
	/// - `data_dir`: directory holding the census `.csv` tables.
	///   `"."` and `"./"` resolve to the current directory.
	///
	/// # Errors
	/// - Returns an error if the path is not a directory.
	///
	/// # Notes
	/// - Tables are scanned on each draw, so a missing table is only reported
	///   when a name is first generated from it.
	pub fn census<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
		let string_path = data_dir.as_ref().to_string_lossy();
		let folder = crate::io::normalize_folder(&string_path);

		if !folder.is_dir() {
			return Err(NameError::InvalidConfig(format!("Expected a directory, got: {}", folder.display())));
		}

		Ok(Self::new(ConfigBuilder::census(folder).build()?))
	}

	pub fn config(&self) -> &Configuration {
		&self.config
	}

	/// Generates a name using the thread-local random generator.
	pub fn generate(&self, input: &GenerateInput) -> Result<String> {
		self.generate_with_rng(input, &mut rand::rng())
	}

	/// Generates a name drawing every random choice from `rng`.
	///
	/// With a seeded `rng` the output is reproducible.
	///
	/// # Errors
	/// - Configuration errors (bad template override, unknown category in the
	///   template or in extra rules) are reported before any sampling.
	/// - Data errors from the chosen sources (missing resource, exhausted
	///   sample...).
	pub fn generate_with_rng<R: Rng + ?Sized>(&self, input: &GenerateInput, rng: &mut R) -> Result<String> {
		let template = match &input.template {
			Some(raw) => {
				let template = Template::parse(raw)?;
				self.config.check_template(&template)?;
				Cow::Owned(template)
			}
			None => Cow::Borrowed(self.config.template()),
		};

		if let Some(unknown) = input.rule_categories().find(|c| self.config.category(c).is_none()) {
			return Err(NameError::UnknownCategory(unknown.to_owned()));
		}
		for category in input.selector_categories().filter(|c| self.config.category(c).is_none()) {
			debug!("ignoring selectors for unregistered category '{category}'");
		}

		let capitalize = input.capitalize.unwrap_or(self.config.capitalize());
		let mut fragments: HashMap<&str, String> = HashMap::new();

		for placeholder in template.placeholders() {
			let category = self
				.config
				.category(placeholder)
				.ok_or_else(|| NameError::UnknownCategory(placeholder.to_owned()))?;
			let name_source = category
				.resolve(input.selectors(placeholder), rng)
				.ok_or_else(|| NameError::InvalidConfig(format!("category '{placeholder}' has no source")))?;

			let record = sample(name_source, self.config.format(), self.config.exhaustion_policy(), rng)?;
			let rules = self.config.rules(placeholder).iter().chain(input.extra_rules(placeholder));
			let fragment = format_fragment(&record.name, rules, capitalize);
			debug!("{placeholder}: {} -> {fragment} (from {})", record.name, name_source.key());

			fragments.insert(placeholder, fragment);
		}

		template
			.render(|name| fragments.get(name).map(String::as_str))
			.ok_or_else(|| NameError::InvalidTemplate {
				template: template.as_str().to_owned(),
				reason: "unresolved placeholder".to_owned(),
			})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::config::{GIVEN, SURNAME};
	use crate::model::formatter::RepairRule;
	use crate::model::source::MemorySource;
	use rand::SeedableRng;
	use rand::rngs::StdRng;
	use std::sync::Arc;

	fn generator() -> NameGenerator {
		let config = Configuration::builder()
			.source(GIVEN, "male", Arc::new(MemorySource::new("male", "name,cumulative_frequency\nJAMES,50\nJOHN,100\n")))
			.source(GIVEN, "female", Arc::new(MemorySource::new("female", "name,cumulative_frequency\nMARY,50\nPATRICIA,100\n")))
			.source(SURNAME, "2000", Arc::new(MemorySource::new("surnames", "name,cumulative_frequency\nONEILL,50\nMCDONALD,100\n")))
			.build()
			.unwrap();
		NameGenerator::new(config)
	}

	#[test]
	fn generates_given_and_surname() {
		let generator = generator();
		let mut rng = StdRng::seed_from_u64(5);
		let name = generator.generate_with_rng(&GenerateInput::new(), &mut rng).unwrap();

		let (given, surname) = name.split_once(' ').unwrap();
		assert!(["James", "John", "Mary", "Patricia"].contains(&given));
		assert!(["O'Neill", "McDonald"].contains(&surname));
	}

	#[test]
	fn repeated_placeholder_reuses_fragment() {
		let generator = generator();
		let input = GenerateInput::new().with_template("{surname}-{surname}");
		let name = generator.generate(&input).unwrap();
		let (left, right) = name.split_once('-').unwrap();
		assert_eq!(left, right);
	}

	#[test]
	fn capitalization_can_be_disabled_per_call() {
		let generator = generator();
		let input = GenerateInput::new().with_template("{given}").with_capitalize(false);
		for _ in 0..20 {
			let name = generator.generate(&input).unwrap();
			assert_eq!(name, name.to_uppercase());
		}
	}

	#[test]
	fn extra_rules_run_after_built_in_ones() {
		let generator = generator();
		// Sees "O'Neill" / "McDonald", never the raw fragment
		let rule = RepairRule::new(r"^(O'|Mc)", |caps| format!("[{}]", &caps[1])).unwrap();
		let input = GenerateInput::new().with_template("{surname}").with_rule(SURNAME, rule);
		for _ in 0..20 {
			let name = generator.generate(&input).unwrap();
			assert!(name == "[O']Neill" || name == "[Mc]Donald", "{name}");
		}
	}

	#[test]
	fn extra_rules_for_unknown_category_are_rejected() {
		let generator = generator();
		let rule = RepairRule::new("x", |_| String::new()).unwrap();
		let input = GenerateInput::new().with_rule("middle", rule);
		let err = generator.generate(&input).unwrap_err();
		assert!(matches!(err, NameError::UnknownCategory(ref c) if c == "middle"));
	}

	#[test]
	fn selectors_for_unknown_category_are_ignored() {
		let generator = generator();
		let input = GenerateInput::new().with_selector("middle", "any");
		assert!(generator.generate(&input).is_ok());
	}

	#[test]
	fn census_requires_a_directory() {
		let err = NameGenerator::census("/nonexistent/census").unwrap_err();
		assert!(err.is_configuration_error());
	}
}
