use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{info, warn};

use crate::error::{NameError, Result};
use crate::io::source_key;
use super::category::Category;
use super::formatter::{RepairRule, surname_rules};
use super::record::TableFormat;
use super::sampler::{ExhaustionPolicy, NameSource};
use super::source::{FileSource, RecordSource};
use super::table::NameTable;
use super::template::Template;

pub const DEFAULT_TEMPLATE: &str = "{given} {surname}";

/// Maximum frequency of any source without an explicit value.
pub const DEFAULT_MAX_FREQUENCY: f64 = 100.0;

pub const GIVEN: &str = "given";
pub const SURNAME: &str = "surname";

// US census name lists
pub const SURNAME_2000: &str = "dist.all.last.2000.csv";
pub const SURNAME_1990: &str = "dist.all.last.1990.csv";
pub const MALE_FIRST_1990: &str = "dist.male.first.1990.csv";
pub const FEMALE_FIRST_1990: &str = "dist.female.first.1990.csv";

// The census lists stop short of 100%: drawing above these would over-pick
// the rarest listed names.
pub const SURNAME_2000_MAX: f64 = 89.75356;
pub const SURNAME_1990_MAX: f64 = 90.483;
pub const MALE_FIRST_1990_MAX: f64 = 90.040;
pub const FEMALE_FIRST_1990_MAX: f64 = 90.024;

/// Immutable generator configuration.
///
/// Built once through [`ConfigBuilder`]; every invariant is checked there:
/// - at least one category, each with at least one source
/// - every maximum frequency is finite and positive
/// - the template only references registered categories
/// - rules are only attached to registered categories
#[derive(Clone, Debug)]
pub struct Configuration {
	categories: BTreeMap<String, Category>,
	template: Template,
	format: TableFormat,
	rules: BTreeMap<String, Vec<RepairRule>>,
	capitalize: bool,
	exhaustion: ExhaustionPolicy,
}

impl Configuration {
	pub fn builder() -> ConfigBuilder {
		ConfigBuilder::default()
	}

	pub fn category(&self, name: &str) -> Option<&Category> {
		self.categories.get(name)
	}

	pub fn categories(&self) -> impl Iterator<Item = &Category> {
		self.categories.values()
	}

	pub fn template(&self) -> &Template {
		&self.template
	}

	pub fn format(&self) -> &TableFormat {
		&self.format
	}

	/// Configured repair rules of `category`, in application order.
	pub fn rules(&self, category: &str) -> &[RepairRule] {
		self.rules.get(category).map(Vec::as_slice).unwrap_or_default()
	}

	pub fn capitalize(&self) -> bool {
		self.capitalize
	}

	pub fn exhaustion_policy(&self) -> ExhaustionPolicy {
		self.exhaustion
	}

	/// Maximum frequency of the source registered under `key`.
	pub fn max_frequency(&self, key: &str) -> Option<f64> {
		self.categories
			.values()
			.flat_map(Category::sources)
			.find(|source| source.key() == key)
			.map(NameSource::max_frequency)
	}

	/// Checks that every placeholder of `template` is a registered category.
	pub(crate) fn check_template(&self, template: &Template) -> Result<()> {
		match template.placeholders().into_iter().find(|name| !self.categories.contains_key(*name)) {
			Some(unknown) => Err(NameError::UnknownCategory(unknown.to_owned())),
			None => Ok(()),
		}
	}
}

#[derive(Debug)]
enum PendingSource {
	Ready(Arc<dyn RecordSource>),
	File(PathBuf),
}

/// Builder of [`Configuration`].
///
/// Defaults:
/// - template `"{given} {surname}"`
/// - comma-delimited tables with `name` and `cumulative_frequency` columns
/// - maximum frequency 100 for every source
/// - built-in `O'`, `St.` and `Mc` repairs on the `surname` category
/// - capitalization on, exhausted samples fail
#[derive(Debug)]
pub struct ConfigBuilder {
	sources: Vec<(String, String, PendingSource)>,
	max_frequencies: HashMap<String, f64>,
	template: String,
	format: TableFormat,
	rules: BTreeMap<String, Vec<RepairRule>>,
	default_rules: bool,
	capitalize: bool,
	exhaustion: ExhaustionPolicy,
	preload: bool,
}

impl Default for ConfigBuilder {
	fn default() -> Self {
		Self {
			sources: Vec::new(),
			max_frequencies: HashMap::new(),
			template: DEFAULT_TEMPLATE.to_owned(),
			format: TableFormat::default(),
			rules: BTreeMap::new(),
			default_rules: true,
			capitalize: true,
			exhaustion: ExhaustionPolicy::default(),
			preload: false,
		}
	}
}

impl ConfigBuilder {
	/// The US census layout, with tables expected in `data_dir`:
	/// - `given`: `male` and `female` 1990 first names
	/// - `surname`: `2000` last names
	///
	/// The 1990 last names are left out: they are dated and not drawn from a
	/// random sample. Register [`SURNAME_1990`] explicitly to use them.
	pub fn census<P: AsRef<Path>>(data_dir: P) -> Self {
		let data_dir = data_dir.as_ref();
		let mut builder = Self::default();
		for (category, selector, file, max) in [
			(GIVEN, "male", MALE_FIRST_1990, MALE_FIRST_1990_MAX),
			(GIVEN, "female", FEMALE_FIRST_1990, FEMALE_FIRST_1990_MAX),
			(SURNAME, "2000", SURNAME_2000, SURNAME_2000_MAX),
		] {
			let path = data_dir.join(file);
			builder = builder.max_frequency(&source_key(&path), max).file(category, selector, path);
		}
		builder
	}

	pub fn template(mut self, template: &str) -> Self {
		self.template = template.to_owned();
		self
	}

	pub fn capitalize(mut self, capitalize: bool) -> Self {
		self.capitalize = capitalize;
		self
	}

	pub fn delimiter(mut self, delimiter: u8) -> Self {
		self.format.delimiter = delimiter;
		self
	}

	pub fn name_column(mut self, column: &str) -> Self {
		self.format.name_column = column.to_owned();
		self
	}

	pub fn frequency_column(mut self, column: &str) -> Self {
		self.format.frequency_column = column.to_owned();
		self
	}

	pub fn exhaustion_policy(mut self, policy: ExhaustionPolicy) -> Self {
		self.exhaustion = policy;
		self
	}

	/// Loads file tables into memory at build time instead of rescanning
	/// the file on every draw.
	pub fn preload(mut self, preload: bool) -> Self {
		self.preload = preload;
		self
	}

	/// Registers `source` under `category` / `selector`.
	pub fn source(mut self, category: &str, selector: &str, source: Arc<dyn RecordSource>) -> Self {
		self.sources.push((category.to_owned(), selector.to_owned(), PendingSource::Ready(source)));
		self
	}

	/// Registers a delimited file under `category` / `selector`.
	///
	/// The source key is the path as given.
	pub fn file<P: AsRef<Path>>(mut self, category: &str, selector: &str, path: P) -> Self {
		self.sources.push((
			category.to_owned(),
			selector.to_owned(),
			PendingSource::File(path.as_ref().to_path_buf()),
		));
		self
	}

	/// Sets the maximum frequency drawn for the source with key `key`.
	pub fn max_frequency(mut self, key: &str, max_frequency: f64) -> Self {
		self.max_frequencies.insert(key.to_owned(), max_frequency);
		self
	}

	/// Replaces the repair rules of `category`.
	pub fn rules(mut self, category: &str, rules: Vec<RepairRule>) -> Self {
		self.rules.insert(category.to_owned(), rules);
		self
	}

	/// Drops the built-in surname repairs.
	pub fn no_default_rules(mut self) -> Self {
		self.default_rules = false;
		self
	}

	/// Validates and freezes the configuration.
	///
	/// # Errors
	/// - `InvalidConfig` if no source is registered or a maximum frequency is
	///   not a positive number
	/// - `InvalidTemplate` / `UnknownCategory` for a bad template
	/// - `UnknownCategory` for rules attached to an unregistered category
	/// - any load error when preloading tables
	pub fn build(self) -> Result<Configuration> {
		if self.sources.is_empty() {
			return Err(NameError::InvalidConfig("no name source registered".to_owned()));
		}

		let mut categories: BTreeMap<String, Category> = BTreeMap::new();
		for (category, selector, pending) in self.sources {
			let source: Arc<dyn RecordSource> = match pending {
				PendingSource::Ready(source) => source,
				PendingSource::File(path) if self.preload => Arc::new(NameTable::load_cached(&path, &self.format)?),
				PendingSource::File(path) => Arc::new(FileSource::new(&path)),
			};

			let max_frequency = self
				.max_frequencies
				.get(source.key())
				.copied()
				.unwrap_or(DEFAULT_MAX_FREQUENCY);
			let name_source = NameSource::new(source, max_frequency)?;

			categories
				.entry(category.clone())
				.or_insert_with(|| Category::new(&category))
				.insert(&selector, name_source);
		}

		for key in self.max_frequencies.keys() {
			let registered = categories.values().flat_map(Category::sources).any(|s| s.key() == key);
			if !registered {
				warn!("maximum frequency set for unregistered source '{key}'");
			}
		}

		let mut rules = BTreeMap::new();
		if self.default_rules && categories.contains_key(SURNAME) {
			rules.insert(SURNAME.to_owned(), surname_rules()?);
		}
		for (category, category_rules) in self.rules {
			if !categories.contains_key(&category) {
				return Err(NameError::UnknownCategory(category));
			}
			rules.insert(category, category_rules);
		}

		let configuration = Configuration {
			categories,
			template: Template::parse(&self.template)?,
			format: self.format,
			rules,
			capitalize: self.capitalize,
			exhaustion: self.exhaustion,
		};
		configuration.check_template(&configuration.template)?;

		info!(
			"configuration built: {} categories, template '{}'",
			configuration.categories.len(),
			configuration.template.as_str()
		);
		Ok(configuration)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::source::MemorySource;

	fn memory(key: &str) -> Arc<dyn RecordSource> {
		Arc::new(MemorySource::new(key, "name,cumulative_frequency\nSMITH,100\n"))
	}

	fn two_categories() -> ConfigBuilder {
		Configuration::builder()
			.source(GIVEN, "female", memory("female"))
			.source(SURNAME, "2000", memory("surnames"))
	}

	#[test]
	fn defaults_apply() {
		let config = two_categories().build().unwrap();
		assert_eq!(config.template().as_str(), DEFAULT_TEMPLATE);
		assert!(config.capitalize());
		assert_eq!(config.max_frequency("surnames"), Some(DEFAULT_MAX_FREQUENCY));
		assert_eq!(config.rules(SURNAME).len(), 3);
		assert!(config.rules(GIVEN).is_empty());
		assert_eq!(config.exhaustion_policy(), ExhaustionPolicy::Fail);
	}

	#[test]
	fn census_layout_uses_known_maxima() {
		let config = ConfigBuilder::census("data").build().unwrap();
		let given = config.category(GIVEN).unwrap();
		assert_eq!(given.selectors().collect::<Vec<_>>(), vec!["female", "male"]);

		let surname_key = source_key(Path::new("data").join(SURNAME_2000));
		assert_eq!(config.max_frequency(&surname_key), Some(SURNAME_2000_MAX));
	}

	#[test]
	fn no_source_is_invalid() {
		let err = Configuration::builder().build().unwrap_err();
		assert!(matches!(err, NameError::InvalidConfig(_)));
	}

	#[test]
	fn template_with_unknown_category_is_rejected() {
		let err = two_categories().template("{given} {middle}").build().unwrap_err();
		assert!(matches!(err, NameError::UnknownCategory(ref name) if name == "middle"));
	}

	#[test]
	fn rules_for_unknown_category_are_rejected() {
		let err = two_categories().rules("middle", Vec::new()).build().unwrap_err();
		assert!(matches!(err, NameError::UnknownCategory(_)));
	}

	#[test]
	fn non_positive_max_frequency_is_rejected() {
		for max in [0.0, -5.0, f64::NAN] {
			let err = two_categories().max_frequency("surnames", max).build().unwrap_err();
			assert!(matches!(err, NameError::InvalidConfig(_)), "{max} should be rejected");
		}
	}

	#[test]
	fn default_rules_can_be_dropped() {
		let config = two_categories().no_default_rules().build().unwrap();
		assert!(config.rules(SURNAME).is_empty());
	}

	#[test]
	fn preload_reports_missing_files() {
		let err = Configuration::builder()
			.file(SURNAME, "2000", "/nonexistent/dist.all.last.2000.csv")
			.template("{surname}")
			.preload(true)
			.build()
			.unwrap_err();
		assert!(matches!(err, NameError::MissingResource { .. }));
	}
}
