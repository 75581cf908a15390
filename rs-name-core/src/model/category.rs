use std::collections::BTreeMap;

use log::debug;
use rand::Rng;
use rand::seq::IndexedRandom;

use super::sampler::NameSource;

/// A named slot of the output (`given`, `surname`...) and its sources.
///
/// Each source is registered under a selector key (`male`, `female`,
/// `2000`...). Selectors are kept ordered so that a seeded generator
/// resolves sources reproducibly.
#[derive(Clone, Debug)]
pub struct Category {
	name: String,
	sources: BTreeMap<String, NameSource>,
}

impl Category {
	pub fn new(name: &str) -> Self {
		Self {
			name: name.to_owned(),
			sources: BTreeMap::new(),
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	/// Registers a source under `selector`, replacing any previous one.
	pub fn insert(&mut self, selector: &str, source: NameSource) {
		self.sources.insert(selector.to_owned(), source);
	}

	pub fn selectors(&self) -> impl Iterator<Item = &str> {
		self.sources.keys().map(String::as_str)
	}

	pub fn get(&self, selector: &str) -> Option<&NameSource> {
		self.sources.get(selector)
	}

	pub fn sources(&self) -> impl Iterator<Item = &NameSource> {
		self.sources.values()
	}

	pub fn is_empty(&self) -> bool {
		self.sources.is_empty()
	}

	/// Picks the source to sample from.
	///
	/// - Requested selectors that exist in the category are candidates,
	///   one is chosen uniformly.
	/// - With no selector requested, or none matching, the choice is uniform
	///   over every source of the category. Unknown selectors are not an error.
	///
	/// Returns `None` only for a category without sources.
	pub fn resolve<R: Rng + ?Sized>(&self, selectors: &[String], rng: &mut R) -> Option<&NameSource> {
		let matching: Vec<&NameSource> = self
			.sources
			.iter()
			.filter(|(selector, _)| selectors.iter().any(|s| s == *selector))
			.map(|(_, source)| source)
			.collect();

		if !matching.is_empty() {
			return matching.choose(rng).copied();
		}

		if !selectors.is_empty() {
			debug!("no selector of {selectors:?} in '{}', choosing among all sources", self.name);
		}
		let all: Vec<&NameSource> = self.sources.values().collect();
		all.choose(rng).copied()
	}
}
