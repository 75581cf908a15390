use std::sync::Arc;

use log::{debug, warn};
use rand::Rng;

use crate::error::{NameError, Result};
use super::record::{NameRecord, TableFormat};
use super::source::RecordSource;

/// What to do when a draw exceeds every cumulative frequency of a source.
///
/// This only happens when a source's maximum frequency is set higher than
/// its data supports.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum ExhaustionPolicy {
	/// Report `NameError::ExhaustedSample`.
	#[default]
	Fail,
	/// Draw again, up to `attempts` more times, then fail.
	Retry { attempts: usize },
	/// Return the last record of the source.
	LastRecord,
}

/// A record source together with the maximum cumulative frequency to draw from.
///
/// The maximum is a configuration value, usually below 100: name lists do not
/// contain every name, and drawing above the listed share would over-pick the
/// rarest entries.
#[derive(Clone, Debug)]
pub struct NameSource {
	source: Arc<dyn RecordSource>,
	max_frequency: f64,
}

impl NameSource {
	/// # Errors
	/// Returns `InvalidConfig` unless `max_frequency` is finite and positive.
	pub fn new(source: Arc<dyn RecordSource>, max_frequency: f64) -> Result<Self> {
		if !max_frequency.is_finite() || max_frequency <= 0.0 {
			return Err(NameError::InvalidConfig(format!(
				"maximum frequency of '{}' must be a positive number, got {max_frequency}",
				source.key()
			)));
		}
		Ok(Self { source, max_frequency })
	}

	pub fn key(&self) -> &str {
		self.source.key()
	}

	pub fn max_frequency(&self) -> f64 {
		self.max_frequency
	}

	pub fn source(&self) -> &dyn RecordSource {
		self.source.as_ref()
	}
}

/// Outcome of scanning a source for a given draw.
#[derive(Debug, PartialEq)]
pub enum Pick {
	/// First record whose cumulative frequency reaches the draw.
	Found(NameRecord),
	/// No record reached the draw; carries the last record seen, if any.
	Exhausted(Option<NameRecord>),
}

/// Scans `source` in order and returns the first record with
/// `cumulative_frequency >= frequency`.
///
/// Successive records are checked to be non-decreasing up to the match.
///
/// # Errors
/// - Read errors from the source.
/// - `UnsortedSource` if a record's frequency is lower than the previous one.
pub fn pick_frequency_record(source: &dyn RecordSource, format: &TableFormat, frequency: f64) -> Result<Pick> {
	let mut last: Option<NameRecord> = None;

	// header is line 1
	for (i, record) in source.records(format)?.enumerate() {
		let record = record?;
		if let Some(previous) = &last {
			if record.cumulative_frequency < previous.cumulative_frequency {
				return Err(NameError::UnsortedSource {
					source_key: source.key().to_owned(),
					line: i as u64 + 2,
					previous: previous.cumulative_frequency,
					current: record.cumulative_frequency,
				});
			}
		}
		if record.cumulative_frequency >= frequency {
			return Ok(Pick::Found(record));
		}
		last = Some(record);
	}

	Ok(Pick::Exhausted(last))
}

/// Draws a weighted random record from a name source.
///
/// The draw is uniform over `[0, max_frequency]`; mapping it into the
/// cumulative frequencies makes each name as likely as its own frequency.
pub fn sample<R: Rng + ?Sized>(
	name_source: &NameSource,
	format: &TableFormat,
	policy: ExhaustionPolicy,
	rng: &mut R,
) -> Result<NameRecord> {
	let retries = match policy {
		ExhaustionPolicy::Retry { attempts } => attempts,
		_ => 0,
	};

	let mut attempt = 0;
	loop {
		let draw = rng.random_range(0.0..=name_source.max_frequency);
		debug!("drawing {draw:.5} from {}", name_source.key());

		match pick_frequency_record(name_source.source(), format, draw)? {
			Pick::Found(record) => return Ok(record),
			Pick::Exhausted(last) => {
				if policy == ExhaustionPolicy::LastRecord {
					if let Some(record) = last {
						warn!("draw {draw:.5} exhausted {}, using last record", name_source.key());
						return Ok(record);
					}
				}

				if attempt < retries {
					attempt += 1;
					warn!("draw {draw:.5} exhausted {}, retry {attempt}/{retries}", name_source.key());
					continue;
				}

				return Err(NameError::ExhaustedSample {
					source_key: name_source.key().to_owned(),
					draw,
					highest: last.map(|r| r.cumulative_frequency),
				});
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::source::MemorySource;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	fn uniform_source() -> Arc<dyn RecordSource> {
		let mut data = String::from("name,cumulative_frequency\n");
		for i in 1..=10 {
			data.push_str(&format!("NAME{i},{}\n", i * 10));
		}
		Arc::new(MemorySource::new("uniform", &data))
	}

	fn name_of(pick: Pick) -> String {
		match pick {
			Pick::Found(record) => record.name,
			Pick::Exhausted(_) => panic!("expected a record"),
		}
	}

	#[test]
	fn picks_first_record_reaching_the_draw() {
		let source = uniform_source();
		let format = TableFormat::default();
		assert_eq!(name_of(pick_frequency_record(source.as_ref(), &format, 0.0).unwrap()), "NAME1");
		assert_eq!(name_of(pick_frequency_record(source.as_ref(), &format, 10.0).unwrap()), "NAME1");
		assert_eq!(name_of(pick_frequency_record(source.as_ref(), &format, 10.5).unwrap()), "NAME2");
	}

	#[test]
	fn draw_equal_to_maximum_returns_last_record() {
		let source = uniform_source();
		let pick = pick_frequency_record(source.as_ref(), &TableFormat::default(), 100.0).unwrap();
		assert_eq!(name_of(pick), "NAME10");
	}

	#[test]
	fn draw_above_data_is_exhausted() {
		let source = uniform_source();
		let pick = pick_frequency_record(source.as_ref(), &TableFormat::default(), 100.5).unwrap();
		assert_eq!(pick, Pick::Exhausted(Some(NameRecord::new("NAME10", 100.0))));
	}

	#[test]
	fn decreasing_frequencies_are_rejected() {
		let source = MemorySource::new("bad", "name,cumulative_frequency\nA,5\nB,3\nC,9\n");
		let err = pick_frequency_record(&source, &TableFormat::default(), 8.0).unwrap_err();
		assert!(matches!(err, NameError::UnsortedSource { line: 3, .. }));
	}

	#[test]
	fn invalid_max_frequency_is_rejected() {
		for max in [-1.0, 0.0, f64::NAN, f64::INFINITY] {
			let err = NameSource::new(uniform_source(), max).unwrap_err();
			assert!(err.is_configuration_error(), "{max} should be rejected");
		}
	}

	#[test]
	fn uniform_steps_are_drawn_evenly() {
		let name_source = NameSource::new(uniform_source(), 100.0).unwrap();
		let format = TableFormat::default();
		let mut rng = StdRng::seed_from_u64(42);
		let mut counts = std::collections::HashMap::new();

		for _ in 0..10_000 {
			let record = sample(&name_source, &format, ExhaustionPolicy::Fail, &mut rng).unwrap();
			*counts.entry(record.name).or_insert(0usize) += 1;
		}

		assert_eq!(counts.len(), 10);
		for (name, count) in counts {
			assert!((800..=1200).contains(&count), "{name} drawn {count} times");
		}
	}

	#[test]
	fn starved_source_fails_by_default() {
		// Data stops at 100 while draws go up to 1000
		let name_source = NameSource::new(uniform_source(), 1000.0).unwrap();
		let mut rng = StdRng::seed_from_u64(1);

		let mut failures = 0;
		for _ in 0..50 {
			match sample(&name_source, &TableFormat::default(), ExhaustionPolicy::Fail, &mut rng) {
				Err(NameError::ExhaustedSample { highest, draw, .. }) => {
					assert_eq!(highest, Some(100.0));
					assert!(draw > 100.0);
					failures += 1;
				}
				Ok(_) => {}
				Err(other) => panic!("unexpected error {other}"),
			}
		}
		assert!(failures > 0);
	}

	#[test]
	fn starved_source_falls_back_to_last_record() {
		let name_source = NameSource::new(uniform_source(), 1000.0).unwrap();
		let mut rng = StdRng::seed_from_u64(1);

		for _ in 0..50 {
			let record = sample(&name_source, &TableFormat::default(), ExhaustionPolicy::LastRecord, &mut rng).unwrap();
			assert!(record.name.starts_with("NAME"));
		}
	}

	#[test]
	fn retry_recovers_from_occasional_exhaustion() {
		// One draw in ten exceeds the data; 20 retries make failure negligible
		let name_source = NameSource::new(uniform_source(), 110.0).unwrap();
		let mut rng = StdRng::seed_from_u64(3);

		for _ in 0..200 {
			let policy = ExhaustionPolicy::Retry { attempts: 20 };
			assert!(sample(&name_source, &TableFormat::default(), policy, &mut rng).is_ok());
		}
	}

	#[test]
	fn empty_source_is_exhausted_even_with_fallback() {
		let name_source = NameSource::new(Arc::new(MemorySource::new("empty", "name,cumulative_frequency\n")), 100.0).unwrap();
		let mut rng = StdRng::seed_from_u64(0);
		let err = sample(&name_source, &TableFormat::default(), ExhaustionPolicy::LastRecord, &mut rng).unwrap_err();
		assert!(matches!(err, NameError::ExhaustedSample { highest: None, .. }));
	}
}
