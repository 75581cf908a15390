use std::fs;
use std::path::Path;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{NameError, Result};
use crate::io::{build_output_path, source_key};
use super::record::{NameRecord, TableFormat};
use super::source::{FileSource, RecordSource, Records};

/// A name table fully loaded in memory.
///
/// Loading validates the whole table once: cumulative frequencies must be
/// non-decreasing. Later scans iterate the in-memory records instead of
/// reparsing the backing file.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct NameTable {
	key: String,
	records: Vec<NameRecord>,
}

impl NameTable {
	/// Builds a table from records already in memory.
	///
	/// # Errors
	/// Returns `UnsortedSource` if cumulative frequencies decrease.
	pub fn from_records(key: &str, records: Vec<NameRecord>) -> Result<Self> {
		check_sorted(key, &records)?;
		Ok(Self { key: key.to_owned(), records })
	}

	/// Reads every record of `source` into a new table.
	pub fn from_source(source: &dyn RecordSource, format: &TableFormat) -> Result<Self> {
		let records = source.records(format)?.collect::<Result<Vec<_>>>()?;
		Self::from_records(source.key(), records)
	}

	/// Loads a table from a delimited file, using a binary cache if fresh.
	///
	/// - If `<stem>.bin` next to `filepath` is at least as recent as the
	///   delimited file and was built with the same `format`, it is decoded
	///   with `postcard`.
	/// - Otherwise the delimited file is parsed.
	pub fn load<P: AsRef<Path>>(filepath: P, format: &TableFormat) -> Result<Self> {
		Self::load_inner(&filepath, format).map(|(table, _)| table)
	}

	/// Same as [`NameTable::load`], but rewrites the binary cache whenever the
	/// delimited file had to be parsed, so the next load skips it.
	///
	/// A cache that cannot be written is logged and otherwise ignored.
	pub fn load_cached<P: AsRef<Path>>(filepath: P, format: &TableFormat) -> Result<Self> {
		let (table, from_cache) = Self::load_inner(&filepath, format)?;
		if !from_cache {
			let binary_data_path = build_output_path(&filepath, "bin")?;
			let cached = CachedTable { format: format.clone(), table };
			let bytes = postcard::to_stdvec(&cached)?;
			if let Err(e) = fs::write(&binary_data_path, bytes) {
				warn!("cannot write table cache {}: {e}", binary_data_path.display());
			}
			return Ok(cached.table);
		}
		Ok(table)
	}

	fn load_inner<P: AsRef<Path>>(filepath: P, format: &TableFormat) -> Result<(Self, bool)> {
		let binary_data_path = build_output_path(&filepath, "bin")?;
		if cache_is_fresh(filepath.as_ref(), &binary_data_path) {
			let bytes = fs::read(&binary_data_path)?;
			let cached: CachedTable = postcard::from_bytes(&bytes)?;
			if cached.format == *format {
				let mut table = cached.table;
				check_sorted(&table.key, &table.records)?;
				table.key = source_key(&filepath);
				info!("loaded {} records from cache {}", table.records.len(), binary_data_path.display());
				return Ok((table, true));
			}
			debug!("cache {} built with another table format, reparsing", binary_data_path.display());
		}

		let table = Self::from_source(&FileSource::new(&filepath), format)?;
		info!("loaded {} records from {}", table.records.len(), table.key);
		Ok((table, false))
	}

	pub fn len(&self) -> usize {
		self.records.len()
	}

	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}

	/// Highest cumulative frequency present in the table.
	pub fn max_cumulative_frequency(&self) -> Option<f64> {
		self.records.last().map(|r| r.cumulative_frequency)
	}
}

impl RecordSource for NameTable {
	fn key(&self) -> &str {
		&self.key
	}

	fn records(&self, _format: &TableFormat) -> Result<Records<'_>> {
		Ok(Box::new(self.records.iter().cloned().map(Ok)))
	}
}

/// On-disk cache payload: the table and the format it was parsed with.
#[derive(Serialize, Deserialize)]
struct CachedTable {
	format: TableFormat,
	table: NameTable,
}

/// A cache is fresh if it exists and is not older than its delimited file.
/// Without a delimited file, an existing cache is the only copy and is used.
fn cache_is_fresh(filepath: &Path, binary_data_path: &Path) -> bool {
	let Ok(cache_modified) = fs::metadata(binary_data_path).and_then(|m| m.modified()) else {
		return false;
	};
	match fs::metadata(filepath).and_then(|m| m.modified()) {
		Ok(table_modified) => cache_modified >= table_modified,
		Err(_) => true,
	}
}

fn check_sorted(key: &str, records: &[NameRecord]) -> Result<()> {
	for (i, pair) in records.windows(2).enumerate() {
		if pair[1].cumulative_frequency < pair[0].cumulative_frequency {
			return Err(NameError::UnsortedSource {
				source_key: key.to_owned(),
				// header is line 1, first record line 2
				line: i as u64 + 3,
				previous: pair[0].cumulative_frequency,
				current: pair[1].cumulative_frequency,
			});
		}
	}
	Ok(())
}
