use serde::{Deserialize, Serialize};

/// One row of a frequency-ranked name list.
///
/// `cumulative_frequency` is a percentage in `0..=100`, non-decreasing
/// from one record to the next within a source.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct NameRecord {
	pub name: String,
	pub cumulative_frequency: f64,
}

impl NameRecord {
	pub fn new(name: &str, cumulative_frequency: f64) -> Self {
		Self {
			name: name.to_owned(),
			cumulative_frequency,
		}
	}
}

/// Layout of a delimited name table.
///
/// A header row is required. Only the name and cumulative frequency
/// columns are read, any other column is ignored.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TableFormat {
	pub delimiter: u8,
	pub name_column: String,
	pub frequency_column: String,
}

impl Default for TableFormat {
	fn default() -> Self {
		Self {
			delimiter: b',',
			name_column: "name".to_owned(),
			frequency_column: "cumulative_frequency".to_owned(),
		}
	}
}
