use std::io;

/// Every failure the name generator can report.
///
/// Variants fall in two families:
/// - configuration errors, raised at the point of misuse (bad template,
///   unknown category, invalid rule pattern...)
/// - data errors, raised while reading or sampling a name source
///
/// Use [`NameError::is_configuration_error`] to tell them apart.
#[derive(Debug, thiserror::Error)]
pub enum NameError {
	/// A template placeholder or a rule set names a category that has no source.
	#[error("unknown category '{0}'")]
	UnknownCategory(String),

	/// The template could not be parsed.
	#[error("invalid template '{template}': {reason}")]
	InvalidTemplate { template: String, reason: String },

	/// The configuration is inconsistent (no sources, bad maximum frequency...).
	#[error("invalid configuration: {0}")]
	InvalidConfig(String),

	/// A repair rule pattern failed to compile.
	#[error("invalid repair pattern: {0}")]
	InvalidPattern(#[from] regex::Error),

	/// The draw exceeded every cumulative frequency of the source.
	///
	/// Root cause is a maximum frequency set higher than the data supports.
	#[error("sample exhausted in '{source_key}': draw {draw} exceeds highest cumulative frequency {highest:?}")]
	ExhaustedSample {
		source_key: String,
		draw: f64,
		highest: Option<f64>,
	},

	/// The backing resource of a source could not be opened.
	#[error("missing resource '{key}': {error}")]
	MissingResource {
		key: String,
		#[source]
		error: io::Error,
	},

	/// A required column is absent from the header row.
	#[error("source '{source_key}' has no '{column}' column")]
	MissingColumn { source_key: String, column: String },

	/// A row could not be interpreted as a name record.
	#[error("source '{source_key}', line {line}: {reason}")]
	InvalidRecord {
		source_key: String,
		line: u64,
		reason: String,
	},

	/// Cumulative frequencies decrease between two successive rows.
	#[error("source '{source_key}', line {line}: cumulative frequency {current} is lower than previous {previous}")]
	UnsortedSource {
		source_key: String,
		line: u64,
		previous: f64,
		current: f64,
	},

	#[error("csv error in '{source_key}': {error}")]
	Csv {
		source_key: String,
		#[source]
		error: csv::Error,
	},

	/// Binary table cache could not be encoded or decoded.
	#[error("table cache error: {0}")]
	Cache(#[from] postcard::Error),

	#[error(transparent)]
	Io(#[from] io::Error),
}

impl NameError {
	/// Returns `true` for errors caused by how the generator was configured
	/// or called, as opposed to errors coming from the name data.
	pub fn is_configuration_error(&self) -> bool {
		matches!(
			self,
			NameError::UnknownCategory(_)
				| NameError::InvalidTemplate { .. }
				| NameError::InvalidConfig(_)
				| NameError::InvalidPattern(_)
		)
	}
}

pub type Result<T, E = NameError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn classifies_configuration_errors() {
		assert!(NameError::UnknownCategory("middle".to_owned()).is_configuration_error());
		assert!(NameError::InvalidConfig("empty".to_owned()).is_configuration_error());

		let exhausted = NameError::ExhaustedSample {
			source_key: "surname".to_owned(),
			draw: 99.0,
			highest: Some(90.0),
		};
		assert!(!exhausted.is_configuration_error());
	}

	#[test]
	fn unknown_category_message_names_the_category() {
		let err = NameError::UnknownCategory("middle".to_owned());
		assert_eq!(err.to_string(), "unknown category 'middle'");
	}
}
