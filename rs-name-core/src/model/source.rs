use std::fmt;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use csv::{ReaderBuilder, StringRecord};

use crate::error::{NameError, Result};
use crate::io::source_key;
use super::record::{NameRecord, TableFormat};

/// Records of a source, in file order.
pub type Records<'a> = Box<dyn Iterator<Item = Result<NameRecord>> + 'a>;

/// A readable tabular name source.
///
/// Every call to [`RecordSource::records`] starts again from the first
/// record: file sources reopen their file, stream sources rewind their
/// cursor. The sampler therefore never needs to know what storage backs
/// a source.
pub trait RecordSource: fmt::Debug + Send + Sync {
	/// Stable identifier of the source (file path or logical id).
	fn key(&self) -> &str;

	/// Returns the records from the start of the source.
	fn records(&self, format: &TableFormat) -> Result<Records<'_>>;
}

/// Parses delimited text into name records.
///
/// Header names are matched after trimming whitespace and any byte order mark.
pub(crate) fn read_records<'a, R: Read + 'a>(key: &str, reader: R, format: &TableFormat) -> Result<Records<'a>> {
	let mut csv_reader = ReaderBuilder::new()
		.delimiter(format.delimiter)
		.has_headers(true)
		.from_reader(reader);

	let headers = csv_reader
		.headers()
		.map_err(|error| NameError::Csv { source_key: key.to_owned(), error })?
		.clone();
	let name_index = column_index(&headers, &format.name_column, key)?;
	let frequency_index = column_index(&headers, &format.frequency_column, key)?;

	let key = key.to_owned();
	Ok(Box::new(csv_reader.into_records().map(move |row| {
		let row = row.map_err(|error| NameError::Csv { source_key: key.clone(), error })?;
		parse_row(&key, &row, name_index, frequency_index)
	})))
}

fn column_index(headers: &StringRecord, column: &str, key: &str) -> Result<usize> {
	headers
		.iter()
		.position(|header| header.trim().trim_matches('\u{feff}') == column)
		.ok_or_else(|| NameError::MissingColumn {
			source_key: key.to_owned(),
			column: column.to_owned(),
		})
}

fn parse_row(key: &str, row: &StringRecord, name_index: usize, frequency_index: usize) -> Result<NameRecord> {
	let line = row.position().map(|p| p.line()).unwrap_or_default();
	let invalid = |reason: String| NameError::InvalidRecord {
		source_key: key.to_owned(),
		line,
		reason,
	};

	let name = row
		.get(name_index)
		.ok_or_else(|| invalid("missing name field".to_owned()))?;
	let raw = row
		.get(frequency_index)
		.ok_or_else(|| invalid("missing cumulative frequency field".to_owned()))?;

	let cumulative_frequency: f64 = raw
		.trim()
		.parse()
		.map_err(|_| invalid(format!("cannot parse cumulative frequency '{raw}'")))?;
	if !cumulative_frequency.is_finite() {
		return Err(invalid(format!("cumulative frequency '{raw}' is not finite")));
	}

	Ok(NameRecord {
		name: name.trim().to_owned(),
		cumulative_frequency,
	})
}

/// A name table on the filesystem, reopened on every scan.
#[derive(Debug, Clone)]
pub struct FileSource {
	key: String,
	path: PathBuf,
}

impl FileSource {
	pub fn new<P: AsRef<Path>>(path: P) -> Self {
		Self {
			key: source_key(&path),
			path: path.as_ref().to_path_buf(),
		}
	}

	pub fn path(&self) -> &Path {
		&self.path
	}
}

impl RecordSource for FileSource {
	fn key(&self) -> &str {
		&self.key
	}

	fn records(&self, format: &TableFormat) -> Result<Records<'_>> {
		let file = File::open(&self.path).map_err(|error| NameError::MissingResource {
			key: self.key.clone(),
			error,
		})?;
		read_records(&self.key, file, format)
	}
}

/// A name table held as text in memory (embedded data, tests).
#[derive(Debug, Clone)]
pub struct MemorySource {
	key: String,
	data: Arc<str>,
}

impl MemorySource {
	pub fn new(key: &str, data: &str) -> Self {
		Self {
			key: key.to_owned(),
			data: Arc::from(data),
		}
	}
}

impl RecordSource for MemorySource {
	fn key(&self) -> &str {
		&self.key
	}

	fn records(&self, format: &TableFormat) -> Result<Records<'_>> {
		read_records(&self.key, self.data.as_bytes(), format)
	}
}

/// A name table behind a shared, seekable stream.
///
/// The stream has a single cursor, so each scan takes the lock, rewinds to
/// the start and keeps the lock until the returned records are dropped.
/// Concurrent samplers on the same source are serialized.
pub struct StreamSource<R> {
	key: String,
	stream: Mutex<R>,
}

impl<R: Read + Seek + Send> StreamSource<R> {
	pub fn new(key: &str, stream: R) -> Self {
		Self {
			key: key.to_owned(),
			stream: Mutex::new(stream),
		}
	}
}

impl<R> fmt::Debug for StreamSource<R> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("StreamSource").field("key", &self.key).finish_non_exhaustive()
	}
}

/// Read access to a locked stream.
struct LockedStream<'a, R> {
	guard: MutexGuard<'a, R>,
}

impl<R: Read> Read for LockedStream<'_, R> {
	fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
		self.guard.read(buf)
	}
}

impl<R: Read + Seek + Send> RecordSource for StreamSource<R> {
	fn key(&self) -> &str {
		&self.key
	}

	fn records(&self, format: &TableFormat) -> Result<Records<'_>> {
		let mut guard = self
			.stream
			.lock()
			.map_err(|_| io::Error::other(format!("stream lock poisoned for '{}'", self.key)))?;
		guard.seek(SeekFrom::Start(0))?;
		read_records(&self.key, LockedStream { guard }, format)
	}
}
