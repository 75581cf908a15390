use std::path::{Path, PathBuf};
use std::{env, fs, io};

/// Builds a sibling path of `input_path` with a new extension.
///
/// Example:
/// `data/dist.all.last.2000.csv` + `"bin"` → `data/dist.all.last.2000.bin`
pub(crate) fn build_output_path<P: AsRef<Path>>(
	input_path: P,
	output_extension: &str,
) -> io::Result<PathBuf> {
	let input_path = input_path.as_ref();

	// Only the last extension is swapped: census files carry dots in their stem
	if input_path.file_stem().is_none() {
		return Err(io::Error::new(io::ErrorKind::InvalidInput, "Input path has no filename"));
	}

	Ok(input_path.with_extension(output_extension))
}

/// Returns the stable key of a file-backed source: its path as written.
///
/// Examples:
/// - `"./data/dist.male.first.1990.csv"` → `"./data/dist.male.first.1990.csv"`
pub(crate) fn source_key<P: AsRef<Path>>(path: P) -> String {
	path.as_ref().to_string_lossy().to_string()
}

/// Normalize a folder path.
///
/// - `"."` or `"./"` resolves to the current working directory
/// - Other paths are returned as-is (not canonicalized)
pub fn normalize_folder(input: &str) -> PathBuf {
	if input == "." || input == "./" {
		env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
	} else {
		PathBuf::from(input)
	}
}

/// Lists all files with a given extension in a directory.
///
/// Returns file names only (no paths), sorted.
pub fn list_files<P: AsRef<Path>>(dir: P, extension: &str) -> io::Result<Vec<String>> {
	let mut files = Vec::new();

	for entry in fs::read_dir(dir)? {
		let entry = entry?;
		let path = entry.path();

		if path.is_file() && path.extension() == Some(std::ffi::OsStr::new(extension)) {
			if let Some(name) = path.file_name() {
				files.push(name.to_string_lossy().to_string());
			}
		}
	}

	files.sort();
	Ok(files)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn output_path_swaps_extension() {
		let path = build_output_path("data/dist.all.last.2000.csv", "bin").unwrap();
		assert_eq!(path, PathBuf::from("data/dist.all.last.2000.bin"));
	}

	#[test]
	fn lists_only_matching_extension() {
		let dir = tempfile::tempdir().unwrap();
		fs::write(dir.path().join("b.csv"), "name,cumulative_frequency\n").unwrap();
		fs::write(dir.path().join("a.csv"), "name,cumulative_frequency\n").unwrap();
		fs::write(dir.path().join("a.bin"), [0u8]).unwrap();

		let files = list_files(dir.path(), "csv").unwrap();
		assert_eq!(files, vec!["a.csv".to_owned(), "b.csv".to_owned()]);
	}
}
