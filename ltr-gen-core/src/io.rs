use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::io;

/// Reads a whole binary file into memory.
pub(crate) fn read_bytes<P: AsRef<Path>>(filename: P) -> io::Result<Vec<u8>> {
	let mut contents = Vec::new();
	File::open(filename)?.read_to_end(&mut contents)?;
	Ok(contents)
}

/// Builds an output path based on an input path and a new extension.
///
/// Example:
/// `data/names.ltr` + `"bin"` → `data/names.bin`
pub(crate) fn build_output_path<P: AsRef<Path>>(
	input_path: P,
	output_extension: &str,
) -> io::Result<PathBuf> {
	let input_path = input_path.as_ref();

	let parent = input_path.parent().unwrap_or_else(|| Path::new("."));
	let file_stem = input_path
		.file_stem()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Input path has no filename"))?;

	let mut output = PathBuf::from(parent);
	output.push(file_stem);
	output.set_extension(output_extension);

	Ok(output)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn output_path_swaps_extension() {
		let path = build_output_path("data/names.ltr", "bin").unwrap();
		assert_eq!(path, PathBuf::from("data/names.bin"));
		assert!(build_output_path("", "bin").is_err());
	}

	#[test]
	fn reads_whole_file() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("raw.ltr");
		std::fs::write(&path, [1u8, 2, 3]).unwrap();
		assert_eq!(read_bytes(&path).unwrap(), vec![1, 2, 3]);
		assert!(read_bytes(dir.path().join("missing.ltr")).is_err());
	}
}
