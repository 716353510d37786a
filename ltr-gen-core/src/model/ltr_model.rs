use std::path::Path;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::alphabet::MAX_LETTERS;
use super::table::{Context, Distribution, ProbabilityTable};
use crate::codec::{ByteReader, write_f32_le};
use crate::error::{LtrError, Result};
use crate::io;

/// Leading bytes of every LTR file ("LTR V1.0 " without its trailing space,
/// which is where `num_letters` lives).
pub const MAGIC: &[u8; 8] = b"LTR V1.0";

/// Magic plus the `num_letters` byte.
pub const HEADER_LEN: usize = 9;

/// Exact size of an LTR file declaring `num_letters` symbols.
pub const fn file_size(num_letters: usize) -> usize {
	let n = num_letters;
	HEADER_LEN + 4 * 3 * (n + n * n + n * n * n)
}

/// Smallest valid LTR file (one symbol).
pub const MIN_FILE_SIZE: usize = file_size(1);

/// Largest valid LTR file (the full 28 symbols).
pub const MAX_FILE_SIZE: usize = file_size(MAX_LETTERS);

/// Cheap precondition on the raw length, before anything is decoded.
///
/// Necessary but not sufficient: the exact size depends on `num_letters`.
pub fn check_file_size(len: usize) -> Result<()> {
	if !(MIN_FILE_SIZE..=MAX_FILE_SIZE).contains(&len) {
		return Err(LtrError::FileSize { len, min: MIN_FILE_SIZE, max: MAX_FILE_SIZE });
	}
	Ok(())
}

/// A decoded LTR trigram model.
///
/// # Responsibilities
/// - Own the singles table, one doubles table per symbol and one triples
///   table per ordered symbol pair
/// - Decode from and encode to the LTR byte layout
///
/// # Invariants
/// - `1 <= num_letters <= 28`
/// - `doubles.len() == n`, `triples.len() == n * n` (row-major on the
///   two-letter context), every distribution has `n` entries
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(try_from = "RawModel")]
pub struct Model {
	magic: [u8; 8],
	num_letters: u8,
	singles: ProbabilityTable,
	doubles: Vec<ProbabilityTable>,
	triples: Vec<ProbabilityTable>,
}

/// Serialized form of `Model`, checked by `Model::new` before use.
#[derive(Deserialize)]
struct RawModel {
	magic: [u8; 8],
	num_letters: u8,
	singles: ProbabilityTable,
	doubles: Vec<ProbabilityTable>,
	triples: Vec<ProbabilityTable>,
}

impl TryFrom<RawModel> for Model {
	type Error = LtrError;

	fn try_from(raw: RawModel) -> Result<Self> {
		if &raw.magic != MAGIC {
			return Err(LtrError::BadMagic);
		}
		Self::new(raw.num_letters, raw.singles, raw.doubles, raw.triples)
	}
}

impl Model {
	/// Assembles a model from already built tables.
	///
	/// # Errors
	/// `InvalidLetterCount` or `TableShape` if the tables do not match
	/// `num_letters`.
	pub fn new(
		num_letters: u8,
		singles: ProbabilityTable,
		doubles: Vec<ProbabilityTable>,
		triples: Vec<ProbabilityTable>,
	) -> Result<Self> {
		let n = num_letters as usize;
		if !(1..=MAX_LETTERS).contains(&n) {
			return Err(LtrError::InvalidLetterCount(num_letters));
		}
		if doubles.len() != n {
			return Err(LtrError::TableShape(format!("{} doubles tables for {} letters", doubles.len(), n)));
		}
		if triples.len() != n * n {
			return Err(LtrError::TableShape(format!("{} triples tables for {} letters", triples.len(), n)));
		}
		let all_tables = std::iter::once(&singles).chain(&doubles).chain(&triples);
		for table in all_tables {
			for context in Context::ALL {
				let len = table.get(context).len();
				if len != n {
					return Err(LtrError::TableShape(format!(
						"{} column has {} entries for {} letters",
						context.name(),
						len,
						n
					)));
				}
			}
		}
		Ok(Self { magic: *MAGIC, num_letters, singles, doubles, triples })
	}

	/// Reads and decodes an LTR file.
	pub fn from_path<P: AsRef<Path>>(filepath: P) -> Result<Self> {
		let bytes = io::read_bytes(filepath)?;
		Self::from_bytes(&bytes)
	}

	/// Checks the size precondition, then decodes.
	pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
		check_file_size(bytes.len())?;
		Self::decode(bytes)
	}

	/// Decodes the LTR layout: header, singles, doubles in alphabet order,
	/// then triples in row-major two-letter order. Each table is stored as
	/// its start, middle and end cdf columns.
	///
	/// # Errors
	/// - `BadMagic` if the first 8 bytes are not `MAGIC`
	/// - `InvalidLetterCount` if byte 8 is outside [1, 28]
	/// - `UnexpectedEof` if the stream is shorter than the declared layout
	pub fn decode(bytes: &[u8]) -> Result<Self> {
		if bytes.len() < HEADER_LEN {
			return Err(LtrError::UnexpectedEof { expected: HEADER_LEN, actual: bytes.len() });
		}

		let mut reader = ByteReader::new(bytes);
		if reader.read_bytes(MAGIC.len())? != MAGIC {
			return Err(LtrError::BadMagic);
		}
		let num_letters = reader.read_u8()?;
		let n = num_letters as usize;
		if !(1..=MAX_LETTERS).contains(&n) {
			return Err(LtrError::InvalidLetterCount(num_letters));
		}
		debug!("LTR header read ok, num_letters = {}", num_letters);

		let expected = file_size(n);
		if bytes.len() < expected {
			return Err(LtrError::UnexpectedEof { expected, actual: bytes.len() });
		}
		if bytes.len() > expected {
			warn!("ignoring {} trailing bytes after the last triples table", bytes.len() - expected);
		}

		let singles = Self::read_table(&mut reader, n)?;
		let doubles = (0..n)
			.map(|_| Self::read_table(&mut reader, n))
			.collect::<Result<Vec<_>>>()?;
		debug!("decoded singles and {} doubles tables", doubles.len());
		let triples = (0..n * n)
			.map(|_| Self::read_table(&mut reader, n))
			.collect::<Result<Vec<_>>>()?;
		debug!("decoded {} triples tables, {} bytes consumed", triples.len(), reader.offset());

		Self::new(num_letters, singles, doubles, triples)
	}

	fn read_table(reader: &mut ByteReader, n: usize) -> Result<ProbabilityTable> {
		let mut read_column = || -> Result<Distribution> {
			let cdfs = (0..n).map(|_| reader.read_f32_le()).collect::<Result<Vec<_>>>()?;
			Ok(Distribution::from_cdfs(&cdfs))
		};
		let start = read_column()?;
		let middle = read_column()?;
		let end = read_column()?;
		Ok(ProbabilityTable { start, middle, end })
	}

	/// Encodes the model back into the LTR layout (cdf columns only).
	pub fn encode(&self) -> Vec<u8> {
		let mut out = Vec::with_capacity(file_size(self.num_letters()));
		out.extend_from_slice(&self.magic);
		out.push(self.num_letters);
		for table in self.tables() {
			for context in Context::ALL {
				for entry in table.get(context).entries() {
					write_f32_le(&mut out, entry.cdf);
				}
			}
		}
		out
	}

	pub fn magic(&self) -> &[u8; 8] {
		&self.magic
	}

	pub fn num_letters(&self) -> usize {
		self.num_letters as usize
	}

	/// Unconditional single-letter statistics.
	pub fn singles(&self) -> &ProbabilityTable {
		&self.singles
	}

	/// Statistics conditioned on the previous letter `first`.
	pub fn double(&self, first: usize) -> &ProbabilityTable {
		&self.doubles[first]
	}

	/// Statistics conditioned on the previous two letters.
	pub fn triple(&self, first: usize, second: usize) -> &ProbabilityTable {
		&self.triples[first * self.num_letters() + second]
	}

	pub(crate) fn singles_mut(&mut self) -> &mut ProbabilityTable {
		&mut self.singles
	}

	pub(crate) fn double_mut(&mut self, first: usize) -> &mut ProbabilityTable {
		&mut self.doubles[first]
	}

	pub(crate) fn triple_mut(&mut self, first: usize, second: usize) -> &mut ProbabilityTable {
		let n = self.num_letters();
		&mut self.triples[first * n + second]
	}

	/// Every table in file order: singles, doubles, triples.
	pub fn tables(&self) -> impl Iterator<Item = &ProbabilityTable> {
		std::iter::once(&self.singles).chain(&self.doubles).chain(&self.triples)
	}

	pub(crate) fn tables_mut(&mut self) -> impl Iterator<Item = &mut ProbabilityTable> {
		std::iter::once(&mut self.singles).chain(&mut self.doubles).chain(&mut self.triples)
	}
}

#[cfg(test)]
pub(crate) mod tests {
	use super::*;

	/// Builds an LTR byte stream where every column is the same cdf list.
	pub(crate) fn uniform_file(num_letters: u8) -> Vec<u8> {
		let n = num_letters as usize;
		let column: Vec<f32> = (1..=n).map(|i| i as f32 / n as f32).collect();
		let mut bytes = MAGIC.to_vec();
		bytes.push(num_letters);
		for _ in 0..3 * (1 + n + n * n) {
			for &cdf in &column {
				write_f32_le(&mut bytes, cdf);
			}
		}
		bytes
	}

	#[test]
	fn file_size_bounds() {
		assert_eq!(MIN_FILE_SIZE, 45);
		assert_eq!(MAX_FILE_SIZE, 9 + 4 * (28 * 3 + 28 * 28 * 3 + 28 * 28 * 28 * 3));
		assert!(check_file_size(44).is_err());
		assert!(check_file_size(45).is_ok());
		assert!(check_file_size(MAX_FILE_SIZE + 1).is_err());
	}

	#[test]
	fn decodes_uniform_model() {
		let bytes = uniform_file(3);
		assert_eq!(bytes.len(), file_size(3));
		let model = Model::from_bytes(&bytes).unwrap();
		assert_eq!(model.num_letters(), 3);
		assert_eq!(model.magic(), MAGIC);
		assert_eq!(model.triple(2, 1).end.cdf(2), 1.0);
		assert_eq!(model.double(0).start.pdf(0), 1.0 / 3.0);
		assert_eq!(model.tables().count(), 1 + 3 + 9);
		assert_eq!(model.encode(), bytes);
	}

	#[test]
	fn rejects_bad_header() {
		let mut bytes = uniform_file(3);
		bytes[0] = b'X';
		assert!(matches!(Model::decode(&bytes), Err(LtrError::BadMagic)));

		let mut bytes = uniform_file(3);
		bytes[8] = 0;
		assert!(matches!(Model::decode(&bytes), Err(LtrError::InvalidLetterCount(0))));
		bytes[8] = 29;
		assert!(matches!(Model::decode(&bytes), Err(LtrError::InvalidLetterCount(29))));
	}

	#[test]
	fn rejects_short_stream() {
		let bytes = uniform_file(3);
		let short = &bytes[..bytes.len() - 1];
		match Model::decode(short) {
			Err(LtrError::UnexpectedEof { expected, actual }) => {
				assert_eq!(expected, file_size(3));
				assert_eq!(actual, expected - 1);
			}
			other => panic!("unexpected result: {other:?}"),
		}
		assert!(matches!(Model::decode(&bytes[..4]), Err(LtrError::UnexpectedEof { .. })));
	}

	#[test]
	fn new_validates_shape() {
		let column = Distribution::from_cdfs(&[1.0]);
		let table = ProbabilityTable { start: column.clone(), middle: column.clone(), end: column };
		assert!(Model::new(1, table.clone(), vec![table.clone()], vec![table.clone()]).is_ok());
		assert!(matches!(
			Model::new(1, table.clone(), vec![], vec![table.clone()]),
			Err(LtrError::TableShape(_))
		));
		assert!(matches!(Model::new(0, table.clone(), vec![], vec![]), Err(LtrError::InvalidLetterCount(0))));
	}

	#[test]
	fn deserialization_checks_shape() {
		let model = Model::from_bytes(&uniform_file(2)).unwrap();
		let bytes = postcard::to_stdvec(&model).unwrap();
		assert_eq!(postcard::from_bytes::<Model>(&bytes).unwrap(), model);

		// magic (8 bytes) then num_letters
		let mut wrong_count = bytes.clone();
		wrong_count[8] = 3;
		assert!(postcard::from_bytes::<Model>(&wrong_count).is_err());

		let mut wrong_magic = bytes;
		wrong_magic[0] = b'X';
		assert!(postcard::from_bytes::<Model>(&wrong_magic).is_err());
	}
}
