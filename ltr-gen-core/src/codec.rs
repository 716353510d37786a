use crate::error::{LtrError, Result};

/// Forward-only reader over an in-memory LTR byte stream.
///
/// Multi-byte values are always assembled by byte position (first byte is
/// the least significant), so the host byte order never matters.
pub struct ByteReader<'a> {
	bytes: &'a [u8],
	offset: usize,
}

impl<'a> ByteReader<'a> {
	pub fn new(bytes: &'a [u8]) -> Self {
		Self { bytes, offset: 0 }
	}

	/// Current position in the stream.
	pub fn offset(&self) -> usize {
		self.offset
	}

	/// Number of bytes not consumed yet.
	pub fn remaining(&self) -> usize {
		self.bytes.len() - self.offset
	}

	/// Consumes `n` raw bytes.
	pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
		let bytes = self.bytes;
		let slice = bytes
			.get(self.offset..self.offset + n)
			.ok_or(LtrError::TruncatedInput {
				offset: self.offset,
				remaining: self.remaining(),
			})?;
		self.offset += n;
		Ok(slice)
	}

	pub fn read_u8(&mut self) -> Result<u8> {
		Ok(self.read_bytes(1)?[0])
	}

	/// Consumes exactly 4 bytes and decodes a little-endian IEEE-754 binary32.
	///
	/// # Errors
	/// `TruncatedInput` if fewer than 4 bytes remain. Nothing is consumed in
	/// that case.
	pub fn read_f32_le(&mut self) -> Result<f32> {
		let b = self.read_bytes(4)?;
		let bits = u32::from(b[0]) | u32::from(b[1]) << 8 | u32::from(b[2]) << 16 | u32::from(b[3]) << 24;
		Ok(f32::from_bits(bits))
	}
}

/// Appends `value` as a little-endian IEEE-754 binary32.
pub fn write_f32_le(out: &mut Vec<u8>, value: f32) {
	let bits = value.to_bits();
	out.extend_from_slice(&[bits as u8, (bits >> 8) as u8, (bits >> 16) as u8, (bits >> 24) as u8]);
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn decodes_by_byte_position() {
		// 1.0f32 = 0x3F800000
		let bytes = [0x00, 0x00, 0x80, 0x3F];
		let mut reader = ByteReader::new(&bytes);
		assert_eq!(reader.read_f32_le().unwrap(), 1.0);
		assert_eq!(reader.remaining(), 0);
	}

	#[test]
	fn truncated_float_is_rejected_without_consuming() {
		let bytes = [0x00, 0x00, 0x80];
		let mut reader = ByteReader::new(&bytes);
		match reader.read_f32_le() {
			Err(LtrError::TruncatedInput { offset: 0, remaining: 3 }) => (),
			other => panic!("unexpected result: {other:?}"),
		}
		assert_eq!(reader.offset(), 0);
	}

	#[test]
	fn writer_matches_reader() {
		let mut out = Vec::new();
		write_f32_le(&mut out, -0.15625);
		assert_eq!(out, vec![0x00, 0x00, 0x20, 0xBE]);
		assert_eq!(ByteReader::new(&out).read_f32_le().unwrap(), -0.15625);
	}
}
