#![allow(dead_code)]

use ltr_gen_core::codec::write_f32_le;
use ltr_gen_core::model::ltr_model::{MAGIC, file_size};

/// Writes an LTR file whose columns come from `column(table, context)`,
/// tables numbered in file order (singles, doubles, triples).
pub fn ltr_file<F>(num_letters: u8, mut column: F) -> Vec<u8>
where
	F: FnMut(usize, usize) -> Vec<f32>,
{
	let n = num_letters as usize;
	let mut bytes = MAGIC.to_vec();
	bytes.push(num_letters);
	for table in 0..1 + n + n * n {
		for context in 0..3 {
			for cdf in column(table, context) {
				write_f32_le(&mut bytes, cdf);
			}
		}
	}
	assert_eq!(bytes.len(), file_size(n));
	bytes
}

/// Evenly spread cdf column: `1/n, 2/n, ..., 1`.
pub fn uniform_column(num_letters: u8) -> Vec<f32> {
	let n = num_letters as usize;
	(1..=n).map(|i| i as f32 / n as f32).collect()
}

pub fn uniform_file(num_letters: u8) -> Vec<u8> {
	ltr_file(num_letters, |_, _| uniform_column(num_letters))
}
