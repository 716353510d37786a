use serde::{Deserialize, Serialize};

/// Position of a symbol inside a name.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Context {
	Start,
	Middle,
	End,
}

impl Context {
	/// Contexts in file order.
	pub const ALL: [Context; 3] = [Context::Start, Context::Middle, Context::End];

	pub fn name(self) -> &'static str {
		match self {
			Context::Start => "start",
			Context::Middle => "middle",
			Context::End => "end",
		}
	}
}

/// Statistics of one symbol in one context.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct ProbabilityEntry {
	/// Cumulative probability up to and including this symbol.
	pub cdf: f32,
	/// Probability mass of this symbol, derived from the cdf column.
	pub pdf: f32,
	/// Reconstructed sample count, `None` until reconstruction runs.
	pub count: Option<u32>,
}

/// One context column (start, middle or end) of a `ProbabilityTable`.
///
/// ## Invariants
/// - `entries.len()` equals the model's `num_letters`
/// - `pdf` is always derived from `cdf`: zero cdf means zero pdf, otherwise
///   the difference to the previous nonzero cdf
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Distribution {
	entries: Vec<ProbabilityEntry>,
	/// Inferred sample size behind the pdf column.
	total: Option<u32>,
	/// Number of symbols with nonzero pdf, filled by reconstruction.
	buckets: Option<u32>,
}

impl Distribution {
	/// Builds a column from raw cdf values, deriving the pdf column.
	pub fn from_cdfs(cdfs: &[f32]) -> Self {
		let entries = cdfs
			.iter()
			.map(|&cdf| ProbabilityEntry { cdf, pdf: 0.0, count: None })
			.collect();
		let mut distribution = Self { entries, total: None, buckets: None };
		distribution.derive_pdf();
		distribution
	}

	/// Recomputes every pdf from the current cdf column.
	pub(crate) fn derive_pdf(&mut self) {
		let mut last_nonzero = 0.0f32;
		for entry in &mut self.entries {
			if entry.cdf != 0.0 {
				entry.pdf = entry.cdf - last_nonzero;
				last_nonzero = entry.cdf;
			} else {
				entry.pdf = 0.0;
			}
		}
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn entries(&self) -> &[ProbabilityEntry] {
		&self.entries
	}

	pub(crate) fn entries_mut(&mut self) -> &mut [ProbabilityEntry] {
		&mut self.entries
	}

	pub fn cdf(&self, symbol: usize) -> f32 {
		self.entries[symbol].cdf
	}

	pub fn pdf(&self, symbol: usize) -> f32 {
		self.entries[symbol].pdf
	}

	pub fn count(&self, symbol: usize) -> Option<u32> {
		self.entries[symbol].count
	}

	pub fn pdfs(&self) -> Vec<f32> {
		self.entries.iter().map(|e| e.pdf).collect()
	}

	pub fn total(&self) -> Option<u32> {
		self.total
	}

	pub fn buckets(&self) -> Option<u32> {
		self.buckets
	}

	/// Returns true if some cdf lies within `tolerance` of 1.0.
	pub fn reaches_unity(&self, tolerance: f32) -> bool {
		self.entries.iter().any(|e| (e.cdf - 1.0).abs() <= tolerance)
	}

	/// Inverse-cdf lookup: the first symbol whose cdf exceeds `r`.
	///
	/// Returns `None` when `r` is at or above every cdf, which includes
	/// degenerate all-zero columns.
	pub fn sample(&self, r: f32) -> Option<usize> {
		self.entries.iter().position(|e| e.cdf > r)
	}

	/// Stores reconstructed counts. `counts` must have one value per symbol.
	pub(crate) fn set_counts(&mut self, total: u32, counts: &[u32]) {
		debug_assert_eq!(counts.len(), self.entries.len());
		for (entry, &count) in self.entries.iter_mut().zip(counts) {
			entry.count = Some(count);
		}
		self.total = Some(total);
		self.buckets = Some(counts.iter().filter(|&&c| c > 0).count() as u32);
	}

	/// Multiplies every count and the total by `ratio`.
	pub(crate) fn scale_counts(&mut self, ratio: u32) {
		for entry in &mut self.entries {
			entry.count = entry.count.map(|c| c.saturating_mul(ratio));
		}
		self.total = self.total.map(|t| t.saturating_mul(ratio));
	}
}

/// Start/middle/end distributions for one letter context.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ProbabilityTable {
	pub start: Distribution,
	pub middle: Distribution,
	pub end: Distribution,
}

impl ProbabilityTable {
	pub fn get(&self, context: Context) -> &Distribution {
		match context {
			Context::Start => &self.start,
			Context::Middle => &self.middle,
			Context::End => &self.end,
		}
	}

	pub fn get_mut(&mut self, context: Context) -> &mut Distribution {
		match context {
			Context::Start => &mut self.start,
			Context::Middle => &mut self.middle,
			Context::End => &mut self.end,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn pdf_skips_zero_entries() {
		let d = Distribution::from_cdfs(&[0.25, 0.0, 0.75, 1.0]);
		assert_eq!(d.pdfs(), vec![0.25, 0.0, 0.5, 0.25]);
		assert!(d.entries().iter().all(|e| e.count.is_none()));
	}

	#[test]
	fn sample_is_first_cdf_above_draw() {
		let d = Distribution::from_cdfs(&[0.25, 0.0, 0.75, 1.0]);
		assert_eq!(d.sample(0.0), Some(0));
		assert_eq!(d.sample(0.25), Some(2));
		assert_eq!(d.sample(0.99), Some(3));
		assert_eq!(d.sample(1.0), None);
		assert_eq!(Distribution::from_cdfs(&[0.0, 0.0]).sample(0.0), None);
	}

	#[test]
	fn counts_scale_with_total() {
		let mut d = Distribution::from_cdfs(&[0.3, 0.8, 1.0]);
		d.set_counts(10, &[3, 5, 2]);
		assert_eq!(d.buckets(), Some(3));
		d.scale_counts(2);
		assert_eq!(d.total(), Some(20));
		assert_eq!(d.count(1), Some(10));
	}
}
