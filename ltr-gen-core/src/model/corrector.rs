//! Repair of the running-sum defect in `singles.middle` and `singles.end`.
//!
//! The encoder that produced LTR files reset its cumulative sum after every
//! zero-probability symbol while writing those two columns, so every later
//! nonzero cdf is short by the mass accumulated before the reset. Such a
//! column never reaches 1.0, which is how it is detected.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::ltr_model::Model;
use super::table::{Context, Distribution};

/// Distance from 1.0 within which a cdf counts as reaching unity.
pub const UNITY_TOLERANCE: f32 = 0.001;

/// Columns the encoder defect can affect.
pub const CHECKED_CONTEXTS: [Context; 2] = [Context::Middle, Context::End];

/// Outcome of a correction pass.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
pub struct CorrectionReport {
	/// Singles columns that were found corrupt and rewritten.
	pub repaired: Vec<Context>,
	/// Repaired columns whose final cdf still misses 1.0, with that cdf.
	pub residual: Vec<(Context, f32)>,
}

/// A column is corrupt when none of its cdf values reaches 1.0.
pub fn is_corrupt(distribution: &Distribution) -> bool {
	!distribution.reaches_unity(UNITY_TOLERANCE)
}

/// Checks and repairs `singles.middle` and `singles.end`.
///
/// `singles.start` and every doubles/triples table are taken as written.
pub fn correct(mut model: Model) -> (Model, CorrectionReport) {
	let mut report = CorrectionReport::default();

	for context in CHECKED_CONTEXTS {
		let distribution = model.singles_mut().get_mut(context);
		if !is_corrupt(distribution) {
			debug!("singles.{} reaches 1.0, no repair needed", context.name());
			continue;
		}

		warn!("singles.{} never reaches 1.0, repairing running sum", context.name());
		let last = repair(distribution);
		report.repaired.push(context);

		if (last - 1.0).abs() > UNITY_TOLERANCE {
			warn!("singles.{} still ends at {} after repair", context.name(), last);
			report.residual.push((context, last));
		}
	}

	(model, report)
}

/// Rewrites a column whose running sum was reset after zero entries.
///
/// Every time a nonzero cdf follows a zero one, the corrected total so far
/// becomes the offset added to the following stored values. Zero entries stay
/// zero. The pdf column is derived again from the corrected cdf values.
///
/// Returns the last corrected cumulative value.
pub fn repair(distribution: &mut Distribution) -> f32 {
	let mut acc = 0.0f32;
	let mut correction = 0.0f32;
	let mut prev_stored = 0.0f32;

	for (i, entry) in distribution.entries_mut().iter_mut().enumerate() {
		let stored = entry.cdf;
		if stored != 0.0 {
			if i > 0 && prev_stored == 0.0 {
				correction = acc;
			}
			acc = stored + correction;
			entry.cdf = acc;
		}
		prev_stored = stored;
	}

	distribution.derive_pdf();
	acc
}
