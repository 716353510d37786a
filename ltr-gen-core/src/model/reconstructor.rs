//! Reconstruction of the integer counts behind the stored probabilities.
//!
//! LTR files keep only normalized floats. Every column was produced as
//! `count / total` for some word list, so the smallest integer total that
//! turns all pdfs back into near-integers is taken as the sample size. The
//! hierarchy is then reconciled: words starting with `X` counted in
//! `singles.start` are the sample behind `doubles[X].start`, and so on one
//! level down.
//!
//! Nothing here touches cdf or pdf values.

use std::sync::mpsc;
use std::thread;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::ltr_model::Model;
use super::table::{Context, Distribution};

/// Below this magnitude a pdf counts as zero.
pub const ZERO_TOLERANCE: f64 = 1e-6;

/// Smallest total tried by the best-fit search (1 and 2 are special cases).
pub const MIN_SEARCH_TOTAL: u32 = 3;

/// Largest total tried by the best-fit search.
pub const MAX_SEARCH_TOTAL: u32 = 30_000;

/// Cap on propagation sweeps over the whole hierarchy.
pub const MAX_PROPAGATION_PASSES: usize = 8;

const SPECIAL_TOLERANCE: f64 = 1e-5;

/// Mean squared distance to the nearest integers accepted as an exact fit.
const FIT_TOLERANCE: f64 = 1e-6;

/// Quantization noise of a pdf derived from two binary32 cdf values.
const PDF_NOISE: f64 = 2.0 * f32::EPSILON as f64;

/// One cross-level relation between a count and a table total.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Link {
	/// `singles.start[first].count` against `doubles[first].start` total.
	Single { first: usize },
	/// `doubles[first].start[second].count` against `triples[first][second].start` total.
	Double { first: usize, second: usize },
}

/// Anomalies left unresolved by reconstruction.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Diagnostic {
	/// Count and total are not integer multiples of each other.
	NoIntegerRatio { link: Link, count: u32, total: u32 },
	/// `doubles[previous].end` is the only doubles column giving mass to
	/// `last`, so it shares its evidence with `singles.end[last]`.
	/// Detected only, counts are not migrated.
	UniqueEndContributor { last: usize, previous: usize },
}

/// Outcome of a reconstruction pass.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
pub struct ReconstructionReport {
	/// Propagation sweeps performed.
	pub passes: usize,
	/// Columns rescaled during propagation.
	pub scaled: usize,
	pub diagnostics: Vec<Diagnostic>,
}

/// Infers the sample size behind a pdf column.
///
/// - all zero → 0
/// - smallest nonzero pdf is 1.0 → 1, is 0.5 → 2
/// - otherwise the first total in `[3, 30000]` whose mean squared distance
///   between `pdf * total` and the nearest integers is within tolerance, or
///   the best one seen if none is
pub fn analyze(pdfs: &[f32]) -> u32 {
	let min_nonzero = pdfs
		.iter()
		.map(|&p| p as f64)
		.filter(|p| p.abs() > ZERO_TOLERANCE)
		.reduce(f64::min);

	let Some(min) = min_nonzero else {
		return 0;
	};
	if (min - 1.0).abs() <= SPECIAL_TOLERANCE {
		return 1;
	}
	if (min - 0.5).abs() <= SPECIAL_TOLERANCE {
		return 2;
	}
	best_fit_total(pdfs)
}

/// Per-symbol counts for a given total: `round(pdf * total)`.
pub fn counts_for(pdfs: &[f32], total: u32) -> Vec<u32> {
	pdfs.iter()
		.map(|&p| (p as f64 * total as f64).round().max(0.0) as u32)
		.collect()
}

fn deviation(pdfs: &[f32], total: u32) -> f64 {
	let t = total as f64;
	let sum: f64 = pdfs
		.iter()
		.map(|&p| {
			let scaled = p as f64 * t;
			let d = scaled - scaled.round();
			d * d
		})
		.sum();
	sum / pdfs.len() as f64
}

fn best_fit_total(pdfs: &[f32]) -> u32 {
	let mut best_total = MIN_SEARCH_TOTAL;
	let mut best_deviation = f64::INFINITY;

	for total in MIN_SEARCH_TOTAL..=MAX_SEARCH_TOTAL {
		let dev = deviation(pdfs, total);
		let tolerance = FIT_TOLERANCE.max((total as f64 * PDF_NOISE).powi(2));
		if dev <= tolerance {
			return total;
		}
		if dev < best_deviation {
			best_total = total;
			best_deviation = dev;
		}
	}

	debug!("no exact total found, best fit {} (deviation {:e})", best_total, best_deviation);
	best_total
}

/// Fills every count and total of the model, then reconciles the levels.
pub fn reconstruct(mut model: Model) -> (Model, ReconstructionReport) {
	analyze_all(&mut model);

	let mut report = ReconstructionReport::default();
	propagate(&mut model, &mut report);
	detect_end_contributors(&model, &mut report);

	(model, report)
}

/// Analyzes every column independently, spread over all CPUs.
fn analyze_all(model: &mut Model) {
	let jobs: Vec<Vec<f32>> = model
		.tables()
		.flat_map(|table| Context::ALL.map(|context| table.get(context).pdfs()))
		.collect();

	let chunk_size = jobs.len().div_ceil(num_cpus::get().max(1));
	let (tx, rx) = mpsc::channel();
	thread::scope(|scope| {
		for (chunk_index, chunk) in jobs.chunks(chunk_size).enumerate() {
			let tx = tx.clone();
			scope.spawn(move || {
				for (offset, pdfs) in chunk.iter().enumerate() {
					let total = analyze(pdfs);
					let counts = counts_for(pdfs, total);
					if tx.send((chunk_index * chunk_size + offset, total, counts)).is_err() {
						break;
					}
				}
			});
		}
	});
	drop(tx);

	let mut results: Vec<Option<(u32, Vec<u32>)>> = vec![None; jobs.len()];
	for (index, total, counts) in rx {
		results[index] = Some((total, counts));
	}

	let mut results = results.into_iter();
	for table in model.tables_mut() {
		for context in Context::ALL {
			if let Some(Some((total, counts))) = results.next() {
				table.get_mut(context).set_counts(total, &counts);
			}
		}
	}
	debug!("analyzed {} columns", jobs.len());
}

/// How to make a count and a total agree.
#[derive(Debug, PartialEq, Eq)]
enum Scale {
	Agree,
	/// Multiply the column holding the count.
	Upper(u32),
	/// Multiply the column owning the total.
	Lower(u32),
	Unrelated,
}

fn scale_between(count: u32, total: u32) -> Scale {
	match (count, total) {
		(c, t) if c == t => Scale::Agree,
		(0, _) | (_, 0) => Scale::Unrelated,
		(c, t) if c > t && c % t == 0 => Scale::Lower(c / t),
		(c, t) if t > c && t % c == 0 => Scale::Upper(t / c),
		_ => Scale::Unrelated,
	}
}

/// Reconciles the start-context chain, repeating until nothing is rescaled.
///
/// Only exact integer ratios are applied. Pairs without one are left as they
/// are and reported from the last sweep.
pub(crate) fn propagate(model: &mut Model, report: &mut ReconstructionReport) {
	propagate_within(model, report, MAX_PROPAGATION_PASSES);
}

fn propagate_within(model: &mut Model, report: &mut ReconstructionReport, max_passes: usize) {
	let n = model.num_letters();
	let links: Vec<Link> = (0..n)
		.map(|first| Link::Single { first })
		.chain((0..n).flat_map(|first| (0..n).map(move |second| Link::Double { first, second })))
		.collect();

	let mut unresolved = Vec::new();
	let mut settled = false;
	for _ in 0..max_passes {
		report.passes += 1;
		unresolved.clear();
		let mut rescaled = false;

		for &link in &links {
			let (count, total) = match link {
				Link::Single { first } => (model.singles().start.count(first), model.double(first).start.total()),
				Link::Double { first, second } => (
					model.double(first).start.count(second),
					model.triple(first, second).start.total(),
				),
			};
			let (Some(count), Some(total)) = (count, total) else { continue };

			match scale_between(count, total) {
				Scale::Agree => (),
				Scale::Upper(ratio) => {
					upper_column(model, link).scale_counts(ratio);
					report.scaled += 1;
					rescaled = true;
				}
				Scale::Lower(ratio) => {
					lower_column(model, link).scale_counts(ratio);
					report.scaled += 1;
					rescaled = true;
				}
				Scale::Unrelated => unresolved.push(Diagnostic::NoIntegerRatio { link, count, total }),
			}
		}

		if !rescaled {
			settled = true;
			break;
		}
	}

	if !settled {
		warn!("count propagation did not settle after {} passes", max_passes);
	}
	for diagnostic in &unresolved {
		debug!("propagation skipped: {:?}", diagnostic);
	}
	if !unresolved.is_empty() {
		warn!("{} count/total pairs could not be reconciled", unresolved.len());
	}
	report.diagnostics.extend(unresolved);
}

fn upper_column(model: &mut Model, link: Link) -> &mut Distribution {
	match link {
		Link::Single { .. } => &mut model.singles_mut().start,
		Link::Double { first, .. } => &mut model.double_mut(first).start,
	}
}

fn lower_column(model: &mut Model, link: Link) -> &mut Distribution {
	match link {
		Link::Single { first } => &mut model.double_mut(first).start,
		Link::Double { first, second } => &mut model.triple_mut(first, second).start,
	}
}

/// Flags end letters fed by exactly one doubles end column.
// TODO: move the singles.end count onto the unique doubles.end entry once a
// rule for splitting shared evidence between the two columns is settled.
fn detect_end_contributors(model: &Model, report: &mut ReconstructionReport) {
	let n = model.num_letters();
	for last in 0..n {
		if (model.singles().end.pdf(last) as f64).abs() <= ZERO_TOLERANCE {
			continue;
		}
		let mut contributors =
			(0..n).filter(|&previous| (model.double(previous).end.pdf(last) as f64).abs() > ZERO_TOLERANCE);
		if let (Some(previous), None) = (contributors.next(), contributors.next()) {
			debug!("singles.end[{}] has a unique doubles.end contributor {}, left as is", last, previous);
			report.diagnostics.push(Diagnostic::UniqueEndContributor { last, previous });
		}
	}
}
