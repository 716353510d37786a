use std::path::Path;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::corrector::{self, CorrectionReport};
use super::generation_input::GenerationInput;
use super::ltr_model::Model;
use super::reconstructor::{self, ReconstructionReport};
use super::sampler::NameSampler;
use crate::error::Result;
use crate::io;

/// A processed model as stored in the postcard cache, tagged with the
/// passes that produced it and their reports.
#[derive(Serialize, Deserialize)]
struct CachedModel {
	repair: bool,
	reconstruct: bool,
	model: Model,
	correction: Option<CorrectionReport>,
	reconstruction: Option<ReconstructionReport>,
}

/// High-level name generator over one LTR model.
///
/// # Responsibilities
/// - Load an LTR file (or its cached processed form)
/// - Run the repair and reconstruction passes selected by `GenerationInput`
/// - Own the seeded sampler and hand out names one by one
///
/// The model is never modified once the generator is built.
#[derive(Debug)]
pub struct Generator {
	model: Model,
	sampler: NameSampler,
	correction: Option<CorrectionReport>,
	reconstruction: Option<ReconstructionReport>,
}

impl Generator {
	/// Loads an LTR file and prepares it for generation.
	///
	/// # Behavior
	/// - With `input.cache`, a sibling `<stem>.bin` built with the same
	///   passes is loaded instead of decoding; otherwise the file is decoded,
	///   processed, and the cache (re)written.
	/// - Without `input.cache`, the file is always decoded.
	///
	/// # Errors
	/// Any I/O, structural or cache error. No name is produced in that case.
	pub fn new<P: AsRef<Path>>(filepath: P, input: &GenerationInput) -> Result<Self> {
		if !input.cache {
			let bytes = io::read_bytes(&filepath)?;
			return Self::from_bytes(&bytes, input);
		}

		let cache_path = io::build_output_path(&filepath, "bin")?;
		if cache_path.exists() {
			let bytes = io::read_bytes(&cache_path)?;
			match postcard::from_bytes::<CachedModel>(&bytes) {
				Ok(cached) if cached.repair == input.repair_enabled() && cached.reconstruct == input.reconstruct => {
					debug!("loaded processed model from {}", cache_path.display());
					return Ok(Self::prepared(cached.model, cached.correction, cached.reconstruction, input));
				}
				Ok(_) => debug!("cache {} was built with other passes, rebuilding", cache_path.display()),
				Err(e) => warn!("ignoring unreadable cache {}: {}", cache_path.display(), e),
			}
		}

		let bytes = io::read_bytes(&filepath)?;
		let generator = Self::from_bytes(&bytes, input)?;
		let cached = CachedModel {
			repair: input.repair_enabled(),
			reconstruct: input.reconstruct,
			model: generator.model.clone(),
			correction: generator.correction.clone(),
			reconstruction: generator.reconstruction.clone(),
		};
		std::fs::write(&cache_path, postcard::to_stdvec(&cached)?)?;
		debug!("wrote processed model to {}", cache_path.display());

		Ok(generator)
	}

	/// Decodes an in-memory LTR file and prepares it for generation.
	pub fn from_bytes(bytes: &[u8], input: &GenerationInput) -> Result<Self> {
		let model = Model::from_bytes(bytes)?;
		Ok(Self::from_model(model, input))
	}

	/// Runs the configured passes over a decoded model.
	///
	/// Repair comes first: reconstruction reads the pdfs it rewrites.
	pub fn from_model(model: Model, input: &GenerationInput) -> Self {
		let (model, correction) = if input.repair_enabled() {
			let (model, report) = corrector::correct(model);
			(model, Some(report))
		} else {
			(model, None)
		};

		let (model, reconstruction) = if input.reconstruct {
			let (model, report) = reconstructor::reconstruct(model);
			debug!(
				"reconstruction: {} passes, {} columns rescaled, {} diagnostics",
				report.passes,
				report.scaled,
				report.diagnostics.len()
			);
			(model, Some(report))
		} else {
			(model, None)
		};

		Self::prepared(model, correction, reconstruction, input)
	}

	fn prepared(
		model: Model,
		correction: Option<CorrectionReport>,
		reconstruction: Option<ReconstructionReport>,
		input: &GenerationInput,
	) -> Self {
		let seed = input.resolve_seed();
		info!("generating from a {}-letter model with seed {}", model.num_letters(), seed);
		Self { model, sampler: NameSampler::with_seed(seed), correction, reconstruction }
	}

	/// The processed, read-only model.
	pub fn model(&self) -> &Model {
		&self.model
	}

	/// Outcome of the repair pass, if it ran (here or when the cache was built).
	pub fn correction_report(&self) -> Option<&CorrectionReport> {
		self.correction.as_ref()
	}

	/// Outcome of the reconstruction pass, if it ran (here or when the cache was built).
	pub fn reconstruction_report(&self) -> Option<&ReconstructionReport> {
		self.reconstruction.as_ref()
	}

	/// Generates the next name of the stream.
	pub fn predict(&mut self) -> Result<String> {
		self.sampler.sample(&self.model)
	}

	/// Generates the next `count` names of the stream.
	pub fn predict_many(&mut self, count: usize) -> Result<Vec<String>> {
		(0..count).map(|_| self.predict()).collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::ltr_model::tests::uniform_file;

	fn seeded(seed: u32) -> GenerationInput {
		let mut input = GenerationInput::default();
		input.set_seed(seed);
		input
	}

	#[test]
	fn passes_follow_input() {
		let bytes = uniform_file(3);
		let generator = Generator::from_bytes(&bytes, &seeded(1)).unwrap();
		assert!(generator.correction_report().is_some());
		assert!(generator.reconstruction_report().is_some());
		assert_eq!(generator.model().singles().start.total(), Some(3 * 3 * 3));

		let mut input = seeded(1);
		input.reconstruct = false;
		let generator = Generator::from_bytes(&bytes, &input).unwrap();
		assert!(generator.correction_report().is_none());
		assert!(generator.reconstruction_report().is_none());
		assert_eq!(generator.model().singles().start.total(), None);
	}

	#[test]
	fn structural_errors_stop_before_any_name() {
		let mut bytes = uniform_file(3);
		bytes[0] = b'?';
		assert!(Generator::from_bytes(&bytes, &seeded(1)).is_err());
		assert!(Generator::from_bytes(&bytes[..40], &seeded(1)).is_err());
	}

	#[test]
	fn cache_round_trip() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("names.ltr");
		std::fs::write(&path, uniform_file(3)).unwrap();

		let mut input = seeded(8);
		input.cache = true;
		let mut fresh = Generator::new(&path, &input).unwrap();
		assert!(dir.path().join("names.bin").exists());
		assert!(fresh.reconstruction_report().is_some());

		let mut cached = Generator::new(&path, &input).unwrap();
		assert_eq!(cached.model(), fresh.model());
		assert_eq!(cached.correction_report(), fresh.correction_report());
		assert_eq!(cached.reconstruction_report(), fresh.reconstruction_report());
		assert_eq!(cached.predict_many(10).unwrap(), fresh.predict_many(10).unwrap());

		input.reconstruct = false;
		let rebuilt = Generator::new(&path, &input).unwrap();
		assert_eq!(rebuilt.model().singles().start.total(), None);
		assert!(rebuilt.reconstruction_report().is_none());
	}

	#[test]
	fn inconsistent_cache_is_rebuilt() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("names.ltr");
		std::fs::write(&path, uniform_file(3)).unwrap();

		// 2-letter tables under a 3-letter header
		let mut input = seeded(5);
		let small = Generator::from_bytes(&uniform_file(2), &input).unwrap();
		let cached = CachedModel {
			repair: input.repair_enabled(),
			reconstruct: input.reconstruct,
			model: small.model().clone(),
			correction: None,
			reconstruction: None,
		};
		let mut bytes = postcard::to_stdvec(&cached).unwrap();
		// two flags, 8 magic bytes, then num_letters
		assert_eq!(bytes[10], 2);
		bytes[10] = 3;
		let cache_path = dir.path().join("names.bin");
		std::fs::write(&cache_path, &bytes).unwrap();

		input.cache = true;
		let mut generator = Generator::new(&path, &input).unwrap();
		assert_eq!(generator.model().num_letters(), 3);
		assert_eq!(generator.model().tables().count(), 1 + 3 + 9);
		assert!(generator.reconstruction_report().is_some());
		assert_eq!(generator.predict_many(5).unwrap().len(), 5);
		assert_ne!(std::fs::read(&cache_path).unwrap(), bytes);
	}
}
