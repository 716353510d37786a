use rand::Rng;

/// Settings for loading a model and generating names from it.
///
/// # Responsibilities
/// - Choose which passes run after decoding (repair, reconstruction)
/// - Hold the PRNG seed, drawing one from the thread RNG when unset
/// - Decide whether the processed model is cached next to the source file
///
/// # Invariants
/// - Repair only runs when reconstruction runs too
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationInput {
	/// Seed of the name stream. `None` draws a fresh one.
	seed: Option<u32>,

	/// Repair the running-sum defect in the singles middle/end columns.
	pub repair: bool,

	/// Reconstruct counts and totals.
	pub reconstruct: bool,

	/// Cache the processed model as `<stem>.bin` with postcard.
	pub cache: bool,
}

impl Default for GenerationInput {
	fn default() -> Self {
		Self { seed: None, repair: true, reconstruct: true, cache: false }
	}
}

impl GenerationInput {
	/// Returns the configured seed, if any.
	pub fn seed(&self) -> Option<u32> {
		self.seed
	}

	/// Sets the seed of the name stream. It becomes the generator state as is;
	/// bit 31 is dropped by the first update.
	pub fn set_seed(&mut self, seed: u32) {
		self.seed = Some(seed);
	}

	/// Goes back to a freshly drawn seed.
	pub fn clear_seed(&mut self) {
		self.seed = None;
	}

	/// Returns the configured seed or draws one.
	pub fn resolve_seed(&self) -> u32 {
		self.seed.unwrap_or_else(|| rand::rng().random_range(0..=0x7FFF_FFFF))
	}

	/// Whether the corruption repair pass runs.
	pub fn repair_enabled(&self) -> bool {
		self.repair && self.reconstruct
	}
}
