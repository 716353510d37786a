/// Largest value returned by `Lcg::next_raw`.
pub const RAW_MAX: u32 = 0x7FFF;

/// The linear congruential generator name files were tuned against.
///
/// `state = (state * 214013 + 2531011) mod 2^31`, each draw being bits
/// 16 to 30 of the new state. Draw order is part of the reproducibility
/// contract, so one generator must never be shared between threads without
/// serializing access.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lcg {
	state: u32,
}

impl Lcg {
	/// Seeds the generator; the seed becomes the state as is.
	pub fn new(seed: u32) -> Self {
		Self { state: seed }
	}

	pub fn state(&self) -> u32 {
		self.state
	}

	/// Next 15-bit draw in `[0, 32767]`.
	pub fn next_raw(&mut self) -> u32 {
		self.state = self.state.wrapping_mul(214_013).wrapping_add(2_531_011) & 0x7FFF_FFFF;
		(self.state >> 16) & RAW_MAX
	}

	/// Next draw scaled to `[0.0, 1.0]`.
	pub fn next_unit(&mut self) -> f32 {
		self.next_raw() as f32 / RAW_MAX as f32
	}
}
