use log::trace;

use super::alphabet;
use super::ltr_model::Model;
use super::rng::Lcg;
use crate::error::{LtrError, Result};

/// Size of the name buffer; a name reaching it is complete.
pub const MAX_NAME_LEN: usize = 64;

/// Backtracks allowed within one attempt before restarting from scratch.
pub const MAX_BACKTRACKS: usize = 100;

/// Restarts allowed for a single name. Only a model whose start tables can
/// never be satisfied gets there.
pub const MAX_RESTARTS: usize = 100_000;

/// An end is only considered when `draw mod 12` is at most the length so far.
const END_LENGTH_MODULUS: u32 = 12;

/// Generation steps of the trigram walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
	/// Draw the first three symbols.
	Begin,
	/// Draw the next symbol, or stop.
	Extend,
	/// Drop the last symbol after a dead end.
	Backtrack,
	/// Throw the attempt away.
	Restart,
	Done,
}

/// Walks a trigram model to produce names.
///
/// Each call continues the same pseudo-random stream, so the n-th name
/// depends on the seed and on every draw made before it, including those of
/// discarded attempts. The model is only read.
#[derive(Debug, Clone)]
pub struct NameSampler {
	rng: Lcg,
}

impl NameSampler {
	pub fn new(rng: Lcg) -> Self {
		Self { rng }
	}

	pub fn with_seed(seed: u32) -> Self {
		Self::new(Lcg::new(seed))
	}

	pub fn rng(&self) -> &Lcg {
		&self.rng
	}

	/// Generates one name, first letter uppercased.
	///
	/// # Errors
	/// `SamplingExhausted` if the start tables never yield three symbols.
	pub fn sample(&mut self, model: &Model) -> Result<String> {
		let symbols = self.sample_symbols(model)?;
		Ok(alphabet::render_name(&symbols))
	}

	/// Generates one name as symbol indices.
	pub fn sample_symbols(&mut self, model: &Model) -> Result<Vec<usize>> {
		let mut name: Vec<usize> = Vec::with_capacity(MAX_NAME_LEN);
		let mut backtracks = 0;
		let mut restarts = 0;
		let mut step = Step::Begin;

		loop {
			step = match step {
				Step::Begin => match self.begin(model) {
					Some(first_three) => {
						name.clear();
						name.extend_from_slice(&first_three);
						backtracks = 0;
						Step::Extend
					}
					None => Step::Restart,
				},
				Step::Extend => self.extend(model, &mut name),
				Step::Backtrack => {
					if name.len() > 3 && backtracks < MAX_BACKTRACKS {
						backtracks += 1;
						name.pop();
						trace!("dead end, backtracking to {:?}", alphabet::render_name(&name));
						Step::Extend
					} else {
						Step::Restart
					}
				}
				Step::Restart => {
					restarts += 1;
					if restarts >= MAX_RESTARTS {
						return Err(LtrError::SamplingExhausted { attempts: restarts });
					}
					trace!("restarting name, attempt {}", restarts);
					name.clear();
					Step::Begin
				}
				Step::Done => return Ok(name),
			};
		}
	}

	/// Draws three values, then looks them up in `singles.start`,
	/// `doubles[i].start` and `triples[i][j].start`.
	fn begin(&mut self, model: &Model) -> Option<[usize; 3]> {
		let draws = [self.rng.next_unit(), self.rng.next_unit(), self.rng.next_unit()];

		let i = model.singles().start.sample(draws[0])?;
		let j = model.double(i).start.sample(draws[1])?;
		let k = model.triple(i, j).start.sample(draws[2])?;
		Some([i, j, k])
	}

	/// One step past the current two-letter context.
	///
	/// The end column only decides whether to stop: the last symbol already
	/// in the name is the final one.
	fn extend(&mut self, model: &Model, name: &mut Vec<usize>) -> Step {
		if name.len() >= MAX_NAME_LEN {
			return Step::Done;
		}

		let (i, j) = (name[name.len() - 2], name[name.len() - 1]);
		let table = model.triple(i, j);

		let r = self.rng.next_unit();
		let length_roll = (self.rng.next_raw() % END_LENGTH_MODULUS) as usize;
		if length_roll <= name.len() && table.end.sample(r).is_some() {
			return Step::Done;
		}

		match table.middle.sample(r) {
			Some(k) => {
				name.push(k);
				Step::Extend
			}
			None => Step::Backtrack,
		}
	}
}
