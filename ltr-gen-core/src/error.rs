use std::io;

/// Errors raised while loading an LTR file or generating names from it.
///
/// Structural errors abort the whole operation; no partial model is ever
/// returned. Statistical anomalies are not errors: they are logged and
/// reported through `ReconstructionReport`.
#[derive(Debug, thiserror::Error)]
pub enum LtrError {
	#[error("I/O error: {0}")]
	Io(#[from] io::Error),

	#[error("input file size of {len} bytes is outside [{min}, {max}]")]
	FileSize { len: usize, min: usize, max: usize },

	#[error("incorrect magic number")]
	BadMagic,

	#[error("invalid number of letters {0}, must be between 1 and 28")]
	InvalidLetterCount(u8),

	#[error("truncated input: 4 bytes needed at offset {offset}, {remaining} remaining")]
	TruncatedInput { offset: usize, remaining: usize },

	#[error("unexpected end of file: expected {expected} bytes, got {actual}")]
	UnexpectedEof { expected: usize, actual: usize },

	#[error("table shape mismatch: {0}")]
	TableShape(String),

	#[error("model cache error: {0}")]
	Cache(#[from] postcard::Error),

	#[error("no name could be sampled after {attempts} restarts")]
	SamplingExhausted { attempts: usize },
}

pub type Result<T> = std::result::Result<T, LtrError>;
