//! The error taxonomy shared by every job family.

use std::sync::Arc;

use protocol::WireError;
use signature::SignatureError;
use thiserror::Error;

/// Terminal failure of a job.
///
/// Errors are latched: once an iterate call fails, the job stays in its
/// error state and every later call returns the same value. The type is
/// `Clone` for exactly that reason — I/O causes are shared behind an [`Arc`]
/// rather than duplicated.
#[derive(Clone, Debug, Error)]
pub enum JobError {
    /// Input ended while the operation still required more bytes.
    #[error("unexpected end of input")]
    InputEnded,
    /// The stream did not start with a recognised magic number.
    #[error("bad magic number {0:#010x} at start of stream")]
    BadMagic(u32),
    /// The stream contained an unreasonable value.
    #[error("corrupt stream: {0}")]
    Corrupt(&'static str),
    /// The stream used a command this implementation does not support.
    #[error("unimplemented command {0:#04x}")]
    Unimplemented(u8),
    /// An allocation failed.
    #[error("out of memory")]
    Memory,
    /// A caller-supplied argument was invalid.
    #[error("invalid parameter: {0}")]
    Param(&'static str),
    /// An external I/O callback failed; the cause is propagated verbatim.
    #[error("I/O error: {0}")]
    Io(#[source] Arc<std::io::Error>),
    /// An internal invariant was violated; this indicates a bug.
    #[error("internal error: {0}")]
    Internal(&'static str),
}

impl From<std::io::Error> for JobError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(Arc::new(err))
    }
}

impl From<WireError> for JobError {
    fn from(err: WireError) -> Self {
        match err {
            WireError::ReservedOpcode { .. } => Self::Corrupt("reserved command opcode"),
            WireError::SignatureCommand { .. } => {
                Self::Corrupt("signature command inside a delta stream")
            }
            WireError::ZeroLength { .. } => Self::Corrupt("zero-length command operand"),
        }
    }
}

impl From<SignatureError> for JobError {
    fn from(err: SignatureError) -> Self {
        match err {
            SignatureError::NotASignature(_) => Self::Param("magic does not describe a signature"),
            SignatureError::ZeroBlockLength => Self::Param("block length must be non-zero"),
            SignatureError::ZeroStrongLen => Self::Param("strong sum length must be non-zero"),
            SignatureError::StrongLenTooLarge { .. } => {
                Self::Param("strong sum length exceeds the digest length")
            }
            SignatureError::TruncatedStrongSum { .. } => {
                Self::Internal("strong sum shorter than the configured length")
            }
            SignatureError::Indexed => Self::Internal("signature mutated after indexing"),
        }
    }
}
