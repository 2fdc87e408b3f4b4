//! Checksum dispatch by signature kind.
//!
//! Jobs know which rolling-sum variant and strong digest a signature uses
//! from its magic; these helpers compute whole-block sums for that choice.
//! The per-byte sliding path does not go through here — the delta scanner is
//! monomorphised over the rolling variant — but whole-block computation is
//! per-block work where an enum dispatch costs nothing measurable.

use checksums::strong::{Blake2, Md4, StrongDigest};
use checksums::{ClassicSum, RabinKarp, RollingSum};
use protocol::{MAX_STRONG_LEN, RollsumKind, StrongKind};

/// Computes the weak rolling checksum of a whole block.
#[must_use]
pub fn weak_sum(kind: RollsumKind, block: &[u8]) -> u32 {
    match kind {
        RollsumKind::Classic => {
            let mut sum = ClassicSum::new();
            sum.update(block);
            sum.digest()
        }
        RollsumKind::RabinKarp => {
            let mut sum = RabinKarp::new();
            sum.update(block);
            sum.digest()
        }
    }
}

/// A strong digest of a block, stored at its native length.
///
/// Signatures truncate strong sums to their configured `strong_len`; the
/// full digest is kept here so one computation can be compared against any
/// truncation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct StrongSum {
    bytes: [u8; MAX_STRONG_LEN],
    len: u8,
}

impl StrongSum {
    /// Computes the strong digest of `block` with the given algorithm.
    #[must_use]
    pub fn compute(kind: StrongKind, block: &[u8]) -> Self {
        let mut bytes = [0u8; MAX_STRONG_LEN];
        let len = match kind {
            StrongKind::Md4 => {
                let digest = Md4::digest(block);
                bytes[..digest.len()].copy_from_slice(&digest);
                digest.len()
            }
            StrongKind::Blake2 => {
                let digest = Blake2::digest(block);
                bytes.copy_from_slice(&digest);
                digest.len()
            }
        };
        Self { bytes, len: len as u8 }
    }

    /// The digest at its native length.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..usize::from(self.len)]
    }

    /// The first `n` bytes of the digest.
    ///
    /// `n` must not exceed the native digest length.
    #[must_use]
    pub fn prefix(&self, n: usize) -> &[u8] {
        &self.bytes[..n]
    }
}
