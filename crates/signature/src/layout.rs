//! Signature parameter recommendation.
//!
//! Callers rarely want to pick a block length or strong-sum length by hand:
//! the block length trades signature size against delta size, and the
//! strong-sum length trades signature size against collision risk. This
//! module turns "whatever is sensible for a basis of this size" into
//! concrete numbers.

use std::num::{NonZeroU8, NonZeroU32};

use protocol::Magic;

use crate::sumset::SignatureError;

/// Block length used when the basis size is unknown.
pub const DEFAULT_BLOCK_LEN: u32 = 2048;

/// Smallest strong-sum length [`StrongLen::Minimum`] will ever recommend.
pub const DEFAULT_MIN_STRONG_LEN: usize = 12;

/// Per-block cost of a signature entry: the weak sum plus the widest strong
/// sum. Used to aim the signature size at the square root of the basis size.
const BLOCK_OVERHEAD: u64 = 36;

/// Requested strong-sum length.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StrongLen {
    /// Use exactly this many bytes.
    Exact(NonZeroU8),
    /// Use the native digest length: the best protection against crafted
    /// collisions.
    Maximum,
    /// Use the shortest length that keeps accidental collisions unlikely
    /// for the given basis size, floored at [`DEFAULT_MIN_STRONG_LEN`].
    Minimum,
}

/// Inputs to [`calculate_signature_layout`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SignatureLayoutParams {
    old_file_len: Option<u64>,
    magic: Option<Magic>,
    block_len: Option<NonZeroU32>,
    strong_len: StrongLen,
}

impl SignatureLayoutParams {
    /// Bundles the layout inputs.
    ///
    /// `old_file_len` is the basis size when known; `magic` and `block_len`
    /// are caller overrides, with `None` meaning "recommended".
    #[must_use]
    pub const fn new(
        old_file_len: Option<u64>,
        magic: Option<Magic>,
        block_len: Option<NonZeroU32>,
        strong_len: StrongLen,
    ) -> Self {
        Self {
            old_file_len,
            magic,
            block_len,
            strong_len,
        }
    }
}

/// The concrete parameters a signature job runs with.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SignatureLayout {
    /// Signature format to produce.
    pub magic: Magic,
    /// Block length in bytes.
    pub block_len: u32,
    /// Strong-sum length in bytes.
    pub strong_len: usize,
}

/// Resolves layout parameters into concrete recommended values.
///
/// # Errors
///
/// Rejects delta magics and explicit strong-sum lengths beyond the digest
/// length of the selected algorithm.
pub fn calculate_signature_layout(
    params: SignatureLayoutParams,
) -> Result<SignatureLayout, SignatureError> {
    let magic = params.magic.unwrap_or(Magic::RECOMMENDED_SIG);
    let Some(strong_kind) = magic.strong() else {
        return Err(SignatureError::NotASignature(magic));
    };
    let native = strong_kind.digest_len();

    let block_len = params.block_len.map_or_else(
        || {
            params
                .old_file_len
                .map_or(DEFAULT_BLOCK_LEN, recommended_block_len)
        },
        NonZeroU32::get,
    );

    let strong_len = match params.strong_len {
        StrongLen::Maximum => native,
        StrongLen::Exact(n) => {
            let n = usize::from(n.get());
            if n > native {
                return Err(SignatureError::StrongLenTooLarge {
                    requested: n,
                    max: native,
                });
            }
            n
        }
        StrongLen::Minimum => minimum_strong_len(params.old_file_len, block_len).min(native),
    };

    Ok(SignatureLayout {
        magic,
        block_len,
        strong_len,
    })
}

/// Aims the signature size at roughly the square root of the basis size:
/// with `blocks = file_len / block_len` entries of [`BLOCK_OVERHEAD`] bytes
/// each, `block_len = sqrt(file_len * overhead)` makes the signature and the
/// block length grow together.
fn recommended_block_len(file_len: u64) -> u32 {
    let target = (file_len.saturating_mul(BLOCK_OVERHEAD) as f64).sqrt().ceil() as u64;
    let rounded = target.div_ceil(16) * 16;
    rounded.clamp(64, 1 << 24) as u32
}

/// Smallest strong-sum length whose value space comfortably exceeds the
/// number of block comparisons a scan of a similarly sized new file will
/// perform.
fn minimum_strong_len(old_file_len: Option<u64>, block_len: u32) -> usize {
    let Some(file_len) = old_file_len else {
        return DEFAULT_MIN_STRONG_LEN;
    };
    let blocks = (file_len / u64::from(block_len)).max(1);
    // the new file size is unknown here; the old size is the usual estimate
    let comparisons = u128::from(blocks) * u128::from(blocks);
    let bits = 128 - comparisons.leading_zeros() as usize;
    bits.div_ceil(8).max(DEFAULT_MIN_STRONG_LEN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exact(n: u8) -> StrongLen {
        StrongLen::Exact(NonZeroU8::new(n).expect("non-zero"))
    }

    #[test]
    fn defaults_to_the_recommended_magic() {
        let layout = calculate_signature_layout(SignatureLayoutParams::new(
            None,
            None,
            None,
            StrongLen::Maximum,
        ))
        .expect("valid params");
        assert_eq!(layout.magic, Magic::SigRkBlake2);
        assert_eq!(layout.block_len, DEFAULT_BLOCK_LEN);
        assert_eq!(layout.strong_len, 32);
    }

    #[test]
    fn explicit_overrides_pass_through() {
        let layout = calculate_signature_layout(SignatureLayoutParams::new(
            Some(1 << 20),
            Some(Magic::SigMd4),
            NonZeroU32::new(512),
            exact(10),
        ))
        .expect("valid params");
        assert_eq!(layout.magic, Magic::SigMd4);
        assert_eq!(layout.block_len, 512);
        assert_eq!(layout.strong_len, 10);
    }

    #[test]
    fn delta_magic_is_rejected() {
        let result = calculate_signature_layout(SignatureLayoutParams::new(
            None,
            Some(Magic::Delta),
            None,
            StrongLen::Maximum,
        ));
        assert_eq!(result, Err(SignatureError::NotASignature(Magic::Delta)));
    }

    #[test]
    fn oversized_exact_strong_len_is_rejected() {
        let result = calculate_signature_layout(SignatureLayoutParams::new(
            None,
            Some(Magic::SigMd4),
            None,
            exact(17),
        ));
        assert_eq!(
            result,
            Err(SignatureError::StrongLenTooLarge {
                requested: 17,
                max: 16,
            })
        );
    }

    #[test]
    fn recommended_block_len_grows_with_the_file() {
        let small = recommended_block_len(1 << 16);
        let medium = recommended_block_len(1 << 24);
        let large = recommended_block_len(1 << 36);
        assert!(small <= medium && medium <= large);
        assert_eq!(small % 16, 0);
        assert!(small >= 64);
    }

    #[test]
    fn minimum_strong_len_is_floored_and_capped() {
        // unknown size falls back to the conservative floor
        assert_eq!(minimum_strong_len(None, 2048), DEFAULT_MIN_STRONG_LEN);

        // a small file cannot dip below the floor
        assert_eq!(minimum_strong_len(Some(1 << 16), 2048), DEFAULT_MIN_STRONG_LEN);

        // an enormous file needs more than the floor: 2^58 blocks give
        // 2^116 comparisons, so 15 bytes of strong sum are required
        let layout = calculate_signature_layout(SignatureLayoutParams::new(
            Some(u64::MAX),
            Some(Magic::SigMd4),
            NonZeroU32::new(64),
            StrongLen::Minimum,
        ))
        .expect("valid params");
        assert_eq!(layout.strong_len, 15);
    }
}
