//! The signature block table.

use protocol::{MAX_STRONG_LEN, Magic, RollsumKind, StrongKind};
use thiserror::Error;

use crate::index::BlockIndex;
use crate::sums::StrongSum;

/// Errors raised while constructing or mutating a signature.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum SignatureError {
    /// The magic describes a delta stream, not a signature.
    #[error("magic {0:?} does not describe a signature")]
    NotASignature(Magic),
    /// The block length was zero.
    #[error("block length must be non-zero")]
    ZeroBlockLength,
    /// The strong-sum length was zero.
    #[error("strong sum length must be non-zero")]
    ZeroStrongLen,
    /// The strong-sum length exceeds the digest the magic selects.
    #[error("strong sum length {requested} exceeds the {max}-byte digest")]
    StrongLenTooLarge {
        /// Length the caller asked for.
        requested: usize,
        /// Native digest length of the selected algorithm.
        max: usize,
    },
    /// A pushed strong sum was shorter than the configured length.
    #[error("strong sum of {provided} bytes is shorter than the configured {expected}")]
    TruncatedStrongSum {
        /// Length of the sum the caller provided.
        provided: usize,
        /// The signature's configured strong-sum length.
        expected: usize,
    },
    /// The signature is indexed and therefore frozen.
    #[error("signature is already indexed; no more blocks may be added")]
    Indexed,
}

/// Checksums of one basis block.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BlockSig {
    weak: u32,
    strong: [u8; MAX_STRONG_LEN],
}

impl BlockSig {
    /// The block's weak rolling checksum.
    #[must_use]
    pub const fn weak(&self) -> u32 {
        self.weak
    }

    /// The stored strong sum truncated to `n` bytes.
    #[must_use]
    pub fn strong_prefix(&self, n: usize) -> &[u8] {
        &self.strong[..n]
    }
}

/// Result of probing the signature for a window of new-file bytes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BlockMatch {
    /// The lowest-indexed block whose weak and strong sums both match.
    Found(usize),
    /// At least one block matched the weak sum but none confirmed on the
    /// strong sum — a false alarm worth counting.
    WeakOnly,
    /// No block carries this weak sum.
    Miss,
}

/// An ordered table of block checksums plus its lazily built weak-sum index.
///
/// The table is populated with [`push_block`](Self::push_block) — by the
/// signature-loading job, or by any caller assembling a signature in memory —
/// then frozen with [`build_index`](Self::build_index), after which
/// [`find_block`](Self::find_block) serves lookups for the delta scanner.
#[derive(Clone, Debug)]
pub struct Signature {
    magic: Magic,
    rollsum: RollsumKind,
    strong: StrongKind,
    block_len: u32,
    strong_len: usize,
    blocks: Vec<BlockSig>,
    index: Option<BlockIndex>,
}

impl Signature {
    /// Creates an empty signature for the given format.
    ///
    /// # Errors
    ///
    /// Rejects delta magics, zero block lengths, and strong-sum lengths of
    /// zero or beyond the digest length the magic selects.
    pub fn new(magic: Magic, block_len: u32, strong_len: usize) -> Result<Self, SignatureError> {
        let (Some(rollsum), Some(strong)) = (magic.rollsum(), magic.strong()) else {
            return Err(SignatureError::NotASignature(magic));
        };
        if block_len == 0 {
            return Err(SignatureError::ZeroBlockLength);
        }
        if strong_len == 0 {
            return Err(SignatureError::ZeroStrongLen);
        }
        if strong_len > strong.digest_len() {
            return Err(SignatureError::StrongLenTooLarge {
                requested: strong_len,
                max: strong.digest_len(),
            });
        }
        Ok(Self {
            magic,
            rollsum,
            strong,
            block_len,
            strong_len,
            blocks: Vec::new(),
            index: None,
        })
    }

    /// The signature's magic number.
    #[must_use]
    pub const fn magic(&self) -> Magic {
        self.magic
    }

    /// The rolling-sum variant the magic selects.
    #[must_use]
    pub const fn rollsum_kind(&self) -> RollsumKind {
        self.rollsum
    }

    /// The strong digest the magic selects.
    #[must_use]
    pub const fn strong_kind(&self) -> StrongKind {
        self.strong
    }

    /// Nominal block length in bytes.
    #[must_use]
    pub const fn block_len(&self) -> u32 {
        self.block_len
    }

    /// Stored strong-sum length in bytes.
    #[must_use]
    pub const fn strong_len(&self) -> usize {
        self.strong_len
    }

    /// Number of blocks in the table.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Returns `true` if the table holds no blocks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Returns `true` once [`build_index`](Self::build_index) has run.
    #[must_use]
    pub const fn is_indexed(&self) -> bool {
        self.index.is_some()
    }

    /// Appends the checksums of the next block.
    ///
    /// `strong` must be at least `strong_len` bytes; anything beyond the
    /// configured length is discarded.
    ///
    /// # Errors
    ///
    /// Fails once the signature is indexed, or if `strong` is shorter than
    /// the configured length.
    pub fn push_block(&mut self, weak: u32, strong: &[u8]) -> Result<(), SignatureError> {
        if self.index.is_some() {
            return Err(SignatureError::Indexed);
        }
        if strong.len() < self.strong_len {
            return Err(SignatureError::TruncatedStrongSum {
                provided: strong.len(),
                expected: self.strong_len,
            });
        }
        let mut stored = [0u8; MAX_STRONG_LEN];
        stored[..self.strong_len].copy_from_slice(&strong[..self.strong_len]);
        self.blocks.push(BlockSig {
            weak,
            strong: stored,
        });
        Ok(())
    }

    /// Builds the weak-sum index, freezing the block table.
    ///
    /// Calling this again is a no-op; the index always covers the complete
    /// table because appends are rejected after the first build.
    pub fn build_index(&mut self) {
        if self.index.is_none() {
            self.index = Some(BlockIndex::build(&self.blocks));
        }
    }

    /// Looks up the window's checksums in the index.
    ///
    /// The strong sum of `window` is only computed when the weak sum hits,
    /// and is compared truncated to the signature's `strong_len`. With
    /// duplicate blocks in the basis, the lowest block index wins.
    #[must_use]
    pub fn find_block(&self, weak: u32, window: &[u8]) -> BlockMatch {
        let Some(index) = &self.index else {
            debug_assert!(false, "find_block before build_index");
            return BlockMatch::Miss;
        };
        let Some(mut candidate) = index.chain_head(&self.blocks, weak) else {
            return BlockMatch::Miss;
        };

        let strong = StrongSum::compute(self.strong, window);
        let prefix = strong.prefix(self.strong_len);
        loop {
            if self.blocks[candidate as usize].strong_prefix(self.strong_len) == prefix {
                return BlockMatch::Found(candidate as usize);
            }
            match index.chain_next(candidate) {
                Some(next) => candidate = next,
                None => return BlockMatch::WeakOnly,
            }
        }
    }

    /// The blocks in table order.
    #[must_use]
    pub fn blocks(&self) -> &[BlockSig] {
        &self.blocks
    }
}
