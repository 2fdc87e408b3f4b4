#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `signature` holds the in-memory form of a signature: the ordered table of
//! per-block checksums computed over a basis file, the hash index that makes
//! weak-sum lookups O(1) amortised while a new file is scanned byte by byte,
//! and the layout heuristics that pick sensible block and strong-sum lengths
//! for a given basis size.
//!
//! # Design
//!
//! A [`Signature`] starts as a plain append-only block table. Once every
//! block is present the caller calls [`Signature::build_index`], which builds
//! an open-addressed bucket array keyed on the weak sum with a parallel chain
//! array linking blocks that share a weak value. After indexing the table is
//! frozen: further appends are rejected rather than silently invalidating the
//! index.
//!
//! [`calculate_signature_layout`] is the parameter-recommendation step: given
//! the basis size (when known) and any caller overrides it produces the
//! `{magic, block_len, strong_len}` triple a signature job needs.
//!
//! # Invariants
//!
//! - The index, once built, covers exactly the current block table.
//! - [`Signature::find_block`] returns the lowest-indexed block whose weak
//!   sum and truncated strong sum both match.
//! - `strong_len` is constant for the whole signature and never exceeds the
//!   digest length of the strong algorithm the magic selects.
//!
//! # Errors
//!
//! [`SignatureError`] covers invalid construction parameters and misuse of
//! the freeze-after-index rule.
//!
//! # Examples
//!
//! ```
//! use protocol::Magic;
//! use signature::{BlockMatch, Signature, StrongSum, weak_sum};
//!
//! let magic = Magic::SigRkBlake2;
//! let block = b"some basis block";
//!
//! let mut sig = Signature::new(magic, block.len() as u32, 8).unwrap();
//! let strong = StrongSum::compute(magic.strong().unwrap(), block);
//! sig.push_block(weak_sum(magic.rollsum().unwrap(), block), strong.as_bytes())
//!     .unwrap();
//! sig.build_index();
//!
//! let weak = weak_sum(magic.rollsum().unwrap(), block);
//! assert_eq!(sig.find_block(weak, block), BlockMatch::Found(0));
//! ```

mod index;
mod layout;
mod sums;
mod sumset;

pub use layout::{
    DEFAULT_BLOCK_LEN, DEFAULT_MIN_STRONG_LEN, SignatureLayout, SignatureLayoutParams, StrongLen,
    calculate_signature_layout,
};
pub use sums::{StrongSum, weak_sum};
pub use sumset::{BlockMatch, BlockSig, Signature, SignatureError};
