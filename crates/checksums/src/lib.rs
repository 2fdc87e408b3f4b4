#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `checksums` provides the two checksum families used while computing and
//! matching binary deltas:
//!
//! - [`rolling`] implements the 32-bit weak checksums that can be slid over a
//!   byte stream one byte at a time, in both the classic Adler-style variant
//!   and the RabinKarp polynomial variant.
//! - [`strong`] wraps the MD4 and BLAKE2b-256 digests behind the
//!   [`strong::StrongDigest`] trait so higher layers can pick the block hash
//!   from the signature format without hard-coding an algorithm.
//!
//! # Design
//!
//! The rolling variants share the [`RollingSum`] trait so the delta scanner
//! can be monomorphised over the variant chosen at job creation, keeping the
//! per-byte slide free of dynamic dispatch. Both variants support adding a
//! trailing byte, removing the leading byte, and the combined rotate used
//! when the window is full.
//!
//! # Invariants
//!
//! - A rolling sum's digest always describes exactly the bytes currently in
//!   the window: `update` over a window and any equivalent sequence of
//!   `rollin`/`rotate`/`rollout` calls produce identical digests.
//! - All arithmetic wraps; no input can panic or overflow.
//!
//! # Examples
//!
//! Slide a classic weak sum across a buffer and confirm it tracks a fresh
//! computation:
//!
//! ```
//! use checksums::{ClassicSum, RollingSum};
//!
//! let data = b"abcdefgh";
//! let mut rolling = ClassicSum::default();
//! rolling.update(&data[..4]);
//! rolling.rotate(data[0], data[4]);
//!
//! let mut fresh = ClassicSum::default();
//! fresh.update(&data[1..5]);
//! assert_eq!(rolling.digest(), fresh.digest());
//! ```

pub mod rolling;
pub mod strong;

pub use rolling::{ClassicSum, RabinKarp, RollingSum};
