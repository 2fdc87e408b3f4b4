#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `rsdelta` computes and applies binary deltas between similar byte
//! sequences using the rsync rolling-checksum algorithm. The owner of the
//! old file (the *basis*) produces a compact *signature*; whoever holds the
//! new file plus that signature produces a *delta*; the delta plus the
//! basis reconstructs the new file. No step ever needs both files at once.
//!
//! # Design
//!
//! The work happens in four member crates, re-exported here:
//!
//! - [`engine`]: the streaming job engine — every operation is a resumable
//!   [`Job`] advanced over caller-supplied [`Buffers`].
//! - [`signature`]: the in-memory signature, its weak-sum index, and the
//!   layout heuristics.
//! - [`protocol`]: magic numbers and the command-stream codec.
//! - [`checksums`]: the rolling weak sums and strong digest wrappers.
//!
//! The [`whole`] module wraps the job engine for callers with ordinary
//! `std::io` streams and no appetite for buffer plumbing.
//!
//! # Examples
//!
//! Sync a changed in-memory "file" through the whole-stream helpers:
//!
//! ```
//! use std::io::Cursor;
//! use std::num::NonZeroU32;
//!
//! use rsdelta::{SignatureLayoutParams, StrongLen, calculate_signature_layout, whole};
//!
//! let basis = b"hello, old world".to_vec();
//! let new = b"hello, new world".to_vec();
//!
//! // basis owner: signature
//! let layout = calculate_signature_layout(SignatureLayoutParams::new(
//!     Some(basis.len() as u64),
//!     None,
//!     NonZeroU32::new(4),
//!     StrongLen::Minimum,
//! ))
//! .unwrap();
//! let mut sig_stream = Vec::new();
//! whole::signature(&mut Cursor::new(&basis), &mut sig_stream, layout).unwrap();
//!
//! // new-file owner: delta
//! let mut sig = whole::load_signature(&mut Cursor::new(&sig_stream)).unwrap();
//! sig.build_index();
//! let mut delta_stream = Vec::new();
//! whole::delta(&sig, &mut Cursor::new(&new), &mut delta_stream).unwrap();
//!
//! // basis owner again: patch
//! let mut patched = Vec::new();
//! whole::patch(&basis[..], &mut Cursor::new(&delta_stream), &mut patched).unwrap();
//! assert_eq!(patched, new);
//! ```

pub mod whole;

pub use checksums::{ClassicSum, RabinKarp, RollingSum};
pub use engine::{
    BasisSource, Buffers, Job, JobError, JobStatus, Stats, delta_begin, loadsig_begin,
    patch_begin, signature_begin,
};
pub use protocol::{Command, Magic, RollsumKind, StrongKind};
pub use signature::{
    BlockMatch, Signature, SignatureLayout, SignatureLayoutParams, StrongLen,
    calculate_signature_layout,
};
