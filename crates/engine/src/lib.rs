#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `engine` is the streaming heart of rsdelta: a pull-driven, resumable job
//! engine that runs each of the four operations — signature generation,
//! signature loading, delta generation, patch application — incrementally
//! over caller-supplied buffers, suspending whenever input runs dry or
//! output space runs out.
//!
//! # Design
//!
//! A [`Job`] couples one family-specific state machine with the plumbing
//! every family shares: the buffer descriptor walk, an output queue that
//! survives output exhaustion, a hold buffer for fixed-size reads that span
//! iterate calls, statistics, and terminal-error latching. The engine's
//! transition loop is the only place that branches on machine state; the
//! families express nothing but their own transitions.
//!
//! The library performs no I/O. [`Buffers`] is the whole contract: callers
//! hand in slices, the job advances as far as those slices allow, and
//! [`JobStatus::Blocked`] means "refill or drain and call again".
//! [`Job::drive`] wraps that loop for callers with callback-shaped I/O, and
//! the patch job borrows basis bytes through the one-method [`BasisSource`]
//! capability.
//!
//! # Invariants
//!
//! - Output is prefix-consistent: after every iterate the produced bytes
//!   are a prefix of the final stream.
//! - Every iterate call consumes input, produces output, or advances the
//!   machine by a fixed-cost transition; no call spins.
//! - A job that returned an error returns the same error forever.
//!
//! # Errors
//!
//! All failures surface as the flat [`JobError`] taxonomy. `Done` and
//! `Blocked` are not errors; they are the [`JobStatus`] results.
//!
//! # Examples
//!
//! Generate a signature of a short basis in one call:
//!
//! ```
//! use engine::{Buffers, JobStatus, signature_begin};
//! use protocol::Magic;
//! use signature::SignatureLayout;
//!
//! let layout = SignatureLayout {
//!     magic: Magic::SigRkBlake2,
//!     block_len: 4,
//!     strong_len: 8,
//! };
//! let mut job = signature_begin(layout).unwrap();
//!
//! let basis = b"a tiny basis";
//! let mut out = [0u8; 256];
//! let mut buffers = Buffers::new(basis, true, &mut out);
//! assert_eq!(job.iterate(&mut buffers).unwrap(), JobStatus::Done);
//! assert_eq!(job.statistics().sig_blocks, 3);
//! ```

mod buffers;
mod delta;
mod error;
mod job;
mod patch;
mod sig;
mod stats;

pub use buffers::Buffers;
pub use error::JobError;
pub use job::{Job, JobStatus, delta_begin, loadsig_begin, patch_begin, signature_begin};
pub use patch::BasisSource;
pub use stats::Stats;
