#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `protocol` defines the on-disk vocabulary of delta and signature files:
//! the four-byte [`Magic`] numbers that open every stream, and the
//! byte-tagged [`Command`] instruction set that a delta stream is written
//! in.
//!
//! # Design
//!
//! The codec is driven by a single 256-entry [`COMMAND_TABLE`]: one entry
//! per opcode byte recording the command kind and the widths of its
//! operands. Both directions use it — the encoder picks the smallest
//! opcode whose operand widths fit the values being written, and the
//! decoder reads the opcode, consults the table for how many operand bytes
//! follow, and interprets them. Keeping a full table rather than range
//! arithmetic means the set of valid opcodes is stated exactly once.
//!
//! # Invariants
//!
//! - Encoding is canonical: for any command there is exactly one minimal
//!   encoding, and decoding it yields the original command.
//! - Operand widths are drawn from `{1, 2, 4, 8}` bytes, big-endian.
//! - Opcodes the table marks [`CommandKind::Reserved`] never decode
//!   successfully.
//!
//! # Errors
//!
//! [`WireError`] reports reserved opcodes, signature entries appearing in a
//! delta stream, and zero-length operands. Higher layers fold these into
//! their corrupt-stream error.
//!
//! # Examples
//!
//! ```
//! use protocol::{COMMAND_TABLE, Command, MAX_COMMAND_LEN, decode_operands};
//!
//! let cmd = Command::Copy { offset: 4096, len: 2048 };
//! let mut buf = [0u8; MAX_COMMAND_LEN];
//! let n = cmd.encode(&mut buf);
//!
//! let spec = &COMMAND_TABLE[buf[0] as usize];
//! assert_eq!(spec.total_size(), n);
//! assert_eq!(decode_operands(buf[0], &buf[1..n]), Ok(cmd));
//! ```

mod command;
mod magic;

pub use command::{
    COMMAND_TABLE, Command, CommandKind, CommandSpec, MAX_COMMAND_LEN, WireError, decode_operands,
};
pub use magic::{MAX_STRONG_LEN, Magic, RollsumKind, StrongKind};
