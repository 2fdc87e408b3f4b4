//! Per-job performance statistics.

use std::fmt;
use std::time::{Duration, SystemTime};

/// Counters updated in place while a job runs.
///
/// Which fields move depends on the job family: the delta job drives the
/// literal/copy/match counters, the signature jobs count blocks, and every
/// job tracks total bytes in and out.
#[derive(Clone, Debug)]
pub struct Stats {
    /// Name of the operation, e.g. `"delta"`.
    pub op: &'static str,
    /// Number of literal commands emitted or consumed.
    pub lit_cmds: u64,
    /// Number of literal payload bytes.
    pub lit_bytes: u64,
    /// Bytes spent on literal command headers.
    pub lit_cmdbytes: u64,
    /// Number of copy commands emitted or consumed.
    pub copy_cmds: u64,
    /// Number of bytes covered by copy commands.
    pub copy_bytes: u64,
    /// Bytes spent on copy command headers.
    pub copy_cmdbytes: u64,
    /// Block matches found while scanning (before coalescing).
    pub matches: u64,
    /// Weak-sum hits that failed strong-sum confirmation.
    pub false_matches: u64,
    /// Blocks described by the signature.
    pub sig_blocks: u64,
    /// Block length in effect, in bytes.
    pub block_len: u32,
    /// Total bytes consumed from the input buffers.
    pub in_bytes: u64,
    /// Total bytes produced into the output buffers.
    pub out_bytes: u64,
    /// Wall-clock time the job was created.
    pub start: SystemTime,
    /// Wall-clock time the job finished, once it has.
    pub end: Option<SystemTime>,
}

impl Stats {
    pub(crate) fn new(op: &'static str) -> Self {
        Self {
            op,
            lit_cmds: 0,
            lit_bytes: 0,
            lit_cmdbytes: 0,
            copy_cmds: 0,
            copy_bytes: 0,
            copy_cmdbytes: 0,
            matches: 0,
            false_matches: 0,
            sig_blocks: 0,
            block_len: 0,
            in_bytes: 0,
            out_bytes: 0,
            start: SystemTime::now(),
            end: None,
        }
    }

    pub(crate) fn mark_finished(&mut self) {
        if self.end.is_none() {
            self.end = Some(SystemTime::now());
        }
    }

    /// Wall-clock duration from creation to completion, if finished.
    #[must_use]
    pub fn elapsed(&self) -> Option<Duration> {
        self.end.and_then(|end| end.duration_since(self.start).ok())
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} statistics: literal[{} cmds, {} bytes, {} cmdbytes] \
             copy[{} cmds, {} bytes, {} cmdbytes, {} false] \
             signature[{} blocks, {} block_len] in {} bytes, out {} bytes",
            self.op,
            self.lit_cmds,
            self.lit_bytes,
            self.lit_cmdbytes,
            self.copy_cmds,
            self.copy_bytes,
            self.copy_cmdbytes,
            self.false_matches,
            self.sig_blocks,
            self.block_len,
            self.in_bytes,
            self.out_bytes,
        )
    }
}
