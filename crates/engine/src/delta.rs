//! The delta scanner.
//!
//! The scanner slides a block-sized window over the new file, keeping a
//! rolling weak sum of exactly the bytes in the window. Every window
//! position is probed against the signature index; a confirmed match emits
//! the bytes that slid past as a literal and the matched block as a copy,
//! then restarts the window after the match. Copies of adjacent basis
//! ranges are coalesced into one command.
//!
//! The window lives at the tail of a single scoop buffer; everything in the
//! scoop before the window is the pending literal run. Sliding the window
//! forward therefore costs one rolling-sum rotate and one appended byte —
//! no data moves until a literal is flushed.

use checksums::RollingSum;
use protocol::{Command, Magic};
use signature::{BlockMatch, Signature};

use crate::error::JobError;
use crate::job::{JobIo, Step};

/// Pending literal bytes are flushed once they reach this size, which keeps
/// the scoop bounded no matter how little of the new file matches.
const MAX_LITERAL_RUN: usize = 64 * 1024;

#[derive(Clone, Copy)]
struct CopySpan {
    offset: u64,
    len: u64,
}

#[derive(Clone, Copy)]
enum DeltaState {
    Header,
    Scan,
}

pub(crate) struct DeltaJob<'a, R> {
    sig: &'a Signature,
    block_len: usize,
    state: DeltaState,
    sum: R,
    /// Pending literal run followed by the current window.
    scoop: Vec<u8>,
    /// Where the window starts inside the scoop.
    win_start: usize,
    /// Whether the current window position has already been probed.
    probed: bool,
    pending_copy: Option<CopySpan>,
}

impl<'a, R: RollingSum> DeltaJob<'a, R> {
    pub(crate) fn new(sig: &'a Signature) -> Self {
        let block_len = sig.block_len() as usize;
        Self {
            sig,
            block_len,
            state: DeltaState::Header,
            sum: R::default(),
            scoop: Vec::with_capacity(MAX_LITERAL_RUN + block_len),
            win_start: 0,
            probed: false,
            pending_copy: None,
        }
    }

    pub(crate) fn step(&mut self, io: &mut JobIo<'_, '_>) -> Result<Step, JobError> {
        match self.state {
            DeltaState::Header => {
                io.out.extend(&Magic::Delta.to_be_bytes());
                io.stats.block_len = self.sig.block_len();
                self.state = DeltaState::Scan;
                Ok(Step::Again)
            }
            DeltaState::Scan => self.scan(io),
        }
    }

    fn scan(&mut self, io: &mut JobIo<'_, '_>) -> Result<Step, JobError> {
        loop {
            // top up the window
            let win_len = self.scoop.len() - self.win_start;
            if win_len < self.block_len {
                let chunk = io.buf.take(self.block_len - win_len);
                if !chunk.is_empty() {
                    self.sum.update(chunk);
                    self.scoop.extend_from_slice(chunk);
                    self.probed = false;
                    continue;
                }
                if !io.buf.eof_in() {
                    return Ok(Step::Blocked);
                }
            }

            let win_len = self.scoop.len() - self.win_start;
            if win_len == 0 {
                self.flush_literal(io);
                self.flush_copy(io);
                io.out.push_cmd(&Command::End);
                return Ok(Step::Finished);
            }

            if !self.probed {
                self.probed = true;
                let window = &self.scoop[self.win_start..];
                match self.sig.find_block(self.sum.digest(), window) {
                    BlockMatch::Found(idx) => {
                        let offset = idx as u64 * self.block_len as u64;
                        let len = win_len as u64;
                        tracing::trace!(block = idx, offset, len, "block match");
                        self.flush_literal(io);
                        self.append_copy(io, offset, len);
                        io.stats.matches += 1;
                        self.scoop.clear();
                        self.win_start = 0;
                        self.sum.reset();
                        self.probed = false;
                        return Ok(Step::Again);
                    }
                    BlockMatch::WeakOnly => {
                        io.stats.false_matches += 1;
                    }
                    BlockMatch::Miss => {}
                }
            }

            // no match here: slide forward, or shrink once the input is gone
            if win_len == self.block_len {
                let chunk = io.buf.take(1);
                if let &[inn] = chunk {
                    self.sum.rotate(self.scoop[self.win_start], inn);
                    self.scoop.push(inn);
                    self.win_start += 1;
                } else if io.buf.eof_in() {
                    self.sum.rollout(self.scoop[self.win_start]);
                    self.win_start += 1;
                } else {
                    return Ok(Step::Blocked);
                }
            } else {
                // a short window only exists at end of input
                self.sum.rollout(self.scoop[self.win_start]);
                self.win_start += 1;
            }
            self.probed = false;

            if self.win_start >= MAX_LITERAL_RUN {
                self.flush_literal(io);
                return Ok(Step::Again);
            }
        }
    }

    /// Emits the pending literal run, if any. Ordering: any pending copy
    /// precedes the literal bytes in the stream, so it is flushed first.
    fn flush_literal(&mut self, io: &mut JobIo<'_, '_>) {
        if self.win_start == 0 {
            return;
        }
        self.flush_copy(io);
        let len = self.win_start as u64;
        let cmdbytes = io.out.push_cmd(&Command::Literal { len });
        io.out.extend(&self.scoop[..self.win_start]);
        io.stats.lit_cmds += 1;
        io.stats.lit_bytes += len;
        io.stats.lit_cmdbytes += cmdbytes as u64;
        self.scoop.drain(..self.win_start);
        self.win_start = 0;
    }

    fn flush_copy(&mut self, io: &mut JobIo<'_, '_>) {
        if let Some(span) = self.pending_copy.take() {
            let cmdbytes = io.out.push_cmd(&Command::Copy {
                offset: span.offset,
                len: span.len,
            });
            io.stats.copy_cmds += 1;
            io.stats.copy_bytes += span.len;
            io.stats.copy_cmdbytes += cmdbytes as u64;
        }
    }

    /// Extends the pending copy when `offset` continues it, otherwise flushes
    /// and starts a new span.
    fn append_copy(&mut self, io: &mut JobIo<'_, '_>, offset: u64, len: u64) {
        match &mut self.pending_copy {
            Some(span) if span.offset + span.len == offset => span.len += len,
            _ => {
                self.flush_copy(io);
                self.pending_copy = Some(CopySpan { offset, len });
            }
        }
    }
}
