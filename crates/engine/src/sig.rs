//! Signature generation and loading.
//!
//! Both directions of the signature wire format live here. Generation reads
//! the basis block by block and writes `magic || block_len || strong_len`
//! followed by one `weak || strong` record per block; loading parses the
//! same stream back into an in-memory [`Signature`]. The record stream has
//! no count or terminator — it simply ends with the input.

use protocol::Magic;
use signature::{Signature, SignatureLayout, StrongSum, weak_sum};

use crate::error::JobError;
use crate::job::{JobIo, Step};

#[derive(Clone, Copy)]
enum SigState {
    Header,
    Blocks,
}

pub(crate) struct SigJob {
    layout: SignatureLayout,
    state: SigState,
}

impl SigJob {
    pub(crate) fn new(layout: SignatureLayout) -> Self {
        Self {
            layout,
            state: SigState::Header,
        }
    }

    pub(crate) fn step(&mut self, io: &mut JobIo<'_, '_>) -> Result<Step, JobError> {
        match self.state {
            SigState::Header => {
                io.out.extend(&self.layout.magic.to_be_bytes());
                io.out.extend(&self.layout.block_len.to_be_bytes());
                io.out.extend(&(self.layout.strong_len as u32).to_be_bytes());
                io.stats.block_len = self.layout.block_len;
                self.state = SigState::Blocks;
                Ok(Step::Again)
            }
            SigState::Blocks => {
                let target = self.layout.block_len as usize;
                if io.hold.len() < target {
                    let need = target - io.hold.len();
                    let chunk = io.buf.take(need);
                    io.hold.extend_from_slice(chunk);
                }
                if io.hold.len() < target {
                    if !io.buf.eof_in() {
                        return Ok(Step::Blocked);
                    }
                    if io.hold.is_empty() {
                        return Ok(Step::Finished);
                    }
                }

                // a full block, or the shorter final block at end of input;
                // both are summed over their actual length
                let Some(rollsum) = self.layout.magic.rollsum() else {
                    return Err(JobError::Internal("signature job with a delta magic"));
                };
                let Some(strong_kind) = self.layout.magic.strong() else {
                    return Err(JobError::Internal("signature job with a delta magic"));
                };
                let weak = weak_sum(rollsum, io.hold.as_slice());
                let strong = StrongSum::compute(strong_kind, io.hold.as_slice());
                io.hold.clear();

                io.out.extend(&weak.to_be_bytes());
                io.out.extend(strong.prefix(self.layout.strong_len));
                io.stats.sig_blocks += 1;
                Ok(Step::Again)
            }
        }
    }
}

#[derive(Clone, Copy)]
enum LoadState {
    Magic,
    Params { magic: Magic },
    Blocks { record_len: usize },
}

pub(crate) struct LoadSigJob {
    state: LoadState,
    sig: Option<Signature>,
}

impl LoadSigJob {
    pub(crate) fn new() -> Self {
        Self {
            state: LoadState::Magic,
            sig: None,
        }
    }

    pub(crate) fn step(&mut self, io: &mut JobIo<'_, '_>) -> Result<Step, JobError> {
        match self.state {
            LoadState::Magic => {
                if !io.read_exact(4)? {
                    return Ok(Step::Blocked);
                }
                let mut raw = [0u8; 4];
                raw.copy_from_slice(&io.hold[..4]);
                io.hold.clear();
                let value = u32::from_be_bytes(raw);
                match Magic::from_u32(value) {
                    Some(magic) if magic.is_signature() => {
                        self.state = LoadState::Params { magic };
                        Ok(Step::Again)
                    }
                    _ => Err(JobError::BadMagic(value)),
                }
            }
            LoadState::Params { magic } => {
                if !io.read_exact(8)? {
                    return Ok(Step::Blocked);
                }
                let mut raw = [0u8; 4];
                raw.copy_from_slice(&io.hold[..4]);
                let block_len = u32::from_be_bytes(raw);
                raw.copy_from_slice(&io.hold[4..8]);
                let strong_len = u32::from_be_bytes(raw) as usize;
                io.hold.clear();

                let sig = Signature::new(magic, block_len, strong_len)
                    .map_err(|_| JobError::Corrupt("invalid signature header"))?;
                io.stats.block_len = block_len;
                self.sig = Some(sig);
                self.state = LoadState::Blocks {
                    record_len: 4 + strong_len,
                };
                Ok(Step::Again)
            }
            LoadState::Blocks { record_len } => {
                if io.hold.is_empty() && io.buf.remaining_in() == 0 {
                    if io.buf.eof_in() {
                        return Ok(Step::Finished);
                    }
                    return Ok(Step::Blocked);
                }
                if !io.read_exact(record_len)? {
                    return Ok(Step::Blocked);
                }

                let mut raw = [0u8; 4];
                raw.copy_from_slice(&io.hold[..4]);
                let weak = u32::from_be_bytes(raw);
                let Some(sig) = self.sig.as_mut() else {
                    return Err(JobError::Internal("signature records before the header"));
                };
                sig.push_block(weak, &io.hold[4..record_len])?;
                io.hold.clear();
                io.stats.sig_blocks += 1;
                Ok(Step::Again)
            }
        }
    }

    pub(crate) fn take_signature(&mut self) -> Option<Signature> {
        self.sig.take()
    }
}
