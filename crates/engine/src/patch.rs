//! The patch applier.
//!
//! Patch consumes a delta stream and reconstructs the new file, pulling
//! basis bytes through a caller-supplied [`BasisSource`] whenever a copy
//! command asks for them. The opcode dispatch is entirely table-driven:
//! read one byte, look up how many operand bytes follow, decode, act.

use std::io;
use std::sync::Arc;

use protocol::{COMMAND_TABLE, Command, Magic, decode_operands};

use crate::error::JobError;
use crate::job::{JobIo, Step};

/// Read access to the basis during patching.
///
/// `copy` fills `buf` with basis bytes starting at `pos` and returns how
/// many it produced. Short reads are legal — the patch job simply asks
/// again for the remainder — but a zero-length read is treated as an error,
/// and positions beyond the basis must fail with the implementation's own
/// `io::Error`.
pub trait BasisSource {
    /// Reads up to `buf.len()` bytes of basis starting at `pos`.
    fn copy(&mut self, pos: u64, buf: &mut [u8]) -> io::Result<usize>;
}

impl BasisSource for &[u8] {
    fn copy(&mut self, pos: u64, buf: &mut [u8]) -> io::Result<usize> {
        let Ok(start) = usize::try_from(pos) else {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "copy past the end of the basis",
            ));
        };
        if start >= self.len() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "copy past the end of the basis",
            ));
        }
        let n = buf.len().min(self.len() - start);
        buf[..n].copy_from_slice(&self[start..start + n]);
        Ok(n)
    }
}

impl<B: BasisSource + ?Sized> BasisSource for &mut B {
    fn copy(&mut self, pos: u64, buf: &mut [u8]) -> io::Result<usize> {
        (**self).copy(pos, buf)
    }
}

/// Basis bytes are fetched and forwarded in chunks of this size so output
/// stays bounded between drains.
const COPY_CHUNK: usize = 8 * 1024;

#[derive(Clone, Copy)]
enum PatchState {
    Magic,
    Opcode,
    Params { opcode: u8 },
    Literal { remaining: u64 },
    Copy { pos: u64, remaining: u64 },
}

pub(crate) struct PatchJob<'a> {
    basis: Box<dyn BasisSource + 'a>,
    state: PatchState,
    scratch: Vec<u8>,
}

impl<'a> PatchJob<'a> {
    pub(crate) fn new(basis: Box<dyn BasisSource + 'a>) -> Self {
        Self {
            basis,
            state: PatchState::Magic,
            scratch: vec![0u8; COPY_CHUNK],
        }
    }

    pub(crate) fn step(&mut self, io: &mut JobIo<'_, '_>) -> Result<Step, JobError> {
        match self.state {
            PatchState::Magic => {
                if !io.read_exact(4)? {
                    return Ok(Step::Blocked);
                }
                let mut raw = [0u8; 4];
                raw.copy_from_slice(&io.hold[..4]);
                io.hold.clear();
                let value = u32::from_be_bytes(raw);
                if Magic::from_u32(value) != Some(Magic::Delta) {
                    return Err(JobError::BadMagic(value));
                }
                self.state = PatchState::Opcode;
                Ok(Step::Again)
            }
            PatchState::Opcode => {
                if !io.read_exact(1)? {
                    return Ok(Step::Blocked);
                }
                let opcode = io.hold[0];
                io.hold.clear();
                let spec = &COMMAND_TABLE[opcode as usize];
                if spec.param_len() > 0 {
                    self.state = PatchState::Params { opcode };
                    Ok(Step::Again)
                } else {
                    self.dispatch(opcode, &[], io)
                }
            }
            PatchState::Params { opcode } => {
                let param_len = COMMAND_TABLE[opcode as usize].param_len();
                if !io.read_exact(param_len)? {
                    return Ok(Step::Blocked);
                }
                let mut params = [0u8; 16];
                params[..param_len].copy_from_slice(&io.hold[..param_len]);
                io.hold.clear();
                self.dispatch(opcode, &params[..param_len], io)
            }
            PatchState::Literal { remaining } => self.copy_through(remaining, io),
            PatchState::Copy { pos, remaining } => self.copy_basis(pos, remaining, io),
        }
    }

    fn dispatch(
        &mut self,
        opcode: u8,
        params: &[u8],
        io: &mut JobIo<'_, '_>,
    ) -> Result<Step, JobError> {
        match decode_operands(opcode, params)? {
            Command::End => Ok(Step::Finished),
            Command::Literal { len } => {
                io.stats.lit_cmds += 1;
                io.stats.lit_cmdbytes += 1 + params.len() as u64;
                self.state = PatchState::Literal { remaining: len };
                Ok(Step::Again)
            }
            Command::Copy { offset, len } => {
                io.stats.copy_cmds += 1;
                io.stats.copy_cmdbytes += 1 + params.len() as u64;
                self.state = PatchState::Copy {
                    pos: offset,
                    remaining: len,
                };
                Ok(Step::Again)
            }
        }
    }

    /// Streams literal bytes from the delta straight through to the output.
    fn copy_through(&mut self, remaining: u64, io: &mut JobIo<'_, '_>) -> Result<Step, JobError> {
        if io.buf.remaining_in() == 0 {
            if io.buf.eof_in() {
                return Err(JobError::InputEnded);
            }
            return Ok(Step::Blocked);
        }
        let want = remaining.min(COPY_CHUNK as u64) as usize;
        let chunk = io.buf.take(want);
        let moved = chunk.len() as u64;
        io.out.extend(chunk);
        io.stats.lit_bytes += moved;
        self.state = if moved == remaining {
            PatchState::Opcode
        } else {
            PatchState::Literal {
                remaining: remaining - moved,
            }
        };
        Ok(Step::Again)
    }

    /// Fetches the next chunk of a copy range from the basis.
    fn copy_basis(
        &mut self,
        pos: u64,
        remaining: u64,
        io: &mut JobIo<'_, '_>,
    ) -> Result<Step, JobError> {
        let want = remaining.min(self.scratch.len() as u64) as usize;
        let got = self.basis.copy(pos, &mut self.scratch[..want])?;
        if got == 0 {
            return Err(JobError::Io(Arc::new(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "basis source returned no data",
            ))));
        }
        let got = got.min(want);
        io.out.extend(&self.scratch[..got]);
        io.stats.copy_bytes += got as u64;
        self.state = if got as u64 == remaining {
            PatchState::Opcode
        } else {
            PatchState::Copy {
                pos: pos + got as u64,
                remaining: remaining - got as u64,
            }
        };
        Ok(Step::Again)
    }
}
