//! The job state machine driver.
//!
//! Every operation — signature generation, signature loading, delta
//! generation, patch application — is a [`Job`]: a resumable state machine
//! advanced only by explicit [`iterate`](Job::iterate) calls over
//! caller-supplied [`Buffers`]. The driver owns the plumbing the families
//! share: the output queue that survives output-buffer exhaustion, the hold
//! buffer that accumulates fixed-size reads across calls, statistics, and
//! terminal-error latching. The family machines only express their own
//! transitions.

use checksums::{ClassicSum, RabinKarp};
use protocol::{Command, MAX_COMMAND_LEN, RollsumKind};
use signature::{Signature, SignatureLayout};

use crate::buffers::Buffers;
use crate::delta::DeltaJob;
use crate::error::JobError;
use crate::patch::{BasisSource, PatchJob};
use crate::sig::{LoadSigJob, SigJob};
use crate::stats::Stats;

/// Outcome of a successful iterate call.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum JobStatus {
    /// The job finished normally and can be dropped.
    Done,
    /// The job needs more input, more output space, or both.
    Blocked,
}

/// Outcome of one machine step.
pub(crate) enum Step {
    /// Progress was made; step again.
    Again,
    /// More input is required before the next transition.
    Blocked,
    /// The machine has reached its terminal state.
    Finished,
}

pub(crate) enum Machine<'a> {
    Signature(SigJob),
    LoadSig(LoadSigJob),
    DeltaClassic(DeltaJob<'a, ClassicSum>),
    DeltaRabinKarp(DeltaJob<'a, RabinKarp>),
    Patch(PatchJob<'a>),
}

impl Machine<'_> {
    fn step(&mut self, io: &mut JobIo<'_, '_>) -> Result<Step, JobError> {
        match self {
            Self::Signature(job) => job.step(io),
            Self::LoadSig(job) => job.step(io),
            Self::DeltaClassic(job) => job.step(io),
            Self::DeltaRabinKarp(job) => job.step(io),
            Self::Patch(job) => job.step(io),
        }
    }
}

/// Bytes already committed by a machine but not yet accepted by the caller's
/// output buffer.
pub(crate) struct OutQueue {
    buf: Vec<u8>,
    pos: usize,
}

impl OutQueue {
    fn new() -> Self {
        Self {
            buf: Vec::new(),
            pos: 0,
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.pos == self.buf.len()
    }

    pub(crate) fn extend(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Encodes a command header into the queue; returns the header size.
    pub(crate) fn push_cmd(&mut self, cmd: &Command) -> usize {
        let mut header = [0u8; MAX_COMMAND_LEN];
        let n = cmd.encode(&mut header);
        self.buf.extend_from_slice(&header[..n]);
        n
    }

    fn drain_into(&mut self, buffers: &mut Buffers<'_>) {
        let n = buffers.write(&self.buf[self.pos..]);
        self.pos += n;
        if self.pos == self.buf.len() {
            self.buf.clear();
            self.pos = 0;
        }
    }
}

/// The engine-side view a machine works against during one step.
pub(crate) struct JobIo<'e, 'b> {
    pub(crate) buf: &'e mut Buffers<'b>,
    pub(crate) hold: &'e mut Vec<u8>,
    pub(crate) out: &'e mut OutQueue,
    pub(crate) stats: &'e mut Stats,
}

impl JobIo<'_, '_> {
    /// Accumulates exactly `n` input bytes in the hold buffer.
    ///
    /// Returns `Ok(true)` once `hold` contains `n` bytes; the machine
    /// consumes them and clears the buffer. `Ok(false)` means more input
    /// must arrive first. Hitting end-of-input with a partial hold is
    /// [`JobError::InputEnded`].
    pub(crate) fn read_exact(&mut self, n: usize) -> Result<bool, JobError> {
        if self.hold.len() < n {
            let need = n - self.hold.len();
            let chunk = self.buf.take(need);
            self.hold.extend_from_slice(chunk);
        }
        if self.hold.len() == n {
            Ok(true)
        } else if self.buf.eof_in() {
            Err(JobError::InputEnded)
        } else {
            Ok(false)
        }
    }
}

/// A streaming operation in progress.
///
/// Created by [`signature_begin`], [`loadsig_begin`], [`delta_begin`], or
/// [`patch_begin`]; advanced by [`iterate`](Self::iterate) until it returns
/// [`JobStatus::Done`] or an error. A job that has failed stays failed:
/// every further iterate returns the same error.
pub struct Job<'a> {
    machine: Machine<'a>,
    hold: Vec<u8>,
    out: OutQueue,
    stats: Stats,
    fatal: Option<JobError>,
    finished: bool,
}

impl<'a> Job<'a> {
    pub(crate) fn new(op: &'static str, machine: Machine<'a>) -> Self {
        Self {
            machine,
            hold: Vec::new(),
            out: OutQueue::new(),
            stats: Stats::new(op),
            fatal: None,
            finished: false,
        }
    }

    /// Runs the state machine until it finishes or exhausts the buffers.
    ///
    /// A single call is not interruptible; suspension is only visible as the
    /// [`JobStatus::Blocked`] return. Each call consumes input, produces
    /// output, or takes a fixed-cost transition — a blocked job re-invoked
    /// with the same empty buffers simply blocks again.
    ///
    /// # Errors
    ///
    /// Any [`JobError`]; the job is then terminal and every later call
    /// returns the same error.
    pub fn iterate(&mut self, buffers: &mut Buffers<'_>) -> Result<JobStatus, JobError> {
        if let Some(err) = &self.fatal {
            return Err(err.clone());
        }

        let in_before = buffers.consumed();
        let out_before = buffers.produced();
        let result = self.run(buffers);
        self.stats.in_bytes += (buffers.consumed() - in_before) as u64;
        self.stats.out_bytes += (buffers.produced() - out_before) as u64;

        match result {
            Ok(JobStatus::Done) => {
                self.stats.mark_finished();
                tracing::debug!(stats = %self.stats, "job finished");
                Ok(JobStatus::Done)
            }
            Ok(JobStatus::Blocked) => Ok(JobStatus::Blocked),
            Err(err) => {
                self.fatal = Some(err.clone());
                Err(err)
            }
        }
    }

    fn run(&mut self, buffers: &mut Buffers<'_>) -> Result<JobStatus, JobError> {
        loop {
            self.out.drain_into(buffers);
            if !self.out.is_empty() {
                return Ok(JobStatus::Blocked);
            }
            if self.finished {
                return Ok(JobStatus::Done);
            }

            let step = self.machine.step(&mut JobIo {
                buf: buffers,
                hold: &mut self.hold,
                out: &mut self.out,
                stats: &mut self.stats,
            })?;
            match step {
                Step::Again => {}
                Step::Blocked => {
                    self.out.drain_into(buffers);
                    return Ok(JobStatus::Blocked);
                }
                Step::Finished => {
                    self.finished = true;
                }
            }
        }
    }

    /// Drives the job to completion with caller callbacks.
    ///
    /// `fill` is invoked whenever the internal input buffer runs dry; it
    /// appends whatever is available and returns `true` once no more input
    /// will ever arrive. `sink` receives every produced chunk in order.
    /// This is a convenience loop with no semantics of its own — everything
    /// observable happens through [`iterate`](Self::iterate).
    ///
    /// # Errors
    ///
    /// Job errors are returned as-is; callback failures surface as
    /// [`JobError::Io`].
    pub fn drive<In, Out>(&mut self, mut fill: In, mut sink: Out) -> Result<(), JobError>
    where
        In: FnMut(&mut Vec<u8>) -> std::io::Result<bool>,
        Out: FnMut(&[u8]) -> std::io::Result<()>,
    {
        let mut input = Vec::new();
        let mut eof = false;
        let mut outbuf = vec![0u8; 64 * 1024];

        loop {
            if input.is_empty() && !eof {
                eof = fill(&mut input)?;
            }

            let mut buffers = Buffers::new(&input, eof, &mut outbuf);
            let status = self.iterate(&mut buffers)?;
            let consumed = buffers.consumed();
            let produced = buffers.produced();

            if produced > 0 {
                sink(&outbuf[..produced])?;
            }
            input.drain(..consumed);

            match status {
                JobStatus::Done => return Ok(()),
                JobStatus::Blocked => {
                    if consumed == 0 && produced == 0 && eof && input.is_empty() {
                        return Err(JobError::Internal("job blocked with no input left"));
                    }
                }
            }
        }
    }

    /// The job's statistics so far.
    #[must_use]
    pub fn statistics(&self) -> &Stats {
        &self.stats
    }

    /// Extracts the signature built by a finished loadsig job.
    ///
    /// Returns `None` for other job families, for unfinished jobs, and on
    /// second and later calls.
    pub fn take_signature(&mut self) -> Option<Signature> {
        if !self.finished {
            return None;
        }
        match &mut self.machine {
            Machine::LoadSig(job) => job.take_signature(),
            _ => None,
        }
    }
}

/// Starts a job that reads a basis and produces its signature stream.
///
/// # Errors
///
/// [`JobError::Param`] if the layout names a delta magic, a zero block
/// length, or a strong-sum length outside the digest.
pub fn signature_begin(layout: SignatureLayout) -> Result<Job<'static>, JobError> {
    Signature::new(layout.magic, layout.block_len, layout.strong_len)?;
    tracing::debug!(
        magic = ?layout.magic,
        block_len = layout.block_len,
        strong_len = layout.strong_len,
        "starting signature job"
    );
    Ok(Job::new("signature", Machine::Signature(SigJob::new(layout))))
}

/// Starts a job that parses a signature stream into a [`Signature`].
///
/// Feed it the signature bytes and, once it reports [`JobStatus::Done`],
/// collect the result with [`Job::take_signature`]. The signature still
/// needs [`Signature::build_index`] before it can serve a delta job.
#[must_use]
pub fn loadsig_begin() -> Job<'static> {
    tracing::debug!("starting signature load job");
    Job::new("loadsig", Machine::LoadSig(LoadSigJob::new()))
}

/// Starts a job that scans a new file and produces a delta stream.
///
/// The rolling-sum variant is fixed here, from the signature's magic, so the
/// scanner's inner loop carries no per-byte dispatch.
///
/// # Errors
///
/// [`JobError::Param`] if the signature has not been indexed.
pub fn delta_begin(sig: &Signature) -> Result<Job<'_>, JobError> {
    if !sig.is_indexed() {
        return Err(JobError::Param("signature is not indexed"));
    }
    tracing::debug!(
        blocks = sig.block_count(),
        block_len = sig.block_len(),
        "starting delta job"
    );
    let machine = match sig.rollsum_kind() {
        RollsumKind::Classic => Machine::DeltaClassic(DeltaJob::new(sig)),
        RollsumKind::RabinKarp => Machine::DeltaRabinKarp(DeltaJob::new(sig)),
    };
    Ok(Job::new("delta", machine))
}

/// Starts a job that applies a delta stream, reading the basis through
/// `basis` and producing the reconstructed file.
#[must_use]
pub fn patch_begin<'a, B>(basis: B) -> Job<'a>
where
    B: BasisSource + 'a,
{
    tracing::debug!("starting patch job");
    Job::new("patch", Machine::Patch(PatchJob::new(Box::new(basis))))
}
