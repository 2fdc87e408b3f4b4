//! Whole-stream convenience helpers.
//!
//! The job engine never performs I/O; these wrappers bolt it onto ordinary
//! `std::io` streams for the common case of "just run the operation over
//! these handles". Each helper drives one job to completion with 64 KiB
//! buffers and returns its statistics.

use std::io::{Read, Seek, SeekFrom, Write};

use engine::{BasisSource, Job, JobError, Stats};
use signature::{Signature, SignatureLayout};

const IO_BUF_LEN: usize = 64 * 1024;

fn pump<R, W>(job: &mut Job<'_>, input: &mut R, output: &mut W) -> Result<Stats, JobError>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut chunk = vec![0u8; IO_BUF_LEN];
    job.drive(
        |buf| {
            let n = input.read(&mut chunk)?;
            buf.extend_from_slice(&chunk[..n]);
            Ok(n == 0)
        },
        |bytes| output.write_all(bytes),
    )?;
    Ok(job.statistics().clone())
}

/// Reads the basis from `basis` and writes its signature stream to
/// `sig_out`.
///
/// # Errors
///
/// Invalid layout parameters surface as [`JobError::Param`]; stream
/// failures as [`JobError::Io`].
pub fn signature<R, W>(
    basis: &mut R,
    sig_out: &mut W,
    layout: SignatureLayout,
) -> Result<Stats, JobError>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut job = engine::signature_begin(layout)?;
    pump(&mut job, basis, sig_out)
}

/// Parses a signature stream into memory.
///
/// The caller still owns indexing: run [`Signature::build_index`] before
/// handing the result to [`delta`].
///
/// # Errors
///
/// Malformed streams surface as [`JobError::BadMagic`],
/// [`JobError::Corrupt`], or [`JobError::InputEnded`].
pub fn load_signature<R>(sig_in: &mut R) -> Result<Signature, JobError>
where
    R: Read + ?Sized,
{
    let mut job = engine::loadsig_begin();
    pump(&mut job, sig_in, &mut std::io::sink())?;
    job.take_signature()
        .ok_or(JobError::Internal("loadsig finished without a signature"))
}

/// Scans `new` against an indexed signature and writes the delta stream to
/// `delta_out`.
///
/// # Errors
///
/// [`JobError::Param`] if the signature is not indexed; stream failures as
/// [`JobError::Io`].
pub fn delta<R, W>(sig: &Signature, new: &mut R, delta_out: &mut W) -> Result<Stats, JobError>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut job = engine::delta_begin(sig)?;
    pump(&mut job, new, delta_out)
}

/// Applies the delta from `delta_in` against `basis`, writing the
/// reconstructed file to `out`.
///
/// # Errors
///
/// Corrupt deltas surface through the usual taxonomy; basis read failures
/// as [`JobError::Io`].
pub fn patch<B, R, W>(basis: B, delta_in: &mut R, out: &mut W) -> Result<Stats, JobError>
where
    B: BasisSource,
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut job = engine::patch_begin(basis);
    pump(&mut job, delta_in, out)
}

/// Adapts any seekable reader — most usefully a [`std::fs::File`] — into a
/// [`BasisSource`] for [`patch`].
#[derive(Debug)]
pub struct SeekBasis<F> {
    inner: F,
}

impl<F: Read + Seek> SeekBasis<F> {
    /// Wraps a seekable reader.
    pub fn new(inner: F) -> Self {
        Self { inner }
    }

    /// Returns the wrapped reader.
    pub fn into_inner(self) -> F {
        self.inner
    }
}

impl<F: Read + Seek> BasisSource for SeekBasis<F> {
    fn copy(&mut self, pos: u64, buf: &mut [u8]) -> std::io::Result<usize> {
        self.inner.seek(SeekFrom::Start(pos))?;
        let n = self.inner.read(buf)?;
        if n == 0 && !buf.is_empty() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "copy past the end of the basis",
            ));
        }
        Ok(n)
    }
}
