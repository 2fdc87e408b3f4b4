//! Shared helpers for the engine integration tests.

#![allow(dead_code)]

use engine::{Job, JobError};
use protocol::{COMMAND_TABLE, Command, MAX_COMMAND_LEN, Magic, decode_operands};
use signature::{Signature, SignatureLayout};

/// Feeds `input` to the job in one piece and collects all output.
pub fn run_to_vec(job: &mut Job<'_>, input: &[u8]) -> Result<Vec<u8>, JobError> {
    let mut out = Vec::new();
    job.drive(
        |buf| {
            buf.extend_from_slice(input);
            Ok(true)
        },
        |chunk| {
            out.extend_from_slice(chunk);
            Ok(())
        },
    )?;
    Ok(out)
}

/// Generates, serialises, reloads, and indexes a signature of `basis`.
pub fn make_signature(basis: &[u8], magic: Magic, block_len: u32, strong_len: usize) -> Signature {
    let layout = SignatureLayout {
        magic,
        block_len,
        strong_len,
    };
    let mut sig_job = engine::signature_begin(layout).expect("valid layout");
    let sig_bytes = run_to_vec(&mut sig_job, basis).expect("signature generation succeeds");

    let mut load_job = engine::loadsig_begin();
    run_to_vec(&mut load_job, &sig_bytes).expect("signature load succeeds");
    let mut sig = load_job.take_signature().expect("signature available after load");
    sig.build_index();
    sig
}

/// Produces the delta taking `basis` (already summarised in `sig`) to `new`.
pub fn make_delta(sig: &Signature, new: &[u8]) -> Vec<u8> {
    let mut job = engine::delta_begin(sig).expect("indexed signature");
    run_to_vec(&mut job, new).expect("delta generation succeeds")
}

/// Applies `delta` against `basis` and returns the reconstructed bytes.
pub fn apply_patch(basis: &[u8], delta: &[u8]) -> Vec<u8> {
    let mut job = engine::patch_begin(basis);
    run_to_vec(&mut job, delta).expect("patch succeeds")
}

/// Parses a delta stream into its command sequence, skipping literal
/// payloads. Panics on malformed input; tests feed it engine output.
pub fn parse_delta(delta: &[u8]) -> Vec<Command> {
    assert_eq!(&delta[..4], &Magic::Delta.to_be_bytes(), "delta magic");
    let mut commands = Vec::new();
    let mut pos = 4;
    loop {
        let opcode = delta[pos];
        let spec = &COMMAND_TABLE[opcode as usize];
        let params = &delta[pos + 1..pos + spec.total_size()];
        let cmd = decode_operands(opcode, params).expect("well-formed command");
        pos += spec.total_size();
        if let Command::Literal { len } = cmd {
            pos += len as usize;
        }
        commands.push(cmd);
        if cmd == Command::End {
            assert_eq!(pos, delta.len(), "no trailing bytes after END");
            return commands;
        }
    }
}

/// Decodes every command of `delta` and re-encodes the stream; canonical
/// encodings survive byte for byte.
pub fn reencode_delta(delta: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&delta[..4]);
    let mut pos = 4;
    loop {
        let opcode = delta[pos];
        let spec = &COMMAND_TABLE[opcode as usize];
        let params = &delta[pos + 1..pos + spec.total_size()];
        let cmd = decode_operands(opcode, params).expect("well-formed command");
        pos += spec.total_size();

        let mut header = [0u8; MAX_COMMAND_LEN];
        let n = cmd.encode(&mut header);
        out.extend_from_slice(&header[..n]);
        if let Command::Literal { len } = cmd {
            out.extend_from_slice(&delta[pos..pos + len as usize]);
            pos += len as usize;
        }
        if cmd == Command::End {
            return out;
        }
    }
}

/// Deterministic pseudo-random bytes for bulk test data.
pub fn pseudo_random(len: usize, mut seed: u64) -> Vec<u8> {
    (0..len)
        .map(|_| {
            seed = seed
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (seed >> 33) as u8
        })
        .collect()
}
