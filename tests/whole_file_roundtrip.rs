//! File-backed round trips through the whole-stream helpers.
//!
//! The three parties of a sync — basis owner, new-file owner, patcher —
//! only ever exchange the signature and delta streams. These tests act the
//! parts out over real files in a temporary directory.

use std::fs::File;
use std::io::{Seek, SeekFrom, Write};
use std::num::NonZeroU32;

use rand::{Rng, RngCore};
use rsdelta::{
    Magic, SignatureLayoutParams, StrongLen, calculate_signature_layout,
    whole::{self, SeekBasis},
};
use tempfile::tempdir;

fn write_file(path: &std::path::Path, contents: &[u8]) -> File {
    let mut file = File::create(path).expect("create file");
    file.write_all(contents).expect("write file");
    file.sync_all().expect("sync file");
    File::open(path).expect("reopen file")
}

fn random_bytes(len: usize) -> Vec<u8> {
    let mut data = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut data);
    data
}

#[test]
fn files_round_trip_through_signature_delta_and_patch() {
    let dir = tempdir().expect("temp dir");

    let basis = random_bytes(200 * 1024);
    let mut new = basis.clone();
    // mutate: overwrite a stretch, delete a stretch, append
    let start = 50 * 1024;
    rand::thread_rng().fill_bytes(&mut new[start..start + 4096]);
    new.drain(120 * 1024..140 * 1024);
    new.extend_from_slice(&random_bytes(8 * 1024));

    let mut basis_file = write_file(&dir.path().join("basis"), &basis);
    let new_file_path = dir.path().join("new");
    let mut new_file = write_file(&new_file_path, &new);

    // party one: signature of the basis
    let layout = calculate_signature_layout(SignatureLayoutParams::new(
        Some(basis.len() as u64),
        None,
        None,
        StrongLen::Minimum,
    ))
    .expect("layout");
    let mut sig_file = File::create(dir.path().join("sig")).expect("create sig");
    let sig_stats = whole::signature(&mut basis_file, &mut sig_file, layout).expect("signature");
    assert!(sig_stats.sig_blocks > 0);

    // party two: load the signature, index it, emit the delta
    let mut sig_file = File::open(dir.path().join("sig")).expect("open sig");
    let mut sig = whole::load_signature(&mut sig_file).expect("load signature");
    assert_eq!(sig.block_count() as u64, sig_stats.sig_blocks);
    sig.build_index();

    let mut delta_file = File::create(dir.path().join("delta")).expect("create delta");
    let delta_stats = whole::delta(&sig, &mut new_file, &mut delta_file).expect("delta");
    assert_eq!(
        delta_stats.lit_bytes + delta_stats.copy_bytes,
        new.len() as u64
    );
    // most of the file is unchanged, so copies should dominate
    assert!(delta_stats.copy_bytes > delta_stats.lit_bytes);

    // party one again: apply the delta against the basis
    let basis_file = File::open(dir.path().join("basis")).expect("open basis");
    let mut delta_file = File::open(dir.path().join("delta")).expect("open delta");
    let mut patched_file = File::create(dir.path().join("patched")).expect("create patched");
    whole::patch(
        SeekBasis::new(basis_file),
        &mut delta_file,
        &mut patched_file,
    )
    .expect("patch");

    let patched = std::fs::read(dir.path().join("patched")).expect("read patched");
    assert_eq!(patched, new);
}

#[test]
fn identical_files_produce_copy_only_deltas() {
    let dir = tempdir().expect("temp dir");
    let data = random_bytes(32 * 1024);

    let mut basis_file = write_file(&dir.path().join("basis"), &data);
    let layout = calculate_signature_layout(SignatureLayoutParams::new(
        Some(data.len() as u64),
        Some(Magic::SigRkBlake2),
        NonZeroU32::new(2048),
        StrongLen::Maximum,
    ))
    .expect("layout");

    let mut sig_stream = Vec::new();
    whole::signature(&mut basis_file, &mut sig_stream, layout).expect("signature");

    let mut sig = whole::load_signature(&mut &sig_stream[..]).expect("load");
    sig.build_index();

    basis_file.seek(SeekFrom::Start(0)).expect("rewind");
    let mut delta_stream = Vec::new();
    let stats = whole::delta(&sig, &mut basis_file, &mut delta_stream).expect("delta");
    assert_eq!(stats.lit_bytes, 0);
    assert_eq!(stats.copy_bytes, data.len() as u64);

    // a copy-only delta is tiny next to the file it reconstructs
    assert!(delta_stream.len() < 64);

    let mut patched = Vec::new();
    whole::patch(&data[..], &mut &delta_stream[..], &mut patched).expect("patch");
    assert_eq!(patched, data);
}

#[test]
fn layout_heuristics_scale_with_file_size() {
    let small = calculate_signature_layout(SignatureLayoutParams::new(
        Some(64 * 1024),
        None,
        None,
        StrongLen::Minimum,
    ))
    .expect("layout");
    let large = calculate_signature_layout(SignatureLayoutParams::new(
        Some(1 << 32),
        None,
        None,
        StrongLen::Minimum,
    ))
    .expect("layout");

    assert!(small.block_len < large.block_len);
    assert!(small.strong_len <= large.strong_len);

    // and a random block of either size still round-trips
    let data = random_bytes(rand::thread_rng().gen_range(1000..5000));
    let mut sig_stream = Vec::new();
    whole::signature(&mut &data[..], &mut sig_stream, small).expect("signature");
    let mut sig = whole::load_signature(&mut &sig_stream[..]).expect("load");
    sig.build_index();

    let mut delta_stream = Vec::new();
    whole::delta(&sig, &mut &data[..], &mut delta_stream).expect("delta");
    let mut patched = Vec::new();
    whole::patch(&data[..], &mut &delta_stream[..], &mut patched).expect("patch");
    assert_eq!(patched, data);
}
