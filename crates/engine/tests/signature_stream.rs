//! The signature wire format, byte for byte.
//!
//! `magic (4B BE) || block_len (4B BE) || strong_len (4B BE)` followed by
//! one `weak (4B BE) || strong[..strong_len]` record per block, ending with
//! the input. Interoperability depends on this layout exactly, so it is
//! pinned against independently computed checksums.

mod common;

use common::{pseudo_random, run_to_vec};
use protocol::Magic;
use signature::{SignatureLayout, StrongSum, weak_sum};

fn generate(basis: &[u8], magic: Magic, block_len: u32, strong_len: usize) -> Vec<u8> {
    let layout = SignatureLayout {
        magic,
        block_len,
        strong_len,
    };
    let mut job = engine::signature_begin(layout).expect("valid layout");
    run_to_vec(&mut job, basis).expect("signature run")
}

#[test]
fn header_and_records_follow_the_wire_layout() {
    let basis = pseudo_random(1000, 77);
    let block_len = 256u32;
    let strong_len = 8usize;
    let magic = Magic::SigRkBlake2;

    let stream = generate(&basis, magic, block_len, strong_len);

    // header
    assert_eq!(&stream[..4], &magic.to_be_bytes());
    assert_eq!(&stream[4..8], &block_len.to_be_bytes());
    assert_eq!(&stream[8..12], &(strong_len as u32).to_be_bytes());

    // 1000 bytes in 256-byte blocks: three full blocks and a 232-byte tail
    let record_len = 4 + strong_len;
    assert_eq!(stream.len(), 12 + 4 * record_len);

    for (i, block) in basis.chunks(block_len as usize).enumerate() {
        let record = &stream[12 + i * record_len..12 + (i + 1) * record_len];
        let expected_weak = weak_sum(magic.rollsum().unwrap(), block);
        let expected_strong = StrongSum::compute(magic.strong().unwrap(), block);
        assert_eq!(&record[..4], &expected_weak.to_be_bytes(), "record {i} weak");
        assert_eq!(
            &record[4..],
            expected_strong.prefix(strong_len),
            "record {i} strong"
        );
    }
}

#[test]
fn final_partial_block_is_summed_over_its_actual_length() {
    let basis = b"0123456789"; // 10 bytes, blocks of 4: 4 + 4 + 2
    let magic = Magic::SigMd4;
    let stream = generate(basis, magic, 4, 6);

    let record_len = 4 + 6;
    assert_eq!(stream.len(), 12 + 3 * record_len);

    let tail_record = &stream[12 + 2 * record_len..];
    let expected_weak = weak_sum(magic.rollsum().unwrap(), b"89");
    let expected_strong = StrongSum::compute(magic.strong().unwrap(), b"89");
    assert_eq!(&tail_record[..4], &expected_weak.to_be_bytes());
    assert_eq!(&tail_record[4..], expected_strong.prefix(6));
}

#[test]
fn loaded_signature_reproduces_the_block_table() {
    let basis = pseudo_random(5000, 79);
    let magic = Magic::SigBlake2;
    let block_len = 600u32;
    let strong_len = 10usize;
    let stream = generate(&basis, magic, block_len, strong_len);

    let mut load = engine::loadsig_begin();
    run_to_vec(&mut load, &stream).expect("load run");
    let sig = load.take_signature().expect("signature present");

    assert_eq!(sig.magic(), magic);
    assert_eq!(sig.block_len(), block_len);
    assert_eq!(sig.strong_len(), strong_len);
    assert_eq!(sig.block_count(), basis.len().div_ceil(block_len as usize));

    for (i, block) in basis.chunks(block_len as usize).enumerate() {
        let stored = &sig.blocks()[i];
        assert_eq!(stored.weak(), weak_sum(magic.rollsum().unwrap(), block));
        assert_eq!(
            stored.strong_prefix(strong_len),
            StrongSum::compute(magic.strong().unwrap(), block).prefix(strong_len)
        );
    }
}

#[test]
fn empty_basis_is_header_only() {
    let stream = generate(b"", Magic::SigRkBlake2, 2048, 32);
    assert_eq!(stream.len(), 12);

    let mut load = engine::loadsig_begin();
    run_to_vec(&mut load, &stream).expect("load run");
    let sig = load.take_signature().expect("signature present");
    assert_eq!(sig.block_count(), 0);
}
