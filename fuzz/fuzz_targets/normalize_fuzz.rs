#![no_main]
use libfuzzer_sys::fuzz_target;
use revdelta::diff::block::{DiffBlock, assert_well_formed};
use revdelta::diff::compare::BytesComparer;
use revdelta::diff::myers::{DiffAlgorithm, Myers};
use revdelta::diff::normalize::normalize;

fn apply(left: &[u8], right: &[u8], blocks: &[DiffBlock]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut spos = 0usize;
    for b in blocks {
        out.extend_from_slice(&left[spos..b.source_start]);
        out.extend_from_slice(&right[b.target_start..b.target_end]);
        spos = b.source_end;
    }
    out.extend_from_slice(&left[spos..]);
    out
}

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    // First byte: gutter and alphabet narrowing; second: split point.
    let gutter = (data[0] & 0x03) as usize;
    let mask = if data[0] & 0x04 != 0 { 0x03 } else { 0xFF };
    let split = (data[1] as usize * data.len()) / 256;
    let payload: Vec<u8> = data[2..].iter().map(|b| b & mask).collect();
    let split = split.min(payload.len());
    let (left, right) = payload.split_at(split);

    let cmp = BytesComparer::new(left, right);
    let mut blocks = Myers::default().diff(&cmp);
    assert_well_formed(&blocks, left.len(), right.len());

    normalize(&cmp, gutter, &mut blocks);
    assert_well_formed(&blocks, left.len(), right.len());
    assert_eq!(apply(left, right, &blocks), right, "normalization changed the edit");

    // Idempotence.
    let before = blocks.clone();
    normalize(&cmp, gutter, &mut blocks);
    assert_eq!(blocks, before, "normalize not idempotent");
});
