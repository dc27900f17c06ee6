//! Reverse enumeration and false positive tests for the scanner.

use oxiarc_meta::{
    LastMode, MAGIC, MIN_ENC_BYTES, MetaWriter, reverse_blocks, reverse_locate, reverse_search,
};

fn lcg_bytes(len: usize, mut seed: u64) -> Vec<u8> {
    (0..len)
        .map(|_| {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
            (seed >> 32) as u8
        })
        .collect()
}

#[test]
fn test_enumerate_all_blocks() {
    let data = lcg_bytes(20_000, 0x123456789ABCDEF0);
    let decisions = lcg_bytes(2_000, 17);

    let mut writer = MetaWriter::new(Vec::new());
    let mut expected_modes = Vec::new();
    let mut rest = &data[..];
    for &d in &decisions {
        if rest.is_empty() {
            break;
        }
        let n = (d as usize % 50).min(rest.len());
        writer.write(&rest[..n]).unwrap();
        rest = &rest[n..];
        if d % 4 == 0 {
            let mode = LastMode::ALL[(d as usize / 4) % 3];
            writer.flush_block(mode).unwrap();
            expected_modes.push(mode);
        }
    }
    writer.write(rest).unwrap();
    writer.close().unwrap();

    let stats = writer.stats();
    let stream = writer.into_inner();

    // Apply (search, truncate) until nothing is left.
    let mut end = stream.len();
    let mut count = 0u64;
    while let Some(offset) = reverse_search(&stream[..end]) {
        assert!(offset < end);
        end = offset;
        count += 1;
    }
    assert_eq!(end, 0, "residual bytes");
    assert_eq!(count, stats.num_blocks);

    // Same result through the iterator, with payloads in reverse order.
    let blocks: Vec<_> = reverse_blocks(&stream).collect();
    assert_eq!(blocks.len() as u64, stats.num_blocks);
    let joined: Vec<u8> = blocks.iter().rev().flat_map(|b| b.data.clone()).collect();
    assert_eq!(joined, data);
    assert_eq!(blocks[0].last, LastMode::EndOfStream);

    // Every explicitly flushed mode shows up in order.
    let modes: Vec<LastMode> = blocks
        .iter()
        .rev()
        .map(|b| b.last)
        .filter(|&m| m != LastMode::Continuation)
        .collect();
    let mut wanted: Vec<LastMode> = expected_modes
        .into_iter()
        .filter(|&m| m != LastMode::Continuation)
        .collect();
    wanted.push(LastMode::EndOfStream);
    assert_eq!(modes, wanted);
}

#[test]
fn test_random_noise() {
    for seed in 0..8u64 {
        let noise = lcg_bytes(4096, seed);
        assert_eq!(reverse_search(&noise), None, "seed {}", seed);
    }
}

#[test]
fn test_noise_with_planted_magic() {
    let mut noise = lcg_bytes(4096, 1234);
    for pos in (MIN_ENC_BYTES..noise.len() - MAGIC.len()).step_by(45) {
        noise[pos..pos + MAGIC.len()].copy_from_slice(&MAGIC);
    }
    assert_eq!(reverse_search(&noise), None);
}

#[test]
fn test_short_buffers() {
    let mut writer = MetaWriter::new(Vec::new());
    writer.close().unwrap();
    let block = writer.into_inner();
    assert_eq!(block.len(), MIN_ENC_BYTES);

    for len in 0..block.len() {
        assert_eq!(reverse_search(&block[..len]), None);
    }
    let located = reverse_locate(&block).unwrap();
    assert_eq!(located.offset, 0);
    assert!(located.data.is_empty());
}

#[test]
fn test_block_inside_noise() {
    let mut writer = MetaWriter::new(Vec::new());
    writer.write(b"needle").unwrap();
    writer.flush_block(LastMode::EndOfMetaSegment).unwrap();
    let block = writer.into_inner();

    let mut buf = lcg_bytes(1000, 5);
    let offset = buf.len();
    buf.extend_from_slice(&block);
    buf.extend(lcg_bytes(1000, 6));

    let located = reverse_locate(&buf).unwrap();
    assert_eq!(located.offset, offset);
    assert_eq!(located.data, b"needle");
    assert_eq!(located.last, LastMode::EndOfMetaSegment);
}
