//! Performance benchmarks for meta block encoding, decoding and scanning
//!
//! This benchmark suite evaluates:
//! - Single block encode/decode across data patterns
//! - Streaming writer/reader throughput
//! - Reverse enumeration of all blocks in a buffer

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use oxiarc_meta::{
    ENSURE_RAW_BYTES, LastMode, MetaReader, MetaWriter, decode_slice, encode_block,
    reverse_blocks, reverse_search,
};
use std::hint::black_box;
use std::io::Read;

/// Type alias for pattern generator functions
type PatternGenerator = fn(usize) -> Vec<u8>;

/// Generate test data patterns for benchmarking
mod test_data {
    /// Random data - varied byte values
    pub fn random(size: usize) -> Vec<u8> {
        let mut data = Vec::with_capacity(size);
        let mut seed: u64 = 0x123456789ABCDEF0;
        for _ in 0..size {
            // Linear congruential generator
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
            data.push((seed >> 32) as u8);
        }
        data
    }

    /// Zero data - all zeros
    pub fn zeros(size: usize) -> Vec<u8> {
        vec![0; size]
    }

    /// Text-like data
    pub fn text_like(size: usize) -> Vec<u8> {
        let text = b"The quick brown fox jumps over the lazy dog. ";
        text.iter().copied().cycle().take(size).collect()
    }
}

/// Standard data sizes for benchmarking
mod data_sizes {
    pub const SMALL: usize = 4 * 1024; // 4 KB
    pub const LARGE: usize = 64 * 1024; // 64 KB
}

const PATTERNS: [(&str, PatternGenerator); 3] = [
    ("random", test_data::random),
    ("zeros", test_data::zeros),
    ("text", test_data::text_like),
];

fn encode_stream(data: &[u8]) -> Vec<u8> {
    let mut writer = MetaWriter::new(Vec::new());
    writer.write(data).unwrap();
    writer.close().unwrap();
    writer.into_inner()
}

/// Benchmark single block encode and decode
fn bench_block(c: &mut Criterion) {
    let mut group = c.benchmark_group("block");
    group.throughput(Throughput::Bytes(ENSURE_RAW_BYTES as u64));

    for (name, generator) in PATTERNS {
        let chunk = generator(ENSURE_RAW_BYTES);
        let block = encode_block(&chunk, LastMode::Continuation).unwrap();

        group.bench_with_input(BenchmarkId::new("encode", name), &chunk, |b, chunk| {
            b.iter(|| encode_block(black_box(chunk), LastMode::Continuation))
        });
        group.bench_with_input(BenchmarkId::new("decode", name), &block, |b, block| {
            b.iter(|| decode_slice(black_box(block)))
        });
    }

    group.finish();
}

/// Benchmark streaming writer and reader throughput
fn bench_stream(c: &mut Criterion) {
    let mut group = c.benchmark_group("stream");

    for size in [data_sizes::SMALL, data_sizes::LARGE] {
        let data = test_data::random(size);
        let encoded = encode_stream(&data);
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_with_input(BenchmarkId::new("write", size), &data, |b, data| {
            b.iter(|| encode_stream(black_box(data)))
        });
        group.bench_with_input(BenchmarkId::new("read", size), &encoded, |b, encoded| {
            b.iter(|| {
                let mut out = Vec::with_capacity(size);
                MetaReader::new(black_box(&encoded[..]))
                    .read_to_end(&mut out)
                    .unwrap();
                out
            })
        });
    }

    group.finish();
}

/// Benchmark reverse search and full reverse enumeration
fn bench_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan");

    for size in [data_sizes::SMALL, data_sizes::LARGE] {
        let encoded = encode_stream(&test_data::random(size));
        let noise = test_data::random(encoded.len());
        group.throughput(Throughput::Bytes(encoded.len() as u64));

        group.bench_with_input(BenchmarkId::new("last", size), &encoded, |b, encoded| {
            b.iter(|| reverse_search(black_box(encoded)))
        });
        group.bench_with_input(BenchmarkId::new("all", size), &encoded, |b, encoded| {
            b.iter(|| reverse_blocks(black_box(encoded)).count())
        });
        group.bench_with_input(BenchmarkId::new("noise", size), &noise, |b, noise| {
            b.iter(|| reverse_search(black_box(noise)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_block, bench_stream, bench_scan);
criterion_main!(benches);
