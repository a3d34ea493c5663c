//! Key encoding benchmarks.
//!
//! Benchmarks for:
//! - ordered varint encode/decode
//! - escaped byte string encode/decode
//! - composite primary keys (text + int)

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tablekv_common::types::{Datum, Kind};
use tablekv_encoding::{
    decode_bytes, decode_key, decode_varint, encode_bytes, encode_key, encode_varint,
};

fn generate_ints(count: usize) -> Vec<i64> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..count)
        .map(|i| if i % 3 == 0 { rng.gen() } else { rng.gen_range(-1000..1000) })
        .collect()
}

fn generate_strings(count: usize, len: usize) -> Vec<Vec<u8>> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..count)
        .map(|_| (0..len).map(|_| rng.gen_range(0u8..8)).collect())
        .collect()
}

fn bench_varint(c: &mut Criterion) {
    let mut group = c.benchmark_group("encoding/varint");
    let values = generate_ints(10_000);
    let encoded: Vec<Vec<u8>> = values
        .iter()
        .map(|v| {
            let mut buf = Vec::new();
            encode_varint(&mut buf, *v);
            buf
        })
        .collect();

    group.throughput(Throughput::Elements(values.len() as u64));
    group.bench_function("encode", |b| {
        let mut buf = Vec::with_capacity(16);
        b.iter(|| {
            for v in &values {
                buf.clear();
                encode_varint(&mut buf, *v);
                black_box(&buf);
            }
        });
    });
    group.bench_function("decode", |b| {
        b.iter(|| {
            for buf in &encoded {
                black_box(decode_varint(buf).unwrap());
            }
        });
    });
    group.finish();
}

fn bench_bytes(c: &mut Criterion) {
    let mut group = c.benchmark_group("encoding/bytes");

    for len in [8, 64, 512].iter() {
        let values = generate_strings(1000, *len);
        group.throughput(Throughput::Bytes((values.len() * len) as u64));
        group.bench_with_input(BenchmarkId::new("roundtrip", len), len, |b, _| {
            let mut buf = Vec::with_capacity(len * 2);
            b.iter(|| {
                for v in &values {
                    buf.clear();
                    encode_bytes(&mut buf, v);
                    black_box(decode_bytes(&buf).unwrap());
                }
            });
        });
    }

    group.finish();
}

fn bench_composite_key(c: &mut Criterion) {
    let mut group = c.benchmark_group("encoding/composite_key");
    let ints = generate_ints(1000);

    group.throughput(Throughput::Elements(ints.len() as u64));
    group.bench_function("text_int", |b| {
        let mut buf = Vec::with_capacity(64);
        b.iter(|| {
            for i in &ints {
                buf.clear();
                encode_key(&mut buf, Kind::Text, &Datum::Text("orders".to_string())).unwrap();
                encode_key(&mut buf, Kind::Int, &Datum::Int(*i)).unwrap();
                let (_, rest) = decode_key(&buf, Kind::Text).unwrap();
                black_box(decode_key(rest, Kind::Int).unwrap());
            }
        });
    });
    group.finish();
}

criterion_group!(benches, bench_varint, bench_bytes, bench_composite_key);
criterion_main!(benches);
