//! Performance benchmarks for the record codec.
//!
//! The codec sits on the hot path of every read and write session, so
//! encode and decode should stay comfortably in the microsecond range.
//!
//! Run benchmarks with:
//! ```sh
//! cargo bench --bench codec_bench
//! ```

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use spooltag_codec::{decode, encode};
use spooltag_core::{DisplayColor, MaterialRecord, MaterialType, SpoolWeightClass};
use std::hint::black_box;

/// A representative fully populated record.
fn sample_record() -> MaterialRecord {
    MaterialRecord::new(MaterialType::PlaPlus, "Anycubic", "AHPLLB-103")
        .with_color(DisplayColor::opaque(0xE0, 0x30, 0x20))
        .with_weight_class(SpoolWeightClass::Kg1)
}

/// A record with text overflowing both slots, exercising truncation.
fn oversized_record() -> MaterialRecord {
    MaterialRecord::new(MaterialType::Petg, "B".repeat(64), "S".repeat(64))
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");
    group.throughput(Throughput::Elements(1));

    let record = sample_record();
    group.bench_function("encode_record", |b| {
        b.iter(|| black_box(encode(black_box(&record))));
    });

    let oversized = oversized_record();
    group.bench_function("encode_oversized_text", |b| {
        b.iter(|| black_box(encode(black_box(&oversized))));
    });

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    group.throughput(Throughput::Elements(1));

    let image = encode(&sample_record());
    group.bench_function("decode_record", |b| {
        b.iter(|| black_box(decode(black_box(image.as_bytes())).unwrap()));
    });

    group.finish();
}

fn bench_roundtrip(c: &mut Criterion) {
    let mut group = c.benchmark_group("roundtrip");
    group.throughput(Throughput::Elements(1));

    let record = sample_record();
    group.bench_function("encode_then_decode", |b| {
        b.iter(|| {
            let image = encode(black_box(&record));
            black_box(decode(image.as_bytes()).unwrap())
        });
    });

    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode, bench_roundtrip);
criterion_main!(benches);
