//! base62 编解码性能基准测试

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use scanty::utils::base62::{decode, encode};
use std::hint::black_box;

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec/encode");

    for id in [0u64, 3843, u32::MAX as u64, u64::MAX] {
        group.bench_with_input(BenchmarkId::from_parameter(id), &id, |b, &id| {
            b.iter(|| encode(black_box(id)));
        });
    }

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec/decode");

    for id in [0u64, 3843, u32::MAX as u64, u64::MAX] {
        let code = encode(id);
        group.bench_with_input(BenchmarkId::from_parameter(&code), &code, |b, code| {
            b.iter(|| decode(black_box(code)).unwrap());
        });
    }

    // 非法输入应尽早失败
    group.bench_function("invalid_char", |b| {
        b.iter(|| decode(black_box("abc-def")).is_err());
    });

    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
