use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use percolate_wire::{PercolateContext, PercolateShardResponse, ShardEnvelope};

fn bench_codec(c: &mut Criterion) {
    let ctx = PercolateContext {
        limit: true,
        size: 64,
        sort: true,
        score: true,
    };
    let matches: Vec<Vec<u8>> = (0..64).map(|i| format!("query-{i:04}").into_bytes()).collect();
    let scores: Vec<f32> = (0..64).map(|i| i as f32 / 64.0).collect();
    let resp = PercolateShardResponse::with_scores(
        ShardEnvelope::new("documents", 3),
        matches,
        scores,
        4096,
        &ctx,
    );
    let bytes = resp.to_vec();

    c.bench_function("encode_64_scored_matches", |b| {
        b.iter(|| black_box(&resp).to_vec())
    });
    c.bench_function("decode_64_scored_matches", |b| {
        b.iter(|| {
            let mut slice = black_box(&bytes[..]);
            PercolateShardResponse::decode(&mut slice).unwrap()
        })
    });
}

criterion_group!(benches, bench_codec);
criterion_main!(benches);
