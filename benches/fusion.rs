//! Ranking benchmarks
//!
//! Run with: cargo bench --bench fusion
//!
//! - fuse/*: RRF over two id lists of increasing length
//! - search_fulltext/*: full engine, lexical only, in-memory store
//! - search_hybrid/*: full engine with hash embeddings

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rankfuse::{
    ContentClass, DocumentId, DocumentStore, Fuser, FusionParams, HashEmbedder, HybridSearch,
    RankFuser, SearchConfig, SearchRequest, SearchableDocument,
};
use std::sync::Arc;

// ============================================================================
// Constants and Utilities
// ============================================================================

/// Fixed seed for reproducible corpora
const BENCH_SEED: u64 = 0xDEADBEEF_CAFEBABE;

/// Simple LCG for deterministic pseudo-random choices
fn lcg_next(state: &mut u64) -> u64 {
    *state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
    *state
}

const WORDS: [&str; 12] = [
    "deadlock", "pool", "worker", "retry", "timeout", "channel", "mutex", "async", "runtime",
    "panic", "shutdown", "backoff",
];

fn sentence(state: &mut u64, len: usize) -> String {
    (0..len)
        .map(|_| WORDS[(lcg_next(state) >> 33) as usize % WORDS.len()])
        .collect::<Vec<_>>()
        .join(" ")
}

fn corpus(count: usize) -> Vec<SearchableDocument> {
    let mut state = BENCH_SEED;
    (0..count)
        .map(|i| match i % 3 {
            0 => SearchableDocument::post(
                format!("p{:06}", i),
                &sentence(&mut state, 6),
                &sentence(&mut state, 30),
            ),
            1 => SearchableDocument::answer(format!("a{:06}", i), &sentence(&mut state, 40)),
            _ => SearchableDocument::approach(
                format!("ap{:06}", i),
                &sentence(&mut state, 3),
                &sentence(&mut state, 10),
                &sentence(&mut state, 10),
                &sentence(&mut state, 10),
            ),
        })
        .collect()
}

fn ids(prefix: &str, count: usize) -> Vec<DocumentId> {
    (0..count)
        .map(|i| DocumentId::new(format!("{}{}", prefix, i)))
        .collect()
}

// ============================================================================
// Benchmarks
// ============================================================================

fn bench_fuse(c: &mut Criterion) {
    let mut group = c.benchmark_group("fuse");
    let fuser = RankFuser::new();

    for size in [20usize, 40, 200] {
        // Half overlap between the two branches
        let lexical = ids("d", size);
        let semantic: Vec<DocumentId> = ids("d", size * 3 / 2).split_off(size / 2);
        let params = FusionParams {
            match_count: size / 2,
            ..FusionParams::default()
        };
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| fuser.fuse(ContentClass::Post, &lexical, &semantic, &params))
        });
    }
    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();

    let mut fulltext = c.benchmark_group("search_fulltext");
    for count in [300usize, 3_000] {
        let store = DocumentStore::from_documents(None, corpus(count)).unwrap();
        let engine = HybridSearch::from_store(SearchConfig::default(), Arc::new(store));
        let req = SearchRequest::new("pool deadlock");
        fulltext.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| runtime.block_on(engine.search(&req)).unwrap())
        });
    }
    fulltext.finish();

    let mut hybrid = c.benchmark_group("search_hybrid");
    let hasher = HashEmbedder::new(128);
    for count in [300usize, 3_000] {
        let store = DocumentStore::from_documents(Some(128), corpus(count)).unwrap();
        store.backfill_embeddings(|t| hasher.embed_sync(t)).unwrap();
        let engine = HybridSearch::from_store(SearchConfig::default(), Arc::new(store))
            .with_embedder(Arc::new(hasher));
        let req = SearchRequest::new("retry backoff timeout");
        hybrid.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| runtime.block_on(engine.search(&req)).unwrap())
        });
    }
    hybrid.finish();
}

criterion_group!(benches, bench_fuse, bench_search);
criterion_main!(benches);
