//! Criterion benchmarks for tweetdex.
//!
//! Covers tokenization, segment building and query evaluation over an
//! in-memory index of synthetic tweets.

use std::hint::black_box;
use std::sync::Arc;

use criterion::{BatchSize, Criterion, Throughput, criterion_group, criterion_main};
use tweetdex::analysis::{Tokenizer, WhitespaceTokenizer};
use tweetdex::cli::demo_queries;
use tweetdex::document::Document;
use tweetdex::engine::{EngineConfig, SearchEngine};
use tweetdex::index::WriterConfig;
use tweetdex::schema::Schema;
use tweetdex::storage::MemoryStorage;

const USERS: &[&str] = &["scotthamilton", "mattycus", "ElleCTF", "Karoli", "joy_wolf"];

const WORDS: &[&str] = &[
    "just", "got", "home", "from", "work", "@mattycus", "#fun", "can't", "sleep", "tonight",
    "@Karoli", "loving", "the", "weather", "#followfriday", "so", "tired", "missing", "you",
    "http://twitpic.com/2y1zl", "awww,", "that's", "a", "bummer.",
];

/// Generate synthetic tweets for benchmarking.
fn generate_tweets(count: usize) -> Vec<Document> {
    (0..count)
        .map(|i| {
            let length = 5 + (i % 15);
            let text: Vec<&str> = (0..length)
                .map(|j| WORDS[(i * 7 + j * 13) % WORDS.len()]) // Pseudo-random distribution
                .collect();

            Document::builder()
                .add_field("polarity", if i % 3 == 0 { "0" } else { "4" })
                .add_field("id", (1_467_810_369 + i).to_string())
                .add_field("date", "Mon Apr 06 22:19:45 PDT 2009")
                .add_field("query", "NO_QUERY")
                .add_field("user", USERS[i % USERS.len()])
                .add_field("text", text.join(" "))
                .build()
        })
        .collect()
}

fn open_engine(max_buffered_docs: usize) -> SearchEngine {
    let config = EngineConfig {
        writer: WriterConfig { max_buffered_docs },
        ..EngineConfig::default()
    };
    SearchEngine::open(Arc::new(MemoryStorage::new()), Schema::tweets(), config).unwrap()
}

/// Benchmark tweet text tokenization.
fn bench_tokenization(c: &mut Criterion) {
    let mut group = c.benchmark_group("tokenization");
    let tokenizer = WhitespaceTokenizer::new();
    let tweets = generate_tweets(100);
    let texts: Vec<&str> = tweets.iter().filter_map(|doc| doc.get("text")).collect();

    group.throughput(Throughput::Elements(texts.len() as u64));
    group.bench_function("whitespace_batch", |b| {
        b.iter(|| {
            for text in &texts {
                let count = tokenizer.tokenize(black_box(text)).unwrap().count();
                black_box(count);
            }
        })
    });

    group.finish();
}

/// Benchmark building and publishing segments.
fn bench_indexing(c: &mut Criterion) {
    let mut group = c.benchmark_group("indexing");
    group.sample_size(20);
    let tweets = generate_tweets(5_000);

    group.throughput(Throughput::Elements(tweets.len() as u64));
    for max_buffered_docs in [1_000, 10_000] {
        group.bench_function(format!("index_5000_buffer_{max_buffered_docs}"), |b| {
            b.iter_batched(
                || (open_engine(max_buffered_docs), tweets.clone()),
                |(engine, tweets)| {
                    let records = tweets.into_iter().map(Ok);
                    black_box(engine.index_records(records, false).unwrap())
                },
                BatchSize::LargeInput,
            )
        });
    }

    group.finish();
}

/// Benchmark the built-in queries over a multi-segment index.
fn bench_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("queries");
    let engine = open_engine(2_000);
    let records = generate_tweets(20_000).into_iter().map(Ok);
    engine.index_records(records, false).unwrap();
    let searcher = engine.searcher();

    for (index, (_, query)) in demo_queries().unwrap().into_iter().enumerate() {
        group.bench_function(format!("demo_query_{}", index + 1), |b| {
            b.iter(|| black_box(searcher.search(black_box(&query), 10).unwrap()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_tokenization, bench_indexing, bench_queries);
criterion_main!(benches);
