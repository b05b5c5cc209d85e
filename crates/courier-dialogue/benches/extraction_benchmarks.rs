//! Benchmarks for local pattern extraction and cleaning.
//!
//! Pattern extraction re-reads the whole history on every turn, so the cost
//! of long conversations is measured alongside single messages.

use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use courier_core::Turn;
use courier_dialogue::clean::clean_record;
use courier_dialogue::prompts;
use courier_dialogue::PatternExtractor;

const MESSAGES: &[&str] = &[
    "shipping from Sheffield to London at 9:30",
    "I need to send a parcel from Newcastle upon Tyne to Bristol tomorrow",
    "origin: Leeds, destination: York, Saturday 7th Feb 2026 at 10am",
    "Manchester to Glasgow on 07/02/2026",
    "can you collect it in Cardiff and deliver to Exeter next friday",
    "hello, what can you do?",
];

/// A realistic back-and-forth of `rounds` user turns.
fn generate_history(rounds: usize) -> Vec<Turn> {
    let mut history = Vec::with_capacity(rounds * 2);
    for i in 0..rounds {
        history.push(Turn::user(MESSAGES[i % MESSAGES.len()]));
        history.push(Turn::assistant(prompts::ask(courier_core::Slot::ALL[i % 3])));
    }
    history
}

fn bench_single_message(c: &mut Criterion) {
    let extractor = PatternExtractor::new();

    let mut group = c.benchmark_group("pattern_extraction");
    group.measurement_time(Duration::from_secs(5));

    group.bench_function("single_message", |b| {
        let mut idx = 0usize;
        b.iter(|| {
            let text = MESSAGES[idx % MESSAGES.len()];
            idx += 1;
            extractor.extract_message(black_box(text), None)
        });
    });

    group.bench_function("single_message_cleaned", |b| {
        let mut idx = 0usize;
        b.iter(|| {
            let text = MESSAGES[idx % MESSAGES.len()];
            idx += 1;
            clean_record(&extractor.extract_message(black_box(text), None))
        });
    });

    group.finish();
}

fn bench_history(c: &mut Criterion) {
    let extractor = PatternExtractor::new();
    let short = generate_history(3);
    let long = generate_history(100);

    let mut group = c.benchmark_group("pattern_history");
    group.sample_size(50);

    group.bench_function("history_6_turns", |b| {
        b.iter(|| extractor.extract_history(black_box(&short)))
    });

    group.bench_function("history_200_turns", |b| {
        b.iter(|| extractor.extract_history(black_box(&long)))
    });

    group.finish();
}

criterion_group!(benches, bench_single_message, bench_history);
criterion_main!(benches);
