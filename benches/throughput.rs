//! Throughput benchmarks for decimal arithmetic and book maintenance.
//!
//! Measures performance of core operations:
//! - String arithmetic (add, mul, div)
//! - decimal_to_precision in each counting mode
//! - Delta application on books of various depths
//! - Snapshot loading and sorted views

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use decibook::precise::{string_add, string_div, string_mul};
use decibook::{
    BookUpdate, OrderBook, OrderBookSide, PaddingMode, PrecisionMode, PriceLevel, RoundingMode,
    Side, decimal_to_precision,
};

/// Build a book with N levels on each side around 30000.
fn build_book(levels: usize) -> OrderBook {
    let mut snapshot = BookUpdate::new().nonce(1);
    for i in 0..levels {
        snapshot = snapshot
            .bid(format!("{}.{:02}", 29_999 - i / 100, 99 - i % 100), "1.5")
            .ask(format!("{}.{:02}", 30_000 + i / 100, i % 100), "0.75");
    }
    let mut book = OrderBook::new("BTC/USDT");
    book.load_snapshot(&snapshot);
    book
}

/// Deterministic delta rows cycling through `levels` prices.
fn delta_rows(levels: usize, count: usize) -> Vec<PriceLevel> {
    (0..count)
        .map(|i| {
            let n = (i * 7919) % levels;
            let size = if i % 5 == 0 { "0" } else { "2.125" };
            PriceLevel::new(format!("{}.{:02}", 29_999 - n / 100, 99 - n % 100), size)
        })
        .collect()
}

/// Benchmark: exact string arithmetic
fn bench_arithmetic(c: &mut Criterion) {
    let mut group = c.benchmark_group("arithmetic");
    group.throughput(Throughput::Elements(1));

    let a = "69696900000.00000002";
    let b = "-1.123e-6";

    group.bench_function("add", |bench| bench.iter(|| string_add(black_box(a), black_box(b))));
    group.bench_function("mul", |bench| bench.iter(|| string_mul(black_box(a), black_box(b))));
    group.bench_function("div", |bench| bench.iter(|| string_div(black_box(a), black_box(b))));

    group.finish();
}

/// Benchmark: decimal_to_precision per counting mode
fn bench_formatting(c: &mut Criterion) {
    let mut group = c.benchmark_group("decimal_to_precision");
    group.throughput(Throughput::Elements(1));

    let value = "0.000123456789";
    group.bench_function("decimal_places", |b| {
        b.iter(|| {
            decimal_to_precision(
                black_box(value),
                RoundingMode::Round,
                8,
                PrecisionMode::DecimalPlaces,
                PaddingMode::PadWithZero,
            )
        })
    });
    group.bench_function("significant_digits", |b| {
        b.iter(|| {
            decimal_to_precision(
                black_box(value),
                RoundingMode::Truncate,
                5,
                PrecisionMode::SignificantDigits,
                PaddingMode::NoPadding,
            )
        })
    });
    group.bench_function("tick_size", |b| {
        let tick: decibook::Precision = "0.00000012".parse().unwrap();
        b.iter(|| {
            decimal_to_precision(
                black_box(value),
                RoundingMode::Round,
                tick.clone(),
                PrecisionMode::TickSize,
                PaddingMode::NoPadding,
            )
        })
    });

    group.finish();
}

/// Benchmark: single delta on books of increasing size
fn bench_apply_delta(c: &mut Criterion) {
    let mut group = c.benchmark_group("apply_delta");

    for levels in [10, 100, 1000] {
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::from_parameter(levels), &levels, |b, &levels| {
            let mut book = build_book(levels);
            let rows = delta_rows(levels, 1024);
            let mut i = 0;

            b.iter(|| {
                let row = &rows[i % rows.len()];
                i += 1;
                black_box(book.apply_delta(Side::Bid, &row.price, &row.size))
            });
        });
    }

    group.finish();
}

/// Benchmark: delta batches against a depth-limited side
fn bench_delta_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("delta_batch");

    for batch in [10, 100, 1000] {
        group.throughput(Throughput::Elements(batch as u64));
        group.bench_with_input(BenchmarkId::from_parameter(batch), &batch, |b, &batch| {
            let mut side = OrderBookSide::with_depth(Side::Bid, Some(100));
            let rows = delta_rows(500, batch);

            b.iter(|| black_box(side.apply_delta_batch(&rows)));
        });
    }

    group.finish();
}

/// Benchmark: snapshot load and sorted extraction
fn bench_snapshot(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot");

    for levels in [100, 1000] {
        group.throughput(Throughput::Elements(levels as u64));
        let rows = delta_rows(levels, levels);

        group.bench_with_input(BenchmarkId::new("load", levels), &rows, |b, rows| {
            let mut side = OrderBookSide::new(Side::Bid);
            b.iter(|| black_box(side.load_snapshot(rows)));
        });

        let book = build_book(levels);
        group.bench_with_input(BenchmarkId::new("sorted_levels", levels), &book, |b, book| {
            b.iter(|| black_box(book.to_sorted_levels(Side::Ask)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_arithmetic,
    bench_formatting,
    bench_apply_delta,
    bench_delta_batch,
    bench_snapshot,
);

criterion_main!(benches);
