//! Criterion benchmarks for rust_batch_logger

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rust_batch_logger::core::{render, RenderOptions};
use rust_batch_logger::prelude::*;
use std::sync::Arc;
use std::thread;

fn null_sink() -> impl Sink + 'static {
    FnSink::new("null", |batch: &[String]| {
        black_box(batch);
        Ok(())
    })
}

fn payload() -> Value {
    Value::object([
        ("user", Value::from("ada")),
        ("id", Value::from(42)),
        (
            "cart",
            Value::object([
                ("items", Value::from(vec![1, 2, 3])),
                ("total", Value::from(19.99)),
                ("meta", Value::object([("coupon", Value::Null)])),
            ]),
        ),
    ])
}

fn record() -> LogRecord {
    LogRecord::new(LogLevel::Info)
        .with_caller("src/main.rs:12:5")
        .with_context(Context::new().with_field("service", "checkout"))
}

// ============================================================================
// Rendering Benchmarks
// ============================================================================

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    group.throughput(Throughput::Elements(1));
    let value = payload();

    group.bench_function("multiline_styled", |b| {
        let options = RenderOptions::default();
        b.iter(|| render(black_box(&value), &options));
    });

    group.bench_function("inline_plain", |b| {
        let options = RenderOptions::compact();
        b.iter(|| render(black_box(&value), &options));
    });

    let cyclic = Object::new();
    cyclic.insert("name", "loop");
    cyclic.insert("self", Value::Object(cyclic.clone()));
    let cyclic = Value::Object(cyclic);
    group.bench_function("cyclic", |b| {
        let options = RenderOptions::compact();
        b.iter(|| render(black_box(&cyclic), &options));
    });

    group.finish();
}

// ============================================================================
// Formatter Benchmarks
// ============================================================================

fn bench_formatters(c: &mut Criterion) {
    let mut group = c.benchmark_group("formatters");
    group.throughput(Throughput::Elements(1));

    let record = record();
    let args = [Value::from("order placed"), payload()];
    let pairs = [
        Value::from("user"),
        Value::from("ada"),
        Value::from("attempt"),
        Value::from(3),
    ];

    let text = TextFormatter::default();
    group.bench_function("text_styled", |b| {
        b.iter(|| text.format(black_box(&record), black_box(&args)));
    });

    let plain = TextFormatter::default().with_styled(false);
    group.bench_function("text_plain", |b| {
        b.iter(|| plain.format(black_box(&record), black_box(&args)));
    });

    let json = JsonFormatter::new();
    group.bench_function("json_pairs", |b| {
        b.iter(|| json.format(black_box(&record), black_box(&pairs)));
    });

    group.bench_function("json_object", |b| {
        b.iter(|| json.format(black_box(&record), black_box(&args)));
    });

    group.finish();
}

// ============================================================================
// Logging Performance Benchmarks
// ============================================================================

fn bench_buffered_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("buffered_logging");
    group.throughput(Throughput::Elements(1));

    for buffer_size in [1usize, 10, 100, 1000] {
        let logger = Logger::builder()
            .formatter(TextFormatter::new("[%lvl%] %args%").with_styled(false))
            .sink(null_sink())
            .buffer_size(buffer_size)
            .capture_caller(false)
            .build()
            .unwrap();

        group.bench_with_input(
            BenchmarkId::from_parameter(buffer_size),
            &buffer_size,
            |b, _| {
                b.iter(|| logger.info(black_box(&[Value::from("Info message"), Value::from(1)])));
            },
        );
    }

    group.finish();
}

fn bench_level_filtering(c: &mut Criterion) {
    let mut group = c.benchmark_group("level_filtering");
    group.throughput(Throughput::Elements(1));

    let logger = Logger::builder()
        .min_level(LogLevel::Warn)
        .sink(null_sink())
        .build()
        .unwrap();

    group.bench_function("filtered_out", |b| {
        b.iter(|| logger.debug(black_box(&[Value::from("Debug message")])));
    });

    group.bench_function("passed", |b| {
        b.iter(|| logger.warn(black_box(&[Value::from("Warn message")])));
    });

    group.finish();
}

fn bench_concurrent_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_logging");

    for threads in [2usize, 4, 8] {
        group.throughput(Throughput::Elements((threads * 100) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(threads), &threads, |b, &threads| {
            let logger = Arc::new(
                Logger::builder()
                    .formatter(JsonFormatter::new())
                    .sink(null_sink())
                    .buffer_size(256)
                    .capture_caller(false)
                    .build()
                    .unwrap(),
            );
            b.iter(|| {
                let handles: Vec<_> = (0..threads)
                    .map(|_| {
                        let logger = Arc::clone(&logger);
                        thread::spawn(move || {
                            for i in 0..100 {
                                logger.info(&[Value::from("n"), Value::from(i)]);
                            }
                        })
                    })
                    .collect();
                for handle in handles {
                    let _ = handle.join();
                }
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_render,
    bench_formatters,
    bench_buffered_logging,
    bench_level_filtering,
    bench_concurrent_logging,
);

criterion_main!(benches);
