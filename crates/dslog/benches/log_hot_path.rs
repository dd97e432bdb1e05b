//! Benchmarks for the logging hot path
//!
//! Measures:
//! - a call rejected by the level gate
//! - console rendering into a discarding byte-sink
//! - console + JSON file dispatch
//! - message composition alone

use std::hint::black_box;
use std::io;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use dslog::{Config, Field, LogFormat, Logger, LoggerOption, MessageComposer, fields};
use tempfile::TempDir;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

fn discard() -> LoggerOption {
    LoggerOption::ConsoleWriter(BoxMakeWriter::new(io::sink))
}

fn gated(c: &mut Criterion) {
    let logger = Logger::console("error", None, [discard()]).unwrap();

    c.bench_function("log/gated", |b| {
        b.iter(|| logger.info(black_box("dropped"), &fields!("port" => 8080)));
    });
}

fn console(c: &mut Criterion) {
    let mut group = c.benchmark_group("log/console");

    for &count in &[0_usize, 4, 16] {
        let logger = Logger::console("info", None, [discard()]).unwrap();
        let fields: Vec<Field> = (0..count).map(|i| Field::new(format!("k{i}"), i)).collect();

        group.bench_with_input(BenchmarkId::new("fields", count), &fields, |b, fields| {
            b.iter(|| logger.info(black_box("request served"), fields));
        });
    }

    group.finish();
}

fn json_file(c: &mut Criterion) {
    let dir = TempDir::new().unwrap();
    let config = Config {
        log_file: dir.path().join("bench.log"),
        log_file_format: Some(LogFormat::Json),
        max_size: 64,
        max_backups: 1,
        compress: Some(false),
        ..Config::default()
    };
    let logger = Logger::new("info", Some(config), [discard()])
        .unwrap()
        .with_service("api")
        .with_fields(fields!("request_id" => "r-1"));

    c.bench_function("log/json_file", |b| {
        b.iter(|| logger.info(black_box("started"), &fields!("port" => 8080)));
    });
}

fn compose(c: &mut Criterion) {
    let config = dslog::config::merge(Config::default());
    let persistent = fields!("request_id" => "r-1", "user" => "ada");
    let composer = MessageComposer::new(&config, "api", &persistent);
    let call = fields!("port" => 8080, "tls" => true);

    c.bench_function("compose/text", |b| {
        b.iter(|| composer.compose(black_box("started"), &call));
    });
}

criterion_group!(benches, gated, console, json_file, compose);
criterion_main!(benches);
