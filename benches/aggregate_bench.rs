//! Criterion benchmarks for the normalize → aggregate pipeline

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::{json, Value};
use std::hint::black_box;
use std::path::PathBuf;
use subtrack::parsers::{JsonPayloadSource, RecordSet, RecordSource};
use subtrack::services::{Aggregator, DateParser, Normalizer};
use subtrack::types::Origin;

use chrono::{TimeZone, Utc};

const END_DATES: &[&str] = &["2026/2/2 13:59", "1月14日", "3月6日 23:00", "2026-04-20", "", "长期"];

/// Synthetic feed with mixed aliases, amount notations and date formats
fn synthetic_set(records: usize) -> RecordSet {
    let mut inj = Vec::with_capacity(records / 3);
    let mut usdt45 = Vec::with_capacity(records / 3);
    let mut finance = Vec::with_capacity(records / 3);

    for i in 0..records {
        let end = END_DATES[i % END_DATES.len()];
        let user = format!("13{:09}", i % (records / 10).max(1));
        match i % 3 {
            0 => inj.push(json!({
                "产品名称": format!("INJ质押{}天", 30 * (1 + i % 3)),
                "用户": user,
                "购买金额": format!("{},{:03}.50", 1 + i % 9, i % 1000),
                "结束时间": end,
            })),
            1 => usdt45.push(json!({
                "产品": "USDT45天理财",
                "会员ID": user,
                "认购额度": format!("¥{}", 100 + i % 500),
                "结束": end,
            })),
            _ => finance.push(json!({
                "product_name": "USDT活期",
                "phone": user,
                "amount": (i % 700) as f64 + 0.25,
                "end": end,
            })),
        }
    }

    let mut set = RecordSet::new();
    for (origin, items) in [
        (Origin::Inj, inj),
        (Origin::Usdt45, usdt45),
        (Origin::UsdtFinance, finance),
    ] {
        set.insert_array(origin, Value::Array(items))
            .expect("synthetic arrays are valid");
    }
    set
}

fn bench_normalize(c: &mut Criterion) {
    let set = synthetic_set(10_000);
    let normalizer = Normalizer::new(Default::default(), DateParser::new(2026));

    let mut group = c.benchmark_group("pipeline");
    group.throughput(Throughput::Elements(set.len() as u64));
    group.bench_function("normalize_10k", |b| {
        b.iter(|| normalizer.normalize_all(black_box(set.records())).count());
    });
    group.finish();
}

fn bench_aggregate(c: &mut Criterion) {
    let today = Utc.with_ymd_and_hms(2026, 2, 17, 0, 0, 0).unwrap();
    let normalizer = Normalizer::new(Default::default(), DateParser::new(2026));
    let aggregator = Aggregator::new(today);

    let mut group = c.benchmark_group("pipeline");
    for size in [1_000usize, 10_000, 100_000] {
        let set = synthetic_set(size);
        let records: Vec<_> = normalizer.normalize_all(set.records()).collect();

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("aggregate", size), &records, |b, records| {
            b.iter(|| aggregator.aggregate(black_box(records.clone())));
        });
    }
    group.finish();
}

fn bench_parse_payload(c: &mut Criterion) {
    let fixture = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("payload.json");
    let bytes = std::fs::read(&fixture).unwrap_or_default();
    if bytes.is_empty() {
        eprintln!("Skipping parse_payload: fixture not found");
        return;
    }

    let source = JsonPayloadSource::new();
    let mut group = c.benchmark_group("parser");
    group.throughput(Throughput::Bytes(bytes.len() as u64));
    group.bench_function("parse_payload", |b| {
        b.iter(|| {
            let mut copy = bytes.clone();
            let _ = source.parse_bytes(black_box(&mut copy));
        });
    });
    group.bench_function("parse_file", |b| {
        b.iter(|| source.parse_file(black_box(&fixture)));
    });
    group.finish();
}

criterion_group!(benches, bench_normalize, bench_aggregate, bench_parse_payload);
criterion_main!(benches);
