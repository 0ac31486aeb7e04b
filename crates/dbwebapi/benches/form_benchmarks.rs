//! Benchmarks for multipart header parsing, form collection and the
//! derived-parameters cache

use std::hint::black_box;
use std::time::Duration;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use dbwebapi::form::{ContentDisposition, unquote_token};
use dbwebapi::{DerivedParametersCache, FormData, ParameterDirection, ProcedureParameter};

fn bench_content_disposition(c: &mut Criterion) {
    let mut group = c.benchmark_group("content_disposition");

    let simple = r#"form-data; name="field""#;
    let with_file = r#"form-data; name="upload"; filename="report; final.csv""#;

    group.bench_function("parse_simple", |b| {
        b.iter(|| black_box(ContentDisposition::parse(black_box(simple))));
    });
    group.bench_function("parse_quoted_semicolon", |b| {
        b.iter(|| black_box(ContentDisposition::parse(black_box(with_file))));
    });
    group.bench_function("unquote_token", |b| {
        b.iter(|| black_box(unquote_token(black_box(Some("\"upload\"")))));
    });

    group.finish();
}

fn bench_form_data(c: &mut Criterion) {
    let mut group = c.benchmark_group("form_data");

    for fields in [8usize, 64, 256] {
        group.throughput(Throughput::Elements(fields as u64));
        group.bench_with_input(BenchmarkId::new("add", fields), &fields, |b, &n| {
            b.iter(|| {
                let mut form = FormData::new();
                for i in 0..n {
                    form.add(format!("field_{}", i % 16), Some(i.to_string()));
                }
                black_box(form)
            });
        });
    }

    let mut form = FormData::new();
    for i in 0..64 {
        form.add(format!("field_{i}"), Some(i.to_string()));
    }
    group.bench_function("get_case_insensitive", |b| {
        b.iter(|| black_box(form.values(black_box("FIELD_63"))));
    });

    group.finish();
}

fn bench_derived_cache(c: &mut Criterion) {
    let mut group = c.benchmark_group("derived_cache");

    let cache = DerivedParametersCache::new(Duration::from_secs(600));
    let params: Vec<ProcedureParameter> = (1..=8)
        .map(|position| ProcedureParameter {
            name: format!("P_{position}"),
            data_type: "NVARCHAR".to_string(),
            direction: ParameterDirection::In,
            position,
        })
        .collect();
    for i in 0..1000 {
        cache.insert(&format!("APP.PROC_{i}"), params.clone());
    }

    group.bench_function("get_hit", |b| {
        b.iter(|| black_box(cache.get(black_box("app.proc_500"))));
    });
    group.bench_function("get_miss", |b| {
        b.iter(|| black_box(cache.get(black_box("APP.MISSING"))));
    });
    group.bench_function("invalidate_batch", |b| {
        b.iter(|| {
            let removed = cache.invalidate(["APP.PROC_1", "APP.PROC_2", "APP.MISSING"]);
            cache.insert("APP.PROC_1", params.clone());
            cache.insert("APP.PROC_2", params.clone());
            black_box(removed)
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_content_disposition,
    bench_form_data,
    bench_derived_cache
);
criterion_main!(benches);
