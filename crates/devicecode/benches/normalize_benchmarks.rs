//! Record building benchmarks.
//!
//! Measures building canonical records from raw pages, sequentially and on
//! the rayon pool, and the reconciliation pass over the result.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use devicecode::reconcile::reconcile;
use devicecode::{DeviceCode, Origin, RawPage};

/// Generate infobox pages for two wikis that link to each other.
fn generate_pages(count: usize) -> Vec<RawPage> {
    let mut pages = Vec::with_capacity(count * 2);
    for i in 0..count {
        let title = format!("Acme R{:05}", i);
        pages.push(
            RawPage::new(Origin::TechInfoDepot, &title)
                .with_template("Wireless embedded system")
                .with_field("brand", "Acme")
                .with_field("model", format!("R{:05}", i))
                .with_field("cpu1chip1", "Broadcom;BCM4706;600 MHz<!-- manuf;model;extra -->")
                .with_field("rad1chip1", "Broadcom;BCM4331")
                .with_field("fcc_id", format!("PY3{:08}", i))
                .with_field("serial", "yes, J2, 4-pin, 115200 8N1")
                .with_field("defaultpass", "password")
                .with_field("wikidevi", format!("[[wd:{}|{}]]", title, title)),
        );
        pages.push(
            RawPage::new(Origin::WikiDevi, &title)
                .with_template("Wireless embedded system")
                .with_field("brand", "Acme")
                .with_field("model", format!("R{:05}", i))
                .with_field("fcc_id", format!("PY3{:08}", i))
                .with_field("techinfodepot", format!("[[tid:{}|{}]]", title, title)),
        );
    }
    pages
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_pages");
    let dc = DeviceCode::new();

    for size in [100, 1_000] {
        let pages = generate_pages(size);
        group.throughput(Throughput::Elements(pages.len() as u64));
        group.bench_with_input(BenchmarkId::new("parallel", size), &pages, |b, pages| {
            b.iter(|| dc.build_pages(black_box(pages)))
        });
    }
    group.finish();
}

fn bench_build_sequential(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_pages_sequential");
    let config = devicecode::DeviceCodeConfig::default().with_parallel(false);
    let Ok(dc) = DeviceCode::with_config(config) else {
        return;
    };

    let pages = generate_pages(1_000);
    group.throughput(Throughput::Elements(pages.len() as u64));
    group.bench_function("1000", |b| b.iter(|| dc.build_pages(black_box(&pages))));
    group.finish();
}

fn bench_reconcile(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile");
    let dc = DeviceCode::new();

    for size in [100, 1_000] {
        let devices = dc.build_pages(&generate_pages(size)).devices;
        group.throughput(Throughput::Elements(devices.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &devices, |b, devices| {
            b.iter(|| reconcile(black_box(devices)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build, bench_build_sequential, bench_reconcile);
criterion_main!(benches);
