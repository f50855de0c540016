use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use map_core::{visible, FilterPredicate};
use map_runtime::{parse_feed, CATEGORIES, KNOWN_DIMENSIONS};

fn synthetic_feed(rows: usize) -> String {
    let mut body = String::from("name,x,z,category,dimension,notes\n");
    for index in 0..rows {
        let category = CATEGORIES[index % CATEGORIES.len()].key;
        let dimension = KNOWN_DIMENSIONS[index % KNOWN_DIMENSIONS.len()];
        body.push_str(&format!(
            "\"Spot {index}, east\",{},{},{category},{dimension},\"says \"\"hi\"\"\"\n",
            index as i64 * 7 - 5_000,
            5_000 - index as i64 * 3,
        ));
    }
    body
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("feed_parse");

    for rows in [100usize, 1_000, 10_000] {
        let body = synthetic_feed(rows);
        group.bench_with_input(BenchmarkId::new("rows", rows), &body, |b, body| {
            b.iter(|| parse_feed(black_box(body)))
        });
    }

    group.finish();
}

fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter");

    for rows in [1_000usize, 10_000] {
        let records = parse_feed(&synthetic_feed(rows))
            .map(|parsed| parsed.records)
            .unwrap_or_default();
        let predicate = FilterPredicate::new("nether", ["danger", "portal", "landmark"]);
        group.bench_with_input(BenchmarkId::new("records", rows), &records, |b, records| {
            b.iter(|| visible(black_box(records), &predicate).len())
        });
    }

    group.finish();
}

criterion_group!(feed_benches, bench_parse, bench_filter);
criterion_main!(feed_benches);
