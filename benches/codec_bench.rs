// Copyright (c) 2026 Bountyy Oy. All rights reserved.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use mustekala::{NormalizedUrl, QueryMap};

fn url_normalization_benchmark(c: &mut Criterion) {
    let urls = vec![
        "example.com",
        "  https://example.com/some/path?a=1&b=2.5  ",
        "http://localhost:8001/www/products?category=databases",
        "example.com/a b/c d",
    ];

    c.bench_function("normalize_url", |b| {
        b.iter(|| {
            for url in &urls {
                let _ = black_box(NormalizedUrl::parse(url, false));
            }
        })
    });
}

fn query_decode_benchmark(c: &mut Criterion) {
    let query = r#"n=12&f=12.5&flag=true&obj={"a":1}&s=hello%20world&empty="#;

    c.bench_function("decode_query", |b| {
        b.iter(|| {
            black_box(QueryMap::decode(query, false));
        })
    });
}

criterion_group!(benches, url_normalization_benchmark, query_decode_benchmark);
criterion_main!(benches);
