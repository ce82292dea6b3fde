// Copyright (c) 2026 Bountyy Oy. All rights reserved.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use synchttp::{extract_cookies, merge_request_headers, parse_header_block};

const RAW_HEADERS: &str = "HTTP/1.1 200 OK\r\n\
Date: Mon, 06 Mar 2023 10:00:00 GMT\r\n\
Content-Type: text/html; charset=utf-8\r\n\
Content-Length: 5120\r\n\
Cache-Control: no-cache\r\n\
Location: https://example.com:8443/next\r\n\
Set-Cookie: sid=abc123; Path=/; HttpOnly\r\n\
Set-Cookie: theme=dark; Path=/\r\n\
Set-Cookie: csrf=9f8e7d; Secure\r\n\
Server: nginx\r\n\
\r\n";

fn header_parsing_benchmark(c: &mut Criterion) {
    c.bench_function("parse_header_block", |b| {
        b.iter(|| black_box(parse_header_block(black_box(RAW_HEADERS))))
    });
}

fn cookie_extraction_benchmark(c: &mut Criterion) {
    c.bench_function("extract_cookies", |b| {
        b.iter(|| black_box(extract_cookies(black_box(RAW_HEADERS))))
    });
}

fn header_merge_benchmark(c: &mut Criterion) {
    c.bench_function("merge_request_headers", |b| {
        b.iter(|| {
            black_box(merge_request_headers(
                black_box("https://api.example.com/items?page=2"),
                black_box(128),
                black_box("Content-Type: application/json\r\nAuthorization: Bearer t"),
            ))
        })
    });
}

criterion_group!(
    benches,
    header_parsing_benchmark,
    cookie_extraction_benchmark,
    header_merge_benchmark
);
criterion_main!(benches);
