//! Benchmarks for the Orihon conversion pipeline
//!
//! Run with: cargo bench -p orihon-core

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use orihon_core::{checker, convert, Config, Parser};

/// Sample document exercising every block and inline construct.
const SAMPLE: &str = r#";;;目次
;;;

;;;見出し1;;; 第一章　はじまり ;;;

これは最初の段落です。((最初の注記))
二行目には｜漢字《かんじ》のルビが振られています。

;;;太字,囲み;;;
強調された囲みの中のテキストです。
;;;

;;;見出し2;;; 節 ;;;

- 箇条書きの一つ目
- ;;;太字;;;重要;;;な二つ目
- 三つ目

1. 手順の一
2. 手順の二

画像:img/photo.png|説明文

;;;ハイライト,色=#ffee00;;; 注目してほしい箇所 ;;;

;;;折りたたみ,要約=補足;;;
折りたたまれた詳細です。((二つ目の注記))
;;;

```rust
fn main() {
    println!("verbatim");
}
```

;;;ネタバレ;;; 結末の話 ;;;

最後の段落です。
"#;

/// The same document with recoverable mistakes mixed in.
const BROKEN_SAMPLE: &str = r#";;;太字
閉じ忘れのブロック

;;;ボールド;;; 知らないキーワード ;;;

普通の段落は生き残る。((閉じない

;;;囲み
もう一つの閉じ忘れ
"#;

fn bench_convert(c: &mut Criterion) {
    let mut group = c.benchmark_group("convert");

    group.throughput(Throughput::Bytes(SAMPLE.len() as u64));
    group.bench_function("clean", |b| {
        let config = Config::default();
        b.iter(|| {
            let result = convert(black_box(SAMPLE), &config);
            black_box(result.html.len())
        })
    });

    group.throughput(Throughput::Bytes(BROKEN_SAMPLE.len() as u64));
    group.bench_function("with_recovery", |b| {
        let config = Config::default();
        b.iter(|| {
            let result = convert(black_box(BROKEN_SAMPLE), &config);
            black_box(result.diagnostics.len())
        })
    });

    group.finish();
}

fn bench_parse_only(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    group.throughput(Throughput::Bytes(SAMPLE.len() as u64));
    group.bench_function("sample", |b| {
        b.iter(|| {
            let mut parser = Parser::new();
            let result = parser.parse(black_box(SAMPLE));
            black_box(result.nodes.len())
        })
    });

    group.finish();
}

fn bench_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("scaling");

    for size in [1, 5, 10, 20].iter() {
        let content: String = SAMPLE.repeat(*size);
        group.throughput(Throughput::Bytes(content.len() as u64));
        group.bench_with_input(BenchmarkId::new("convert", size), &content, |b, content| {
            let config = Config::default();
            b.iter(|| {
                let result = convert(black_box(content), &config);
                black_box(result.html.len())
            })
        });
    }

    group.finish();
}

fn bench_check(c: &mut Criterion) {
    let mut group = c.benchmark_group("check");

    group.throughput(Throughput::Bytes(SAMPLE.len() as u64));
    group.bench_function("clean", |b| {
        b.iter(|| black_box(checker::check(black_box(SAMPLE))).len())
    });

    group.throughput(Throughput::Bytes(BROKEN_SAMPLE.len() as u64));
    group.bench_function("broken", |b| {
        b.iter(|| black_box(checker::check(black_box(BROKEN_SAMPLE))).len())
    });

    group.finish();
}

criterion_group!(benches, bench_convert, bench_parse_only, bench_scaling, bench_check);
criterion_main!(benches);
