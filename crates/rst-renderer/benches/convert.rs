//! Benchmarks for RST to HTML conversion.

#![allow(clippy::format_push_string)] // Benchmark setup code, performance not critical

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rst_renderer::{Settings, convert_str};

/// Generate RST content with the given number of sections.
fn generate_rst(sections: usize, paragraphs_per_section: usize) -> String {
    let mut rst = String::with_capacity(sections * (60 + paragraphs_per_section * 120));
    rst.push_str("Document Title\n==============\n\nIntro.\n\n");

    for i in 0..sections {
        let title = format!("Section {i}");
        rst.push_str(&format!("{title}\n{}\n\n", "-".repeat(title.len())));
        for j in 0..paragraphs_per_section {
            rst.push_str(&format!(
                "Paragraph {j} in section {i} has **bold**, *italic* and ``inline  code``.\n\n"
            ));
        }
        rst.push_str("- first item\n- second item\n\n");
    }
    rst
}

fn bench_convert_simple(c: &mut Criterion) {
    let settings = Settings::default();
    c.bench_function("convert_simple", |b| {
        b.iter(|| convert_str("Hello\n=====\n\nSimple content.", &settings));
    });
}

fn bench_convert_by_size(c: &mut Criterion) {
    let settings = Settings::default();
    let mut group = c.benchmark_group("convert_by_size");

    for (sections, paragraphs) in [(5, 2), (20, 3), (50, 5)] {
        let rst = generate_rst(sections, paragraphs);
        group.throughput(Throughput::Bytes(rst.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("rst", format!("{sections}s_{paragraphs}p")),
            &rst,
            |b, rst| b.iter(|| convert_str(rst, &settings)),
        );
    }

    group.finish();
}

fn bench_convert_sourcecode(c: &mut Criterion) {
    let rst = r#"Examples
========

.. sourcecode::
   :options: lang-rust

   fn main() {
       let v: Vec<u8> = (0..10).collect();
       println!("{:?}", v);
   }

.. sourcecode::
   :options: lang-py

   if a < b and b > c:
       print("<ok>")
"#;
    let settings = Settings::default();
    c.bench_function("convert_sourcecode", |b| {
        b.iter(|| convert_str(rst, &settings));
    });
}

fn bench_convert_tables(c: &mut Criterion) {
    let mut rst = String::from("Tables\n======\n\n");
    rst.push_str("=====  =====  =====\nA      B      C\n=====  =====  =====\n");
    for i in 0..200 {
        rst.push_str(&format!("{i:<5}  x      y\n"));
    }
    rst.push_str("=====  =====  =====\n");
    let settings = Settings::default();
    c.bench_function("convert_table_200_rows", |b| {
        b.iter(|| convert_str(&rst, &settings));
    });
}

criterion_group!(
    benches,
    bench_convert_simple,
    bench_convert_by_size,
    bench_convert_sourcecode,
    bench_convert_tables
);
criterion_main!(benches);
