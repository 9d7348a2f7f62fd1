use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::io::Write;

use gcode_layer_index::parser::GcodeParser;
use gcode_layer_index::scanner::{scan_float, scan_int};
use gcode_layer_index::storage::DirStorage;
use gcode_layer_index::CommandDecoder;

/// Generate G-code content of different patterns for benchmarking
fn generate_gcode_content(lines: usize, pattern: &str) -> String {
    let mut content = String::new();

    match pattern {
        "movement_heavy" => {
            for i in 0..lines {
                content.push_str(&format!(
                    "G1 X{:.3} Y{:.3} Z{:.3} E{:.3} F1500\n",
                    (i as f32) * 0.1,
                    (i as f32) * 0.2,
                    (i as f32) * 0.05,
                    (i as f32) * 0.02
                ));
            }
        }
        "layer_heavy" => {
            for i in 0..lines {
                match i % 4 {
                    0 => content.push_str(&format!("G1 Z{:.2} F300\n", (i as f32) * 0.05)),
                    1 => content.push_str(&format!(
                        "G1 X{:.3} Y{:.3} F1500\n",
                        (i as f32) * 0.1,
                        (i as f32) * 0.2
                    )),
                    2 => content.push_str(&format!("; layer {}\n", i / 4)),
                    3 => content.push_str(&format!("M104 S{}\n", 200 + (i % 50))),
                    _ => unreachable!(),
                }
            }
        }
        _ => {
            for i in 0..lines {
                content.push_str(&format!("G1 X{} Y{}\n", i, i));
            }
        }
    }

    content
}

/// Benchmark full-file indexing at realistic sizes
fn bench_file_indexing(c: &mut Criterion) {
    let mut group = c.benchmark_group("file_indexing");

    for &lines in &[1_000usize, 10_000, 100_000] {
        for pattern in ["movement_heavy", "layer_heavy"] {
            let content = generate_gcode_content(lines, pattern);
            let dir = tempfile::tempdir().expect("create temp dir");
            let mut f =
                std::fs::File::create(dir.path().join("bench.gcode")).expect("create bench job");
            f.write_all(content.as_bytes()).expect("write bench job");
            drop(f);

            group.throughput(Throughput::Bytes(content.len() as u64));
            group.bench_with_input(
                BenchmarkId::new(pattern, lines),
                &dir,
                |b, dir| {
                    b.iter(|| {
                        let mut parser = GcodeParser::new(DirStorage::new(dir.path()));
                        parser.open_file("bench.gcode").expect("open");
                        let report = parser.index_file().expect("index");
                        parser.close_file();
                        black_box(report)
                    })
                },
            );
        }
    }

    group.finish();
}

/// Benchmark decoding single lines with different shapes
fn bench_line_decoding(c: &mut Criterion) {
    let test_lines: Vec<(&str, &[u8])> = vec![
        ("simple_move", b"G1 X10 Y20"),
        ("complex_move", b"G1 X123.456 Y789.012 Z0.3 E2.85714 F1500"),
        ("dwell", b"G4 P200"),
        ("set_position", b"G92 X0 Y0 Z0 E0"),
    ];

    let mut group = c.benchmark_group("line_decoding");

    for (name, line) in test_lines {
        group.bench_with_input(BenchmarkId::new("decode", name), &line, |b, line| {
            let mut decoder = CommandDecoder::new();
            b.iter(|| {
                decoder.set_line(black_box(line)).expect("decode");
                black_box(decoder.arg_opt(gcode_layer_index::ArgLetter::Z).ok());
            })
        });
    }

    group.finish();
}

/// Benchmark the numeric scanners on typical argument values
fn bench_numeric_scanning(c: &mut Criterion) {
    let mut group = c.benchmark_group("numeric_scanning");

    group.bench_function("scan_int", |b| {
        b.iter(|| black_box(scan_int(black_box(b"1500"))))
    });
    group.bench_function("scan_float", |b| {
        b.iter(|| black_box(scan_float(black_box(b"123.456"))))
    });

    group.finish();
}

criterion_group!(
    indexing_benches,
    bench_file_indexing,
    bench_line_decoding,
    bench_numeric_scanning
);

criterion_main!(indexing_benches);
