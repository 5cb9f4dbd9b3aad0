//! Statement Splitter Performance Benchmark
//!
//! Measures splitter throughput on a synthetic dump, since the splitter sits
//! on the import hot path and runs over every byte of the file.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use flightdb_common::dump::{is_effectively_empty, StatementSplitter};

/// Build a dump resembling an exported flight_reservation database:
/// DDL, comments, and multi-row INSERTs with quoted strings.
fn synthetic_dump(tables: usize, rows_per_table: usize) -> String {
    let mut dump = String::new();
    dump.push_str("-- Synthetic dump\n/*!40101 SET NAMES utf8mb4 */;\n\n");
    for t in 0..tables {
        dump.push_str(&format!(
            "DROP TABLE IF EXISTS `table_{t}`;\n\
             CREATE TABLE `table_{t}` (\n  `id` INT NOT NULL,\n  `name` VARCHAR(64),\n  PRIMARY KEY (`id`)\n);\n"
        ));
        dump.push_str(&format!("INSERT INTO `table_{t}` (`id`, `name`) VALUES\n"));
        for r in 0..rows_per_table {
            if r > 0 {
                dump.push_str(",\n");
            }
            dump.push_str(&format!("({r},'passenger; O\\'Hare to Zürich #{r}')"));
        }
        dump.push_str(";\n\n");
    }
    dump
}

fn bench_split(c: &mut Criterion) {
    let dump = synthetic_dump(20, 500);
    let mut group = c.benchmark_group("splitter");
    group.throughput(Throughput::Bytes(dump.len() as u64));

    group.bench_function("split_statements", |b| {
        b.iter(|| {
            let count = StatementSplitter::new(black_box(&dump)).count();
            black_box(count);
        });
    });

    group.bench_function("split_and_classify", |b| {
        b.iter(|| {
            let mut executable = 0usize;
            for stmt in StatementSplitter::new(black_box(&dump)) {
                if !is_effectively_empty(stmt) {
                    executable += 1;
                }
            }
            black_box(executable);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_split);
criterion_main!(benches);
