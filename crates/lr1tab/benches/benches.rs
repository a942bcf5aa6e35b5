use std::{env, path::PathBuf};

use criterion::{criterion_group, criterion_main, Criterion};
use lr1tab::{automaton::Automaton, grammar::Grammar, table::ParseTable};

criterion_main!(benches);
criterion_group!(benches, bench_expr, bench_statements);

fn bench_expr(c: &mut Criterion) {
    bench_table_gen(c, "expr");
}

fn bench_statements(c: &mut Criterion) {
    bench_table_gen(c, "statements");
}

fn bench_table_gen(c: &mut Criterion, grammar_name: &str) {
    let project_root = env::var_os("CARGO_MANIFEST_DIR")
        .map(PathBuf::from)
        .expect("missing environment variable: `CARGO_MANIFEST_DIR'");
    let grammar =
        Grammar::from_file(project_root.join(format!("tests/{}.grammar", grammar_name))).unwrap();

    let mut group = c.benchmark_group(grammar_name);
    group.bench_function("automaton", |b| {
        b.iter(|| Automaton::generate(&grammar));
    });
    let automaton = Automaton::generate(&grammar);
    group.bench_function("table", |b| {
        b.iter(|| ParseTable::generate(&grammar, &automaton));
    });
    group.finish();
}
