//! Benchmarks for on-save-hook.

#![allow(missing_docs)]
#![allow(let_underscore_drop)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use on_save_hook::checks::Tool;

/// `tsc --pretty false` output with `errors` diagnostics.
fn tsc_output(errors: usize) -> String {
    (0..errors)
        .map(|i| {
            format!(
                "src/routes/page{i}.ts({},{}): error TS2322: Type 'number' is not assignable to type 'string'.\n",
                i + 1,
                i % 80
            )
        })
        .collect()
}

/// `svelte-check --output human` output with `errors` errors and as many
/// warnings.
fn svelte_check_output(errors: usize) -> String {
    let mut out = String::from("Loading svelte-check in workspace: /project\n");
    for i in 0..errors {
        out.push_str(&format!(
            "/project/src/lib/Widget{i}.svelte:{}:5\nError: Property 'x' does not exist. (ts)\n  <p>{{x}}</p>\n\n",
            i + 1
        ));
        out.push_str(&format!(
            "/project/src/lib/Widget{i}.svelte:{}:1\nWarning: A11y: <img> element should have an alt attribute (svelte)\n\n",
            i + 2
        ));
    }
    out.push_str(&format!(
        "svelte-check found {errors} errors and {errors} warnings\n"
    ));
    out
}

/// ESLint `stylish` output for one file.
fn eslint_output(problems: usize) -> String {
    let mut out = String::from("/project/src/edited.ts\n");
    for i in 0..problems {
        let severity = if i % 3 == 0 { "warning" } else { "error" };
        out.push_str(&format!(
            "  {}:{}  {severity}  'value{i}' is assigned a value but never used  no-unused-vars\n",
            i + 1,
            i % 40 + 1
        ));
    }
    out.push_str(&format!("\n✖ {problems} problems\n"));
    out
}

fn benchmark_tsc_parsing(c: &mut Criterion) {
    let small = tsc_output(5);
    let large = tsc_output(2_000);

    c.bench_function("tsc_parse_5", |b| {
        b.iter(|| black_box(Tool::Tsc.parser().parse(black_box(&small))));
    });
    c.bench_function("tsc_parse_2000", |b| {
        b.iter(|| black_box(Tool::Tsc.parser().parse(black_box(&large))));
    });
}

fn benchmark_svelte_check_parsing(c: &mut Criterion) {
    let output = svelte_check_output(500);

    c.bench_function("svelte_check_parse_500", |b| {
        b.iter(|| black_box(Tool::SvelteCheck.parser().parse(black_box(&output))));
    });
}

fn benchmark_eslint_parsing(c: &mut Criterion) {
    let output = eslint_output(1_000);

    c.bench_function("eslint_parse_1000", |b| {
        b.iter(|| black_box(Tool::Eslint.parser().parse(black_box(&output))));
    });
}

criterion_group!(
    benches,
    benchmark_tsc_parsing,
    benchmark_svelte_check_parsing,
    benchmark_eslint_parsing
);
criterion_main!(benches);
