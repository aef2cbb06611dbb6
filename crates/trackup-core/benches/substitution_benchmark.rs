use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use trackup_core::substitution::{split_fixed_versions, substitute, VariableMap};

fn generate_vars(count: usize) -> VariableMap {
    VariableMap::merge(
        (0..count).map(|i| (format!("BUILD_VAR_{}", i), format!("value-{}", i))),
        std::iter::empty::<(String, String)>(),
    )
}

fn bench_substitution(c: &mut Criterion) {
    let mut group = c.benchmark_group("substitution");

    let template =
        "project=$BUILD_VAR_1 and fixVersion=$BUILD_VAR_7 and status=Resolved order by key";
    group.throughput(Throughput::Bytes(template.len() as u64));

    for var_count in [4usize, 16, 64, 256] {
        let vars = generate_vars(var_count);
        group.bench_with_input(
            BenchmarkId::from_parameter(var_count),
            &vars,
            |b, vars| {
                b.iter(|| substitute(black_box(template), black_box(vars)));
            },
        );
    }

    group.finish();
}

fn bench_substitution_no_tokens(c: &mut Criterion) {
    // The memmem gate should make token-free templates nearly free
    let mut group = c.benchmark_group("substitution_no_tokens");

    let template = "project=DEMO and status=Resolved order by key";
    let vars = generate_vars(64);

    group.bench_function("64_vars_no_match", |b| {
        b.iter(|| substitute(black_box(template), black_box(&vars)));
    });

    group.finish();
}

fn bench_version_split(c: &mut Criterion) {
    let mut group = c.benchmark_group("version_split");

    let inputs = [
        ("single", "1.0"),
        ("few", "1.0,1.1, 2.0"),
        ("many", "1.0,1.1,1.2,1.3,2.0,2.1,2.2,3.0-rc1,3.0-rc2,3.0"),
    ];

    for (name, input) in inputs {
        group.bench_with_input(BenchmarkId::from_parameter(name), &input, |b, input| {
            b.iter(|| split_fixed_versions(black_box(input)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_substitution,
    bench_substitution_no_tokens,
    bench_version_split
);
criterion_main!(benches);
