use criterion::{black_box, criterion_group, criterion_main, Criterion};

use scriptbot::script::tokenize;

/// One realistic command script, repeated to build larger inputs.
const SCRIPT: &str = "\
config COMMAND
set COMMAND_NAME \"ship\"           # trigger word
set DESCRIPTION \"announce a release\"
set ALIASES \"release, announce\"
setl version \"1.4.2\"
embed:create release
embed:conf release \"Release\" \"https://example.com\" \"now available\" \"#ff8000\"
embed:add_l release \"version\" version
embed:set_footer release \"enjoy\"
embed:send release 200
send \"pinned above\" 200
react \"🎉\" 1
";

fn make_source(repeats: usize) -> String {
    SCRIPT.repeat(repeats)
}

fn bench_tokenize(c: &mut Criterion) {
    let small = make_source(1); // ~400 B
    let medium = make_source(100); // ~40 KB
    let large = make_source(1000); // ~400 KB

    let mut g = c.benchmark_group("tokenize");

    g.bench_function("small", |b| b.iter(|| tokenize(black_box(&small))));
    g.bench_function("medium", |b| b.iter(|| tokenize(black_box(&medium))));
    g.bench_function("large", |b| b.iter(|| tokenize(black_box(&large))));

    g.finish();
}

criterion_group!(benches, bench_tokenize);
criterion_main!(benches);
