#[macro_use]
extern crate criterion;

use criterion::Criterion;

use icemac::layout;
use icemac::sweep::{Axis, Sweep};

fn criterion_benchmark(c: &mut Criterion) {
    let sweep = Sweep::per_geometry();
    c.bench_function("build per-geometry", move |b| {
        b.iter(|| layout::build(&sweep).unwrap())
    });

    let sweep = Sweep::combined();
    c.bench_function("build combined", move |b| {
        b.iter(|| layout::build(&sweep).unwrap())
    });

    let mut sweep = Sweep::combined();
    sweep.energy = Axis::steps(10.0, 2000.0, 10.0);
    c.bench_function("text of a fine combined sweep", move |b| {
        let macros = layout::build(&sweep).unwrap();
        b.iter(|| macros[0].text().len())
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
