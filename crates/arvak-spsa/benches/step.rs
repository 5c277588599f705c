use std::convert::Infallible;
use std::hint::black_box;

use arvak_spsa::{Parameter, ParameterSet, Spsa, SpsaConfig};
use criterion::{Criterion, criterion_group, criterion_main};
use ndarray::{ArrayD, IxDyn};

fn layered_params() -> ParameterSet {
    ParameterSet::new(vec![
        Parameter::trainable(ArrayD::from_elem(IxDyn(&[8, 16]), 0.1)),
        Parameter::frozen(ArrayD::from_elem(IxDyn(&[16]), 0.0)),
        Parameter::trainable(ArrayD::from_elem(IxDyn(&[4, 4, 4]), -0.2)),
    ])
}

fn sphere(p: &ParameterSet) -> Result<f64, Infallible> {
    Ok(p.iter()
        .flat_map(|param| param.values().iter())
        .map(|x| x * x)
        .sum())
}

fn bench_step(c: &mut Criterion) {
    let params = layered_params();

    c.bench_function("spsa_step_192_params", |b| {
        let mut spsa = Spsa::new(SpsaConfig::new(1_000_000).with_seed(0)).unwrap();
        b.iter(|| black_box(spsa.step(sphere, black_box(&params)).unwrap()))
    });

    c.bench_function("spsa_step_and_cost_192_params", |b| {
        let mut spsa = Spsa::new(SpsaConfig::new(1_000_000).with_seed(0)).unwrap();
        b.iter(|| black_box(spsa.step_and_cost(sphere, black_box(&params)).unwrap()))
    });
}

criterion_group!(benches, bench_step);
criterion_main!(benches);
