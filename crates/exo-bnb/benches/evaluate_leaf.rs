use exo_bnb::{BoundEvaluator, ProofRecord, Region, FIXED_POINT_ONE};
use exo_core::VerifierConfig;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

const LEAF: &str = "v0.80000000000000 0.00000000000000 8.00000000000000 0.00000000000000 \
0.00000000000000 0.00000000000000 0.00000000000000 0.00000000000000 0.00000000000000 \
0.00000000000000";

fn evaluate_leaf_bench(c: &mut Criterion) {
    let evaluator = BoundEvaluator::new(&VerifierConfig::default()).unwrap();
    let mut lower = [0; 6];
    lower[0] = FIXED_POINT_ONE - FIXED_POINT_ONE / 64;
    lower[4] = FIXED_POINT_ONE - FIXED_POINT_ONE / 64;
    let region = Region::new(lower, [FIXED_POINT_ONE; 6])
        .unwrap()
        .tightened()
        .unwrap();
    let ProofRecord::Verify(record) = ProofRecord::parse(LEAF).unwrap() else {
        panic!("leaf fixture is not a verify record");
    };
    c.bench_function("certify_corner_leaf", |b| {
        b.iter(|| {
            let value = evaluator.certify(black_box(&region), black_box(&record)).unwrap();
            black_box(value);
        });
    });
}

fn tighten_bench(c: &mut Criterion) {
    let mut lower = [0; 6];
    lower[1] = FIXED_POINT_ONE / 4;
    let region = Region::new(lower, [FIXED_POINT_ONE / 2; 6]).unwrap();
    c.bench_function("tighten_region", |b| {
        b.iter(|| black_box(black_box(&region).tightened().unwrap()));
    });
}

criterion_group!(benches, evaluate_leaf_bench, tighten_bench);
criterion_main!(benches);
