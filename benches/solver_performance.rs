//! Performance benchmarks for the Lagrangian integrator
//!
//! # What We're Measuring
//!
//! 1. **RK4 step cost vs number of dofs** (N-pendulum):
//!    - each q̈ evaluation assembles an N×N system by finite differences,
//!      O(N²) Lagrangian evaluations, each O(N·M) for the kinetic matrix
//!    - expect roughly N⁴ growth for a chain (M = N)
//!
//! 2. **Pair force field**: sequential vs Rayon row sums
//!    - O(M²) per evaluation
//!    - the parallel path only pays off above a few dozen elements
//!
//! 3. **Linear solves**: closed-form 2×2 vs pivoted elimination
//!
//! # Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench --bench solver_performance
//!
//! # Run only the chain scaling
//! cargo bench --bench solver_performance chain
//!
//! # Sequential only
//! cargo bench --bench solver_performance --no-default-features
//! ```

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use lagrange_rs::models::{LinearEntity, PairForceField, PlanarChain, UniformGravity};
use lagrange_rs::physics::{
    Entity, GeneralizedCoordinates, KineticOperator, Lagrangian, Positions,
    PotentialEnergySurface,
};
use lagrange_rs::resources::ResourceManager;
use lagrange_rs::solver::{
    linear, set_parallel_threshold, RK4Solver, Scenario, Solver, SolverConfiguration,
    SolverLagrangian,
};
use nalgebra::{DMatrix, DVector, Vector3};
use std::hint::black_box;
use std::sync::Arc;

// =================================================================================================
// Setup helpers
// =================================================================================================

/// Hanging chain of `n` unit links, slightly displaced
fn chain(n: usize) -> (Lagrangian, Arc<GeneralizedCoordinates>) {
    let resources = Arc::new(ResourceManager::new());
    let entity: Arc<dyn Entity> = Arc::new(
        PlanarChain::new(DVector::from_element(n, 1.0), DVector::from_element(n, 1.0)).unwrap(),
    );
    let q0 = DVector::from_fn(n, |i, _| 0.1 * (i as f64 + 1.0).sin());
    let coords = Arc::new(GeneralizedCoordinates::unbounded(q0, 1e-5, 1e-3).unwrap());
    let kinetic = Arc::new(
        KineticOperator::new(Arc::clone(&coords), Arc::clone(&entity), Arc::clone(&resources)).unwrap(),
    );
    let gravity = Arc::new(UniformGravity::new(entity, resources, 9.81));
    (Lagrangian::new(kinetic, gravity), coords)
}

/// `m` argon-like atoms on a jittered line, each free along x
fn atoms(m: usize) -> PairForceField {
    let points: Vec<Vector3<f64>> = (0..m)
        .map(|i| Vector3::new(i as f64 * 0.37e-9, (i % 3) as f64 * 0.05e-9, 0.0))
        .collect();
    let entity: Arc<dyn Entity> = Arc::new(
        LinearEntity::new(
            DVector::from_element(m, 6.6e-26),
            Positions::from_points(&points),
            DMatrix::identity(m, m),
            DMatrix::zeros(m, m),
            DMatrix::zeros(m, m),
        )
        .unwrap(),
    );
    PairForceField::new(entity, Arc::new(ResourceManager::new()))
}

// =================================================================================================
// Benchmarks
// =================================================================================================

/// One RK4 step for chains of increasing length
///
/// # Expected Scaling
///
/// ```text
/// n=2:   baseline
/// n=4:   ~16×
/// n=8:   ~256× (kinetic matrix and finite differences dominate)
/// ```
fn benchmark_chain_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("chain step");

    for n in [2, 4, 8] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            // Setup phase (NOT measured by criterion)
            let (lagrangian, coords) = chain(n);
            let mut solver = SolverLagrangian::new(lagrangian, coords, DVector::zeros(n)).unwrap();

            b.iter(|| solver.step(black_box(1e-3)).unwrap());
        });
    }

    group.finish();
}

/// Whole run through the `Solver` trait, including recording
fn benchmark_double_pendulum_run(c: &mut Criterion) {
    let (lagrangian, coords) = chain(2);
    let scenario = Scenario::new(lagrangian, coords, DVector::zeros(2)).unwrap();
    let config = SolverConfiguration::time_evolution(1.0, 1000).with_record_every(10);
    let solver = RK4Solver::new();

    c.bench_function("double pendulum 1000 steps", |b| {
        b.iter(|| solver.solve(black_box(&scenario), black_box(&config)).unwrap())
    });
}

/// Pair energy with the parallel path disabled and forced
fn benchmark_pair_force_field(c: &mut Criterion) {
    let mut group = c.benchmark_group("pair force field");

    for m in [16, 64, 256] {
        let field = atoms(m);
        let q = DVector::zeros(m);

        group.bench_with_input(BenchmarkId::new("sequential", m), &m, |b, _| {
            set_parallel_threshold(usize::MAX);
            b.iter(|| field.evaluate(black_box(&q)).unwrap())
        });

        group.bench_with_input(BenchmarkId::new("parallel", m), &m, |b, _| {
            set_parallel_threshold(1);
            b.iter(|| field.evaluate(black_box(&q)).unwrap())
        });
    }

    group.finish();
}

fn benchmark_linear_solve(c: &mut Criterion) {
    let mut group = c.benchmark_group("linear solve");

    for n in [2, 3, 8] {
        let a = DMatrix::from_fn(n, n, |i, j| if i == j { 4.0 } else { 1.0 / (1.0 + i as f64 + j as f64) });
        let rhs = DVector::from_element(n, 1.0);

        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            let mut work = a.clone();
            let mut v = rhs.clone();
            let mut rows = Vec::with_capacity(n);
            let mut x = DVector::zeros(n);
            b.iter(|| {
                work.copy_from(&a);
                v.copy_from(&rhs);
                linear::solve(&mut work, &mut v, &mut rows, &mut x).unwrap();
                black_box(&x);
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_chain_step,
    benchmark_double_pendulum_run,
    benchmark_pair_force_field,
    benchmark_linear_solve,
);
criterion_main!(benches);
