//! Criterion benchmarks for the layout optimizer.
//!
//! Synthetic sites with uniform office blocks, measuring constraint
//! evaluation, the annealing phase and a short end-to-end run.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;
use u_siteplan::constraints::{ConstraintEvaluator, ConstraintSettings};
use u_siteplan::evaluation::{EvaluationContext, ParallelEvaluator, Scalarization};
use u_siteplan::layout::{BuildingArena, BuildingSpec, Genotype, Site};
use u_siteplan::objectives::ObjectiveEvaluator;
use u_siteplan::random::create_rng;
use u_siteplan::sa::{SaConfig, SaExplorer};
use u_siteplan::{LayoutConfig, Optimizer};

fn buildings(n: usize) -> Vec<BuildingSpec> {
    (0..n)
        .map(|i| {
            let kind = if i % 2 == 0 { "office" } else { "lab" };
            BuildingSpec::new(format!("b{i}"), kind, 12.0, 9.0)
        })
        .collect()
}

fn context(n: usize) -> Arc<EvaluationContext> {
    let side = 40.0 * (n as f64).sqrt();
    Arc::new(EvaluationContext::new(
        BuildingArena::new(buildings(n)).expect("valid buildings"),
        Site::rectangle(side, side).expect("valid site"),
        ConstraintEvaluator::new(ConstraintSettings::default()),
        ObjectiveEvaluator::standard(),
    ))
}

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");

    for &n in &[5, 20, 80] {
        let ctx = context(n);
        let mut rng = create_rng(42);
        let genotype = Genotype::random(ctx.arena(), ctx.site(), &mut rng);
        group.bench_with_input(BenchmarkId::from_parameter(n), &(ctx, genotype), |b, (ctx, g)| {
            b.iter(|| black_box(ctx.evaluate(black_box(g))))
        });
    }
    group.finish();
}

fn bench_sa_explore(c: &mut Criterion) {
    let mut group = c.benchmark_group("sa_explore");
    group.sample_size(10);

    for &n in &[5, 20] {
        let evaluator = ParallelEvaluator::sequential(context(n));
        let config = SaConfig::default()
            .with_chains(2)
            .with_max_iterations(500)
            .with_seed(42);
        let explorer = SaExplorer::new(config, Scalarization::default());
        group.bench_with_input(BenchmarkId::from_parameter(n), &(evaluator, explorer), |b, (e, x)| {
            b.iter(|| black_box(x.explore(black_box(e))))
        });
    }
    group.finish();
}

fn bench_optimize(c: &mut Criterion) {
    let mut group = c.benchmark_group("optimize");
    group.sample_size(10);

    for &workers in &[1, 4] {
        let site = Site::rectangle(120.0, 120.0).expect("valid site");
        let optimizer = Optimizer::new(
            LayoutConfig::fast()
                .with_sa_max_iterations(200)
                .with_ga_generations(10)
                .with_workers(workers)
                .with_seed(42),
        );
        group.bench_with_input(
            BenchmarkId::new("w", workers),
            &(optimizer, site),
            |b, (o, s)| b.iter(|| black_box(o.run(buildings(8), s))),
        );
    }
    group.finish();
}

criterion_group!(benches, bench_evaluate, bench_sa_explore, bench_optimize);
criterion_main!(benches);
