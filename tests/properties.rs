//! Invariants that hold across modules.

use proptest::prelude::*;
use std::sync::Arc;
use u_siteplan::constraints::{ConstraintEvaluator, ConstraintSettings};
use u_siteplan::evaluation::{EvaluationContext, ParallelEvaluator, Scalarization};
use u_siteplan::layout::{BuildingArena, BuildingSpec, Genotype, Site, Solution};
use u_siteplan::objectives::ObjectiveEvaluator;
use u_siteplan::operators::{uniform_crossover, OperatorWeights, Perturbation};
use u_siteplan::pareto::{dominates, non_dominated_sort};
use u_siteplan::random::create_rng;
use u_siteplan::sa::{SaConfig, SaExplorer};

fn context() -> Arc<EvaluationContext> {
    let arena = BuildingArena::new(vec![
        BuildingSpec::new("a", "office", 12.0, 8.0).with_floors(2),
        BuildingSpec::new("b", "lab", 9.0, 9.0),
        BuildingSpec::new("c", "storage", 6.0, 10.0),
    ])
    .unwrap();
    Arc::new(EvaluationContext::new(
        arena,
        Site::rectangle(90.0, 70.0).unwrap(),
        ConstraintEvaluator::new(ConstraintSettings::default()),
        ObjectiveEvaluator::standard(),
    ))
}

fn perturbation() -> impl Strategy<Value = Perturbation> {
    prop_oneof![
        (0.1f64..20.0).prop_map(|sigma| Perturbation::Gaussian { sigma }),
        Just(Perturbation::Swap),
        Just(Perturbation::Reset),
    ]
}

proptest! {
    #[test]
    fn edits_always_drop_the_evaluation(seed in any::<u64>(), op in perturbation()) {
        let ctx = context();
        let evaluator = ParallelEvaluator::sequential(ctx.clone());
        let mut rng = create_rng(seed);
        let mut random = || Solution::new(Genotype::random(ctx.arena(), ctx.site(), &mut rng));
        let (a, b) = (random(), random());
        let a = evaluator.evaluate_owned(a);
        let b = evaluator.evaluate_owned(b);
        prop_assert!(a.is_evaluated() && b.is_evaluated());

        let moved = op.apply(&a, ctx.arena(), ctx.site(), &mut rng);
        prop_assert!(!moved.is_evaluated());
        prop_assert!(moved.ranking().is_none());

        let (x, y) = uniform_crossover(&a, &b, ctx.arena(), &mut rng);
        prop_assert!(!x.is_evaluated() && !y.is_evaluated());

        let chosen = OperatorWeights::mutation().choose(2.0, &mut rng);
        prop_assert!(!chosen.apply(&b, ctx.arena(), ctx.site(), &mut rng).is_evaluated());

        // the parents keep their own scores
        prop_assert!(a.is_evaluated() && b.is_evaluated());
    }

    #[test]
    fn evaluation_is_idempotent(seed in any::<u64>()) {
        let ctx = context();
        let evaluator = ParallelEvaluator::sequential(ctx.clone());
        let mut rng = create_rng(seed);
        let solution = Solution::new(Genotype::random(ctx.arena(), ctx.site(), &mut rng));

        let first = evaluator.evaluate_local(&solution);
        let second = evaluator.evaluate_local(&solution);
        prop_assert_eq!(first.evaluation(), second.evaluation());
        prop_assert_eq!(evaluator.evaluations(), 2);
    }

    #[test]
    fn outside_layouts_cost_more_than_inside_ones(
        xs in prop::collection::vec(20.0f64..70.0, 3),
        ys in prop::collection::vec(20.0f64..50.0, 3),
        shift in 200.0f64..1000.0,
    ) {
        let ctx = context();
        let inside: Vec<(f64, f64)> = xs.iter().copied().zip(ys.iter().copied()).collect();
        let outside: Vec<(f64, f64)> =
            inside.iter().map(|&(x, y)| (x + shift, y + shift)).collect();

        let inner = ctx.evaluate(&Genotype::from_positions(ctx.arena(), &inside)).unwrap();
        let outer = ctx.evaluate(&Genotype::from_positions(ctx.arena(), &outside)).unwrap();
        prop_assert!(outer.constraint_total > inner.constraint_total);
        prop_assert!(outer.constraints.boundary > 0.0);
        prop_assert_eq!(inner.constraints.boundary, 0.0);
    }

    #[test]
    fn first_front_is_mutually_non_dominated(
        objectives in prop::collection::vec(prop::collection::vec(0.0f64..10.0, 4), 1..30),
    ) {
        let sort = non_dominated_sort(&objectives);
        for front in &sort.fronts {
            for &i in front {
                for &j in front {
                    prop_assert!(!dominates(&objectives[i], &objectives[j]));
                }
            }
        }
    }
}

#[test]
fn annealing_is_reproducible() {
    let config = SaConfig::default()
        .with_chains(3)
        .with_initial_temperature(15.0)
        .with_cooling_rate(0.97)
        .with_max_iterations(120)
        .with_seed(31);
    let explorer = SaExplorer::new(config, Scalarization::default());

    let a = explorer.explore(&ParallelEvaluator::sequential(context()));
    let b = explorer.explore(&ParallelEvaluator::sequential(context()));
    for (x, y) in a.reports.iter().zip(&b.reports) {
        let xt: Vec<u64> = x.trajectory.iter().map(|v| v.to_bits()).collect();
        let yt: Vec<u64> = y.trajectory.iter().map(|v| v.to_bits()).collect();
        assert_eq!(xt, yt);
        assert_eq!(x.stop_reason, y.stop_reason);
    }
    for (x, y) in a.seeds.iter().zip(&b.seeds) {
        assert!(x.genotype().bits_eq(y.genotype()));
    }
}
