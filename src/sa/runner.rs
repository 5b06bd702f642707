//! Multi-chain annealing loop.

use super::config::SaConfig;
use super::types::{ChainReport, ChainState, SaOutcome, StopReason};
use crate::evaluation::{ParallelEvaluator, Scalarization};
use crate::layout::{Genotype, Solution};
use crate::random::{create_rng, derive_seed, LayoutRng};
use rand::Rng;

/// Runs independent annealing chains on the evaluator's worker pool.
///
/// Each chain owns a random stream derived from the master seed, so a chain's
/// trajectory depends only on its index, the configuration and the
/// evaluation context. Chains evaluate their own moves on the thread they
/// run on.
#[derive(Debug, Clone)]
pub struct SaExplorer {
    config: SaConfig,
    scalarization: Scalarization,
}

impl SaExplorer {
    pub fn new(config: SaConfig, scalarization: Scalarization) -> Self {
        Self {
            config,
            scalarization,
        }
    }

    pub fn config(&self) -> &SaConfig {
        &self.config
    }

    /// Runs every chain and pools their results.
    pub fn explore(&self, evaluator: &ParallelEvaluator) -> SaOutcome {
        let indices: Vec<usize> = (0..self.config.chains).collect();
        let finished = evaluator
            .pool()
            .map_ordered(&indices, |&chain| self.run_chain(evaluator, chain));

        let mut seeds = Vec::with_capacity(finished.len() * 2);
        let mut reports = Vec::with_capacity(finished.len());
        for run in finished {
            let distinct = !run.last.genotype().bits_eq(run.best.genotype());
            seeds.push(run.best);
            if distinct {
                seeds.push(run.last);
            }
            reports.push(run.report);
        }

        let outcome = SaOutcome { seeds, reports };
        log::info!(
            "annealing finished: {} chains, {} iterations, best fitness {:.6}",
            outcome.reports.len(),
            outcome.total_iterations(),
            outcome.best_fitness()
        );
        outcome
    }

    /// Runs chain `index` to completion on the calling thread.
    pub fn run_chain(&self, evaluator: &ParallelEvaluator, index: usize) -> ChainRun {
        let seed = derive_seed(self.config.seed, index as u64);
        let mut rng = create_rng(seed);
        let context = evaluator.context();

        let start = Solution::new(Genotype::random(context.arena(), context.site(), &mut rng));
        let start = evaluator.evaluate_owned(start);
        let mut chain = Chain::start(start, &self.scalarization, &self.config);

        let stop_reason = loop {
            if let Some(reason) = self.stop_reason(&chain, evaluator) {
                chain.state = ChainState::Done(reason);
                break reason;
            }
            chain.step(evaluator, &self.scalarization, &self.config, &mut rng);
        };
        debug_assert!(chain.state.is_done());
        log::debug!(
            "chain {index} stopped ({stop_reason:?}) after {} iterations, best {:.6}",
            chain.iterations,
            chain.best_fitness
        );

        ChainRun {
            report: ChainReport {
                chain: index,
                seed,
                stop_reason,
                iterations: chain.iterations,
                accepted_moves: chain.accepted,
                improving_moves: chain.improved,
                final_temperature: chain.temperature,
                best_fitness: chain.best_fitness,
                trajectory: chain.trajectory,
            },
            best: chain.best,
            last: chain.current,
        }
    }

    fn stop_reason(&self, chain: &Chain, evaluator: &ParallelEvaluator) -> Option<StopReason> {
        let budget = evaluator.budget();
        if budget.is_cancelled() {
            Some(StopReason::Cancelled)
        } else if budget.is_exhausted() {
            Some(StopReason::BudgetExhausted)
        } else if chain.temperature < self.config.final_temperature {
            Some(StopReason::Cooled)
        } else if chain.iterations >= self.config.max_iterations {
            Some(StopReason::MaxIterations)
        } else {
            None
        }
    }
}

/// Final state of one chain.
#[derive(Debug, Clone)]
pub struct ChainRun {
    pub report: ChainReport,
    /// Fittest solution the chain visited.
    pub best: Solution,
    /// Solution the chain ended on.
    pub last: Solution,
}

struct Chain {
    state: ChainState,
    current: Solution,
    current_fitness: f64,
    best: Solution,
    best_fitness: f64,
    temperature: f64,
    iterations: usize,
    accepted: usize,
    improved: usize,
    trajectory: Vec<f64>,
}

impl Chain {
    fn start(initial: Solution, scalarization: &Scalarization, config: &SaConfig) -> Self {
        let fitness = initial.fitness(scalarization);
        let expected = config.max_iterations.min(config.cooling_steps());
        let mut trajectory = Vec::with_capacity(expected + 1);
        trajectory.push(fitness);
        Self {
            state: ChainState::Running,
            best: initial.clone(),
            current: initial,
            current_fitness: fitness,
            best_fitness: fitness,
            temperature: config.initial_temperature,
            iterations: 0,
            accepted: 0,
            improved: 0,
            trajectory,
        }
    }

    fn step(
        &mut self,
        evaluator: &ParallelEvaluator,
        scalarization: &Scalarization,
        config: &SaConfig,
        rng: &mut LayoutRng,
    ) {
        let context = evaluator.context();
        let sigma = self.temperature / config.sigma_divisor;
        let operator = config.operator_weights.choose(sigma, rng);
        let neighbor = operator.apply(&self.current, context.arena(), context.site(), rng);
        let neighbor = evaluator.evaluate_owned(neighbor);
        let neighbor_fitness = neighbor.fitness(scalarization);
        let delta = neighbor_fitness - self.current_fitness;

        // Metropolis criterion
        let accept = if delta < 0.0 {
            self.improved += 1;
            true
        } else {
            rng.random::<f64>() < (-delta / self.temperature).exp()
        };

        if accept {
            self.current = neighbor;
            self.current_fitness = neighbor_fitness;
            self.accepted += 1;
            if self.current_fitness < self.best_fitness {
                self.best = self.current.clone();
                self.best_fitness = self.current_fitness;
            }
        }

        self.iterations += 1;
        self.temperature *= config.cooling_rate;
        self.trajectory.push(self.current_fitness);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::{ConstraintEvaluator, ConstraintSettings};
    use crate::evaluation::{EvaluationBudget, EvaluationContext, WorkerPool};
    use crate::layout::{BuildingArena, BuildingSpec, Site};
    use crate::objectives::ObjectiveEvaluator;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;

    fn context() -> Arc<EvaluationContext> {
        let arena = BuildingArena::new(
            (0..3)
                .map(|i| BuildingSpec::new(format!("b{i}"), "office", 10.0, 8.0))
                .collect(),
        )
        .unwrap();
        Arc::new(EvaluationContext::new(
            arena,
            Site::rectangle(80.0, 60.0).unwrap(),
            ConstraintEvaluator::new(ConstraintSettings::default()),
            ObjectiveEvaluator::standard(),
        ))
    }

    fn config() -> SaConfig {
        SaConfig::default()
            .with_chains(3)
            .with_initial_temperature(20.0)
            .with_final_temperature(0.05)
            .with_cooling_rate(0.97)
            .with_max_iterations(150)
            .with_seed(99)
    }

    #[test]
    fn test_same_seed_same_trajectory() {
        let ctx = context();
        let explorer = SaExplorer::new(config(), Scalarization::default());
        let pooled =
            ParallelEvaluator::new(ctx.clone(), WorkerPool::new(3), EvaluationBudget::default());
        let a = explorer.explore(&pooled);
        let b = explorer.explore(&ParallelEvaluator::sequential(ctx));

        assert_eq!(a.reports.len(), 3);
        for (x, y) in a.reports.iter().zip(&b.reports) {
            assert_eq!(x.seed, y.seed);
            assert_eq!(x.iterations, y.iterations);
            let xb: Vec<u64> = x.trajectory.iter().map(|v| v.to_bits()).collect();
            let yb: Vec<u64> = y.trajectory.iter().map(|v| v.to_bits()).collect();
            assert_eq!(xb, yb);
        }
        assert_eq!(a.seeds.len(), b.seeds.len());
        for (x, y) in a.seeds.iter().zip(&b.seeds) {
            assert!(x.genotype().bits_eq(y.genotype()));
        }
    }

    #[test]
    fn test_chains_use_distinct_streams() {
        let ctx = context();
        let explorer = SaExplorer::new(config(), Scalarization::default());
        let out = explorer.explore(&ParallelEvaluator::sequential(ctx));
        assert_ne!(out.reports[0].seed, out.reports[1].seed);
        assert_ne!(out.reports[0].trajectory, out.reports[1].trajectory);
    }

    #[test]
    fn test_stop_reasons() {
        let ctx = context();
        // 20 * 0.97^k < 0.05 needs k >= 197, so the cap of 150 hits first
        let capped = SaExplorer::new(config(), Scalarization::default())
            .explore(&ParallelEvaluator::sequential(ctx.clone()));
        assert!(capped.reports.iter().all(|r| r.stop_reason == StopReason::MaxIterations));
        assert!(capped.reports.iter().all(|r| r.iterations == 150));

        let cooled = SaExplorer::new(config().with_max_iterations(10_000), Scalarization::default())
            .explore(&ParallelEvaluator::sequential(ctx));
        for r in &cooled.reports {
            assert_eq!(r.stop_reason, StopReason::Cooled);
            assert!(r.final_temperature < 0.05);
            assert_eq!(r.trajectory.len(), r.iterations + 1);
        }
    }

    #[test]
    fn test_best_never_worse_than_trajectory() {
        let ctx = context();
        let out = SaExplorer::new(config(), Scalarization::default())
            .explore(&ParallelEvaluator::sequential(ctx));
        for r in &out.reports {
            let min = r.trajectory.iter().copied().fold(f64::INFINITY, f64::min);
            assert_eq!(r.best_fitness, min);
            assert!(r.accepted_moves >= r.improving_moves);
        }
        assert!(out.seeds.iter().all(Solution::is_evaluated));
        assert!(out.seeds.len() >= 3);
    }

    #[test]
    fn test_budget_stops_chains() {
        let ctx = context();
        let evaluator = ParallelEvaluator::new(
            ctx,
            WorkerPool::sequential(),
            EvaluationBudget::new(Some(40)),
        );
        let out = SaExplorer::new(config(), Scalarization::default()).explore(&evaluator);
        assert!(out.reports.iter().any(|r| r.stop_reason == StopReason::BudgetExhausted));
        // every chain still yields a seed
        assert!(out.seeds.len() >= 3);
        assert!(evaluator.evaluations() <= 40 + 3);
    }

    #[test]
    fn test_cancelled_before_start() {
        let ctx = context();
        let flag = Arc::new(AtomicBool::new(true));
        let evaluator = ParallelEvaluator::new(
            ctx,
            WorkerPool::sequential(),
            EvaluationBudget::new(None).with_cancel(flag),
        );
        let out = SaExplorer::new(config(), Scalarization::default()).explore(&evaluator);
        assert!(out
            .reports
            .iter()
            .all(|r| r.stop_reason == StopReason::Cancelled && r.iterations == 0));
        assert_eq!(out.seeds.len(), 3);
    }
}
