//! Two-phase optimization entry point.
//!
//! [`run`] and the [`Optimizer`] builder validate the inputs, build the
//! shared [`EvaluationContext`], run annealing exploration followed by
//! genetic refinement on one [`ParallelEvaluator`], and package the result.
//!
//! ```no_run
//! use u_siteplan::layout::{BuildingSpec, Site};
//! use u_siteplan::optimizer::{run, LayoutConfig};
//!
//! let site = Site::rectangle(120.0, 80.0).unwrap();
//! let buildings = vec![
//!     BuildingSpec::new("hall", "office", 30.0, 20.0),
//!     BuildingSpec::new("annex", "office", 15.0, 12.0),
//! ];
//! let result = run(buildings, &site, &LayoutConfig::fast().with_seed(3)).unwrap();
//! println!("feasible: {}, fitness {:.4}", result.feasible, result.fitness);
//! ```

use crate::constraints::{
    ComplianceCheck, ConstraintBreakdown, ConstraintEvaluator, ConstraintSettings,
};
use crate::error::{ConfigError, LayoutError};
use crate::evaluation::{
    EvaluationBudget, EvaluationContext, ParallelEvaluator, Scalarization, WorkerPool,
};
use crate::ga::{GaConfig, GenerationStats, GeneticRefiner, InitRatio};
use crate::layout::{BuildingArena, BuildingSpec, Evaluation, Site, Solution};
use crate::objectives::{AdjacencyRule, ExternalObjective, ObjectiveEvaluator};
use crate::random::derive_seed;
use crate::sa::{ChainReport, SaConfig, SaExplorer, StopReason};
use std::num::NonZeroUsize;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Stream index of the genetic phase's random generator. Annealing chains
/// use indices `0..sa_chains`.
const GA_STREAM: u64 = u64::MAX;

/// Run-wide configuration.
///
/// Field names follow the option keys of the orchestration layer.
///
/// # Examples
///
/// ```
/// use u_siteplan::optimizer::LayoutConfig;
///
/// let config = LayoutConfig::default()
///     .with_sa_chains(4)
///     .with_ga_generations(50)
///     .with_workers(2)
///     .with_seed(11);
/// assert!(config.validate().is_ok());
///
/// let err = LayoutConfig::default().with_sa_chains(0).validate().unwrap_err();
/// assert_eq!(err.field(), "sa_chains");
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayoutConfig {
    /// Independent annealing chains.
    pub sa_chains: usize,
    pub sa_initial_temp: f64,
    pub sa_final_temp: f64,
    /// Geometric cooling factor in (0, 1).
    pub sa_cooling_rate: f64,
    /// Move cap per chain.
    pub sa_max_iterations: usize,

    pub ga_population_size: usize,
    pub ga_generations: usize,
    pub crossover_rate: f64,
    pub mutation_rate: f64,
    pub mutation_sigma: f64,
    pub tournament_size: usize,
    /// Parents per generation. `None` = population size.
    pub parent_pool_size: Option<usize>,
    /// Seeds / jittered seeds / random split of the initial population.
    pub init_ratio: InitRatio,

    /// Worker threads. 1 evaluates on the calling thread.
    pub n_workers: usize,

    /// Force NSGA-III survivor selection. It is switched on anyway from
    /// four objectives up.
    pub many_objective: bool,
    /// Das-Dennis divisions. `None` sizes the lattice to the population.
    pub reference_divisions: Option<usize>,

    /// Overall evaluation budget across both phases.
    pub max_evaluations: Option<usize>,

    /// Master seed.
    pub seed: u64,

    /// Objective weights and constraint penalty for scalar fitness.
    pub scalarization: Scalarization,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        let sa = SaConfig::default();
        let ga = GaConfig::default();
        Self {
            sa_chains: sa.chains,
            sa_initial_temp: sa.initial_temperature,
            sa_final_temp: sa.final_temperature,
            sa_cooling_rate: sa.cooling_rate,
            sa_max_iterations: sa.max_iterations,
            ga_population_size: ga.population_size,
            ga_generations: ga.generations,
            crossover_rate: ga.crossover_rate,
            mutation_rate: ga.mutation_rate,
            mutation_sigma: ga.mutation_sigma,
            tournament_size: ga.tournament_size,
            parent_pool_size: ga.parent_pool_size,
            init_ratio: ga.init_ratio,
            n_workers: std::thread::available_parallelism().map_or(1, NonZeroUsize::get),
            many_objective: false,
            reference_divisions: None,
            max_evaluations: None,
            seed: 42,
            scalarization: Scalarization::default(),
        }
    }
}

impl LayoutConfig {
    pub fn with_sa_chains(mut self, n: usize) -> Self {
        self.sa_chains = n;
        self
    }

    pub fn with_sa_temperatures(mut self, initial: f64, last: f64) -> Self {
        self.sa_initial_temp = initial;
        self.sa_final_temp = last;
        self
    }

    pub fn with_sa_cooling_rate(mut self, rate: f64) -> Self {
        self.sa_cooling_rate = rate;
        self
    }

    pub fn with_sa_max_iterations(mut self, n: usize) -> Self {
        self.sa_max_iterations = n;
        self
    }

    pub fn with_ga_population_size(mut self, n: usize) -> Self {
        self.ga_population_size = n;
        self
    }

    pub fn with_ga_generations(mut self, n: usize) -> Self {
        self.ga_generations = n;
        self
    }

    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate;
        self
    }

    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    pub fn with_mutation_sigma(mut self, sigma: f64) -> Self {
        self.mutation_sigma = sigma;
        self
    }

    pub fn with_tournament_size(mut self, k: usize) -> Self {
        self.tournament_size = k;
        self
    }

    pub fn with_workers(mut self, n: usize) -> Self {
        self.n_workers = n;
        self
    }

    pub fn with_many_objective(mut self, enabled: bool) -> Self {
        self.many_objective = enabled;
        self
    }

    pub fn with_max_evaluations(mut self, n: usize) -> Self {
        self.max_evaluations = Some(n);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_scalarization(mut self, scalarization: Scalarization) -> Self {
        self.scalarization = scalarization;
        self
    }

    /// Few short chains, small population. Quick feasibility checks.
    pub fn fast() -> Self {
        Self {
            sa_chains: 4,
            sa_initial_temp: 10.0,
            sa_final_temp: 0.01,
            sa_cooling_rate: 0.98,
            sa_max_iterations: 400,
            ga_population_size: 30,
            ga_generations: 40,
            ..Self::default()
        }
    }

    /// Default annealing with a larger population.
    pub fn balanced() -> Self {
        Self {
            ga_population_size: 80,
            ga_generations: 200,
            ..Self::default()
        }
    }

    /// Annealing phase parameters.
    pub fn sa_config(&self) -> SaConfig {
        SaConfig {
            chains: self.sa_chains,
            initial_temperature: self.sa_initial_temp,
            final_temperature: self.sa_final_temp,
            cooling_rate: self.sa_cooling_rate,
            max_iterations: self.sa_max_iterations,
            seed: self.seed,
            ..SaConfig::default()
        }
    }

    /// Genetic phase parameters.
    pub fn ga_config(&self) -> GaConfig {
        GaConfig {
            population_size: self.ga_population_size,
            generations: self.ga_generations,
            crossover_rate: self.crossover_rate,
            mutation_rate: self.mutation_rate,
            mutation_sigma: self.mutation_sigma,
            tournament_size: self.tournament_size,
            parent_pool_size: self.parent_pool_size,
            init_ratio: self.init_ratio,
            many_objective: self.many_objective,
            reference_divisions: self.reference_divisions,
            seed: derive_seed(self.seed, GA_STREAM),
            ..GaConfig::default()
        }
    }

    /// Checks every field. The error names the first offending one.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |(field, reason): (&'static str, String)| ConfigError::invalid(field, reason);
        self.sa_config().validate().map_err(invalid)?;
        self.ga_config().validate().map_err(invalid)?;
        self.scalarization.validate().map_err(invalid)?;
        if self.n_workers == 0 {
            return Err(ConfigError::invalid("n_workers", "at least one worker is required"));
        }
        if self.max_evaluations == Some(0) {
            return Err(ConfigError::invalid(
                "max_evaluations",
                "must be positive when set",
            ));
        }
        Ok(())
    }
}

/// Counters and timings of one run.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RuntimeStats {
    pub total_duration: Duration,
    pub sa_duration: Duration,
    pub ga_duration: Duration,

    /// Evaluations performed, sentinel ones included.
    pub evaluations: usize,

    /// Evaluations that ended with a sentinel score.
    pub failed_evaluations: usize,

    /// Worker threads actually used.
    pub workers: usize,

    /// The pool could not be started and evaluation ran on the caller.
    pub sequential_fallback: bool,

    /// Degradations recovered during the run.
    pub warnings: Vec<String>,

    /// One report per annealing chain.
    pub chain_reports: Vec<ChainReport>,

    /// Genetic generations completed after the initial one.
    pub generations: usize,

    pub budget_exhausted: bool,

    pub cancelled: bool,
}

/// Best-effort outcome of a run. Never empty: even a cancelled run carries
/// the best evaluated layout found before stopping.
#[derive(Debug, Clone)]
pub struct LayoutResult {
    pub best: Solution,

    /// Objective names, in vector order.
    pub objective_names: Vec<String>,

    pub objectives: Vec<f64>,

    /// Weighted constraint total of `best`.
    pub constraint_total: f64,

    /// Unweighted per-category violations of `best`.
    pub constraints: ConstraintBreakdown,

    /// `constraint_total == 0` and the evaluation did not fail.
    pub feasible: bool,

    /// Scalar fitness of `best`.
    pub fitness: f64,

    /// Non-dominated archive in many-objective mode.
    pub pareto_front: Option<Vec<Solution>>,

    /// Genetic phase statistics, generation 0 first.
    pub convergence_history: Vec<GenerationStats>,

    pub runtime_stats: RuntimeStats,
}

/// Configurable optimizer.
///
/// Collaborators plug in here: extra objectives, compliance checks,
/// adjacency preferences and constraint thresholds.
///
/// ```no_run
/// use std::sync::Arc;
/// use u_siteplan::layout::{BuildingSpec, Footprint, Site};
/// use u_siteplan::objectives::{AdjacencyRule, NamedObjective, Preference};
/// use u_siteplan::optimizer::{LayoutConfig, Optimizer};
///
/// let shade = NamedObjective::new("shade", |fps: &[Footprint]| {
///     Ok(fps.iter().map(|fp| fp.height).sum::<f64>())
/// });
/// let optimizer = Optimizer::new(LayoutConfig::fast())
///     .with_external_objective(Arc::new(shade))
///     .with_adjacency_rules(vec![AdjacencyRule::new(
///         "office",
///         "lab",
///         Preference::Near { max_distance: 30.0 },
///     )]);
///
/// let site = Site::rectangle(100.0, 100.0).unwrap();
/// let result = optimizer
///     .run(vec![BuildingSpec::new("a", "office", 20.0, 10.0)], &site)
///     .unwrap();
/// assert_eq!(result.objectives.len(), 4);
/// ```
#[derive(Clone, Default)]
pub struct Optimizer {
    config: LayoutConfig,
    objectives: ObjectiveEvaluator,
    constraints: ConstraintSettings,
    compliance: Vec<Arc<dyn ComplianceCheck>>,
    rules: Vec<AdjacencyRule>,
}

impl std::fmt::Debug for Optimizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Optimizer")
            .field("config", &self.config)
            .field("objectives", &self.objectives)
            .field("constraints", &self.constraints)
            .field("compliance", &self.compliance.len())
            .field("rules", &self.rules)
            .finish()
    }
}

impl Optimizer {
    /// Standard objectives and default constraint settings.
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Replaces the objective list.
    pub fn with_objectives(mut self, objectives: ObjectiveEvaluator) -> Self {
        self.objectives = objectives;
        self
    }

    /// Appends an external objective to the vector.
    pub fn with_external_objective(mut self, objective: Arc<dyn ExternalObjective>) -> Self {
        self.objectives = self.objectives.with_external(objective);
        self
    }

    /// Adds a compliance check to the `compliance` constraint category.
    pub fn with_compliance(mut self, check: Arc<dyn ComplianceCheck>) -> Self {
        self.compliance.push(check);
        self
    }

    pub fn with_adjacency_rules(mut self, rules: Vec<AdjacencyRule>) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_constraint_settings(mut self, settings: ConstraintSettings) -> Self {
        self.constraints = settings;
        self
    }

    /// Runs both phases to completion or budget exhaustion.
    pub fn run(
        &self,
        buildings: Vec<BuildingSpec>,
        site: &Site,
    ) -> Result<LayoutResult, LayoutError> {
        self.run_with_cancel(buildings, site, None)
    }

    /// Runs both phases with an optional cancellation flag.
    ///
    /// Once the flag is set, chains and generations in flight finish and
    /// the best layout found so far is returned.
    pub fn run_with_cancel(
        &self,
        buildings: Vec<BuildingSpec>,
        site: &Site,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<LayoutResult, LayoutError> {
        let started = Instant::now();
        let context = Arc::new(self.context(buildings, site)?);
        let config = &self.config;
        let scalarization = &config.scalarization;

        let pool = WorkerPool::new(config.n_workers);
        let mut warnings: Vec<String> = pool.warning().map(str::to_owned).into_iter().collect();
        let sequential_fallback = pool.warning().is_some();
        let workers = pool.workers();

        let mut budget = EvaluationBudget::new(config.max_evaluations);
        if let Some(flag) = cancel {
            budget = budget.with_cancel(flag);
        }
        let evaluator = ParallelEvaluator::new(Arc::clone(&context), pool, budget);

        log::info!(
            "optimizing {} buildings against {} objectives on {workers} worker(s)",
            context.arena().len(),
            context.objective_count()
        );

        let sa_started = Instant::now();
        let explorer = SaExplorer::new(config.sa_config(), scalarization.clone());
        let explored = explorer.explore(&evaluator);
        let sa_duration = sa_started.elapsed();

        let ga_started = Instant::now();
        let refiner = GeneticRefiner::new(config.ga_config(), scalarization.clone());
        let many_objective = refiner.is_many_objective(context.objective_count());
        let refined = refiner.refine(&explored.seeds, &evaluator);
        let ga_duration = ga_started.elapsed();

        // refinement may start without copying any seed
        let best = std::iter::once(&refined.best)
            .chain(&explored.seeds)
            .min_by(|a, b| {
                a.fitness(scalarization)
                    .total_cmp(&b.fitness(scalarization))
                    .then_with(|| {
                        let total = |s: &Solution| s.constraint_total().unwrap_or(f64::INFINITY);
                        total(a).total_cmp(&total(b))
                    })
            })
            .cloned()
            .unwrap_or(refined.best);

        let failed = evaluator.failures();
        if failed > 0 {
            warnings.push(format!("{failed} evaluation(s) failed and were scored as sentinels"));
        }

        let chains_hit =
            |reason: StopReason| explored.reports.iter().any(|r| r.stop_reason == reason);
        let runtime_stats = RuntimeStats {
            total_duration: started.elapsed(),
            sa_duration,
            ga_duration,
            evaluations: evaluator.evaluations(),
            failed_evaluations: failed,
            workers,
            sequential_fallback,
            warnings,
            generations: refined.generations,
            budget_exhausted: refined.budget_exhausted || chains_hit(StopReason::BudgetExhausted),
            cancelled: refined.cancelled || chains_hit(StopReason::Cancelled),
            chain_reports: explored.reports,
        };

        let evaluation = best
            .evaluation()
            .cloned()
            .unwrap_or_else(|| Evaluation::sentinel(context.objective_count()));
        let fitness = best.fitness(scalarization);
        log::info!(
            "layout optimization finished in {:?}: fitness {fitness:.6}, violation {:.6}, {} evals",
            runtime_stats.total_duration,
            evaluation.constraint_total,
            runtime_stats.evaluations
        );

        Ok(LayoutResult {
            feasible: evaluation.is_feasible(),
            objective_names: context
                .objectives()
                .names()
                .into_iter()
                .map(str::to_owned)
                .collect(),
            objectives: evaluation.objectives,
            constraint_total: evaluation.constraint_total,
            constraints: evaluation.constraints,
            fitness,
            best,
            pareto_front: many_objective.then_some(refined.archive),
            convergence_history: refined.history,
            runtime_stats,
        })
    }

    /// Validates everything and assembles the shared evaluation context.
    fn context(
        &self,
        buildings: Vec<BuildingSpec>,
        site: &Site,
    ) -> Result<EvaluationContext, LayoutError> {
        self.config.validate()?;
        self.constraints
            .validate()
            .map_err(|(field, reason)| ConfigError::invalid(field, reason))?;

        let arena = BuildingArena::new(buildings)?;

        let mut objectives = self.objectives.clone();
        if !self.rules.is_empty() {
            objectives = objectives.with_rules(self.rules.clone());
        }
        let weights = self.config.scalarization.objective_weights.len();
        if weights > objectives.len() {
            return Err(ConfigError::invalid(
                "scalarization.objective_weights",
                format!("{weights} weights for {} objectives", objectives.len()),
            )
            .into());
        }

        let constraints = self
            .compliance
            .iter()
            .fold(ConstraintEvaluator::new(self.constraints.clone()), |c, check| {
                c.with_compliance(Arc::clone(check))
            });

        Ok(EvaluationContext::new(arena, site.clone(), constraints, objectives))
    }
}

/// Optimizes with the standard objectives and default constraint settings.
///
/// Fails only on invalid configuration or building definitions; infeasible
/// layouts are reported through [`LayoutResult::feasible`].
pub fn run(
    buildings: Vec<BuildingSpec>,
    site: &Site,
    config: &LayoutConfig,
) -> Result<LayoutResult, LayoutError> {
    Optimizer::new(config.clone()).run(buildings, site)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SiteError;

    fn small() -> LayoutConfig {
        LayoutConfig::fast()
            .with_sa_chains(2)
            .with_sa_max_iterations(60)
            .with_ga_population_size(10)
            .with_ga_generations(5)
            .with_workers(1)
            .with_seed(8)
    }

    #[test]
    fn test_presets_are_valid() {
        assert!(LayoutConfig::default().validate().is_ok());
        assert!(LayoutConfig::fast().validate().is_ok());
        assert!(LayoutConfig::balanced().validate().is_ok());
    }

    #[test]
    fn test_validate_names_field() {
        let cases = [
            (LayoutConfig::default().with_sa_chains(0), "sa_chains"),
            (LayoutConfig::default().with_sa_cooling_rate(1.2), "sa_cooling_rate"),
            (LayoutConfig::default().with_sa_temperatures(1.0, 5.0), "sa_final_temp"),
            (LayoutConfig::default().with_ga_population_size(0), "ga_population_size"),
            (LayoutConfig::default().with_crossover_rate(-0.2), "crossover_rate"),
            (LayoutConfig::default().with_mutation_rate(2.0), "mutation_rate"),
            (LayoutConfig::default().with_tournament_size(0), "tournament_size"),
            (LayoutConfig::default().with_workers(0), "n_workers"),
            (LayoutConfig::default().with_max_evaluations(0), "max_evaluations"),
            (
                LayoutConfig::default().with_scalarization(Scalarization::new(vec![], -1.0)),
                "scalarization.penalty_weight",
            ),
        ];
        for (config, field) in cases {
            assert_eq!(config.validate().unwrap_err().field(), field);
        }
    }

    #[test]
    fn test_phase_configs_carry_fields() {
        let config = small().with_many_objective(true);
        let sa = config.sa_config();
        assert_eq!(sa.chains, 2);
        assert_eq!(sa.max_iterations, 60);
        assert_eq!(sa.seed, 8);
        let ga = config.ga_config();
        assert_eq!(ga.population_size, 10);
        assert!(ga.many_objective);
        assert_ne!(ga.seed, sa.seed);
    }

    #[test]
    fn test_invalid_config_fails_before_work() {
        let site = Site::rectangle(50.0, 50.0).unwrap();
        let err = run(
            vec![BuildingSpec::new("a", "k", 5.0, 5.0)],
            &site,
            &small().with_sa_chains(0),
        )
        .unwrap_err();
        assert!(matches!(err, LayoutError::Config(ref e) if e.field() == "sa_chains"));
    }

    #[test]
    fn test_invalid_building_is_site_error() {
        let site = Site::rectangle(50.0, 50.0).unwrap();
        let err = run(vec![BuildingSpec::new("a", "k", -5.0, 5.0)], &site, &small()).unwrap_err();
        assert!(matches!(err, LayoutError::Site(SiteError::InvalidBuilding { .. })));
    }

    #[test]
    fn test_too_many_weights() {
        let site = Site::rectangle(50.0, 50.0).unwrap();
        let config = small().with_scalarization(Scalarization::new(vec![1.0; 5], 10.0));
        let err = run(vec![BuildingSpec::new("a", "k", 5.0, 5.0)], &site, &config).unwrap_err();
        assert!(matches!(
            err,
            LayoutError::Config(ref e) if e.field() == "scalarization.objective_weights"
        ));
    }

    #[test]
    fn test_run_reports_stats() {
        let site = Site::rectangle(80.0, 60.0).unwrap();
        let buildings = vec![
            BuildingSpec::new("a", "office", 10.0, 8.0),
            BuildingSpec::new("b", "lab", 12.0, 6.0),
        ];
        let result = run(buildings, &site, &small()).unwrap();

        assert!(result.best.is_evaluated());
        assert_eq!(result.objectives.len(), 3);
        assert_eq!(result.objective_names, vec!["compactness", "adjacency", "cost"]);
        assert!(result.pareto_front.is_none());
        assert_eq!(result.convergence_history.len(), 6);
        let stats = &result.runtime_stats;
        assert_eq!(stats.chain_reports.len(), 2);
        assert_eq!(stats.generations, 5);
        assert_eq!(stats.workers, 1);
        assert!(!stats.sequential_fallback);
        assert!(stats.evaluations > 0);
        assert!(!stats.cancelled && !stats.budget_exhausted);
        assert_eq!(result.fitness, result.best.fitness(&Scalarization::default()));
    }

    #[test]
    fn test_cancel_still_returns_result() {
        let site = Site::rectangle(80.0, 60.0).unwrap();
        let flag = Arc::new(AtomicBool::new(true));
        let result = Optimizer::new(small())
            .run_with_cancel(vec![BuildingSpec::new("a", "k", 5.0, 5.0)], &site, Some(flag))
            .unwrap();
        assert!(result.runtime_stats.cancelled);
        assert!(result.best.is_evaluated());
        assert_eq!(result.runtime_stats.generations, 0);
    }

    #[test]
    fn test_budget_spent_in_annealing_skips_refinement_batch() {
        let site = Site::rectangle(80.0, 60.0).unwrap();
        let config = LayoutConfig::fast()
            .with_sa_chains(2)
            .with_workers(1)
            .with_ga_population_size(200)
            .with_max_evaluations(50)
            .with_seed(8);
        let result = run(vec![BuildingSpec::new("a", "k", 5.0, 5.0)], &site, &config).unwrap();

        let stats = &result.runtime_stats;
        assert!(stats.budget_exhausted);
        assert_eq!(stats.generations, 0);
        // at most one evaluation per chain can be in flight when the limit is hit
        assert!(stats.evaluations <= 50 + 2, "{} evaluations", stats.evaluations);
        assert!(result.best.is_evaluated());
    }
}
