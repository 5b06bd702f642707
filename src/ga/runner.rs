//! Generational refinement loop.
//!
//! [`GeneticRefiner`] evolves the annealing seeds:
//! initialization → selection → crossover → mutation → evaluation →
//! replacement → repeat.

use super::config::GaConfig;
use super::selection::{select_parents, Criterion};
use super::types::{GaOutcome, GenerationStats};
use crate::evaluation::{EvaluationContext, ParallelEvaluator, Scalarization};
use crate::layout::{Genotype, Solution};
use crate::operators::{uniform_crossover, Perturbation};
use crate::pareto::{
    constrained_non_dominated_sort, score_matrix, ManyObjectiveRanker, ParetoArchive,
    SurvivorSelection, MANY_OBJECTIVE_THRESHOLD,
};
use crate::random::{create_rng, LayoutRng};
use rand::Rng;
use std::cmp::Ordering;

/// Elitist genetic refinement over an evaluator.
///
/// All evaluation goes through [`ParallelEvaluator::evaluate_batch`], one
/// batch per generation. Copies of evaluated parents are never scored
/// twice.
///
/// # Usage
///
/// ```ignore
/// let refiner = GeneticRefiner::new(GaConfig::default().with_seed(7), Scalarization::default());
/// let outcome = refiner.refine(&sa_outcome.seeds, &evaluator);
/// println!("best fitness: {}", outcome.best_fitness);
/// ```
#[derive(Debug, Clone)]
pub struct GeneticRefiner {
    config: GaConfig,
    scalarization: Scalarization,
}

impl GeneticRefiner {
    pub fn new(config: GaConfig, scalarization: Scalarization) -> Self {
        Self {
            config,
            scalarization,
        }
    }

    pub fn config(&self) -> &GaConfig {
        &self.config
    }

    /// Whether NSGA-III survivor selection applies for `n_objectives`.
    pub fn is_many_objective(&self, n_objectives: usize) -> bool {
        self.config.many_objective || n_objectives >= MANY_OBJECTIVE_THRESHOLD
    }

    /// Runs the generation loop starting from `seeds`.
    ///
    /// Seeds may be evaluated or not. With no seeds the initial population
    /// is entirely random. Budget exhaustion and cancellation are checked
    /// between generations; the generation in flight always completes.
    ///
    /// If the budget is already spent or cancelled on entry, nothing new is
    /// evaluated: the population is made of the evaluated seeds alone.
    ///
    /// # Panics
    /// Panics if the configuration is invalid (call [`GaConfig::validate`]
    /// first to get a descriptive error).
    pub fn refine(&self, seeds: &[Solution], evaluator: &ParallelEvaluator) -> GaOutcome {
        assert!(self.config.validate().is_ok(), "invalid GaConfig");

        let context = evaluator.context();
        let n_objectives = context.objective_count();
        let mut rng = create_rng(self.config.seed);

        let ranker = self
            .is_many_objective(n_objectives)
            .then(|| self.ranker(n_objectives));
        let mut archive = ranker.as_ref().map(|r| {
            ParetoArchive::with_directions(
                n_objectives,
                self.config.population_size,
                r.directions().clone(),
            )
        });
        let criterion = if ranker.is_some() {
            Criterion::RankCrowding
        } else {
            Criterion::Fitness
        };

        let budget = evaluator.budget();
        let mut population = if budget.is_cancelled() || budget.is_exhausted() {
            log::info!("refinement stopped before start, keeping evaluated seeds only");
            self.evaluated_seeds(seeds, context, &mut rng)
        } else {
            let initial = self.initial_population(seeds, context, &mut rng);
            evaluator.evaluate_batch(&initial)
        };
        if let Some(ranker) = &ranker {
            ranker.rank(&mut population);
        }
        if let Some(archive) = archive.as_mut() {
            archive.update(&population);
        }

        let mut best = population[self.best_index(&population)].clone();
        let mut history = Vec::with_capacity(self.config.generations + 1);
        history.push(self.stats(0, &population, n_objectives));

        let mut generations = 0;
        let mut cancelled = false;
        let mut budget_exhausted = false;

        for generation in 1..=self.config.generations {
            let budget = evaluator.budget();
            if budget.is_cancelled() {
                cancelled = true;
                break;
            }
            if budget.is_exhausted() {
                budget_exhausted = true;
                break;
            }

            let offspring = self.breed(&population, context, criterion, &mut rng);
            let offspring = evaluator.evaluate_batch(&offspring);
            if let Some(archive) = archive.as_mut() {
                archive.update(&offspring);
            }
            population = self.replace(population, offspring, ranker.as_ref());

            let leader = &population[self.best_index(&population)];
            if self.elitist_order(leader, &best) == Ordering::Less {
                best = leader.clone();
            }

            let stats = self.stats(generation, &population, n_objectives);
            log::debug!(
                "generation {generation}: best {:.6}, mean {:.6}, {} feasible, front {}",
                stats.best_fitness,
                stats.mean_fitness,
                stats.feasible_count,
                stats.front_size
            );
            history.push(stats);
            generations = generation;
        }

        let best_fitness = best.fitness(&self.scalarization);
        log::info!(
            "genetic refinement finished: {generations} generations, best {best_fitness:.6}{}",
            if cancelled {
                " (cancelled)"
            } else if budget_exhausted {
                " (budget exhausted)"
            } else {
                ""
            }
        );

        GaOutcome {
            best,
            best_fitness,
            population,
            archive: archive.map(ParetoArchive::into_members).unwrap_or_default(),
            history,
            generations,
            budget_exhausted,
            cancelled,
        }
    }

    fn ranker(&self, n_objectives: usize) -> ManyObjectiveRanker {
        match self.config.reference_divisions {
            Some(divisions) => ManyObjectiveRanker::with_divisions(n_objectives, divisions),
            None => ManyObjectiveRanker::new(n_objectives, self.config.population_size),
        }
    }

    /// Seeds by fitness, jittered seed copies, then random layouts.
    ///
    /// Seed slots that cannot be filled because there are too few seeds
    /// become jittered copies instead.
    fn initial_population(
        &self,
        seeds: &[Solution],
        context: &EvaluationContext,
        rng: &mut LayoutRng,
    ) -> Vec<Solution> {
        let n = self.config.population_size;
        let (arena, site) = (context.arena(), context.site());
        let mut population = Vec::with_capacity(n);

        let mut ranked: Vec<&Solution> = seeds.iter().collect();
        ranked.sort_by(|a, b| self.elitist_order(a, b));

        if !ranked.is_empty() {
            let (wanted, perturbed, _) = self.config.init_ratio.split(n);
            let copied = wanted.min(ranked.len());
            population.extend(ranked.iter().take(copied).map(|s| (*s).clone()));

            let jitter = Perturbation::Gaussian {
                sigma: self.config.mutation_sigma,
            };
            for i in 0..perturbed + (wanted - copied) {
                let parent = ranked[i % ranked.len()];
                population.push(jitter.apply(parent, arena, site, rng));
            }
        }

        while population.len() < n {
            population.push(Solution::new(Genotype::random(arena, site, rng)));
        }
        population
    }

    /// Evaluated seeds by fitness, capped at the population size.
    ///
    /// Falls back to a single unevaluated layout so the population is never
    /// empty.
    fn evaluated_seeds(
        &self,
        seeds: &[Solution],
        context: &EvaluationContext,
        rng: &mut LayoutRng,
    ) -> Vec<Solution> {
        let mut kept: Vec<Solution> =
            seeds.iter().filter(|s| s.is_evaluated()).cloned().collect();
        kept.sort_by(|a, b| self.elitist_order(a, b));
        kept.truncate(self.config.population_size);
        if kept.is_empty() {
            kept.push(match seeds.first() {
                Some(seed) => seed.clone(),
                None => Solution::new(Genotype::random(context.arena(), context.site(), rng)),
            });
        }
        kept
    }

    /// Selection, crossover and mutation for one generation.
    ///
    /// With an odd parent count the last parent is carried over as is,
    /// skipping both crossover and mutation.
    fn breed(
        &self,
        population: &[Solution],
        context: &EvaluationContext,
        criterion: Criterion,
        rng: &mut LayoutRng,
    ) -> Vec<Solution> {
        let parents = select_parents(
            population,
            self.config.parents_per_generation(),
            self.config.tournament_size,
            criterion,
            &self.scalarization,
            rng,
        );

        let mut children = Vec::with_capacity(parents.len());
        let mut carried = None;
        for pair in parents.chunks(2) {
            match *pair {
                [a, b] => {
                    let (a, b) = (&population[a], &population[b]);
                    if rng.random::<f64>() < self.config.crossover_rate {
                        let (x, y) = uniform_crossover(a, b, context.arena(), rng);
                        children.push(x);
                        children.push(y);
                    } else {
                        children.push(a.clone());
                        children.push(b.clone());
                    }
                }
                [a] => carried = Some(population[a].clone()),
                _ => {}
            }
        }

        let mut offspring = Vec::with_capacity(parents.len());
        for child in children {
            offspring.push(self.mutate(child, context, rng));
        }
        offspring.extend(carried);
        offspring
    }

    fn mutate(
        &self,
        child: Solution,
        context: &EvaluationContext,
        rng: &mut LayoutRng,
    ) -> Solution {
        if rng.random::<f64>() >= self.config.mutation_rate {
            return child;
        }
        let operator = self
            .config
            .operator_weights
            .choose(self.config.mutation_sigma, rng);
        operator.apply(&child, context.arena(), context.site(), rng)
    }

    /// Merges parents and offspring and keeps `population_size` of them.
    fn replace(
        &self,
        mut population: Vec<Solution>,
        offspring: Vec<Solution>,
        ranker: Option<&ManyObjectiveRanker>,
    ) -> Vec<Solution> {
        let cap = self.config.population_size;
        population.extend(offspring);

        let Some(ranker) = ranker else {
            // stable: on full ties the incumbent outlives the newcomer
            population.sort_by(|a, b| self.elitist_order(a, b));
            population.truncate(cap);
            return population;
        };

        let SurvivorSelection {
            selected: mut keep,
            rankings,
        } = ranker.survivors(&population, cap);

        // the scalar leader survives niching too
        let leader = self.best_index(&population);
        if !keep.contains(&leader) {
            match keep.last_mut() {
                Some(last) => *last = leader,
                None => keep.push(leader),
            }
        }

        let mut slots: Vec<Option<Solution>> = population.into_iter().map(Some).collect();
        keep.into_iter()
            .filter_map(|i| {
                let mut s = slots[i].take()?;
                s.set_ranking(rankings[i]);
                Some(s)
            })
            .collect()
    }

    /// Scalar fitness, then lower constraint total.
    fn elitist_order(&self, a: &Solution, b: &Solution) -> Ordering {
        let violation = |s: &Solution| s.constraint_total().unwrap_or(f64::INFINITY);
        a.fitness(&self.scalarization)
            .total_cmp(&b.fitness(&self.scalarization))
            .then_with(|| violation(a).total_cmp(&violation(b)))
    }

    fn best_index(&self, population: &[Solution]) -> usize {
        population
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| self.elitist_order(a, b))
            .map_or(0, |(i, _)| i)
    }

    fn stats(
        &self,
        generation: usize,
        population: &[Solution],
        n_objectives: usize,
    ) -> GenerationStats {
        let fitness: Vec<f64> = population
            .iter()
            .map(|s| s.fitness(&self.scalarization))
            .collect();
        let (objectives, violations) = score_matrix(population, n_objectives);
        let front_size = constrained_non_dominated_sort(&objectives, &violations)
            .fronts
            .first()
            .map_or(0, Vec::len);

        GenerationStats {
            generation,
            best_fitness: fitness.iter().copied().fold(f64::INFINITY, f64::min),
            mean_fitness: fitness.iter().sum::<f64>() / fitness.len().max(1) as f64,
            feasible_count: population.iter().filter(|s| s.is_feasible()).count(),
            front_size,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
