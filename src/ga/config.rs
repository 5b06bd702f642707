//! Genetic refinement configuration.
//!
//! [`GaConfig`] holds all parameters that control the evolutionary loop.

use crate::operators::OperatorWeights;

/// Composition of the initial population.
///
/// Fractions of SA seeds copied as-is, Gaussian-perturbed seed copies and
/// fresh random layouts. They are normalized on use.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InitRatio {
    pub seeds: f64,
    pub perturbed: f64,
    pub random: f64,
}

impl Default for InitRatio {
    fn default() -> Self {
        Self {
            seeds: 0.5,
            perturbed: 0.3,
            random: 0.2,
        }
    }
}

impl InitRatio {
    pub fn new(seeds: f64, perturbed: f64, random: f64) -> Self {
        Self {
            seeds,
            perturbed,
            random,
        }
    }

    /// Splits `n` slots into `(seeds, perturbed, random)` counts summing to `n`.
    pub fn split(&self, n: usize) -> (usize, usize, usize) {
        let total = self.seeds + self.perturbed + self.random;
        if total <= 0.0 {
            return (0, 0, n);
        }
        let seeds = ((self.seeds / total) * n as f64).round() as usize;
        let seeds = seeds.min(n);
        let perturbed = ((self.perturbed / total) * n as f64).round() as usize;
        let perturbed = perturbed.min(n - seeds);
        (seeds, perturbed, n - seeds - perturbed)
    }

    fn validate(&self) -> Result<(), String> {
        let all = [self.seeds, self.perturbed, self.random];
        if all.iter().any(|r| !(r.is_finite() && *r >= 0.0)) {
            return Err(format!("fractions must be finite and non-negative, got {all:?}"));
        }
        if all.iter().sum::<f64>() <= 0.0 {
            return Err("at least one fraction must be positive".into());
        }
        Ok(())
    }
}

/// Configuration for the genetic refinement phase.
///
/// # Defaults
///
/// ```
/// use u_siteplan::ga::GaConfig;
///
/// let config = GaConfig::default();
/// assert_eq!(config.population_size, 60);
/// assert_eq!(config.tournament_size, 3);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_siteplan::ga::GaConfig;
///
/// let config = GaConfig::default()
///     .with_population_size(120)
///     .with_generations(200)
///     .with_tournament_size(4)
///     .with_mutation_rate(0.3);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GaConfig {
    /// Number of layouts kept between generations.
    pub population_size: usize,

    /// Number of generations after the initial one.
    pub generations: usize,

    /// Probability of recombining a parent pair (0.0–1.0).
    ///
    /// When crossover is not applied, both parents pass through unchanged.
    pub crossover_rate: f64,

    /// Probability of mutating an offspring (0.0–1.0).
    pub mutation_rate: f64,

    /// Standard deviation of the Gaussian position mutation, in site units.
    pub mutation_sigma: f64,

    /// Competitors per tournament, drawn without replacement.
    pub tournament_size: usize,

    /// Parents selected per generation. `None` = population size.
    pub parent_pool_size: Option<usize>,

    /// Composition of the initial population.
    pub init_ratio: InitRatio,

    /// Mutation operator mix. Defaults to 70% jitter, 20% swap, 10% reset.
    pub operator_weights: OperatorWeights,

    /// Use NSGA-III survivor selection instead of scalar elitism.
    pub many_objective: bool,

    /// Reference lattice divisions. `None` sizes the lattice to the
    /// population.
    pub reference_divisions: Option<usize>,

    /// Seed of the phase's random stream.
    pub seed: u64,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 60,
            generations: 100,
            crossover_rate: 0.9,
            mutation_rate: 0.2,
            mutation_sigma: 2.0,
            tournament_size: 3,
            parent_pool_size: None,
            init_ratio: InitRatio::default(),
            operator_weights: OperatorWeights::mutation(),
            many_objective: false,
            reference_divisions: None,
            seed: 42,
        }
    }
}

impl GaConfig {
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    pub fn with_generations(mut self, n: usize) -> Self {
        self.generations = n;
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

    pub fn with_parent_pool_size(mut self, n: usize) -> Self {
        self.parent_pool_size = Some(n);
        self
    }

    pub fn with_init_ratio(mut self, ratio: InitRatio) -> Self {
        self.init_ratio = ratio;
        self
    }

    pub fn with_many_objective(mut self, enabled: bool) -> Self {
        self.many_objective = enabled;
        self
    }

    pub fn with_reference_divisions(mut self, divisions: usize) -> Self {
        self.reference_divisions = Some(divisions);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Parents drawn per generation.
    pub fn parents_per_generation(&self) -> usize {
        self.parent_pool_size.unwrap_or(self.population_size)
    }

    /// Small population, few generations. Quick feasibility checks.
    pub fn fast() -> Self {
        Self {
            population_size: 30,
            generations: 40,
            ..Self::default()
        }
    }

    /// Moderate population and generation count.
    pub fn balanced() -> Self {
        Self {
            population_size: 80,
            generations: 200,
            ..Self::default()
        }
    }

    /// Returns the name of the first invalid field and the reason.
    pub fn validate(&self) -> Result<(), (&'static str, String)> {
        if self.population_size < 2 {
            return Err((
                "ga_population_size",
                format!("must be at least 2, got {}", self.population_size),
            ));
        }
        for (field, rate) in [
            ("crossover_rate", self.crossover_rate),
            ("mutation_rate", self.mutation_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err((field, format!("must be in [0, 1], got {rate}")));
            }
        }
        if !(self.mutation_sigma.is_finite() && self.mutation_sigma >= 0.0) {
            return Err((
                "mutation_sigma",
                format!("must be finite and non-negative, got {}", self.mutation_sigma),
            ));
        }
        if self.tournament_size == 0 {
            return Err(("tournament_size", "must be at least 1".into()));
        }
        if self.parent_pool_size == Some(0) {
            return Err(("parent_pool_size", "must be positive when set".into()));
        }
        if self.reference_divisions == Some(0) {
            return Err(("reference_divisions", "must be positive when set".into()));
        }
        self.init_ratio
            .validate()
            .map_err(|reason| ("init_ratio", reason))?;
        self.operator_weights
            .validate()
            .map_err(|reason| ("ga_operator_weights", reason))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GaConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.parents_per_generation(), 60);
        assert_eq!(config.init_ratio, InitRatio::new(0.5, 0.3, 0.2));
    }

    #[test]
    fn test_presets_are_valid() {
        assert!(GaConfig::fast().validate().is_ok());
        assert!(GaConfig::balanced().validate().is_ok());
    }

    #[test]
    fn test_validate_names_field() {
        let cases = [
            (GaConfig::default().with_population_size(1), "ga_population_size"),
            (GaConfig::default().with_crossover_rate(1.5), "crossover_rate"),
            (GaConfig::default().with_mutation_rate(-0.1), "mutation_rate"),
            (GaConfig::default().with_tournament_size(0), "tournament_size"),
            (GaConfig::default().with_parent_pool_size(0), "parent_pool_size"),
            (GaConfig::default().with_reference_divisions(0), "reference_divisions"),
            (
                GaConfig::default().with_init_ratio(InitRatio::new(0.0, 0.0, 0.0)),
                "init_ratio",
            ),
        ];
        for (config, field) in cases {
            assert_eq!(config.validate().unwrap_err().0, field);
        }
    }

    #[test]
    fn test_init_split() {
        assert_eq!(InitRatio::default().split(10), (5, 3, 2));
        assert_eq!(InitRatio::default().split(0), (0, 0, 0));
        assert_eq!(InitRatio::new(1.0, 1.0, 0.0).split(3), (2, 1, 0));
        let (a, b, c) = InitRatio::default().split(7);
        assert_eq!(a + b + c, 7);
    }
}
