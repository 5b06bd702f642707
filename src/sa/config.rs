//! Annealing configuration.

use crate::operators::OperatorWeights;

/// Configuration of the multi-chain annealing phase.
///
/// Temperature cools geometrically, `T_{k+1} = cooling_rate · T_k`, once
/// per iteration. A chain stops when `T < final_temperature` or after
/// `max_iterations` moves, whichever comes first.
///
/// # Examples
///
/// ```
/// use u_siteplan::sa::SaConfig;
///
/// let config = SaConfig::default()
///     .with_chains(4)
///     .with_initial_temperature(50.0)
///     .with_cooling_rate(0.99)
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SaConfig {
    /// Number of independent chains.
    pub chains: usize,

    /// Starting temperature, in fitness units.
    pub initial_temperature: f64,

    /// A chain is cooled once its temperature drops below this.
    pub final_temperature: f64,

    /// Geometric cooling factor in (0, 1). Higher = slower cooling.
    pub cooling_rate: f64,

    /// Hard cap on moves per chain.
    pub max_iterations: usize,

    /// Operator mix. Defaults to 80% jitter, 15% swap, 5% reset.
    pub operator_weights: OperatorWeights,

    /// Jitter step is `T / sigma_divisor`.
    pub sigma_divisor: f64,

    /// Master seed; chain `i` uses a stream derived from it.
    pub seed: u64,
}

impl Default for SaConfig {
    fn default() -> Self {
        Self {
            chains: 8,
            initial_temperature: 100.0,
            final_temperature: 0.01,
            cooling_rate: 0.995,
            max_iterations: 5_000,
            operator_weights: OperatorWeights::annealing(),
            sigma_divisor: 10.0,
            seed: 42,
        }
    }
}

impl SaConfig {
    pub fn with_chains(mut self, n: usize) -> Self {
        self.chains = n;
        self
    }

    pub fn with_initial_temperature(mut self, t: f64) -> Self {
        self.initial_temperature = t;
        self
    }

    pub fn with_final_temperature(mut self, t: f64) -> Self {
        self.final_temperature = t;
        self
    }

    pub fn with_cooling_rate(mut self, rate: f64) -> Self {
        self.cooling_rate = rate;
        self
    }

    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    pub fn with_operator_weights(mut self, weights: OperatorWeights) -> Self {
        self.operator_weights = weights;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Returns the name of the first invalid field and the reason.
    pub fn validate(&self) -> Result<(), (&'static str, String)> {
        if self.chains == 0 {
            return Err(("sa_chains", "at least one chain is required".into()));
        }
        if !(self.initial_temperature.is_finite() && self.initial_temperature > 0.0) {
            return Err((
                "sa_initial_temp",
                format!("must be positive, got {}", self.initial_temperature),
            ));
        }
        if !(self.final_temperature.is_finite() && self.final_temperature > 0.0) {
            return Err((
                "sa_final_temp",
                format!("must be positive, got {}", self.final_temperature),
            ));
        }
        if self.final_temperature >= self.initial_temperature {
            return Err((
                "sa_final_temp",
                format!(
                    "must be below the initial temperature {}, got {}",
                    self.initial_temperature, self.final_temperature
                ),
            ));
        }
        if !(self.cooling_rate > 0.0 && self.cooling_rate < 1.0) {
            return Err((
                "sa_cooling_rate",
                format!("must be in (0, 1), got {}", self.cooling_rate),
            ));
        }
        if self.max_iterations == 0 {
            return Err(("sa_max_iterations", "must be positive".into()));
        }
        if !(self.sigma_divisor.is_finite() && self.sigma_divisor > 0.0) {
            return Err((
                "sa_sigma_divisor",
                format!("must be positive, got {}", self.sigma_divisor),
            ));
        }
        self.operator_weights
            .validate()
            .map_err(|reason| ("sa_operator_weights", reason))
    }

    /// Iterations until the temperature first drops below the final one.
    pub fn cooling_steps(&self) -> usize {
        if self.final_temperature >= self.initial_temperature {
            return 0;
        }
        let ratio = self.final_temperature / self.initial_temperature;
        let steps = ratio.ln() / self.cooling_rate.ln();
        steps.floor() as usize + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(SaConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_chains() {
        let err = SaConfig::default().with_chains(0).validate().unwrap_err();
        assert_eq!(err.0, "sa_chains");
    }

    #[test]
    fn test_bad_cooling_rate() {
        assert_eq!(
            SaConfig::default().with_cooling_rate(1.0).validate().unwrap_err().0,
            "sa_cooling_rate"
        );
        assert_eq!(
            SaConfig::default().with_cooling_rate(-0.5).validate().unwrap_err().0,
            "sa_cooling_rate"
        );
    }

    #[test]
    fn test_final_above_initial() {
        let config = SaConfig::default()
            .with_initial_temperature(1.0)
            .with_final_temperature(2.0);
        assert_eq!(config.validate().unwrap_err().0, "sa_final_temp");
    }

    #[test]
    fn test_cooling_steps() {
        let config = SaConfig::default()
            .with_initial_temperature(1.0)
            .with_final_temperature(0.3)
            .with_cooling_rate(0.5);
        // 1.0 -> 0.5 -> 0.25
        assert_eq!(config.cooling_steps(), 2);
    }
}
