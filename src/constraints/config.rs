//! Constraint thresholds and category weights.

/// Penalty charged per footprint whose geometry cannot be evaluated.
pub const MALFORMED_PENALTY: f64 = 1.0e6;

/// Weight applied to each violation category when forming the total.
///
/// Magnitudes have different units (metres for boundary exit, setback and
/// separation shortfalls; square metres for overlap), so the weights also
/// act as unit conversions. They are fixed for a run.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConstraintWeights {
    pub boundary: f64,
    pub overlap: f64,
    pub setback: f64,
    pub fire_separation: f64,
    pub compliance: f64,
    pub malformed: f64,
}

impl Default for ConstraintWeights {
    fn default() -> Self {
        Self {
            boundary: 10.0,
            overlap: 1.0,
            setback: 1.0,
            fire_separation: 1.0,
            compliance: 1.0,
            malformed: 1.0,
        }
    }
}

/// Thresholds used by the [`ConstraintEvaluator`](super::ConstraintEvaluator).
///
/// ```
/// use u_siteplan::constraints::ConstraintSettings;
///
/// let settings = ConstraintSettings::default()
///     .with_min_setback(5.0)
///     .with_min_fire_separation(8.0);
/// assert!(settings.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConstraintSettings {
    /// Minimum clearance between a footprint and the site boundary.
    pub min_setback: f64,
    /// Minimum clearance between a footprint and any road centre line.
    pub road_setback: f64,
    /// Minimum clearance between any two footprints.
    pub min_fire_separation: f64,
    /// Extra separation per metre of the taller building's height.
    ///
    /// The required gap is `max(min_fire_separation, factor × height)`.
    pub fire_height_factor: f64,
    pub weights: ConstraintWeights,
}

impl Default for ConstraintSettings {
    fn default() -> Self {
        Self {
            min_setback: 3.0,
            road_setback: 5.0,
            min_fire_separation: 6.0,
            fire_height_factor: 0.0,
            weights: ConstraintWeights::default(),
        }
    }
}

impl ConstraintSettings {
    /// Settings with every clearance requirement disabled.
    ///
    /// Only boundary, overlap, compliance and malformed geometry remain.
    pub fn relaxed() -> Self {
        Self {
            min_setback: 0.0,
            road_setback: 0.0,
            min_fire_separation: 0.0,
            fire_height_factor: 0.0,
            weights: ConstraintWeights::default(),
        }
    }

    pub fn with_min_setback(mut self, metres: f64) -> Self {
        self.min_setback = metres;
        self
    }

    pub fn with_road_setback(mut self, metres: f64) -> Self {
        self.road_setback = metres;
        self
    }

    pub fn with_min_fire_separation(mut self, metres: f64) -> Self {
        self.min_fire_separation = metres;
        self
    }

    pub fn with_fire_height_factor(mut self, factor: f64) -> Self {
        self.fire_height_factor = factor;
        self
    }

    pub fn with_weights(mut self, weights: ConstraintWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Returns the name of the first invalid field and the reason.
    pub fn validate(&self) -> Result<(), (&'static str, String)> {
        let non_negative = [
            ("min_setback", self.min_setback),
            ("road_setback", self.road_setback),
            ("min_fire_separation", self.min_fire_separation),
            ("fire_height_factor", self.fire_height_factor),
            ("weights.boundary", self.weights.boundary),
            ("weights.overlap", self.weights.overlap),
            ("weights.setback", self.weights.setback),
            ("weights.fire_separation", self.weights.fire_separation),
            ("weights.compliance", self.weights.compliance),
            ("weights.malformed", self.weights.malformed),
        ];
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err((field, format!("must be finite and non-negative, got {value}")));
            }
        }
        Ok(())
    }
}
