//! Type-pair adjacency preferences.

/// Desired relation between two building kinds.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Preference {
    /// Footprints should be at most `max_distance` apart.
    Near { max_distance: f64 },
    /// Footprints should be at least `min_distance` apart.
    Far { min_distance: f64 },
}

/// Preference between two building kinds (unordered).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AdjacencyRule {
    pub kind_a: String,
    pub kind_b: String,
    pub preference: Preference,
    pub weight: f64,
}

impl AdjacencyRule {
    pub fn new(
        kind_a: impl Into<String>,
        kind_b: impl Into<String>,
        preference: Preference,
    ) -> Self {
        Self {
            kind_a: kind_a.into(),
            kind_b: kind_b.into(),
            preference,
            weight: 1.0,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Whether the rule covers a pair of kinds, in either order.
    pub fn applies(&self, a: &str, b: &str) -> bool {
        (self.kind_a == a && self.kind_b == b) || (self.kind_a == b && self.kind_b == a)
    }

    /// Distance by which `gap` misses the preference (0 when satisfied).
    pub fn violation(&self, gap: f64) -> f64 {
        match self.preference {
            Preference::Near { max_distance } => (gap - max_distance).max(0.0),
            Preference::Far { min_distance } => (min_distance - gap).max(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_is_symmetric() {
        let rule = AdjacencyRule::new("housing", "park", Preference::Near { max_distance: 30.0 });
        assert!(rule.applies("housing", "park"));
        assert!(rule.applies("park", "housing"));
        assert!(!rule.applies("park", "park"));
    }

    #[test]
    fn test_violation() {
        let near = AdjacencyRule::new("a", "b", Preference::Near { max_distance: 10.0 });
        assert_eq!(near.violation(4.0), 0.0);
        assert_eq!(near.violation(15.0), 5.0);

        let far =
            AdjacencyRule::new("a", "b", Preference::Far { min_distance: 10.0 }).with_weight(2.0);
        assert_eq!(far.violation(4.0), 6.0);
        assert_eq!(far.violation(12.0), 0.0);
        assert_eq!(far.weight, 2.0);
    }
}
