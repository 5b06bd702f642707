//! Error taxonomy.
//!
//! Only configuration and site errors ever reach the caller. Infeasible
//! layouts are scored, not rejected, and [`EvaluationError`]s are recovered
//! per solution inside [`ParallelEvaluator`](crate::evaluation::ParallelEvaluator).

/// A configuration field failed validation.
///
/// Raised by [`LayoutConfig::validate`](crate::optimizer::LayoutConfig::validate)
/// before any evaluation work starts.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid `{field}`: {reason}")]
    Invalid {
        /// Name of the offending configuration field.
        field: &'static str,
        /// Human-readable explanation.
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }

    /// Name of the field that failed validation.
    pub fn field(&self) -> &'static str {
        match self {
            ConfigError::Invalid { field, .. } => field,
        }
    }
}

/// The site boundary or building definitions cannot be used.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SiteError {
    #[error("boundary has {0} distinct vertices, at least 3 are required")]
    TooFewVertices(usize),
    #[error("boundary contains non-finite coordinates")]
    NonFinite,
    #[error("boundary encloses no area")]
    ZeroArea,
    #[error("building `{name}`: {reason}")]
    InvalidBuilding { name: String, reason: String },
}

/// A single candidate could not be evaluated.
///
/// Never propagated out of the evaluator: the candidate receives the
/// worst-case sentinel score instead.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvaluationError {
    #[error("external function `{name}` failed: {message}")]
    External { name: String, message: String },
    #[error("`{name}` produced a non-finite value ({value})")]
    NonFinite { name: String, value: f64 },
    #[error("evaluation panicked: {0}")]
    Panicked(String),
}

impl EvaluationError {
    /// Convenience constructor for collaborators reporting a failure.
    pub fn external(name: impl Into<String>, message: impl Into<String>) -> Self {
        EvaluationError::External {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Fatal errors returned by [`run`](crate::optimizer::run).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Site(#[from] SiteError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_names_field() {
        let err = ConfigError::invalid("sa_chains", "must be at least 1");
        assert_eq!(err.field(), "sa_chains");
        assert_eq!(err.to_string(), "invalid `sa_chains`: must be at least 1");
    }

    #[test]
    fn test_layout_error_is_transparent() {
        let err: LayoutError = SiteError::ZeroArea.into();
        assert_eq!(err.to_string(), "boundary encloses no area");
    }
}
