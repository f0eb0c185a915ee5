use std::time::Duration;
use thiserror::Error;

/// Problems with the dataset or configuration. Always reported before any
/// model reaches the solving engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("dimension `{0}` must be positive")]
    EmptyDimension(&'static str),

    #[error("`{field}` has {actual} entries, expected {expected}")]
    ShapeMismatch {
        field: String,
        expected: usize,
        actual: usize,
    },

    #[error("{field} index {index} is out of range (must be below {limit})")]
    IndexOutOfRange {
        field: String,
        index: usize,
        limit: usize,
    },

    #[error("priority multiplier for professor {professor} must be positive and finite, got {value}")]
    InvalidPriority { professor: usize, value: f64 },

    #[error("weight `{name}` must be finite, got {value}")]
    InvalidWeight { name: &'static str, value: f64 },

    #[error("timetable grid exceeds the limit of {limit} decision variables")]
    TooLarge { limit: usize },

    #[error("time limit must be positive and finite, got {0} seconds")]
    InvalidTimeLimit(f64),
}

/// Failure reported by a solving backend for reasons other than infeasibility.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("solving engine failed: {0}")]
pub struct EngineError(pub String);

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimetableError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("no feasible timetable exists for this dataset")]
    Infeasible,

    #[error("no solution found within {0:?}")]
    Timeout(Duration),

    #[error("timetable has not been solved")]
    NotSolved,

    #[error("timetable was already handed to the solving engine; build a new one to solve again")]
    AlreadySolved,

    #[error(transparent)]
    Engine(#[from] EngineError),
}
