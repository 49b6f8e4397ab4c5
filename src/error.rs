/*
This code is part of the HydroTools raster hydrology library.
Created: 19/10/2026
Last Modified: 19/10/2026
License: MIT
*/

//! Error types for HydroTools operations.

use thiserror::Error;

/// Main error type for raster hydrology operations.
///
/// Per-cell numeric edge cases (no-data inputs, zero slopes and the like) are
/// never reported through this type unless a strict `NumericGuard` policy was
/// requested; they are resolved locally by writing the no-data sentinel.
#[derive(Error, Debug)]
pub enum HydroError {
    /// A required parameter is missing or has an unusable value.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Index out of bounds: ({row}, {col}) in grid of size ({rows}, {cols})")]
    OutOfBounds {
        row: isize,
        col: isize,
        rows: usize,
        cols: usize,
    },

    /// Following flow directions from this cell never reaches an outlet.
    #[error("Flow direction cycle detected at cell ({row}, {col})")]
    FlowGraphCycle { row: usize, col: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Numeric guard tripped in {op} at cell ({row}, {col})")]
    NumericGuard {
        op: &'static str,
        row: usize,
        col: usize,
    },

    #[error("Grid size mismatch: expected ({er}, {ec}), got ({ar}, {ac})")]
    DimensionMismatch {
        er: usize,
        ec: usize,
        ar: usize,
        ac: usize,
    },

    #[error("Invalid grid data: {0}")]
    InvalidData(String),

    /// Wraps an error with the name of the stage that raised it.
    #[error("{stage}: {source}")]
    Stage {
        stage: String,
        #[source]
        source: Box<HydroError>,
    },
}

impl HydroError {
    /// Attaches the name of the failing stage (tool or operator) to an error.
    pub fn in_stage(self, stage: &str) -> HydroError {
        match self {
            HydroError::Stage { .. } => self,
            other => HydroError::Stage {
                stage: stage.to_string(),
                source: Box::new(other),
            },
        }
    }

    /// Returns the innermost error, skipping any stage wrappers.
    pub fn root_cause(&self) -> &HydroError {
        match self {
            HydroError::Stage { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Result type alias for HydroTools operations.
pub type Result<T> = std::result::Result<T, HydroError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_wrapping() {
        let err = HydroError::FlowGraphCycle { row: 2, col: 3 }.in_stage("SumDownstream");
        assert_eq!(
            err.to_string(),
            "SumDownstream: Flow direction cycle detected at cell (2, 3)"
        );
        match err.root_cause() {
            HydroError::FlowGraphCycle { row, col } => assert_eq!((*row, *col), (2, 3)),
            e => panic!("unexpected root cause {:?}", e),
        }
    }

    #[test]
    fn test_stage_not_nested_twice() {
        let err = HydroError::Configuration("missing threshold".to_string())
            .in_stage("Nabla")
            .in_stage("ToolManager");
        assert_eq!(err.to_string(), "Nabla: Configuration error: missing threshold");
    }
}
