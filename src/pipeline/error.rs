//! Pipeline-specific error types.

use thiserror::Error;

/// Error type returned by processors and sinks.
///
/// The chain wraps it into [`PipelineError::Processing`] or
/// [`PipelineError::Flush`] together with the failing processor's position.
pub type NodeError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur within the pipeline system.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Chain resolution error: {0}")]
    ChainResolution(String),

    #[error("Processor '{processor}' at position {position} failed: {source}")]
    Processing {
        processor: String,
        position: usize,
        #[source]
        source: NodeError,
    },

    #[error("Processor '{processor}' at position {position} failed to flush: {source}")]
    Flush {
        processor: String,
        position: usize,
        #[source]
        source: NodeError,
    },

    #[error("Script error: {0}")]
    Script(String),

    #[error("Input error: {0}")]
    Input(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PipelineError {
    /// True for errors raised before any event flows.
    pub fn is_resolution(&self) -> bool {
        matches!(
            self,
            PipelineError::Configuration(_) | PipelineError::ChainResolution(_)
        )
    }
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_processing_error_display_and_source() {
        let err = PipelineError::Processing {
            processor: "Aggregate".to_string(),
            position: 2,
            source: "late event".into(),
        };
        assert_eq!(
            err.to_string(),
            "Processor 'Aggregate' at position 2 failed: late event"
        );
        assert_eq!(err.source().map(|s| s.to_string()).as_deref(), Some("late event"));
        assert!(!err.is_resolution());
    }

    #[test]
    fn test_resolution_errors() {
        assert!(PipelineError::Configuration("x".into()).is_resolution());
        assert!(PipelineError::ChainResolution("x".into()).is_resolution());
    }
}
