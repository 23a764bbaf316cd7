use crate::pipeline::{PipelineStep, ScanState};
use thiserror::Error;

/// Result type for taebsm operations
pub type Result<T> = std::result::Result<T, TaebsmError>;

/// Error types for taebsm operations
#[derive(Error, Debug)]
pub enum TaebsmError {
    /// A pipeline step failed, either by raising or by failing artifact validation
    #[error("{step} failed: {message}")]
    StepFailure { step: PipelineStep, message: String },

    /// The background cropper found no contour in the slice image
    #[error("No content found in {0}")]
    NoContentFound(String),

    /// NIfTI reading or writing error
    #[error("NIfTI error: {0}")]
    Nifti(String),

    /// Image encoding or decoding error
    #[error("Image error: {0}")]
    Image(String),

    /// Configuration value out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Scan record moved out of order through the pipeline
    #[error("Invalid state transition: {from} -> {to}")]
    InvalidTransition { from: ScanState, to: ScanState },

    /// Input that cannot be processed at all (bad file name, wrong dimensionality)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TaebsmError {
    /// Builds a step failure from any displayable message
    pub fn step(step: PipelineStep, message: impl Into<String>) -> Self {
        TaebsmError::StepFailure {
            step,
            message: message.into(),
        }
    }
}

// Helper conversions
impl From<String> for TaebsmError {
    fn from(s: String) -> Self {
        TaebsmError::InvalidInput(s)
    }
}

impl From<&str> for TaebsmError {
    fn from(s: &str) -> Self {
        TaebsmError::InvalidInput(s.to_string())
    }
}

impl From<nifti::NiftiError> for TaebsmError {
    fn from(e: nifti::NiftiError) -> Self {
        TaebsmError::Nifti(format!("{}", e))
    }
}

impl From<image::ImageError> for TaebsmError {
    fn from(e: image::ImageError) -> Self {
        TaebsmError::Image(format!("{}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_failure_message() {
        let err = TaebsmError::step(PipelineStep::BrainExtraction, "3 artifacts for sub01");
        assert_eq!(
            err.to_string(),
            "brain extraction failed: 3 artifacts for sub01"
        );
    }

    #[test]
    fn test_invalid_transition_message() {
        let err = TaebsmError::InvalidTransition {
            from: ScanState::Pending,
            to: ScanState::Registered,
        };
        assert_eq!(
            err.to_string(),
            "Invalid state transition: pending -> registered"
        );
    }
}
