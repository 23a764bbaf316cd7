use super::record::ScanState;
use std::path::PathBuf;
use std::time::Duration;

/// A scan moved to quarantine
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct QuarantinedScan {
    pub stem: String,

    /// Original location of the input
    pub input: PathBuf,

    /// Last state reached before the failure
    pub failed_at: ScanState,

    pub error: String,
}

/// Outcome of a batch run
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct ProcessingReport {
    /// Number of input files attempted
    pub processed: usize,

    /// Stems of the scans that completed every step
    pub finalized: Vec<String>,

    pub quarantined: Vec<QuarantinedScan>,

    /// Wall-clock time of the run
    pub elapsed: Duration,
}

impl ProcessingReport {
    pub fn finalized_count(&self) -> usize {
        self.finalized.len()
    }

    pub fn quarantined_count(&self) -> usize {
        self.quarantined.len()
    }

    /// Whether every processed scan was finalized
    pub fn is_clean(&self) -> bool {
        self.quarantined.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts() {
        let report = ProcessingReport {
            processed: 3,
            finalized: vec!["sub01".to_string(), "sub03".to_string()],
            quarantined: vec![QuarantinedScan {
                stem: "sub02".to_string(),
                input: PathBuf::from("input_files/sub02.nii.gz"),
                failed_at: ScanState::Resampled,
                error: "brain extraction failed".to_string(),
            }],
            elapsed: Duration::from_secs(4),
        };

        assert_eq!(report.finalized_count(), 2);
        assert_eq!(report.quarantined_count(), 1);
        assert!(!report.is_clean());
        assert!(ProcessingReport::default().is_clean());
    }
}
