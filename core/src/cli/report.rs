use crate::pipeline::ProcessingReport;
use std::fmt;

/// Text report formatter for a batch run
pub struct TextReport<'a> {
    report: &'a ProcessingReport,
}

impl<'a> TextReport<'a> {
    /// Creates a new text report
    pub fn new(report: &'a ProcessingReport) -> Self {
        Self { report }
    }
}

impl<'a> fmt::Display for TextReport<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Brain Slice Extraction")?;
        writeln!(f, "======================")?;
        writeln!(f)?;
        writeln!(f, "Processed:    {}", self.report.processed)?;
        writeln!(f, "Finalized:    {}", self.report.finalized_count())?;
        writeln!(f, "Quarantined:  {}", self.report.quarantined_count())?;
        writeln!(
            f,
            "Elapsed:      {:.1}s",
            self.report.elapsed.as_secs_f64()
        )?;

        if !self.report.finalized.is_empty() {
            writeln!(f)?;
            writeln!(f, "Finalized Scans")?;
            writeln!(f, "---------------")?;
            for stem in &self.report.finalized {
                writeln!(f, "  {}", stem)?;
            }
        }

        if !self.report.quarantined.is_empty() {
            writeln!(f)?;
            writeln!(f, "Quarantined Scans")?;
            writeln!(f, "-----------------")?;
            for scan in &self.report.quarantined {
                writeln!(f, "  {} (last state: {})", scan.stem, scan.failed_at)?;
                writeln!(f, "    {}", scan.error)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{QuarantinedScan, ScanState};
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn test_text_report_format() {
        let report = ProcessingReport {
            processed: 2,
            finalized: vec!["sub01".to_string()],
            quarantined: vec![QuarantinedScan {
                stem: "sub02".to_string(),
                input: PathBuf::from("input_files/sub02.nii.gz"),
                failed_at: ScanState::Resampled,
                error: "brain extraction failed: 3 artifacts".to_string(),
            }],
            elapsed: Duration::from_millis(2500),
        };

        let output = format!("{}", TextReport::new(&report));

        assert!(output.contains("Brain Slice Extraction"));
        assert!(output.contains("Processed:    2"));
        assert!(output.contains("Finalized:    1"));
        assert!(output.contains("Quarantined:  1"));
        assert!(output.contains("Elapsed:      2.5s"));
        assert!(output.contains("  sub01\n"));
        assert!(output.contains("  sub02 (last state: resampled)"));
        assert!(output.contains("    brain extraction failed: 3 artifacts"));
    }

    #[test]
    fn test_empty_report_has_no_sections() {
        let output = format!("{}", TextReport::new(&ProcessingReport::default()));
        assert!(output.contains("Processed:    0"));
        assert!(!output.contains("Finalized Scans"));
        assert!(!output.contains("Quarantined Scans"));
    }
}
