//! Batch pipeline controller
//!
//! Drives every input volume through resample → brain extraction →
//! registration → view extraction → cleanup, one file at a time. A scan
//! that fails any step is rolled back: its artifacts are deleted and the
//! original input is moved to `exceptions/`. The batch then continues.

pub mod artifacts;
pub mod layout;
pub mod record;
pub mod report;

pub use artifacts::ArtifactMatcher;
pub use layout::WorkspaceLayout;
pub use record::{scan_stem, PipelineStep, ScanRecord, ScanState};
pub use report::{ProcessingReport, QuarantinedScan};

use crate::error::{Result, TaebsmError};
use crate::external::{BrainExtractor, FslBet, FslFlirt, FslOptions, Registrator};
use crate::extraction::{crop_file, extract_views};
use crate::types::PipelineConfig;
use crate::volume::{read_volume, write_volume, LinearResampler, Resampler};
use log::{debug, info, warn};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Sequential batch processor over a [`WorkspaceLayout`]
pub struct BatchPipeline {
    layout: WorkspaceLayout,
    config: PipelineConfig,
    resampler: Box<dyn Resampler>,
    brain_extractor: Box<dyn BrainExtractor>,
    registrator: Box<dyn Registrator>,
}

impl BatchPipeline {
    /// Creates a pipeline using the trilinear resampler and the FSL tools on `PATH`
    pub fn new(layout: WorkspaceLayout, config: PipelineConfig) -> Self {
        let fsl = FslOptions::new(config.output_type);
        Self {
            layout,
            resampler: Box::new(LinearResampler::new()),
            brain_extractor: Box::new(FslBet::new(fsl.clone())),
            registrator: Box::new(FslFlirt::new(fsl)),
            config,
        }
    }

    /// Builder: Use FSL tools configured by `options` for extraction and registration
    pub fn with_fsl(self, options: FslOptions) -> Self {
        self.with_brain_extractor(FslBet::new(options.clone()))
            .with_registrator(FslFlirt::new(options))
    }

    /// Builder: Replace the resampler
    pub fn with_resampler(mut self, resampler: impl Resampler + 'static) -> Self {
        self.resampler = Box::new(resampler);
        self
    }

    /// Builder: Replace the brain extractor
    pub fn with_brain_extractor(mut self, extractor: impl BrainExtractor + 'static) -> Self {
        self.brain_extractor = Box::new(extractor);
        self
    }

    /// Builder: Replace the registrator
    pub fn with_registrator(mut self, registrator: impl Registrator + 'static) -> Self {
        self.registrator = Box::new(registrator);
        self
    }

    pub fn layout(&self) -> &WorkspaceLayout {
        &self.layout
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Processes every input file in name order
    ///
    /// # Errors
    ///
    /// Fails only when the configuration is invalid or the layout cannot be
    /// created or listed. Per-scan failures are reported in
    /// [`ProcessingReport::quarantined`].
    pub fn process_batch(&self) -> Result<ProcessingReport> {
        self.config.validate()?;
        self.layout.bootstrap()?;

        let start = Instant::now();
        let inputs = self.layout.input_files()?;
        info!(
            "Processing {} input file(s) from {}",
            inputs.len(),
            self.layout.input.display()
        );

        let known_stems = self.known_stems(&inputs)?;
        let mut report = ProcessingReport::default();
        let mut seen = HashSet::new();

        for (index, input) in inputs.iter().enumerate() {
            info!("[{}/{}] {}", index + 1, inputs.len(), input.display());
            report.processed += 1;

            let outcome = match ScanRecord::new(input.clone(), &self.layout, self.config.output_type) {
                Ok(record) if !seen.insert(record.stem.clone()) => {
                    let error = TaebsmError::InvalidInput(format!(
                        "stem {} already processed in this batch",
                        record.stem
                    ));
                    Err(self.quarantine_input(input, &record.stem, ScanState::Pending, &error))
                }
                Ok(record) => self.process_record(record, &known_stems),
                Err(error) => {
                    let name = input
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    Err(self.quarantine_input(input, &name, ScanState::Pending, &error))
                }
            };

            match outcome {
                Ok(record) => report.finalized.push(record.stem),
                Err(quarantined) => report.quarantined.push(quarantined),
            }
        }

        report.elapsed = start.elapsed();
        info!(
            "Finished: {} finalized, {} quarantined in {:.1}s",
            report.finalized_count(),
            report.quarantined_count(),
            report.elapsed.as_secs_f64()
        );
        Ok(report)
    }

    /// Stems of the inputs plus those of scans finalized by earlier runs
    fn known_stems(&self, inputs: &[PathBuf]) -> Result<Vec<String>> {
        let mut stems: Vec<String> = inputs.iter().filter_map(|p| scan_stem(p).ok()).collect();
        stems.extend(self.layout.view_stems()?);
        stems.sort();
        stems.dedup();
        Ok(stems)
    }

    /// Runs one scan to completion, rolling it back on the first failure
    ///
    /// Artifacts of `known_stems` that extend the record's stem are neither
    /// counted nor removed.
    pub fn process_record(
        &self,
        mut record: ScanRecord,
        known_stems: &[String],
    ) -> std::result::Result<ScanRecord, QuarantinedScan> {
        match self.run_steps(&mut record, known_stems) {
            Ok(()) => {
                info!("[{}] finalized", record.stem);
                Ok(record)
            }
            Err(error) => {
                let failed_at = record.state();
                if let Some(step) = failed_at.pending_step() {
                    warn!("[{}] stopped during {}: {}", record.stem, step, error);
                }
                self.roll_back(&mut record, known_stems);
                Err(self.quarantine_input(&record.input, &record.stem, failed_at, &error))
            }
        }
    }

    fn run_steps(&self, record: &mut ScanRecord, known_stems: &[String]) -> Result<()> {
        self.resample(record)?;
        record.advance(ScanState::Resampled)?;

        self.extract_brain(record, known_stems)?;
        record.advance(ScanState::BrainExtracted)?;

        self.register(record)?;
        record.advance(ScanState::Registered)?;

        self.extract_views(record)?;
        record.advance(ScanState::ViewsExtracted)?;

        self.finalize(record)?;
        record.advance(ScanState::Finalized)
    }

    fn resample(&self, record: &ScanRecord) -> Result<()> {
        let volume = read_volume(&record.input)?;
        let target = self.config.target_spacing();
        let resampled = self.resampler.resample(&volume, &target)?;

        debug!(
            "[{}] {:?} @ {} -> {:?} @ {}",
            record.stem,
            volume.grid_size(),
            volume.spacing(),
            resampled.grid_size(),
            resampled.spacing()
        );
        write_volume(&resampled, &record.resampled_volume)?;
        info!("[{}] resampled to {}", record.stem, target);
        Ok(())
    }

    fn extract_brain(&self, record: &ScanRecord, known_stems: &[String]) -> Result<()> {
        self.brain_extractor.extract(
            &record.resampled_volume,
            &record.output_volume,
            self.config.frac,
            self.config.bet_mode,
        )?;
        artifacts::remove_if_exists(&record.resampled_volume)?;

        let found = ArtifactMatcher::new(&record.stem)?
            .excluding(known_stems)?
            .find_in(&self.layout.output)?;
        if found.len() > self.config.max_extraction_artifacts {
            return Err(TaebsmError::step(
                PipelineStep::BrainExtraction,
                format!(
                    "{} artifacts for {} in {} (at most {} expected)",
                    found.len(),
                    record.stem,
                    self.layout.output.display(),
                    self.config.max_extraction_artifacts
                ),
            ));
        }
        if !record.output_volume.is_file() {
            return Err(TaebsmError::step(
                PipelineStep::BrainExtraction,
                format!("{} was not written", record.output_volume.display()),
            ));
        }

        info!(
            "[{}] brain extracted (frac {}, {})",
            record.stem, self.config.frac, self.config.bet_mode
        );
        Ok(())
    }

    fn register(&self, record: &ScanRecord) -> Result<()> {
        self.registrator.register(
            &record.output_volume,
            &record.output_volume,
            &record.matrix,
            &self.config.atlas_reference(),
            self.config.dof,
        )?;

        for path in [&record.output_volume, &record.matrix] {
            if !path.is_file() {
                return Err(TaebsmError::step(
                    PipelineStep::Registration,
                    format!("{} was not written", path.display()),
                ));
            }
        }

        info!(
            "[{}] registered to {} (dof {})",
            record.stem, self.config.atlas, self.config.dof
        );
        Ok(())
    }

    fn extract_views(&self, record: &mut ScanRecord) -> Result<()> {
        let volume = read_volume(&record.output_volume)?;
        let paths = extract_views(
            &volume,
            &record.stem,
            &self.layout.views,
            self.config.image_size,
        )?;
        // Recorded before cropping so a cropping failure still rolls the images back
        record.views = Some(paths.clone());

        for path in paths.iter() {
            crop_file(path, self.config.image_size)?;
        }

        info!(
            "[{}] views written to {}",
            record.stem,
            record.views_dir.display()
        );
        Ok(())
    }

    fn finalize(&self, record: &ScanRecord) -> Result<()> {
        artifacts::remove_if_exists(&record.mask)?;
        artifacts::remove_if_exists(&record.resampled_volume)?;
        Ok(())
    }

    /// Deletes every artifact of the scan; problems are logged, never raised
    fn roll_back(&self, record: &mut ScanRecord, known_stems: &[String]) {
        match ArtifactMatcher::new(&record.stem).and_then(|m| m.excluding(known_stems)) {
            Ok(matcher) => {
                for dir in [
                    &self.layout.output,
                    &self.layout.matrices,
                    &self.layout.resampled,
                ] {
                    match matcher.remove_from(dir) {
                        Ok(0) => {}
                        Ok(n) => debug!("[{}] removed {} file(s) from {}", record.stem, n, dir.display()),
                        Err(e) => warn!("[{}] cleanup of {} failed: {}", record.stem, dir.display(), e),
                    }
                }
            }
            Err(e) => warn!("[{}] cannot match artifacts: {}", record.stem, e),
        }

        match fs::remove_dir_all(&record.views_dir) {
            Ok(()) => debug!("[{}] removed {}", record.stem, record.views_dir.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                "[{}] cleanup of {} failed: {}",
                record.stem,
                record.views_dir.display(),
                e
            ),
        }
        record.views = None;

        if let Err(e) = record.advance(ScanState::Quarantined) {
            warn!("[{}] {}", record.stem, e);
        }
    }

    /// Moves an input into `exceptions/` and describes the quarantine
    fn quarantine_input(
        &self,
        input: &Path,
        stem: &str,
        failed_at: ScanState,
        error: &TaebsmError,
    ) -> QuarantinedScan {
        match input.file_name() {
            Some(name) => {
                let target =
                    artifacts::unused_destination(&self.layout.exceptions, &name.to_string_lossy());
                match artifacts::move_file(input, &target) {
                    Ok(()) => warn!("[{}] quarantined to {}", stem, target.display()),
                    Err(e) => warn!("[{}] could not move {} to quarantine: {}", stem, input.display(), e),
                }
            }
            None => warn!("[{}] {} has no file name to quarantine", stem, input.display()),
        }

        QuarantinedScan {
            stem: stem.to_string(),
            input: input.to_path_buf(),
            failed_at,
            error: error.to_string(),
        }
    }
}

/// Bootstraps the layout under `root` and processes it with the FSL tools on `PATH`
pub fn process_batch(root: &Path, config: &PipelineConfig) -> Result<ProcessingReport> {
    BatchPipeline::new(WorkspaceLayout::new(root), config.clone()).process_batch()
}
