use super::layout::WorkspaceLayout;
use crate::error::{Result, TaebsmError};
use crate::extraction::ViewPaths;
use crate::types::FslOutputType;
use std::fmt;
use std::path::{Path, PathBuf};

/// A step of the per-scan pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
#[cfg_attr(feature = "json", serde(rename_all = "kebab-case"))]
pub enum PipelineStep {
    Resample,
    BrainExtraction,
    Registration,
    ViewExtraction,
    Cleanup,
}

impl PipelineStep {
    /// Returns simple name for display
    pub fn simple_name(&self) -> &'static str {
        match self {
            PipelineStep::Resample => "resampling",
            PipelineStep::BrainExtraction => "brain extraction",
            PipelineStep::Registration => "registration",
            PipelineStep::ViewExtraction => "view extraction",
            PipelineStep::Cleanup => "cleanup",
        }
    }
}

impl fmt::Display for PipelineStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.simple_name())
    }
}

/// Lifecycle of one scan through the pipeline
///
/// Transitions are strictly sequential:
/// `Pending → Resampled → BrainExtracted → Registered → ViewsExtracted → Finalized`.
/// `Quarantined` is reachable from every non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
#[cfg_attr(feature = "json", serde(rename_all = "kebab-case"))]
pub enum ScanState {
    Pending,
    Resampled,
    BrainExtracted,
    Registered,
    ViewsExtracted,
    Finalized,
    Quarantined,
}

impl ScanState {
    /// The state reached when the pending step succeeds
    pub fn next(&self) -> Option<ScanState> {
        match self {
            ScanState::Pending => Some(ScanState::Resampled),
            ScanState::Resampled => Some(ScanState::BrainExtracted),
            ScanState::BrainExtracted => Some(ScanState::Registered),
            ScanState::Registered => Some(ScanState::ViewsExtracted),
            ScanState::ViewsExtracted => Some(ScanState::Finalized),
            ScanState::Finalized | ScanState::Quarantined => None,
        }
    }

    /// The step that runs from this state
    pub fn pending_step(&self) -> Option<PipelineStep> {
        match self {
            ScanState::Pending => Some(PipelineStep::Resample),
            ScanState::Resampled => Some(PipelineStep::BrainExtraction),
            ScanState::BrainExtracted => Some(PipelineStep::Registration),
            ScanState::Registered => Some(PipelineStep::ViewExtraction),
            ScanState::ViewsExtracted => Some(PipelineStep::Cleanup),
            ScanState::Finalized | ScanState::Quarantined => None,
        }
    }

    /// Whether no further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, ScanState::Finalized | ScanState::Quarantined)
    }

    /// Returns simple name for display
    pub fn simple_name(&self) -> &'static str {
        match self {
            ScanState::Pending => "pending",
            ScanState::Resampled => "resampled",
            ScanState::BrainExtracted => "brain-extracted",
            ScanState::Registered => "registered",
            ScanState::ViewsExtracted => "views-extracted",
            ScanState::Finalized => "finalized",
            ScanState::Quarantined => "quarantined",
        }
    }
}

impl fmt::Display for ScanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.simple_name())
    }
}

/// Derives the scan identity from a file name: everything before the first `.`
///
/// # Errors
///
/// Returns `InvalidInput` for names that are not UTF-8 or have an empty stem
pub fn scan_stem(path: &Path) -> Result<String> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| TaebsmError::InvalidInput(format!("{}: unusable file name", path.display())))?;

    match name.split('.').next() {
        Some(stem) if !stem.is_empty() => Ok(stem.to_string()),
        _ => Err(TaebsmError::InvalidInput(format!(
            "{}: file name has no stem",
            path.display()
        ))),
    }
}

/// One input scan and the artifacts derived from it
#[derive(Debug, Clone)]
pub struct ScanRecord {
    /// Scan identity, shared by every artifact name
    pub stem: String,

    /// Original input volume
    pub input: PathBuf,

    /// Resampled volume, removed once brain extraction ran
    pub resampled_volume: PathBuf,

    /// Skull-stripped, registered volume
    pub output_volume: PathBuf,

    /// Brain mask written next to the output volume, removed on finalize
    pub mask: PathBuf,

    /// Registration transform
    pub matrix: PathBuf,

    /// Directory holding the view images
    pub views_dir: PathBuf,

    /// View images, once written
    pub views: Option<ViewPaths>,

    state: ScanState,
}

impl ScanRecord {
    /// Creates a pending record with artifact paths laid out under `layout`
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if no stem can be derived from the file name
    pub fn new(input: PathBuf, layout: &WorkspaceLayout, output_type: FslOutputType) -> Result<Self> {
        let stem = scan_stem(&input)?;
        let ext = output_type.extension();

        Ok(Self {
            resampled_volume: layout.resampled.join(format!("{}_resampled{}", stem, ext)),
            output_volume: layout.output.join(format!("{}_final{}", stem, ext)),
            mask: layout.output.join(format!("{}_final_mask{}", stem, ext)),
            matrix: layout.matrices.join(format!("{}_final.mat", stem)),
            views_dir: layout.views.join(&stem),
            views: None,
            input,
            stem,
            state: ScanState::Pending,
        })
    }

    /// Current lifecycle state
    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Moves the record to `to`
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless `to` directly follows the current
    /// state, or is `Quarantined` from a non-terminal state
    pub fn advance(&mut self, to: ScanState) -> Result<()> {
        let allowed = if to == ScanState::Quarantined {
            !self.state.is_terminal()
        } else {
            self.state.next() == Some(to)
        };

        if !allowed {
            return Err(TaebsmError::InvalidTransition {
                from: self.state,
                to,
            });
        }
        self.state = to;
        Ok(())
    }
}
