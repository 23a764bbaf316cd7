//! Batch extraction of anatomical brain slices from MRI volumes
//!
//! Each NIfTI volume in `input_files/` is resampled to isotropic spacing,
//! skull-stripped, registered to an MNI152 atlas, and cut into axial,
//! coronal and sagittal mid-volume views that are cropped to the head and
//! resized. Scans that fail any step are moved to `exceptions/`.

pub mod cli;
pub mod error;
pub mod external;
pub mod extraction;
pub mod pipeline;
pub mod types;
pub mod volume;

pub use cli::report::TextReport;
pub use error::{Result, TaebsmError};
pub use external::{BrainExtractor, FslBet, FslFlirt, FslOptions, Registrator};
pub use extraction::{CropBox, ViewPaths};
pub use pipeline::{
    process_batch, BatchPipeline, PipelineStep, ProcessingReport, QuarantinedScan, ScanRecord,
    ScanState, WorkspaceLayout,
};
pub use types::*;
pub use volume::{LinearResampler, Resampler, Volume};
