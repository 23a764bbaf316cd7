//! External imaging tools consumed by the pipeline
//!
//! Skull-stripping and registration are delegated to tools that read and
//! write volumes on disk. The pipeline only depends on the traits below;
//! [`FslBet`] and [`FslFlirt`] drive the FSL command-line programs.

mod fsl;

pub use fsl::{FslBet, FslFlirt, FslOptions};

use crate::error::Result;
use crate::types::{BetMode, Dof};
use std::path::Path;

/// Brain extraction (skull-stripping) collaborator
///
/// Writes `output` and a sibling mask file. Implementations may report
/// success while leaving extra or missing files behind, so callers validate
/// the artifacts afterwards.
pub trait BrainExtractor {
    fn extract(&self, input: &Path, output: &Path, frac: f64, mode: BetMode) -> Result<()>;
}

/// Linear registration collaborator
///
/// Aligns `input` to `reference`, writing the registered volume to `output`
/// (which may be `input` itself) and the transform to `matrix`.
pub trait Registrator {
    fn register(
        &self,
        input: &Path,
        output: &Path,
        matrix: &Path,
        reference: &Path,
        dof: Dof,
    ) -> Result<()>;
}
