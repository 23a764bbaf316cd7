use crate::error::{Result, TaebsmError};
use crate::types::{Atlas, BetMode, Dof, FslOutputType, VoxelSpacing};
use std::path::{Path, PathBuf};

/// Default isotropic voxel size in mm
pub const DEFAULT_VOXEL_SIZE: f64 = 2.0;

/// Default BET fractional intensity threshold
pub const DEFAULT_FRAC: f64 = 0.5;

/// Default side length of the extracted view images in pixels
pub const DEFAULT_IMAGE_SIZE: u32 = 224;

/// Default maximum number of files BET may leave behind for one scan
///
/// A successful run produces the brain volume and its mask.
pub const DEFAULT_MAX_EXTRACTION_ARTIFACTS: usize = 2;

/// Default directory holding the atlas templates
pub const DEFAULT_ATLAS_DIR: &str = "utils/atlas";

/// Configuration for one batch run
///
/// # Example
///
/// ```
/// use taebsm_core::{Atlas, Dof, PipelineConfig};
///
/// let config = PipelineConfig::default()
///     .with_voxel_size(1.5)
///     .with_dof(Dof::Six)
///     .with_atlas(Atlas::Mni152_1mm);
///
/// assert!(config.validate().is_ok());
/// assert_eq!(config.dof, Dof::Six);
/// assert!(config.atlas_reference().ends_with("MNI152_1mm_brain.nii.gz"));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct PipelineConfig {
    /// Isotropic voxel size for resampling, in mm
    pub voxel_size: f64,

    /// BET fractional intensity threshold, strictly between 0 and 1
    /// Smaller values preserve more brain mass.
    pub frac: f64,

    /// BET extraction mode
    pub bet_mode: BetMode,

    /// Registration degrees of freedom
    pub dof: Dof,

    /// Registration target
    pub atlas: Atlas,

    /// Directory holding the atlas templates
    pub atlas_dir: PathBuf,

    /// Side length of the square view images
    pub image_size: u32,

    /// Brain extraction is considered failed when more files than this
    /// exist for the scan in the output directory
    pub max_extraction_artifacts: usize,

    /// Volume format produced by the FSL tools
    pub output_type: FslOutputType,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            voxel_size: DEFAULT_VOXEL_SIZE,
            frac: DEFAULT_FRAC,
            bet_mode: BetMode::default(),
            dof: Dof::default(),
            atlas: Atlas::default(),
            atlas_dir: PathBuf::from(DEFAULT_ATLAS_DIR),
            image_size: DEFAULT_IMAGE_SIZE,
            max_extraction_artifacts: DEFAULT_MAX_EXTRACTION_ARTIFACTS,
            output_type: FslOutputType::default(),
        }
    }
}

impl PipelineConfig {
    /// Builder: Set the isotropic voxel size
    pub fn with_voxel_size(mut self, voxel_size: f64) -> Self {
        self.voxel_size = voxel_size;
        self
    }

    /// Builder: Set the BET fractional intensity threshold
    pub fn with_frac(mut self, frac: f64) -> Self {
        self.frac = frac;
        self
    }

    /// Builder: Set the BET mode
    pub fn with_bet_mode(mut self, mode: BetMode) -> Self {
        self.bet_mode = mode;
        self
    }

    /// Builder: Set the registration degrees of freedom
    pub fn with_dof(mut self, dof: Dof) -> Self {
        self.dof = dof;
        self
    }

    /// Builder: Set the registration atlas
    pub fn with_atlas(mut self, atlas: Atlas) -> Self {
        self.atlas = atlas;
        self
    }

    /// Builder: Set the atlas directory
    pub fn with_atlas_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.atlas_dir = dir.into();
        self
    }

    /// Builder: Set the output image size
    pub fn with_image_size(mut self, size: u32) -> Self {
        self.image_size = size;
        self
    }

    /// Builder: Set the brain extraction artifact threshold
    pub fn with_max_extraction_artifacts(mut self, max: usize) -> Self {
        self.max_extraction_artifacts = max;
        self
    }

    /// Builder: Set the FSL output type
    pub fn with_output_type(mut self, output_type: FslOutputType) -> Self {
        self.output_type = output_type;
        self
    }

    /// Target spacing for the resampling step
    pub fn target_spacing(&self) -> VoxelSpacing {
        VoxelSpacing::isotropic(self.voxel_size)
    }

    /// Reference volume for the registration step
    pub fn atlas_reference(&self) -> PathBuf {
        self.atlas.reference_path(Path::new(&self.atlas_dir))
    }

    /// Checks every value is in range
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` naming the first offending field
    pub fn validate(&self) -> Result<()> {
        if !(self.voxel_size.is_finite() && self.voxel_size > 0.0) {
            return Err(TaebsmError::InvalidConfig(format!(
                "voxel size must be positive, got {}",
                self.voxel_size
            )));
        }
        if !(self.frac > 0.0 && self.frac < 1.0) {
            return Err(TaebsmError::InvalidConfig(format!(
                "frac must be between 0 and 1, got {}",
                self.frac
            )));
        }
        if self.image_size == 0 {
            return Err(TaebsmError::InvalidConfig(
                "image size must be positive".to_string(),
            ));
        }
        if self.max_extraction_artifacts == 0 {
            return Err(TaebsmError::InvalidConfig(
                "artifact threshold must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
