use std::fmt;
use std::path::{Path, PathBuf};

/// Skull-stripping mode passed to the brain extractor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
#[cfg_attr(feature = "json", serde(rename_all = "kebab-case"))]
pub enum BetMode {
    /// Bias field and neck cleanup (`bet -B`)
    ReduceBias,
    /// Robust brain centre estimation (`bet -R`)
    #[default]
    Robust,
}

impl BetMode {
    /// Returns the BET command-line flag for this mode
    pub fn flag(&self) -> &'static str {
        match self {
            BetMode::ReduceBias => "-B",
            BetMode::Robust => "-R",
        }
    }

    /// Returns simple name for display
    pub fn simple_name(&self) -> &'static str {
        match self {
            BetMode::ReduceBias => "reduce-bias",
            BetMode::Robust => "robust",
        }
    }
}

impl fmt::Display for BetMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.simple_name())
    }
}

/// Degrees of freedom of the linear registration transform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
#[cfg_attr(feature = "json", serde(rename_all = "lowercase"))]
pub enum Dof {
    /// Rigid body
    Six,
    /// Traditional (rigid + global scale per axis)
    Nine,
    /// Affine
    #[default]
    Twelve,
}

impl Dof {
    /// Number of free transform parameters
    pub fn value(&self) -> u8 {
        match self {
            Dof::Six => 6,
            Dof::Nine => 9,
            Dof::Twelve => 12,
        }
    }
}

impl fmt::Display for Dof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// Reference atlas used as the registration target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
#[allow(non_camel_case_types)]
pub enum Atlas {
    /// MNI152 brain template at 1 mm resolution
    Mni152_1mm,
    /// MNI152 brain template at 2 mm resolution
    #[default]
    Mni152_2mm,
}

impl Atlas {
    /// Returns the canonical atlas name
    pub fn simple_name(&self) -> &'static str {
        match self {
            Atlas::Mni152_1mm => "MNI152_1mm",
            Atlas::Mni152_2mm => "MNI152_2mm",
        }
    }

    /// File name of the bundled brain template
    pub fn file_name(&self) -> &'static str {
        match self {
            Atlas::Mni152_1mm => "MNI152_1mm_brain.nii.gz",
            Atlas::Mni152_2mm => "MNI152_2mm_brain.nii.gz",
        }
    }

    /// Resolves the reference volume inside an atlas directory
    pub fn reference_path(&self, atlas_dir: &Path) -> PathBuf {
        atlas_dir.join(self.file_name())
    }
}

impl fmt::Display for Atlas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.simple_name())
    }
}

/// Volume file format written by the FSL tools
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub enum FslOutputType {
    /// Uncompressed single-file NIfTI
    Nifti,
    /// Gzip-compressed single-file NIfTI
    #[default]
    NiftiGz,
}

impl FslOutputType {
    /// Value of the `FSLOUTPUTTYPE` environment variable
    pub fn env_value(&self) -> &'static str {
        match self {
            FslOutputType::Nifti => "NIFTI",
            FslOutputType::NiftiGz => "NIFTI_GZ",
        }
    }

    /// File extension including the leading dot
    pub fn extension(&self) -> &'static str {
        match self {
            FslOutputType::Nifti => ".nii",
            FslOutputType::NiftiGz => ".nii.gz",
        }
    }
}

/// Anatomical orientation of an extracted slice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
#[cfg_attr(feature = "json", serde(rename_all = "lowercase"))]
pub enum ViewOrientation {
    Axial,
    Coronal,
    Sagittal,
}

impl ViewOrientation {
    /// All orientations in output order
    pub const ALL: [ViewOrientation; 3] = [
        ViewOrientation::Axial,
        ViewOrientation::Coronal,
        ViewOrientation::Sagittal,
    ];

    /// Returns simple name for display and file naming
    pub fn simple_name(&self) -> &'static str {
        match self {
            ViewOrientation::Axial => "axial",
            ViewOrientation::Coronal => "coronal",
            ViewOrientation::Sagittal => "sagittal",
        }
    }

    /// Volume axis held fixed when extracting this view (`[z, y, x]` order)
    pub fn fixed_axis(&self) -> usize {
        match self {
            ViewOrientation::Axial => 0,
            ViewOrientation::Coronal => 1,
            ViewOrientation::Sagittal => 2,
        }
    }

    /// Whether the extracted plane is flipped top-to-bottom
    pub fn is_flipped(&self) -> bool {
        !matches!(self, ViewOrientation::Axial)
    }
}

impl fmt::Display for ViewOrientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.simple_name())
    }
}
