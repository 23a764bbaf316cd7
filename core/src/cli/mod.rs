pub mod report;

use crate::external::FslOptions;
use crate::types::{
    Atlas, BetMode, Dof, PipelineConfig, DEFAULT_ATLAS_DIR, DEFAULT_FRAC, DEFAULT_IMAGE_SIZE,
    DEFAULT_MAX_EXTRACTION_ARTIFACTS, DEFAULT_VOXEL_SIZE,
};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Command-line arguments for taebsm
#[derive(Parser, Debug)]
#[command(name = "taebsm")]
#[command(about = "Extract cropped anatomical slices from brain MRI volumes")]
#[command(version)]
pub struct Cli {
    /// Isotropic voxel size for resampling, in mm
    #[arg(short = 'v', long = "voxel_size", default_value_t = DEFAULT_VOXEL_SIZE)]
    pub voxel_size: f64,

    /// BET fractional intensity threshold (0..1); smaller keeps more brain
    #[arg(short = 'f', long = "frac", default_value_t = DEFAULT_FRAC)]
    pub frac: f64,

    /// BET mode: B (bias field and neck cleanup) or R (robust centre estimation)
    #[arg(short = 'm', long = "BET_mode", default_value = "R")]
    pub bet_mode: BetModeArg,

    /// Registration degrees of freedom
    #[arg(short = 'd', long = "dof", default_value = "12")]
    pub dof: DofArg,

    /// Atlas used as registration reference
    #[arg(short = 'a', long = "atlas", default_value = "MNI152_2mm")]
    pub atlas: AtlasArg,

    /// Side length of the output view images, in pixels
    #[arg(short = 'i', long = "image_size", default_value_t = DEFAULT_IMAGE_SIZE)]
    pub image_size: u32,

    /// Workspace root holding input_files/ and the output directories
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub root: PathBuf,

    /// Directory holding the MNI152 atlas templates
    #[arg(long = "atlas_dir", value_name = "DIR", default_value = DEFAULT_ATLAS_DIR)]
    pub atlas_dir: PathBuf,

    /// Maximum number of files brain extraction may leave per scan
    #[arg(long = "max_artifacts", default_value_t = DEFAULT_MAX_EXTRACTION_ARTIFACTS)]
    pub max_artifacts: usize,

    /// FSL installation root; tools are looked up on PATH when omitted
    #[arg(long = "fsl_dir", value_name = "DIR")]
    pub fsl_dir: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,

    /// Verbose logging
    #[arg(long)]
    pub verbose: bool,
}

impl Cli {
    /// Pipeline configuration described by the arguments (not yet validated)
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig::default()
            .with_voxel_size(self.voxel_size)
            .with_frac(self.frac)
            .with_bet_mode(self.bet_mode.into())
            .with_dof(self.dof.into())
            .with_atlas(self.atlas.into())
            .with_atlas_dir(&self.atlas_dir)
            .with_image_size(self.image_size)
            .with_max_extraction_artifacts(self.max_artifacts)
    }

    /// FSL tool settings matching `config`
    pub fn fsl_options(&self, config: &PipelineConfig) -> FslOptions {
        let options = FslOptions::new(config.output_type);
        match &self.fsl_dir {
            Some(dir) => options.with_fsl_dir(dir),
            None => options,
        }
    }
}

/// Output format options
#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format
    Text,
    /// JSON format
    Json,
}

/// BET mode argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BetModeArg {
    /// Bias field and neck cleanup
    #[value(name = "B")]
    ReduceBias,
    /// Robust brain centre estimation
    #[value(name = "R")]
    Robust,
}

impl From<BetModeArg> for BetMode {
    fn from(arg: BetModeArg) -> Self {
        match arg {
            BetModeArg::ReduceBias => BetMode::ReduceBias,
            BetModeArg::Robust => BetMode::Robust,
        }
    }
}

/// Degrees of freedom argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DofArg {
    /// Rigid body
    #[value(name = "6")]
    Six,
    /// Global rescale
    #[value(name = "9")]
    Nine,
    /// Full affine
    #[value(name = "12")]
    Twelve,
}

impl From<DofArg> for Dof {
    fn from(arg: DofArg) -> Self {
        match arg {
            DofArg::Six => Dof::Six,
            DofArg::Nine => Dof::Nine,
            DofArg::Twelve => Dof::Twelve,
        }
    }
}

/// Atlas argument
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AtlasArg {
    #[value(name = "MNI152_1mm")]
    Mni152_1mm,
    #[value(name = "MNI152_2mm")]
    Mni152_2mm,
}

impl From<AtlasArg> for Atlas {
    fn from(arg: AtlasArg) -> Self {
        match arg {
            AtlasArg::Mni152_1mm => Atlas::Mni152_1mm,
            AtlasArg::Mni152_2mm => Atlas::Mni152_2mm,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::path::Path;

    #[test]
    fn test_defaults_match_pipeline_defaults() {
        let cli = Cli::try_parse_from(["taebsm"]).unwrap();
        assert_eq!(cli.pipeline_config(), PipelineConfig::default());
        assert_eq!(cli.root, PathBuf::from("."));
        assert!(cli.fsl_dir.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_short_flags() {
        let cli = Cli::try_parse_from([
            "taebsm", "-v", "1.5", "-f", "0.3", "-m", "B", "-d", "6", "-a", "MNI152_1mm", "-i",
            "128",
        ])
        .unwrap();
        let config = cli.pipeline_config();

        assert_eq!(config.voxel_size, 1.5);
        assert_eq!(config.frac, 0.3);
        assert_eq!(config.bet_mode, BetMode::ReduceBias);
        assert_eq!(config.dof, Dof::Six);
        assert_eq!(config.atlas, Atlas::Mni152_1mm);
        assert_eq!(config.image_size, 128);
    }

    #[test]
    fn test_long_flags() {
        let cli = Cli::try_parse_from([
            "taebsm",
            "--voxel_size",
            "1",
            "--BET_mode",
            "R",
            "--atlas_dir",
            "/opt/atlas",
            "--max_artifacts",
            "3",
            "--fsl_dir",
            "/usr/local/fsl",
            "--root",
            "/data/study",
            "--format",
            "json",
            "--verbose",
        ])
        .unwrap();
        let config = cli.pipeline_config();

        assert_eq!(config.voxel_size, 1.0);
        assert_eq!(config.bet_mode, BetMode::Robust);
        assert_eq!(config.atlas_dir, PathBuf::from("/opt/atlas"));
        assert_eq!(config.max_extraction_artifacts, 3);
        assert_eq!(cli.root, PathBuf::from("/data/study"));
        assert!(matches!(cli.format, OutputFormat::Json));
        assert!(cli.verbose);

        let fsl = cli.fsl_options(&config);
        assert_eq!(fsl.program("bet"), Path::new("/usr/local/fsl/bin/bet"));
    }

    #[rstest]
    #[case("6", Dof::Six)]
    #[case("9", Dof::Nine)]
    #[case("12", Dof::Twelve)]
    fn test_dof_values(#[case] value: &str, #[case] expected: Dof) {
        let cli = Cli::try_parse_from(["taebsm", "--dof", value]).unwrap();
        assert_eq!(Dof::from(cli.dof), expected);
    }

    #[rstest]
    #[case(&["taebsm", "-d", "7"])]
    #[case(&["taebsm", "-m", "X"])]
    #[case(&["taebsm", "-a", "MNI305"])]
    #[case(&["taebsm", "-i", "-4"])]
    fn test_rejected_values(#[case] args: &[&str]) {
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_out_of_range_frac_parses_but_fails_validation() {
        let cli = Cli::try_parse_from(["taebsm", "--frac", "1.2"]).unwrap();
        assert!(cli.pipeline_config().validate().is_err());
    }
}
