//! Core type definitions for the slice extraction pipeline
//!
//! This module provides the configuration types used throughout the taebsm library:
//! - [`BetMode`]: Skull-stripping mode (reduce bias or robust centre estimation)
//! - [`Dof`]: Registration degrees of freedom (6, 9, 12)
//! - [`Atlas`]: Registration target templates
//! - [`FslOutputType`]: Volume format written by the FSL tools
//! - [`ViewOrientation`]: Axial, coronal and sagittal views
//! - [`VoxelSpacing`]: Physical voxel size along each axis
//! - [`PipelineConfig`]: Configuration for one batch run

mod config;
mod enums;
mod spacing;

pub use config::{
    PipelineConfig, DEFAULT_ATLAS_DIR, DEFAULT_FRAC, DEFAULT_IMAGE_SIZE,
    DEFAULT_MAX_EXTRACTION_ARTIFACTS, DEFAULT_VOXEL_SIZE,
};
pub use enums::{Atlas, BetMode, Dof, FslOutputType, ViewOrientation};
pub use spacing::VoxelSpacing;
