use std::fmt;

/// Voxel spacing in millimeters along x, y and z
///
/// Follows the NIfTI `pixdim` convention: `x` varies fastest in the file,
/// `z` is the slice direction.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct VoxelSpacing {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl VoxelSpacing {
    /// Creates a new VoxelSpacing
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Creates an isotropic spacing with the same size on every axis
    pub fn isotropic(size: f64) -> Self {
        Self::new(size, size, size)
    }

    /// Spacing as an array in `[x, y, z]` order
    pub fn to_array(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Checks that every axis is finite and strictly positive
    pub fn is_valid(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite() && *v > 0.0)
    }

    /// Number of voxels covering `size` voxels of this spacing at `target` spacing
    ///
    /// `round(size * self / target)` per axis, never less than one voxel.
    pub fn resampled_size(&self, size: [usize; 3], target: &VoxelSpacing) -> [usize; 3] {
        let from = self.to_array();
        let to = target.to_array();
        let mut out = [0usize; 3];
        for axis in 0..3 {
            let extent = size[axis] as f64 * (from[axis] / to[axis]);
            out[axis] = (extent.round() as usize).max(1);
        }
        out
    }
}

impl fmt::Display for VoxelSpacing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x {} x {} mm", self.x, self.y, self.z)
    }
}
