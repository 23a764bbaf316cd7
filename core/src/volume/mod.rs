//! 3D scalar volumes and their on-disk NIfTI representation
//!
//! Voxels are held in `[z, y, x]` order (slowest axis first), so the first
//! array axis is the axial axis. Spacing and the NIfTI header keep the file
//! convention (`x` first).

mod io;
mod resample;

pub use io::{read_volume, write_volume};
pub use resample::{LinearResampler, Resampler};

use crate::types::VoxelSpacing;
use ndarray::Array3;
use nifti::NiftiHeader;

/// A 3D scalar image with its voxel grid geometry
#[derive(Debug, Clone)]
pub struct Volume {
    data: Array3<f32>,
    spacing: VoxelSpacing,
    header: NiftiHeader,
}

impl Volume {
    /// Creates a volume with an axis-aligned affine at the origin
    ///
    /// `data` is indexed `[z, y, x]`.
    pub fn new(data: Array3<f32>, spacing: VoxelSpacing) -> Self {
        let mut header = NiftiHeader::default();
        header.pixdim[0] = 1.0;
        header.pixdim[1] = spacing.x as f32;
        header.pixdim[2] = spacing.y as f32;
        header.pixdim[3] = spacing.z as f32;
        header.sform_code = 1;
        header.srow_x = [spacing.x as f32, 0.0, 0.0, 0.0];
        header.srow_y = [0.0, spacing.y as f32, 0.0, 0.0];
        header.srow_z = [0.0, 0.0, spacing.z as f32, 0.0];
        header.scl_slope = 1.0;
        header.scl_inter = 0.0;

        Self {
            data,
            spacing,
            header,
        }
    }

    pub(crate) fn from_parts(data: Array3<f32>, spacing: VoxelSpacing, header: NiftiHeader) -> Self {
        Self {
            data,
            spacing,
            header,
        }
    }

    /// Voxel values indexed `[z, y, x]`
    pub fn data(&self) -> &Array3<f32> {
        &self.data
    }

    /// Physical voxel size
    pub fn spacing(&self) -> VoxelSpacing {
        self.spacing
    }

    /// NIfTI header carrying origin and direction cosines
    pub fn header(&self) -> &NiftiHeader {
        &self.header
    }

    /// Array shape in `[z, y, x]` order
    pub fn shape(&self) -> [usize; 3] {
        let (nz, ny, nx) = self.data.dim();
        [nz, ny, nx]
    }

    /// Grid size in `[x, y, z]` order
    pub fn grid_size(&self) -> [usize; 3] {
        let [nz, ny, nx] = self.shape();
        [nx, ny, nz]
    }

    /// Element-wise `shape / 2`, in `[z, y, x]` order
    pub fn midpoint(&self) -> [usize; 3] {
        let [nz, ny, nx] = self.shape();
        [nz / 2, ny / 2, nx / 2]
    }

    /// Physical position of the first voxel in `[x, y, z]` order
    pub fn origin(&self) -> [f64; 3] {
        if self.header.sform_code > 0 {
            [
                self.header.srow_x[3] as f64,
                self.header.srow_y[3] as f64,
                self.header.srow_z[3] as f64,
            ]
        } else {
            [
                self.header.quatern_x as f64,
                self.header.quatern_y as f64,
                self.header.quatern_z as f64,
            ]
        }
    }

    /// Builds a volume on a new grid sharing this volume's origin and direction
    ///
    /// The sform columns are rescaled to the new spacing; the qform only
    /// encodes rotation, so updating `pixdim` keeps it consistent.
    pub fn with_grid(&self, data: Array3<f32>, spacing: VoxelSpacing) -> Volume {
        let mut header = self.header.clone();
        let old = self.spacing.to_array();
        let new = spacing.to_array();

        for axis in 0..3 {
            header.pixdim[axis + 1] = new[axis] as f32;
            if old[axis] > 0.0 {
                let scale = new[axis] / old[axis];
                for row in [&mut header.srow_x, &mut header.srow_y, &mut header.srow_z] {
                    row[axis] = (row[axis] as f64 * scale) as f32;
                }
            }
        }

        Volume::from_parts(data, spacing, header)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_midpoint_floor_division() {
        let volume = Volume::new(Array3::zeros((7, 10, 5)), VoxelSpacing::isotropic(1.0));
        assert_eq!(volume.shape(), [7, 10, 5]);
        assert_eq!(volume.grid_size(), [5, 10, 7]);
        assert_eq!(volume.midpoint(), [3, 5, 2]);
    }

    #[test]
    fn test_with_grid_keeps_origin() {
        let mut volume = Volume::new(Array3::zeros((4, 4, 4)), VoxelSpacing::new(1.0, 1.0, 1.5));
        volume.header.srow_x[3] = -90.0;
        volume.header.srow_y[3] = -126.0;
        volume.header.srow_z[3] = -72.0;

        let resampled = volume.with_grid(Array3::zeros((3, 2, 2)), VoxelSpacing::isotropic(2.0));
        assert_eq!(resampled.origin(), [-90.0, -126.0, -72.0]);
        assert_eq!(resampled.header().srow_x[0], 2.0);
        assert_eq!(resampled.header().srow_z[2], 2.0);
        assert_eq!(resampled.header().pixdim[3], 2.0);
    }

    #[test]
    fn test_origin_from_qform_without_sform() {
        let mut volume = Volume::new(Array3::zeros((2, 2, 2)), VoxelSpacing::isotropic(1.0));
        volume.header.sform_code = 0;
        volume.header.quatern_x = 12.5;
        volume.header.quatern_y = -4.0;
        volume.header.quatern_z = 30.0;
        assert_eq!(volume.origin(), [12.5, -4.0, 30.0]);
    }
}
