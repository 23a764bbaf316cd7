use super::Volume;
use crate::error::{Result, TaebsmError};
use crate::types::VoxelSpacing;
use log::debug;
use ndarray::{ArrayD, Axis, Ix3};
use nifti::volume::ndarray::IntoNdArray;
use nifti::writer::WriterOptions;
use nifti::{NiftiObject, ReaderOptions};
use std::path::Path;

/// Reads a NIfTI volume (`.nii` or `.nii.gz`) from disk
///
/// Intensity scaling from the header is applied, so the returned header has
/// an identity slope. 4D inputs keep their first volume only.
///
/// # Errors
///
/// Returns an error if the file cannot be parsed or has fewer than three
/// dimensions
pub fn read_volume(path: &Path) -> Result<Volume> {
    let obj = ReaderOptions::new().read_file(path)?;
    let mut header = obj.header().clone();
    let array: ArrayD<f32> = obj.into_volume().into_ndarray()?;

    let array = match array.ndim() {
        3 => array,
        4 => array.index_axis_move(Axis(3), 0),
        n => {
            return Err(TaebsmError::InvalidInput(format!(
                "{}: expected a 3D volume, got {}D",
                path.display(),
                n
            )))
        }
    };

    // File order is [x, y, z]; keep voxels as [z, y, x]
    let data = array
        .into_dimensionality::<Ix3>()
        .map_err(|e| TaebsmError::Nifti(format!("{}: {}", path.display(), e)))?
        .reversed_axes()
        .as_standard_layout()
        .into_owned();

    let spacing = VoxelSpacing::new(
        header.pixdim[1] as f64,
        header.pixdim[2] as f64,
        header.pixdim[3] as f64,
    );
    header.scl_slope = 1.0;
    header.scl_inter = 0.0;

    debug!(
        "Read {}: {:?} voxels at {}",
        path.display(),
        data.dim(),
        spacing
    );

    Ok(Volume::from_parts(data, spacing, header))
}

/// Writes a volume as NIfTI; a `.gz` suffix selects compression
///
/// # Errors
///
/// Returns an error if the file cannot be written
pub fn write_volume(volume: &Volume, path: &Path) -> Result<()> {
    let data = volume.data().view().reversed_axes();
    WriterOptions::new(path)
        .reference_header(volume.header())
        .write_nifti(&data)?;

    debug!("Wrote {}: {:?} voxels", path.display(), volume.grid_size());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;
    use tempfile::TempDir;

    fn make_volume() -> Volume {
        let data = Array3::from_shape_fn((4, 5, 6), |(z, y, x)| (z * 100 + y * 10 + x) as f32);
        Volume::new(data, VoxelSpacing::new(1.0, 1.5, 2.5))
    }

    #[test]
    fn test_write_then_read_keeps_axis_order() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("scan.nii.gz");

        let volume = make_volume();
        write_volume(&volume, &path).unwrap();
        let loaded = read_volume(&path).unwrap();

        assert_eq!(loaded.shape(), [4, 5, 6]);
        assert_eq!(loaded.spacing(), VoxelSpacing::new(1.0, 1.5, 2.5));
        assert_eq!(loaded.data()[[3, 2, 1]], 321.0);
        assert_eq!(loaded.data()[[0, 4, 5]], 45.0);
    }

    #[test]
    fn test_read_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = read_volume(&temp_dir.path().join("missing.nii.gz"));
        assert!(result.is_err());
    }
}
