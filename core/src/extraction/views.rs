use crate::error::Result;
use crate::types::ViewOrientation;
use crate::volume::Volume;
use image::imageops::{self, FilterType};
use image::{GrayImage, ImageBuffer, Luma};
use log::debug;
use ndarray::{Array2, Axis};
use std::fs;
use std::path::{Path, PathBuf};

/// A 2D plane cut from a volume at its midpoint
#[derive(Debug, Clone)]
pub struct Slice {
    pub orientation: ViewOrientation,
    /// Plane values indexed `[row, column]`, already flipped where required
    pub pixels: Array2<f32>,
}

/// Paths of the three view images written for one scan
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct ViewPaths {
    pub axial: PathBuf,
    pub coronal: PathBuf,
    pub sagittal: PathBuf,
}

impl ViewPaths {
    /// Builds the view file names for a scan inside `dir`
    pub fn new(dir: &Path, stem: &str) -> Self {
        Self {
            axial: view_path(dir, stem, ViewOrientation::Axial),
            coronal: view_path(dir, stem, ViewOrientation::Coronal),
            sagittal: view_path(dir, stem, ViewOrientation::Sagittal),
        }
    }

    /// Path of the image for an orientation
    pub fn get(&self, orientation: ViewOrientation) -> &Path {
        match orientation {
            ViewOrientation::Axial => &self.axial,
            ViewOrientation::Coronal => &self.coronal,
            ViewOrientation::Sagittal => &self.sagittal,
        }
    }

    /// All paths in axial, coronal, sagittal order
    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        ViewOrientation::ALL.into_iter().map(move |o| self.get(o))
    }
}

fn view_path(dir: &Path, stem: &str, orientation: ViewOrientation) -> PathBuf {
    dir.join(format!("{}_{}.png", stem, orientation.simple_name()))
}

/// Cuts the axial, coronal and sagittal planes through the volume midpoint
///
/// The midpoint is `shape / 2` per axis, so even-length axes use the voxel
/// just past the geometric centre. Coronal and sagittal planes are flipped
/// top-to-bottom.
pub fn extract_planes(volume: &Volume) -> [Slice; 3] {
    let mid = volume.midpoint();
    ViewOrientation::ALL.map(|orientation| {
        let axis = orientation.fixed_axis();
        let mut plane = volume.data().index_axis(Axis(axis), mid[axis]);
        if orientation.is_flipped() {
            plane.invert_axis(Axis(0));
        }
        Slice {
            orientation,
            pixels: plane.to_owned(),
        }
    })
}

/// Resizes a plane to `size × size` (bicubic) and maps it to 8-bit grayscale
///
/// Values are stretched linearly from the minimum to the maximum of the
/// resized plane; constant planes render black.
pub fn render_slice(slice: &Slice, size: u32) -> GrayImage {
    let (rows, cols) = slice.pixels.dim();

    // Float resampling clamps to 0..1, so the plane is brought into that range first
    let (lo, hi) = value_range(slice.pixels.iter().copied());
    let span = hi - lo;
    let plane: ImageBuffer<Luma<f32>, Vec<f32>> =
        ImageBuffer::from_fn(cols as u32, rows as u32, |x, y| {
            let value = slice.pixels[[y as usize, x as usize]];
            Luma([if span > 0.0 { (value - lo) / span } else { 0.0 }])
        });
    let resized = imageops::resize(&plane, size, size, FilterType::CatmullRom);

    let (lo, hi) = value_range(resized.pixels().map(|p| p[0]));
    let range = hi - lo;

    GrayImage::from_fn(size, size, |x, y| {
        let value = resized.get_pixel(x, y)[0];
        if range > 0.0 {
            Luma([((value - lo) / range * 255.0).round().clamp(0.0, 255.0) as u8])
        } else {
            Luma([0])
        }
    })
}

fn value_range(values: impl Iterator<Item = f32>) -> (f32, f32) {
    values.fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

/// Writes the three mid-volume views of a scan
///
/// Images land in `{views_root}/{stem}/{stem}_{orientation}.png`; the
/// directory is created when missing.
///
/// # Errors
///
/// Returns an error if the directory or an image cannot be written
pub fn extract_views(volume: &Volume, stem: &str, views_root: &Path, size: u32) -> Result<ViewPaths> {
    let dir = views_root.join(stem);
    fs::create_dir_all(&dir)?;

    let paths = ViewPaths::new(&dir, stem);
    for slice in extract_planes(volume) {
        let path = paths.get(slice.orientation);
        render_slice(&slice, size).save(path)?;
        debug!(
            "Wrote {} view {:?} -> {}",
            slice.orientation,
            slice.pixels.dim(),
            path.display()
        );
    }

    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VoxelSpacing;
    use ndarray::Array3;
    use tempfile::TempDir;

    /// 20³ volume with a bright cube over indices 6..14 on every axis
    fn cube_volume() -> Volume {
        let data = Array3::from_shape_fn((20, 20, 20), |(z, y, x)| {
            let inside = |i: usize| (6..14).contains(&i);
            if inside(z) && inside(y) && inside(x) {
                1000.0
            } else {
                0.0
            }
        });
        Volume::new(data, VoxelSpacing::isotropic(2.0))
    }

    #[test]
    fn test_plane_shapes() {
        let volume = Volume::new(Array3::zeros((6, 8, 10)), VoxelSpacing::isotropic(1.0));
        let [axial, coronal, sagittal] = extract_planes(&volume);

        assert_eq!(axial.orientation, ViewOrientation::Axial);
        assert_eq!(axial.pixels.dim(), (8, 10));
        assert_eq!(coronal.pixels.dim(), (6, 10));
        assert_eq!(sagittal.pixels.dim(), (6, 8));
    }

    #[test]
    fn test_coronal_and_sagittal_are_flipped() {
        // Mark the lowest z slab; naive extraction would put it on row 0
        let data = Array3::from_shape_fn((6, 8, 10), |(z, _, _)| if z == 0 { 5.0 } else { 1.0 });
        let volume = Volume::new(data, VoxelSpacing::isotropic(1.0));
        let [axial, coronal, sagittal] = extract_planes(&volume);

        assert_eq!(coronal.pixels[[5, 0]], 5.0);
        assert_eq!(coronal.pixels[[0, 0]], 1.0);
        assert_eq!(sagittal.pixels[[5, 3]], 5.0);
        assert_eq!(sagittal.pixels[[0, 3]], 1.0);
        // Axial cut at z = 3 sees none of the slab
        assert!(axial.pixels.iter().all(|&v| v == 1.0));
    }

    #[test]
    fn test_midpoint_planes_cut_through_cube() {
        let planes = extract_planes(&cube_volume());
        for slice in &planes {
            assert_eq!(slice.pixels.dim(), (20, 20));
            assert_eq!(slice.pixels[[10, 10]], 1000.0);
            assert_eq!(slice.pixels[[2, 2]], 0.0);
            let bright = slice.pixels.iter().filter(|&&v| v > 0.0).count();
            assert_eq!(bright, 64);
        }
    }

    #[test]
    fn test_render_scales_square() {
        let planes = extract_planes(&cube_volume());
        let image = render_slice(&planes[0], 100);

        assert_eq!(image.dimensions(), (100, 100));
        // Cube spans 30%..70% of the plane
        assert!(image.get_pixel(50, 50)[0] > 200);
        assert!(image.get_pixel(40, 60)[0] > 200);
        assert!(image.get_pixel(5, 5)[0] < 50);
        assert!(image.get_pixel(90, 50)[0] < 50);
    }

    #[test]
    fn test_render_constant_plane_is_black() {
        let slice = Slice {
            orientation: ViewOrientation::Axial,
            pixels: Array2::from_elem((4, 4), 7.0),
        };
        let image = render_slice(&slice, 8);
        assert!(image.pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn test_extract_views_writes_three_images() {
        let temp_dir = TempDir::new().unwrap();
        let paths = extract_views(&cube_volume(), "sub01", temp_dir.path(), 64).unwrap();

        let dir = temp_dir.path().join("sub01");
        assert_eq!(paths.axial, dir.join("sub01_axial.png"));
        assert_eq!(paths.coronal, dir.join("sub01_coronal.png"));
        assert_eq!(paths.sagittal, dir.join("sub01_sagittal.png"));

        for path in paths.iter() {
            let image = image::open(path).unwrap();
            assert_eq!((image.width(), image.height()), (64, 64));
        }
    }
}
