use crate::error::{Result, TaebsmError};
use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, Luma};
use imageproc::contours::{find_contours, BorderType, Contour};
use imageproc::distance_transform::Norm;
use imageproc::geometry::contour_area;
use imageproc::filter::separable_filter_equal;
use imageproc::morphology::{dilate, erode};
use log::debug;
use std::path::Path;

/// Side length of the Gaussian blur kernel
pub const BLUR_KERNEL_SIZE: usize = 5;

/// Intensity at or above which a blurred pixel counts as content
pub const CONTENT_THRESHOLD: u8 = 45;

/// Erosion and dilation passes applied to the content mask
pub const MORPHOLOGY_ITERATIONS: usize = 2;

/// Margin kept around the content bounding box, in pixels
pub const CROP_MARGIN: u32 = 3;

/// Axis-aligned crop rectangle in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropBox {
    /// Exclusive right edge
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }
}

/// Gaussian kernel with the sigma OpenCV derives from the kernel size
///
/// `sigma = 0.3 * ((size - 1) * 0.5 - 1) + 0.8`
fn gaussian_kernel(size: usize) -> Vec<f32> {
    let sigma = 0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8;
    let centre = (size as f32 - 1.0) / 2.0;
    let weights: Vec<f32> = (0..size)
        .map(|i| {
            let d = i as f32 - centre;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f32 = weights.iter().sum();
    weights.into_iter().map(|w| w / sum).collect()
}

/// Blurs, thresholds and opens the grayscale image into a content mask
fn content_mask(gray: &GrayImage) -> GrayImage {
    let kernel = gaussian_kernel(BLUR_KERNEL_SIZE);
    let blurred = separable_filter_equal(gray, kernel.as_slice());

    let mut mask = GrayImage::from_fn(blurred.width(), blurred.height(), |x, y| {
        if blurred.get_pixel(x, y)[0] >= CONTENT_THRESHOLD {
            Luma([255])
        } else {
            Luma([0])
        }
    });

    // 3x3 square structuring element, one pass per iteration
    for _ in 0..MORPHOLOGY_ITERATIONS {
        mask = erode(&mask, Norm::LInf, 1);
    }
    for _ in 0..MORPHOLOGY_ITERATIONS {
        mask = dilate(&mask, Norm::LInf, 1);
    }
    mask
}

/// Outer contours of the mask, in mask coordinates
///
/// Contour tracing treats the image edge as foreground boundary, so content
/// touching the edge would come back as a hole. Tracing a copy framed by one
/// background pixel keeps every region external.
fn outer_contours(mask: &GrayImage) -> Vec<Contour<i32>> {
    let mut framed = GrayImage::new(mask.width() + 2, mask.height() + 2);
    imageops::replace(&mut framed, mask, 1, 1);

    find_contours::<i32>(&framed)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && !c.points.is_empty())
        .map(|mut c| {
            for p in &mut c.points {
                p.x -= 1;
                p.y -= 1;
            }
            c
        })
        .collect()
}

/// Locates the image content and returns its padded bounding box
///
/// The content is the outer contour with the largest enclosed area in the
/// cleaned threshold mask; the first one found wins ties. Outer borders
/// nested inside holes always enclose less area than their surrounding
/// external border, so they never win.
///
/// # Errors
///
/// Returns `NoContentFound` if the mask has no contour
pub fn content_bounds(image: &DynamicImage) -> Result<CropBox> {
    let gray = image.to_luma8();
    let mask = content_mask(&gray);

    let contours = outer_contours(&mask);
    let largest = contours
        .iter()
        .fold(None::<(&Contour<i32>, f64)>, |best, c| {
            let area = contour_area(&c.points).abs();
            match best {
                Some((_, best_area)) if best_area >= area => best,
                _ => Some((c, area)),
            }
        })
        .map(|(c, _)| c)
        .ok_or_else(|| {
            TaebsmError::NoContentFound(format!("{}x{} image", gray.width(), gray.height()))
        })?;

    // Extreme points of the contour
    let min_x = largest.points.iter().map(|p| p.x).min().unwrap_or(0).max(0) as u32;
    let max_x = largest.points.iter().map(|p| p.x).max().unwrap_or(0).max(0) as u32;
    let min_y = largest.points.iter().map(|p| p.y).min().unwrap_or(0).max(0) as u32;
    let max_y = largest.points.iter().map(|p| p.y).max().unwrap_or(0).max(0) as u32;

    let (width, height) = (image.width(), image.height());
    let left = min_x.saturating_sub(CROP_MARGIN);
    let top = min_y.saturating_sub(CROP_MARGIN);
    let right = (max_x + CROP_MARGIN + 1).min(width);
    let bottom = (max_y + CROP_MARGIN + 1).min(height);

    let bounds = CropBox {
        x: left,
        y: top,
        width: right - left,
        height: bottom - top,
    };
    debug!(
        "Content spans x {}..={}, y {}..={}; crop {:?}",
        min_x, max_x, min_y, max_y, bounds
    );
    Ok(bounds)
}

/// Crops the source image to its content bounds
///
/// The crop is taken from `image` itself, not from the threshold mask.
///
/// # Errors
///
/// Returns `NoContentFound` for blank images
pub fn crop_to_content(image: &DynamicImage) -> Result<DynamicImage> {
    let bounds = content_bounds(image)?;
    Ok(image.crop_imm(bounds.x, bounds.y, bounds.width, bounds.height))
}

/// Crops a view image in place and resizes it to `size × size` (bicubic)
///
/// # Errors
///
/// Returns an error if the image cannot be read or written, or has no content
pub fn crop_file(path: &Path, size: u32) -> Result<()> {
    let image = image::open(path)?;
    let cropped = crop_to_content(&image).map_err(|e| match e {
        TaebsmError::NoContentFound(_) => TaebsmError::NoContentFound(path.display().to_string()),
        other => other,
    })?;
    cropped
        .resize_exact(size, size, FilterType::CatmullRom)
        .save(path)?;
    Ok(())
}
