pub mod crop;
pub mod views;

pub use crop::{content_bounds, crop_file, crop_to_content, CropBox};
pub use views::{extract_planes, extract_views, render_slice, Slice, ViewPaths};
