use std::fs;
use std::path::Path;

use image::{Rgb, RgbImage};

/// Write a uniform-color JPEG fixture. Uniform blocks survive JPEG
/// quantization, so pure white and pure black decode back exactly.
pub fn write_jpeg(path: &Path, width: u32, height: u32, color: [u8; 3]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    RgbImage::from_pixel(width, height, Rgb(color))
        .save(path)
        .expect("write jpeg fixture");
}
