use std::path::Path;

use image::GrayImage;

use crate::error::{Result, SequenceError};

/// Reads one camera frame as an 8-bit grayscale buffer
pub trait ImageSource {
    fn load_gray(&self, path: &Path) -> Result<GrayImage>;
}

/// Decodes frames from image files on disk, converting color frames to luma
#[derive(Clone, Copy, Debug, Default)]
pub struct PngImageSource;

impl ImageSource for PngImageSource {
    fn load_gray(&self, path: &Path) -> Result<GrayImage> {
        let image = image::open(path).map_err(|source| SequenceError::ImageLoad {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!(
            "Loaded {}x{} frame from {}",
            image.width(),
            image.height(),
            path.display()
        );
        Ok(image.into_luma8())
    }
}
