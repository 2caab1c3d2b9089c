use crate::error::DegradeError;
use image::{DynamicImage, GenericImageView, GrayImage};
use log::debug;
use std::path::Path;

/// Open an image and force a single 8-bit grayscale channel
pub fn load_grayscale(path: &Path) -> Result<GrayImage, DegradeError> {
    let img = image::open(path)?;
    debug!(
        "Loaded {} as grayscale ({}x{})",
        path.display(),
        img.width(),
        img.height()
    );
    Ok(img.into_luma8())
}

/// Open an image keeping its native color type
pub fn load_image(path: &Path) -> Result<DynamicImage, DegradeError> {
    let img = image::open(path)?;
    debug!(
        "Loaded {} ({:?}, {}x{})",
        path.display(),
        img.color(),
        img.width(),
        img.height()
    );
    Ok(img)
}

/// Save an image, picking the format from the file extension
pub fn save_image(img: &DynamicImage, path: &Path) -> Result<(), DegradeError> {
    img.save(path)?;
    Ok(())
}

/// An image with no pixels along at least one axis
pub fn is_empty(img: &DynamicImage) -> bool {
    let (width, height) = img.dimensions();
    width == 0 || height == 0
}

/// A 0x0 image of the same color type
pub fn empty_like(img: &DynamicImage) -> DynamicImage {
    DynamicImage::new(0, 0, img.color())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ColorType, Luma};

    #[test]
    fn empty_like_keeps_color_type() {
        let img = DynamicImage::new_rgb8(4, 4);
        let empty = empty_like(&img);
        assert!(is_empty(&empty));
        assert_eq!(empty.color(), ColorType::Rgb8);
    }

    #[test]
    fn one_sided_empty_image_is_empty() {
        assert!(is_empty(&DynamicImage::new_luma8(5, 0)));
        assert!(!is_empty(&DynamicImage::new_luma8(1, 1)));
    }

    #[test]
    fn grayscale_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gray.png");
        let gray = GrayImage::from_fn(3, 2, |x, y| Luma([(x * 40 + y * 10) as u8]));
        save_image(&DynamicImage::ImageLuma8(gray.clone()), &path).unwrap();

        assert_eq!(load_grayscale(&path).unwrap(), gray);
        assert_eq!(load_image(&path).unwrap().color(), ColorType::L8);
    }

    #[test]
    fn missing_file_is_an_image_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_grayscale(&dir.path().join("nope.png"));
        assert!(matches!(result, Err(DegradeError::Image(_))));
    }
}
