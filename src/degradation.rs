use crate::error::DegradeError;
use crate::utils::images::{empty_like, is_empty, load_grayscale};
use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, ImageBuffer, Pixel, RgbImage};
use imageproc::filter::gaussian_blur_f32;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use rayon::prelude::*;
use std::path::Path;

/// Largest width or height an upscale will allocate
pub const MAX_UPSCALE_DIMENSION: u32 = 1 << 16;

/// Scale both dimensions, truncating toward zero
fn scaled_dimensions(width: u32, height: u32, factor: f64) -> (u32, u32) {
    (
        (width as f64 * factor) as u32,
        (height as f64 * factor) as u32,
    )
}

fn ensure_upscale_fits(width: u32, height: u32, factor: f64) -> Result<(), DegradeError> {
    let scaled_width = (width as f64 * factor).trunc();
    let scaled_height = (height as f64 * factor).trunc();
    let limit = MAX_UPSCALE_DIMENSION as f64;
    if scaled_width > limit || scaled_height > limit {
        return Err(DegradeError::TargetTooLarge {
            width: scaled_width,
            height: scaled_height,
        });
    }
    Ok(())
}

fn ensure_non_empty(width: u32, height: u32) -> Result<(), DegradeError> {
    if width == 0 || height == 0 {
        return Err(DegradeError::EmptyTarget { width, height });
    }
    Ok(())
}

/// Upscale a grayscale image with a Lanczos kernel and sharpen it by unsharp masking.
///
/// # Arguments
/// * `path` - Image to load; any color input is reduced to one gray channel
/// * `scale_factor` - Size multiplier; the new size is truncated, not rounded
/// * `sharpen_amount` - Weight of the high-frequency residual that is added back
/// * `sharpen_radius` - Standard deviation of the Gaussian blur used as the mask
///
/// # Returns
/// * `RgbImage` - The sharpened image with the gray value replicated over three channels
pub fn upscale_and_sharpen(
    path: &Path,
    scale_factor: f64,
    sharpen_amount: f32,
    sharpen_radius: f32,
) -> Result<RgbImage, DegradeError> {
    if !scale_factor.is_finite() || scale_factor <= 0.0 {
        return Err(DegradeError::InvalidScale(scale_factor));
    }

    let gray = load_grayscale(path)?;
    let (width, height) = gray.dimensions();
    ensure_upscale_fits(width, height, scale_factor)?;
    let (new_width, new_height) = scaled_dimensions(width, height, scale_factor);
    ensure_non_empty(new_width, new_height)?;

    debug!(
        "Upscaling {}x{} to {}x{} (WxH)",
        width, height, new_width, new_height
    );
    let upscaled = imageops::resize(&gray, new_width, new_height, FilterType::Lanczos3);
    let upscaled = DynamicImage::ImageLuma8(upscaled).into_rgb8();

    unsharp_mask(&upscaled, sharpen_amount, sharpen_radius)
}

/// Sharpen by adding back `amount` times the difference between the image and its Gaussian blur
pub fn unsharp_mask(img: &RgbImage, amount: f32, sigma: f32) -> Result<RgbImage, DegradeError> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(DegradeError::InvalidSigma(sigma));
    }

    let blurred = gaussian_blur_f32(img, sigma);

    // out = img * (1 + amount) + blurred * (-amount), rounded and saturated
    let mut sharpened = img.clone();
    let out: &mut [u8] = &mut sharpened;
    let mask: &[u8] = &blurred;
    out.par_iter_mut()
        .zip(mask.par_iter())
        .for_each(|(sample, &blur)| {
            let value = *sample as f32 * (1.0 + amount) - blur as f32 * amount;
            *sample = value.round().clamp(0.0, 255.0) as u8;
        });

    Ok(sharpened)
}

/// Create a low-resolution image by bicubic downscaling.
///
/// An empty reference yields an empty image of the same color type. The
/// reference itself is left untouched.
pub fn simple_downscale(i_ref: &DynamicImage, ratio: f64) -> Result<DynamicImage, DegradeError> {
    if is_empty(i_ref) {
        return Ok(empty_like(i_ref));
    }

    if !ratio.is_finite() || ratio <= 0.0 || ratio > 1.0 {
        return Err(DegradeError::InvalidRatio(ratio));
    }

    let (width, height) = i_ref.dimensions();
    let (new_width, new_height) = scaled_dimensions(width, height, ratio);
    debug!("Reference size: {}x{} (WxH)", width, height);
    debug!("Downscaling to {}x{} (WxH)", new_width, new_height);
    ensure_non_empty(new_width, new_height)?;

    // Bicubic keeps the blur and jaggies a real low-resolution capture would have
    Ok(i_ref.resize_exact(new_width, new_height, FilterType::CatmullRom))
}

/// Downscale and then add zero-mean Gaussian noise to every sample.
///
/// With `seed` set the output is reproducible; without it the generator is
/// seeded from the operating system.
pub fn downscale_with_noise(
    i_ref: &DynamicImage,
    ratio: f64,
    noise_std_dev: f32,
    seed: Option<u64>,
) -> Result<DynamicImage, DegradeError> {
    let low = simple_downscale(i_ref, ratio)?;
    if is_empty(&low) {
        return Ok(low);
    }

    info!("Adding Gaussian noise (std dev = {})", noise_std_dev);
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    add_gaussian_noise(&low, noise_std_dev, &mut rng)
}

/// Add independent `Normal(0, std_dev)` noise to each channel of each pixel.
///
/// Samples are perturbed in `f32`, clamped to [0, 255] and truncated back to
/// 8 bits. Images with deeper samples are converted to 8-bit RGB(A) first.
pub fn add_gaussian_noise<R: Rng + ?Sized>(
    img: &DynamicImage,
    std_dev: f32,
    rng: &mut R,
) -> Result<DynamicImage, DegradeError> {
    if !std_dev.is_finite() || std_dev < 0.0 {
        return Err(DegradeError::InvalidNoise(std_dev));
    }
    let normal = Normal::new(0.0f32, std_dev)?;

    let noisy = match img {
        DynamicImage::ImageLuma8(buf) => {
            DynamicImage::ImageLuma8(perturb(buf.clone(), &normal, rng))
        }
        DynamicImage::ImageLumaA8(buf) => {
            DynamicImage::ImageLumaA8(perturb(buf.clone(), &normal, rng))
        }
        DynamicImage::ImageRgb8(buf) => {
            DynamicImage::ImageRgb8(perturb(buf.clone(), &normal, rng))
        }
        DynamicImage::ImageRgba8(buf) => {
            DynamicImage::ImageRgba8(perturb(buf.clone(), &normal, rng))
        }
        other if other.color().has_alpha() => {
            DynamicImage::ImageRgba8(perturb(other.to_rgba8(), &normal, rng))
        }
        other => DynamicImage::ImageRgb8(perturb(other.to_rgb8(), &normal, rng)),
    };

    Ok(noisy)
}

fn perturb<P, R>(
    mut buf: ImageBuffer<P, Vec<u8>>,
    normal: &Normal<f32>,
    rng: &mut R,
) -> ImageBuffer<P, Vec<u8>>
where
    P: Pixel<Subpixel = u8>,
    R: Rng + ?Sized,
{
    let samples: &mut [u8] = &mut buf;
    for sample in samples.iter_mut() {
        let noisy = *sample as f32 + normal.sample(rng);
        *sample = noisy.clamp(0.0, 255.0) as u8;
    }
    buf
}
