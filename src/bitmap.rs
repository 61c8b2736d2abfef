//! Power-of-two downsampling and the image I/O around it.
//!
//! [`compute_reduction_factor`] is pure integer arithmetic. The rest of the
//! module probes, decodes and encodes files through the `image` crate.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use rayon::prelude::*;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::error::{GeobitsError, Result};
use crate::logger;

/// How the reduced image should relate to the target size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum FitPolicy {
    /// The longest side ends up at or below the target.
    Under,
    /// The shortest side ends up one power of two above the target.
    Over,
}

/// Encoding used when writing a scaled image back to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Jpeg,
    Png,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
        }
    }
}

/// Pixel dimensions of an image, read without decoding the pixel data.
///
/// A zero width or height means the dimension is unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageMetadata {
    pub width: u32,
    pub height: u32,
    pub format: Option<ImageFormat>,
}

impl ImageMetadata {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            format: None,
        }
    }

    /// See [`compute_reduction_factor`].
    pub fn reduction_factor(&self, target_size: u32, policy: FitPolicy) -> u32 {
        compute_reduction_factor(self.width, self.height, target_size, policy)
    }
}

/// Smallest power-of-two factor that brings `width`x`height` down to a
/// `target_size` square under the given policy.
///
/// Returns 0 if a dimension is unknown (0) or `target_size` is 0, and 1 if
/// the image is already smaller than the target on both sides.
pub fn compute_reduction_factor(
    width: u32,
    height: u32,
    target_size: u32,
    policy: FitPolicy,
) -> u32 {
    if width == 0 || height == 0 || target_size < 1 {
        return 0;
    }
    if width < target_size && height < target_size {
        return 1;
    }

    let baseline = match policy {
        FitPolicy::Under => width.max(height),
        FitPolicy::Over => width.min(height) / 2,
    };

    let mut factor: u32 = 1;
    while baseline / factor > target_size {
        factor *= 2;
    }

    logger::debug(&format!(
        "Reduction factor of {} required to load {}x{}px image into {}x{}px",
        factor, width, height, target_size, target_size
    ));
    factor
}

/// Read the dimensions and container format of an image file.
pub fn load_metadata(path: &Path) -> Result<ImageMetadata> {
    if !path.exists() {
        return Err(GeobitsError::FileNotFound(path.display().to_string()));
    }

    let reader = ImageReader::open(path)?.with_guessed_format()?;
    let format = reader.format();
    let (width, height) = reader.into_dimensions()?;

    Ok(ImageMetadata {
        width,
        height,
        format,
    })
}

/// Probe many files in parallel. Results keep the order of `paths`.
///
/// `on_probed` runs once per file as soon as its probe finishes, from
/// whichever worker thread handled it.
pub fn probe_all<F>(paths: &[PathBuf], on_probed: F) -> Vec<(PathBuf, Result<ImageMetadata>)>
where
    F: Fn(&Path) + Sync + Send,
{
    paths
        .par_iter()
        .map(|path| {
            let metadata = load_metadata(path);
            on_probed(path);
            (path.clone(), metadata)
        })
        .collect()
}

/// Decode an image and shrink both sides by `reduction_factor`.
///
/// Sides are divided with integer division and never drop below one pixel.
pub fn load_scaled(path: &Path, reduction_factor: u32) -> Result<DynamicImage> {
    if reduction_factor == 0 {
        return Err(GeobitsError::InvalidReductionFactor(reduction_factor));
    }
    if !path.exists() {
        return Err(GeobitsError::FileNotFound(path.display().to_string()));
    }

    let image = ImageReader::open(path)?.with_guessed_format()?.decode()?;
    if reduction_factor == 1 {
        return Ok(image);
    }

    let width = (image.width() / reduction_factor).max(1);
    let height = (image.height() / reduction_factor).max(1);
    logger::debug(&format!(
        "Scaling {} from {}x{} to {}x{}",
        path.display(),
        image.width(),
        image.height(),
        width,
        height
    ));
    Ok(image.resize_exact(width, height, FilterType::Triangle))
}

/// Encode `image` to `path`, creating missing parent directories.
///
/// `quality` (1-100) only applies to JPEG. JPEG output drops any alpha
/// channel.
pub fn write_image(
    image: &DynamicImage,
    path: &Path,
    format: OutputFormat,
    quality: u8,
) -> Result<()> {
    if !(1..=100).contains(&quality) {
        return Err(GeobitsError::InvalidQuality(quality));
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    match format {
        OutputFormat::Jpeg => {
            let writer = BufWriter::new(File::create(path)?);
            let encoder = JpegEncoder::new_with_quality(writer, quality);
            DynamicImage::ImageRgb8(image.to_rgb8()).write_with_encoder(encoder)?;
        }
        OutputFormat::Png => image.save_with_format(path, ImageFormat::Png)?,
    }
    Ok(())
}
