use std::fs;
use std::path::Path;
use std::process::Command;

use blog_core::BlogError;
use blog_core::config::{ResizeBackend, ResizeConfig};
use blog_core::resize::{ImageResizer, ResizeSpec, magick_args};
use image::error::{ImageFormatHint, UnsupportedError, UnsupportedErrorKind};
use image::imageops::FilterType;
use image::{
    DynamicImage, ExtendedColorType, GenericImageView, ImageEncoder, ImageError, ImageFormat,
    ImageResult,
};
use tracing::debug;

/// Shells out to ImageMagick (`convert` or `magick`).
pub struct MagickResizer {
    command: String,
}

impl MagickResizer {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl ImageResizer for MagickResizer {
    fn resize(
        &self,
        source: &Path,
        spec: ResizeSpec,
        quality: u8,
        destination: &Path,
    ) -> Result<(), BlogError> {
        debug!(command = %self.command, %spec, "resizing {}", source.display());
        let output = Command::new(&self.command)
            .args(magick_args(source, spec, quality, destination))
            .output()
            .map_err(|err| BlogError::ResizeToolFailure {
                path: source.to_path_buf(),
                reason: format!("failed to run {}: {err}", self.command),
            })?;
        if !output.status.success() {
            return Err(BlogError::ResizeToolFailure {
                path: source.to_path_buf(),
                reason: format!(
                    "{} exited with {}: {}",
                    self.command,
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }
        Ok(())
    }
}

/// Decodes and re-encodes with the `image` crate. The output format follows
/// the destination extension.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeResizer;

impl ImageResizer for NativeResizer {
    fn resize(
        &self,
        source: &Path,
        spec: ResizeSpec,
        quality: u8,
        destination: &Path,
    ) -> Result<(), BlogError> {
        let image = image::ImageReader::open(source)?
            .with_guessed_format()?
            .decode()
            .map_err(|err| native_failure(source, "failed to decode", err))?;
        let (src_w, src_h) = image.dimensions();
        let (width, height) = target_dimensions(src_w, src_h, spec);
        debug!(%spec, src_w, src_h, width, height, "resizing {}", source.display());
        let resized = if (width, height) == (src_w, src_h) {
            image
        } else {
            image.resize_exact(width, height, FilterType::Lanczos3)
        };
        write_resized(&resized, quality, destination)
            .map_err(|err| native_failure(source, "failed to write reduced image", err))
    }
}

fn native_failure(source: &Path, action: &str, err: ImageError) -> BlogError {
    BlogError::ResizeToolFailure {
        path: source.to_path_buf(),
        reason: format!("{action}: {err}"),
    }
}

/// Output size for `spec`, matching ImageMagick geometry semantics.
pub fn target_dimensions(src_w: u32, src_h: u32, spec: ResizeSpec) -> (u32, u32) {
    match spec {
        ResizeSpec::Width(width) if src_w > width => (width, scale(src_h, width, src_w)),
        ResizeSpec::Height(height) if src_h > height => (scale(src_w, height, src_h), height),
        ResizeSpec::Width(_) | ResizeSpec::Height(_) => (src_w, src_h),
        ResizeSpec::Fit { width, height } => {
            let ratio = f64::min(
                width as f64 / src_w.max(1) as f64,
                height as f64 / src_h.max(1) as f64,
            );
            (
                ((src_w as f64) * ratio).round().max(1.0) as u32,
                ((src_h as f64) * ratio).round().max(1.0) as u32,
            )
        }
    }
}

fn scale(side: u32, target: u32, reference: u32) -> u32 {
    ((side as f64) * (target as f64) / (reference.max(1) as f64))
        .round()
        .max(1.0) as u32
}

fn write_resized(image: &DynamicImage, quality: u8, out_path: &Path) -> ImageResult<()> {
    let format = ImageFormat::from_path(out_path)?;
    if !matches!(format, ImageFormat::Jpeg | ImageFormat::Png | ImageFormat::WebP) {
        return Err(unsupported_output(format));
    }
    if let Some(parent) = out_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = fs::File::create(out_path)?;
    let (width, height) = image.dimensions();
    match format {
        ImageFormat::Jpeg => {
            let rgb = image.to_rgb8();
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut file, quality).write_image(
                &rgb,
                width,
                height,
                ExtendedColorType::Rgb8,
            )
        }
        ImageFormat::Png => {
            let rgba = image.to_rgba8();
            image::codecs::png::PngEncoder::new(&mut file).write_image(
                &rgba,
                width,
                height,
                ExtendedColorType::Rgba8,
            )
        }
        ImageFormat::WebP => {
            let rgba = image.to_rgba8();
            image::codecs::webp::WebPEncoder::new_lossless(&mut file).write_image(
                &rgba,
                width,
                height,
                ExtendedColorType::Rgba8,
            )
        }
        other => Err(unsupported_output(other)),
    }
}

fn unsupported_output(format: ImageFormat) -> ImageError {
    ImageError::Unsupported(UnsupportedError::from_format_and_kind(
        ImageFormatHint::Exact(format),
        UnsupportedErrorKind::Format(ImageFormatHint::Exact(format)),
    ))
}

pub fn resizer_for(config: &ResizeConfig) -> Box<dyn ImageResizer> {
    match config.backend {
        ResizeBackend::Magick => Box::new(MagickResizer::new(config.command.clone())),
        ResizeBackend::Native => Box::new(NativeResizer),
    }
}
