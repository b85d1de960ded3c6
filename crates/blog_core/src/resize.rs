//! Caption resize directives and the reduced-variant naming policy.
//!
//! A caption may end in `|W`, `|xH` or `|WxH`. The directive is translated to
//! ImageMagick geometry: `Wx>` and `xH>` only ever shrink and keep the aspect
//! ratio, `WxH` fits the image inside the box.

use std::ffi::OsString;
use std::fmt;
use std::path::Path;

use crate::error::BlogError;

pub const REDUCED_SUFFIX: &str = "_reduced";

const EXEMPT_EXTENSIONS: [&str; 2] = ["svg", "gif"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeSpec {
    Width(u32),
    Height(u32),
    Fit { width: u32, height: u32 },
}

impl fmt::Display for ResizeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResizeSpec::Width(width) => write!(f, "{width}x>"),
            ResizeSpec::Height(height) => write!(f, "x{height}>"),
            ResizeSpec::Fit { width, height } => write!(f, "{width}x{height}"),
        }
    }
}

pub trait ImageResizer {
    fn resize(
        &self,
        source: &Path,
        spec: ResizeSpec,
        quality: u8,
        destination: &Path,
    ) -> Result<(), BlogError>;
}

pub fn parse_resize_directive(caption: &str) -> Option<ResizeSpec> {
    let (_, directive) = caption.rsplit_once('|')?;
    let directive = directive.trim();
    if let Some(height) = directive.strip_prefix('x') {
        return parse_dimension(height).map(ResizeSpec::Height);
    }
    match directive.split_once('x') {
        None => parse_dimension(directive).map(ResizeSpec::Width),
        Some((width, height)) => Some(ResizeSpec::Fit {
            width: parse_dimension(width)?,
            height: parse_dimension(height)?,
        }),
    }
}

pub fn get_resize_arg(caption: &str) -> Option<String> {
    parse_resize_directive(caption).map(|spec| spec.to_string())
}

fn parse_dimension(value: &str) -> Option<u32> {
    if value.is_empty() || !value.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    value.parse::<u32>().ok().filter(|value| *value > 0)
}

/// Vector and animated images are served as-is.
pub fn is_resize_exempt(path: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            EXEMPT_EXTENSIONS
                .iter()
                .any(|exempt| ext.eq_ignore_ascii_case(exempt))
        })
        .unwrap_or(false)
}

pub fn reduced_variant_path(path: &str) -> String {
    let (dir, file) = match path.rsplit_once('/') {
        Some((dir, file)) => (Some(dir), file),
        None => (None, path),
    };
    let reduced = match file.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem}{REDUCED_SUFFIX}.{ext}"),
        _ => format!("{file}{REDUCED_SUFFIX}"),
    };
    match dir {
        Some(dir) => format!("{dir}/{reduced}"),
        None => reduced,
    }
}

pub fn original_of_reduced(path: &str) -> Option<String> {
    let (dir, file) = match path.rsplit_once('/') {
        Some((dir, file)) => (Some(dir), file),
        None => (None, path),
    };
    let original = match file.rsplit_once('.') {
        Some((stem, ext)) => format!("{}.{ext}", stem.strip_suffix(REDUCED_SUFFIX)?),
        None => file.strip_suffix(REDUCED_SUFFIX)?.to_string(),
    };
    if original.is_empty() || original.starts_with('.') {
        return None;
    }
    Some(match dir {
        Some(dir) => format!("{dir}/{original}"),
        None => original,
    })
}

pub fn magick_args(
    source: &Path,
    spec: ResizeSpec,
    quality: u8,
    destination: &Path,
) -> Vec<OsString> {
    vec![
        source.as_os_str().to_os_string(),
        OsString::from("-resize"),
        OsString::from(spec.to_string()),
        OsString::from("-quality"),
        OsString::from(quality.to_string()),
        destination.as_os_str().to_os_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_only_shrinks() {
        assert_eq!(get_resize_arg("My Image |500").as_deref(), Some("500x>"));
    }

    #[test]
    fn height_only_shrinks() {
        assert_eq!(get_resize_arg("My Image |x600").as_deref(), Some("x600>"));
    }

    #[test]
    fn both_dimensions_fit_box() {
        assert_eq!(get_resize_arg("My Image |640x480").as_deref(), Some("640x480"));
        assert_eq!(
            parse_resize_directive("My Image|640x480"),
            Some(ResizeSpec::Fit {
                width: 640,
                height: 480
            })
        );
    }

    #[test]
    fn unrecognized_directives_are_ignored() {
        assert_eq!(get_resize_arg("My Image"), None);
        assert_eq!(get_resize_arg("My Image |invalid"), None);
        assert_eq!(get_resize_arg("My Image |640x480x2"), None);
        assert_eq!(get_resize_arg("My Image |x"), None);
        assert_eq!(get_resize_arg("My Image |0"), None);
        assert_eq!(get_resize_arg("My Image |"), None);
    }

    #[test]
    fn last_pipe_carries_the_directive() {
        assert_eq!(get_resize_arg("left | right |300").as_deref(), Some("300x>"));
    }

    #[test]
    fn svg_and_gif_are_exempt() {
        assert!(is_resize_exempt("diagram.svg"));
        assert!(is_resize_exempt("anim.GIF"));
        assert!(!is_resize_exempt("photo.jpg"));
        assert!(!is_resize_exempt("noext"));
    }

    #[test]
    fn reduced_variant_keeps_directory_and_extension() {
        assert_eq!(reduced_variant_path("cat.jpg"), "cat_reduced.jpg");
        assert_eq!(reduced_variant_path("trip/cat.photo.png"), "trip/cat.photo_reduced.png");
        assert_eq!(reduced_variant_path("README"), "README_reduced");
    }

    #[test]
    fn reduced_variant_maps_back_to_original() {
        assert_eq!(original_of_reduced("cat_reduced.jpg").as_deref(), Some("cat.jpg"));
        assert_eq!(
            original_of_reduced("trip/cat_reduced.png").as_deref(),
            Some("trip/cat.png")
        );
        assert_eq!(original_of_reduced("cat.jpg"), None);
        assert_eq!(original_of_reduced("_reduced.jpg"), None);
    }

    #[test]
    fn magick_args_follow_source_spec_quality_destination() {
        let args = magick_args(
            Path::new("img/cat.jpg"),
            ResizeSpec::Width(500),
            85,
            Path::new("img/cat_reduced.jpg"),
        );
        let args = args
            .iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect::<Vec<_>>();
        assert_eq!(
            args,
            vec![
                "img/cat.jpg",
                "-resize",
                "500x>",
                "-quality",
                "85",
                "img/cat_reduced.jpg"
            ]
        );
    }
}
