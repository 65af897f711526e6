//! Background Detection
//!
//! Sprites arrive either on a solid fill or on a baked-in checkerboard that
//! imitates transparency. Both are recognised the same way:
//! 1. Sample ten pixels from the four corner regions
//! 2. Cluster the opaque samples into distinct background colors
//! 3. Classify every pixel against those clusters with a per-channel tolerance
//!
//! A single cluster means a solid background and gets the tight tolerance;
//! more than one means a checkerboard, whose compression noise needs the
//! looser one.

use image::{Rgba, RgbaImage};
use log::debug;
use crate::processor::RemoverSettings;

pub const SAMPLE_COUNT: usize = 10;

// ============================================================================
// CORNER SAMPLING
// ============================================================================

/// Fixed sample coordinates, two per corner: the corner itself and a point
/// `inset` pixels in along the edge.
///
/// Coordinates are clamped into the image, so images narrower or shorter
/// than `inset + 1` sample the far edge instead of wrapping around.
/// `width` and `height` must both be at least 1.
pub fn sample_points(width: u32, height: u32, inset: u32) -> [(u32, u32); SAMPLE_COUNT] {
    let right = width - 1;
    let bottom = height - 1;
    let near_x = inset.min(right);
    let near_y = inset.min(bottom);
    let far_x = right.saturating_sub(inset);

    [
        (0, 0),
        (near_x, 0),
        (0, near_y),
        (near_x, near_y),
        (right, 0),
        (far_x, 0),
        (0, bottom),
        (near_x, bottom),
        (right, bottom),
        (far_x, bottom),
    ]
}

// ============================================================================
// COLOR CLUSTERING
// ============================================================================

/// Distinct background colors found in the corner samples, in the order they
/// were first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackgroundColors {
    colors: Vec<[u8; 3]>,
}

impl BackgroundColors {
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn colors(&self) -> &[[u8; 3]] {
        &self.colors
    }

    /// Add `rgb` as a new cluster unless an existing one already matches it.
    /// Returns true if a cluster was added.
    pub fn insert(&mut self, rgb: [u8; 3], threshold: u8) -> bool {
        if self.colors.iter().any(|c| within(c, &rgb, threshold)) {
            return false;
        }
        self.colors.push(rgb);
        true
    }

    /// Classification tolerance: tight for a solid fill, loose otherwise.
    pub fn tolerance(&self, settings: &RemoverSettings) -> u8 {
        if self.colors.len() == 1 {
            settings.solid_tolerance
        } else {
            settings.checker_tolerance
        }
    }
}

/// True if every channel differs by strictly less than `threshold`.
fn within(a: &[u8; 3], b: &[u8; 3], threshold: u8) -> bool {
    a.iter()
        .zip(b.iter())
        .all(|(&x, &y)| x.abs_diff(y) < threshold)
}

/// Cluster the opaque corner samples of `img` into background colors.
///
/// Samples that are already partly transparent are ignored.
pub fn detect_background_colors(img: &RgbaImage, settings: &RemoverSettings) -> BackgroundColors {
    let (width, height) = img.dimensions();
    let mut found = BackgroundColors::default();

    if width == 0 || height == 0 {
        return found;
    }

    for (x, y) in sample_points(width, height, settings.sample_inset) {
        let pixel = img.get_pixel(x, y);
        if pixel[3] < 255 {
            continue;
        }
        found.insert([pixel[0], pixel[1], pixel[2]], settings.cluster_threshold);
    }

    debug!("Background clusters: {:?}", found.colors);
    found
}

// ============================================================================
// PIXEL CLASSIFICATION
// ============================================================================

/// A pixel is background if it is not fully opaque, or if it sits within
/// `tolerance` of any background color on all three channels.
pub fn is_background(pixel: &Rgba<u8>, colors: &BackgroundColors, tolerance: u8) -> bool {
    if pixel[3] < 255 {
        return true;
    }
    let rgb = [pixel[0], pixel[1], pixel[2]];
    colors.colors.iter().any(|bg| within(&rgb, bg, tolerance))
}

/// Replace every background pixel with (0, 0, 0, 0).
///
/// Returns the number of pixels cleared.
pub fn clear_background(img: &mut RgbaImage, colors: &BackgroundColors, tolerance: u8) -> usize {
    let mut cleared = 0;

    for pixel in img.pixels_mut() {
        if is_background(pixel, colors, tolerance) {
            *pixel = Rgba([0, 0, 0, 0]);
            cleared += 1;
        }
    }

    cleared
}
