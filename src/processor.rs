//! Sprite Preparation
//!
//! Turns a raw building render into a grid-ready sprite:
//! 1. Background Removal - corner-sampled colors become fully transparent
//! 2. Trim - crop to the bounding box of what is left
//! 3. Resize - scale to the fixed sprite width, keeping aspect ratio
//!
//! Everything here operates on in-memory `RgbaImage` data. File handling
//! lives in `batch`, so the whole pipeline can be exercised without touching
//! the filesystem.

use image::imageops::{self, FilterType};
use image::{ImageBuffer, Rgba, Rgba32FImage, RgbaImage};
use log::debug;
use std::io::Cursor;
use std::path::Path;
use crate::background::{clear_background, detect_background_colors};
use crate::error::{Result, SpriteError};

// ============================================================================
// SETTINGS
// ============================================================================

#[derive(Debug, Clone)]
pub struct RemoverSettings {
    /// Distance in pixels of the second sample from each corner (default: 10)
    pub sample_inset: u32,
    /// Per-channel difference below which two samples share a cluster (default: 10)
    pub cluster_threshold: u8,
    /// Classification tolerance when one background color is found (default: 25)
    pub solid_tolerance: u8,
    /// Classification tolerance for checkerboard backgrounds (default: 35)
    pub checker_tolerance: u8,
    /// Output sprite width in pixels (default: 160)
    pub target_width: u32,
    /// Resampling filter used for the final resize (default: Lanczos3)
    pub filter: FilterType,
}

impl Default for RemoverSettings {
    fn default() -> Self {
        Self {
            sample_inset: 10,
            cluster_threshold: 10,
            solid_tolerance: 25,
            checker_tolerance: 35,
            target_width: 160,
            filter: FilterType::Lanczos3,
        }
    }
}

/// Inclusive bounding box of the opaque pixels in an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

impl BoundingBox {
    pub fn width(&self) -> u32 {
        self.max_x - self.min_x + 1
    }

    pub fn height(&self) -> u32 {
        self.max_y - self.min_y + 1
    }
}

#[derive(Debug, Clone)]
pub struct PreparedSprite {
    pub image: RgbaImage,
    pub original_size: (u32, u32),
    pub crop: BoundingBox,
    pub background_colors: usize,
}

/// Result of running the pipeline on one image
#[derive(Debug, Clone)]
pub enum Prepared {
    Sprite(PreparedSprite),
    /// Nothing survived background removal; the source should be left alone
    AllBackground { background_colors: usize },
}

// ============================================================================
// TRIM
// ============================================================================

/// Bounding box of all pixels with alpha > 0, or `None` if there are none
pub fn bounding_box(img: &RgbaImage) -> Option<BoundingBox> {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return None;
    }

    let mut min_x = width;
    let mut max_x = 0;
    let mut min_y = height;
    let mut max_y = 0;

    for (x, y, pixel) in img.enumerate_pixels() {
        if pixel[3] > 0 {
            min_x = min_x.min(x);
            max_x = max_x.max(x);
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }
    }

    if min_x > max_x || min_y > max_y {
        return None;
    }

    Some(BoundingBox { min_x, min_y, max_x, max_y })
}

pub fn crop_to(img: &RgbaImage, bbox: &BoundingBox) -> RgbaImage {
    imageops::crop_imm(img, bbox.min_x, bbox.min_y, bbox.width(), bbox.height()).to_image()
}

// ============================================================================
// RESIZE
// ============================================================================

/// Height that keeps `width:height` when scaled to `target_width`.
///
/// Never returns 0: a very wide strip still keeps one row.
pub fn scaled_height(width: u32, height: u32, target_width: u32) -> u32 {
    let exact = target_width as f64 * height as f64 / width as f64;
    (exact.round() as u32).max(1)
}

/// Normalized float copy with color channels multiplied by alpha, so that
/// transparent pixels carry no color into the resampling kernel.
fn premultiply(img: &RgbaImage) -> Rgba32FImage {
    ImageBuffer::from_fn(img.width(), img.height(), |x, y| {
        let p = img.get_pixel(x, y);
        let a = p[3] as f32 / 255.0;
        Rgba([
            p[0] as f32 / 255.0 * a,
            p[1] as f32 / 255.0 * a,
            p[2] as f32 / 255.0 * a,
            a,
        ])
    })
}

fn unpremultiply(img: &Rgba32FImage) -> RgbaImage {
    ImageBuffer::from_fn(img.width(), img.height(), |x, y| {
        let p = img.get_pixel(x, y);
        let a = p[3].clamp(0.0, 1.0);
        let alpha = (a * 255.0).round() as u8;
        if alpha == 0 {
            return Rgba([0, 0, 0, 0]);
        }
        let channel = |c: f32| (c / a * 255.0).round().clamp(0.0, 255.0) as u8;
        Rgba([channel(p[0]), channel(p[1]), channel(p[2]), alpha])
    })
}

/// Scale to `settings.target_width`, resampling in premultiplied alpha.
pub fn resize_to_width(img: &RgbaImage, settings: &RemoverSettings) -> RgbaImage {
    let (width, height) = img.dimensions();
    let target_height = scaled_height(width, height, settings.target_width);
    let resized = imageops::resize(
        &premultiply(img),
        settings.target_width,
        target_height,
        settings.filter,
    );
    unpremultiply(&resized)
}

// ============================================================================
// MAIN ENTRY POINT
// ============================================================================

/// Remove the background from `img`, trim it and scale it to sprite width.
///
/// Returns `Prepared::AllBackground` when every pixel was classified as
/// background, in which case the caller should keep the original untouched.
pub fn prepare_sprite(img: &RgbaImage, settings: &RemoverSettings) -> Result<Prepared> {
    let original_size = img.dimensions();
    if original_size.0 == 0 || original_size.1 == 0 {
        return Err(SpriteError::InvalidParameter(format!(
            "Image has no pixels ({}x{})",
            original_size.0, original_size.1
        )));
    }
    if settings.target_width == 0 {
        return Err(SpriteError::InvalidParameter("Target width must be positive".to_string()));
    }

    // Step 1: Background removal
    let colors = detect_background_colors(img, settings);
    let tolerance = colors.tolerance(settings);
    let mut rgba = img.clone();
    let cleared = clear_background(&mut rgba, &colors, tolerance);
    debug!(
        "Cleared {} of {} pixels at tolerance {}",
        cleared,
        original_size.0 as u64 * original_size.1 as u64,
        tolerance
    );

    // Step 2: Trim
    let Some(crop) = bounding_box(&rgba) else {
        return Ok(Prepared::AllBackground { background_colors: colors.len() });
    };
    debug!("Cropping to {:?}", crop);
    let trimmed = crop_to(&rgba, &crop);

    // Step 3: Resize
    let image = resize_to_width(&trimmed, settings);

    Ok(Prepared::Sprite(PreparedSprite {
        image,
        original_size,
        crop,
        background_colors: colors.len(),
    }))
}

// ============================================================================
// IMAGE I/O
// ============================================================================

/// Load an image from disk as RGBA8
pub fn load_image(path: &Path) -> Result<RgbaImage> {
    let img = image::open(path)
        .map_err(|e| SpriteError::Processing(format!("Failed to load {}: {}", path.display(), e)))?;
    Ok(img.to_rgba8())
}

/// Encode image as PNG bytes
pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, image::ImageFormat::Png)
        .map_err(|e| SpriteError::Processing(format!("Failed to encode PNG: {}", e)))?;
    Ok(buffer.into_inner())
}

// ============================================================================
// TESTS
// ============================================================================
