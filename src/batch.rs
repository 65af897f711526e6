//! Batch processing over the building asset directory.
//!
//! Files are handled one at a time. A failure on one file is logged and
//! counted; it never stops the rest of the batch.

use log::{error, info};
use std::fs;
use std::path::{Path, PathBuf};
use crate::error::{Result, SpriteError};
use crate::processor::{self, Prepared, RemoverSettings};

/// Directory holding the building sprites, relative to the working directory
pub const BUILDINGS_DIR: &str = "public/assets/buildings/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Processed {
        background_colors: usize,
        final_size: (u32, u32),
    },
    /// Whole image was background; file left as it was
    Skipped,
}

#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub processed: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.processed.len() + self.skipped.len() + self.failed.len()
    }
}

/// All entries in `dir` whose file name ends in `.png` (case-sensitive),
/// sorted by path.
pub fn collect_pngs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let is_png = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.ends_with(".png"));
        if is_png {
            paths.push(entry.path());
        }
    }

    paths.sort();
    Ok(paths)
}

/// Prepare a single sprite and overwrite it in place.
pub fn process_file(path: &Path, settings: &RemoverSettings) -> Result<FileOutcome> {
    let img = processor::load_image(path)?;

    match processor::prepare_sprite(&img, settings)? {
        Prepared::AllBackground { .. } => Ok(FileOutcome::Skipped),
        Prepared::Sprite(sprite) => {
            let bytes = processor::encode_png(&sprite.image)?;
            replace_file(path, &bytes)?;
            Ok(FileOutcome::Processed {
                background_colors: sprite.background_colors,
                final_size: sprite.image.dimensions(),
            })
        }
    }
}

/// Write `bytes` next to `path` and rename over it, so the original is
/// either fully replaced or untouched.
fn replace_file(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp = PathBuf::from(tmp_name);

    if let Err(e) = fs::write(&tmp, bytes).and_then(|_| fs::rename(&tmp, path)) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}

/// Process every PNG in `dir`.
///
/// Only a missing or unreadable directory is an error; per-file problems
/// end up in `BatchReport::failed`.
pub fn process_directory(dir: &Path, settings: &RemoverSettings) -> Result<BatchReport> {
    if !dir.is_dir() {
        return Err(SpriteError::DirectoryNotFound(dir.to_path_buf()));
    }

    let mut report = BatchReport::default();

    for path in collect_pngs(dir)? {
        match process_file(&path, settings) {
            Ok(FileOutcome::Processed { background_colors, final_size }) => {
                info!(
                    "Processed {} with {} background colors detected ({}x{})",
                    path.display(),
                    background_colors,
                    final_size.0,
                    final_size.1
                );
                report.processed.push(path);
            }
            Ok(FileOutcome::Skipped) => {
                info!("Skipping {} - all transparent", path.display());
                report.skipped.push(path);
            }
            Err(e) => {
                error!("Error processing {}: {}", path.display(), e);
                report.failed.push((path, e.to_string()));
            }
        }
    }

    info!(
        "Done: {} processed, {} skipped, {} failed",
        report.processed.len(),
        report.skipped.len(),
        report.failed.len()
    );

    Ok(report)
}

/// Run the batch over `dir` with the default sprite settings
pub fn run(dir: &Path) -> Result<BatchReport> {
    process_directory(dir, &RemoverSettings::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba, RgbaImage};

    #[test]
    fn test_collect_pngs_filters_by_suffix() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.png", "a.png", "c.PNG", "notes.txt", "d.png.bak"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }

        let found = collect_pngs(dir.path()).unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.png", "b.png"]);
    }

    #[test]
    fn test_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = process_directory(&missing, &RemoverSettings::default()).unwrap_err();
        assert!(matches!(err, SpriteError::DirectoryNotFound(_)));
    }

    #[test]
    fn test_replace_file_leaves_no_temp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("house.png");
        fs::write(&path, b"old").unwrap();

        replace_file(&path, b"new").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"new");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_replace_file_failure_leaves_no_temp() {
        let dir = tempfile::tempdir().unwrap();
        // Renaming a file over a non-empty directory fails on every platform.
        let target = dir.path().join("blocked.png");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("keep"), b"x").unwrap();

        assert!(replace_file(&target, b"new").is_err());

        assert!(!dir.path().join("blocked.png.tmp").exists());
        assert!(target.is_dir());
    }

    #[test]
    fn test_process_file_skips_solid_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.png");
        let img: RgbaImage = ImageBuffer::from_pixel(24, 24, Rgba([10, 200, 10, 255]));
        img.save(&path).unwrap();
        let before = fs::read(&path).unwrap();

        let outcome = process_file(&path, &RemoverSettings::default()).unwrap();

        assert_eq!(outcome, FileOutcome::Skipped);
        assert_eq!(fs::read(&path).unwrap(), before);
    }

    #[test]
    fn test_process_file_reports_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tower.png");
        let img: RgbaImage = ImageBuffer::from_fn(60, 60, |x, y| {
            if (20..30).contains(&x) && (10..40).contains(&y) {
                Rgba([120, 60, 20, 255])
            } else {
                Rgba([255, 255, 255, 255])
            }
        });
        img.save(&path).unwrap();

        let outcome = process_file(&path, &RemoverSettings::default()).unwrap();

        assert_eq!(
            outcome,
            FileOutcome::Processed { background_colors: 1, final_size: (160, 480) }
        );
        let saved = image::open(&path).unwrap();
        assert_eq!((saved.width(), saved.height()), (160, 480));
    }
}
