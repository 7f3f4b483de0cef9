//! Photo loading and fitting for reports

use super::document::Photo;
use crate::config::{PHOTO_MAX_HEIGHT_MM, PHOTO_MAX_WIDTH_MM};
use crate::error::{AppError, Result};
use crate::storage::{uploads, UploadsStore};
use image::io::Reader as ImageReader;
use std::io::ErrorKind;

/// Millimetres per PDF point. At 1:1 one image pixel covers one point.
pub const MM_PER_POINT: f32 = 25.4 / 72.0;

/// What became of a photo reference
#[derive(Debug)]
pub enum PhotoOutcome {
    Embedded(Photo),
    /// Nothing at the resolved location
    Missing(String),
    /// A file exists but is not a decodable image
    Unreadable { name: String, reason: String },
}

/// Size in millimetres of an image scaled to fit the box, keeping its aspect
/// ratio and never enlarging it beyond 1:1. `None` for degenerate images.
pub fn fit_within(
    width_px: u32,
    height_px: u32,
    max_width_mm: f32,
    max_height_mm: f32,
) -> Option<(f32, f32)> {
    if width_px == 0 || height_px == 0 {
        return None;
    }

    let natural_width = width_px as f32 * MM_PER_POINT;
    let natural_height = height_px as f32 * MM_PER_POINT;

    let ratio = (max_width_mm / natural_width)
        .min(max_height_mm / natural_height)
        .min(1.0);

    Some((natural_width * ratio, natural_height * ratio))
}

/// Resolve a stored reference in the uploads directory and decode it.
///
/// Missing and undecodable files are outcomes, not errors. An error means
/// the reference itself is unusable or the file system misbehaved.
pub fn load_photo(uploads: &UploadsStore, reference: &str) -> Result<PhotoOutcome> {
    let path = uploads
        .resolve(reference)
        .ok_or_else(|| AppError::Report(format!("Unusable photo reference: {:?}", reference)))?;
    let name = uploads::base_name(reference).unwrap_or(reference).to_string();

    match std::fs::metadata(&path) {
        Ok(meta) if meta.is_file() => {}
        Ok(_) => return Ok(PhotoOutcome::Missing(name)),
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(PhotoOutcome::Missing(name)),
        Err(e) => return Err(e.into()),
    }

    let decoded = ImageReader::open(&path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|e| e.to_string())
        .and_then(|reader| reader.decode().map_err(|e| e.to_string()));

    let image = match decoded {
        Ok(image) => image,
        Err(reason) => {
            tracing::warn!("Could not decode photo {:?}: {}", path, reason);
            return Ok(PhotoOutcome::Unreadable { name, reason });
        }
    };

    let Some((width_mm, height_mm)) = fit_within(
        image.width(),
        image.height(),
        PHOTO_MAX_WIDTH_MM,
        PHOTO_MAX_HEIGHT_MM,
    ) else {
        return Ok(PhotoOutcome::Unreadable {
            name,
            reason: "image has no pixels".to_string(),
        });
    };

    Ok(PhotoOutcome::Embedded(Photo {
        image,
        width_mm,
        height_mm,
    }))
}
