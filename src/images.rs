//! Fundus image file operations: copying newly submitted photographs into
//! the image directory under canonical names, resolving stored paths for
//! display, and thumbnail loading for the viewer.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use image::DynamicImage;

use crate::error::{PapilaError, Result};
use crate::models::Eye;
use crate::resolver::canonical_image_name;

/// Stored paths may carry Windows separators from the source spreadsheets.
pub fn normalize_stored_path(path: &str) -> PathBuf {
    if cfg!(windows) {
        PathBuf::from(path)
    } else {
        PathBuf::from(path.replace('\\', "/"))
    }
}

/// Copy a source image into the image directory under the canonical name
/// for the patient and eye, returning the destination path.
///
/// The directory is created when missing and a pre-existing destination
/// file is replaced. When source and destination are already the same path
/// the copy is skipped and the path still returned. A missing source is an
/// I/O error.
pub fn copy_image_to_destination(
    source: &Path,
    patient_id: &str,
    eye: Eye,
    images_dir: &Path,
) -> Result<PathBuf> {
    let dest = images_dir.join(canonical_image_name(patient_id, eye));
    fs::create_dir_all(images_dir)?;

    if source == dest {
        tracing::debug!(path = %dest.display(), "source already at destination, skipping copy");
        return Ok(dest);
    }

    if !source.exists() {
        tracing::error!(path = %source.display(), "source image does not exist");
        return Err(PapilaError::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("source image does not exist: {}", source.display()),
        )));
    }

    if dest.exists() {
        tracing::info!(path = %dest.display(), "replacing existing image");
        fs::remove_file(&dest)?;
    }

    fs::copy(source, &dest)?;
    tracing::info!(from = %source.display(), to = %dest.display(), "image copied");
    Ok(dest)
}

/// Store a form-submitted image for a patient. Thin wrapper over the copy
/// operation that logs the outcome per the operation name the UI reports.
pub fn save_patient_image(
    source: &Path,
    patient_id: &str,
    eye: Eye,
    images_dir: &Path,
) -> Result<PathBuf> {
    if !source.exists() {
        tracing::warn!(path = %source.display(), patient_id, "no image to save");
        return Err(PapilaError::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("source image does not exist: {}", source.display()),
        )));
    }
    let stored = copy_image_to_destination(source, patient_id, eye, images_dir)?;
    tracing::info!(patient_id, eye = eye.suffix(), path = %stored.display(), "patient image saved");
    Ok(stored)
}

/// Resolve a stored image path for display: the path itself when it exists,
/// otherwise its basename under the image directory. A miss on both is a
/// not-found signal for the caller to render an unavailable state.
pub fn resolve_display_path(stored: &str, images_dir: &Path) -> Result<PathBuf> {
    let normalized = normalize_stored_path(stored);
    if normalized.exists() {
        return Ok(normalized);
    }

    if let Some(base) = normalized.file_name() {
        let alt = images_dir.join(base);
        if alt.exists() {
            tracing::info!(path = %alt.display(), "image found at alternate path");
            return Ok(alt);
        }
    }

    tracing::warn!(stored, "stored image path does not resolve");
    Err(PapilaError::NotFound {
        entity: "image".into(),
        id: stored.into(),
    })
}

/// Decode an image and shrink it to fit a square of `max_dim`, preserving
/// aspect ratio. The only image transformation the tool performs.
pub fn load_thumbnail(path: &Path, max_dim: u32) -> Result<DynamicImage> {
    if !path.exists() {
        return Err(PapilaError::NotFound {
            entity: "image".into(),
            id: path.display().to_string(),
        });
    }
    let img = image::open(path)?;
    tracing::debug!(path = %path.display(), width = img.width(), height = img.height(), "image decoded");
    Ok(img.thumbnail(max_dim, max_dim))
}
