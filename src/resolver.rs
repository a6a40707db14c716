//! Identifier and filename resolution for fundus images.
//!
//! Canonical rule: `RET{cleanId}{OD|OS}.jpg`, where the clean ID is the
//! patient ID minus `#` decoration. Lookup falls back to a zero-stripped
//! numeric variant and finally a case-insensitive directory scan. Also
//! home of the correlative numbering used to mint new patient IDs and new
//! image sequence numbers (independent counters).

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{PapilaError, Result};
use crate::models::{Eye, PapilaDataset};

/// Digit run between the `RET` prefix and the first `O` of the eye suffix,
/// matched against the uppercased filename.
static CORRELATIVE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^RET(\d+)O.*\.(JPG|JPEG|PNG)$").unwrap());

/// Digit run directly after `RET`, for numeric comparison during scans.
static RET_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^RET(\d+)O").unwrap());

/// Strip `#` decoration and surrounding whitespace from a patient ID.
pub fn clean_patient_id(patient_id: &str) -> String {
    patient_id.replace('#', "").trim().to_string()
}

/// Canonical image filename for a patient and eye, e.g. `RET007OD.jpg`.
pub fn canonical_image_name(patient_id: &str, eye: Eye) -> String {
    format!("RET{}{}.jpg", clean_patient_id(patient_id), eye.suffix())
}

/// All-digit ID with its left zero padding removed, when that differs from
/// the input.
fn zero_stripped(clean_id: &str) -> Option<String> {
    if clean_id.is_empty() || !clean_id.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let stripped = clean_id.trim_start_matches('0');
    let stripped = if stripped.is_empty() { "0" } else { stripped };
    (stripped != clean_id).then(|| stripped.to_string())
}

/// Locate the fundus image for a patient and eye.
///
/// Resolution order: exact canonical name, canonical name with leading
/// zeros stripped, then a directory scan accepting any name whose
/// uppercased form starts with `RET{cleanId}` (either variant) and ends
/// with `{suffix}.JPG`. Scan candidates are sorted so an ambiguous match
/// resolves the same way on every platform. A miss is `ImageNotFound`,
/// distinct from an I/O failure while scanning.
pub fn find_image(patient_id: &str, eye: Eye, images_dir: &Path) -> Result<PathBuf> {
    let not_found = || PapilaError::ImageNotFound {
        patient_id: patient_id.to_string(),
        eye: eye.suffix().to_string(),
    };

    if !images_dir.exists() {
        tracing::warn!(dir = %images_dir.display(), "image directory does not exist");
        return Err(not_found());
    }

    let clean_id = clean_patient_id(patient_id);
    let suffix = eye.suffix();

    let mut names = vec![format!("RET{clean_id}{suffix}.jpg")];
    if let Some(stripped) = zero_stripped(&clean_id) {
        names.push(format!("RET{stripped}{suffix}.jpg"));
    }

    for name in &names {
        let path = images_dir.join(name);
        if path.exists() {
            tracing::info!(path = %path.display(), "fundus image found");
            return Ok(path);
        }
    }

    let mut prefixes = vec![format!("RET{clean_id}").to_uppercase()];
    if let Some(stripped) = zero_stripped(&clean_id) {
        prefixes.push(format!("RET{stripped}").to_uppercase());
    }
    let end = format!("{suffix}.JPG");
    let clean_numeric: Option<u64> = clean_id.parse().ok();

    let mut matches: Vec<String> = Vec::new();
    for entry in fs::read_dir(images_dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        let upper = name.to_uppercase();
        if !upper.ends_with(&end) {
            continue;
        }
        // Prefix match covers the literal ID forms; the numeric comparison
        // covers padding drift in either direction (query `7` against
        // `RET007OD.jpg` and vice versa).
        let prefix_hit = prefixes.iter().any(|p| upper.starts_with(p));
        let numeric_hit = match (clean_numeric, RET_NUMBER_RE.captures(&upper)) {
            (Some(wanted), Some(caps)) => caps[1].parse::<u64>().ok() == Some(wanted),
            _ => false,
        };
        if prefix_hit || numeric_hit {
            matches.push(name);
        }
    }
    matches.sort();

    if let Some(first) = matches.first() {
        let path = images_dir.join(first);
        tracing::info!(path = %path.display(), "fundus image found by pattern scan");
        return Ok(path);
    }

    tracing::warn!(patient_id, eye = suffix, "no fundus image found");
    Err(not_found())
}

/// Next free patient number: decoration-stripped numeric IDs in the dataset,
/// max + 1, or 1 when none parse.
pub fn next_patient_number(dataset: &PapilaDataset) -> u64 {
    dataset
        .patient_ids()
        .filter_map(|id| clean_patient_id(id).parse::<u64>().ok())
        .max()
        .map_or(1, |max| max + 1)
}

/// Mint a fresh `#`-prefixed patient ID, zero-padded to at least 3 digits.
pub fn generate_patient_id(dataset: &PapilaDataset) -> String {
    format!("#{:03}", next_patient_number(dataset))
}

/// Next free image sequence number from the `RET<digits><O...>` filenames in
/// the image directory. Creates the directory when absent and starts at 1.
pub fn next_correlative_number(images_dir: &Path) -> Result<u32> {
    if !images_dir.exists() {
        tracing::info!(dir = %images_dir.display(), "creating image directory");
        fs::create_dir_all(images_dir)?;
        return Ok(1);
    }

    let mut max = 0u32;
    for entry in fs::read_dir(images_dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_uppercase();
        if let Some(caps) = CORRELATIVE_RE.captures(&name) {
            match caps[1].parse::<u32>() {
                Ok(n) => max = max.max(n),
                Err(_) => {
                    tracing::warn!(filename = %name, "correlative digits out of range");
                }
            }
        }
    }
    Ok(max + 1)
}

/// Filename for a brand-new image using the next correlative number,
/// e.g. `RET004OS.jpg`.
pub fn correlative_image_name(eye: Eye, images_dir: &Path) -> Result<String> {
    let number = next_correlative_number(images_dir)?;
    let name = format!("RET{:03}{}.jpg", number, eye.suffix());
    tracing::debug!(name, "generated correlative image name");
    Ok(name)
}
