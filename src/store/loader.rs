//! Merge the two per-eye tables into the in-memory dataset.
//!
//! The union of patient IDs across both tables drives the merge; at most
//! one row per ID per table is expected and the first match is used.
//! Demographics come from the OD row when both tables have one. A missing
//! diagnosis cell means "no record for that eye", not healthy. Bad rows are
//! logged and skipped; the load continues.

use std::path::Path;

use crate::error::{PapilaError, Result};
use crate::images::resolve_display_path;
use crate::models::{
    normalize_id, CrystallineStatus, DiagnosisStatus, Eye, EyeData, Gender, PapilaDataset,
    Patient, RefractiveError,
};
use crate::resolver::find_image;
use crate::store::table::{read_table, Row, Table};

pub fn load_dataset(od_path: &Path, os_path: &Path, images_dir: &Path) -> Result<PapilaDataset> {
    let od = read_checked(od_path)?;
    let os = read_checked(os_path)?;

    let mut ids: Vec<String> = Vec::new();
    for table in [&od, &os] {
        for row in &table.rows {
            if let Some(id) = row.opt_str("patient_id") {
                if !ids.iter().any(|seen| normalize_id(seen) == normalize_id(id)) {
                    ids.push(id.to_string());
                }
            }
        }
    }

    let mut dataset = PapilaDataset::new();
    for id in &ids {
        let od_row = first_row_for(&od, id);
        let os_row = first_row_for(&os, id);
        match build_patient(id, od_row, os_row, images_dir) {
            Ok(patient) => dataset.add_patient(patient),
            Err(error) => {
                tracing::warn!(patient_id = %id, %error, "skipping unloadable record");
            }
        }
    }

    tracing::info!(
        patients = dataset.len(),
        od = %od_path.display(),
        os = %os_path.display(),
        "dataset loaded"
    );
    Ok(dataset)
}

fn read_checked(path: &Path) -> Result<Table> {
    let table = read_table(path)?;
    if !table.has_column("patient_id") {
        return Err(PapilaError::MissingColumn {
            column: "patient_id".into(),
            table: path.display().to_string(),
        });
    }
    Ok(table)
}

fn first_row_for<'a>(table: &'a Table, patient_id: &str) -> Option<&'a Row> {
    let wanted = normalize_id(patient_id);
    table
        .rows
        .iter()
        .find(|row| row.opt_str("patient_id").is_some_and(|id| normalize_id(id) == wanted))
}

fn build_patient(
    patient_id: &str,
    od_row: Option<&Row>,
    os_row: Option<&Row>,
    images_dir: &Path,
) -> Result<Patient> {
    // General demographic fields are expected to be duplicated across the
    // tables; the right-eye table wins when both carry a row.
    let demo = od_row.or(os_row).ok_or_else(|| PapilaError::NotFound {
        entity: "patient row".into(),
        id: patient_id.into(),
    })?;

    let age = demo.req_i64("age")?;
    if age <= 0 {
        return Err(PapilaError::Validation(format!(
            "age must be positive, got {age}"
        )));
    }
    let gender = Gender::from_code(demo.req_i64("gender")?)?;

    let mut patient = Patient::new(patient_id, age as u32, gender);
    for (row, eye) in [(od_row, Eye::Right), (os_row, Eye::Left)] {
        if let Some(row) = row {
            if row.opt_str("diagnosis").is_some() {
                patient.set_eye_data(eye_from_row(row, eye, patient_id, images_dir)?);
            }
        }
    }
    Ok(patient)
}

fn eye_from_row(row: &Row, eye: Eye, patient_id: &str, images_dir: &Path) -> Result<EyeData> {
    let diagnosis = DiagnosisStatus::from_code(row.req_i64("diagnosis")?)?;
    let mut eye_data = EyeData::new(eye, diagnosis);

    if let Some(sphere) = row.opt_f64("sphere")? {
        eye_data.refractive_error = Some(
            RefractiveError::new(sphere)
                .with_cylinder(row.opt_f64("cylinder")?)
                .with_axis(row.opt_f64("axis")?),
        );
    }
    if let Some(code) = row.opt_i64("crystalline_status")? {
        eye_data.crystalline_status = Some(CrystallineStatus::from_code(code)?);
    }
    eye_data.pneumatic_iop = row.opt_f64("pneumatic_iop")?;
    eye_data.perkins_iop = row.opt_f64("perkins_iop")?;
    eye_data.pachymetry = row.opt_f64("pachymetry")?;
    eye_data.axial_length = row.opt_f64("axial_length")?;
    eye_data.mean_defect = row.opt_f64("mean_defect")?;

    // Resolver first, stored path column as fallback.
    match find_image(patient_id, eye, images_dir) {
        Ok(path) => eye_data.set_fundus_image(path),
        Err(PapilaError::ImageNotFound { .. }) => {
            if let Some(stored) = row.opt_str("image_path") {
                match resolve_display_path(stored, images_dir) {
                    Ok(path) => eye_data.set_fundus_image(path),
                    Err(_) => {
                        tracing::debug!(patient_id, stored, "stored image path unavailable");
                    }
                }
            }
        }
        Err(other) => return Err(other),
    }

    Ok(eye_data)
}
