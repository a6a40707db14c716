//! Patient management: typed form-submission drafts, validation, and the
//! add/update/delete flows that keep the dataset and the two tables in
//! step. Validation always runs to completion before any mutation or file
//! I/O; the dataset is mutated before persistence, so a failed table write
//! leaves memory in the newer state and the files in the older one.

use std::path::PathBuf;
use std::str::FromStr;

use crate::config::Settings;
use crate::error::{PapilaError, Result};
use crate::images::save_patient_image;
use crate::models::{
    CrystallineStatus, DiagnosisStatus, Eye, EyeData, Gender, PapilaDataset, Patient,
    RefractiveError,
};
use crate::store::writer::{delete_patient_rows, upsert_patient};

pub use crate::resolver::generate_patient_id;

/// Per-eye form submission. Enum fields arrive as the names the form shows
/// (numeric codes are accepted too); measurements are already numeric or
/// left blank.
#[derive(Debug, Clone, Default)]
pub struct EyeDraft {
    pub diagnosis: String,
    pub sphere: Option<f64>,
    pub cylinder: Option<f64>,
    pub axis: Option<f64>,
    pub crystalline_status: Option<String>,
    pub pneumatic_iop: Option<f64>,
    pub perkins_iop: Option<f64>,
    pub pachymetry: Option<f64>,
    pub axial_length: Option<f64>,
    pub mean_defect: Option<f64>,
    /// Source file selected in the form, copied into the image directory
    /// under the canonical name on save.
    pub image: Option<PathBuf>,
}

#[derive(Debug, Clone, Default)]
pub struct PatientDraft {
    pub patient_id: String,
    pub age: String,
    pub gender: String,
    pub right_eye: Option<EyeDraft>,
    pub left_eye: Option<EyeDraft>,
}

fn parse_code_or_name<T>(field: &str, raw: &str) -> Result<T>
where
    T: FromStr<Err = PapilaError>,
{
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(PapilaError::Validation(format!("{field} is required")));
    }
    trimmed.parse()
}

fn parse_gender(raw: &str) -> Result<Gender> {
    if let Ok(code) = raw.trim().parse::<i64>() {
        return Gender::from_code(code);
    }
    parse_code_or_name("gender", raw)
}

fn parse_diagnosis(raw: &str) -> Result<DiagnosisStatus> {
    if let Ok(code) = raw.trim().parse::<i64>() {
        return DiagnosisStatus::from_code(code);
    }
    parse_code_or_name("diagnosis", raw)
}

fn parse_crystalline(raw: &str) -> Result<CrystallineStatus> {
    if let Ok(code) = raw.trim().parse::<i64>() {
        return CrystallineStatus::from_code(code);
    }
    parse_code_or_name("crystalline status", raw)
}

fn parse_age(raw: &str) -> Result<u32> {
    let age: u32 = raw
        .trim()
        .parse()
        .map_err(|_| PapilaError::Validation(format!("age must be a whole number, got {raw:?}")))?;
    if age == 0 {
        return Err(PapilaError::Validation("age must be positive".into()));
    }
    Ok(age)
}

fn build_eye(draft: &EyeDraft, eye: Eye) -> Result<EyeData> {
    let mut eye_data = EyeData::new(eye, parse_diagnosis(&draft.diagnosis)?);

    match draft.sphere {
        Some(sphere) => {
            eye_data.refractive_error = Some(
                RefractiveError::new(sphere)
                    .with_cylinder(draft.cylinder)
                    .with_axis(draft.axis),
            );
        }
        None if draft.cylinder.is_some() || draft.axis.is_some() => {
            return Err(PapilaError::Validation(
                "cylinder/axis require a sphere value".into(),
            ));
        }
        None => {}
    }

    if let Some(raw) = draft.crystalline_status.as_deref() {
        if !raw.trim().is_empty() {
            eye_data.crystalline_status = Some(parse_crystalline(raw)?);
        }
    }
    eye_data.pneumatic_iop = draft.pneumatic_iop;
    eye_data.perkins_iop = draft.perkins_iop;
    eye_data.pachymetry = draft.pachymetry;
    eye_data.axial_length = draft.axial_length;
    eye_data.mean_defect = draft.mean_defect;
    Ok(eye_data)
}

/// Validate a draft and build the patient, copying any submitted images
/// into the image directory under canonical names. All validation happens
/// before the first file is touched.
pub fn build_patient(draft: &PatientDraft, settings: &Settings) -> Result<Patient> {
    let patient_id = draft.patient_id.trim();
    if patient_id.is_empty() {
        return Err(PapilaError::Validation("patient ID is required".into()));
    }
    let age = parse_age(&draft.age)?;
    let gender = parse_gender(&draft.gender)?;

    // Validate both eyes up front so a bad left eye cannot leave a
    // half-copied right-eye image behind.
    let mut right = draft
        .right_eye
        .as_ref()
        .map(|d| build_eye(d, Eye::Right))
        .transpose()?;
    let mut left = draft
        .left_eye
        .as_ref()
        .map(|d| build_eye(d, Eye::Left))
        .transpose()?;

    for (eye_data, eye_draft) in [
        (right.as_mut(), draft.right_eye.as_ref()),
        (left.as_mut(), draft.left_eye.as_ref()),
    ] {
        let (Some(eye_data), Some(eye_draft)) = (eye_data, eye_draft) else {
            continue;
        };
        if let Some(source) = &eye_draft.image {
            match save_patient_image(source, patient_id, eye_data.eye, &settings.images_dir) {
                Ok(stored) => eye_data.set_fundus_image(stored),
                Err(error) => {
                    tracing::warn!(patient_id, %error, "could not store submitted image");
                }
            }
        }
    }

    let mut patient = Patient::new(patient_id, age, gender);
    if let Some(eye_data) = right {
        patient.set_eye_data(eye_data);
    }
    if let Some(eye_data) = left {
        patient.set_eye_data(eye_data);
    }
    Ok(patient)
}

/// Add a new patient: validate, insert into the dataset, append rows to
/// both tables. Rejects an ID that already exists in any of its forms.
pub fn add_patient(
    dataset: &mut PapilaDataset,
    draft: &PatientDraft,
    settings: &Settings,
) -> Result<()> {
    if dataset.get_patient(&draft.patient_id).is_some() {
        return Err(PapilaError::Validation(format!(
            "patient {} already exists",
            draft.patient_id
        )));
    }
    let patient = build_patient(draft, settings)?;
    dataset.add_patient(patient.clone());
    upsert_patient(&patient, &settings.od_table, &settings.os_table, false)?;
    tracing::info!(patient_id = %patient.patient_id, "patient added");
    Ok(())
}

/// Replace an existing patient: validate, swap the dataset entry, rewrite
/// the tables with replace semantics for the ID.
pub fn update_patient(
    dataset: &mut PapilaDataset,
    draft: &PatientDraft,
    settings: &Settings,
) -> Result<()> {
    if dataset.get_patient(&draft.patient_id).is_none() {
        return Err(PapilaError::NotFound {
            entity: "patient".into(),
            id: draft.patient_id.clone(),
        });
    }
    let patient = build_patient(draft, settings)?;
    dataset.update_patient(patient.clone());
    upsert_patient(&patient, &settings.od_table, &settings.os_table, true)?;
    tracing::info!(patient_id = %patient.patient_id, "patient updated");
    Ok(())
}

/// Remove a patient from the dataset and both tables. Returns whether the
/// dataset held the patient; a missing ID is not an error, and the table
/// filter runs either way.
pub fn delete_patient(
    dataset: &mut PapilaDataset,
    patient_id: &str,
    settings: &Settings,
) -> Result<bool> {
    let removed = dataset.remove_patient(patient_id);
    delete_patient_rows(patient_id, &settings.od_table, &settings.os_table)?;
    if removed {
        tracing::info!(patient_id, "patient deleted");
    } else {
        tracing::warn!(patient_id, "delete requested for unknown patient");
    }
    Ok(removed)
}
