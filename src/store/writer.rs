//! Persist the dataset back to the two per-eye tables. Every operation is a
//! full rewrite of the affected files; there is no in-place patching and no
//! transaction across the pair. A failed write surfaces as an error without
//! touching the in-memory dataset.

use std::path::Path;

use crate::error::Result;
use crate::models::{normalize_id, Eye, EyeData, PapilaDataset, Patient};
use crate::store::table::{read_table, write_table, Row, Table, COLUMNS};

fn common_cells(row: &mut Row, patient: &Patient) {
    row.set("patient_id", patient.patient_id.clone());
    row.set("age", patient.age.to_string());
    row.set("gender", patient.gender.code().to_string());
}

fn eye_cells(row: &mut Row, eye_data: &EyeData) {
    row.set("diagnosis", eye_data.diagnosis.code().to_string());
    if let Some(re) = &eye_data.refractive_error {
        row.set("sphere", re.sphere.to_string());
        if let Some(cylinder) = re.cylinder {
            row.set("cylinder", cylinder.to_string());
        }
        if let Some(axis) = re.axis {
            row.set("axis", axis.to_string());
        }
    }
    if let Some(status) = eye_data.crystalline_status {
        row.set("crystalline_status", status.code().to_string());
    }
    for (column, value) in [
        ("pneumatic_iop", eye_data.pneumatic_iop),
        ("perkins_iop", eye_data.perkins_iop),
        ("pachymetry", eye_data.pachymetry),
        ("axial_length", eye_data.axial_length),
        ("mean_defect", eye_data.mean_defect),
    ] {
        if let Some(v) = value {
            row.set(column, v.to_string());
        }
    }
    if let Some(image) = &eye_data.fundus_image {
        row.set("image_path", image.display().to_string());
    }
}

fn patient_row(patient: &Patient, eye: Eye) -> Row {
    let mut row = Row::new();
    common_cells(&mut row, patient);
    if let Some(eye_data) = patient.eye(eye) {
        eye_cells(&mut row, eye_data);
    }
    row
}

/// Rewrite both tables from scratch: one row per present eye per table.
pub fn write_dataset(dataset: &PapilaDataset, od_path: &Path, os_path: &Path) -> Result<()> {
    for (path, eye) in [(od_path, Eye::Right), (os_path, Eye::Left)] {
        let mut table = Table::empty();
        for patient in dataset.patients() {
            if patient.eye(eye).is_some() {
                table.rows.push(patient_row(patient, eye));
            }
        }
        write_table(path, &table)?;
    }
    tracing::info!(patients = dataset.len(), "dataset written to both tables");
    Ok(())
}

/// Append or replace the rows for one patient in both tables. In edit mode
/// any existing rows for the ID are removed first (replace semantics, not
/// merge-by-column). A row is emitted to each table even when that eye is
/// absent, so the demographics stay duplicated the way the sources are.
pub fn upsert_patient(
    patient: &Patient,
    od_path: &Path,
    os_path: &Path,
    edit_mode: bool,
) -> Result<()> {
    for (path, eye) in [(od_path, Eye::Right), (os_path, Eye::Left)] {
        let mut table = read_table(path)?;
        merge_canonical_columns(&mut table);
        if edit_mode {
            retain_other_patients(&mut table, &patient.patient_id);
        }
        table.rows.push(patient_row(patient, eye));
        write_table(path, &table)?;
    }
    tracing::info!(patient_id = %patient.patient_id, edit_mode, "patient rows upserted");
    Ok(())
}

/// Drop every row for the given ID from both tables.
pub fn delete_patient_rows(patient_id: &str, od_path: &Path, os_path: &Path) -> Result<()> {
    for path in [od_path, os_path] {
        let mut table = read_table(path)?;
        let before = table.rows.len();
        retain_other_patients(&mut table, patient_id);
        let removed = before - table.rows.len();
        write_table(path, &table)?;
        tracing::info!(patient_id, path = %path.display(), removed, "patient rows deleted");
    }
    Ok(())
}

fn retain_other_patients(table: &mut Table, patient_id: &str) {
    let wanted = normalize_id(patient_id);
    table.rows.retain(|row| {
        row.opt_str("patient_id")
            .map(normalize_id)
            .map_or(true, |id| id != wanted)
    });
}

/// Written files always carry the full canonical column set, in canonical
/// order, with any unexpected extra columns preserved at the end.
fn merge_canonical_columns(table: &mut Table) {
    let mut columns: Vec<String> = COLUMNS.iter().map(|c| c.to_string()).collect();
    for existing in &table.columns {
        if !columns.contains(existing) {
            columns.push(existing.clone());
        }
    }
    table.columns = columns;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DiagnosisStatus, Gender, RefractiveError};
    use crate::store::loader::load_dataset;

    fn sample_patient() -> Patient {
        let mut p = Patient::new("#001", 62, Gender::Male);
        let mut right = EyeData::new(Eye::Right, DiagnosisStatus::Glaucoma);
        right.refractive_error = Some(RefractiveError::new(-1.25).with_cylinder(Some(-0.5)));
        right.pneumatic_iop = Some(15.5);
        right.mean_defect = Some(-7.2);
        p.set_eye_data(right);
        p.set_eye_data(EyeData::new(Eye::Left, DiagnosisStatus::Healthy));
        p
    }

    #[test]
    fn round_trip_preserves_ids_and_eye_values() {
        let tmp = tempfile::tempdir().unwrap();
        let od = tmp.path().join("od.csv");
        let os = tmp.path().join("os.csv");
        let images = tmp.path().join("images");

        let mut ds = PapilaDataset::new();
        ds.add_patient(sample_patient());
        let mut other = Patient::new("#002", 48, Gender::Female);
        other.set_eye_data(EyeData::new(Eye::Left, DiagnosisStatus::Suspect));
        ds.add_patient(other);

        write_dataset(&ds, &od, &os).unwrap();
        let back = load_dataset(&od, &os, &images).unwrap();

        assert_eq!(back.len(), 2);
        let p1 = back.get_patient("#001").unwrap();
        let right = p1.right_eye.as_ref().unwrap();
        assert_eq!(right.diagnosis, DiagnosisStatus::Glaucoma);
        assert_eq!(right.refractive_error.unwrap().cylinder, Some(-0.5));
        assert_eq!(right.pneumatic_iop, Some(15.5));
        assert_eq!(right.mean_defect, Some(-7.2));
        assert_eq!(
            p1.left_eye.as_ref().unwrap().diagnosis,
            DiagnosisStatus::Healthy
        );

        let p2 = back.get_patient("#002").unwrap();
        assert!(p2.right_eye.is_none());
        assert_eq!(
            p2.left_eye.as_ref().unwrap().diagnosis,
            DiagnosisStatus::Suspect
        );
    }

    #[test]
    fn upsert_in_edit_mode_replaces_rows() {
        let tmp = tempfile::tempdir().unwrap();
        let od = tmp.path().join("od.csv");
        let os = tmp.path().join("os.csv");

        let mut ds = PapilaDataset::new();
        ds.add_patient(sample_patient());
        write_dataset(&ds, &od, &os).unwrap();

        let mut edited = sample_patient();
        edited.age = 63;
        upsert_patient(&edited, &od, &os, true).unwrap();

        let back = load_dataset(&od, &os, &tmp.path().join("img")).unwrap();
        assert_eq!(back.len(), 1);
        assert_eq!(back.get_patient("#001").unwrap().age, 63);
    }

    #[test]
    fn upsert_new_patient_appends() {
        let tmp = tempfile::tempdir().unwrap();
        let od = tmp.path().join("od.csv");
        let os = tmp.path().join("os.csv");
        write_dataset(&PapilaDataset::new(), &od, &os).unwrap();

        upsert_patient(&sample_patient(), &od, &os, false).unwrap();

        let back = load_dataset(&od, &os, &tmp.path().join("img")).unwrap();
        assert!(back.get_patient("#001").is_some());
    }

    #[test]
    fn delete_removes_rows_from_both_tables() {
        let tmp = tempfile::tempdir().unwrap();
        let od = tmp.path().join("od.csv");
        let os = tmp.path().join("os.csv");

        let mut ds = PapilaDataset::new();
        ds.add_patient(sample_patient());
        write_dataset(&ds, &od, &os).unwrap();

        // Delete using the bare numeric form.
        delete_patient_rows("1", &od, &os).unwrap();

        let back = load_dataset(&od, &os, &tmp.path().join("img")).unwrap();
        assert!(back.is_empty());
    }

    #[test]
    fn write_failure_does_not_panic() {
        let ds = PapilaDataset::new();
        let missing = Path::new("/nonexistent-dir/od.csv");
        let err = write_dataset(&ds, missing, missing).unwrap_err();
        assert!(matches!(err, crate::error::PapilaError::Csv(_)));
    }
}
