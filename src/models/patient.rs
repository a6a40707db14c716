use serde::{Deserialize, Serialize};

use super::enums::{Eye, Gender, PatientDiagnosis};
use super::eye::EyeData;

/// One registry entry. The external canonical ID format is a `#`-prefixed
/// zero-padded number (`#001`), but plain numeric strings occur in the
/// source tables as well; the dataset reconciles both at lookup time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub patient_id: String,
    pub age: u32,
    pub gender: Gender,
    pub right_eye: Option<EyeData>,
    pub left_eye: Option<EyeData>,
}

impl Patient {
    pub fn new(patient_id: impl Into<String>, age: u32, gender: Gender) -> Self {
        Self {
            patient_id: patient_id.into(),
            age,
            gender,
            right_eye: None,
            left_eye: None,
        }
    }

    /// Attach or replace the record for the side the data belongs to.
    pub fn set_eye_data(&mut self, eye_data: EyeData) {
        match eye_data.eye {
            Eye::Right => self.right_eye = Some(eye_data),
            Eye::Left => self.left_eye = Some(eye_data),
        }
    }

    pub fn eye(&self, side: Eye) -> Option<&EyeData> {
        match side {
            Eye::Right => self.right_eye.as_ref(),
            Eye::Left => self.left_eye.as_ref(),
        }
    }

    /// Composite diagnosis over both eyes: differing diagnoses read as
    /// mixed, a single recorded eye speaks for the patient, and a patient
    /// without eye records reads as no data.
    pub fn diagnosis(&self) -> PatientDiagnosis {
        match (&self.right_eye, &self.left_eye) {
            (Some(r), Some(l)) if r.diagnosis == l.diagnosis => r.diagnosis.into(),
            (Some(_), Some(_)) => PatientDiagnosis::Mixed,
            (Some(r), None) => r.diagnosis.into(),
            (None, Some(l)) => l.diagnosis.into(),
            (None, None) => PatientDiagnosis::NoData,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::DiagnosisStatus;

    #[test]
    fn set_eye_data_routes_on_side() {
        let mut p = Patient::new("#001", 60, Gender::Male);
        p.set_eye_data(EyeData::new(Eye::Left, DiagnosisStatus::Suspect));
        assert!(p.right_eye.is_none());
        assert_eq!(p.eye(Eye::Left).unwrap().diagnosis, DiagnosisStatus::Suspect);
    }

    #[test]
    fn diagnosis_mixed_when_eyes_differ() {
        let mut p = Patient::new("#001", 60, Gender::Male);
        p.set_eye_data(EyeData::new(Eye::Right, DiagnosisStatus::Glaucoma));
        p.set_eye_data(EyeData::new(Eye::Left, DiagnosisStatus::Healthy));
        assert_eq!(p.diagnosis(), PatientDiagnosis::Mixed);
    }

    #[test]
    fn diagnosis_from_single_eye() {
        let mut p = Patient::new("#002", 45, Gender::Female);
        p.set_eye_data(EyeData::new(Eye::Right, DiagnosisStatus::Glaucoma));
        assert_eq!(p.diagnosis(), PatientDiagnosis::Glaucoma);
    }

    #[test]
    fn diagnosis_no_data_without_eyes() {
        let p = Patient::new("#003", 30, Gender::Female);
        assert_eq!(p.diagnosis(), PatientDiagnosis::NoData);
        assert_eq!(p.diagnosis().as_str(), "NO DATA");
    }

    #[test]
    fn diagnosis_agreeing_eyes() {
        let mut p = Patient::new("#004", 70, Gender::Male);
        p.set_eye_data(EyeData::new(Eye::Right, DiagnosisStatus::Suspect));
        p.set_eye_data(EyeData::new(Eye::Left, DiagnosisStatus::Suspect));
        assert_eq!(p.diagnosis(), PatientDiagnosis::Suspect);
    }
}
