use serde::{Deserialize, Serialize};

use super::dataset::PapilaDataset;
use super::enums::{Gender, PatientDiagnosis};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenderDistribution {
    pub male: usize,
    pub female: usize,
}

/// Four buckets, patient-level: a patient whose eyes disagree counts as
/// mixed. Patients without eye records appear in the total only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosisDistribution {
    pub healthy: usize,
    pub glaucoma: usize,
    pub suspect: usize,
    pub mixed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgeStats {
    pub min: u32,
    pub max: u32,
    pub mean: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetStatistics {
    pub total_patients: usize,
    pub gender: GenderDistribution,
    pub diagnosis: DiagnosisDistribution,
    /// None when the dataset is empty.
    pub age: Option<AgeStats>,
}

/// Summary counts over a dataset snapshot. Pure, single pass, no caching;
/// callers recompute after every mutation.
pub fn compute(dataset: &PapilaDataset) -> DatasetStatistics {
    let mut gender = GenderDistribution::default();
    let mut diagnosis = DiagnosisDistribution::default();
    let mut age_min = u32::MAX;
    let mut age_max = 0u32;
    let mut age_sum = 0u64;
    let mut total = 0usize;

    for patient in dataset.patients() {
        total += 1;
        match patient.gender {
            Gender::Male => gender.male += 1,
            Gender::Female => gender.female += 1,
        }
        match patient.diagnosis() {
            PatientDiagnosis::Healthy => diagnosis.healthy += 1,
            PatientDiagnosis::Glaucoma => diagnosis.glaucoma += 1,
            PatientDiagnosis::Suspect => diagnosis.suspect += 1,
            PatientDiagnosis::Mixed => diagnosis.mixed += 1,
            PatientDiagnosis::NoData => {}
        }
        age_min = age_min.min(patient.age);
        age_max = age_max.max(patient.age);
        age_sum += u64::from(patient.age);
    }

    let age = if total > 0 {
        Some(AgeStats {
            min: age_min,
            max: age_max,
            mean: age_sum as f64 / total as f64,
        })
    } else {
        None
    };

    DatasetStatistics {
        total_patients: total,
        gender,
        diagnosis,
        age,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::{DiagnosisStatus, Eye};
    use crate::models::eye::EyeData;
    use crate::models::patient::Patient;

    fn patient(id: &str, age: u32, gender: Gender, right: Option<DiagnosisStatus>, left: Option<DiagnosisStatus>) -> Patient {
        let mut p = Patient::new(id, age, gender);
        if let Some(d) = right {
            p.set_eye_data(EyeData::new(Eye::Right, d));
        }
        if let Some(d) = left {
            p.set_eye_data(EyeData::new(Eye::Left, d));
        }
        p
    }

    #[test]
    fn empty_dataset_has_no_age_stats() {
        let stats = compute(&PapilaDataset::new());
        assert_eq!(stats.total_patients, 0);
        assert_eq!(stats.gender, GenderDistribution::default());
        assert_eq!(stats.diagnosis, DiagnosisDistribution::default());
        assert!(stats.age.is_none());
    }

    #[test]
    fn counts_and_age_over_mixed_population() {
        let mut ds = PapilaDataset::new();
        ds.add_patient(patient(
            "#001", 40, Gender::Male,
            Some(DiagnosisStatus::Glaucoma), Some(DiagnosisStatus::Healthy),
        ));
        ds.add_patient(patient(
            "#002", 60, Gender::Female,
            Some(DiagnosisStatus::Suspect), Some(DiagnosisStatus::Suspect),
        ));
        ds.add_patient(patient("#003", 50, Gender::Female, None, None));

        let stats = ds.statistics();
        assert_eq!(stats.total_patients, 3);
        assert_eq!(stats.gender.male, 1);
        assert_eq!(stats.gender.female, 2);
        assert_eq!(stats.diagnosis.mixed, 1);
        assert_eq!(stats.diagnosis.suspect, 1);
        assert_eq!(stats.diagnosis.healthy, 0);
        // The no-data patient contributes to the total and ages only.
        let age = stats.age.unwrap();
        assert_eq!(age.min, 40);
        assert_eq!(age.max, 60);
        assert!((age.mean - 50.0).abs() < f64::EPSILON);
    }
}
