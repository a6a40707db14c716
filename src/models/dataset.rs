use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::patient::Patient;
use super::stats::{self, DatasetStatistics};

/// Normalize a patient ID for comparison: trim, drop `#` decoration, and
/// strip leading zeros from all-digit IDs so `#007`, `007` and `7` compare
/// equal. Non-numeric IDs compare by their trimmed, undecorated form.
pub fn normalize_id(id: &str) -> String {
    let cleaned = id.trim().replace('#', "");
    let cleaned = cleaned.trim();
    if !cleaned.is_empty() && cleaned.chars().all(|c| c.is_ascii_digit()) {
        let stripped = cleaned.trim_start_matches('0');
        if stripped.is_empty() { "0".to_string() } else { stripped.to_string() }
    } else {
        cleaned.to_string()
    }
}

/// The in-memory registry: patient ID -> patient. Owns its entries; all
/// mutation goes through the methods here so the key mapping stays
/// consistent with `patient_id`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PapilaDataset {
    patients: BTreeMap<String, Patient>,
}

impl PapilaDataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite by the patient's own ID.
    pub fn add_patient(&mut self, patient: Patient) {
        self.patients.insert(patient.patient_id.clone(), patient);
    }

    /// Remove by ID (normalization-tolerant). Returns whether an entry was
    /// actually removed; a missing ID is not an error.
    pub fn remove_patient(&mut self, patient_id: &str) -> bool {
        match self.resolve_key(patient_id) {
            Some(key) => self.patients.remove(&key).is_some(),
            None => false,
        }
    }

    /// Lookup tolerant of the `#`-prefixed and bare numeric ID forms.
    pub fn get_patient(&self, patient_id: &str) -> Option<&Patient> {
        self.resolve_key(patient_id)
            .and_then(|key| self.patients.get(&key))
    }

    pub fn get_patient_mut(&mut self, patient_id: &str) -> Option<&mut Patient> {
        let key = self.resolve_key(patient_id)?;
        self.patients.get_mut(&key)
    }

    /// Replace an existing entry, keyed by the patient's own ID. Returns
    /// false (and leaves the dataset unchanged) when no entry matches.
    pub fn update_patient(&mut self, patient: Patient) -> bool {
        match self.resolve_key(&patient.patient_id) {
            Some(key) => {
                self.patients.insert(key, patient);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.patients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patients.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Patient)> {
        self.patients.iter()
    }

    pub fn patients(&self) -> impl Iterator<Item = &Patient> {
        self.patients.values()
    }

    pub fn patient_ids(&self) -> impl Iterator<Item = &String> {
        self.patients.keys()
    }

    pub fn statistics(&self) -> DatasetStatistics {
        stats::compute(self)
    }

    /// Map a query ID onto the stored key. Exact trimmed match wins; the
    /// normalized scan covers the format drift between sources.
    fn resolve_key(&self, patient_id: &str) -> Option<String> {
        let trimmed = patient_id.trim();
        if self.patients.contains_key(trimmed) {
            return Some(trimmed.to_string());
        }
        let wanted = normalize_id(patient_id);
        self.patients
            .keys()
            .find(|key| normalize_id(key) == wanted)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::Gender;

    fn patient(id: &str) -> Patient {
        Patient::new(id, 50, Gender::Male)
    }

    #[test]
    fn normalize_id_variants() {
        assert_eq!(normalize_id("#007"), "7");
        assert_eq!(normalize_id("007"), "7");
        assert_eq!(normalize_id(" 7 "), "7");
        assert_eq!(normalize_id("#000"), "0");
        assert_eq!(normalize_id("A-12"), "A-12");
    }

    #[test]
    fn lookup_accepts_hash_and_bare_forms() {
        let mut ds = PapilaDataset::new();
        ds.add_patient(patient("#007"));

        for query in ["#007", "007", "7", " 7 "] {
            let found = ds.get_patient(query);
            assert!(found.is_some(), "query {query:?} should resolve");
            assert_eq!(found.unwrap().patient_id, "#007");
        }
    }

    #[test]
    fn lookup_exact_match_for_non_numeric_ids() {
        let mut ds = PapilaDataset::new();
        ds.add_patient(patient("CASE-A"));
        assert!(ds.get_patient("CASE-A").is_some());
        assert!(ds.get_patient("CASE-B").is_none());
    }

    #[test]
    fn remove_missing_id_reports_false_and_preserves_size() {
        let mut ds = PapilaDataset::new();
        ds.add_patient(patient("#001"));
        let before = ds.len();
        assert!(!ds.remove_patient("#099"));
        assert_eq!(ds.len(), before);
    }

    #[test]
    fn remove_by_alternate_form() {
        let mut ds = PapilaDataset::new();
        ds.add_patient(patient("#010"));
        assert!(ds.remove_patient("10"));
        assert!(ds.is_empty());
    }

    #[test]
    fn add_overwrites_same_id() {
        let mut ds = PapilaDataset::new();
        ds.add_patient(patient("#001"));
        let mut updated = patient("#001");
        updated.age = 61;
        ds.add_patient(updated);
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.get_patient("#001").unwrap().age, 61);
    }

    #[test]
    fn update_missing_patient_is_rejected() {
        let mut ds = PapilaDataset::new();
        assert!(!ds.update_patient(patient("#005")));
        assert!(ds.is_empty());
    }
}
