use crate::error::PapilaError;
use serde::{Deserialize, Serialize};

/// Macro to generate an enum carrying both the integer code used in the
/// tables and the uppercase name used by form input, with as_str +
/// from_code + std::str::FromStr.
macro_rules! code_enum {
    ($name:ident { $($variant:ident = $code:literal => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn code(&self) -> i64 {
                match self {
                    $(Self::$variant => $code),+
                }
            }

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }

            pub fn from_code(code: i64) -> Result<Self, PapilaError> {
                match code {
                    $($code => Ok(Self::$variant)),+,
                    _ => Err(PapilaError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: code.to_string(),
                    }),
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = PapilaError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_uppercase().as_str() {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(PapilaError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

code_enum!(Gender {
    Male = 0 => "MALE",
    Female = 1 => "FEMALE",
});

code_enum!(DiagnosisStatus {
    Healthy = 0 => "HEALTHY",
    Glaucoma = 1 => "GLAUCOMA",
    Suspect = 2 => "SUSPECT",
});

code_enum!(CrystallineStatus {
    Phakic = 0 => "PHAKIC",
    Pseudophakic = 1 => "PSEUDOPHAKIC",
});

/// Which eye a clinical record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Eye {
    Right,
    Left,
}

impl Eye {
    /// Ophthalmic shorthand: OD (oculus dexter) / OS (oculus sinister).
    /// Also the filename suffix for fundus images.
    pub fn suffix(&self) -> &'static str {
        match self {
            Eye::Right => "OD",
            Eye::Left => "OS",
        }
    }
}

impl std::str::FromStr for Eye {
    type Err = PapilaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "OD" | "RIGHT" => Ok(Eye::Right),
            "OS" | "LEFT" => Ok(Eye::Left),
            _ => Err(PapilaError::InvalidEnum {
                field: "Eye".into(),
                value: s.into(),
            }),
        }
    }
}

/// Composite per-patient diagnosis derived from the two eye records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatientDiagnosis {
    Healthy,
    Glaucoma,
    Suspect,
    Mixed,
    NoData,
}

impl PatientDiagnosis {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatientDiagnosis::Healthy => "HEALTHY",
            PatientDiagnosis::Glaucoma => "GLAUCOMA",
            PatientDiagnosis::Suspect => "SUSPECT",
            PatientDiagnosis::Mixed => "MIXED",
            PatientDiagnosis::NoData => "NO DATA",
        }
    }
}

impl From<DiagnosisStatus> for PatientDiagnosis {
    fn from(d: DiagnosisStatus) -> Self {
        match d {
            DiagnosisStatus::Healthy => PatientDiagnosis::Healthy,
            DiagnosisStatus::Glaucoma => PatientDiagnosis::Glaucoma,
            DiagnosisStatus::Suspect => PatientDiagnosis::Suspect,
        }
    }
}

/// Visual-field based glaucoma grading for a single eye.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GlaucomaSeverity {
    Mild,
    Moderate,
    Severe,
    /// Glaucoma eye without a recorded mean defect.
    Unknown,
    /// Non-glaucoma eye.
    NotApplicable,
}

impl GlaucomaSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            GlaucomaSeverity::Mild => "MILD",
            GlaucomaSeverity::Moderate => "MODERATE",
            GlaucomaSeverity::Severe => "SEVERE",
            GlaucomaSeverity::Unknown => "UNKNOWN",
            GlaucomaSeverity::NotApplicable => "NOT APPLICABLE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn gender_codes_round_trip() {
        assert_eq!(Gender::from_code(0).unwrap(), Gender::Male);
        assert_eq!(Gender::from_code(1).unwrap(), Gender::Female);
        assert_eq!(Gender::Female.code(), 1);
    }

    #[test]
    fn gender_code_out_of_range_is_invalid_enum() {
        let err = Gender::from_code(3).unwrap_err();
        assert!(matches!(
            err,
            PapilaError::InvalidEnum { ref field, .. } if field == "Gender"
        ));
    }

    #[test]
    fn diagnosis_codes_match_table_values() {
        for (code, expected) in [
            (0, DiagnosisStatus::Healthy),
            (1, DiagnosisStatus::Glaucoma),
            (2, DiagnosisStatus::Suspect),
        ] {
            assert_eq!(DiagnosisStatus::from_code(code).unwrap(), expected);
        }
        assert!(DiagnosisStatus::from_code(7).is_err());
    }

    #[test]
    fn diagnosis_parses_form_names_case_insensitively() {
        assert_eq!(
            DiagnosisStatus::from_str("glaucoma").unwrap(),
            DiagnosisStatus::Glaucoma
        );
        assert_eq!(
            DiagnosisStatus::from_str(" SUSPECT ").unwrap(),
            DiagnosisStatus::Suspect
        );
    }

    #[test]
    fn eye_suffixes() {
        assert_eq!(Eye::Right.suffix(), "OD");
        assert_eq!(Eye::Left.suffix(), "OS");
        assert_eq!(Eye::from_str("os").unwrap(), Eye::Left);
    }

    #[test]
    fn crystalline_parses_both_forms() {
        assert_eq!(
            CrystallineStatus::from_code(1).unwrap(),
            CrystallineStatus::Pseudophakic
        );
        assert_eq!(
            CrystallineStatus::from_str("PHAKIC").unwrap(),
            CrystallineStatus::Phakic
        );
    }
}
