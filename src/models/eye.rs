use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::enums::{CrystallineStatus, DiagnosisStatus, Eye, GlaucomaSeverity};
use super::refraction::RefractiveError;

/// Clinical record for a single eye of a single patient. Constructed fresh
/// from a table row or a form submission; the fundus image path is the only
/// field reassigned afterwards (fallback attach on a failed first resolve).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EyeData {
    pub eye: Eye,
    pub diagnosis: DiagnosisStatus,
    pub refractive_error: Option<RefractiveError>,
    pub crystalline_status: Option<CrystallineStatus>,
    /// Intraocular pressure, pneumatic tonometer (mmHg).
    pub pneumatic_iop: Option<f64>,
    /// Intraocular pressure, Perkins tonometer (mmHg).
    pub perkins_iop: Option<f64>,
    /// Corneal thickness (µm).
    pub pachymetry: Option<f64>,
    /// mm.
    pub axial_length: Option<f64>,
    /// Visual-field mean defect (dB).
    pub mean_defect: Option<f64>,
    pub fundus_image: Option<PathBuf>,
}

impl EyeData {
    pub fn new(eye: Eye, diagnosis: DiagnosisStatus) -> Self {
        Self {
            eye,
            diagnosis,
            refractive_error: None,
            crystalline_status: None,
            pneumatic_iop: None,
            perkins_iop: None,
            pachymetry: None,
            axial_length: None,
            mean_defect: None,
            fundus_image: None,
        }
    }

    pub fn set_fundus_image(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        tracing::debug!(eye = self.eye.suffix(), path = %path.display(), "attaching fundus image");
        self.fundus_image = Some(path);
    }

    /// Hodapp-Parrish-Anderson bands over the visual-field mean defect:
    /// MD >= -6 dB mild, -12 <= MD < -6 moderate, MD < -12 severe.
    /// Non-glaucoma eyes grade as not applicable, a glaucoma eye without a
    /// recorded MD as unknown. Never fails.
    pub fn glaucoma_severity(&self) -> GlaucomaSeverity {
        if self.diagnosis != DiagnosisStatus::Glaucoma {
            return GlaucomaSeverity::NotApplicable;
        }
        match self.mean_defect {
            None => GlaucomaSeverity::Unknown,
            Some(md) if md >= -6.0 => GlaucomaSeverity::Mild,
            Some(md) if md >= -12.0 => GlaucomaSeverity::Moderate,
            Some(_) => GlaucomaSeverity::Severe,
        }
    }
}
