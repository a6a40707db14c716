pub mod dataset;
pub mod enums;
pub mod eye;
pub mod patient;
pub mod refraction;
pub mod stats;

pub use dataset::{normalize_id, PapilaDataset};
pub use enums::{CrystallineStatus, DiagnosisStatus, Eye, Gender, GlaucomaSeverity, PatientDiagnosis};
pub use eye::EyeData;
pub use patient::Patient;
pub use refraction::RefractiveError;
pub use stats::{AgeStats, DatasetStatistics, DiagnosisDistribution, GenderDistribution};
