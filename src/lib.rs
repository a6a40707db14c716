//! Patient registry for the PAPILA glaucoma dataset: per-patient, per-eye
//! clinical records with fundus photographs, backed by two per-eye tables
//! and an image directory. The desktop front end sits on top of this crate
//! and owns all widgets and event wiring; everything else lives here.

pub mod config;
pub mod error;
pub mod images;
pub mod management;
pub mod models;
pub mod resolver;
pub mod store;

pub use config::Settings;
pub use error::{PapilaError, Result};
pub use models::{
    CrystallineStatus, DatasetStatistics, DiagnosisStatus, Eye, EyeData, Gender,
    GlaucomaSeverity, PapilaDataset, Patient, PatientDiagnosis, RefractiveError,
};

use tracing_subscriber::EnvFilter;

/// Initialize tracing for the hosting application. Respects `RUST_LOG`,
/// falls back to the crate default filter.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();
}
