use thiserror::Error;

#[derive(Error, Debug)]
pub enum PapilaError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("No fundus image for patient {patient_id}, eye {eye}")]
    ImageNotFound { patient_id: String, eye: String },

    #[error("Missing column {column} in table {table}")]
    MissingColumn { column: String, table: String },

    #[error("Cannot parse {column} value {value:?}")]
    BadCell { column: String, value: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Table error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, PapilaError>;
