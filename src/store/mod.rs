pub mod loader;
pub mod table;
pub mod writer;

pub use loader::load_dataset;
pub use table::{read_table, write_table, Row, Table, COLUMNS};
pub use writer::{delete_patient_rows, upsert_patient, write_dataset};
