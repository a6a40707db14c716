use std::env;
use std::path::PathBuf;

/// Environment variables read at startup. Same names and defaults the
/// deployed spreadsheets were distributed with.
pub const OD_TABLE_ENV: &str = "OD_TABLE_FILE";
pub const OS_TABLE_ENV: &str = "OS_TABLE_FILE";
pub const IMAGES_DIR_ENV: &str = "FUNDUS_IMAGES_DIR";

pub const DEFAULT_OD_TABLE: &str = "patient_data_od.csv";
pub const DEFAULT_OS_TABLE: &str = "patient_data_os.csv";
pub const DEFAULT_IMAGES_DIR: &str = "FundusImages";

pub fn default_log_filter() -> &'static str {
    "papila=info,warn"
}

/// Paths to the two per-eye tables and the fundus image directory.
#[derive(Debug, Clone)]
pub struct Settings {
    pub od_table: PathBuf,
    pub os_table: PathBuf,
    pub images_dir: PathBuf,
}

impl Settings {
    pub fn from_env() -> Self {
        Self {
            od_table: env_path(OD_TABLE_ENV, DEFAULT_OD_TABLE),
            os_table: env_path(OS_TABLE_ENV, DEFAULT_OS_TABLE),
            images_dir: env_path(IMAGES_DIR_ENV, DEFAULT_IMAGES_DIR),
        }
    }

    pub fn new(
        od_table: impl Into<PathBuf>,
        os_table: impl Into<PathBuf>,
        images_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            od_table: od_table.into(),
            os_table: os_table.into(),
            images_dir: images_dir.into(),
        }
    }
}

fn env_path(var: &str, default: &str) -> PathBuf {
    match env::var(var) {
        Ok(value) if !value.trim().is_empty() => PathBuf::from(value),
        _ => PathBuf::from(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_env_unset() {
        std::env::remove_var(OD_TABLE_ENV);
        std::env::remove_var(OS_TABLE_ENV);
        std::env::remove_var(IMAGES_DIR_ENV);

        let settings = Settings::from_env();
        assert_eq!(settings.od_table, PathBuf::from(DEFAULT_OD_TABLE));
        assert_eq!(settings.os_table, PathBuf::from(DEFAULT_OS_TABLE));
        assert_eq!(settings.images_dir, PathBuf::from(DEFAULT_IMAGES_DIR));
    }

    #[test]
    fn explicit_paths() {
        let settings = Settings::new("od.csv", "os.csv", "imgs");
        assert_eq!(settings.images_dir, PathBuf::from("imgs"));
    }

    #[test]
    fn blank_env_value_falls_back_to_default() {
        assert_eq!(env_path("PAPILA_TEST_UNSET_VAR", "fallback"), PathBuf::from("fallback"));
    }
}
