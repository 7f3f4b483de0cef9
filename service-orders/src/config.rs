//! Application configuration
//!
//! Central location for configuration constants, report layout limits,
//! and the on-disk locations used throughout the application.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

// ===== On-disk layout =====

/// Default database file name inside the data directory
pub const DATABASE_NAME: &str = "os_database.db";
/// Default directory for photo attachments
pub const UPLOADS_DIR: &str = "uploads";
/// Default directory for generated reports
pub const REPORTS_DIR: &str = "reports";
/// Optional configuration file inside the data directory
pub const CONFIG_FILE: &str = "config.json";

// ===== Naming =====

/// Prefix for photo files copied into the uploads directory
pub const PHOTO_FILE_PREFIX: &str = "os_foto_";
/// Number of hex characters of the uuid kept in a photo file name
pub const PHOTO_SUFFIX_LEN: usize = 10;
/// Default file name for reports generated without an explicit name
pub const DEFAULT_REPORT_FILENAME: &str = "relatorio_os.pdf";
/// Prefix for temporary reports awaiting a "save as"
pub const TEMP_REPORT_PREFIX: &str = "temp_report_";
/// Maximum characters of a customer name kept in a suggested report name
pub const MAX_FILENAME_CUSTOMER_CHARS: usize = 30;

// ===== Report page layout (millimetres) =====

/// A4 page width
pub const PAGE_WIDTH_MM: f32 = 210.0;
/// A4 page height
pub const PAGE_HEIGHT_MM: f32 = 297.0;
/// Margin applied on all four sides
pub const PAGE_MARGIN_MM: f32 = 20.0;
/// Width of the label column in field tables
pub const LABEL_COLUMN_MM: f32 = 40.0;

/// Maximum width of an embedded photo (15 cm)
pub const PHOTO_MAX_WIDTH_MM: f32 = 150.0;
/// Maximum height of an embedded photo (8 cm)
pub const PHOTO_MAX_HEIGHT_MM: f32 = 80.0;

// ===== Report typography (points) =====

pub const TITLE_FONT_SIZE: f32 = 18.0;
pub const HEADING_FONT_SIZE: f32 = 12.0;
pub const BODY_FONT_SIZE: f32 = 10.0;
/// Baseline-to-baseline distance for body text
pub const BODY_LEADING: f32 = 12.0;

/// Locations used by the application, loaded from `config.json` when present.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub database_file: String,
    pub uploads_dir: String,
    pub reports_dir: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            database_file: DATABASE_NAME.to_string(),
            uploads_dir: UPLOADS_DIR.to_string(),
            reports_dir: REPORTS_DIR.to_string(),
        }
    }
}

impl AppConfig {
    /// Configuration rooted at `data_dir` with default names
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Load `config.json` from `data_dir`, falling back to defaults when the
    /// file does not exist. A relative or missing `data_dir` in the file is
    /// replaced by the directory the file was found in.
    pub async fn load(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(CONFIG_FILE);

        if !path.exists() {
            tracing::debug!("No configuration file at {:?}, using defaults", path);
            return Ok(Self::with_data_dir(data_dir));
        }

        let contents = fs::read_to_string(&path).await?;
        let mut config: AppConfig = serde_json::from_str(&contents)?;

        if config.data_dir.is_relative() {
            config.data_dir = data_dir.join(&config.data_dir);
        }

        tracing::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_file)
    }

    pub fn uploads_path(&self) -> PathBuf {
        self.data_dir.join(&self.uploads_dir)
    }

    pub fn reports_path(&self) -> PathBuf {
        self.data_dir.join(&self.reports_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_load_defaults_without_file() {
        let temp = TempDir::new().unwrap();

        let config = AppConfig::load(temp.path()).await.unwrap();

        assert_eq!(config.database_path(), temp.path().join(DATABASE_NAME));
        assert_eq!(config.uploads_path(), temp.path().join(UPLOADS_DIR));
    }

    #[tokio::test]
    async fn test_load_partial_file() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join(CONFIG_FILE),
            r#"{"reports_dir": "relatorios"}"#,
        )
        .unwrap();

        let config = AppConfig::load(temp.path()).await.unwrap();

        assert_eq!(config.reports_path(), temp.path().join("relatorios"));
        assert_eq!(config.database_file, DATABASE_NAME);
    }
}
