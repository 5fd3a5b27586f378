use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};
use crate::workbook::{parse_cell_ref, SheetLayout};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub data_dir: String,
    #[serde(default)]
    pub secret_backend: SecretBackend,
    #[serde(default)]
    pub report: ReportConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir().to_string_lossy().to_string(),
            secret_backend: SecretBackend::default(),
            report: ReportConfig::default(),
        }
    }
}

/// Where the admin password lives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecretBackend {
    #[default]
    File,
    Keyring,
}

/// Sheet layout and report text for one report build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub deviation_threshold: f64,
    pub sheet_name: String,
    /// A1-style data range without the last row, e.g. `A4:G`.
    pub data_range: String,
    pub columns: ColumnMap,
    pub title: String,
    pub separator: String,
    pub category_separator: String,
    pub report_sheet_name: String,
    pub report_cell: String,
}

/// Column offsets relative to the first column of the data range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMap {
    pub main_category: usize,
    pub sub_category: usize,
    pub planned: usize,
    pub actual: usize,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            main_category: 1,
            sub_category: 2,
            planned: 3,
            actual: 5,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            deviation_threshold: 0.20,
            sheet_name: "Monthly Budget".to_string(),
            data_range: "A4:G".to_string(),
            columns: ColumnMap::default(),
            title: "MONTHLY COMPARATIVE REPORT".to_string(),
            separator: "=".repeat(82),
            category_separator: "-".repeat(82),
            report_sheet_name: "Monthly_Comparative_Report".to_string(),
            report_cell: "B2".to_string(),
        }
    }
}

impl ReportConfig {
    /// Check the config once before any sheet is read. Returns the parsed range.
    pub fn validate(&self) -> Result<SheetLayout> {
        if !self.deviation_threshold.is_finite() || self.deviation_threshold < 0.0 {
            return Err(ReportError::InvalidConfig(format!(
                "deviation_threshold must be a non-negative number, got {}",
                self.deviation_threshold
            )));
        }
        let layout = SheetLayout::parse(&self.data_range)?;
        let width = layout.width();
        let c = &self.columns;
        for (field, offset) in [
            ("main_category", c.main_category),
            ("sub_category", c.sub_category),
            ("planned", c.planned),
            ("actual", c.actual),
        ] {
            if offset >= width {
                return Err(ReportError::InvalidConfig(format!(
                    "column {field} (offset {offset}) is outside range {} ({width} columns)",
                    self.data_range
                )));
            }
        }
        parse_cell_ref(&self.report_cell)?;
        if self.report_sheet_name.trim().is_empty() {
            return Err(ReportError::InvalidConfig(
                "report_sheet_name must not be empty".to_string(),
            ));
        }
        if self
            .report_sheet_name
            .trim()
            .eq_ignore_ascii_case(self.sheet_name.trim())
        {
            return Err(ReportError::InvalidConfig(format!(
                "report_sheet_name \"{}\" would overwrite the budget sheet",
                self.report_sheet_name
            )));
        }
        Ok(layout)
    }
}

pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("monthly-report")
}

fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("monthly-report")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        serde_json::from_str(&content).unwrap_or_else(|e| {
            log::warn!("ignoring unreadable {}: {e}", path.display());
            Settings::default()
        })
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| ReportError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

pub fn settings_file_exists() -> bool {
    settings_path().exists()
}

pub fn get_data_dir() -> PathBuf {
    PathBuf::from(&load_settings().data_dir)
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| PathBuf::from(path))
        .to_string_lossy()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let mut settings = Settings {
            data_dir: "/tmp/test".to_string(),
            secret_backend: SecretBackend::Keyring,
            report: ReportConfig::default(),
        };
        settings.report.sheet_name = "Budget 2025".to_string();
        let json = serde_json::to_string_pretty(&settings).unwrap();
        std::fs::write(&path, &json).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let loaded: Settings = serde_json::from_str(&content).unwrap();
        assert_eq!(loaded.data_dir, "/tmp/test");
        assert_eq!(loaded.secret_backend, SecretBackend::Keyring);
        assert_eq!(loaded.report.sheet_name, "Budget 2025");
    }

    #[test]
    fn test_defaults_match_budget_sheet() {
        let s = Settings::default();
        assert!(!s.data_dir.is_empty());
        assert_eq!(s.secret_backend, SecretBackend::File);
        assert_eq!(s.report.deviation_threshold, 0.20);
        assert_eq!(s.report.sheet_name, "Monthly Budget");
        assert_eq!(s.report.separator.len(), 82);
        assert_eq!(s.report.columns.actual, 5);
    }

    #[test]
    fn test_load_merges_with_defaults() {
        let json = r#"{"data_dir": "/tmp/test", "report": {"deviation_threshold": 0.1}}"#;
        let s: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(s.secret_backend, SecretBackend::File);
        assert_eq!(s.report.deviation_threshold, 0.1);
        assert_eq!(s.report.data_range, "A4:G");
        assert_eq!(s.report.columns, ColumnMap::default());
    }

    #[test]
    fn test_validate_default_config() {
        let layout = ReportConfig::default().validate().unwrap();
        assert_eq!(layout.width(), 7);
        assert_eq!(layout.start_row, 4);
    }

    #[test]
    fn test_validate_rejects_column_outside_range() {
        let mut config = ReportConfig::default();
        config.data_range = "A4:E".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("actual"));
    }

    #[test]
    fn test_validate_rejects_negative_threshold() {
        let config = ReportConfig {
            deviation_threshold: -0.5,
            ..ReportConfig::default()
        };
        assert!(matches!(config.validate(), Err(ReportError::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_rejects_bad_report_cell() {
        let config = ReportConfig {
            report_cell: "2B".to_string(),
            ..ReportConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_report_over_budget_sheet() {
        let config = ReportConfig {
            report_sheet_name: " monthly budget ".to_string(),
            ..ReportConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ReportError::InvalidConfig(_)));
        assert!(err.to_string().contains("would overwrite the budget sheet"));
    }
}
