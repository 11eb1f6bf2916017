use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable naming an optional JSON config file.
pub const CONFIG_ENV: &str = "CTSCAN_DASHBOARD_CONFIG";

/// How the working sheet is read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Sheet to read from a workbook. Ignored for CSV input.
    pub sheet_name: String,
    /// Columns kept from the left edge of the sheet (A..AI is 35).
    pub max_columns: usize,
    /// Data rows kept below the header; the rest are dropped.
    pub max_rows: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            sheet_name: "Working_Sheet".to_string(),
            max_columns: 35,
            max_rows: 80_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub load: LoadOptions,
    /// Rows kept by the "top diagnoses" reports.
    pub top_n: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            load: LoadOptions::default(),
            top_n: 3,
        }
    }
}

impl DashboardConfig {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Config named by [`CONFIG_ENV`], or the defaults when it is unset.
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_json_file(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }
}
