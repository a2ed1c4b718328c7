use crate::error::{CityError, Result};
use crate::limits::{
    clamp_workers, env_value, parse_bounded, MAX_FILES_ENV, MAX_WORKERS, TIMEOUT_SECS_ENV,
    WORKERS_ENV,
};
use codecity_layout::{VisualEncoder, DEFAULT_COLORS, DEFAULT_HEIGHT_SCALE, DEFAULT_THRESHOLDS};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Extensions analyzed by default (compared case-insensitively)
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    "c", "cc", "cpp", "cxx", "c++", "h", "hh", "hpp", "hxx", "h++", "java", "js", "m", "mm",
    "py", "rb", "swift", "go", "php", "pl", "pm", "t", "cs", "d", "erl", "ex", "exs", "f90", "f",
    "for", "f95", "groovy", "hs", "kt", "kts", "lua", "nb", "pas", "pp", "r", "rs", "scala", "sc",
    "sh", "bash", "sql", "ts", "tsx", "vb", "vbs", "gd",
];

/// Directory names skipped in addition to VCS metadata
pub const DEFAULT_EXCLUDE_DIRS: &[&str] = &[
    "node_modules",
    "target",
    "dist",
    "build",
    "__pycache__",
    ".venv",
];

/// Everything a city build needs, passed explicitly to the entry point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CityConfig {
    /// Stop enumerating after this many files
    pub max_files: usize,

    /// Concurrent analyses (clamped to 1..=64)
    pub workers: usize,

    /// Canvas side grows as `area_scale * sqrt(files)`
    pub area_scale: f64,

    /// Smallest canvas side
    pub area_floor: f64,

    /// Inclusive upper bounds of the color buckets
    pub thresholds: Vec<u32>,

    /// One color per bucket, lowest complexity first
    pub colors: Vec<String>,

    /// Building height per complexity point
    pub height_scale: f64,

    /// Wall-clock budget for the analysis phase
    pub timeout_secs: u64,

    /// Files above this size are skipped (`None` = no limit)
    pub max_file_bytes: Option<u64>,

    /// Extension allow-list, without the leading dot
    pub extensions: Vec<String>,

    /// Directory names never descended into
    pub exclude_dirs: Vec<String>,

    /// Honour .gitignore / .ignore files
    pub respect_gitignore: bool,

    /// Include dot-files and dot-directories
    pub include_hidden: bool,
}

impl Default for CityConfig {
    fn default() -> Self {
        Self {
            max_files: 2000,
            workers: 20,
            area_scale: 45.0,
            area_floor: 150.0,
            thresholds: DEFAULT_THRESHOLDS.to_vec(),
            colors: DEFAULT_COLORS.iter().map(|c| (*c).to_string()).collect(),
            height_scale: DEFAULT_HEIGHT_SCALE,
            timeout_secs: 300,
            max_file_bytes: Some(1_048_576),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| (*e).to_string()).collect(),
            exclude_dirs: DEFAULT_EXCLUDE_DIRS.iter().map(|d| (*d).to_string()).collect(),
            respect_gitignore: true,
            include_hidden: false,
        }
    }
}

impl CityConfig {
    /// Load from a TOML or JSON file; missing keys keep their defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let config: Self = if is_json {
            serde_json::from_str(&raw)
                .map_err(|e| CityError::InvalidConfig(format!("{}: {e}", path.display())))?
        } else {
            toml::from_str(&raw)
                .map_err(|e| CityError::InvalidConfig(format!("{}: {e}", path.display())))?
        };
        Ok(config)
    }

    /// Apply `CODECITY_*` environment overrides
    #[must_use]
    pub fn apply_env(self) -> Self {
        self.apply_overrides(env_value)
    }

    pub(crate) fn apply_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(workers) = parse_bounded(lookup(WORKERS_ENV).as_deref(), 1, MAX_WORKERS) {
            self.workers = workers;
        }
        if let Some(max_files) = parse_bounded(lookup(MAX_FILES_ENV).as_deref(), 1, usize::MAX) {
            self.max_files = max_files;
        }
        if let Some(secs) = parse_bounded(lookup(TIMEOUT_SECS_ENV).as_deref(), 1, usize::MAX) {
            self.timeout_secs = u64::try_from(secs).unwrap_or(u64::MAX);
        }
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.max_files == 0 {
            return Err("max_files must be > 0".to_string());
        }
        if self.workers == 0 {
            return Err("workers must be > 0".to_string());
        }
        if !self.area_scale.is_finite() || self.area_scale <= 0.0 {
            return Err(format!("area_scale must be positive, got {}", self.area_scale));
        }
        if !self.area_floor.is_finite() || self.area_floor <= 0.0 {
            return Err(format!("area_floor must be positive, got {}", self.area_floor));
        }
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be > 0".to_string());
        }
        if self.extensions.is_empty() {
            return Err("extensions must not be empty".to_string());
        }
        self.encoder().map(|_| ()).map_err(|e| e.to_string())
    }

    /// Worker count actually used by the scheduler
    #[must_use]
    pub fn effective_workers(&self) -> usize {
        clamp_workers(self.workers)
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn encoder(&self) -> codecity_layout::Result<VisualEncoder> {
        VisualEncoder::new(self.thresholds.clone(), self.colors.clone(), self.height_scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[test]
    fn default_config_valid() {
        assert!(CityConfig::default().validate().is_ok());
    }

    #[test]
    fn config_validation() {
        let mut config = CityConfig {
            workers: 0,
            ..CityConfig::default()
        };
        assert!(config.validate().is_err());

        config.workers = 4;
        config.area_scale = f64::NAN;
        assert!(config.validate().is_err());

        config.area_scale = 45.0;
        config.colors.pop();
        assert!(config.validate().is_err());

        config.colors.push("#ffffff".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn overrides_are_trimmed_and_clamped() {
        let env: HashMap<&str, &str> = [
            (WORKERS_ENV, " 500 "),
            (MAX_FILES_ENV, "12"),
            (TIMEOUT_SECS_ENV, "nope"),
        ]
        .into_iter()
        .collect();
        let config = CityConfig::default()
            .apply_overrides(|name| env.get(name).map(|v| (*v).to_string()));

        assert_eq!(config.workers, MAX_WORKERS);
        assert_eq!(config.max_files, 12);
        assert_eq!(config.timeout_secs, 300);
    }

    #[test]
    fn unset_env_leaves_file_values_for_validation() {
        let config = CityConfig {
            workers: 0,
            max_files: 0,
            ..CityConfig::default()
        }
        .apply_overrides(|_| None);

        assert_eq!(config.workers, 0);
        assert_eq!(config.max_files, 0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn loads_partial_toml_and_json() {
        let dir = tempfile::tempdir().unwrap();
        let toml_path = dir.path().join("city.toml");
        std::fs::write(&toml_path, "workers = 3\nthresholds = [1, 2, 3, 4]\n").unwrap();
        let config = CityConfig::load(&toml_path).unwrap();
        assert_eq!(config.workers, 3);
        assert_eq!(config.thresholds, vec![1, 2, 3, 4]);
        assert_eq!(config.max_files, 2000);

        let json_path = dir.path().join("city.json");
        std::fs::write(&json_path, r#"{"max_files": 7}"#).unwrap();
        assert_eq!(CityConfig::load(&json_path).unwrap().max_files, 7);

        std::fs::write(&json_path, "{").unwrap();
        assert!(matches!(
            CityConfig::load(&json_path),
            Err(CityError::InvalidConfig(_))
        ));
    }
}
