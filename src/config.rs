use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

use crate::sqlite::SqliteConfig;

/// Environment variable naming the TOML config file.
pub const CONFIG_PATH_ENV: &str = "TRACKER_CONFIG";
/// Environment variable overriding `database.db_path`.
pub const DB_PATH_ENV: &str = "TRACKER_DB_PATH";

const DEFAULT_CONFIG_PATH: &str = "tracker.toml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TrackerConfig {
    #[serde(default)]
    pub database: SqliteConfig,
}

impl TrackerConfig {
    /// Load from `$TRACKER_CONFIG` (or `tracker.toml`), apply the
    /// `$TRACKER_DB_PATH` override and validate. A missing file means defaults.
    pub fn load_default() -> Result<Self> {
        Self::load_with(
            std::env::var(CONFIG_PATH_ENV).ok(),
            std::env::var(DB_PATH_ENV).ok(),
        )
    }

    /// [`load_default`](Self::load_default) with the environment values
    /// passed in.
    pub fn load_with(config_path: Option<String>, db_path: Option<String>) -> Result<Self> {
        let path = config_path.unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
        let mut cfg = if Path::new(&path).exists() {
            Self::load_from_file(&path)?
        } else {
            tracing::debug!(%path, "no config file, using defaults");
            Self::default()
        };
        cfg.override_db_path(db_path);
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    fn override_db_path(&mut self, db_path: Option<String>) {
        if let Some(db_path) = db_path.filter(|p| !p.trim().is_empty()) {
            self.database.db_path = db_path;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.database.db_path.trim().is_empty() {
            return Err(anyhow!(
                "database.db_path is empty; set it in the config file or {DB_PATH_ENV}"
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_document_yields_defaults() {
        let cfg = TrackerConfig::from_toml("").unwrap();
        assert_eq!(cfg, TrackerConfig::default());
        assert_eq!(cfg.database.db_path, "tracker.db");
        assert_eq!(cfg.database.busy_timeout_ms, 5_000);
    }

    #[test]
    fn database_section_overrides_defaults() {
        let cfg = TrackerConfig::from_toml(
            r#"
            [database]
            db_path = "/var/lib/tracker/parcels.db"
            busy_timeout_ms = 250
            "#,
        )
        .unwrap();
        assert_eq!(cfg.database.db_path, "/var/lib/tracker/parcels.db");
        assert_eq!(cfg.database.busy_timeout_ms, 250);
    }

    #[test]
    fn empty_path_fails_validation() {
        let cfg = TrackerConfig::from_toml("[database]\ndb_path = \"  \"\n").unwrap();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml").display().to_string();

        let cfg = TrackerConfig::load_with(Some(missing), None).unwrap();
        assert_eq!(cfg, TrackerConfig::default());
    }

    #[test]
    fn named_file_is_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[database]\ndb_path = \"from-file.db\"").unwrap();
        let path = file.path().display().to_string();

        let cfg = TrackerConfig::load_with(Some(path), None).unwrap();
        assert_eq!(cfg.database.db_path, "from-file.db");
    }

    #[test]
    fn db_path_override_wins_over_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[database]\ndb_path = \"from-file.db\"").unwrap();
        let path = file.path().display().to_string();

        let cfg =
            TrackerConfig::load_with(Some(path.clone()), Some("override.db".to_string())).unwrap();
        assert_eq!(cfg.database.db_path, "override.db");

        let cfg = TrackerConfig::load_with(Some(path), Some("  ".to_string())).unwrap();
        assert_eq!(cfg.database.db_path, "from-file.db");
    }

    #[test]
    fn load_default_reads_environment() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[database]\ndb_path = \"from-file.db\"").unwrap();

        std::env::set_var(CONFIG_PATH_ENV, file.path());
        std::env::set_var(DB_PATH_ENV, "from-env.db");
        let with_override = TrackerConfig::load_default();
        std::env::remove_var(DB_PATH_ENV);
        let without_override = TrackerConfig::load_default();
        std::env::remove_var(CONFIG_PATH_ENV);

        assert_eq!(with_override.unwrap().database.db_path, "from-env.db");
        assert_eq!(without_override.unwrap().database.db_path, "from-file.db");
    }

    #[test]
    fn malformed_file_reports_its_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[database").unwrap();
        let err = TrackerConfig::load_from_file(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains(&file.path().display().to_string()));
    }
}
