// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use crmgrid_core::SchemaColumn;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_VERSION: i64 = 1;
const DEFAULT_LOG_LEVEL: &str = "warn";
const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub storage: Storage,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub log: Log,
    #[serde(default)]
    pub tables: BTreeMap<String, TableSchema>,
    #[serde(default)]
    pub payload: Payload,
    #[serde(default)]
    pub options: Options,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            storage: Storage::default(),
            settings: Settings::default(),
            log: Log::default(),
            tables: BTreeMap::new(),
            payload: Payload::default(),
            options: Options::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Storage {
    pub db_path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    pub document_key: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Log {
    pub level: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TableSchema {
    pub columns: Vec<SchemaColumn>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Payload {
    #[serde(default)]
    pub strip_keys: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Options {
    pub phone_country_code: Option<String>,
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("CRMGRID_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set CRMGRID_CONFIG_PATH to the config file")
        })?;

        let app_dir = config_root.join(crmgrid_store::APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` and place values under [storage], [settings], [log], [tables], and [payload]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1. Regenerate it with --print-example-config",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(db_path) = &self.storage.db_path {
            crmgrid_store::validate_db_path(db_path)?;
        }

        if let Some(key) = &self.settings.document_key {
            crmgrid_store::validate_document_key(key)
                .with_context(|| format!("invalid [settings] in {}", path.display()))?;
        }

        if let Some(level) = &self.log.level
            && !LOG_LEVELS.contains(&level.as_str())
        {
            bail!(
                "log.level in {} must be one of {}, got {level:?}",
                path.display(),
                LOG_LEVELS.join(", ")
            );
        }

        for (table, schema) in &self.tables {
            if schema.columns.is_empty() {
                bail!(
                    "tables.{table}.columns in {} must list at least one column",
                    path.display()
                );
            }
            let mut seen = BTreeSet::new();
            for column in &schema.columns {
                if !seen.insert(column.id.as_str()) {
                    bail!(
                        "tables.{table}.columns in {} repeats column id {:?}; column ids must be unique",
                        path.display(),
                        column.id.as_str()
                    );
                }
            }
        }

        if let Some(code) = &self.options.phone_country_code
            && (code.is_empty() || !code.chars().all(|ch| ch.is_ascii_digit()))
        {
            bail!(
                "options.phone_country_code in {} must be digits only (for example \"33\"), got {code:?}",
                path.display()
            );
        }

        Ok(())
    }

    pub fn db_path(&self) -> Result<PathBuf> {
        match &self.storage.db_path {
            Some(path) => Ok(PathBuf::from(path)),
            None => crmgrid_store::default_db_path(),
        }
    }

    pub fn document_key(&self) -> &str {
        self.settings
            .document_key
            .as_deref()
            .unwrap_or(crmgrid_store::DEFAULT_DOCUMENT_KEY)
    }

    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn table_schemas(&self) -> impl Iterator<Item = (&str, &[SchemaColumn])> {
        self.tables
            .iter()
            .map(|(table, schema)| (table.as_str(), schema.columns.as_slice()))
    }

    pub fn extra_strip_keys(&self) -> &[String] {
        &self.payload.strip_keys
    }

    pub fn phone_country_code(&self) -> Option<&str> {
        self.options.phone_country_code.as_deref()
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# crmgrid config\n# Place this file at: {}\n\nversion = 1\n\n[storage]\n# Optional. Default is platform data dir (for example ~/.local/share/crmgrid/crmgrid.db)\n# db_path = \"/absolute/path/to/crmgrid.db\"\n\n[settings]\n# Settings document holding this user's table layouts\ndocument_key = \"{}\"\n\n[log]\n# off, error, warn, info, debug, trace (CRMGRID_LOG overrides)\nlevel = \"{}\"\n\n[payload]\n# Display-only keys removed from outgoing request bodies, on top of perPage/currentPage\nstrip_keys = []\n\n[options]\n# Country calling code tried when narrowing phone option lists\n# phone_country_code = \"33\"\n\n# Extra or overriding table schemas\n# [tables.leadsTable]\n# columns = [\n#   {{ id = \"name\", label = \"Name\" }},\n#   {{ id = \"source\", label = \"Source\", enabled = false }},\n# ]\n",
            path.display(),
            crmgrid_store::DEFAULT_DOCUMENT_KEY,
            DEFAULT_LOG_LEVEL,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::Config;
    use anyhow::Result;
    use std::path::PathBuf;
    use std::sync::{Mutex, OnceLock};

    fn write_config(content: &str) -> Result<(tempfile::TempDir, PathBuf)> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        std::fs::write(&path, content)?;
        Ok((temp, path))
    }

    fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        match ENV_LOCK.get_or_init(|| Mutex::new(())).lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    #[test]
    fn missing_config_uses_defaults() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let config = Config::load(&temp.path().join("missing.toml"))?;
        assert_eq!(config.version, 1);
        assert_eq!(config.document_key(), "user:default");
        assert_eq!(config.log_level(), "warn");
        assert!(config.extra_strip_keys().is_empty());
        Ok(())
    }

    #[test]
    fn unversioned_config_is_rejected_with_actionable_message() -> Result<()> {
        let (_temp, path) = write_config("[settings]\ndocument_key = \"user:1\"\n")?;
        let error = Config::load(&path).expect_err("unversioned config should fail");
        let message = error.to_string();
        assert!(message.contains("version = 1"));
        assert!(message.contains("[storage], [settings]"));
        Ok(())
    }

    #[test]
    fn v1_config_parses() -> Result<()> {
        let (_temp, path) = write_config(
            "version = 1\n[settings]\ndocument_key = \"user:42\"\n[log]\nlevel = \"debug\"\n[payload]\nstrip_keys = [\"pageSize\"]\n[options]\nphone_country_code = \"33\"\n[tables.leadsTable]\ncolumns = [{ id = \"name\", label = \"Name\" }, { id = \"source\", label = \"Source\", enabled = false }]\n",
        )?;

        let config = Config::load(&path)?;
        assert_eq!(config.document_key(), "user:42");
        assert_eq!(config.log_level(), "debug");
        assert_eq!(config.extra_strip_keys(), ["pageSize".to_owned()]);
        assert_eq!(config.phone_country_code(), Some("33"));

        let tables: Vec<_> = config.table_schemas().collect();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].0, "leadsTable");
        assert!(!tables[0].1[1].enabled);
        Ok(())
    }

    #[test]
    fn malformed_config_returns_parse_error() -> Result<()> {
        let (_temp, path) = write_config("{{not toml")?;
        let error = Config::load(&path).expect_err("malformed config should fail");
        assert!(error.to_string().contains("parse TOML config"));
        Ok(())
    }

    #[test]
    fn unsupported_config_version_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 2\n")?;
        let error = Config::load(&path).expect_err("v2 config should fail");
        assert!(error.to_string().contains("unsupported config version 2"));
        Ok(())
    }

    #[test]
    fn unknown_log_level_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[log]\nlevel = \"loud\"\n")?;
        let error = Config::load(&path).expect_err("unknown level should fail");
        assert!(error.to_string().contains("log.level"));
        Ok(())
    }

    #[test]
    fn blank_document_key_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[settings]\ndocument_key = \"  \"\n")?;
        let error = Config::load(&path).expect_err("blank key should fail");
        assert!(format!("{error:#}").contains("must not be empty"));
        Ok(())
    }

    #[test]
    fn duplicate_table_column_ids_are_rejected() -> Result<()> {
        let (_temp, path) = write_config(
            "version = 1\n[tables.leadsTable]\ncolumns = [{ id = \"name\", label = \"Name\" }, { id = \"name\", label = \"Again\" }]\n",
        )?;
        let error = Config::load(&path).expect_err("duplicate ids should fail");
        assert!(error.to_string().contains("repeats column id"));
        Ok(())
    }

    #[test]
    fn non_numeric_country_code_is_rejected() -> Result<()> {
        let (_temp, path) =
            write_config("version = 1\n[options]\nphone_country_code = \"+33\"\n")?;
        let error = Config::load(&path).expect_err("non-digit code should fail");
        assert!(error.to_string().contains("digits only"));
        Ok(())
    }

    #[test]
    fn default_path_honors_env_override() -> Result<()> {
        let _guard = env_lock();
        let temp = tempfile::tempdir()?;
        let override_path = temp.path().join("custom-config.toml");
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var("CRMGRID_CONFIG_PATH", &override_path);
        }
        let resolved = Config::default_path()?;
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var("CRMGRID_CONFIG_PATH");
        }
        assert_eq!(resolved, override_path);
        Ok(())
    }

    #[test]
    fn db_path_prefers_storage_config_over_env_override() -> Result<()> {
        let _guard = env_lock();
        let (_temp, path) =
            write_config("version = 1\n[storage]\ndb_path = \"/explicit/from-config.db\"\n")?;
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var("CRMGRID_DB_PATH", "/from/env.db");
        }
        let config = Config::load(&path)?;
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var("CRMGRID_DB_PATH");
        }
        assert_eq!(config.db_path()?, PathBuf::from("/explicit/from-config.db"));
        Ok(())
    }

    #[test]
    fn db_path_uses_env_override_when_storage_db_path_missing() -> Result<()> {
        let _guard = env_lock();
        let (_temp, path) = write_config("version = 1\n")?;
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var("CRMGRID_DB_PATH", "/from/env-only.db");
        }
        let config = Config::load(&path)?;
        let resolved = config.db_path()?;
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var("CRMGRID_DB_PATH");
        }
        assert_eq!(resolved, PathBuf::from("/from/env-only.db"));
        Ok(())
    }

    #[test]
    fn db_path_rejects_uri_style_storage_value() -> Result<()> {
        let (_temp, path) =
            write_config("version = 1\n[storage]\ndb_path = \"file:crmgrid.db?mode=ro\"\n")?;
        let error = Config::load(&path).expect_err("URI db path should fail");
        assert!(error.to_string().contains("file: URI syntax"));
        Ok(())
    }

    #[test]
    fn example_config_parses_and_includes_sections() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        let example = Config::example_config(&path);
        assert!(example.contains("version = 1"));
        assert!(example.contains("[storage]"));
        assert!(example.contains("[settings]"));
        assert!(example.contains("[payload]"));

        std::fs::write(&path, &example)?;
        let config = Config::load(&path)?;
        assert_eq!(config.document_key(), "user:default");
        Ok(())
    }
}
