// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod demo;
mod layouts;
mod memory;
mod sqlite;

pub use demo::{LayoutFaker, demo_document};
pub use layouts::LayoutPersistence;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use anyhow::{Context, Result, anyhow, bail};
use std::env;
use std::fs;
use std::path::PathBuf;

pub const APP_NAME: &str = "crmgrid";
pub const DEFAULT_DOCUMENT_KEY: &str = "user:default";

/// Key-value store holding per-user settings documents.
///
/// A document is one JSON text shared by every table of one user, so
/// writers must go through [`SettingsStore::update`] to avoid dropping
/// another table's entry.
pub trait SettingsStore {
    fn read(&self, key: &str) -> Result<Option<String>>;

    fn write(&self, key: &str, value: &str) -> Result<()>;

    fn remove(&self, key: &str) -> Result<bool>;

    fn keys(&self) -> Result<Vec<String>>;

    /// Read-modify-write of one document. Implementations backed by shared
    /// storage override this to run atomically.
    fn update(
        &self,
        key: &str,
        apply: &mut dyn FnMut(Option<&str>) -> Result<String>,
    ) -> Result<()> {
        let current = self.read(key)?;
        let next = apply(current.as_deref())?;
        self.write(key, &next)
    }
}

impl<S: SettingsStore + ?Sized> SettingsStore for &S {
    fn read(&self, key: &str) -> Result<Option<String>> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        (**self).write(key, value)
    }

    fn remove(&self, key: &str) -> Result<bool> {
        (**self).remove(key)
    }

    fn keys(&self) -> Result<Vec<String>> {
        (**self).keys()
    }

    fn update(
        &self,
        key: &str,
        apply: &mut dyn FnMut(Option<&str>) -> Result<String>,
    ) -> Result<()> {
        (**self).update(key, apply)
    }
}

pub fn default_db_path() -> Result<PathBuf> {
    if let Some(override_path) = env::var_os("CRMGRID_DB_PATH") {
        return Ok(PathBuf::from(override_path));
    }

    let data_root = dirs::data_local_dir().ok_or_else(|| {
        anyhow!("cannot resolve data directory; set CRMGRID_DB_PATH to a writable database path")
    })?;

    let app_dir = data_root.join(APP_NAME);
    fs::create_dir_all(&app_dir)
        .with_context(|| format!("create data directory {}", app_dir.display()))?;
    Ok(app_dir.join("crmgrid.db"))
}

pub fn validate_db_path(path: &str) -> Result<()> {
    if path.is_empty() {
        bail!("database path must not be empty");
    }
    if path == ":memory:" {
        return Ok(());
    }

    if let Some(index) = path.find("://")
        && index > 0
    {
        let scheme = &path[..index];
        if scheme.chars().all(char::is_alphabetic) {
            bail!(
                "database path {path:?} looks like a URI ({scheme}://); pass a filesystem path instead"
            );
        }
    }

    if path.starts_with("file:") {
        bail!("database path {path:?} uses file: URI syntax; pass a plain filesystem path");
    }

    if path.contains('?') {
        bail!(
            "database path {path:?} contains '?'; remove query parameters and use a plain file path"
        );
    }

    Ok(())
}

pub fn validate_document_key(key: &str) -> Result<()> {
    if key.trim().is_empty() {
        bail!("settings document key must not be empty; set [settings].document_key");
    }
    if key.trim() != key {
        bail!("settings document key {key:?} has surrounding whitespace; remove it");
    }
    Ok(())
}
