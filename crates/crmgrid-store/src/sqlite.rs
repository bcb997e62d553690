// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use rusqlite::{Connection, OptionalExtension, Transaction, TransactionBehavior, params};
use std::collections::BTreeSet;
use std::path::Path;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::debug;

use crate::{SettingsStore, demo_document, validate_db_path};

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS user_settings (
  key TEXT PRIMARY KEY,
  value TEXT NOT NULL,
  updated_at TEXT NOT NULL
);
";

const REQUIRED_SCHEMA: &[(&str, &[&str])] = &[("user_settings", &["key", "value", "updated_at"])];

/// Settings documents in a SQLite table, one row per document key.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        let printable = path.to_string_lossy().to_string();
        validate_db_path(&printable)?;
        let conn = Connection::open(path)
            .with_context(|| format!("open database at {}", path.display()))?;
        configure_connection(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory database")?;
        configure_connection(&conn)?;
        Ok(Self { conn })
    }

    pub fn raw_connection(&self) -> &Connection {
        &self.conn
    }

    pub fn bootstrap(&self) -> Result<()> {
        let mut missing_tables = Vec::new();
        for (table, _) in REQUIRED_SCHEMA {
            if !table_exists(&self.conn, table)? {
                missing_tables.push(*table);
            }
        }

        if missing_tables.len() == REQUIRED_SCHEMA.len() {
            self.conn
                .execute_batch(SCHEMA_SQL)
                .context("create settings schema")?;
            return Ok(());
        }

        validate_schema(&self.conn)
    }

    /// Replaces `document_key` with a generated set of customized layouts.
    pub fn seed_demo_data(&self, document_key: &str) -> Result<()> {
        let document = demo_document();
        self.write(document_key, &document)
            .with_context(|| format!("seed demo settings into {document_key}"))?;
        debug!(document_key, bytes = document.len(), "demo settings seeded");
        Ok(())
    }

    pub fn updated_at(&self, key: &str) -> Result<Option<OffsetDateTime>> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT updated_at FROM user_settings WHERE key = ?",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .with_context(|| format!("read update time of settings document {key}"))?;
        raw.map(|value| {
            OffsetDateTime::parse(&value, &Rfc3339)
                .with_context(|| format!("settings document {key} has invalid updated_at {value:?}"))
        })
        .transpose()
    }
}

impl SettingsStore for SqliteStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        read_value(&self.conn, key)
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        write_value(&self.conn, key, value)
    }

    fn remove(&self, key: &str) -> Result<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM user_settings WHERE key = ?", params![key])
            .with_context(|| format!("delete settings document {key}"))?;
        Ok(removed > 0)
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key FROM user_settings ORDER BY key ASC")
            .context("prepare settings keys query")?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .context("query settings keys")?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("collect settings keys")
    }

    /// Holds a write lock across the read and the write so two writers of
    /// the same document serialize instead of overwriting each other.
    fn update(
        &self,
        key: &str,
        apply: &mut dyn FnMut(Option<&str>) -> Result<String>,
    ) -> Result<()> {
        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)
            .with_context(|| format!("begin update of settings document {key}"))?;
        let current = read_value(&tx, key)?;
        let next = apply(current.as_deref())?;
        write_value(&tx, key, &next)?;
        tx.commit()
            .with_context(|| format!("commit settings document {key}"))?;
        debug!(key, bytes = next.len(), "settings document updated");
        Ok(())
    }
}

fn read_value(conn: &Connection, key: &str) -> Result<Option<String>> {
    conn.query_row(
        "SELECT value FROM user_settings WHERE key = ?",
        params![key],
        |row| row.get::<_, String>(0),
    )
    .optional()
    .with_context(|| format!("read settings document {key}"))
}

fn write_value(conn: &Connection, key: &str, value: &str) -> Result<()> {
    let now = now_rfc3339()?;
    conn.execute(
        "
        INSERT INTO user_settings (key, value, updated_at)
        VALUES (?, ?, ?)
        ON CONFLICT(key) DO UPDATE SET
          value = excluded.value,
          updated_at = excluded.updated_at
        ",
        params![key, value, now],
    )
    .with_context(|| format!("upsert settings document {key}"))?;
    Ok(())
}

fn validate_schema(conn: &Connection) -> Result<()> {
    for (table, required_columns) in REQUIRED_SCHEMA {
        if !table_exists(conn, table)? {
            bail!(
                "database is missing required table `{table}`; use a crmgrid-compatible database or migrate first"
            );
        }

        let columns = table_columns(conn, table)?;
        let missing: Vec<&str> = required_columns
            .iter()
            .copied()
            .filter(|column| !columns.contains(*column))
            .collect();

        if !missing.is_empty() {
            bail!(
                "table `{table}` is missing required columns: {}; run migration before launching",
                missing.join(", ")
            );
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let exists = conn
        .query_row(
            "
            SELECT EXISTS(
              SELECT 1
              FROM sqlite_master
              WHERE type = 'table' AND name = ?
            )
            ",
            params![table],
            |row| row.get::<_, i64>(0),
        )
        .with_context(|| format!("check table existence for {table}"))?;
    Ok(exists == 1)
}

fn table_columns(conn: &Connection, table: &str) -> Result<BTreeSet<String>> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({table})"))
        .with_context(|| format!("inspect columns for {table}"))?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .with_context(|| format!("query column info for {table}"))?;

    let names = rows
        .collect::<rusqlite::Result<BTreeSet<_>>>()
        .with_context(|| format!("collect columns for {table}"))?;
    Ok(names)
}

fn configure_connection(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        PRAGMA busy_timeout = 5000;
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        ",
    )
    .context("configure sqlite pragmas")
}

fn now_rfc3339() -> Result<String> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .context("format current timestamp")
}

#[cfg(test)]
mod tests {
    use super::SqliteStore;
    use crate::SettingsStore;
    use anyhow::Result;
    use crmgrid_core::persistence::parse_document;

    #[test]
    fn bootstrap_is_idempotent() -> Result<()> {
        let store = SqliteStore::open_memory()?;
        store.bootstrap()?;
        store.write("doc", "{}")?;
        store.bootstrap()?;
        assert_eq!(store.read("doc")?.as_deref(), Some("{}"));
        Ok(())
    }

    #[test]
    fn write_records_update_time() -> Result<()> {
        let store = SqliteStore::open_memory()?;
        store.bootstrap()?;
        assert!(store.updated_at("doc")?.is_none());
        store.write("doc", "{}")?;
        assert!(store.updated_at("doc")?.is_some());
        Ok(())
    }

    #[test]
    fn seed_demo_data_writes_every_standard_table() -> Result<()> {
        let store = SqliteStore::open_memory()?;
        store.bootstrap()?;
        store.seed_demo_data("user:demo")?;
        let raw = store.read("user:demo")?;
        let document = parse_document(raw.as_deref()).unwrap_or_default();
        assert_eq!(document.len(), crmgrid_core::standard_tables().len());
        Ok(())
    }

    #[test]
    fn failed_update_rolls_back() -> Result<()> {
        let store = SqliteStore::open_memory()?;
        store.bootstrap()?;
        store.write("doc", "before")?;
        let result = store.update("doc", &mut |_| anyhow::bail!("reject"));
        assert!(result.is_err());
        assert_eq!(store.read("doc")?.as_deref(), Some("before"));
        Ok(())
    }
}
