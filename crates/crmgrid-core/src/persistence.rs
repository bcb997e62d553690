// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Reconciliation of a per-user settings document against a table's default
//! schema.
//!
//! The settings document is one JSON object shared by every table the user
//! has customized:
//!
//! ```json
//! {"customerInfo": [{"id": "name", "label": "Name", "enabled": true, "order": 0}],
//!  "agentsTable": [...]}
//! ```
//!
//! Reads never fail: a missing, malformed, or stale entry falls back to the
//! default schema. Writes replace exactly one table entry and leave every
//! other key as it was.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::{ColumnId, ColumnLayout, PersistedColumn, SchemaColumn, TableKey};

/// Parses a settings document, treating anything that is not a JSON object
/// as absent.
pub fn parse_document(blob: Option<&str>) -> Option<Map<String, Value>> {
    let raw = blob?;
    if raw.trim().is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(document)) => Some(document),
        Ok(other) => {
            warn!(kind = json_kind(&other), "settings document is not an object; ignoring");
            None
        }
        Err(error) => {
            warn!(%error, "settings document is not valid JSON; ignoring");
            None
        }
    }
}

/// Returns the stored entry for `table`, if present and well-formed.
pub fn stored_entry(blob: Option<&str>, table: &TableKey) -> Option<Vec<PersistedColumn>> {
    let mut document = parse_document(blob)?;
    let entry = document.remove(table.as_str())?;
    match serde_json::from_value::<Vec<PersistedColumn>>(entry) {
        Ok(columns) => Some(columns),
        Err(error) => {
            warn!(table = %table, %error, "stored layout entry is malformed; ignoring");
            None
        }
    }
}

pub fn reconcile(blob: Option<&str>, schema: &[SchemaColumn], table: &TableKey) -> ColumnLayout {
    reconcile_with(blob, schema, table, |_| true)
}

/// Resolves the layout for `table`.
///
/// `keep` narrows both the stored entry and the default schema before they
/// are compared, e.g. to hide columns a company type never shows. If the
/// narrowed lists differ in length the stored entry is stale and the whole
/// layout resets to the default; no partial repair is attempted.
pub fn reconcile_with<F>(
    blob: Option<&str>,
    schema: &[SchemaColumn],
    table: &TableKey,
    keep: F,
) -> ColumnLayout
where
    F: Fn(&ColumnId) -> bool,
{
    let defaults: Vec<SchemaColumn> = schema
        .iter()
        .filter(|column| keep(&column.id))
        .cloned()
        .collect();

    let Some(stored) = stored_entry(blob, table) else {
        debug!(table = %table, "no stored layout; using defaults");
        return ColumnLayout::from_schema(table.clone(), &defaults);
    };

    let stored: Vec<PersistedColumn> = stored
        .into_iter()
        .filter(|column| keep(&column.id))
        .collect();

    if stored.len() != defaults.len() {
        debug!(
            table = %table,
            stored = stored.len(),
            expected = defaults.len(),
            "stored layout does not match schema size; resetting to defaults"
        );
        return ColumnLayout::from_schema(table.clone(), &defaults);
    }

    ColumnLayout::from_persisted(table.clone(), stored, &defaults)
}

/// Merges `layout` into the existing settings document under `table`.
///
/// A malformed existing document cannot be preserved and is replaced.
pub fn persist(table: &TableKey, layout: &ColumnLayout, existing: Option<&str>) -> Value {
    let mut document = parse_document(existing).unwrap_or_default();
    let entry = layout
        .to_persistable()
        .iter()
        .map(persisted_value)
        .collect::<Vec<_>>();
    document.insert(table.as_str().to_owned(), Value::Array(entry));
    Value::Object(document)
}

/// Drops the entry for `table` so the next read resolves to defaults.
pub fn discard(table: &TableKey, existing: Option<&str>) -> Value {
    let mut document = parse_document(existing).unwrap_or_default();
    document.remove(table.as_str());
    Value::Object(document)
}

fn persisted_value(column: &PersistedColumn) -> Value {
    let mut entry = Map::new();
    entry.insert("id".to_owned(), Value::String(column.id.as_str().to_owned()));
    entry.insert("enabled".to_owned(), Value::Bool(column.enabled));
    entry.insert("label".to_owned(), Value::String(column.label.clone()));
    entry.insert("order".to_owned(), Value::from(column.order));
    Value::Object(entry)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
