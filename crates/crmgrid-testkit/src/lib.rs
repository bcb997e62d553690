// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crmgrid_core::ColumnLayout;
use crmgrid_core::persistence::persist;
use serde_json::{Value, json};
use std::path::PathBuf;

const COUNTRIES: [(&str, &str); 8] = [
    ("France", "FR"),
    ("Germany", "DE"),
    ("Spain", "ES"),
    ("Italy", "IT"),
    ("Portugal", "PT"),
    ("Belgium", "BE"),
    ("Netherlands", "NL"),
    ("Poland", "PL"),
];

const AGENT_FIRST_NAMES: [&str; 10] = [
    "Camille", "Lucas", "Ines", "Noah", "Lea", "Hugo", "Chloe", "Louis", "Manon", "Jules",
];
const AGENT_LAST_NAMES: [&str; 8] = [
    "Martin", "Bernard", "Dubois", "Moreau", "Laurent", "Garcia", "Roux", "Fournier",
];
const TAG_COLORS: [&str; 6] = ["#e53935", "#8e24aa", "#1e88e5", "#43a047", "#fb8c00", "#6d4c41"];

/// Country list as the countries endpoint returns it: `{name, code}` rows
/// with a repeated label.
pub fn country_rows() -> Vec<Value> {
    let mut rows: Vec<Value> = COUNTRIES
        .iter()
        .map(|(name, code)| json!({"name": name, "code": code}))
        .collect();
    rows.push(json!({"name": "France", "code": "FX"}));
    rows
}

/// Agent list as the agents endpoint returns it: `{full_name, id, avatar}`
/// rows with numeric ids.
pub fn agent_rows() -> Vec<Value> {
    (0..5)
        .map(|index| {
            json!({
                "full_name": format!("{} {}", AGENT_FIRST_NAMES[index], AGENT_LAST_NAMES[index]),
                "id": 100 + index,
                "avatar": format!("https://cdn.example.test/agents/{}.png", 100 + index),
            })
        })
        .collect()
}

/// Status tags as the statuses endpoint returns them: `{label, value, color}`.
pub fn status_rows() -> Vec<Value> {
    ["New", "Contacted", "Qualified", "Funded", "Lost"]
        .iter()
        .zip(TAG_COLORS)
        .map(|(label, color)| {
            json!({"label": label, "value": label.to_lowercase(), "color": color})
        })
        .collect()
}

/// Customer phone lookup rows: `{phone, customer_id}`.
pub fn phone_rows() -> Vec<Value> {
    vec![
        json!({"phone": "+33612345678", "customer_id": 1}),
        json!({"phone": "33612345678", "customer_id": 2}),
        json!({"phone": "+4915112345678", "customer_id": 3}),
        json!({"phone": "0612345678", "customer_id": 4}),
    ]
}

/// Builds settings documents entry by entry.
#[derive(Debug, Clone, Default)]
pub struct SettingsBlob {
    document: Option<String>,
}

impl SettingsBlob {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layout(mut self, layout: &ColumnLayout) -> Self {
        let next = persist(layout.table(), layout, self.document.as_deref());
        self.document = Some(next.to_string());
        self
    }

    /// Stores `value` verbatim under `table`, for malformed-entry cases.
    pub fn with_raw_entry(self, table: &str, value: Value) -> Self {
        let mut document = self
            .document
            .as_deref()
            .and_then(|raw| serde_json::from_str::<Value>(raw).ok())
            .unwrap_or_else(|| json!({}));
        if let Some(object) = document.as_object_mut() {
            object.insert(table.to_owned(), value);
        }
        Self {
            document: Some(document.to_string()),
        }
    }

    pub fn build(self) -> String {
        self.document.unwrap_or_else(|| "{}".to_owned())
    }
}

pub fn temp_db_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let db_path = dir.path().join("crmgrid.db");
    Ok((dir, db_path))
}

#[cfg(test)]
mod tests {
    use super::{SettingsBlob, agent_rows, country_rows, status_rows};
    use crmgrid_core::persistence::parse_document;
    use crmgrid_core::{ColumnLayout, TableKey, VALIDATION_RULES, default_schema};
    use serde_json::json;

    #[test]
    fn settings_blob_keeps_raw_entries_next_to_layouts() {
        let schema = default_schema(VALIDATION_RULES).unwrap_or_default();
        let layout = ColumnLayout::from_schema(TableKey::from(VALIDATION_RULES), &schema);
        let blob = SettingsBlob::new()
            .with_raw_entry("legacy", json!("not-an-array"))
            .with_layout(&layout)
            .build();
        let document = parse_document(Some(blob.as_str())).unwrap_or_default();
        assert_eq!(document.get("legacy"), Some(&json!("not-an-array")));
        assert!(document.contains_key(VALIDATION_RULES));
    }

    #[test]
    fn option_fixtures_have_expected_shapes() {
        assert_eq!(country_rows().len(), 9);
        assert!(agent_rows().iter().all(|row| row["id"].is_number()));
        assert!(status_rows().iter().all(|row| row["color"].is_string()));
    }
}
