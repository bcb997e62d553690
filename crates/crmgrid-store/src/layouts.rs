// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crmgrid_core::persistence::{discard, parse_document, persist, reconcile_with};
use crmgrid_core::{ColumnId, ColumnLayout, SchemaColumn, TableKey};
use tracing::{info, warn};

use crate::SettingsStore;

/// Column layouts of one user, stored as a single settings document.
pub struct LayoutPersistence<S> {
    store: S,
    document_key: String,
}

impl<S: SettingsStore> LayoutPersistence<S> {
    pub fn new(store: S, document_key: impl Into<String>) -> Self {
        Self {
            store,
            document_key: document_key.into(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn document_key(&self) -> &str {
        &self.document_key
    }

    pub fn load(&self, table: &TableKey, schema: &[SchemaColumn]) -> ColumnLayout {
        self.load_with(table, schema, |_| true)
    }

    /// Never fails: an unreadable document is treated like a missing one so
    /// the table still renders with its defaults.
    pub fn load_with<F>(&self, table: &TableKey, schema: &[SchemaColumn], keep: F) -> ColumnLayout
    where
        F: Fn(&ColumnId) -> bool,
    {
        let blob = match self.store.read(&self.document_key) {
            Ok(blob) => blob,
            Err(error) => {
                warn!(
                    table = %table,
                    document = %self.document_key,
                    error = format!("{error:#}"),
                    "cannot read settings document; using defaults"
                );
                None
            }
        };
        reconcile_with(blob.as_deref(), schema, table, keep)
    }

    pub fn save(&self, table: &TableKey, layout: &ColumnLayout) -> Result<()> {
        self.store
            .update(&self.document_key, &mut |existing| {
                serde_json::to_string(&persist(table, layout, existing))
                    .context("encode settings document")
            })
            .with_context(|| format!("save layout for table {table}"))?;
        info!(table = %table, columns = layout.len(), "layout saved");
        Ok(())
    }

    /// Discards the stored entry for `table` and returns its default layout.
    pub fn reset(&self, table: &TableKey, schema: &[SchemaColumn]) -> Result<ColumnLayout> {
        self.reset_with(table, schema, |_| true)
    }

    /// Like [`Self::reset`], narrowing the defaults with the same `keep`
    /// predicate given to [`Self::load_with`].
    pub fn reset_with<F>(
        &self,
        table: &TableKey,
        schema: &[SchemaColumn],
        keep: F,
    ) -> Result<ColumnLayout>
    where
        F: Fn(&ColumnId) -> bool,
    {
        self.store
            .update(&self.document_key, &mut |existing| {
                serde_json::to_string(&discard(table, existing)).context("encode settings document")
            })
            .with_context(|| format!("reset layout for table {table}"))?;
        info!(table = %table, "layout reset to defaults");
        let defaults: Vec<SchemaColumn> = schema
            .iter()
            .filter(|column| keep(&column.id))
            .cloned()
            .collect();
        Ok(ColumnLayout::from_schema(table.clone(), &defaults))
    }

    /// Tables with an entry in the document, in key order.
    pub fn stored_tables(&self) -> Result<Vec<TableKey>> {
        let blob = self.store.read(&self.document_key)?;
        Ok(parse_document(blob.as_deref())
            .map(|document| document.keys().map(|key| TableKey::from(key.as_str())).collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::LayoutPersistence;
    use crate::{MemoryStore, SettingsStore};
    use anyhow::Result;
    use crmgrid_core::{ColumnId, SchemaColumn, TableKey};

    fn schema() -> Vec<SchemaColumn> {
        vec![SchemaColumn::new("a", "A"), SchemaColumn::new("b", "B")]
    }

    #[test]
    fn save_then_load_round_trips() -> Result<()> {
        let layouts = LayoutPersistence::new(MemoryStore::new(), "user:1");
        let table = TableKey::from("customerInfo");
        let mut layout = layouts.load(&table, &schema());
        layout.reorder(1, Some(0));
        layouts.save(&table, &layout)?;
        assert_eq!(layouts.load(&table, &schema()), layout);
        Ok(())
    }

    #[test]
    fn reset_keeps_other_tables() -> Result<()> {
        let layouts = LayoutPersistence::new(MemoryStore::new(), "user:1");
        let customers = TableKey::from("customerInfo");
        let agents = TableKey::from("agentsTable");

        let mut layout = layouts.load(&customers, &schema());
        layout.set_enabled(&ColumnId::from("a"), false);
        layouts.save(&customers, &layout)?;
        layouts.save(&agents, &layouts.load(&agents, &schema()))?;

        let reset = layouts.reset(&customers, &schema())?;
        assert!(reset.columns().iter().all(|column| column.enabled));
        assert_eq!(layouts.stored_tables()?, vec![agents]);
        Ok(())
    }

    #[test]
    fn reset_with_keeps_filtered_columns_out() -> Result<()> {
        let layouts = LayoutPersistence::new(MemoryStore::new(), "user:1");
        let table = TableKey::from("customerInfo");
        let keep = |id: &ColumnId| id.as_str() != "b";

        let loaded = layouts.load_with(&table, &schema(), keep);
        layouts.save(&table, &loaded)?;
        let reset = layouts.reset_with(&table, &schema(), keep)?;

        assert_eq!(reset, loaded);
        assert!(reset.column(&ColumnId::from("b")).is_none());
        assert!(layouts.stored_tables()?.is_empty());
        Ok(())
    }

    #[test]
    fn garbage_document_loads_defaults_and_is_replaced_on_save() -> Result<()> {
        let store = MemoryStore::with_entry("user:1", "<<garbage>>");
        let layouts = LayoutPersistence::new(&store, "user:1");
        let table = TableKey::from("customerInfo");

        let layout = layouts.load(&table, &schema());
        assert_eq!(layout.len(), 2);
        layouts.save(&table, &layout)?;

        let raw = store.read("user:1")?.unwrap_or_default();
        assert!(raw.starts_with('{'));
        Ok(())
    }
}
