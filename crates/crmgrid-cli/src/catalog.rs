// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use crmgrid_core::{SchemaColumn, TableKey, default_schema, standard_tables};
use std::collections::BTreeMap;

use crate::config::Config;

/// Default schemas of every table the console knows: the standard CRM
/// tables, then `[tables.*]` entries from the config replacing or adding.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tables: BTreeMap<TableKey, Vec<SchemaColumn>>,
}

impl Catalog {
    pub fn standard() -> Self {
        let tables = standard_tables()
            .iter()
            .filter_map(|table| {
                default_schema(table).map(|schema| (TableKey::from(*table), schema))
            })
            .collect();
        Self { tables }
    }

    pub fn from_config(config: &Config) -> Self {
        let mut catalog = Self::standard();
        for (table, columns) in config.table_schemas() {
            catalog.tables.insert(TableKey::from(table), columns.to_vec());
        }
        catalog
    }

    pub fn keys(&self) -> impl Iterator<Item = &TableKey> {
        self.tables.keys()
    }

    pub fn schema(&self, table: &TableKey) -> Result<&[SchemaColumn]> {
        self.tables.get(table).map(Vec::as_slice).ok_or_else(|| {
            let known: Vec<&str> = self.tables.keys().map(TableKey::as_str).collect();
            anyhow!(
                "unknown table `{table}`; known tables: {} (add more under [tables.<key>] in the config)",
                known.join(", ")
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::Catalog;
    use crate::config::Config;
    use anyhow::Result;
    use crmgrid_core::TableKey;

    #[test]
    fn config_tables_override_and_extend_standard_ones() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        std::fs::write(
            &path,
            "version = 1\n[tables.agentsTable]\ncolumns = [{ id = \"name\", label = \"Agent\" }]\n[tables.leadsTable]\ncolumns = [{ id = \"source\", label = \"Source\" }]\n",
        )?;
        let catalog = Catalog::from_config(&Config::load(&path)?);

        assert_eq!(catalog.schema(&TableKey::from("agentsTable"))?.len(), 1);
        assert_eq!(catalog.schema(&TableKey::from("leadsTable"))?[0].label, "Source");
        assert!(catalog.schema(&TableKey::from("customerInfo"))?.len() > 1);
        Ok(())
    }

    #[test]
    fn unknown_table_lists_known_ones() {
        let error = Catalog::standard()
            .schema(&TableKey::from("nope"))
            .expect_err("unknown table should fail");
        let message = error.to_string();
        assert!(message.contains("unknown table"));
        assert!(message.contains("customerInfo"));
    }
}
