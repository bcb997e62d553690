// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use tracing::debug;

use crate::{ColumnDescriptor, ColumnId, PersistedColumn, SchemaColumn, TableKey};

/// Ordered column descriptors for one table.
///
/// The vector order is the display order; `order` on every descriptor always
/// equals its index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    table: TableKey,
    columns: Vec<ColumnDescriptor>,
}

impl ColumnLayout {
    pub fn from_schema(table: TableKey, schema: &[SchemaColumn]) -> Self {
        let columns = schema
            .iter()
            .enumerate()
            .map(|(order, column)| ColumnDescriptor {
                id: column.id.clone(),
                label: column.label.clone(),
                enabled: column.enabled,
                order,
                width: column.width,
                render: column.render.clone(),
            })
            .collect();
        Self { table, columns }
    }

    /// Builds a layout from stored entries, taking rendering hints from the
    /// schema by id. Entries are sorted by stored order and renumbered.
    pub fn from_persisted(
        table: TableKey,
        persisted: Vec<PersistedColumn>,
        schema: &[SchemaColumn],
    ) -> Self {
        let mut persisted = persisted;
        persisted.sort_by_key(|column| column.order);

        let columns = persisted
            .into_iter()
            .map(|column| {
                let hints = schema.iter().find(|entry| entry.id == column.id);
                ColumnDescriptor {
                    width: hints.and_then(|entry| entry.width),
                    render: hints.and_then(|entry| entry.render.clone()),
                    id: column.id,
                    label: column.label,
                    enabled: column.enabled,
                    order: column.order,
                }
            })
            .collect();

        let mut layout = Self { table, columns };
        layout.renumber();
        layout
    }

    pub fn table(&self) -> &TableKey {
        &self.table
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column(&self, id: &ColumnId) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|column| &column.id == id)
    }

    pub fn visible_columns(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns.iter().filter(|column| column.enabled)
    }

    /// Moves the column at `source` to `dest`. A `None` destination is a
    /// cancelled drag and leaves the layout untouched, as does an
    /// out-of-range source. Destinations past the end clamp to the last slot.
    pub fn reorder(&mut self, source: usize, dest: Option<usize>) -> bool {
        let Some(dest) = dest else {
            return false;
        };
        if source >= self.columns.len() {
            debug!(table = %self.table, source, "reorder source out of range; ignoring");
            return false;
        }

        let dest = dest.min(self.columns.len() - 1);
        let column = self.columns.remove(source);
        self.columns.insert(dest, column);
        self.renumber();
        source != dest
    }

    /// Matches strictly by id; labels are display text and may repeat.
    pub fn set_enabled(&mut self, id: &ColumnId, enabled: bool) -> bool {
        match self.columns.iter_mut().find(|column| &column.id == id) {
            Some(column) => {
                let changed = column.enabled != enabled;
                column.enabled = enabled;
                changed
            }
            None => {
                debug!(table = %self.table, column = %id, "unknown column id; ignoring toggle");
                false
            }
        }
    }

    pub fn to_persistable(&self) -> Vec<PersistedColumn> {
        self.columns.iter().map(PersistedColumn::from).collect()
    }

    fn renumber(&mut self) {
        for (order, column) in self.columns.iter_mut().enumerate() {
            column.order = order;
        }
    }
}
