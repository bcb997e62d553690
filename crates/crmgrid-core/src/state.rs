// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{ColumnId, ColumnLayout, PersistedColumn, SchemaColumn};

/// Column-settings dialog for one table: a draft layout edited by the user,
/// persisted on Update and discarded on Reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSettingsState {
    pub draft: ColumnLayout,
    schema: Vec<SchemaColumn>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsCommand {
    Move { from: usize, to: Option<usize> },
    SetEnabled { column: ColumnId, enabled: bool },
    ResetToDefault,
    Update,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoredReason {
    DragCancelled,
    UnknownColumn,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsEvent {
    LayoutChanged,
    PersistRequested(Vec<PersistedColumn>),
    ResetRequested,
    Ignored(IgnoredReason),
}

impl TableSettingsState {
    /// `schema` is what ResetToDefault rebuilds from; pass it already
    /// narrowed the same way `current` was loaded, or use [`Self::new_with`].
    pub fn new(current: ColumnLayout, schema: Vec<SchemaColumn>) -> Self {
        Self {
            draft: current,
            schema,
            dirty: false,
        }
    }

    /// Like [`Self::new`], keeping only the schema columns `keep` accepts so
    /// a reset never brings back a column the user may not see.
    pub fn new_with<F>(current: ColumnLayout, schema: &[SchemaColumn], keep: F) -> Self
    where
        F: Fn(&ColumnId) -> bool,
    {
        let schema = schema
            .iter()
            .filter(|column| keep(&column.id))
            .cloned()
            .collect();
        Self::new(current, schema)
    }

    pub fn schema(&self) -> &[SchemaColumn] {
        &self.schema
    }

    pub fn dispatch(&mut self, command: SettingsCommand) -> Vec<SettingsEvent> {
        match command {
            SettingsCommand::Move { to: None, .. } => {
                vec![SettingsEvent::Ignored(IgnoredReason::DragCancelled)]
            }
            SettingsCommand::Move { from, to } => {
                if from >= self.draft.len() {
                    return vec![SettingsEvent::Ignored(IgnoredReason::UnknownColumn)];
                }
                if self.draft.reorder(from, to) {
                    self.changed()
                } else {
                    vec![SettingsEvent::Ignored(IgnoredReason::Unchanged)]
                }
            }
            SettingsCommand::SetEnabled { column, enabled } => {
                if self.draft.column(&column).is_none() {
                    return vec![SettingsEvent::Ignored(IgnoredReason::UnknownColumn)];
                }
                if self.draft.set_enabled(&column, enabled) {
                    self.changed()
                } else {
                    vec![SettingsEvent::Ignored(IgnoredReason::Unchanged)]
                }
            }
            SettingsCommand::ResetToDefault => {
                self.draft = ColumnLayout::from_schema(self.draft.table().clone(), &self.schema);
                self.dirty = false;
                vec![SettingsEvent::LayoutChanged, SettingsEvent::ResetRequested]
            }
            SettingsCommand::Update => {
                self.dirty = false;
                vec![SettingsEvent::PersistRequested(self.draft.to_persistable())]
            }
        }
    }

    fn changed(&mut self) -> Vec<SettingsEvent> {
        self.dirty = true;
        vec![SettingsEvent::LayoutChanged]
    }
}
