// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use crmgrid_core::options::{PhoneNormalizer, json_mapper, narrow_by_exact_match, normalize};
use crmgrid_core::{
    ColumnId, ColumnLayout, EndpointProfile, FieldAction, FilterSet, FilterSetSnapshot, Grants,
    IgnoredReason, SettingsCommand, SettingsEvent, SortSpec, TableKey, TableSettingsState,
};
use crmgrid_store::{LayoutPersistence, SettingsStore};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::catalog::Catalog;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutAction {
    Print,
    Show(ColumnId),
    Hide(ColumnId),
    Move { from: usize, to: usize },
    Reset,
}

/// Input of the `payload` command: a saved filter preset plus the request
/// context it is sent with.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PayloadRequest {
    #[serde(default)]
    pub filters: FilterSetSnapshot,
    #[serde(default)]
    pub sort: Option<SortSpec>,
    #[serde(default)]
    pub profile: Option<EndpointProfile>,
    /// Field ids the user may filter on; absent means unrestricted.
    #[serde(default)]
    pub filterable: Option<Vec<String>>,
}

pub struct ConsoleRuntime<S> {
    layouts: LayoutPersistence<S>,
    catalog: Catalog,
    strip_keys: Vec<String>,
    phones: PhoneNormalizer,
}

impl<S: SettingsStore> ConsoleRuntime<S> {
    pub fn new(layouts: LayoutPersistence<S>, catalog: Catalog) -> Self {
        Self {
            layouts,
            catalog,
            strip_keys: Vec::new(),
            phones: PhoneNormalizer::new(),
        }
    }

    pub fn with_strip_keys(mut self, keys: &[String]) -> Self {
        self.strip_keys = keys.to_vec();
        self
    }

    pub fn with_phone_country_code(mut self, code: Option<&str>) -> Self {
        self.phones = code.map_or_else(PhoneNormalizer::new, PhoneNormalizer::with_country_code);
        self
    }

    pub fn tables(&self) -> Result<String> {
        let customized = self.layouts.stored_tables()?;
        let lines: Vec<String> = self
            .catalog
            .keys()
            .map(|table| {
                if customized.contains(table) {
                    format!("{table} (customized)")
                } else {
                    table.to_string()
                }
            })
            .collect();
        Ok(lines.join("\n"))
    }

    pub fn layout(&self, table: &TableKey, action: LayoutAction) -> Result<String> {
        let schema = self.catalog.schema(table)?.to_vec();
        let current = self.layouts.load(table, &schema);
        let command = match action {
            LayoutAction::Print => return Ok(render_layout(&current)),
            LayoutAction::Show(column) => SettingsCommand::SetEnabled {
                column,
                enabled: true,
            },
            LayoutAction::Hide(column) => SettingsCommand::SetEnabled {
                column,
                enabled: false,
            },
            LayoutAction::Move { from, to } => SettingsCommand::Move { from, to: Some(to) },
            LayoutAction::Reset => SettingsCommand::ResetToDefault,
        };

        let mut state = TableSettingsState::new(current, schema);
        let mut events = state.dispatch(command);
        if state.dirty {
            events.extend(state.dispatch(SettingsCommand::Update));
        }

        let mut notes = Vec::new();
        for event in events {
            match event {
                SettingsEvent::PersistRequested(_) => self.layouts.save(table, &state.draft)?,
                SettingsEvent::ResetRequested => {
                    state.draft = self.layouts.reset(table, state.schema())?;
                }
                SettingsEvent::Ignored(reason) => notes.push(ignored_note(reason)),
                SettingsEvent::LayoutChanged => {}
            }
        }

        let mut output = render_layout(&state.draft);
        for note in notes {
            output.push('\n');
            output.push_str(note);
        }
        Ok(output)
    }

    pub fn payload(&self, raw: &str) -> Result<String> {
        let request: PayloadRequest = serde_json::from_str(raw).context(
            "decode payload request; expected {\"filters\": {...}, \"sort\"?: {...}, \"profile\"?: {...}}",
        )?;

        let mut filters = FilterSet::from_snapshot(&request.filters);
        if let Some(filterable) = &request.filterable {
            let grants = filterable
                .iter()
                .fold(Grants::default(), |grants, field| {
                    grants.grant(FieldAction::Filter, field)
                });
            let dropped = filters.retain_permitted(&grants);
            if dropped > 0 {
                info!(dropped, "dropped filters the user may not apply");
            }
        }

        let profile = self
            .strip_keys
            .iter()
            .fold(request.profile.unwrap_or_default(), |profile, key| {
                profile.strip(key)
            });
        let payload = filters.build_payload(request.sort.as_ref(), &profile);
        serde_json::to_string_pretty(&payload).context("encode request payload")
    }

    pub fn options(
        &self,
        raw: &str,
        label_key: &str,
        value_key: &str,
        query: Option<&str>,
    ) -> Result<String> {
        let document: Value = serde_json::from_str(raw).context("decode option rows as JSON")?;
        let rows = match &document {
            Value::Array(rows) => rows.as_slice(),
            Value::Object(object) => match object.get("data") {
                Some(Value::Array(rows)) => rows.as_slice(),
                _ => bail!("option rows must be a JSON array or an object with a `data` array"),
            },
            _ => bail!("option rows must be a JSON array or an object with a `data` array"),
        };

        let options = normalize(rows.iter(), json_mapper(label_key, value_key));
        let narrowed = narrow_by_exact_match(options, query, |query| self.phones.candidates(query));
        serde_json::to_string_pretty(&narrowed).context("encode options")
    }
}

fn render_layout(layout: &ColumnLayout) -> String {
    let visible = layout.visible_columns().count();
    let mut lines = vec![format!(
        "{} ({} columns, {} visible)",
        layout.table(),
        layout.len(),
        visible
    )];
    for column in layout.columns() {
        let mark = if column.enabled { 'x' } else { ' ' };
        lines.push(format!(
            "{:>3}  [{mark}] {:<16} {}",
            column.order, column.id, column.label
        ));
    }
    lines.join("\n")
}

fn ignored_note(reason: IgnoredReason) -> &'static str {
    match reason {
        IgnoredReason::DragCancelled => "no change: move was cancelled",
        IgnoredReason::UnknownColumn => "no change: no such column in this table",
        IgnoredReason::Unchanged => "no change: layout already matches",
    }
}
