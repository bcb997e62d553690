// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

use crate::ids::*;

/// Reserved filter value meaning "the field is empty on the record".
pub const EMPTY_SENTINEL: &str = "_empty";

/// One entry of a table's hardcoded default schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaColumn {
    pub id: ColumnId,
    pub label: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub render: Option<String>,
}

impl SchemaColumn {
    pub fn new(id: &str, label: &str) -> Self {
        Self {
            id: ColumnId::from(id),
            label: label.to_owned(),
            enabled: true,
            width: None,
            render: None,
        }
    }

    pub fn hidden(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn with_width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_render(mut self, render: &str) -> Self {
        self.render = Some(render.to_owned());
        self
    }
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub id: ColumnId,
    pub label: String,
    pub enabled: bool,
    pub order: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub render: Option<String>,
}

/// Shape written to the settings document: rendering-only fields stripped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedColumn {
    pub id: ColumnId,
    pub enabled: bool,
    pub label: String,
    pub order: usize,
}

impl From<&ColumnDescriptor> for PersistedColumn {
    fn from(column: &ColumnDescriptor) -> Self {
        Self {
            id: column.id.clone(),
            enabled: column.enabled,
            label: column.label.clone(),
            order: column.order,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    MultiChoice,
    MultiChoiceRadio,
    Boolean,
    Number,
}

impl FieldType {
    pub const ALL: [Self; 5] = [
        Self::Text,
        Self::MultiChoice,
        Self::MultiChoiceRadio,
        Self::Boolean,
        Self::Number,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::MultiChoice => "multi_choice",
            Self::MultiChoiceRadio => "multi_choice_radio",
            Self::Boolean => "boolean",
            Self::Number => "number",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "text" => Some(Self::Text),
            "multi_choice" => Some(Self::MultiChoice),
            "multi_choice_radio" => Some(Self::MultiChoiceRadio),
            "boolean" => Some(Self::Boolean),
            "number" => Some(Self::Number),
            _ => None,
        }
    }

    pub const fn is_choice(self) -> bool {
        matches!(self, Self::MultiChoice | Self::MultiChoiceRadio)
    }
}

/// Canonical option form shared by filter pickers and column pickers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl SelectOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            color: None,
            avatar: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FieldType, SchemaColumn, SortDirection};

    #[test]
    fn field_type_round_trips_through_wire_names() {
        for field_type in FieldType::ALL {
            assert_eq!(FieldType::parse(field_type.as_str()), Some(field_type));
        }
        assert_eq!(FieldType::parse("date"), None);
    }

    #[test]
    fn only_multi_choice_kinds_are_choice() {
        assert!(FieldType::MultiChoice.is_choice());
        assert!(FieldType::MultiChoiceRadio.is_choice());
        assert!(!FieldType::Boolean.is_choice());
        assert!(!FieldType::Text.is_choice());
    }

    #[test]
    fn schema_column_defaults_to_enabled_when_omitted() {
        let column: SchemaColumn =
            serde_json::from_str(r#"{"id":"email","label":"Email"}"#).expect("valid column");
        assert!(column.enabled);
        assert_eq!(column.width, None);
    }

    #[test]
    fn sort_direction_parses_lowercase_only() {
        assert_eq!(SortDirection::parse("desc"), Some(SortDirection::Desc));
        assert_eq!(SortDirection::parse("DESC"), None);
    }
}
