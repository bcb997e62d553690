// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::{EMPTY_SENTINEL, FieldId, FieldType};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NumberRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gt: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lt: Option<f64>,
}

impl NumberRange {
    pub fn is_set(&self) -> bool {
        self.gt.is_some() || self.lt.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterQuery {
    Text(String),
    Choices(Vec<String>),
    Flag(bool),
    Range(NumberRange),
}

impl FilterQuery {
    fn empty_for(field_type: FieldType) -> Self {
        match field_type {
            FieldType::Text => Self::Text(String::new()),
            FieldType::MultiChoice | FieldType::MultiChoiceRadio => Self::Choices(Vec::new()),
            FieldType::Boolean => Self::Flag(false),
            FieldType::Number => Self::Range(NumberRange::default()),
        }
    }

    fn to_value(&self) -> Value {
        match self {
            Self::Text(text) => Value::String(text.clone()),
            Self::Choices(values) => {
                Value::Array(values.iter().cloned().map(Value::String).collect())
            }
            Self::Flag(flag) => Value::Bool(*flag),
            Self::Range(range) => {
                let mut bounds = Map::new();
                if let Some(gt) = range.gt {
                    bounds.insert("gt".to_owned(), Value::from(gt));
                }
                if let Some(lt) = range.lt {
                    bounds.insert("lt".to_owned(), Value::from(lt));
                }
                Value::Object(bounds)
            }
        }
    }
}

/// One typed filter criterion.
///
/// For choice fields the included values (`query`) and excluded values
/// (`non_query`) never overlap, and `"_empty"` is never included alongside
/// another value.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterField {
    field_id: FieldId,
    field_type: FieldType,
    query: FilterQuery,
    non_query: Vec<String>,
}

impl FilterField {
    pub fn new(field_id: FieldId, field_type: FieldType) -> Self {
        Self {
            field_id,
            field_type,
            query: FilterQuery::empty_for(field_type),
            non_query: Vec::new(),
        }
    }

    pub fn field_id(&self) -> &FieldId {
        &self.field_id
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    pub fn query(&self) -> &FilterQuery {
        &self.query
    }

    pub fn included(&self) -> &[String] {
        match &self.query {
            FilterQuery::Choices(values) => values,
            _ => &[],
        }
    }

    pub fn non_query(&self) -> &[String] {
        &self.non_query
    }

    /// Include-side toggle. Choice fields follow the sentinel rules; boolean
    /// fields flip; text and number fields are set directly instead.
    pub fn toggle_value(&mut self, candidate: &str) -> bool {
        match &mut self.query {
            FilterQuery::Choices(values) => {
                if let Some(position) = values.iter().position(|value| value == candidate) {
                    values.remove(position);
                } else if candidate == EMPTY_SENTINEL {
                    values.clear();
                    values.push(EMPTY_SENTINEL.to_owned());
                } else {
                    values.retain(|value| value != EMPTY_SENTINEL);
                    values.push(candidate.to_owned());
                }
                self.non_query.retain(|value| value != candidate);
                true
            }
            FilterQuery::Flag(flag) => {
                *flag = !*flag;
                true
            }
            FilterQuery::Text(_) | FilterQuery::Range(_) => {
                debug!(
                    field = %self.field_id,
                    field_type = self.field_type.as_str(),
                    "toggle has no meaning for this field type; ignoring"
                );
                false
            }
        }
    }

    /// Exclude-side toggle; including and excluding a value are mutually
    /// exclusive.
    pub fn toggle_exclusion(&mut self, candidate: &str) -> bool {
        let FilterQuery::Choices(values) = &mut self.query else {
            debug!(field = %self.field_id, "exclusion only applies to choice fields; ignoring");
            return false;
        };

        if let Some(position) = self.non_query.iter().position(|value| value == candidate) {
            self.non_query.remove(position);
        } else {
            self.non_query.push(candidate.to_owned());
        }
        values.retain(|value| value != candidate);
        true
    }

    pub fn set_text(&mut self, text: &str) -> bool {
        match &mut self.query {
            FilterQuery::Text(current) => {
                current.clear();
                current.push_str(text);
                true
            }
            _ => false,
        }
    }

    pub fn set_flag(&mut self, checked: bool) -> bool {
        match &mut self.query {
            FilterQuery::Flag(flag) => {
                *flag = checked;
                true
            }
            _ => false,
        }
    }

    pub fn set_range(&mut self, range: NumberRange) -> bool {
        match &mut self.query {
            FilterQuery::Range(current) => {
                *current = range;
                true
            }
            _ => false,
        }
    }

    pub fn clear(&mut self) {
        self.query = FilterQuery::empty_for(self.field_type);
        self.non_query.clear();
    }

    /// Structural check only; bound and value contents are not validated.
    pub fn is_active(&self) -> bool {
        match &self.query {
            FilterQuery::Text(text) => !text.trim().is_empty(),
            FilterQuery::Flag(flag) => *flag,
            FilterQuery::Choices(values) => !values.is_empty() || !self.non_query.is_empty(),
            FilterQuery::Range(range) => range.is_set(),
        }
    }

    /// Projection sent to the backend under `custom_field`.
    pub fn to_payload(&self) -> Value {
        let mut entry = Map::new();
        entry.insert(
            "field_id".to_owned(),
            Value::String(self.field_id.as_str().to_owned()),
        );
        entry.insert(
            "field_type".to_owned(),
            Value::String(self.field_type.as_str().to_owned()),
        );
        entry.insert("query".to_owned(), self.query.to_value());
        if self.field_type.is_choice() {
            entry.insert(
                "non_query".to_owned(),
                Value::Array(self.non_query.iter().cloned().map(Value::String).collect()),
            );
        }
        Value::Object(entry)
    }

    pub fn to_snapshot(&self) -> FilterFieldSnapshot {
        let (query, range) = match &self.query {
            FilterQuery::Text(text) => (SnapshotQuery::Text(text.clone()), None),
            FilterQuery::Choices(values) => (SnapshotQuery::Choices(values.clone()), None),
            FilterQuery::Flag(flag) => (SnapshotQuery::Flag(*flag), None),
            FilterQuery::Range(range) => (SnapshotQuery::Range(*range), None),
        };
        FilterFieldSnapshot {
            field_id: self.field_id.clone(),
            field_type: self.field_type,
            query,
            range,
            non_query: self.non_query.clone(),
        }
    }

    /// Restores a saved field by replaying its values through the toggles,
    /// so a hand-edited snapshot cannot break the include/exclude rules.
    pub fn from_snapshot(snapshot: &FilterFieldSnapshot) -> Self {
        let mut field = Self::new(snapshot.field_id.clone(), snapshot.field_type);
        match (&snapshot.query, snapshot.field_type) {
            (SnapshotQuery::Text(text), FieldType::Text) => {
                field.set_text(text);
            }
            (SnapshotQuery::Flag(flag), FieldType::Boolean) => {
                field.set_flag(*flag);
            }
            (SnapshotQuery::Text(text), FieldType::Boolean) => {
                field.set_flag(text_flag(text));
            }
            (SnapshotQuery::Range(range), FieldType::Number) => {
                field.set_range(*range);
            }
            (SnapshotQuery::Choices(values), field_type) if field_type.is_choice() => {
                for value in &snapshot.non_query {
                    if !field.non_query.contains(value) {
                        field.toggle_exclusion(value);
                    }
                }
                for value in values {
                    if !field.included().contains(value) {
                        field.toggle_value(value);
                    }
                }
            }
            _ => {}
        }
        if let Some(range) = snapshot.range {
            field.set_range(range);
        }
        field
    }
}

/// Boolean filters saved as text: any non-blank value except `"false"`
/// checks the box.
fn text_flag(text: &str) -> bool {
    let trimmed = text.trim();
    !trimmed.is_empty() && !trimmed.eq_ignore_ascii_case("false")
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SnapshotQuery {
    Flag(bool),
    Text(String),
    Choices(Vec<String>),
    Range(NumberRange),
    #[default]
    Empty,
}

/// Serializable form of a [`FilterField`], used for saved filter presets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterFieldSnapshot {
    pub field_id: FieldId,
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "is_empty_query")]
    pub query: SnapshotQuery,
    /// Older presets kept number bounds here instead of under `query`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<NumberRange>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub non_query: Vec<String>,
}

fn is_empty_query(query: &SnapshotQuery) -> bool {
    matches!(query, SnapshotQuery::Empty)
}
