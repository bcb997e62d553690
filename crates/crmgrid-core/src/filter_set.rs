// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::{
    CapabilityLookup, CustomId, FieldAction, FilterField, FilterFieldSnapshot, SortSpec,
};

pub const CUSTOM_FIELD_KEY: &str = "custom_field";
pub const SORTING_KEY: &str = "sorting";

const DEFAULT_STRIP_KEYS: [&str; 2] = ["perPage", "currentPage"];

/// Endpoint-specific rewrite applied after the generic composition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum PayloadRule {
    /// Collapses two mutually exclusive flags into one boolean key. Exactly
    /// one flag set yields `key: true|false`; both or neither omit `key`.
    TriState {
        key: String,
        yes_flag: String,
        no_flag: String,
    },
    Rename { from: String, to: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointProfile {
    #[serde(default)]
    pub rules: Vec<PayloadRule>,
    #[serde(default = "default_strip_keys")]
    pub strip_keys: Vec<String>,
}

impl Default for EndpointProfile {
    fn default() -> Self {
        Self {
            rules: Vec::new(),
            strip_keys: default_strip_keys(),
        }
    }
}

impl EndpointProfile {
    pub fn with_rule(mut self, rule: PayloadRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn strip(mut self, key: &str) -> Self {
        if !self.strip_keys.iter().any(|existing| existing == key) {
            self.strip_keys.push(key.to_owned());
        }
        self
    }
}

fn default_strip_keys() -> Vec<String> {
    DEFAULT_STRIP_KEYS.iter().map(|key| (*key).to_owned()).collect()
}

/// Outbound request body for a list-fetching endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RequestPayload(Map<String, Value>);

impl RequestPayload {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn custom_fields(&self) -> &[Value] {
        match self.0.get(CUSTOM_FIELD_KEY) {
            Some(Value::Array(entries)) => entries,
            _ => &[],
        }
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

/// Filter state of one list screen: typed custom fields plus legacy
/// scalar filters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSet {
    fields: BTreeMap<CustomId, FilterField>,
    simple: Map<String, Value>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_field(&mut self, custom_id: CustomId, field: FilterField) -> Option<FilterField> {
        self.fields.insert(custom_id, field)
    }

    pub fn field(&self, custom_id: &CustomId) -> Option<&FilterField> {
        self.fields.get(custom_id)
    }

    pub fn field_mut(&mut self, custom_id: &CustomId) -> Option<&mut FilterField> {
        self.fields.get_mut(custom_id)
    }

    pub fn remove_field(&mut self, custom_id: &CustomId) -> Option<FilterField> {
        self.fields.remove(custom_id)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&CustomId, &FilterField)> {
        self.fields.iter()
    }

    pub fn set_simple(&mut self, key: &str, value: impl Into<Value>) {
        self.simple.insert(key.to_owned(), value.into());
    }

    pub fn remove_simple(&mut self, key: &str) -> Option<Value> {
        self.simple.remove(key)
    }

    pub fn simple(&self) -> &Map<String, Value> {
        &self.simple
    }

    pub fn active_count(&self) -> usize {
        self.fields.values().filter(|field| field.is_active()).count()
    }

    pub fn clear(&mut self) {
        for field in self.fields.values_mut() {
            field.clear();
        }
        self.simple.clear();
    }

    /// Drops custom fields the user may not filter on.
    pub fn retain_permitted(&mut self, lookup: &dyn CapabilityLookup) -> usize {
        let before = self.fields.len();
        self.fields
            .retain(|_, field| lookup.allows(FieldAction::Filter, field.field_id().as_str()));
        before - self.fields.len()
    }

    /// Composes the request body. Pure: the set is not modified.
    pub fn build_payload(&self, sort: Option<&SortSpec>, profile: &EndpointProfile) -> RequestPayload {
        let mut payload = self.simple.clone();

        let custom_fields: Vec<Value> = self
            .fields
            .values()
            .filter(|field| field.is_active())
            .map(FilterField::to_payload)
            .collect();
        if custom_fields.is_empty() {
            payload.remove(CUSTOM_FIELD_KEY);
        } else {
            payload.insert(CUSTOM_FIELD_KEY.to_owned(), Value::Array(custom_fields));
        }

        if let Some(sort) = sort {
            let mut sorting = Map::new();
            sorting.insert("field".to_owned(), Value::String(sort.field.clone()));
            sorting.insert(
                "direction".to_owned(),
                Value::String(sort.direction.as_str().to_owned()),
            );
            payload.insert(SORTING_KEY.to_owned(), Value::Object(sorting));
        }

        for rule in &profile.rules {
            apply_rule(&mut payload, rule);
        }

        for key in &profile.strip_keys {
            payload.remove(key);
        }

        RequestPayload(payload)
    }

    pub fn to_snapshot(&self) -> FilterSetSnapshot {
        FilterSetSnapshot {
            fields: self
                .fields
                .iter()
                .map(|(custom_id, field)| (custom_id.clone(), field.to_snapshot()))
                .collect(),
            simple: self.simple.clone(),
        }
    }

    pub fn from_snapshot(snapshot: &FilterSetSnapshot) -> Self {
        Self {
            fields: snapshot
                .fields
                .iter()
                .map(|(custom_id, field)| (custom_id.clone(), FilterField::from_snapshot(field)))
                .collect(),
            simple: snapshot.simple.clone(),
        }
    }
}

fn apply_rule(payload: &mut Map<String, Value>, rule: &PayloadRule) {
    match rule {
        PayloadRule::TriState {
            key,
            yes_flag,
            no_flag,
        } => {
            let yes = payload.remove(yes_flag).is_some_and(|value| is_truthy(&value));
            let no = payload.remove(no_flag).is_some_and(|value| is_truthy(&value));
            payload.remove(key);
            if yes != no {
                payload.insert(key.clone(), Value::Bool(yes));
            }
        }
        PayloadRule::Rename { from, to } => {
            if let Some(value) = payload.remove(from) {
                payload.insert(to.clone(), value);
            }
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Serializable form of a [`FilterSet`], used for saved filter presets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSetSnapshot {
    #[serde(default)]
    pub fields: BTreeMap<CustomId, FilterFieldSnapshot>,
    #[serde(default)]
    pub simple: Map<String, Value>,
}
