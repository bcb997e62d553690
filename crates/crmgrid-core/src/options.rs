// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Normalization of option lists coming from differently shaped list
//! endpoints (accounts, labels, teams, desks, ...).

use serde_json::Value;
use std::collections::HashSet;

use crate::SelectOption;

/// Maps raw items through `mapper` and keeps the first option per label.
/// Items the mapper rejects are skipped.
pub fn normalize<T, I, F>(raw: I, mut mapper: F) -> Vec<SelectOption>
where
    I: IntoIterator<Item = T>,
    F: FnMut(T) -> Option<SelectOption>,
{
    let mut seen = HashSet::new();
    raw.into_iter()
        .filter_map(&mut mapper)
        .filter(|option| seen.insert(option.label.clone()))
        .collect()
}

/// If any option's label equals one of the normalized forms of `query`,
/// returns only those options; otherwise returns `options` unchanged.
pub fn narrow_by_exact_match<N>(
    options: Vec<SelectOption>,
    query: Option<&str>,
    normalizer: N,
) -> Vec<SelectOption>
where
    N: Fn(&str) -> Vec<String>,
{
    let Some(query) = query else {
        return options;
    };
    let candidates = normalizer(query);
    if candidates.is_empty() {
        return options;
    }

    let exact: Vec<SelectOption> = options
        .iter()
        .filter(|option| candidates.iter().any(|candidate| candidate == &option.label))
        .cloned()
        .collect();
    if exact.is_empty() { options } else { exact }
}

/// Normalizer that compares the trimmed query verbatim.
pub fn verbatim(query: &str) -> Vec<String> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        Vec::new()
    } else {
        vec![trimmed.to_owned()]
    }
}

/// Candidate forms for a phone-number search: with and without a leading
/// `+`, optionally prefixed by a default country code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhoneNormalizer {
    country_code: Option<String>,
}

impl PhoneNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_country_code(code: &str) -> Self {
        let digits: String = code.chars().filter(char::is_ascii_digit).collect();
        Self {
            country_code: (!digits.is_empty()).then_some(digits),
        }
    }

    pub fn candidates(&self, query: &str) -> Vec<String> {
        let trimmed = query.trim();
        let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();

        let mut forms = Vec::new();
        if !trimmed.is_empty() {
            forms.push(trimmed.to_owned());
        }
        if !digits.is_empty() {
            forms.push(digits.clone());
            forms.push(format!("+{digits}"));
            if let Some(code) = &self.country_code
                && !digits.starts_with(code.as_str())
            {
                forms.push(format!("{code}{digits}"));
                forms.push(format!("+{code}{digits}"));
            }
        }

        let mut seen = HashSet::new();
        forms.retain(|form| seen.insert(form.clone()));
        forms
    }
}

/// Adapter for JSON list payloads: reads `label_key` and `value_key` from
/// each object, plus optional `color` and `avatar`. Numeric values are
/// stringified.
pub fn json_mapper<'a>(
    label_key: &'a str,
    value_key: &'a str,
) -> impl Fn(&Value) -> Option<SelectOption> + 'a {
    move |item: &Value| {
        let object = item.as_object()?;
        let label = scalar_text(object.get(label_key)?)?;
        let value = scalar_text(object.get(value_key)?)?;
        let mut option = SelectOption::new(label, value);
        option.color = object
            .get("color")
            .and_then(Value::as_str)
            .map(str::to_owned);
        option.avatar = object
            .get("avatar")
            .and_then(Value::as_str)
            .map(str::to_owned);
        Some(option)
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}
