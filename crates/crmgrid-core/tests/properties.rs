// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crmgrid_core::options::{json_mapper, normalize};
use crmgrid_core::persistence::{persist, reconcile};
use crmgrid_core::{
    ColumnId, ColumnLayout, EMPTY_SENTINEL, EndpointProfile, FieldId, FieldType, FilterField,
    FilterSet, SchemaColumn, SortDirection, SortSpec, TableKey,
};
use proptest::prelude::*;
use serde_json::json;
use std::collections::HashSet;

fn schema_of(len: usize) -> Vec<SchemaColumn> {
    (0..len)
        .map(|index| SchemaColumn::new(&format!("col{index}"), &format!("Column {index}")))
        .collect()
}

#[derive(Debug, Clone)]
enum Toggle {
    Include(String),
    Exclude(String),
}

fn arb_value() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(EMPTY_SENTINEL.to_owned()),
        Just("a".to_owned()),
        Just("b".to_owned()),
        Just("c".to_owned()),
        Just("d".to_owned()),
    ]
}

fn arb_toggle() -> impl Strategy<Value = Toggle> {
    prop_oneof![
        arb_value().prop_map(Toggle::Include),
        arb_value().prop_map(Toggle::Exclude),
    ]
}

proptest! {
    #[test]
    fn reorder_keeps_orders_contiguous(
        len in 1usize..12,
        moves in prop::collection::vec((0usize..16, prop::option::of(0usize..16)), 0..20),
    ) {
        let mut layout = ColumnLayout::from_schema(TableKey::from("t"), &schema_of(len));
        for (source, dest) in moves {
            layout.reorder(source, dest);
            let orders: Vec<usize> = layout.columns().iter().map(|c| c.order).collect();
            prop_assert_eq!(orders, (0..len).collect::<Vec<_>>());
        }
        let ids: HashSet<&str> = layout.columns().iter().map(|c| c.id.as_str()).collect();
        prop_assert_eq!(ids.len(), len);
    }

    #[test]
    fn cancelled_drag_never_changes_layout(len in 0usize..8, source in 0usize..10) {
        let mut layout = ColumnLayout::from_schema(TableKey::from("t"), &schema_of(len));
        let before = layout.clone();
        prop_assert!(!layout.reorder(source, None));
        prop_assert_eq!(layout, before);
    }

    #[test]
    fn include_and_exclude_stay_disjoint(
        radio in any::<bool>(),
        toggles in prop::collection::vec(arb_toggle(), 0..40),
    ) {
        let field_type = if radio { FieldType::MultiChoiceRadio } else { FieldType::MultiChoice };
        let mut field = FilterField::new(FieldId::from("f"), field_type);
        for toggle in toggles {
            match toggle {
                Toggle::Include(value) => field.toggle_value(&value),
                Toggle::Exclude(value) => field.toggle_exclusion(&value),
            };
            for value in field.included() {
                prop_assert!(!field.non_query().contains(value));
            }
            if field.included().iter().any(|value| value == EMPTY_SENTINEL) {
                prop_assert_eq!(field.included().len(), 1);
            }
        }
    }

    #[test]
    fn dedup_keeps_first_value_per_label(
        rows in prop::collection::vec((0u8..5, 0u32..1000), 0..30),
    ) {
        let raw: Vec<_> = rows
            .iter()
            .map(|(label, value)| json!({"label": format!("L{label}"), "value": value}))
            .collect();
        let options = normalize(raw.iter(), json_mapper("label", "value"));

        let mut seen = HashSet::new();
        let expected: Vec<(String, String)> = rows
            .iter()
            .filter(|(label, _)| seen.insert(*label))
            .map(|(label, value)| (format!("L{label}"), value.to_string()))
            .collect();
        let actual: Vec<(String, String)> = options
            .into_iter()
            .map(|option| (option.label, option.value))
            .collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn schema_drift_always_resets(len in 1usize..8, grow in any::<bool>()) {
        let stored_len = if grow { len + 1 } else { len - 1 };
        let mut stored = ColumnLayout::from_schema(TableKey::from("t"), &schema_of(stored_len));
        if stored_len > 1 {
            stored.reorder(0, Some(stored_len - 1));
        }
        let blob = persist(&TableKey::from("t"), &stored, None).to_string();

        let layout = reconcile(Some(blob.as_str()), &schema_of(len), &TableKey::from("t"));
        prop_assert_eq!(layout, ColumnLayout::from_schema(TableKey::from("t"), &schema_of(len)));
    }
}

#[test]
fn payload_is_deep_equal_across_calls() {
    let mut set = FilterSet::new();
    let mut field = FilterField::new(FieldId::from("country"), FieldType::MultiChoice);
    field.toggle_value("FR");
    field.toggle_exclusion("DE");
    set.insert_field("country".into(), field);
    set.set_simple("q", "dupont");
    let sort = SortSpec::new("created_at", SortDirection::Desc);
    let profile = EndpointProfile::default();

    assert_eq!(
        set.build_payload(Some(&sort), &profile).into_value(),
        set.build_payload(Some(&sort), &profile).into_value()
    );
}

#[test]
fn end_to_end_toggle_persist_and_reload() {
    let table = TableKey::from("customerInfo");
    let schema = vec![SchemaColumn::new("a", "A"), SchemaColumn::new("b", "B")];

    let mut layout = reconcile(None, &schema, &table);
    let orders: Vec<usize> = layout.columns().iter().map(|c| c.order).collect();
    assert_eq!(orders, vec![0, 1]);

    layout.set_enabled(&ColumnId::from("a"), false);
    let blob = persist(&table, &layout, None).to_string();

    let reloaded = reconcile(Some(blob.as_str()), &schema, &table);
    assert_eq!(reloaded, layout);
    assert!(!reloaded.columns()[0].enabled);
}
