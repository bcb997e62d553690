// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crmgrid_core::persistence::persist;
use crmgrid_core::{ColumnLayout, SchemaColumn, TableKey, default_schema, standard_tables};

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn one_in(&mut self, n: u64) -> bool {
        n > 0 && self.next_u64() % n == 0
    }
}

/// Seeded generator of user customizations: shuffled column orders and a
/// few hidden columns.
#[derive(Debug, Clone)]
pub struct LayoutFaker {
    rng: DeterministicRng,
}

impl LayoutFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
        }
    }

    pub fn layout(&mut self, table: &str, schema: &[SchemaColumn]) -> ColumnLayout {
        let mut layout = ColumnLayout::from_schema(TableKey::from(table), schema);
        let len = layout.len();
        for _ in 0..len {
            let source = self.rng.int_n(len);
            let dest = self.rng.int_n(len);
            layout.reorder(source, Some(dest));
        }
        let ids: Vec<_> = layout.columns().iter().map(|c| c.id.clone()).collect();
        for id in ids {
            if self.rng.one_in(4) {
                layout.set_enabled(&id, false);
            }
        }
        layout
    }

    /// One customized layout per standard table.
    pub fn layouts(&mut self) -> Vec<ColumnLayout> {
        standard_tables()
            .iter()
            .filter_map(|table| {
                default_schema(table).map(|schema| self.layout(table, &schema))
            })
            .collect()
    }

    pub fn document(&mut self) -> String {
        self.layouts()
            .iter()
            .fold(None::<String>, |document, layout| {
                Some(persist(layout.table(), layout, document.as_deref()).to_string())
            })
            .unwrap_or_else(|| "{}".to_owned())
    }
}

/// Settings document written by `--demo`.
pub fn demo_document() -> String {
    LayoutFaker::new(7).document()
}
