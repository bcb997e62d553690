// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::ColumnId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldAction {
    View,
    Filter,
    Edit,
}

impl FieldAction {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Filter => "filter",
            Self::Edit => "edit",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "view" => Some(Self::View),
            "filter" => Some(Self::Filter),
            "edit" => Some(Self::Edit),
            _ => None,
        }
    }
}

/// Answers whether the current user may perform `action` on `field`.
pub trait CapabilityLookup {
    fn allows(&self, action: FieldAction, field: &str) -> bool;
}

impl<F> CapabilityLookup for F
where
    F: Fn(FieldAction, &str) -> bool,
{
    fn allows(&self, action: FieldAction, field: &str) -> bool {
        self(action, field)
    }
}

/// Explicit grant list, or everything when built with [`Grants::all`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grants {
    allow_all: bool,
    granted: BTreeSet<(FieldAction, String)>,
}

impl Grants {
    pub fn all() -> Self {
        Self {
            allow_all: true,
            granted: BTreeSet::new(),
        }
    }

    pub fn grant(mut self, action: FieldAction, field: &str) -> Self {
        self.granted.insert((action, field.to_owned()));
        self
    }

    pub fn is_empty(&self) -> bool {
        !self.allow_all && self.granted.is_empty()
    }
}

impl CapabilityLookup for Grants {
    fn allows(&self, action: FieldAction, field: &str) -> bool {
        self.allow_all || self.granted.contains(&(action, field.to_owned()))
    }
}

/// Column predicate for reconciliation: keeps columns the user may view.
pub fn viewable_columns(lookup: &dyn CapabilityLookup) -> impl Fn(&ColumnId) -> bool + '_ {
    move |column: &ColumnId| lookup.allows(FieldAction::View, column.as_str())
}
