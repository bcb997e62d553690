// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Default column schemas of the standard CRM tables.

use crate::SchemaColumn;

pub const CUSTOMER_INFO: &str = "customerInfo";
pub const CUSTOMER_ORDER_TABS: &str = "customerOrderTabs";
pub const AGENTS_TABLE: &str = "agentsTable";
pub const VALIDATION_RULES: &str = "validationRules";
pub const MERCHANT_RATES: &str = "merchantRates";

const STANDARD_TABLES: [&str; 5] = [
    CUSTOMER_INFO,
    CUSTOMER_ORDER_TABS,
    AGENTS_TABLE,
    VALIDATION_RULES,
    MERCHANT_RATES,
];

pub fn standard_tables() -> &'static [&'static str] {
    &STANDARD_TABLES
}

/// Default column schema of a standard table, `None` for unknown keys.
pub fn default_schema(table: &str) -> Option<Vec<SchemaColumn>> {
    let schema = match table {
        CUSTOMER_INFO => vec![
            SchemaColumn::new("name", "Name").with_width(220),
            SchemaColumn::new("phone", "Phone").with_render("phone"),
            SchemaColumn::new("email", "Email").with_width(240),
            SchemaColumn::new("country", "Country").with_render("flag"),
            SchemaColumn::new("agent", "Agent").with_render("avatar"),
            SchemaColumn::new("status", "Status").with_render("tag"),
            SchemaColumn::new("online", "Online").with_render("presence"),
            SchemaColumn::new("balance", "Balance").with_render("money"),
            SchemaColumn::new("created_at", "Created").with_render("datetime"),
            SchemaColumn::new("last_login", "Last login").hidden(),
        ],
        CUSTOMER_ORDER_TABS => vec![
            SchemaColumn::new("order_id", "Order"),
            SchemaColumn::new("instrument", "Instrument"),
            SchemaColumn::new("side", "Side").with_render("tag"),
            SchemaColumn::new("volume", "Volume"),
            SchemaColumn::new("open_price", "Open price").with_render("money"),
            SchemaColumn::new("close_price", "Close price").with_render("money"),
            SchemaColumn::new("profit", "Profit").with_render("money"),
            SchemaColumn::new("opened_at", "Opened").with_render("datetime"),
        ],
        AGENTS_TABLE => vec![
            SchemaColumn::new("name", "Name").with_render("avatar"),
            SchemaColumn::new("email", "Email"),
            SchemaColumn::new("role", "Role"),
            SchemaColumn::new("desk", "Desk"),
            SchemaColumn::new("customers", "Customers"),
            SchemaColumn::new("active", "Active").with_render("switch"),
        ],
        VALIDATION_RULES => vec![
            SchemaColumn::new("field", "Field"),
            SchemaColumn::new("rule", "Rule"),
            SchemaColumn::new("message", "Message").with_width(320),
            SchemaColumn::new("enabled", "Enabled").with_render("switch"),
        ],
        MERCHANT_RATES => vec![
            SchemaColumn::new("merchant", "Merchant"),
            SchemaColumn::new("currency", "Currency"),
            SchemaColumn::new("deposit_fee", "Deposit fee"),
            SchemaColumn::new("withdrawal_fee", "Withdrawal fee"),
            SchemaColumn::new("min_amount", "Min amount").with_render("money"),
            SchemaColumn::new("max_amount", "Max amount").with_render("money"),
            SchemaColumn::new("updated_at", "Updated").hidden(),
        ],
        _ => return None,
    };
    Some(schema)
}
