// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod capability;
pub mod filter;
pub mod filter_set;
pub mod ids;
pub mod layout;
pub mod model;
pub mod options;
pub mod persistence;
pub mod schemas;
pub mod state;

pub use capability::*;
pub use filter::*;
pub use filter_set::*;
pub use ids::*;
pub use layout::*;
pub use model::*;
pub use schemas::*;
pub use state::*;
