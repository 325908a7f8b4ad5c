//! Plain snapshot values handed to the adapter by callers.
//!
//! Defined here (not imported from the domain crates) so this crate stays a
//! pure external-service boundary.

use serde::{Deserialize, Serialize};

/// One product as embedded into prompts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub name: String,
    pub category: String,
    pub quantity: i64,
    pub unit_cost_cents: i64,
}

/// One recent quantity change as embedded into report prompts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageSnapshot {
    pub product_name: String,
    pub delta: i64,
    pub source: String,
    /// RFC 3339 timestamp of the change.
    pub occurred_at: String,
}
