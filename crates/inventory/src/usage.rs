use chrono::{DateTime, Utc};
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use stocklens_core::{DomainError, ProductId, UsageEventId};

/// Where a quantity change came from.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageSource {
    Scan,
    Manual,
}

impl UsageSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            UsageSource::Scan => "scan",
            UsageSource::Manual => "manual",
        }
    }
}

impl FromStr for UsageSource {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scan" => Ok(UsageSource::Scan),
            "manual" => Ok(UsageSource::Manual),
            other => Err(DomainError::validation(format!(
                "unknown usage source: {other}"
            ))),
        }
    }
}

/// One entry in the append-only quantity-change log.
///
/// Immutable once recorded; deleted only together with its product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageEvent {
    pub id: UsageEventId,
    pub product_id: ProductId,
    /// Signed quantity change (never zero).
    pub delta: i64,
    pub source: UsageSource,
    pub occurred_at: DateTime<Utc>,
}

impl UsageEvent {
    pub fn record(
        product_id: ProductId,
        delta: i64,
        source: UsageSource,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: UsageEventId::new(),
            product_id,
            delta,
            source,
            occurred_at,
        }
    }
}
