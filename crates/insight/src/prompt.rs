//! Prompt construction for the assistant and report flows.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::chat::ChatRequest;
use crate::snapshot::{ProductSnapshot, UsageSnapshot};

pub(crate) const ASSISTANT_SYSTEM: &str =
    "You are a helpful inventory management assistant.";
pub(crate) const REPORT_SYSTEM: &str =
    "You are an inventory management expert. Provide clear, actionable insights in a professional tone.";

/// Report flavors offered by the reports endpoint.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    Summary,
    LowStock,
    RecentActivity,
    Custom,
}

impl ReportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Summary => "summary",
            ReportKind::LowStock => "low_stock",
            ReportKind::RecentActivity => "recent_activity",
            ReportKind::Custom => "custom",
        }
    }
}

impl FromStr for ReportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "summary" => Ok(ReportKind::Summary),
            "low_stock" => Ok(ReportKind::LowStock),
            "recent_activity" => Ok(ReportKind::RecentActivity),
            "custom" => Ok(ReportKind::Custom),
            other => Err(format!("unknown report kind: {other}")),
        }
    }
}

/// Render the inventory context block embedded into every prompt.
pub fn inventory_context(snapshot: &[ProductSnapshot]) -> String {
    if snapshot.is_empty() {
        return "The inventory is currently empty.".to_string();
    }

    let mut context = String::from("Current inventory status:\n");
    for product in snapshot {
        context.push_str(&format!(
            "- {}: {} units (Category: {})\n",
            product.name, product.quantity, product.category
        ));
    }
    context
}

fn usage_context(history: &[UsageSnapshot]) -> String {
    if history.is_empty() {
        return "No recent usage recorded.".to_string();
    }

    let mut context = String::from("Recent usage history:\n");
    for entry in history {
        context.push_str(&format!(
            "- {}: {:+} units at {} ({})\n",
            entry.product_name, entry.delta, entry.occurred_at, entry.source
        ));
    }
    context
}

/// Build the request for a free-form assistant question.
pub fn question_request(question: &str, snapshot: &[ProductSnapshot]) -> ChatRequest {
    ChatRequest {
        system: ASSISTANT_SYSTEM.to_string(),
        user: format!("{}\nUser question: {}", inventory_context(snapshot), question),
    }
}

/// Build the request for one of the canned report kinds.
pub fn report_request(
    kind: ReportKind,
    snapshot: &[ProductSnapshot],
    history: &[UsageSnapshot],
) -> ChatRequest {
    let asks = match kind {
        ReportKind::Summary => {
            "Please provide:\n\
             1. Total number of unique products\n\
             2. Total inventory value\n\
             3. Products with highest and lowest quantities\n\
             4. Recent inventory changes and trends"
        }
        ReportKind::LowStock => {
            "Please identify:\n\
             1. Products at or near depletion\n\
             2. Recommended reorder quantities\n\
             3. Priority items that need immediate attention\n\
             4. Usage patterns that might affect stock levels"
        }
        ReportKind::RecentActivity => {
            "Please provide:\n\
             1. Recently added products\n\
             2. Products with significant quantity changes\n\
             3. Any unusual patterns in inventory levels\n\
             4. Usage trends and patterns"
        }
        ReportKind::Custom => {
            "Please include:\n\
             1. Overall inventory health assessment\n\
             2. Key trends and patterns\n\
             3. Risk areas and opportunities\n\
             4. Specific recommendations for improvement"
        }
    };

    ChatRequest {
        system: REPORT_SYSTEM.to_string(),
        user: format!(
            "{}\n{}\n{}",
            inventory_context(snapshot),
            usage_context(history),
            asks
        ),
    }
}
