//! Scan pipeline: image → recognized label → create-or-update.
//!
//! Orchestration only; recognition belongs to `stocklens-vision` and
//! persistence to the inventory store.

pub mod pipeline;

pub use pipeline::{
    DEFAULT_SCAN_CATEGORY, DEFAULT_SCAN_QUANTITY, SCAN_STEP, Scan, ScanError, ScanOutcome,
    ScanPipeline,
};
