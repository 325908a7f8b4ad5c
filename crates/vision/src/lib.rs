//! `stocklens-vision`
//!
//! **Responsibility:** Vision Adapter boundary.
//!
//! This crate wraps a single external image-recognition service: request
//! formatting and response parsing, nothing else. No local recognition logic,
//! no retries, and no dependency on the inventory domain — callers consume the
//! transient [`ScanResult`] and decide what to do with it.

pub mod client;
pub mod credentials;

pub use client::{
    DEFAULT_MIN_CONFIDENCE, GoogleVisionClient, LabelRecognizer, ScanResult, VisionError,
};
pub use credentials::{CredentialsError, VisionCredentials};
