//! Label-detection client for an `images:annotate`-style REST endpoint.

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::time::Duration;
use thiserror::Error;

use crate::credentials::VisionCredentials;

const DEFAULT_ENDPOINT: &str = "https://vision.googleapis.com/v1/images:annotate";
const REQUEST_TIMEOUT_SECS: u64 = 30;
const MAX_LABEL_RESULTS: u32 = 10;

/// Default confidence floor below which a scan is rejected.
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.5;

/// Vision adapter errors.
///
/// `Unavailable`, `Service` and `MalformedResponse` are the
/// recognition-unavailable conditions; `NoLabels` and `BelowConfidence` are
/// policy rejections of an otherwise healthy response.
#[derive(Debug, Error)]
pub enum VisionError {
    #[error("vision service unreachable: {0}")]
    Unavailable(String),

    #[error("vision service error {status}: {message}")]
    Service { status: u16, message: String },

    #[error("malformed vision response: {0}")]
    MalformedResponse(String),

    #[error("no labels recognized in image")]
    NoLabels,

    #[error(
        "best label '{label}' below confidence threshold ({confidence:.2} < {threshold:.2})"
    )]
    BelowConfidence {
        label: String,
        confidence: f64,
        threshold: f64,
    },
}

/// Transient recognition output, consumed once by the scan pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub label: String,
    pub confidence: f64,
    /// SHA-256 hex digest of the submitted image bytes.
    pub image_ref: String,
}

/// Seam for recognition so the pipeline can be driven without the network.
#[async_trait]
pub trait LabelRecognizer: Send + Sync {
    async fn recognize(&self, image: &[u8]) -> Result<ScanResult, VisionError>;
}

#[async_trait]
impl<R> LabelRecognizer for std::sync::Arc<R>
where
    R: LabelRecognizer + ?Sized,
{
    async fn recognize(&self, image: &[u8]) -> Result<ScanResult, VisionError> {
        (**self).recognize(image).await
    }
}

// ---- wire schema -----------------------------------------------------------

#[derive(Debug, Serialize)]
struct AnnotateRequest {
    requests: Vec<AnnotateImageRequest>,
}

#[derive(Debug, Serialize)]
struct AnnotateImageRequest {
    image: ImageContent,
    features: Vec<Feature>,
}

#[derive(Debug, Serialize)]
struct ImageContent {
    content: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Feature {
    #[serde(rename = "type")]
    kind: &'static str,
    max_results: u32,
}

#[derive(Debug, Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<AnnotateImageResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateImageResponse {
    #[serde(default)]
    label_annotations: Vec<LabelAnnotation>,
    error: Option<ProviderStatus>,
}

#[derive(Debug, Deserialize)]
struct LabelAnnotation {
    description: Option<String>,
    score: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ProviderStatus {
    code: Option<i64>,
    message: Option<String>,
}

/// Candidate policy: highest score wins, then the confidence floor applies.
fn select_label(
    response: AnnotateImageResponse,
    threshold: f64,
) -> Result<(String, f64), VisionError> {
    if let Some(status) = response.error {
        return Err(VisionError::Service {
            status: status.code.unwrap_or(0) as u16,
            message: status.message.unwrap_or_else(|| "unknown".to_string()),
        });
    }

    let best = response
        .label_annotations
        .into_iter()
        .filter_map(|a| match (a.description, a.score) {
            (Some(label), Some(score)) if !label.trim().is_empty() => Some((label, score)),
            _ => None,
        })
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(core::cmp::Ordering::Equal))
        .ok_or(VisionError::NoLabels)?;

    if best.1 < threshold {
        return Err(VisionError::BelowConfidence {
            label: best.0,
            confidence: best.1,
            threshold,
        });
    }

    Ok(best)
}

fn image_ref(image: &[u8]) -> String {
    hex::encode(Sha256::digest(image))
}

// ---- HTTP client -----------------------------------------------------------

/// Vision client speaking the Google Cloud Vision annotate REST protocol,
/// authenticated by API key.
pub struct GoogleVisionClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    min_confidence: f64,
}

impl GoogleVisionClient {
    pub fn new(
        credentials: VisionCredentials,
        min_confidence: f64,
    ) -> Result<Self, VisionError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| VisionError::Unavailable(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: credentials
                .endpoint
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            api_key: credentials.api_key,
            min_confidence,
        })
    }
}

#[async_trait]
impl LabelRecognizer for GoogleVisionClient {
    async fn recognize(&self, image: &[u8]) -> Result<ScanResult, VisionError> {
        let image_ref = image_ref(image);

        let request = AnnotateRequest {
            requests: vec![AnnotateImageRequest {
                image: ImageContent {
                    content: BASE64.encode(image),
                },
                features: vec![Feature {
                    kind: "LABEL_DETECTION",
                    max_results: MAX_LABEL_RESULTS,
                }],
            }],
        };

        tracing::debug!(image_ref = %image_ref, bytes = image.len(), "submitting image for label detection");

        let response = self
            .http
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| VisionError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(VisionError::Service {
                status: status.as_u16(),
                message,
            });
        }

        let annotate: AnnotateResponse = response
            .json()
            .await
            .map_err(|e| VisionError::MalformedResponse(e.to_string()))?;

        let first = annotate
            .responses
            .into_iter()
            .next()
            .ok_or_else(|| VisionError::MalformedResponse("empty responses array".to_string()))?;

        let (label, confidence) = select_label(first, self.min_confidence)?;

        tracing::info!(label = %label, confidence, image_ref = %image_ref, "label detected");

        Ok(ScanResult {
            label,
            confidence,
            image_ref,
        })
    }
}
