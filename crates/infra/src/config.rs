//! Application configuration.
//!
//! One explicit struct built from the environment in `main` and passed down to
//! constructors — adapters never read ambient process state themselves.

use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;
use tracing::warn;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const INSECURE_DEV_TOKENS: &str = "admin:admin123";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid {name}: {message}")]
    Invalid { name: &'static str, message: String },
}

impl ConfigError {
    fn invalid(name: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            name,
            message: message.into(),
        }
    }
}

/// Language-model service settings. `model`/`base_url` fall back to the
/// adapter's defaults when unset.
#[derive(Debug, Clone)]
pub struct InsightConfig {
    pub api_key: String,
    pub model: Option<String>,
    pub base_url: Option<String>,
}

/// Vision service settings. `min_confidence` falls back to the adapter's
/// default when unset.
#[derive(Debug, Clone)]
pub struct VisionConfig {
    pub credentials_path: PathBuf,
    pub min_confidence: Option<f64>,
}

/// One `user:token` credential pair for the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiToken {
    pub user: String,
    pub token: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    /// SQLite file. `None` selects the volatile in-memory store.
    pub database_path: Option<PathBuf>,
    pub insight: InsightConfig,
    pub vision: VisionConfig,
    pub api_tokens: Vec<ApiToken>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let bind_addr: SocketAddr = env_or("BIND_ADDR", DEFAULT_BIND_ADDR)
            .parse()
            .map_err(|e| ConfigError::invalid("BIND_ADDR", format!("{e}")))?;

        let database_path = std::env::var("DATABASE_PATH").ok().map(PathBuf::from);

        let insight = InsightConfig {
            api_key: require("OPENAI_API_KEY")?,
            model: std::env::var("OPENAI_MODEL").ok(),
            base_url: std::env::var("OPENAI_BASE_URL").ok(),
        };

        let vision = VisionConfig {
            credentials_path: PathBuf::from(require("VISION_CREDENTIALS_PATH")?),
            min_confidence: match std::env::var("SCAN_MIN_CONFIDENCE") {
                Ok(raw) => Some(parse_min_confidence(&raw)?),
                Err(_) => None,
            },
        };

        let api_tokens = match std::env::var("API_TOKENS") {
            Ok(raw) => parse_api_tokens(&raw)?,
            Err(_) => {
                warn!("API_TOKENS not set; using insecure dev default");
                parse_api_tokens(INSECURE_DEV_TOKENS)?
            }
        };

        Ok(Self {
            bind_addr,
            database_path,
            insight,
            vision,
            api_tokens,
        })
    }
}

fn env_or(name: &'static str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn require(name: &'static str) -> Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(name)),
    }
}

fn parse_min_confidence(raw: &str) -> Result<f64, ConfigError> {
    let value: f64 = raw
        .parse()
        .map_err(|e| ConfigError::invalid("SCAN_MIN_CONFIDENCE", format!("{e}")))?;
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::invalid(
            "SCAN_MIN_CONFIDENCE",
            format!("{value} is outside [0, 1]"),
        ));
    }
    Ok(value)
}

/// Parse comma-separated `user:token` pairs.
fn parse_api_tokens(raw: &str) -> Result<Vec<ApiToken>, ConfigError> {
    let mut tokens = Vec::new();
    for pair in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (user, token) = pair
            .split_once(':')
            .ok_or_else(|| ConfigError::invalid("API_TOKENS", format!("'{pair}' is not user:token")))?;
        if user.is_empty() || token.is_empty() {
            return Err(ConfigError::invalid(
                "API_TOKENS",
                format!("'{pair}' has an empty user or token"),
            ));
        }
        tokens.push(ApiToken {
            user: user.to_string(),
            token: token.to_string(),
        });
    }

    if tokens.is_empty() {
        return Err(ConfigError::invalid("API_TOKENS", "no credential pairs"));
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_user_token_pairs() {
        let tokens = parse_api_tokens("alice:secret1, bob:secret2").unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].user, "alice");
        assert_eq!(tokens[1].token, "secret2");
    }

    #[test]
    fn rejects_malformed_pairs() {
        assert!(parse_api_tokens("alice").is_err());
        assert!(parse_api_tokens("alice:").is_err());
        assert!(parse_api_tokens("").is_err());
    }

    #[test]
    fn min_confidence_must_be_a_ratio() {
        assert!((parse_min_confidence("0.75").unwrap() - 0.75).abs() < f64::EPSILON);
        assert!(parse_min_confidence("1.5").is_err());
        assert!(parse_min_confidence("abc").is_err());
    }
}
