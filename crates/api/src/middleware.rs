use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use stocklens_infra::ApiToken;

use crate::context::UserContext;

/// Configured bearer tokens, resolved to user names.
#[derive(Debug, Default)]
pub struct TokenSet {
    by_token: HashMap<String, String>,
}

impl TokenSet {
    pub fn new(tokens: &[ApiToken]) -> Self {
        Self {
            by_token: tokens
                .iter()
                .map(|t| (t.token.clone(), t.user.clone()))
                .collect(),
        }
    }

    pub fn resolve(&self, token: &str) -> Option<&str> {
        self.by_token.get(token).map(String::as_str)
    }
}

#[derive(Clone)]
pub struct AuthState {
    pub tokens: Arc<TokenSet>,
}

pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = extract_bearer(req.headers())?;

    let user = state
        .tokens
        .resolve(token)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    req.extensions_mut().insert(UserContext::new(user));

    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, StatusCode> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let header = header.to_str().map_err(|_| StatusCode::UNAUTHORIZED)?;

    let header = header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = header.trim();
    if token.is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(token)
}
