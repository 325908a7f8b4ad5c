/// Authenticated user for a request.
///
/// Inserted by the auth middleware; present for all protected routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserContext {
    user: String,
}

impl UserContext {
    pub fn new(user: impl Into<String>) -> Self {
        Self { user: user.into() }
    }

    pub fn user(&self) -> &str {
        &self.user
    }
}
