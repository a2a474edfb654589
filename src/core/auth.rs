//! Bearer-token authentication
//!
//! Session management and identity are out of scope; the API only needs to
//! know who performed an operation (payments and stock movements record the
//! acting user). [`AuthProvider`] resolves a bearer token into an
//! [`AuthContext`]; the bundled [`StaticTokenProvider`] maps tokens from
//! configuration, which is enough for deployments fronted by a gateway.

use async_trait::async_trait;
use uuid::Uuid;

use crate::core::error::{AppResult, RequestError};

/// Who is making the request.
#[derive(Debug, Clone)]
pub enum AuthContext {
    /// An authenticated user
    User {
        user_id: Uuid,
        name: String,
        roles: Vec<String>,
    },

    /// Service-to-service access
    Service { service_name: String },

    /// No authentication (only for `NoAuthProvider` setups)
    Anonymous,
}

impl AuthContext {
    /// Acting user id, if any. Anonymous and service contexts act as the
    /// nil user in audit fields.
    pub fn user_id(&self) -> Uuid {
        match self {
            AuthContext::User { user_id, .. } => *user_id,
            _ => Uuid::nil(),
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        match self {
            AuthContext::User { roles, .. } => roles.iter().any(|r| r == role),
            AuthContext::Service { .. } => true,
            AuthContext::Anonymous => false,
        }
    }
}

/// Resolves bearer tokens into auth contexts.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Authenticate a bearer token. `None` means no token was supplied.
    async fn authenticate(&self, token: Option<&str>) -> AppResult<AuthContext>;
}

/// Provider that accepts every request as anonymous. Development only.
#[derive(Debug, Default, Clone)]
pub struct NoAuthProvider;

#[async_trait]
impl AuthProvider for NoAuthProvider {
    async fn authenticate(&self, _token: Option<&str>) -> AppResult<AuthContext> {
        Ok(AuthContext::Anonymous)
    }
}

/// A token registered in configuration.
#[derive(Debug, Clone)]
pub struct StaticToken {
    pub token: String,
    pub user_id: Uuid,
    pub name: String,
    pub roles: Vec<String>,
}

/// Provider backed by a fixed token table.
#[derive(Debug, Default, Clone)]
pub struct StaticTokenProvider {
    tokens: Vec<StaticToken>,
}

impl StaticTokenProvider {
    pub fn new(tokens: Vec<StaticToken>) -> Self {
        Self { tokens }
    }
}

#[async_trait]
impl AuthProvider for StaticTokenProvider {
    async fn authenticate(&self, token: Option<&str>) -> AppResult<AuthContext> {
        let token = token.ok_or_else(|| RequestError::Unauthorized {
            message: "missing bearer token".to_string(),
        })?;

        self.tokens
            .iter()
            .find(|t| t.token == token)
            .map(|t| AuthContext::User {
                user_id: t.user_id,
                name: t.name.clone(),
                roles: t.roles.clone(),
            })
            .ok_or_else(|| {
                RequestError::Unauthorized {
                    message: "invalid bearer token".to_string(),
                }
                .into()
            })
    }
}

/// Strip the `Bearer ` prefix from an `Authorization` header value.
pub fn bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .map(str::trim)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> StaticTokenProvider {
        StaticTokenProvider::new(vec![StaticToken {
            token: "secret".to_string(),
            user_id: Uuid::new_v4(),
            name: "Ana".to_string(),
            roles: vec!["cashier".to_string()],
        }])
    }

    #[tokio::test]
    async fn valid_token_resolves_user() {
        let ctx = provider().authenticate(Some("secret")).await.unwrap();
        assert!(matches!(ctx, AuthContext::User { .. }));
        assert!(ctx.has_role("cashier"));
        assert!(!ctx.has_role("admin"));
    }

    #[tokio::test]
    async fn missing_token_is_unauthorized() {
        let err = provider().authenticate(None).await.unwrap_err();
        assert_eq!(err.error_code(), "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn invalid_token_is_unauthorized() {
        let err = provider().authenticate(Some("nope")).await.unwrap_err();
        assert_eq!(err.error_code(), "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn no_auth_provider_is_anonymous() {
        let ctx = NoAuthProvider.authenticate(None).await.unwrap();
        assert!(matches!(ctx, AuthContext::Anonymous));
        assert_eq!(ctx.user_id(), Uuid::nil());
    }

    #[test]
    fn bearer_prefix_is_stripped() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(bearer_token("bearer abc"), Some("abc"));
        assert_eq!(bearer_token("Basic abc"), None);
    }
}
