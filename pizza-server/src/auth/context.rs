//! Requester context
//!
//! Who is calling, passed explicitly into the offer and lifecycle engines.
//! Requests without an Authorization header are guests; a header that does
//! not carry a valid token is rejected with 401.

use axum::{extract::FromRequestParts, http::request::Parts};
use shared::error::{AppError, AppResult};

use super::{JwtError, JwtService};
use crate::core::ServerState;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequesterContext {
    /// `None` for guest sessions
    pub user_id: Option<String>,
    pub is_admin: bool,
}

impl RequesterContext {
    pub fn guest() -> Self {
        Self::default()
    }

    pub fn user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            is_admin: false,
        }
    }

    pub fn admin(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            is_admin: true,
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn is_guest(&self) -> bool {
        self.user_id.is_none()
    }

    pub fn require_admin(&self) -> AppResult<()> {
        if self.is_admin {
            Ok(())
        } else if self.is_guest() {
            Err(AppError::not_authenticated())
        } else {
            Err(AppError::admin_required())
        }
    }

    /// Validate a bearer token and build the context it grants
    pub fn from_token(jwt: &JwtService, token: &str) -> AppResult<Self> {
        let claims = jwt.validate_token(token).map_err(|e| match e {
            JwtError::ExpiredToken => AppError::token_expired(),
            _ => AppError::invalid_token("Invalid token"),
        })?;
        Ok(Self {
            is_admin: claims.is_admin(),
            user_id: Some(claims.sub),
        })
    }
}

impl FromRequestParts<ServerState> for RequesterContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(ctx) = parts.extensions.get::<RequesterContext>() {
            return Ok(ctx.clone());
        }

        let Some(header) = parts
            .headers
            .get(http::header::AUTHORIZATION)
            .map(|h| h.to_str().unwrap_or_default())
        else {
            return Ok(Self::guest());
        };

        let token = JwtService::extract_from_header(header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?;

        let ctx = Self::from_token(state.jwt_service(), token).inspect_err(|e| {
            tracing::warn!(error = %e, uri = %parts.uri, "Token rejected");
        })?;
        parts.extensions.insert(ctx.clone());
        Ok(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{ADMIN_ROLE, JwtConfig};
    use shared::error::ErrorCode;

    #[test]
    fn test_require_admin() {
        assert!(RequesterContext::admin("a").require_admin().is_ok());
        assert_eq!(
            RequesterContext::user("u").require_admin().unwrap_err().code,
            ErrorCode::AdminRequired
        );
        assert_eq!(
            RequesterContext::guest().require_admin().unwrap_err().code,
            ErrorCode::NotAuthenticated
        );
    }

    #[test]
    fn test_from_token() {
        let jwt = JwtService::with_config(JwtConfig {
            secret: "context-test-secret-with-enough-length".into(),
            expiration_minutes: 60,
            issuer: "pizza-auth".into(),
            audience: "pizza-storefront".into(),
        });

        let token = jwt.generate_token("u1", "customer").unwrap();
        let ctx = RequesterContext::from_token(&jwt, &token).unwrap();
        assert_eq!(ctx.user_id(), Some("u1"));
        assert!(!ctx.is_admin);

        let token = jwt.generate_token("boss", ADMIN_ROLE).unwrap();
        assert!(RequesterContext::from_token(&jwt, &token).unwrap().is_admin);

        let err = RequesterContext::from_token(&jwt, "garbage").unwrap_err();
        assert_eq!(err.code, ErrorCode::TokenInvalid);
    }
}
