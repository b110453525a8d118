use super::jwt::JwtClaims;
use crate::errors::AppError;
use axum::{extract::FromRequestParts, http::request::Parts};

/// The authenticated caller, built from claims left by
/// [`jwt_auth_middleware`](super::jwt_auth_middleware).
///
/// Rejects with 401 when no claims are present or `sub` is not a positive integer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i64,
    pub email: String,
}

impl TryFrom<&JwtClaims> for AuthUser {
    type Error = AppError;

    fn try_from(claims: &JwtClaims) -> Result<Self, Self::Error> {
        match claims.sub.parse::<i64>() {
            Ok(id) if id > 0 => Ok(Self {
                id,
                email: claims.email.clone(),
            }),
            _ => {
                tracing::warn!(sub = %claims.sub, "Token subject is not a user id");
                Err(AppError::Unauthorized("Invalid token subject".to_string()))
            }
        }
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let claims = parts
            .extensions
            .get::<JwtClaims>()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

        AuthUser::try_from(claims)
    }
}
