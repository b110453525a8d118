use axum::{Json, Router, extract::State, http::HeaderMap, routing::post};
use axum_helpers::{
    AuditEvent, AuditOutcome, JwtAuth, ValidatedJson,
    errors::responses::{
        BadRequestValidationResponse, InternalServerErrorResponse, UnauthorizedResponse,
    },
    extract_ip_from_headers, extract_user_agent,
};
use std::sync::Arc;
use tracing::instrument;
use utoipa::OpenApi;

use crate::addresses::repository::AddressRepository;
use crate::error::{UserError, UserResult};
use crate::models::{LoginRequest, LoginResponse, User};
use crate::repository::UserRepository;
use crate::service::UserService;

pub const TOKEN_TYPE: &str = "Bearer";

/// A freshly signed access token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub access_token: String,
    /// Lifetime in seconds
    pub expires_in: i64,
}

/// Produces bearer tokens for authenticated users.
pub trait TokenIssuer: Clone + Send + Sync + 'static {
    fn issue(&self, user: &User) -> UserResult<IssuedToken>;
}

impl TokenIssuer for JwtAuth {
    fn issue(&self, user: &User) -> UserResult<IssuedToken> {
        let access_token = self
            .create_access_token(user.id, &user.email, &user.name)
            .map_err(|e| UserError::Token(e.to_string()))?;

        Ok(IssuedToken {
            access_token,
            expires_in: self.access_token_ttl(),
        })
    }
}

/// State for the auth routes
pub struct AuthState<U: UserRepository, A: AddressRepository, T: TokenIssuer> {
    pub service: Arc<UserService<U, A>>,
    pub issuer: T,
}

impl<U: UserRepository, A: AddressRepository, T: TokenIssuer> Clone for AuthState<U, A, T> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            issuer: self.issuer.clone(),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(login),
    components(
        schemas(LoginRequest, LoginResponse),
        responses(
            BadRequestValidationResponse,
            InternalServerErrorResponse,
            UnauthorizedResponse
        )
    ),
    tags((name = "auth", description = "Authentication endpoints"))
)]
pub struct AuthApiDoc;

pub fn auth_router<U, A, T>(service: UserService<U, A>, issuer: T) -> Router
where
    U: UserRepository + 'static,
    A: AddressRepository + 'static,
    T: TokenIssuer,
{
    let state = AuthState {
        service: Arc::new(service),
        issuer,
    };

    Router::new()
        .route("/login", post(login::<U, A, T>))
        .with_state(state)
}

/// Exchange email and password for a bearer token
#[utoipa::path(
    post,
    path = "/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
#[instrument(skip_all)]
async fn login<U: UserRepository, A: AddressRepository, T: TokenIssuer>(
    State(state): State<AuthState<U, A, T>>,
    headers: HeaderMap,
    ValidatedJson(input): ValidatedJson<LoginRequest>,
) -> UserResult<Json<LoginResponse>> {
    let ip = extract_ip_from_headers(&headers);
    let user_agent = extract_user_agent(&headers);

    let user = match state.service.authenticate(&input.email, &input.password).await {
        Ok(user) => user,
        Err(e) => {
            let outcome = match &e {
                UserError::InvalidCredentials => AuditOutcome::Denied,
                _ => AuditOutcome::Failure,
            };
            AuditEvent::new(None, "auth.login", None, outcome)
                .with_ip(ip)
                .with_user_agent(user_agent)
                .log();
            return Err(e);
        }
    };

    let token = state.issuer.issue(&user)?;
    let profile = state.service.get_user(user.id).await?;

    AuditEvent::new(
        Some(user.id),
        "auth.login",
        Some(format!("user:{}", user.id)),
        AuditOutcome::Success,
    )
    .with_ip(ip)
    .with_user_agent(user_agent)
    .log();

    Ok(Json(LoginResponse {
        access_token: token.access_token,
        token_type: TOKEN_TYPE.to_string(),
        expires_in: token.expires_in,
        user: profile,
    }))
}
