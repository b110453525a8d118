use axum::{
    Json, Router,
    extract::State,
    http::HeaderMap,
    middleware,
    routing::{get, post},
};
use axum_helpers::{
    AuditEvent, AuditOutcome, AuthUser, JwtAuth,
    errors::responses::{
        BadRequestValidationResponse, ConflictResponse, InternalServerErrorResponse,
        NotFoundResponse, UnauthorizedResponse,
    },
    extract_ip_from_headers, extract_user_agent, jwt_auth_middleware, ValidatedJson,
};
use std::sync::Arc;
use tracing::instrument;
use utoipa::OpenApi;

use crate::addresses::repository::AddressRepository;
use crate::entity;
use crate::error::UserResult;
use crate::models::{CreateUser, MessageResponse, UpdateUser, UserCreatedResponse, UserResponse};
use crate::repository::UserRepository;
use crate::service::UserService;

pub const USER_CREATED_MESSAGE: &str = "User created successfully!";
pub const USER_DELETED_MESSAGE: &str = "User deleted successfully";

/// OpenAPI documentation for the users endpoints
#[derive(OpenApi)]
#[openapi(
    paths(create_user, get_me, update_me, delete_me),
    components(
        schemas(CreateUser, UpdateUser, UserResponse, UserCreatedResponse, MessageResponse),
        responses(
            BadRequestValidationResponse,
            ConflictResponse,
            InternalServerErrorResponse,
            NotFoundResponse,
            UnauthorizedResponse
        )
    ),
    tags((name = entity::Model::TAG, description = "User registration and profile endpoints"))
)]
pub struct UsersApiDoc;

type SharedService<U, A> = Arc<UserService<U, A>>;

/// Users router. `/me` routes require a valid bearer token; registration does not.
pub fn router<U, A>(service: UserService<U, A>, jwt: JwtAuth) -> Router
where
    U: UserRepository + 'static,
    A: AddressRepository + 'static,
{
    let shared_service = Arc::new(service);

    Router::new()
        .route(
            "/me",
            get(get_me::<U, A>)
                .put(update_me::<U, A>)
                .delete(delete_me::<U, A>),
        )
        .route_layer(middleware::from_fn_with_state(jwt, jwt_auth_middleware))
        .route("/", post(create_user::<U, A>))
        .with_state(shared_service)
}

/// Register a new user
#[utoipa::path(
    post,
    path = "",
    tag = entity::Model::TAG,
    request_body = CreateUser,
    responses(
        (status = 200, description = "User created", body = UserCreatedResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
#[instrument(skip_all)]
async fn create_user<U: UserRepository, A: AddressRepository>(
    State(service): State<SharedService<U, A>>,
    headers: HeaderMap,
    ValidatedJson(input): ValidatedJson<CreateUser>,
) -> UserResult<Json<UserCreatedResponse>> {
    let user = service.create_user(input).await?;

    AuditEvent::new(
        Some(user.id),
        "user.create",
        Some(format!("user:{}", user.id)),
        AuditOutcome::Success,
    )
    .with_ip(extract_ip_from_headers(&headers))
    .with_user_agent(extract_user_agent(&headers))
    .log();

    Ok(Json(UserCreatedResponse {
        message: USER_CREATED_MESSAGE.to_string(),
        user,
    }))
}

/// Current user's profile, including addresses
#[utoipa::path(
    get,
    path = "/me",
    tag = entity::Model::TAG,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
#[instrument(skip_all, fields(user_id = caller.id))]
async fn get_me<U: UserRepository, A: AddressRepository>(
    State(service): State<SharedService<U, A>>,
    caller: AuthUser,
) -> UserResult<Json<UserResponse>> {
    let user = service.get_user(caller.id).await?;
    Ok(Json(user))
}

/// Update the current user's profile
#[utoipa::path(
    put,
    path = "/me",
    tag = entity::Model::TAG,
    security(("bearer_auth" = [])),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
#[instrument(skip_all, fields(user_id = caller.id))]
async fn update_me<U: UserRepository, A: AddressRepository>(
    State(service): State<SharedService<U, A>>,
    caller: AuthUser,
    ValidatedJson(input): ValidatedJson<UpdateUser>,
) -> UserResult<Json<UserResponse>> {
    let user = service.update_user(caller.id, input).await?;
    Ok(Json(user))
}

/// Delete the current user and all of their addresses
#[utoipa::path(
    delete,
    path = "/me",
    tag = entity::Model::TAG,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
#[instrument(skip_all, fields(user_id = caller.id))]
async fn delete_me<U: UserRepository, A: AddressRepository>(
    State(service): State<SharedService<U, A>>,
    caller: AuthUser,
    headers: HeaderMap,
) -> UserResult<Json<MessageResponse>> {
    service.delete_user(caller.id).await?;

    AuditEvent::new(
        Some(caller.id),
        "user.delete",
        Some(format!("user:{}", caller.id)),
        AuditOutcome::Success,
    )
    .with_ip(extract_ip_from_headers(&headers))
    .log();

    Ok(Json(MessageResponse::new(USER_DELETED_MESSAGE)))
}
