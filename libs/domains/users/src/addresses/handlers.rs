use axum::{
    Json, Router,
    extract::State,
    http::HeaderMap,
    middleware,
    routing::{get, post},
};
use axum_helpers::{
    AuditEvent, AuditOutcome, AuthUser, IdPath, JwtAuth, ValidatedJson,
    errors::responses::{
        BadRequestIdResponse, BadRequestValidationResponse, InternalServerErrorResponse,
        NotFoundResponse, UnauthorizedResponse,
    },
    extract_ip_from_headers, jwt_auth_middleware,
};
use std::sync::Arc;
use tracing::instrument;
use utoipa::OpenApi;

use super::entity;
use super::error::{AddressError, AddressResult};
use super::models::{AddressCreatedResponse, AddressDto, AddressResponse};
use super::repository::AddressRepository;
use super::service::AddressService;
use crate::models::MessageResponse;
use crate::repository::UserRepository;

pub const ADDRESS_CREATED_MESSAGE: &str = "Address created successfully!";
pub const ADDRESS_UPDATED_MESSAGE: &str = "Address updated successfully";
pub const ADDRESS_DELETED_MESSAGE: &str = "Address deleted successfully";

#[derive(OpenApi)]
#[openapi(
    paths(create_address, list_my_addresses, get_address, update_address, delete_address),
    components(
        schemas(AddressDto, AddressResponse, AddressCreatedResponse, MessageResponse),
        responses(
            BadRequestIdResponse,
            BadRequestValidationResponse,
            InternalServerErrorResponse,
            NotFoundResponse,
            UnauthorizedResponse
        )
    ),
    tags((name = entity::Model::TAG, description = "Addresses owned by the current user"))
)]
pub struct AddressesApiDoc;

type SharedService<A, U> = Arc<AddressService<A, U>>;

/// Addresses router; every route requires a valid bearer token.
pub fn router<A, U>(service: AddressService<A, U>, jwt: JwtAuth) -> Router
where
    A: AddressRepository + 'static,
    U: UserRepository + 'static,
{
    Router::new()
        .route("/", post(create_address::<A, U>))
        .route("/mine", get(list_my_addresses::<A, U>))
        .route(
            "/{id}",
            get(get_address::<A, U>)
                .put(update_address::<A, U>)
                .delete(delete_address::<A, U>),
        )
        .route_layer(middleware::from_fn_with_state(jwt, jwt_auth_middleware))
        .with_state(Arc::new(service))
}

/// Create an address owned by the caller
#[utoipa::path(
    post,
    path = "",
    tag = entity::Model::TAG,
    security(("bearer_auth" = [])),
    request_body = AddressDto,
    responses(
        (status = 200, description = "Address created", body = AddressCreatedResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
#[instrument(skip_all, fields(user_id = caller.id))]
async fn create_address<A: AddressRepository, U: UserRepository>(
    State(service): State<SharedService<A, U>>,
    caller: AuthUser,
    ValidatedJson(input): ValidatedJson<AddressDto>,
) -> AddressResult<Json<AddressCreatedResponse>> {
    let address = service.create_address(caller.id, input).await?;

    Ok(Json(AddressCreatedResponse {
        message: ADDRESS_CREATED_MESSAGE.to_string(),
        address: address.into(),
    }))
}

/// List the caller's addresses
#[utoipa::path(
    get,
    path = "/mine",
    tag = entity::Model::TAG,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's addresses", body = Vec<AddressResponse>),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
#[instrument(skip_all, fields(user_id = caller.id))]
async fn list_my_addresses<A: AddressRepository, U: UserRepository>(
    State(service): State<SharedService<A, U>>,
    caller: AuthUser,
) -> AddressResult<Json<Vec<AddressResponse>>> {
    let addresses = service.list_mine(caller.id).await?;
    Ok(Json(addresses.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = entity::Model::TAG,
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Address ID")),
    responses(
        (status = 200, description = "Address found", body = AddressResponse),
        (status = 400, response = BadRequestIdResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
#[instrument(skip_all, fields(user_id = caller.id, address_id = id))]
async fn get_address<A: AddressRepository, U: UserRepository>(
    State(service): State<SharedService<A, U>>,
    caller: AuthUser,
    IdPath(id): IdPath,
) -> AddressResult<Json<AddressResponse>> {
    let address = service.get_address(id, caller.id).await?;
    Ok(Json(address.into()))
}

/// Replace an owned address
#[utoipa::path(
    put,
    path = "/{id}",
    tag = entity::Model::TAG,
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Address ID")),
    request_body = AddressDto,
    responses(
        (status = 200, description = "Address updated", body = MessageResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
#[instrument(skip_all, fields(user_id = caller.id, address_id = id))]
async fn update_address<A: AddressRepository, U: UserRepository>(
    State(service): State<SharedService<A, U>>,
    caller: AuthUser,
    headers: HeaderMap,
    IdPath(id): IdPath,
    ValidatedJson(input): ValidatedJson<AddressDto>,
) -> AddressResult<Json<MessageResponse>> {
    let result = service.update_address(id, caller.id, input).await;
    audit(&headers, caller.id, "address.update", id, &result);
    result?;

    Ok(Json(MessageResponse::new(ADDRESS_UPDATED_MESSAGE)))
}

/// Delete an owned address
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = entity::Model::TAG,
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Address ID")),
    responses(
        (status = 200, description = "Address deleted", body = MessageResponse),
        (status = 400, response = BadRequestIdResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
#[instrument(skip_all, fields(user_id = caller.id, address_id = id))]
async fn delete_address<A: AddressRepository, U: UserRepository>(
    State(service): State<SharedService<A, U>>,
    caller: AuthUser,
    headers: HeaderMap,
    IdPath(id): IdPath,
) -> AddressResult<Json<MessageResponse>> {
    let result = service.delete_address(id, caller.id).await;
    audit(&headers, caller.id, "address.delete", id, &result);
    result?;

    Ok(Json(MessageResponse::new(ADDRESS_DELETED_MESSAGE)))
}

fn audit<T>(
    headers: &HeaderMap,
    caller_id: i64,
    action: &str,
    address_id: i64,
    result: &Result<T, AddressError>,
) {
    let outcome = match result {
        Ok(_) => AuditOutcome::Success,
        Err(AddressError::NotFound(_) | AddressError::NotFoundForUpdate(_)) => {
            AuditOutcome::Denied
        }
        Err(_) => AuditOutcome::Failure,
    };

    AuditEvent::new(
        Some(caller_id),
        action,
        Some(format!("address:{}", address_id)),
        outcome,
    )
    .with_ip(extract_ip_from_headers(headers))
    .log();
}
