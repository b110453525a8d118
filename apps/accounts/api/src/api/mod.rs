use axum::Router;
use axum_helpers::JwtAuth;
use domain_users::{
    AddressRepository, AddressService, PgAddressRepository, PgUserRepository, UserRepository,
    UserService, addresses, auth_handlers, handlers,
};
use std::sync::Arc;

use crate::state::{AppState, Storage};

pub mod health;

/// Creates the API routes without the `/api` prefix.
/// The `/api` prefix will be added by the `create_router` helper.
///
/// Returns a stateless Router (all sub-routers have state already applied).
pub fn routes(state: &AppState) -> Router {
    match &state.storage {
        Storage::Postgres(db) => domain_routes(
            Arc::new(PgUserRepository::new(db.clone())),
            Arc::new(PgAddressRepository::new(db.clone())),
            &state.jwt_auth,
        ),
        Storage::Memory { users, addresses } => {
            domain_routes(users.clone(), addresses.clone(), &state.jwt_auth)
        }
    }
}

fn domain_routes<U, A>(users: Arc<U>, address_repo: Arc<A>, jwt: &JwtAuth) -> Router
where
    U: UserRepository + 'static,
    A: AddressRepository + 'static,
{
    let user_service = UserService::new(users.clone(), address_repo.clone());
    let address_service = AddressService::new(address_repo, users);

    Router::new()
        .nest(
            "/auth",
            auth_handlers::auth_router(user_service.clone(), jwt.clone()),
        )
        .nest("/users", handlers::router(user_service, jwt.clone()))
        .nest(
            "/addresses",
            addresses::handlers::router(address_service, jwt.clone()),
        )
}

/// Creates a router with the /ready endpoint that performs actual health checks.
///
/// This router has state applied and can be merged with the stateless app router
/// from `create_router`.
pub fn ready_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(state)
}
