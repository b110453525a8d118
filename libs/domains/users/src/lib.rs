//! Users Domain
//!
//! Registration, login, profile management and the addresses each user owns.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints, caller identity from `AuthUser`
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Ownership checks, password hashing
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + in-memory and Postgres)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Entities, DTOs, mapping
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use axum_helpers::{JwtAuth, JwtConfig};
//! use domain_users::{
//!     AddressService, InMemoryAddressRepository, InMemoryUserRepository, UserService, handlers,
//! };
//!
//! let addresses = InMemoryAddressRepository::new();
//! let users = Arc::new(InMemoryUserRepository::with_addresses(addresses.clone()));
//! let addresses = Arc::new(addresses);
//!
//! let jwt = JwtAuth::new(&JwtConfig::new("a-secret-of-at-least-thirty-two-chars").unwrap());
//! let service = UserService::new(users.clone(), addresses.clone());
//! let router = handlers::router(service, jwt);
//! ```

pub mod addresses;
pub mod auth_handlers;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use addresses::{
    Address, AddressDto, AddressError, AddressRepository, AddressResponse, AddressService,
    InMemoryAddressRepository, PgAddressRepository,
};
pub use auth_handlers::{IssuedToken, TokenIssuer};
pub use error::{UserError, UserResult};
pub use models::{
    CreateUser, LoginRequest, LoginResponse, MessageResponse, UpdateUser, User, UserResponse,
};
pub use postgres::PgUserRepository;
pub use repository::{InMemoryUserRepository, UserRepository};
pub use service::UserService;
