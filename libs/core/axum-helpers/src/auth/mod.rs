//! Stateless JWT authentication.
//!
//! ```ignore
//! use axum_helpers::auth::{JwtAuth, JwtConfig, jwt_auth_middleware, AuthUser};
//!
//! let auth = JwtAuth::new(&JwtConfig::from_env()?);
//!
//! let protected = Router::new()
//!     .route("/users/me", get(me))
//!     .layer(axum::middleware::from_fn_with_state(auth, jwt_auth_middleware));
//!
//! async fn me(user: AuthUser) -> String {
//!     user.id.to_string()
//! }
//! ```

pub mod config;
pub mod jwt;
pub mod middleware;
pub mod user;

pub use config::JwtConfig;
pub use jwt::{JwtAuth, JwtClaims};
pub use middleware::jwt_auth_middleware;
pub use user::AuthUser;
