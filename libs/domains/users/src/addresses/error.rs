use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use sea_orm::DbErr;
use thiserror::Error;

use crate::error::{USER_NOT_FOUND_MESSAGE, UserError};

pub const ADDRESS_NOT_OWNED_MESSAGE: &str = "Address not found or does not belong to the user.";

#[derive(Debug, Error)]
pub enum AddressError {
    /// Missing, or owned by someone else. The two are not distinguished.
    #[error("Address {0} not found for caller")]
    NotFound(i64),

    /// Same as `NotFound`, raised by update with its own message.
    #[error("Address {0} not found for caller on update")]
    NotFoundForUpdate(i64),

    #[error("Owner {0} does not exist")]
    OwnerNotFound(i64),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AddressResult<T> = Result<T, AddressError>;

impl From<AddressError> for AppError {
    fn from(err: AddressError) -> Self {
        match err {
            AddressError::NotFound(_) => AppError::NotFound(ADDRESS_NOT_OWNED_MESSAGE.to_string()),
            AddressError::NotFoundForUpdate(id) => {
                AppError::NotFound(format!("Address with ID {} not found for current user.", id))
            }
            AddressError::OwnerNotFound(_) => {
                AppError::NotFound(USER_NOT_FOUND_MESSAGE.to_string())
            }
            AddressError::Database(e) => AppError::InternalServerError(format!("database: {}", e)),
            AddressError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

/// Owner lookups go through the user repository.
impl From<UserError> for AddressError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(id) => AddressError::OwnerNotFound(id),
            UserError::Database(e) => AddressError::Database(e),
            other => AddressError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for AddressError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
