use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Address entity, always owned by exactly one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Address {
    pub id: i64,
    pub user_id: i64,
    pub street: String,
    pub city: String,
    pub country: String,
    pub postal_code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Address payload for create and update requests.
///
/// `user_id` is accepted on the wire but never trusted: the owner is always
/// the authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, Validate)]
pub struct AddressDto {
    #[validate(length(min = 1, max = 200, message = "Street must be 1-200 characters"))]
    pub street: String,
    #[validate(length(min = 1, max = 100, message = "City must be 1-100 characters"))]
    pub city: String,
    #[validate(length(min = 1, max = 100, message = "Country must be 1-100 characters"))]
    pub country: String,
    #[validate(length(min = 1, max = 20, message = "Postal code must be 1-20 characters"))]
    pub postal_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
}

/// Insert model handed to the repository; the owner is already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAddress {
    pub user_id: i64,
    pub street: String,
    pub city: String,
    pub country: String,
    pub postal_code: String,
}

/// Address as returned to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AddressResponse {
    pub id: i64,
    pub street: String,
    pub city: String,
    pub country: String,
    pub postal_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AddressCreatedResponse {
    pub message: String,
    pub address: AddressResponse,
}

impl AddressDto {
    /// Binds the payload to `owner`, discarding any client supplied `user_id`.
    pub fn into_new_address(self, owner: i64) -> NewAddress {
        NewAddress {
            user_id: owner,
            street: self.street,
            city: self.city,
            country: self.country,
            postal_code: self.postal_code,
        }
    }
}

impl Address {
    /// Overwrites the user-settable fields. Ownership never changes here.
    pub fn apply_update(&mut self, dto: AddressDto) {
        self.street = dto.street;
        self.city = dto.city;
        self.country = dto.country;
        self.postal_code = dto.postal_code;
        self.updated_at = Utc::now();
    }
}

impl From<&Address> for AddressDto {
    fn from(address: &Address) -> Self {
        Self {
            street: address.street.clone(),
            city: address.city.clone(),
            country: address.country.clone(),
            postal_code: address.postal_code.clone(),
            user_id: None,
        }
    }
}

impl From<Address> for AddressResponse {
    fn from(address: Address) -> Self {
        Self {
            id: address.id,
            street: address.street,
            city: address.city,
            country: address.country,
            postal_code: address.postal_code,
        }
    }
}
