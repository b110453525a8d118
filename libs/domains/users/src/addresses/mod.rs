//! Addresses owned by users.
//!
//! Every operation takes the caller's id and refuses to touch addresses that
//! belong to someone else. A foreign address is reported exactly like a
//! missing one.

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::{AddressError, AddressResult};
pub use models::{Address, AddressDto, AddressResponse, NewAddress};
pub use postgres::PgAddressRepository;
pub use repository::{AddressRepository, InMemoryAddressRepository};
pub use service::AddressService;
