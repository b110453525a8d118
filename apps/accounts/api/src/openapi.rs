use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Accounts API",
        description = "User registration, authentication, profiles and addresses"
    ),
    modifiers(&BearerSecurity),
    nest(
        (path = "/api/auth", api = domain_users::auth_handlers::AuthApiDoc),
        (path = "/api/users", api = domain_users::handlers::UsersApiDoc),
        (path = "/api/addresses", api = domain_users::addresses::handlers::AddressesApiDoc)
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by protected paths.
struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
