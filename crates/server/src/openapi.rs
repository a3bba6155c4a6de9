use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct LoginRequest { pub email: String, pub password: String }

#[derive(ToSchema)]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub password: String,
    #[schema(value_type = Option<String>, format = Binary)]
    pub image: Option<Vec<u8>>,
}

#[derive(ToSchema)]
pub struct CreatePlaceForm {
    pub title: String,
    pub description: String,
    pub address: String,
    #[schema(value_type = Option<String>, format = Binary)]
    pub image: Option<Vec<u8>>,
}

#[derive(ToSchema)]
pub struct UpdatePlaceRequest { pub title: String, pub description: String }

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build()),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::list_users,
        crate::routes::auth::signup,
        crate::routes::auth::login,
        crate::routes::places::get_place,
        crate::routes::places::places_by_user,
        crate::routes::places::create_place,
        crate::routes::places::update_place,
        crate::routes::places::delete_place,
    ),
    components(
        schemas(
            HealthResponse,
            LoginRequest,
            SignupForm,
            CreatePlaceForm,
            UpdatePlaceRequest,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health"),
        (name = "users"),
        (name = "places")
    )
)]
pub struct ApiDoc;
