//! OpenAPI document served at `GET /openapi.json`

use hyper::{Response, StatusCode};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::auth::Role;
use crate::db::schemas::{Kategori, Kegiatan, Kehadiran, UserView};
use crate::routes::auth_routes::{LoginRequest, LoginResponse, LoginUser, MeResponse, RegisterRequest};
use crate::routes::health::HealthResponse;
use crate::routes::response::{json_response, ErrorResponse, FullBody, MessageResponse};
use crate::routes::users::UserRequest;
use crate::routes::{auth_routes, health, kategori, kegiatan, kehadiran, statistics, users};
use crate::services::statistics::{ActivityStats, MemberStats, Statistics, UkmStats};

/// Name of the bearer scheme the path annotations refer to
pub const BEARER_SCHEME: &str = "bearer_auth";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "UKM Backend",
        description = "Campus student-organization management: members, kegiatan, kehadiran and kategori"
    ),
    paths(
        health::health_check,
        handle_openapi,
        auth_routes::handle_register,
        auth_routes::handle_login,
        auth_routes::handle_me,
        users::list_users,
        users::get_user,
        users::create_user,
        users::update_user,
        users::delete_user,
        kegiatan::list_kegiatan,
        kegiatan::get_kegiatan,
        kegiatan::create_kegiatan,
        kegiatan::update_kegiatan,
        kegiatan::delete_kegiatan,
        kehadiran::list_kehadiran,
        kehadiran::get_kehadiran,
        kehadiran::create_kehadiran,
        kehadiran::update_kehadiran,
        kehadiran::delete_kehadiran,
        kategori::list_kategori,
        kategori::get_kategori,
        kategori::create_kategori,
        kategori::update_kategori,
        kategori::delete_kategori,
        statistics::handle_statistics,
    ),
    components(schemas(
        Role,
        ErrorResponse,
        MessageResponse,
        HealthResponse,
        RegisterRequest,
        LoginRequest,
        LoginUser,
        LoginResponse,
        MeResponse,
        UserRequest,
        UserView,
        Kegiatan,
        Kehadiran,
        Kategori,
        Statistics,
        UkmStats,
        MemberStats,
        ActivityStats,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "system", description = "Liveness and API description"),
        (name = "auth", description = "Registration, login and the current identity"),
        (name = "users", description = "Account management (admin)"),
        (name = "kegiatan", description = "Activities"),
        (name = "kehadiran", description = "Attendance"),
        (name = "kategori", description = "UKM categories"),
        (name = "statistics", description = "Dashboard statistics (admin)"),
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            BEARER_SCHEME,
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// GET /openapi.json
#[utoipa::path(
    get,
    path = "/openapi.json",
    tag = "system",
    responses((status = 200, description = "This document"))
)]
pub fn handle_openapi() -> Response<FullBody> {
    json_response(StatusCode::OK, &ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document() -> serde_json::Value {
        serde_json::to_value(ApiDoc::openapi()).unwrap()
    }

    #[test]
    fn test_every_route_is_described() {
        let doc = document();
        let paths = doc["paths"].as_object().unwrap();

        for (path, method) in [
            ("/health", "get"),
            ("/openapi.json", "get"),
            ("/register", "post"),
            ("/login", "post"),
            ("/me", "get"),
            ("/users", "post"),
            ("/users/{id}", "put"),
            ("/kegiatan", "get"),
            ("/kegiatan/{id}", "delete"),
            ("/kehadiran", "post"),
            ("/kategori/{id}", "get"),
            ("/statistics", "get"),
        ] {
            assert!(paths[path].get(method).is_some(), "{method} {path}");
        }
    }

    #[test]
    fn test_bearer_scheme_and_requirements() {
        let doc = document();

        let scheme = &doc["components"]["securitySchemes"][BEARER_SCHEME];
        assert_eq!(scheme["type"], "http");
        assert_eq!(scheme["scheme"], "bearer");
        assert_eq!(scheme["bearerFormat"], "JWT");

        assert!(doc["paths"]["/statistics"]["get"]["security"].is_array());
        assert!(doc["paths"]["/login"]["post"].get("security").is_none());
    }

    #[test]
    fn test_schemas_follow_wire_names() {
        let doc = document();
        let schemas = &doc["components"]["schemas"];

        assert!(schemas["Kegiatan"]["properties"].get("maxParticipants").is_some());
        assert!(schemas["UserView"]["properties"].get("password").is_none());
        assert!(schemas["Statistics"]["properties"].get("totalKegiatan").is_some());
        assert!(schemas["Role"].is_object());
    }
}
