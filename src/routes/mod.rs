//! HTTP routes for the UKM backend
//!
//! [`resolve`] maps a method and path to an [`Operation`]; the server runs the
//! gates for that operation's permission level and then calls the handler.

pub mod auth_routes;
pub mod crud;
pub mod health;
pub mod kategori;
pub mod kegiatan;
pub mod kehadiran;
pub mod openapi;
pub mod response;
pub mod statistics;
pub mod users;

use hyper::Method;

use crate::auth::Operation;

pub use auth_routes::{handle_login, handle_me, handle_register};
pub use health::health_check;
pub use openapi::{handle_openapi, ApiDoc};
pub use response::{
    error_from, error_response, json_response, message_response, parse_json_body,
    preflight_response, FullBody,
};
pub use statistics::handle_statistics;

/// A resolved route: the operation and the `{id}` path segment, if any
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub operation: Operation,
    pub id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteMatch {
    Found(Route),
    /// The path exists but not for this method
    MethodNotAllowed,
    NotFound,
}

/// The four collection-style resource families
#[derive(Debug, Clone, Copy)]
enum Family {
    Users,
    Kegiatan,
    Kehadiran,
    Kategori,
}

impl Family {
    fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "users" => Some(Self::Users),
            "kegiatan" => Some(Self::Kegiatan),
            "kehadiran" => Some(Self::Kehadiran),
            "kategori" => Some(Self::Kategori),
            _ => None,
        }
    }

    fn collection_operation(self, method: &Method) -> Option<Operation> {
        use Operation::*;

        let op = match (self, method.as_str()) {
            (Self::Users, "GET") => ListUsers,
            (Self::Users, "POST") => CreateUser,
            (Self::Kegiatan, "GET") => ListKegiatan,
            (Self::Kegiatan, "POST") => CreateKegiatan,
            (Self::Kehadiran, "GET") => ListKehadiran,
            (Self::Kehadiran, "POST") => CreateKehadiran,
            (Self::Kategori, "GET") => ListKategori,
            (Self::Kategori, "POST") => CreateKategori,
            _ => return None,
        };
        Some(op)
    }

    fn item_operation(self, method: &Method) -> Option<Operation> {
        use Operation::*;

        let op = match (self, method.as_str()) {
            (Self::Users, "GET") => GetUser,
            (Self::Users, "PUT") => UpdateUser,
            (Self::Users, "DELETE") => DeleteUser,
            (Self::Kegiatan, "GET") => GetKegiatan,
            (Self::Kegiatan, "PUT") => UpdateKegiatan,
            (Self::Kegiatan, "DELETE") => DeleteKegiatan,
            (Self::Kehadiran, "GET") => GetKehadiran,
            (Self::Kehadiran, "PUT") => UpdateKehadiran,
            (Self::Kehadiran, "DELETE") => DeleteKehadiran,
            (Self::Kategori, "GET") => GetKategori,
            (Self::Kategori, "PUT") => UpdateKategori,
            (Self::Kategori, "DELETE") => DeleteKategori,
            _ => return None,
        };
        Some(op)
    }
}

fn found(operation: Option<Operation>, id: Option<&str>) -> RouteMatch {
    match operation {
        Some(operation) => RouteMatch::Found(Route {
            operation,
            id: id.map(str::to_string),
        }),
        None => RouteMatch::MethodNotAllowed,
    }
}

/// Resolve a request line to an operation
pub fn resolve(method: &Method, path: &str) -> RouteMatch {
    let trimmed = path.trim_end_matches('/');
    let segments: Vec<&str> = trimmed.split('/').skip(1).collect();

    let single = |expected: Method, op: Operation| {
        if *method == expected {
            found(Some(op), None)
        } else {
            RouteMatch::MethodNotAllowed
        }
    };

    match segments.as_slice() {
        ["health"] => single(Method::GET, Operation::Health),
        ["openapi.json"] => single(Method::GET, Operation::OpenApiDocument),
        ["register"] => single(Method::POST, Operation::Register),
        ["login"] => single(Method::POST, Operation::Login),
        ["me"] => single(Method::GET, Operation::Me),
        ["statistics"] => single(Method::GET, Operation::Statistics),
        [family] => match Family::from_segment(family) {
            Some(family) => found(family.collection_operation(method), None),
            None => RouteMatch::NotFound,
        },
        [family, id] if !id.is_empty() => match Family::from_segment(family) {
            Some(family) => found(family.item_operation(method), Some(*id)),
            None => RouteMatch::NotFound,
        },
        _ => RouteMatch::NotFound,
    }
}
