//! HTTP server implementation
//!
//! Uses hyper http1 with TokioIo; one task per connection. Every request goes
//! through [`dispatch`]: CORS preflight, route resolution, the gates for the
//! route's permission level, then the handler, all under the request deadline.

use bytes::Bytes;
use hyper::body::{Body, Incoming};
use hyper::header::HeaderValue;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::auth::{
    identity, AuthError, Claims, CredentialStore, Gates, Operation, PermissionLevel, TokenService,
    UserCredentialStore,
};
use crate::config::Args;
use crate::db::{Collections, Stores};
use crate::routes::{self, kategori, kegiatan, kehadiran, users, FullBody, Route, RouteMatch};
use crate::types::UkmError;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Shared application state
pub struct AppState {
    pub args: Args,
    pub tokens: Arc<TokenService>,
    pub gates: Gates,
    /// Collection handles for aggregation, absent without MongoDB
    pub db: Option<Collections>,
    /// Document stores the CRUD routes go through
    pub stores: Option<Stores>,
    pub credentials: Option<Arc<dyn CredentialStore>>,
    pub started_at: Instant,
}

impl AppState {
    /// Build state without a database. Fails when the signing secret is unusable.
    pub fn new(args: Args) -> Result<Self, UkmError> {
        let tokens = Arc::new(TokenService::new(args.jwt_secret())?);
        let gates = Gates::new(Arc::clone(&tokens));

        Ok(Self {
            args,
            tokens,
            gates,
            db: None,
            stores: None,
            credentials: None,
            started_at: Instant::now(),
        })
    }

    pub fn with_database(self, db: Collections) -> Self {
        let stores = Stores::from_collections(&db);
        let mut state = self.with_stores(stores);
        state.db = Some(db);
        state
    }

    /// Route CRUD and login through the given stores
    pub fn with_stores(mut self, stores: Stores) -> Self {
        self.credentials = Some(Arc::new(UserCredentialStore::new(Arc::clone(&stores.users))));
        self.stores = Some(stores);
        self
    }

    pub fn with_credentials(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.credentials = Some(store);
        self
    }

    pub fn db(&self) -> Result<&Collections, UkmError> {
        self.db
            .as_ref()
            .ok_or_else(|| UkmError::Unavailable("Database not available".into()))
    }

    pub fn stores(&self) -> Result<&Stores, UkmError> {
        self.stores
            .as_ref()
            .ok_or_else(|| UkmError::Unavailable("Database not available".into()))
    }

    pub fn credentials(&self) -> Result<&dyn CredentialStore, UkmError> {
        self.credentials
            .as_deref()
            .ok_or_else(|| UkmError::Unavailable("Database not available".into()))
    }
}

/// Accept connections until the process exits
pub async fn run(state: Arc<AppState>) -> Result<(), UkmError> {
    let addr = state.args.listen_addr();
    let listener = TcpListener::bind(addr).await?;

    info!("UKM backend listening on {}", addr);

    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, peer, req).await }
                    });

                    if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                        debug!("Error serving connection from {}: {:?}", peer, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

async fn handle_request(
    state: Arc<AppState>,
    peer: SocketAddr,
    req: Request<Incoming>,
) -> Result<Response<FullBody>, Infallible> {
    debug!("{} {} from {}", req.method(), req.uri().path(), peer);
    Ok(dispatch(&state, req).await)
}

/// Run one request through the pipeline and log its outcome
///
/// The response carries an `x-request-id` header matching the log line.
pub async fn dispatch<B>(state: &AppState, req: Request<B>) -> Response<FullBody>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let request_id = Uuid::new_v4();
    let started = Instant::now();

    let mut response = match tokio::time::timeout(state.args.request_timeout(), route_request(state, req)).await {
        Ok(response) => response,
        Err(_) => {
            warn!(%request_id, "{} {} exceeded the {:?} deadline", method, path, state.args.request_timeout());
            routes::error_response(StatusCode::SERVICE_UNAVAILABLE, "Request timed out")
        }
    };

    info!(
        %request_id,
        "{} {} {} {}ms",
        method,
        path,
        response.status().as_u16(),
        started.elapsed().as_millis()
    );

    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

async fn route_request<B>(state: &AppState, mut req: Request<B>) -> Response<FullBody>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    if req.method() == Method::OPTIONS {
        return routes::preflight_response();
    }

    let route = match routes::resolve(req.method(), req.uri().path()) {
        RouteMatch::Found(route) => route,
        RouteMatch::MethodNotAllowed => {
            return routes::error_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
        }
        RouteMatch::NotFound => return routes::error_response(StatusCode::NOT_FOUND, "Not found"),
    };

    let level = route.operation.required_permission();
    if let Err(err) = state.gates.admit(level, &mut req) {
        log_rejection(route.operation, level, &err);
        return routes::error_response(err.status_code(), err.public_message());
    }

    match handle_operation(state, route, req).await {
        Ok(response) => response,
        Err(err) => routes::error_from(&err),
    }
}

fn log_rejection(operation: Operation, level: PermissionLevel, err: &AuthError) {
    match err {
        AuthError::Forbidden => warn!(
            "{} denied: requires {} ({})",
            operation.description(),
            level,
            err
        ),
        _ => debug!("{} rejected: {}", operation.description(), err),
    }
}

fn caller(claims: Option<&Claims>) -> Result<&Claims, UkmError> {
    claims.ok_or(UkmError::Auth(AuthError::Unauthenticated))
}

async fn handle_operation<B>(
    state: &AppState,
    route: Route,
    req: Request<B>,
) -> Result<Response<FullBody>, UkmError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    use Operation::*;

    let id = route.id.as_deref().unwrap_or_default();
    let claims = identity(&req).cloned();

    match route.operation {
        Health => Ok(routes::health_check(state)),
        OpenApiDocument => Ok(routes::handle_openapi()),
        Register => routes::handle_register(state, req).await,
        Login => routes::handle_login(state, req).await,
        Me => Ok(routes::handle_me(caller(claims.as_ref())?)),

        ListUsers => users::list_users(state).await,
        GetUser => users::get_user(state, id).await,
        CreateUser => users::create_user(state, req).await,
        UpdateUser => users::update_user(state, id, req).await,
        DeleteUser => users::delete_user(state, id).await,

        ListKegiatan => kegiatan::list_kegiatan(state).await,
        GetKegiatan => kegiatan::get_kegiatan(state, id).await,
        CreateKegiatan => kegiatan::create_kegiatan(state, caller(claims.as_ref())?, req).await,
        UpdateKegiatan => kegiatan::update_kegiatan(state, id, req).await,
        DeleteKegiatan => kegiatan::delete_kegiatan(state, id).await,

        ListKehadiran => kehadiran::list_kehadiran(state).await,
        GetKehadiran => kehadiran::get_kehadiran(state, id).await,
        CreateKehadiran => kehadiran::create_kehadiran(state, caller(claims.as_ref())?, req).await,
        UpdateKehadiran => kehadiran::update_kehadiran(state, id, req).await,
        DeleteKehadiran => kehadiran::delete_kehadiran(state, id).await,

        ListKategori => kategori::list_kategori(state).await,
        GetKategori => kategori::get_kategori(state, id).await,
        CreateKategori => kategori::create_kategori(state, caller(claims.as_ref())?, req).await,
        UpdateKategori => kategori::update_kategori(state, id, req).await,
        DeleteKategori => kategori::delete_kategori(state, id).await,

        Statistics => routes::handle_statistics(state).await,
    }
}
