use attachments::{AttachmentStore, ImageCategory};
use axum::{
    Router,
    extract::{DefaultBodyLimit, Request},
    http::{StatusCode, Uri, uri::PathAndQuery},
    middleware::map_request,
    routing::{MethodRouter, delete, get, post, put},
};
use configuration::Settings;
use database::DbRepository;
use serde_json::json;
use std::sync::Arc;
use tower::Layer;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer, ExposeHeaders},
    services::ServeDir,
    trace::TraceLayer,
};

pub mod envelope;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod telemetry;
pub mod validation;

use envelope::ApiResponse;
use handlers::{drivers, races, teams};

/// The shared application state that all handlers can access.
pub struct AppState {
    pub db_repo: DbRepository,
    pub attachments: AttachmentStore,
    /// Scheme for image URLs when no proxy header says otherwise.
    pub default_scheme: String,
    pub body_limit_bytes: usize,
}

/// Builds the full application: API routes, the two static image aliases and
/// the middleware stack.
///
/// API paths are matched case-insensitively and without trailing slashes, so
/// `/api/Driver/Get/` reaches the same handler as `/api/driver/get`.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any())
        .expose_headers(ExposeHeaders::any());

    let api = Router::new()
        .route("/api/health", enveloped(get(|| async { "OK" })))
        .route("/api/driver/add", enveloped(post(drivers::add_driver)))
        .route("/api/driver/update", enveloped(put(drivers::update_driver)))
        .route("/api/driver/get", enveloped(get(drivers::get_drivers)))
        .route("/api/driver/getdriverslookup", enveloped(get(drivers::get_drivers_lookup)))
        .route("/api/driver/delete/:id", enveloped(delete(drivers::delete_driver)))
        .route("/api/team/add", enveloped(post(teams::add_team)))
        .route("/api/team/update", enveloped(put(teams::update_team)))
        .route("/api/team/get", enveloped(get(teams::get_teams)))
        .route("/api/team/delete/:id", enveloped(delete(teams::delete_team)))
        .route("/api/race/add", enveloped(post(races::add_race)))
        .route("/api/race/update", enveloped(put(races::update_race)))
        .route("/api/race/get", enveloped(get(races::get_races)))
        .route("/api/race/delete/:id", enveloped(delete(races::delete_race)))
        .fallback(unknown_route)
        .layer(DefaultBodyLimit::max(state.body_limit_bytes));

    let mut app = api;
    for category in ImageCategory::ALL {
        let alias = format!("/{}", category.route_alias());
        app = app.nest_service(&alias, ServeDir::new(state.attachments.category_dir(category)));
    }

    let app = app
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(error::panic_response));

    // The rewrite has to wrap the router itself; a `Router::layer` middleware
    // would only run after a route was already chosen.
    Router::new().fallback_service(map_request(normalize_request_path).layer(app))
}

/// Answers a known path called with the wrong method with a 405 envelope
/// instead of an empty body.
fn enveloped(route: MethodRouter<Arc<AppState>>) -> MethodRouter<Arc<AppState>> {
    route.fallback(method_not_allowed)
}

async fn method_not_allowed() -> ApiResponse {
    ApiResponse::failure(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed", json!(""))
}

async fn unknown_route() -> ApiResponse {
    ApiResponse::failure(StatusCode::NOT_FOUND, "Resource not found", json!(""))
}

async fn normalize_request_path(mut req: Request) -> Request {
    if let Some(path) = normalized_path(req.uri().path()) {
        let path_and_query = match req.uri().query() {
            Some(query) => format!("{path}?{query}"),
            None => path,
        };
        let mut parts = req.uri().clone().into_parts();
        if let Ok(path_and_query) = PathAndQuery::try_from(path_and_query) {
            parts.path_and_query = Some(path_and_query);
            if let Ok(uri) = Uri::from_parts(parts) {
                *req.uri_mut() = uri;
            }
        }
    }
    req
}

/// Lower-cases `/api` paths and the image alias segment, and drops trailing
/// slashes. `None` when the path is already canonical.
fn normalized_path(path: &str) -> Option<String> {
    let trimmed = match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    };

    let (first, rest) = match trimmed[1..].find('/') {
        Some(at) => trimmed.split_at(at + 1),
        None => (trimmed, ""),
    };
    let first_lower = first.to_ascii_lowercase();

    let normalized = if first_lower == "/api" {
        trimmed.to_ascii_lowercase()
    } else if ImageCategory::ALL
        .iter()
        .any(|category| &first_lower[1..] == category.route_alias())
    {
        format!("{first_lower}{rest}")
    } else {
        trimmed.to_string()
    };

    (normalized != path).then_some(normalized)
}

/// Opens the database and the image store, then serves until Ctrl-C.
pub async fn run_server(settings: Settings) -> anyhow::Result<()> {
    let db_pool = database::connect(&settings.database.url, settings.database.max_connections).await?;
    database::run_migrations(&db_pool).await?;
    let attachments = AttachmentStore::open(&settings.storage.root).await?;

    let app_state = Arc::new(AppState {
        db_repo: DbRepository::new(db_pool),
        attachments,
        default_scheme: settings.server.default_scheme.clone(),
        body_limit_bytes: settings.server.body_limit_bytes,
    });
    let app = build_router(app_state);

    let addr = settings.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, storage = %settings.storage.root.display(), "Web server started.");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Web server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for the shutdown signal.");
    }
}
