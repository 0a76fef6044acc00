use std::sync::Arc;

use axum::{
    extract::Request,
    http::{HeaderValue, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::AppState;

pub mod handlers;

/// Build the full HTTP app: client review routes (token-gated), the
/// admin API under `/api/v1`, and the shared middleware stack.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .merge(client_router())
        .nest("/api/v1", admin_router())
        .fallback(fallback_404)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id_middleware))
        .layer(middleware::from_fn(security_headers_middleware))
}

/// Routes reached through the shared link; every request carries `?token=`.
fn client_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/review", get(handlers::client_review))
        .route(
            "/review/recordings/:zoom_record_id/accept",
            post(handlers::client_accept),
        )
        .route(
            "/review/recordings/:zoom_record_id/override",
            post(handlers::client_override),
        )
        .route(
            "/review/recordings/:zoom_record_id/preview",
            post(handlers::client_preview),
        )
        .route(
            "/review/recordings/:zoom_record_id/confirm",
            post(handlers::client_confirm),
        )
}

fn admin_router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/projects",
            get(handlers::list_projects).post(handlers::create_project),
        )
        .route(
            "/projects/:project_id/recordings",
            get(handlers::project_review),
        )
        .route(
            "/projects/:project_id/recordings/:zoom_record_id/accept",
            post(handlers::admin_accept),
        )
        .route(
            "/projects/:project_id/recordings/:zoom_record_id/override",
            post(handlers::admin_override),
        )
        .route(
            "/projects/:project_id/recordings/:zoom_record_id/preview",
            post(handlers::admin_preview),
        )
        .route(
            "/projects/:project_id/recordings/:zoom_record_id/confirm",
            post(handlers::admin_confirm),
        )
        .route("/meetings/:meeting_id", get(handlers::get_meeting))
}

async fn fallback_404() -> StatusCode {
    StatusCode::NOT_FOUND
}

/// Middleware: injects a unique X-Request-Id into every response.
async fn request_id_middleware(req: Request, next: Next) -> Response {
    let req_id = uuid::Uuid::new_v4().to_string();
    let mut resp = next.run(req).await;
    if let Ok(val) = HeaderValue::from_str(&req_id) {
        resp.headers_mut().insert("x-request-id", val);
    }
    resp
}

/// Middleware: security headers on every response.
async fn security_headers_middleware(req: Request, next: Next) -> Response {
    let mut resp = next.run(req).await;
    let headers = resp.headers_mut();

    headers.insert("X-Content-Type-Options", HeaderValue::from_static("nosniff"));
    headers.insert("X-Frame-Options", HeaderValue::from_static("DENY"));
    headers.insert("Cache-Control", HeaderValue::from_static("no-store"));

    // Review links carry the project token in the query string.
    headers.insert("Referrer-Policy", HeaderValue::from_static("no-referrer"));

    headers.remove("Server");

    resp
}
