//! HTTP endpoints of the proxy server.
//!
//! Browsers cannot call the AirGradient API directly because it sends no CORS
//! headers. This server forwards the one endpoint the dashboard needs and
//! answers with permissive CORS headers.
//!
//! # Endpoints
//!
//! - `GET /` - Info page
//! - `GET /api/health` - Service health check
//! - `GET /api/public/api/v1/locations/measures/current?token=...` - Forwarded
//!   to the upstream API; status and body are passed through unchanged
//!
//! Any other path is looked up in the static file directory, if one is
//! configured.
//!
//! ## Error Handling
//!
//! Errors raised here are returned as JSON `{"error": "..."}` via [`AppError`].
//! Upstream error statuses are not errors of this server and pass through.

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Body,
    extract::{Query, Request, State},
    http::{Method, StatusCode, header},
    middleware::{self, Next},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, error};

use crate::state::AppState;

/// Path of the forwarded measures endpoint.
pub const PROXY_MEASURES_PATH: &str = "/api/public/api/v1/locations/measures/current";

/// Create the API router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(info_page))
        .route("/api/health", get(health))
        .route(PROXY_MEASURES_PATH, get(proxy_measures))
}

/// Build the complete application: routes, static fallback, tracing and CORS.
pub fn app(state: Arc<AppState>) -> Router {
    let router = match &state.config.static_files.dir {
        Some(dir) => router().fallback_service(ServeDir::new(dir)),
        None => router().fallback(not_found),
    };

    router
        .layer(middleware::from_fn(answer_options))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .with_state(state)
}

/// Answer every `OPTIONS` request with an empty 200.
///
/// Real preflights are already answered by [`cors_layer`]; this catches the
/// bare ones that carry no `Access-Control-Request-Method`.
async fn answer_options(request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }
    next.run(request).await
}

/// CORS policy: any origin, simple methods, JSON bodies.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    /// Base URL requests are forwarded to.
    pub upstream: String,
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: OffsetDateTime::now_utc(),
        upstream: state.config.upstream.base_url.clone(),
    })
}

async fn info_page(State(state): State<Arc<AppState>>) -> Html<String> {
    let bind = &state.config.server.bind;
    Html(format!(
        r#"<!DOCTYPE html>
<html>
<head><title>Air Quality Proxy</title></head>
<body>
    <h1>Air Quality Proxy Server</h1>
    <p>Proxy server running on {bind}</p>
    <p>Static files are served from the configured directory.</p>
    <p>API: <code>http://{bind}{PROXY_MEASURES_PATH}?token=YOUR_TOKEN</code></p>
</body>
</html>
"#
    ))
}

/// Query parameters of the forwarded endpoint.
#[derive(Debug, Deserialize)]
pub struct ProxyQuery {
    pub token: Option<String>,
}

/// Forward a measures request upstream and stream the answer back.
///
/// The upstream status is kept as is, including 401/403, so clients see the
/// same failures they would see talking to the API directly.
async fn proxy_measures(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ProxyQuery>,
) -> Result<Response, AppError> {
    let token = query
        .token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::BadRequest("Token required".to_string()))?;

    debug!(url = %state.measures_url(), "Forwarding measures request");

    let upstream = state
        .client
        .get(state.measures_url())
        .query(&[("token", token.as_str())])
        .send()
        .await
        .map_err(|e| {
            error!("Upstream request failed: {}", e);
            AppError::Upstream
        })?;

    let status = upstream.status();
    debug!(status = status.as_u16(), "Upstream answered");

    Ok((
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Body::from_stream(upstream.bytes_stream()),
    )
        .into_response())
}

async fn not_found() -> AppError {
    AppError::NotFound("Not found".to_string())
}

/// API error type.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    /// The upstream API could not be reached.
    Upstream,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Upstream => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "API request failed".to_string(),
            ),
        };

        let body = serde_json::json!({
            "error": message,
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::net::SocketAddr;

    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use airdash_core::client::MEASURES_PATH;

    use crate::config::Config;

    fn create_test_state(config: Config) -> Arc<AppState> {
        AppState::new(config).unwrap()
    }

    fn config_with_upstream(addr: SocketAddr) -> Config {
        let mut config = Config::default();
        config.upstream.base_url = format!("http://{}", addr);
        config
    }

    async fn spawn_upstream(router: Router) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        addr
    }

    async fn send_get(app: Router, uri: &str) -> Response {
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn response_body(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn content_type(response: &Response) -> &str {
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = app(create_test_state(Config::default()));
        let response = send_get(app, "/api/health").await;
        assert_eq!(response.status(), StatusCode::OK);

        let json: serde_json::Value = serde_json::from_str(&response_body(response).await).unwrap();
        assert_eq!(json["status"], "ok");
        assert!(json["version"].is_string());
        assert!(json["timestamp"].is_string());
        assert_eq!(json["upstream"], "https://api.airgradient.com");
    }

    #[tokio::test]
    async fn test_info_page() {
        let app = app(create_test_state(Config::default()));
        let response = send_get(app, "/").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(content_type(&response).starts_with("text/html"));

        let body = response_body(response).await;
        assert!(body.contains("Air Quality Proxy"));
        assert!(body.contains("127.0.0.1:3001/api/public/api/v1/locations/measures/current"));
    }

    #[tokio::test]
    async fn test_missing_token_is_bad_request() {
        let app = app(create_test_state(Config::default()));

        let empty_token = format!("{}?token=", PROXY_MEASURES_PATH);
        for uri in [PROXY_MEASURES_PATH, empty_token.as_str()] {
            let response = send_get(app.clone(), uri).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert!(content_type(&response).starts_with("application/json"));

            let json: serde_json::Value =
                serde_json::from_str(&response_body(response).await).unwrap();
            assert_eq!(json["error"], "Token required");
        }
    }

    #[tokio::test]
    async fn test_forwards_token_and_body() {
        let upstream = Router::new().route(
            MEASURES_PATH,
            get(|Query(params): Query<HashMap<String, String>>| async move {
                let token = params.get("token").cloned().unwrap_or_default();
                // Deliberately not JSON-typed; the proxy sets the content type.
                format!(r#"[{{"locationName":"{}"}}]"#, token)
            }),
        );
        let addr = spawn_upstream(upstream).await;
        let app = app(create_test_state(config_with_upstream(addr)));

        let response = send_get(app, &format!("{}?token=abc%26def", PROXY_MEASURES_PATH)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(content_type(&response), "application/json");
        assert_eq!(
            response_body(response).await,
            r#"[{"locationName":"abc&def"}]"#
        );
    }

    #[tokio::test]
    async fn test_upstream_status_passes_through() {
        let upstream = Router::new().route(
            MEASURES_PATH,
            get(|| async { (StatusCode::FORBIDDEN, r#"{"message":"Forbidden"}"#) }),
        );
        let addr = spawn_upstream(upstream).await;
        let app = app(create_test_state(config_with_upstream(addr)));

        let response = send_get(app, &format!("{}?token=expired", PROXY_MEASURES_PATH)).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(response_body(response).await, r#"{"message":"Forbidden"}"#);
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_server_error() {
        // Bind and release a port so nothing is listening on it.
        let addr = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };
        let app = app(create_test_state(config_with_upstream(addr)));

        let response = send_get(app, &format!("{}?token=abc", PROXY_MEASURES_PATH)).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json: serde_json::Value = serde_json::from_str(&response_body(response).await).unwrap();
        assert_eq!(json["error"], "API request failed");
    }

    #[tokio::test]
    async fn test_cors_preflight() {
        let app = app(create_test_state(Config::default()));

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri(PROXY_MEASURES_PATH)
                    .header(header::ORIGIN, "http://localhost:4200")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                    .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        let methods = headers[header::ACCESS_CONTROL_ALLOW_METHODS].to_str().unwrap();
        assert!(methods.contains("GET"));
        assert!(methods.contains("POST"));
        assert!(methods.contains("OPTIONS"));
    }

    #[tokio::test]
    async fn test_bare_options_is_ok() {
        for uri in [PROXY_MEASURES_PATH, "/api/health", "/anything/else"] {
            let app = app(create_test_state(Config::default()));
            let response = app
                .oneshot(
                    Request::builder()
                        .method(Method::OPTIONS)
                        .uri(uri)
                        .header(header::ORIGIN, "http://localhost:4200")
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::OK, "OPTIONS {uri}");
            assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
            assert!(response_body(response).await.is_empty());
        }
    }

    #[tokio::test]
    async fn test_cors_header_on_errors() {
        let app = app(create_test_state(Config::default()));

        let response = app
            .oneshot(
                Request::builder()
                    .uri(PROXY_MEASURES_PATH)
                    .header(header::ORIGIN, "http://localhost:4200")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[tokio::test]
    async fn test_unknown_path_without_static_dir() {
        let app = app(create_test_state(Config::default()));
        let response = send_get(app, "/index.html").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let json: serde_json::Value = serde_json::from_str(&response_body(response).await).unwrap();
        assert_eq!(json["error"], "Not found");
    }

    #[tokio::test]
    async fn test_static_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_dir.path().join("index.html"), "<h1>dashboard</h1>").unwrap();

        let mut config = Config::default();
        config.static_files.dir = Some(temp_dir.path().to_path_buf());
        let app = app(create_test_state(config));

        let response = send_get(app.clone(), "/index.html").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(content_type(&response).starts_with("text/html"));
        assert_eq!(response_body(response).await, "<h1>dashboard</h1>");

        let response = send_get(app.clone(), "/missing.js").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        // Routes still win over the static directory.
        let response = send_get(app, "/api/health").await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
