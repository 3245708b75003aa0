use std::env;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use bytes::Bytes;
use query::{DEFAULT_ENDPOINT, SparqlClient, default_user_agent, suggestion_term};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Clone)]
struct AppState {
    sparql: SparqlClient,
    static_root: PathBuf,
}

#[derive(Clone, Debug)]
struct ServerConfig {
    addr: SocketAddr,
    endpoint: String,
    static_root: PathBuf,
    user_agent: String,
    timeout_s: u64,
}

impl ServerConfig {
    fn from_env() -> Result<Self, String> {
        let addr = env::var("ROUTES_ADDR").unwrap_or_else(|_| "127.0.0.1:5000".to_string());
        Ok(Self {
            addr: addr
                .parse()
                .map_err(|e| format!("invalid ROUTES_ADDR {addr:?}: {e}"))?,
            endpoint: env::var("SPARQL_ENDPOINT").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string()),
            static_root: env::var("STATIC_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("static")),
            user_agent: env::var("SPARQL_USER_AGENT").unwrap_or_else(|_| default_user_agent()),
            timeout_s: env_var_u64("SPARQL_TIMEOUT_S", 60),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct QueryRequest {
    query: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SuggestParams {
    term: String,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };

    let http = match reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_s))
        .build()
    {
        Ok(http) => http,
        Err(err) => {
            eprintln!("error: http client: {err}");
            std::process::exit(1);
        }
    };

    let state = AppState {
        sparql: SparqlClient::with_client(http, config.endpoint.clone())
            .with_user_agent(config.user_agent.clone()),
        static_root: config.static_root.clone(),
    };

    info!(
        "routes server listening on http://{} (endpoint {})",
        config.addr, config.endpoint
    );
    let listener = match tokio::net::TcpListener::bind(config.addr).await {
        Ok(listener) => listener,
        Err(err) => {
            eprintln!("error: bind {}: {err}", config.addr);
            std::process::exit(1);
        }
    };
    if let Err(err) = axum::serve(listener, app(state)).await {
        error!("server stopped: {err}");
    }
}

fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS]);

    Router::new()
        .route("/", get(homepage))
        .route("/healthz", get(healthz))
        .route("/query", post(run_query))
        .route("/suggest", get(suggest))
        .fallback_service(ServeDir::new(&state.static_root))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> Response {
    (StatusCode::OK, "ok").into_response()
}

async fn homepage(State(state): State<AppState>) -> Response {
    serve_file(&state.static_root.join("site.html"), "text/html; charset=utf-8").await
}

/// Forwards `{"query": "..."}` to the endpoint and answers with the bindings.
async fn run_query(State(state): State<AppState>, body: Bytes) -> Response {
    let request: QueryRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(err) => {
            warn!("query body is not JSON: {err}");
            QueryRequest::default()
        }
    };
    let Some(sparql) = request.query.filter(|q| !q.trim().is_empty()) else {
        return error_response(StatusCode::BAD_REQUEST, "No query provided");
    };

    match state.sparql.run_raw(&sparql).await {
        Ok(bindings) => {
            info!(rows = bindings.len(), "query answered");
            Json(bindings).into_response()
        }
        Err(err) => {
            error!("query failed: {err}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &err.to_string())
        }
    }
}

/// Category suggestions as `[{id, label}]`. Short terms get an empty list.
async fn suggest(State(state): State<AppState>, Query(params): Query<SuggestParams>) -> Response {
    let Some(term) = suggestion_term(&params.term) else {
        return Json(Vec::<query::Suggestion>::new()).into_response();
    };
    match state.sparql.suggest(term).await {
        Ok(found) => Json(found).into_response(),
        Err(err) => {
            error!("suggestions failed: {err}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &err.to_string())
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

async fn serve_file(path: &Path, content_type: &str) -> Response {
    match tokio::fs::read(path).await {
        Ok(data) => {
            let mut headers = HeaderMap::new();
            headers.insert(
                http::header::CONTENT_TYPE,
                HeaderValue::from_str(content_type)
                    .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream")),
            );
            (StatusCode::OK, headers, Body::from(data)).into_response()
        }
        Err(err) => {
            error!("file read failed: {path:?} -> {err}");
            (StatusCode::NOT_FOUND, "not found").into_response()
        }
    }
}

fn env_var_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(endpoint: &str) -> AppState {
        AppState {
            sparql: SparqlClient::new(endpoint),
            static_root: PathBuf::from("does-not-exist"),
        }
    }

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn missing_query_is_a_bad_request() {
        for body in [r#"{}"#, r#"{"query": "  "}"#, "not json"] {
            let resp = run_query(
                State(state("http://127.0.0.1:9/sparql")),
                Bytes::from_static(body.as_bytes()),
            )
            .await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
            assert_eq!(body_json(resp).await, json!({ "error": "No query provided" }));
        }
    }

    #[tokio::test]
    async fn upstream_failure_is_a_server_error() {
        let resp = run_query(
            State(state("http://127.0.0.1:9/sparql")),
            Bytes::from_static(br#"{"query": "SELECT * WHERE {}"}"#),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(resp).await;
        assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()));
    }

    #[tokio::test]
    async fn short_terms_get_no_suggestions() {
        let resp = suggest(
            State(state("http://127.0.0.1:9/sparql")),
            Query(SuggestParams {
                term: " ab ".to_string(),
            }),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await, json!([]));
    }

    #[tokio::test]
    async fn homepage_without_site_is_not_found() {
        let resp = homepage(State(state(DEFAULT_ENDPOINT))).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn env_fallbacks() {
        assert_eq!(env_var_u64("ROUTES_TEST_UNSET_VALUE", 7), 7);
    }
}
