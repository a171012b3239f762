use std::sync::Arc;

use anyhow::{Error, Result, anyhow};
use axum::{
    Router,
    body::Bytes,
    extract::{DefaultBodyLimit, Query, State},
    http::{HeaderMap, Method, StatusCode, Uri, header::AUTHORIZATION},
    response::{Html, IntoResponse, Json, Response},
    routing::{any, get},
};
use serde::Deserialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::{
    clients::{
        health::HealthChecker, redis::RedisStore, store::ContentStore, wechat::WeChatClient,
    },
    config::{Config, ServiceRole},
    error::RelayError,
    models::message::StoredAlert,
    params::normalize,
    pipeline::Dispatcher,
    render::PageRenderer,
};

pub struct AppState {
    role: ServiceRole,
    dispatcher: Dispatcher,
    store: Option<Arc<dyn ContentStore>>,
    health_checker: HealthChecker,
    renderer: PageRenderer,
}

impl AppState {
    pub fn new(config: &Config, store: Option<Arc<dyn ContentStore>>) -> Result<Self, Error> {
        let wechat = WeChatClient::new(&config.wechat_api_base);
        let renderer = PageRenderer::new()?;

        Ok(Self {
            role: config.service_role,
            dispatcher: Dispatcher::new(
                config.api_token.clone(),
                config.dispatch_defaults(),
                store.clone(),
                wechat,
            ),
            health_checker: HealthChecker::new(config.service_role, store.clone()),
            renderer,
            store,
        })
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .route("/", get(status_page))
        .route("/health", get(health_check));

    // Full markdown reports exceed axum's default 2 MiB body limit.
    if state.role.serves_sender() {
        app = app.route(
            "/wxsend",
            any(send_alert).layer(DefaultBodyLimit::disable()),
        );
    }
    if state.role.serves_viewer() {
        app = app.route("/read", get(read_alert));
    }

    app.layer(TraceLayer::new_for_http()).with_state(state)
}

pub async fn run_api_server(config: Config) -> Result<(), Error> {
    let store: Option<Arc<dyn ContentStore>> = match &config.redis_url {
        Some(url) => Some(Arc::new(RedisStore::connect(url).await?)),
        None => None,
    };

    let state = Arc::new(AppState::new(&config, store)?);
    let app = router(state);

    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| anyhow!("Failed to bind {}: {}", addr, e))?;

    info!(address = %addr, role = ?config.service_role, "WXPush server started");

    axum::serve(listener, app).await?;

    Ok(())
}

async fn send_alert(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, RelayError> {
    let params = normalize(&method, uri.query(), &headers, body).await;
    let authorization = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());

    debug!(fields = params.len(), "Alert request received");

    let summary = state.dispatcher.dispatch(&params, authorization).await?;

    Ok(Json(summary).into_response())
}

#[derive(Debug, Deserialize)]
struct ReadQuery {
    id: Option<String>,
}

async fn read_alert(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ReadQuery>,
) -> Result<Html<String>, RelayError> {
    let id = query
        .id
        .filter(|id| !id.is_empty())
        .ok_or(RelayError::MissingId)?;
    let store = state.store.as_ref().ok_or(RelayError::StoreUnavailable)?;

    let raw = store
        .get(&id)
        .await
        .map_err(|e| RelayError::StoreRead(e.to_string()))?
        .ok_or(RelayError::NotFound)?;

    let alert: StoredAlert =
        serde_json::from_str(&raw).map_err(|e| RelayError::StoreRead(e.to_string()))?;

    debug!(message_id = %id, "Rendering stored alert");

    let page = state
        .renderer
        .render_alert(&alert)
        .map_err(|e| RelayError::Render(format!("{:#}", e)))?;

    Ok(Html(page))
}

async fn status_page(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let store_status = if state.store.is_some() {
        "Bound"
    } else {
        "Not Bound"
    };

    format!("WXPush Service is Running.\nContent Store: {}", store_status)
}

async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let report = state.health_checker.report().await;

    let status_code = if report.healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(report))
}
