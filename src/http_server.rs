//! HTTP front end for the query agent

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::{future::Future, net::SocketAddr, sync::Arc};
use tokio::{net::TcpListener, signal};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn, Instrument};

use crate::agent::{QueryAgent, QueryResponse};
use crate::error::Error;
use crate::logging::RequestContext;

const INDEX_HTML: &str = include_str!("../static/index.html");

/// Body of `POST /query/text`
#[derive(Debug, Deserialize)]
pub struct TextQueryRequest {
    pub query: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

/// Routes with CORS and request tracing
pub fn router(agent: Arc<QueryAgent>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/query/text", post(query_text))
        .route("/query/voice", post(query_voice))
        .route("/health", get(health))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(agent)
}

/// Binds and serves until Ctrl+C or SIGTERM
pub async fn serve(agent: Arc<QueryAgent>, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    serve_until(agent, listener, shutdown_signal()).await
}

/// Serves on a bound listener until `signal` resolves, then drains in-flight
/// requests and shuts the agent down.
pub async fn serve_until<F>(
    agent: Arc<QueryAgent>,
    listener: TcpListener,
    signal: F,
) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router(agent.clone()))
        .with_graceful_shutdown(signal)
        .await?;

    agent.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown");
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn query_text(
    State(agent): State<Arc<QueryAgent>>,
    Json(request): Json<TextQueryRequest>,
) -> Result<Json<QueryResponse>, Error> {
    let ctx = RequestContext::new("text").with_user(request.user_id.clone());
    let span = ctx.span();

    async move {
        info!(query = %request.query, "text query received");
        let response = agent.handle_text(&request.query).await?;
        info!(duration_ms = ctx.elapsed_ms(), "text query answered");
        Ok::<_, Error>(Json(response))
    }
    .instrument(span)
    .await
}

async fn query_voice(
    State(agent): State<Arc<QueryAgent>>,
    mut multipart: Multipart,
) -> Result<Json<QueryResponse>, Error> {
    let ctx = RequestContext::new("voice");
    let span = ctx.span();

    async move {
        let mut upload = None;
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| Error::InvalidInput(format!("malformed multipart body: {}", e)))?
        {
            if field.name() != Some("audio") {
                continue;
            }
            let content_type = field.content_type().unwrap_or_default().to_string();
            info!(file_name = ?field.file_name(), content_type = %content_type, "voice query received");
            let bytes = field
                .bytes()
                .await
                .map_err(|e| Error::InvalidInput(format!("failed to read audio: {}", e)))?;
            upload = Some((bytes, content_type));
            break;
        }

        let (audio, content_type) = upload
            .ok_or_else(|| Error::InvalidInput("missing multipart field `audio`".to_string()))?;

        let response = agent.handle_voice(&audio, &content_type).await?;
        info!(duration_ms = ctx.elapsed_ms(), "voice query answered");
        Ok::<_, Error>(Json(response))
    }
    .instrument(span)
    .await
}

async fn health(State(agent): State<Arc<QueryAgent>>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "database": agent.is_database_connected().await,
    }))
}
