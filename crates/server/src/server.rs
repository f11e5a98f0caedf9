use axum::{
    Json, Router,
    extract::{Request, State},
    http::{Method, StatusCode, Uri},
    middleware::{self, Next},
    response::Response,
    routing::get,
};
use serde::Deserialize;

use std::sync::Arc;

use crate::{InternalDetail, balance, dashboard, deposits, error_response, transactions};
use api_types::{
    Envelope,
    health::{Health, ServiceInfo},
};
use engine::Engine;

/// Controls how much of an internal error reaches the client.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub environment: Environment,
}

const ENDPOINTS: [&str; 5] = [
    "/health",
    "/api/transactions",
    "/api/deposits",
    "/api/balance",
    "/api/dashboard",
];

async fn service_info() -> Json<Envelope<ServiceInfo>> {
    Json(Envelope::ok(ServiceInfo {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        endpoints: ENDPOINTS.iter().map(|e| e.to_string()).collect(),
    }))
}

async fn health(State(state): State<ServerState>) -> Json<Envelope<Health>> {
    let status = match state.engine.database().ping().await {
        Ok(()) => "ok",
        Err(err) => {
            tracing::warn!("database ping failed: {err}");
            "degraded"
        }
    };

    Json(Envelope::ok(Health {
        status: status.to_string(),
        environment: state.environment.as_str().to_string(),
        timestamp: chrono::Utc::now(),
    }))
}

async fn not_found(method: Method, uri: Uri) -> Response {
    error_response(
        StatusCode::NOT_FOUND,
        format!("Route {method} {} not found", uri.path()),
    )
}

/// Development only: swaps the generic internal error message for the real one.
async fn reveal_internal_errors(request: Request, next: Next) -> Response {
    let response = next.run(request).await;
    match response.extensions().get::<InternalDetail>() {
        Some(detail) => error_response(response.status(), detail.0.clone()),
        None => response,
    }
}

pub fn router(state: ServerState) -> Router {
    let environment = state.environment;

    let router = Router::new()
        .route("/", get(service_info))
        .route("/health", get(health))
        .route(
            "/api/transactions",
            get(transactions::list).post(transactions::create),
        )
        .route("/api/transactions/income", get(transactions::list_income))
        .route("/api/transactions/expense", get(transactions::list_expense))
        .route(
            "/api/transactions/code/{code}",
            get(transactions::get_by_code),
        )
        .route(
            "/api/transactions/next-code/{direction}",
            get(transactions::next_code),
        )
        .route(
            "/api/transactions/{id}",
            get(transactions::get)
                .put(transactions::update)
                .delete(transactions::delete),
        )
        .route(
            "/api/transactions/{id}/attachment",
            get(transactions::attachment),
        )
        .route("/api/deposits", get(deposits::list).post(deposits::create))
        .route("/api/deposits/code/{code}", get(deposits::get_by_code))
        .route("/api/deposits/next-code", get(deposits::next_code))
        .route(
            "/api/deposits/{id}",
            get(deposits::get)
                .put(deposits::update)
                .delete(deposits::delete),
        )
        .route("/api/deposits/{id}/attachment", get(deposits::attachment))
        .route("/api/balance", get(balance::all))
        .route("/api/balance/{currency}", get(balance::get))
        .route("/api/balance/{currency}/movements", get(balance::movements))
        .route("/api/balance/{currency}/summary", get(balance::summary))
        .route("/api/dashboard", get(dashboard::get))
        .fallback(not_found)
        .with_state(state);

    match environment {
        Environment::Development => router.layer(middleware::from_fn(reveal_internal_errors)),
        Environment::Production => router,
    }
}

pub async fn run_with_listener(
    engine: Engine,
    environment: Environment,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!(
        environment = environment.as_str(),
        "Server listening on {}",
        addr
    );

    let state = ServerState {
        engine: Arc::new(engine),
        environment,
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    environment: Environment,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, environment, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
