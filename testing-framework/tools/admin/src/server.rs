use std::{collections::HashMap, sync::Arc};

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderName, StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use spark_core::AddressFormat;
use tracing::{debug, info};

use crate::{error::AdminError, state::AdminState};

const FORMAT_PARAM: &str = "format";

const CORS_HEADERS: [(HeaderName, &str); 3] = [
    (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
    (
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        "X-Requested-With,Content-Type,Accept",
    ),
    (
        header::ACCESS_CONTROL_ALLOW_METHODS,
        "GET,POST,PUT,DELETE,OPTIONS",
    ),
];

fn log_route(route: &str) {
    info!(route, "admin route");
}

fn address_format(params: &HashMap<String, String>) -> AddressFormat {
    params
        .get(FORMAT_PARAM)
        .and_then(|value| value.parse().ok())
        .unwrap_or_default()
}

async fn welcome() -> String {
    log_route("/");
    format!("Welcome to Spark {}", env!("CARGO_PKG_VERSION"))
}

async fn accounts(
    State(state): State<Arc<AdminState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<String, AdminError> {
    log_route("/accounts");
    let accounts = state.current_accounts().await?;
    state.render_report(&accounts, address_format(&params)).await
}

async fn accounts_json(
    State(state): State<Arc<AdminState>>,
) -> Result<impl IntoResponse, AdminError> {
    log_route("/accounts-json");
    let accounts = state.current_accounts().await?;
    Ok((CORS_HEADERS, Json(accounts)))
}

async fn accounts_generation(
    State(state): State<Arc<AdminState>>,
) -> Result<StatusCode, AdminError> {
    log_route("/accounts-generation");
    let accounts = state.generate_accounts().await?;
    let report = state
        .render_report(&accounts, AddressFormat::default())
        .await?;
    info!("\n{report}");
    Ok(StatusCode::OK)
}

async fn temporary_accounts_generation(
    State(state): State<Arc<AdminState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AdminError> {
    log_route("/temporary-accounts-generation");
    let accounts = state.extend_accounts(&params).await?;
    let report = state
        .render_report(&accounts, address_format(&params))
        .await?;
    Ok((CORS_HEADERS, report))
}

async fn set_env(
    State(state): State<Arc<AdminState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<&'static str, AdminError> {
    log_route("/set-env");
    let config = state.update_config(&params).await?;
    debug!(?config, "live config");
    Ok("Environment variable updated")
}

/// Admin routes, mounted under `/admin`.
pub fn admin_app(state: Arc<AdminState>) -> Router {
    Router::new()
        .route("/admin", get(welcome))
        .route("/admin/", get(welcome))
        .route("/admin/accounts", get(accounts))
        .route("/admin/accounts-json", get(accounts_json))
        .route("/admin/accounts-generation", get(accounts_generation))
        .route(
            "/admin/temporary-accounts-generation",
            get(temporary_accounts_generation),
        )
        .route("/admin/set-env", get(set_env))
        .with_state(state)
}
