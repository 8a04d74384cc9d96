use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use spark_core::{
    ChainError, ReconcileError, accounts::AccountsError, config::ConfigError, report::ReportError,
};
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("no accounts have been generated yet")]
    NotGenerated,
    #[error(transparent)]
    Accounts(#[from] AccountsError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Chain(#[from] ChainError),
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
    #[error(transparent)]
    Report(#[from] ReportError),
}

impl AdminError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotGenerated => StatusCode::CONFLICT,
            Self::Config(_) => StatusCode::BAD_REQUEST,
            Self::Accounts(_) | Self::Chain(_) | Self::Reconcile(_) | Self::Report(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "admin request failed");
        } else {
            warn!(error = %self, %status, "admin request refused");
        }
        (status, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use spark_core::SparkConfig;

    use super::*;

    #[test]
    fn refusals_map_to_client_statuses() {
        assert_eq!(AdminError::NotGenerated.status(), StatusCode::CONFLICT);

        let err = SparkConfig::default()
            .set("accounts", "none")
            .unwrap_err();
        assert_eq!(AdminError::from(err).status(), StatusCode::BAD_REQUEST);

        let err = ChainError::Unavailable {
            message: "down".into(),
        };
        assert_eq!(
            AdminError::from(err).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
