use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use utoipa::ToSchema;
use validator::ValidationErrors;

use crate::dao::{
    providers::{ProviderId, error::UpstreamError},
    storage::StorageError,
};

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage backend is unavailable.
    #[error("storage unavailable")]
    Unavailable(#[source] StorageError),
    /// Application is running in degraded mode without storage.
    #[error("storage unavailable (degraded mode)")]
    Degraded,
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// A title or name is already used by another record.
    #[error("conflict: {0}")]
    Conflict(String),
    /// The requested provider has no credentials configured.
    #[error("{0} provider is not configured")]
    ProviderNotConfigured(ProviderId),
    /// An upstream metadata provider call failed.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Conflict { message } => ServiceError::Conflict(message),
            other => ServiceError::Unavailable(other),
        }
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(err: ValidationErrors) -> Self {
        ServiceError::InvalidInput(format!("validation failed: {err}"))
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Conflict with an existing record.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Service unavailable or degraded.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    /// Upstream provider unreachable or answering garbage.
    #[error("bad gateway: {0}")]
    BadGateway(String),
    #[error("gateway timeout: {0}")]
    GatewayTimeout(String),
    /// Non-2xx upstream answer, forwarded with its original status and body.
    #[error("{message}")]
    Upstream {
        status: StatusCode,
        message: String,
        details: Value,
    },
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Unavailable(source) => AppError::ServiceUnavailable(source.to_string()),
            ServiceError::Degraded => AppError::ServiceUnavailable("degraded mode".into()),
            ServiceError::InvalidInput(message) => AppError::BadRequest(message),
            ServiceError::NotFound(message) => AppError::NotFound(message),
            ServiceError::Conflict(message) => AppError::Conflict(message),
            err @ ServiceError::ProviderNotConfigured(_) => {
                AppError::ServiceUnavailable(err.to_string())
            }
            ServiceError::Upstream(err) => err.into(),
        }
    }
}

impl From<UpstreamError> for AppError {
    fn from(err: UpstreamError) -> Self {
        let message = err.to_string();
        match err {
            UpstreamError::Status { status, body, .. } => AppError::Upstream {
                status: StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                message,
                details: body,
            },
            UpstreamError::Timeout { .. } => AppError::GatewayTimeout(message),
            UpstreamError::NotFound { .. } => AppError::NotFound(message),
            UpstreamError::InvalidRequest { .. } => AppError::BadRequest(message),
            UpstreamError::Unreachable { .. }
            | UpstreamError::Decode { .. }
            | UpstreamError::Client { .. } => AppError::BadGateway(message),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// JSON body of every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Human-readable description of the failure.
    pub message: String,
    /// Upstream error payload, when the failure was forwarded from a provider.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            AppError::GatewayTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Upstream { status, .. } => *status,
        };

        let message = self.to_string();
        let details = match self {
            AppError::Upstream { details, .. } => Some(details),
            _ => None,
        };

        (status, Json(ErrorBody { message, details })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use serde_json::json;

    use super::*;

    async fn render(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn storage_conflict_maps_to_409() {
        let err: AppError = ServiceError::from(StorageError::conflict("`Doom` already exists")).into();
        let (status, body) = render(err).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["message"], "conflict: `Doom` already exists");
        assert!(body.get("details").is_none());
    }

    #[tokio::test]
    async fn upstream_status_and_body_are_forwarded() {
        let err: AppError = ServiceError::Upstream(UpstreamError::Status {
            provider: ProviderId::Moby,
            status: 401,
            body: json!({"code": 401, "error": "Unauthorized"}),
        })
        .into();
        let (status, body) = render(err).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["details"], json!({"code": 401, "error": "Unauthorized"}));
    }

    #[tokio::test]
    async fn unconfigured_provider_is_unavailable() {
        let err: AppError = ServiceError::ProviderNotConfigured(ProviderId::Igdb).into();
        let (status, body) = render(err).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            body["message"],
            "service unavailable: IGDB provider is not configured"
        );
    }

    #[tokio::test]
    async fn upstream_timeout_maps_to_504() {
        let err: AppError = UpstreamError::Timeout {
            provider: ProviderId::Igdb,
        }
        .into();
        let (status, _) = render(err).await;
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    }
}
