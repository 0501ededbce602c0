use serde::Serialize;
use utoipa::ToSchema;

use crate::dao::providers::ProviderId;

/// Whether the catalog store is currently reachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Ok,
    Degraded,
}

/// Payload of `GET /healthcheck`.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: ServiceStatus,
    /// Upstream providers with credentials configured, in route-name order.
    pub providers: Vec<ProviderId>,
}

impl HealthResponse {
    pub fn new(degraded: bool, providers: Vec<ProviderId>) -> Self {
        let status = if degraded {
            ServiceStatus::Degraded
        } else {
            ServiceStatus::Ok
        };
        Self { status, providers }
    }
}
