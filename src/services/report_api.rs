//! Trait and types for talking to the food-analysis backend.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::report::Report;

/// Body of the backend's `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

/// Abstraction over a report provider.
#[async_trait::async_trait]
pub trait ReportApi {
    /// Returns up to `limit` stored analysis reports, newest first as served.
    async fn list_reports(&self, limit: usize) -> Result<Vec<Report>>;

    /// Checks that the backend is reachable.
    async fn health(&self) -> Result<HealthStatus>;
}
