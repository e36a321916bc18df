use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use crate::fetch::{HttpClient, fetch_json};
use crate::report::{Report, ReportsResponse};
use crate::services::report_api::{HealthStatus, ReportApi};

/// REST client for the food-analysis backend (`/reports`, `/health`).
pub struct AnalyzerApiClient<C> {
    base_url: String,
    http: C,
}

impl<C: HttpClient> AnalyzerApiClient<C> {
    pub fn new(base_url: &str, http: C) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl<C: HttpClient> ReportApi for AnalyzerApiClient<C> {
    #[tracing::instrument(skip(self), fields(base_url = %self.base_url))]
    async fn list_reports(&self, limit: usize) -> Result<Vec<Report>> {
        let url = format!("{}/reports?limit={}", self.base_url, limit);
        let response: ReportsResponse = fetch_json(&self.http, &url).await?;

        info!(
            success = response.success,
            count = response.count,
            received = response.reports.len(),
            "Reports fetched"
        );

        response.into_reports()
    }

    #[tracing::instrument(skip(self), fields(base_url = %self.base_url))]
    async fn health(&self) -> Result<HealthStatus> {
        let url = format!("{}/health", self.base_url);
        fetch_json(&self.http, &url).await
    }
}
