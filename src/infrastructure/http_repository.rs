// REST repository for presets and metrics
use crate::application::preset_repository::{MetricsRepository, NewPreset, PresetRepository, PresetUpdate};
use crate::domain::errors::{DashboardError, DashboardResult};
use crate::domain::metrics::{MetricsSnapshot, TimeRange};
use crate::domain::preset::{Preset, PresetSummary};
use crate::infrastructure::api_client::{segment, ApiClient};
use async_trait::async_trait;

#[derive(Clone)]
pub struct HttpDashboardRepository {
    api: ApiClient,
}

impl HttpDashboardRepository {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl PresetRepository for HttpDashboardRepository {
    /// A preset the caller may not read is an auth failure, not a permission one.
    async fn fetch_preset(&self, custom_id: &str) -> DashboardResult<Preset> {
        tracing::debug!("Fetching preset {}", custom_id);
        self.api
            .get(&format!("/dashboard/presets/{}", segment(custom_id)), &[])
            .await
            .map_err(|e| match e {
                DashboardError::PermissionDenied(message) => DashboardError::Auth(message),
                other => other,
            })
    }

    async fn list_user_presets(&self, user_id: &str) -> DashboardResult<Vec<PresetSummary>> {
        let presets: Option<Vec<Preset>> = match self
            .api
            .get("/dashboard/presets", &[("userId", user_id)])
            .await
        {
            Ok(presets) => presets,
            Err(DashboardError::NotFound(_)) => None,
            Err(e) => return Err(e),
        };

        let summaries: Vec<PresetSummary> = presets
            .unwrap_or_default()
            .iter()
            .map(Preset::summary)
            .collect();
        tracing::debug!("Found {} presets for user {}", summaries.len(), user_id);
        Ok(summaries)
    }

    async fn save_preset(&self, preset: NewPreset) -> DashboardResult<Preset> {
        if preset.name.trim().is_empty() {
            return Err(DashboardError::validation("name", "Preset name is required"));
        }
        self.api.post("/dashboard/presets", &preset).await
    }

    async fn update_preset(&self, custom_id: &str, update: PresetUpdate) -> DashboardResult<Preset> {
        self.api
            .put(&format!("/dashboard/presets/{}", segment(custom_id)), &update)
            .await
    }
}

#[async_trait]
impl MetricsRepository for HttpDashboardRepository {
    async fn fetch_metrics(&self, range: TimeRange) -> DashboardResult<MetricsSnapshot> {
        self.api
            .get("/dashboard/metrics", &[("range", range.as_query())])
            .await
    }
}
