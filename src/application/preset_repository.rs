// Repository traits for preset and metrics persistence
use crate::domain::errors::DashboardResult;
use crate::domain::layout::Layout;
use crate::domain::metrics::{MetricsSnapshot, TimeRange};
use crate::domain::preset::{Preset, PresetSummary};
use async_trait::async_trait;
use serde::Serialize;

/// Body of a create request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPreset {
    pub user_id: String,
    pub name: String,
    pub description: String,
    pub layout: Layout,
    pub base_preset: String,
}

/// Body of an update request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PresetUpdate {
    pub name: String,
    pub description: String,
    pub layout: Layout,
}

#[async_trait]
pub trait PresetRepository: Send + Sync {
    /// Fetch a saved preset by its remote id (without the `custom-` prefix).
    /// Fails with `NotFound` when deleted or never created, `Auth` without access.
    async fn fetch_preset(&self, custom_id: &str) -> DashboardResult<Preset>;

    /// All presets owned by a user; empty when they have none.
    async fn list_user_presets(&self, user_id: &str) -> DashboardResult<Vec<PresetSummary>>;

    /// Create a preset. Fails with `Validation` when the name is blank.
    async fn save_preset(&self, preset: NewPreset) -> DashboardResult<Preset>;

    /// Replace an existing preset. Fails with `NotFound` when it is gone.
    async fn update_preset(&self, custom_id: &str, update: PresetUpdate) -> DashboardResult<Preset>;
}

#[async_trait]
pub trait MetricsRepository: Send + Sync {
    async fn fetch_metrics(&self, range: TimeRange) -> DashboardResult<MetricsSnapshot>;
}
