// Application state for HTTP handlers
use crate::application::dashboard_controller::{DashboardController, UpdatePolicy, UserContext};
use crate::application::metrics_loader::{MetricsLoader, RetryPolicy};
use crate::application::preset_catalog::PresetCatalog;
use crate::application::preset_repository::{MetricsRepository, PresetRepository};
use crate::application::report_service::ReportService;
use crate::infrastructure::calendar_client::CalendarClient;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<PresetCatalog>,
    pub presets: Arc<dyn PresetRepository>,
    pub metrics: Arc<dyn MetricsRepository>,
    pub reports: ReportService,
    pub calendar: CalendarClient,
    pub update_policy: UpdatePolicy,
    pub retry_policy: RetryPolicy,
}

impl AppState {
    /// Read-only controller for one request.
    pub fn viewer(&self, user_id: Option<String>) -> DashboardController {
        let user = UserContext {
            user_id: user_id.unwrap_or_default(),
            can_edit: false,
        };
        DashboardController::new(self.catalog.clone(), self.presets.clone(), user, self.update_policy)
    }

    pub fn metrics_loader(&self) -> MetricsLoader {
        MetricsLoader::new(self.metrics.clone(), self.retry_policy)
    }
}
