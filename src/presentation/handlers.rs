// HTTP request handlers
use crate::application::dashboard_controller::PresetLoad;
use crate::application::layout_engine::BreakpointLayouts;
use crate::application::metrics_loader::LoadState;
use crate::application::report_service::ReportFormat;
use crate::application::widget_binder::WidgetDataBinder;
use crate::domain::errors::DashboardError;
use crate::domain::metrics::{MetricsSnapshot, TimeRange};
use crate::domain::preset::PresetSummary;
use crate::infrastructure::calendar_client::{CalendarEvent, ConnectionStatus, EventWindow};
use crate::presentation::app_state::AppState;
use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, Response, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    pub user_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetQuery {
    pub user_id: Option<String>,
    pub range: Option<TimeRange>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    pub range: Option<TimeRange>,
    pub format: Option<ReportFormat>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EventsQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutsResponse {
    pub requested: String,
    pub active_preset: String,
    pub notice: Option<String>,
    pub breakpoints: BreakpointLayouts,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundWidget {
    pub i: String,
    pub component_type: String,
    pub props: Value,
}

/// Error response carrying the user-facing message.
#[derive(Debug)]
pub struct ApiError(pub DashboardError);

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self.0 {
            DashboardError::Auth(_) => StatusCode::UNAUTHORIZED,
            DashboardError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            DashboardError::NotFound(_) => StatusCode::NOT_FOUND,
            DashboardError::Validation { .. } | DashboardError::NotEditing => StatusCode::BAD_REQUEST,
            DashboardError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            DashboardError::Network(_) | DashboardError::Server { .. } | DashboardError::Decode(_) => {
                StatusCode::BAD_GATEWAY
            }
            DashboardError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        tracing::warn!("Request failed: {}", self.0);
        (status, Json(json!({ "error": self.0.user_message() }))).into_response()
    }
}

impl From<DashboardError> for ApiError {
    fn from(err: DashboardError) -> Self {
        Self(err)
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Built-in presets, plus the user's saved presets when `userId` is given
pub async fn list_presets(
    Query(query): Query<UserQuery>,
    State(state): State<Arc<AppState>>,
) -> Json<Vec<PresetSummary>> {
    match query.user_id {
        Some(user_id) => Json(state.viewer(Some(user_id)).list_presets().await),
        None => Json(state.catalog.list_presets()),
    }
}

/// Breakpoint layouts for a preset, falling back to the default preset
pub async fn preset_layouts(
    Path(id): Path<String>,
    Query(query): Query<UserQuery>,
    State(state): State<Arc<AppState>>,
) -> Json<LayoutsResponse> {
    let mut dashboard = state.viewer(query.user_id);
    let notice = match dashboard.select_preset(&id).await {
        PresetLoad::Loaded => None,
        PresetLoad::FellBack(err) => Some(err.user_message()),
    };

    Json(LayoutsResponse {
        requested: id,
        active_preset: dashboard.active_preset().to_string(),
        notice,
        breakpoints: dashboard.breakpoints(),
    })
}

async fn load_snapshot(state: &AppState, range: TimeRange) -> Result<Arc<MetricsSnapshot>, ApiError> {
    let mut loader = state.metrics_loader();
    loader.load(range).await;
    if let LoadState::Failed { error, .. } = loader.state() {
        return Err(ApiError(error.clone()));
    }
    loader
        .snapshot()
        .cloned()
        .ok_or_else(|| ApiError(DashboardError::NotFound("metrics snapshot".to_string())))
}

/// Widgets of a preset with their bound props; unknown widget types are omitted
pub async fn preset_widgets(
    Path(id): Path<String>,
    Query(query): Query<WidgetQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<BoundWidget>>, ApiError> {
    let range = query.range.unwrap_or_default();
    let mut dashboard = state.viewer(query.user_id);
    dashboard.select_preset(&id).await;
    let snapshot = load_snapshot(&state, range).await?;

    let mut binder = WidgetDataBinder::new();
    let widgets = dashboard
        .layout()
        .widgets()
        .iter()
        .filter_map(|widget| {
            binder.props_for(widget, &snapshot, range).map(|props| BoundWidget {
                i: widget.id.clone(),
                component_type: widget.component_type.to_string(),
                props,
            })
        })
        .collect();
    Ok(Json(widgets))
}

/// Download the dashboard report as HTML or PDF
pub async fn export_report(
    Query(query): Query<ReportQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Response<Body>, ApiError> {
    let range = query.range.unwrap_or_default();
    let format = query.format.unwrap_or_default();
    let snapshot = load_snapshot(&state, range).await?;

    let file = state
        .reports
        .export(&snapshot, range, format, Utc::now().date_naive())
        .await?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, file.format.content_type())
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", file.file_name),
        )
        .body(Body::from(file.bytes))
        .map_err(|e| ApiError(DashboardError::Export(e.to_string())))
}

pub async fn calendar_status(State(state): State<Arc<AppState>>) -> Result<Json<ConnectionStatus>, ApiError> {
    Ok(Json(state.calendar.connection_status().await?))
}

/// Merged Google and CRM events; defaults to the next seven days
pub async fn calendar_events(
    Query(query): Query<EventsQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CalendarEvent>>, ApiError> {
    let time_min = query.from.unwrap_or_else(Utc::now);
    let time_max = query.to.unwrap_or(time_min + chrono::Duration::days(7));
    if time_max <= time_min {
        return Err(ApiError(DashboardError::validation("to", "must be after 'from'")));
    }
    let window = EventWindow { time_min, time_max };
    Ok(Json(state.calendar.all_events(&window).await?))
}
