// Main entry point - Dependency injection and server setup
use std::{net::SocketAddr, sync::Arc, time::Duration};
use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use dashboard_layouts::application::preset_catalog::PresetCatalog;
use dashboard_layouts::application::report_service::ReportService;
use dashboard_layouts::infrastructure::api_client::{ApiClient, StaticSession};
use dashboard_layouts::infrastructure::calendar_client::CalendarClient;
use dashboard_layouts::infrastructure::config::load_settings;
use dashboard_layouts::infrastructure::http_repository::HttpDashboardRepository;
use dashboard_layouts::infrastructure::logging;
use dashboard_layouts::infrastructure::pdf_renderer::CommandPdfRenderer;
use dashboard_layouts::presentation::app_state::AppState;
use dashboard_layouts::presentation::handlers::{
    calendar_events, calendar_status, export_report, health_check, list_presets, preset_layouts, preset_widgets,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    // Load configuration
    let settings = load_settings()?;

    // Backend client (infrastructure layer)
    let api = ApiClient::new(
        &settings.api.base_url,
        &settings.api.version,
        Duration::from_secs(settings.api.timeout_secs),
        Arc::new(StaticSession(settings.api.token.clone())),
    )?;
    let repository = Arc::new(HttpDashboardRepository::new(api.clone()));

    let pdf = CommandPdfRenderer::new(
        settings.export.pdf_command.clone(),
        settings.export.pdf_args.clone(),
        Duration::from_secs(settings.export.pdf_timeout_secs),
    );

    // Create application state
    let state = Arc::new(AppState {
        catalog: Arc::new(PresetCatalog::builtin()?),
        presets: repository.clone(),
        metrics: repository,
        reports: ReportService::new(Arc::new(pdf)),
        calendar: CalendarClient::new(api),
        update_policy: settings.presets.update_policy,
        retry_policy: settings.metrics.retry,
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/presets", get(list_presets))
        .route("/presets/:id/layouts", get(preset_layouts))
        .route("/presets/:id/widgets", get(preset_widgets))
        .route("/reports/dashboard", get(export_report))
        .route("/calendar/status", get(calendar_status))
        .route("/calendar/events", get(calendar_events))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = settings.server.bind_addr.parse()?;
    tracing::info!("Starting dashboard-layouts service on {} (backend {})", addr, settings.api.base_url);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
