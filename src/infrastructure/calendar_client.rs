// Calendar integration client - Google connection, events and CRM events
use crate::domain::errors::DashboardResult;
use crate::infrastructure::api_client::{segment, ApiClient};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthUrl {
    pub url: String,
}

/// Which Google services the current user has connected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionStatus {
    #[serde(default)]
    pub calendar: bool,
    #[serde(default)]
    pub gmail: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Calendar {
    pub id: String,
    pub summary: String,
    #[serde(default)]
    pub primary: bool,
    #[serde(default)]
    pub background_color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calendar_id: Option<String>,
    /// `google` or `crm` on merged listings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Half-open time window `[time_min, time_max)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventWindow {
    pub time_min: DateTime<Utc>,
    pub time_max: DateTime<Utc>,
}

impl EventWindow {
    fn query(&self) -> [(&'static str, String); 2] {
        [
            ("timeMin", self.time_min.to_rfc3339()),
            ("timeMax", self.time_max.to_rfc3339()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryToggle {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    pub visible: bool,
}

/// Saved calendar category/visibility toggles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarPreset {
    #[serde(default)]
    pub categories: Vec<CategoryToggle>,
}

#[derive(Clone)]
pub struct CalendarClient {
    api: ApiClient,
}

impl CalendarClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    async fn windowed(&self, path: &str, window: &EventWindow) -> DashboardResult<Vec<CalendarEvent>> {
        let params = window.query();
        let query: Vec<(&str, &str)> = params.iter().map(|(k, v)| (*k, v.as_str())).collect();
        self.api.get(path, &query).await
    }

    pub async fn google_auth_url(&self) -> DashboardResult<AuthUrl> {
        self.api.get("/calendar/google/auth-url", &[]).await
    }

    pub async fn connection_status(&self) -> DashboardResult<ConnectionStatus> {
        self.api.get("/calendar/status", &[]).await
    }

    pub async fn list_calendars(&self) -> DashboardResult<Vec<Calendar>> {
        self.api.get("/calendar/list", &[]).await
    }

    pub async fn list_events(&self, calendar_id: &str, window: &EventWindow) -> DashboardResult<Vec<CalendarEvent>> {
        self.windowed(&format!("/calendar/{}/events", segment(calendar_id)), window)
            .await
    }

    pub async fn create_event(&self, calendar_id: &str, event: &CalendarEvent) -> DashboardResult<CalendarEvent> {
        tracing::debug!("Creating event '{}' in {}", event.summary, calendar_id);
        self.api
            .post(&format!("/calendar/{}/events", segment(calendar_id)), event)
            .await
    }

    pub async fn update_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        event: &CalendarEvent,
    ) -> DashboardResult<CalendarEvent> {
        self.api
            .put(
                &format!("/calendar/{}/events/{}", segment(calendar_id), segment(event_id)),
                event,
            )
            .await
    }

    pub async fn delete_event(&self, calendar_id: &str, event_id: &str) -> DashboardResult<()> {
        self.api
            .delete(
                &format!("/calendar/{}/events/{}", segment(calendar_id), segment(event_id)),
                &[],
            )
            .await
    }

    /// Events created inside the CRM (tasks, follow-ups, bookings).
    pub async fn crm_events(&self, window: &EventWindow) -> DashboardResult<Vec<CalendarEvent>> {
        self.windowed("/calendar/crm-events", window).await
    }

    /// Google and CRM events merged by the backend.
    pub async fn all_events(&self, window: &EventWindow) -> DashboardResult<Vec<CalendarEvent>> {
        self.windowed("/calendar/all-events", window).await
    }

    pub async fn presets(&self) -> DashboardResult<CalendarPreset> {
        self.api.get("/calendar/presets", &[]).await
    }

    pub async fn save_presets(&self, preset: &CalendarPreset) -> DashboardResult<CalendarPreset> {
        self.api.put("/calendar/presets", preset).await
    }
}
