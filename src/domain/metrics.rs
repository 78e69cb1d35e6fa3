// Dashboard metrics snapshot - read-only input for widgets and reports
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Time window the metrics were aggregated over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "7d")]
    Last7Days,
    #[default]
    #[serde(rename = "30d")]
    Last30Days,
    #[serde(rename = "90d")]
    Last90Days,
    #[serde(rename = "12m")]
    Last12Months,
}

impl TimeRange {
    pub fn as_query(&self) -> &'static str {
        match self {
            Self::Last7Days => "7d",
            Self::Last30Days => "30d",
            Self::Last90Days => "90d",
            Self::Last12Months => "12m",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Last7Days => "Last 7 days",
            Self::Last30Days => "Last 30 days",
            Self::Last90Days => "Last 90 days",
            Self::Last12Months => "Last 12 months",
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_query())
    }
}

/// Aggregate returned by the metrics endpoint. Sections are kept as raw
/// JSON objects; consumers read the keys they know about.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    #[serde(default)]
    pub sales: Map<String, Value>,
    #[serde(default)]
    pub marketing: Map<String, Value>,
    #[serde(default)]
    pub profit_loss: Map<String, Value>,
    #[serde(default)]
    pub forms: Map<String, Value>,
    /// Period-over-period change in percent
    #[serde(default)]
    pub trend: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Sales,
    Marketing,
    ProfitLoss,
    Forms,
}

impl MetricsSnapshot {
    pub fn section(&self, section: Section) -> &Map<String, Value> {
        match section {
            Section::Sales => &self.sales,
            Section::Marketing => &self.marketing,
            Section::ProfitLoss => &self.profit_loss,
            Section::Forms => &self.forms,
        }
    }

    /// Numeric field of a section, `0.0` when absent or not a number.
    pub fn number(&self, section: Section, key: &str) -> f64 {
        self.section(section)
            .get(key)
            .and_then(Value::as_f64)
            .unwrap_or(0.0)
    }
}
