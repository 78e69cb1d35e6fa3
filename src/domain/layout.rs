// Layout domain model - widgets and their grid geometry
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

use super::errors::{DashboardError, DashboardResult};

/// Renderer a widget is bound to. Unknown values survive deserialization
/// so a layout saved by a newer client still loads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ComponentType {
    MetricCard,
    RevenueChart,
    SalesOverview,
    MarketingOverview,
    ProfitLossSummary,
    FormsSummary,
    RecentActivity,
    Unknown(String),
}

impl ComponentType {
    pub const KNOWN: [ComponentType; 7] = [
        ComponentType::MetricCard,
        ComponentType::RevenueChart,
        ComponentType::SalesOverview,
        ComponentType::MarketingOverview,
        ComponentType::ProfitLossSummary,
        ComponentType::FormsSummary,
        ComponentType::RecentActivity,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Self::MetricCard => "metric-card",
            Self::RevenueChart => "revenue-chart",
            Self::SalesOverview => "sales-overview",
            Self::MarketingOverview => "marketing-overview",
            Self::ProfitLossSummary => "profit-loss-summary",
            Self::FormsSummary => "forms-summary",
            Self::RecentActivity => "recent-activity",
            Self::Unknown(other) => other,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

impl From<String> for ComponentType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "metric-card" => Self::MetricCard,
            "revenue-chart" => Self::RevenueChart,
            "sales-overview" => Self::SalesOverview,
            "marketing-overview" => Self::MarketingOverview,
            "profit-loss-summary" => Self::ProfitLossSummary,
            "forms-summary" => Self::FormsSummary,
            "recent-activity" => Self::RecentActivity,
            _ => Self::Unknown(value),
        }
    }
}

impl From<ComponentType> for String {
    fn from(value: ComponentType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One positioned, sized, typed dashboard element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Widget {
    #[serde(rename = "i", alias = "id")]
    pub id: String,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_w: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_h: Option<u32>,
    #[serde(alias = "type")]
    pub component_type: ComponentType,
    #[serde(default)]
    pub props: serde_json::Map<String, serde_json::Value>,
}

impl Widget {
    pub fn new(id: impl Into<String>, component_type: ComponentType, x: u32, y: u32, w: u32, h: u32) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            w,
            h,
            min_w: None,
            min_h: None,
            component_type,
            props: serde_json::Map::new(),
        }
    }

    pub fn with_prop(mut self, key: &str, value: serde_json::Value) -> Self {
        self.props.insert(key.to_string(), value);
        self
    }

    pub fn title(&self) -> Option<&str> {
        self.props.get("title").and_then(|v| v.as_str())
    }

    fn bottom(&self) -> u32 {
        self.y + self.h
    }
}

/// Ordered collection of widgets making up one dashboard arrangement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Layout(pub Vec<Widget>);

impl Layout {
    pub fn new(widgets: Vec<Widget>) -> Self {
        Self(widgets)
    }

    pub fn widgets(&self) -> &[Widget] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, id: &str) -> Option<&Widget> {
        self.0.iter().find(|w| w.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// First free row below every widget.
    pub fn bottom(&self) -> u32 {
        self.0.iter().map(Widget::bottom).max().unwrap_or(0)
    }

    /// Check the `w > 0`, `h > 0` and unique id invariants.
    pub fn validate(&self) -> DashboardResult<()> {
        let mut seen = HashSet::new();
        for widget in &self.0 {
            if widget.w == 0 || widget.h == 0 {
                return Err(DashboardError::validation(
                    "layout",
                    &format!("widget '{}' has zero size", widget.id),
                ));
            }
            if !seen.insert(widget.id.as_str()) {
                return Err(DashboardError::validation(
                    "layout",
                    &format!("duplicate widget id '{}'", widget.id),
                ));
            }
        }
        Ok(())
    }

    /// Field-by-field comparison. Props compare as JSON values, so key
    /// order never produces a false difference.
    pub fn structurally_eq(&self, other: &Layout) -> bool {
        self.0.len() == other.0.len()
            && self.0.iter().zip(other.0.iter()).all(|(a, b)| {
                a.id == b.id
                    && a.x == b.x
                    && a.y == b.y
                    && a.w == b.w
                    && a.h == b.h
                    && a.min_w == b.min_w
                    && a.min_h == b.min_h
                    && a.component_type == b.component_type
                    && a.props == b.props
            })
    }
}

/// Per-widget resize locks. A widget is fully fixed only when both are set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionLocks {
    pub width: bool,
    pub height: bool,
}

impl DimensionLocks {
    pub fn is_fully_locked(&self) -> bool {
        self.width && self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Width,
    Height,
}

/// Session-only lock state keyed by widget id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LockedDimensions(HashMap<String, DimensionLocks>);

impl LockedDimensions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, widget_id: &str) -> DimensionLocks {
        self.0.get(widget_id).copied().unwrap_or_default()
    }

    pub fn is_fully_locked(&self, widget_id: &str) -> bool {
        self.get(widget_id).is_fully_locked()
    }

    /// Flip one dimension and return the resulting locks.
    pub fn toggle(&mut self, widget_id: &str, dimension: Dimension) -> DimensionLocks {
        let entry = self.0.entry(widget_id.to_string()).or_default();
        match dimension {
            Dimension::Width => entry.width = !entry.width,
            Dimension::Height => entry.height = !entry.height,
        }
        *entry
    }

    pub fn remove(&mut self, widget_id: &str) {
        self.0.remove(widget_id);
    }

    pub fn contains(&self, widget_id: &str) -> bool {
        self.0.contains_key(widget_id)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Layout {
        Layout::new(vec![
            Widget::new("a", ComponentType::MetricCard, 0, 0, 4, 2).with_prop("title", json!("Total Revenue")),
            Widget::new("b", ComponentType::RevenueChart, 4, 0, 8, 4),
        ])
    }

    #[test]
    fn test_component_type_round_trips_unknown() {
        let parsed: ComponentType = serde_json::from_value(json!("heat-map")).unwrap();
        assert_eq!(parsed, ComponentType::Unknown("heat-map".to_string()));
        assert!(!parsed.is_known());
        assert_eq!(serde_json::to_value(&parsed).unwrap(), json!("heat-map"));

        let known: ComponentType = serde_json::from_value(json!("metric-card")).unwrap();
        assert_eq!(known, ComponentType::MetricCard);
    }

    #[test]
    fn test_widget_accepts_grid_and_plain_id() {
        let a: Widget = serde_json::from_value(json!({
            "i": "a", "x": 0, "y": 0, "w": 2, "h": 2, "componentType": "forms-summary"
        }))
        .unwrap();
        let b: Widget = serde_json::from_value(json!({
            "id": "a", "x": 0, "y": 0, "w": 2, "h": 2, "componentType": "forms-summary"
        }))
        .unwrap();
        assert_eq!(a, b);
        assert_eq!(serde_json::to_value(&a).unwrap()["i"], json!("a"));
    }

    #[test]
    fn test_structural_equality_ignores_prop_key_order() {
        let a: Widget = serde_json::from_str(
            r#"{"i":"a","x":0,"y":0,"w":1,"h":1,"componentType":"metric-card","props":{"title":"T","color":"red"}}"#,
        )
        .unwrap();
        let b: Widget = serde_json::from_str(
            r#"{"i":"a","x":0,"y":0,"w":1,"h":1,"componentType":"metric-card","props":{"color":"red","title":"T"}}"#,
        )
        .unwrap();
        assert!(Layout::new(vec![a]).structurally_eq(&Layout::new(vec![b])));
    }

    #[test]
    fn test_structural_equality_detects_changes() {
        let base = sample();
        assert!(base.structurally_eq(&base.clone()));

        let mut moved = base.clone();
        moved.0[1].y = 3;
        assert!(!base.structurally_eq(&moved));

        let mut shorter = base.clone();
        shorter.0.pop();
        assert!(!base.structurally_eq(&shorter));

        let mut retitled = base.clone();
        retitled.0[0].props.insert("title".to_string(), json!("Net Profit"));
        assert!(!base.structurally_eq(&retitled));
    }

    #[test]
    fn test_validate() {
        assert!(sample().validate().is_ok());

        let mut zero = sample();
        zero.0[0].w = 0;
        assert!(matches!(zero.validate(), Err(DashboardError::Validation { .. })));

        let mut dup = sample();
        dup.0[1].id = "a".to_string();
        assert!(dup.validate().is_err());
    }

    #[test]
    fn test_bottom() {
        assert_eq!(sample().bottom(), 4);
        assert_eq!(Layout::default().bottom(), 0);
    }

    #[test]
    fn test_lock_toggle() {
        let mut locks = LockedDimensions::new();
        assert!(!locks.is_fully_locked("a"));
        locks.toggle("a", Dimension::Width);
        assert!(!locks.is_fully_locked("a"));
        let both = locks.toggle("a", Dimension::Height);
        assert!(both.is_fully_locked());
        locks.toggle("a", Dimension::Width);
        assert!(!locks.is_fully_locked("a"));
        locks.remove("a");
        assert!(!locks.contains("a"));
    }
}
