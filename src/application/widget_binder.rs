// Widget data binder - maps component types to slices of the metrics snapshot
use crate::domain::layout::{ComponentType, Widget};
use crate::domain::metrics::{MetricsSnapshot, Section, TimeRange};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

pub const DEFAULT_ICON: &str = "bar-chart";

#[derive(Debug, Clone, Copy)]
enum ValueFormat {
    Currency,
    Count,
    Percent,
}

/// Metric-card title -> (section, key, format, icon).
const METRIC_CARDS: &[(&str, Section, &str, ValueFormat, &str)] = &[
    ("Total Revenue", Section::Sales, "totalRevenue", ValueFormat::Currency, "dollar-sign"),
    ("Total Orders", Section::Sales, "totalOrders", ValueFormat::Count, "shopping-cart"),
    ("Average Order Value", Section::Sales, "averageOrderValue", ValueFormat::Currency, "receipt"),
    ("Conversion Rate", Section::Marketing, "conversionRate", ValueFormat::Percent, "target"),
    ("Total Leads", Section::Marketing, "totalLeads", ValueFormat::Count, "users"),
    ("Net Profit", Section::ProfitLoss, "netProfit", ValueFormat::Currency, "trending-up"),
    ("Total Expenses", Section::ProfitLoss, "totalExpenses", ValueFormat::Currency, "credit-card"),
    ("Profit Margin", Section::ProfitLoss, "profitMargin", ValueFormat::Percent, "percent"),
    ("Form Submissions", Section::Forms, "totalSubmissions", ValueFormat::Count, "file-text"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Trend {
    pub direction: TrendDirection,
    /// Signed percentage, e.g. `+12.5%`
    pub value: String,
}

impl Trend {
    pub fn from_percent(trend: Option<f64>) -> Self {
        match trend {
            Some(t) if t > 0.0 => Self {
                direction: TrendDirection::Up,
                value: format!("+{:.1}%", t),
            },
            Some(t) if t < 0.0 => Self {
                direction: TrendDirection::Down,
                value: format!("{:.1}%", t),
            },
            _ => Self {
                direction: TrendDirection::Neutral,
                value: "0.0%".to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricCardProps {
    pub title: String,
    pub value: String,
    pub icon: String,
    pub trend: Trend,
}

/// Prop bundles for every known component type, computed from one snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundProps {
    bundles: HashMap<ComponentType, Value>,
}

impl BoundProps {
    pub fn get(&self, component_type: &ComponentType) -> Option<&Value> {
        self.bundles.get(component_type)
    }
}

/// Recomputes bundles only when the snapshot or time range changes.
#[derive(Debug, Default)]
pub struct WidgetDataBinder {
    cache: Option<(Arc<MetricsSnapshot>, TimeRange, BoundProps)>,
    computations: usize,
}

impl WidgetDataBinder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, snapshot: &Arc<MetricsSnapshot>, range: TimeRange) -> &BoundProps {
        let stale = match &self.cache {
            Some((cached, cached_range, _)) => !Arc::ptr_eq(cached, snapshot) || *cached_range != range,
            None => true,
        };
        if stale {
            self.cache = None;
        }
        let computations = &mut self.computations;
        let (_, _, props) = self.cache.get_or_insert_with(|| {
            *computations += 1;
            (snapshot.clone(), range, compute_bundles(snapshot, range))
        });
        props
    }

    /// Props for one widget: the type bundle with the widget's own props
    /// layered on top. `None` for component types with no renderer.
    pub fn props_for(&mut self, widget: &Widget, snapshot: &Arc<MetricsSnapshot>, range: TimeRange) -> Option<Value> {
        if !widget.component_type.is_known() {
            tracing::warn!(
                "Skipping widget {} - unknown component type '{}'",
                widget.id,
                widget.component_type
            );
            return None;
        }

        let mut merged = match self.bind(snapshot, range).get(&widget.component_type) {
            Some(Value::Object(bundle)) => bundle.clone(),
            _ => Map::new(),
        };
        for (key, value) in &widget.props {
            merged.insert(key.clone(), value.clone());
        }

        if widget.component_type == ComponentType::MetricCard {
            let card = metric_card(widget.title().unwrap_or_default(), snapshot);
            if let Ok(Value::Object(card)) = serde_json::to_value(card) {
                merged.extend(card);
            }
        }
        Some(Value::Object(merged))
    }

    /// Number of times bundles were rebuilt.
    pub fn computations(&self) -> usize {
        self.computations
    }
}

fn compute_bundles(snapshot: &MetricsSnapshot, range: TimeRange) -> BoundProps {
    let mut bundles = HashMap::new();
    for component_type in ComponentType::KNOWN {
        let bundle = match component_type {
            ComponentType::MetricCard => json!({ "timeRange": range }),
            ComponentType::RevenueChart => json!({
                "timeRange": range,
                "data": snapshot.sales.get("revenueByPeriod").cloned().unwrap_or(Value::Array(Vec::new())),
            }),
            ComponentType::SalesOverview => json!({ "timeRange": range, "sales": snapshot.sales }),
            ComponentType::MarketingOverview => json!({ "timeRange": range, "marketing": snapshot.marketing }),
            ComponentType::ProfitLossSummary => json!({ "timeRange": range, "profitLoss": snapshot.profit_loss }),
            ComponentType::FormsSummary => json!({ "timeRange": range, "forms": snapshot.forms }),
            ComponentType::RecentActivity => json!({
                "timeRange": range,
                "activity": snapshot.sales.get("recentOrders").cloned().unwrap_or(Value::Array(Vec::new())),
            }),
            ComponentType::Unknown(_) => continue,
        };
        bundles.insert(component_type, bundle);
    }
    BoundProps { bundles }
}

/// Resolve a metric card's value, icon and trend from its title. Unknown
/// titles show the default icon and `"0"`.
pub fn metric_card(title: &str, snapshot: &MetricsSnapshot) -> MetricCardProps {
    let trend = Trend::from_percent(snapshot.trend);
    match METRIC_CARDS.iter().find(|(t, ..)| *t == title) {
        Some((_, section, key, format, icon)) => MetricCardProps {
            title: title.to_string(),
            value: format_value(snapshot.number(*section, key), *format),
            icon: icon.to_string(),
            trend,
        },
        None => MetricCardProps {
            title: title.to_string(),
            value: "0".to_string(),
            icon: DEFAULT_ICON.to_string(),
            trend,
        },
    }
}

fn format_value(value: f64, format: ValueFormat) -> String {
    match format {
        ValueFormat::Currency => format_currency(value),
        ValueFormat::Count => with_sign(value, ""),
        ValueFormat::Percent => format!("{:.1}%", value),
    }
}

/// Whole-dollar currency with thousands separators, e.g. `$1,250`.
pub fn format_currency(value: f64) -> String {
    with_sign(value, "$")
}

/// Rounded whole number, grouped, with the sign ahead of `prefix`.
/// Magnitudes past `u64::MAX` saturate.
fn with_sign(value: f64, prefix: &str) -> String {
    let rounded = value.round();
    let digits = group_thousands(rounded.abs() as u64);
    if rounded < 0.0 {
        format!("-{}{}", prefix, digits)
    } else {
        format!("{}{}", prefix, digits)
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
