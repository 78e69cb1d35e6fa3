// Report service - static HTML/PDF snapshot of the dashboard metrics
use crate::domain::errors::{DashboardError, DashboardResult};
use crate::domain::metrics::{MetricsSnapshot, Section, TimeRange};
use async_trait::async_trait;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::sync::Arc;

const ACCENT: &str = "#2563eb";
const MUTED: &str = "#6b7280";
const BORDER: &str = "#e5e7eb";

/// Built on first export and shared by every report afterwards.
static REPORT_STYLESHEET: Lazy<String> = Lazy::new(|| {
    tracing::debug!("Building report stylesheet");
    format!(
        "body {{ font-family: -apple-system, Segoe UI, Roboto, Arial, sans-serif; margin: 32px; color: #111827; }}\n\
         h1 {{ margin: 0 0 4px; color: {accent}; }}\n\
         .meta {{ color: {muted}; margin-bottom: 24px; }}\n\
         section {{ border: 1px solid {border}; border-radius: 8px; padding: 16px; margin-bottom: 16px; }}\n\
         h2 {{ margin: 0 0 12px; font-size: 18px; }}\n\
         table {{ width: 100%; border-collapse: collapse; }}\n\
         td {{ padding: 6px 0; border-bottom: 1px solid {border}; }}\n\
         td.value {{ text-align: right; font-weight: 600; }}\n\
         .trend-up {{ color: #16a34a; }}\n\
         .trend-down {{ color: #dc2626; }}",
        accent = ACCENT,
        muted = MUTED,
        border = BORDER
    )
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Html,
    Pdf,
}

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Pdf => "pdf",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Html => "text/html; charset=utf-8",
            Self::Pdf => "application/pdf",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportFile {
    pub file_name: String,
    pub format: ReportFormat,
    pub bytes: Vec<u8>,
}

/// Converts a rendered HTML report into PDF bytes.
#[async_trait]
pub trait PdfRenderer: Send + Sync {
    async fn render(&self, html: &str) -> DashboardResult<Vec<u8>>;
}

#[derive(Clone, Copy)]
enum Figure {
    Currency,
    Count,
    Percent,
}

const REPORT_SECTIONS: &[(&str, Section, &[(&str, &str, Figure)])] = &[
    (
        "Sales",
        Section::Sales,
        &[
            ("Total Revenue", "totalRevenue", Figure::Currency),
            ("Total Orders", "totalOrders", Figure::Count),
            ("Average Order Value", "averageOrderValue", Figure::Currency),
        ],
    ),
    (
        "Marketing",
        Section::Marketing,
        &[
            ("Total Leads", "totalLeads", Figure::Count),
            ("Conversion Rate", "conversionRate", Figure::Percent),
            ("Ad Spend", "adSpend", Figure::Currency),
        ],
    ),
    (
        "Profit & Loss",
        Section::ProfitLoss,
        &[
            ("Gross Revenue", "grossRevenue", Figure::Currency),
            ("Total Expenses", "totalExpenses", Figure::Currency),
            ("Net Profit", "netProfit", Figure::Currency),
            ("Profit Margin", "profitMargin", Figure::Percent),
        ],
    ),
    (
        "Forms",
        Section::Forms,
        &[
            ("Total Submissions", "totalSubmissions", Figure::Count),
            ("Completion Rate", "completionRate", Figure::Percent),
        ],
    ),
];

/// Currency in thousands with one decimal, e.g. `$125.0k`. Halves round
/// away from zero.
pub fn format_thousands(value: f64) -> String {
    format!("${:.1}k", (value / 100.0).round() / 10.0)
}

pub fn report_file_name(date: NaiveDate, format: ReportFormat) -> String {
    format!("dashboard-report-{}.{}", date.format("%Y-%m-%d"), format.extension())
}

fn html_escape(value: &str) -> String {
    v_htmlescape::escape(value).to_string()
}

fn figure(value: f64, kind: Figure) -> String {
    match kind {
        Figure::Currency => format_thousands(value),
        Figure::Count => format!("{}", value.round() as i64),
        Figure::Percent => format!("{:.1}%", value),
    }
}

/// Render the self-contained HTML report. Pure: same inputs, same bytes.
pub fn render_html(snapshot: &MetricsSnapshot, range: TimeRange, date: NaiveDate) -> String {
    let mut html = String::new();

    html.push_str("<!doctype html>\n<html lang=\"en\">\n<head>\n  <meta charset=\"utf-8\">\n");
    html.push_str(&format!(
        "  <title>Dashboard Report {}</title>\n",
        date.format("%Y-%m-%d")
    ));
    html.push_str(&format!("  <style>\n{}\n  </style>\n</head>\n<body>\n", REPORT_STYLESHEET.as_str()));

    html.push_str("<h1>Dashboard Report</h1>\n");
    html.push_str(&format!(
        "<div class=\"meta\">{} | generated {}</div>\n",
        html_escape(range.label()),
        date.format("%B %-d, %Y")
    ));

    if let Some(trend) = snapshot.trend {
        let class_name = if trend >= 0.0 { "trend-up" } else { "trend-down" };
        html.push_str(&format!(
            "<div class=\"meta\">Trend vs previous period: <span class=\"{}\">{:+.1}%</span></div>\n",
            class_name, trend
        ));
    }

    for (title, section, rows) in REPORT_SECTIONS {
        html.push_str(&format!("<section>\n<h2>{}</h2>\n<table>\n", html_escape(title)));
        for (label, key, kind) in rows.iter() {
            html.push_str(&format!(
                "<tr><td>{}</td><td class=\"value\">{}</td></tr>\n",
                html_escape(label),
                figure(snapshot.number(*section, key), *kind)
            ));
        }
        html.push_str("</table>\n</section>\n");
    }

    html.push_str("</body>\n</html>\n");
    html
}

#[derive(Clone)]
pub struct ReportService {
    pdf: Arc<dyn PdfRenderer>,
}

impl ReportService {
    pub fn new(pdf: Arc<dyn PdfRenderer>) -> Self {
        Self { pdf }
    }

    pub async fn export(
        &self,
        snapshot: &MetricsSnapshot,
        range: TimeRange,
        format: ReportFormat,
        date: NaiveDate,
    ) -> DashboardResult<ReportFile> {
        let html = render_html(snapshot, range, date);
        let bytes = match format {
            ReportFormat::Html => html.into_bytes(),
            ReportFormat::Pdf => {
                let pdf = self.pdf.render(&html).await?;
                if pdf.is_empty() {
                    return Err(DashboardError::Export("PDF renderer produced no output".to_string()));
                }
                pdf
            }
        };

        let file_name = report_file_name(date, format);
        tracing::info!("Exported {} ({} bytes)", file_name, bytes.len());
        Ok(ReportFile {
            file_name,
            format,
            bytes,
        })
    }
}
