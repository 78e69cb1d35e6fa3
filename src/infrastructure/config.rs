use crate::application::dashboard_controller::UpdatePolicy;
use crate::application::metrics_loader::RetryPolicy;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub api: ApiSettings,
    pub metrics: MetricsSettings,
    pub presets: PresetSettings,
    pub export: ExportSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind_addr: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub version: String,
    pub timeout_secs: u64,
    /// Bearer token for backend calls; omitted from requests when unset
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MetricsSettings {
    pub retry: RetryPolicy,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PresetSettings {
    pub update_policy: UpdatePolicy,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExportSettings {
    /// HTML-to-PDF converter reading HTML on stdin and writing PDF to stdout
    pub pdf_command: String,
    #[serde(default)]
    pub pdf_args: Vec<String>,
    pub pdf_timeout_secs: u64,
}

fn builder_with_defaults() -> anyhow::Result<config::ConfigBuilder<config::builder::DefaultState>> {
    Ok(config::Config::builder()
        .set_default("server.bind_addr", "0.0.0.0:8080")?
        .set_default("api.base_url", "http://localhost:3001/api")?
        .set_default("api.version", "v1")?
        .set_default("api.timeout_secs", 15)?
        .set_default("metrics.retry.initial_delay_ms", 1000)?
        .set_default("metrics.retry.max_delay_ms", 10_000)?
        .set_default("presets.update_policy", "confirm")?
        .set_default("export.pdf_command", "wkhtmltopdf")?
        .set_default("export.pdf_args", vec!["--quiet", "-", "-"])?
        .set_default("export.pdf_timeout_secs", 30)?)
}

/// Load `config/dashboard.*` (optional) overlaid by `DASHBOARD__*` env vars.
pub fn load_settings() -> anyhow::Result<Settings> {
    let settings = builder_with_defaults()?
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(config::Environment::with_prefix("DASHBOARD").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

pub fn settings_from_toml(content: &str) -> anyhow::Result<Settings> {
    let settings = builder_with_defaults()?
        .add_source(config::File::from_str(content, config::FileFormat::Toml))
        .build()?;

    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = settings_from_toml("").unwrap();
        assert_eq!(settings.server.bind_addr, "0.0.0.0:8080");
        assert_eq!(settings.api.version, "v1");
        assert_eq!(settings.api.token, None);
        assert_eq!(settings.metrics.retry, RetryPolicy::default());
        assert_eq!(settings.presets.update_policy, UpdatePolicy::Confirm);
        assert_eq!(settings.export.pdf_args, vec!["--quiet", "-", "-"]);
    }

    #[test]
    fn test_file_overrides() {
        let settings = settings_from_toml(
            r#"
            [api]
            base_url = "https://crm.example.com/api"
            token = "secret"

            [metrics.retry]
            initial_delay_ms = 500

            [presets]
            update_policy = "always"
            "#,
        )
        .unwrap();
        assert_eq!(settings.api.base_url, "https://crm.example.com/api");
        assert_eq!(settings.api.token.as_deref(), Some("secret"));
        assert_eq!(settings.metrics.retry.initial_delay_ms, 500);
        assert_eq!(settings.metrics.retry.max_delay_ms, 10_000);
        assert_eq!(settings.presets.update_policy, UpdatePolicy::Always);
    }
}
