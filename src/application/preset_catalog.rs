// Preset catalog - static registry of built-in layouts
use crate::domain::errors::{DashboardError, DashboardResult};
use crate::domain::layout::Layout;
use crate::domain::preset::{PresetSummary, DEFAULT_PRESET};
use serde::Deserialize;

const BUILTIN_PRESETS: &str = include_str!("../../presets/builtin.toml");

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub layout: Layout,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    presets: Vec<CatalogEntry>,
}

/// Read-only after load. Lookups never fail: unknown ids resolve to the
/// `default` entry.
#[derive(Debug, Clone)]
pub struct PresetCatalog {
    entries: Vec<CatalogEntry>,
    default_idx: usize,
}

impl PresetCatalog {
    /// Load the presets bundled with the binary.
    pub fn builtin() -> DashboardResult<Self> {
        Self::from_toml_str(BUILTIN_PRESETS)
    }

    pub fn from_toml_str(content: &str) -> DashboardResult<Self> {
        let file: CatalogFile = toml::from_str(content)
            .map_err(|e| DashboardError::Decode(format!("preset catalog: {}", e.message())))?;
        Self::new(file.presets)
    }

    pub fn new(entries: Vec<CatalogEntry>) -> DashboardResult<Self> {
        for entry in &entries {
            entry.layout.validate()?;
        }
        let default_idx = entries
            .iter()
            .position(|e| e.id == DEFAULT_PRESET)
            .ok_or_else(|| DashboardError::validation("catalog", "missing 'default' preset"))?;

        tracing::debug!("Loaded {} built-in presets", entries.len());
        Ok(Self {
            entries,
            default_idx,
        })
    }

    pub fn lookup(&self, id: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.lookup(id).is_some()
    }

    pub fn default_layout(&self) -> &Layout {
        &self.entries[self.default_idx].layout
    }

    /// Layout for `id`, or the default layout when `id` is not a built-in.
    pub fn get_preset(&self, id: &str) -> &Layout {
        match self.lookup(id) {
            Some(entry) => &entry.layout,
            None => {
                tracing::debug!("Unknown built-in preset '{}', using default", id);
                self.default_layout()
            }
        }
    }

    pub fn list_presets(&self) -> Vec<PresetSummary> {
        self.entries
            .iter()
            .map(|e| PresetSummary {
                id: e.id.clone(),
                name: e.name.clone(),
                description: e.description.clone(),
            })
            .collect()
    }
}
