// Preset domain model
use serde::{Deserialize, Serialize};
use std::fmt;

use super::layout::Layout;

pub const DEFAULT_PRESET: &str = "default";
const CUSTOM_PREFIX: &str = "custom-";
const UNSAVED_ID: &str = "custom-unsaved";

/// Identifier of the active dashboard arrangement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PresetId {
    /// Static catalog entry, never persisted or mutated
    BuiltIn(String),
    /// User-owned preset stored remotely
    Custom(String),
    /// An edited built-in that has not been saved yet
    Unsaved,
}

impl PresetId {
    pub fn parse(raw: &str) -> Self {
        if raw == UNSAVED_ID {
            Self::Unsaved
        } else if let Some(id) = raw.strip_prefix(CUSTOM_PREFIX) {
            Self::Custom(id.to_string())
        } else {
            Self::BuiltIn(raw.to_string())
        }
    }

    pub fn default_preset() -> Self {
        Self::BuiltIn(DEFAULT_PRESET.to_string())
    }

    pub fn is_built_in(&self) -> bool {
        matches!(self, Self::BuiltIn(_))
    }

    /// Remote id of a saved custom preset.
    pub fn custom_id(&self) -> Option<&str> {
        match self {
            Self::Custom(id) => Some(id),
            _ => None,
        }
    }
}

impl From<String> for PresetId {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<PresetId> for String {
    fn from(value: PresetId) -> Self {
        value.to_string()
    }
}

impl fmt::Display for PresetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BuiltIn(key) => write!(f, "{}", key),
            Self::Custom(id) => write!(f, "{}{}", CUSTOM_PREFIX, id),
            Self::Unsaved => f.write_str(UNSAVED_ID),
        }
    }
}

/// A user-saved preset as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preset {
    pub id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub layout: Layout,
    #[serde(default)]
    pub base_preset: Option<String>,
}

impl Preset {
    pub fn preset_id(&self) -> PresetId {
        PresetId::Custom(self.id.clone())
    }

    pub fn summary(&self) -> PresetSummary {
        PresetSummary {
            id: self.preset_id().to_string(),
            name: self.name.clone(),
            description: self.description.clone(),
        }
    }
}

/// Listing entry for both catalog and user presets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_preset_ids() {
        assert_eq!(PresetId::parse("default"), PresetId::BuiltIn("default".to_string()));
        assert_eq!(PresetId::parse("custom-42"), PresetId::Custom("42".to_string()));
        assert_eq!(PresetId::parse("custom-unsaved"), PresetId::Unsaved);
        assert_eq!(PresetId::Custom("42".to_string()).to_string(), "custom-42");
        assert_eq!(PresetId::Unsaved.to_string(), "custom-unsaved");
    }

    #[test]
    fn test_summary_uses_prefixed_id() {
        let preset = Preset {
            id: "7".to_string(),
            user_id: Some("u1".to_string()),
            name: "Sales focus".to_string(),
            description: String::new(),
            layout: Layout::default(),
            base_preset: Some("sales".to_string()),
        };
        assert_eq!(preset.summary().id, "custom-7");
    }
}
