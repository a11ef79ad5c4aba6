//! Game settings and variant selection
//!
//! Persisted as JSON in LocalStorage on the web; read from an optional file
//! on native.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::{RuleSet, RulesError};

/// Built-in rule presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Variant {
    #[default]
    Classic,
    Twin,
    Priority,
    Dual,
}

impl Variant {
    pub const ALL: [Variant; 4] = [
        Variant::Classic,
        Variant::Twin,
        Variant::Priority,
        Variant::Dual,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Classic => "Classic",
            Variant::Twin => "Twin",
            Variant::Priority => "Priority",
            Variant::Dual => "Dual",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "classic" => Some(Variant::Classic),
            "twin" => Some(Variant::Twin),
            "priority" => Some(Variant::Priority),
            "dual" | "two-axis" => Some(Variant::Dual),
            _ => None,
        }
    }

    /// Rule set for this preset
    pub fn rules(&self) -> RuleSet {
        match self {
            Variant::Classic => RuleSet::classic(),
            Variant::Twin => RuleSet::twin(),
            Variant::Priority => RuleSet::priority(),
            Variant::Dual => RuleSet::dual(),
        }
    }
}

/// Settings could not be read
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("malformed settings JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid rule set: {0}")]
    Rules(#[from] RulesError),
    #[error("could not read settings file: {0}")]
    Io(#[from] std::io::Error),
}

/// Game settings/preferences
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Preset used when no override is present
    pub variant: Variant,
    /// Full rule set replacing the preset
    #[serde(default)]
    pub rules: Option<RuleSet>,
    /// Fixed RNG seed (random per run when absent)
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Settings {
    pub fn from_variant(variant: Variant) -> Self {
        Self {
            variant,
            ..Self::default()
        }
    }

    /// Parse and validate settings JSON
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        if let Some(rules) = &settings.rules {
            rules.validate()?;
        }
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Rule set in effect: a valid override, otherwise the preset
    pub fn effective_rules(&self) -> RuleSet {
        match &self.rules {
            Some(rules) => match rules.validate() {
                Ok(()) => rules.clone(),
                Err(err) => {
                    log::warn!("Ignoring rule override ({err}), using {}", self.variant.as_str());
                    self.variant.rules()
                }
            },
            None => self.variant.rules(),
        }
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "credit_rush_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(err) => log::warn!("Discarding stored settings: {err}"),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Load settings from a JSON file (native only)
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from(path: &std::path::Path) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}
