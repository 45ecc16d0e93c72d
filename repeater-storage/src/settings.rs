use repeater_core::RequestFilter;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::index::DEFAULT_MAX_STORED;
use crate::store::KeyValueStore;

pub const SETTINGS_KEY: &str = "settings";

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }
}

impl std::str::FromStr for Theme {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "dark" => Ok(Self::Dark),
            "light" => Ok(Self::Light),
            other => Err(format!("unknown theme `{other}` (expected dark or light)")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub theme: Theme,
    pub auto_capture: bool,
    pub max_requests: usize,
    pub filters: RequestFilter,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::Dark,
            auto_capture: false,
            max_requests: DEFAULT_MAX_STORED,
            filters: RequestFilter::default(),
        }
    }
}

/// Partial update; `None` leaves the field as it is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsPatch {
    pub theme: Option<Theme>,
    pub auto_capture: Option<bool>,
    pub max_requests: Option<usize>,
    pub filters: Option<RequestFilter>,
}

impl SettingsPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn apply(self, settings: &mut Settings) {
        if let Some(theme) = self.theme {
            settings.theme = theme;
        }
        if let Some(auto_capture) = self.auto_capture {
            settings.auto_capture = auto_capture;
        }
        if let Some(max_requests) = self.max_requests {
            settings.max_requests = max_requests.max(1);
        }
        if let Some(filters) = self.filters {
            settings.filters = filters;
        }
    }
}

/// Stored settings, or `defaults` when nothing usable is stored.
pub fn load_settings(store: &dyn KeyValueStore, defaults: Settings) -> Settings {
    let stored = match store.get(&[SETTINGS_KEY]) {
        Ok(mut values) => values.remove(SETTINGS_KEY),
        Err(err) => {
            tracing::warn!(error = %err, "failed to load settings");
            None
        }
    };
    match stored {
        Some(value) => serde_json::from_value(value).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "ignoring unreadable settings");
            defaults
        }),
        None => defaults,
    }
}

pub fn save_settings(store: &dyn KeyValueStore, settings: &Settings) -> Result<(), String> {
    let value = serde_json::to_value(settings).map_err(|err| err.to_string())?;
    let mut entries = Map::new();
    entries.insert(SETTINGS_KEY.to_string(), value);
    store.set(entries)
}

#[cfg(test)]
mod tests {
    use super::{Settings, SettingsPatch, Theme, load_settings, save_settings};
    use crate::store::MemoryStore;

    #[test]
    fn defaults_match_fresh_install() {
        let settings = Settings::default();
        assert_eq!(settings.theme, Theme::Dark);
        assert!(!settings.auto_capture);
        assert_eq!(settings.max_requests, 1000);
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let json = serde_json::to_value(Settings::default()).unwrap();
        assert_eq!(json["theme"], "dark");
        assert_eq!(json["autoCapture"], false);
        assert_eq!(json["maxRequests"], 1000);
    }

    #[test]
    fn patch_only_touches_given_fields() {
        let mut settings = Settings::default();
        SettingsPatch {
            auto_capture: Some(true),
            ..SettingsPatch::default()
        }
        .apply(&mut settings);
        assert!(settings.auto_capture);
        assert_eq!(settings.theme, Theme::Dark);
    }

    #[test]
    fn toggle_flips_theme() {
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
    }

    #[test]
    fn save_then_load() {
        let store = MemoryStore::new();
        let settings = Settings {
            theme: Theme::Light,
            max_requests: 50,
            ..Settings::default()
        };
        save_settings(&store, &settings).unwrap();
        assert_eq!(load_settings(&store, Settings::default()), settings);
    }

    #[test]
    fn partial_stored_settings_fill_defaults() {
        let store = MemoryStore::new();
        let mut entries = serde_json::Map::new();
        entries.insert("settings".to_string(), serde_json::json!({ "theme": "light" }));
        crate::KeyValueStore::set(&store, entries).unwrap();

        let loaded = load_settings(&store, Settings::default());
        assert_eq!(loaded.theme, Theme::Light);
        assert_eq!(loaded.max_requests, 1000);
    }
}
