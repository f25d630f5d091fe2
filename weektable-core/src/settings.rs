//! Application-wide settings held by the persistence service.

use serde::{Deserialize, Serialize};

use crate::time_base::DEFAULT_TIMEZONE;

fn default_title() -> String {
    "My Timetable".to_string()
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

fn default_theme() -> String {
    "default".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default)]
    pub notifications_enabled: bool,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default)]
    pub pin_is_set: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            title: default_title(),
            timezone: default_timezone(),
            notifications_enabled: false,
            theme: default_theme(),
            pin_is_set: false,
        }
    }
}

/// Partial settings update. The timezone is fixed per installation and is
/// not part of the patch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notifications_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
}

impl SettingsPatch {
    pub fn apply_to(&self, settings: &mut Settings) {
        if let Some(title) = &self.title {
            settings.title = title.clone();
        }
        if let Some(enabled) = self.notifications_enabled {
            settings.notifications_enabled = enabled;
        }
        if let Some(theme) = &self.theme {
            settings.theme = theme.clone();
        }
    }
}
