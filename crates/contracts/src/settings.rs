//! Plugin settings contracts shared by the loader and the plugin.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Smallest sector count a layout may have
pub const MIN_SECTOR_COUNT: usize = 2;

/// Root of the settings file
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
pub struct AppSettings {
    /// Timing window
    #[validate(nested)]
    #[serde(default)]
    pub main_app: MainAppSettings,

    /// Settings window
    #[validate(nested)]
    #[serde(default)]
    pub settings_app: SettingsAppSettings,
}

/// Timing window settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct MainAppSettings {
    /// Window scale factor
    #[validate(range(min = 0.5, max = 3.0))]
    pub main_window_scale: f64,

    /// Background opacity in percent
    #[validate(range(min = 0, max = 100))]
    pub opacity_level: u8,

    /// Show the theoretical best lap
    pub theoretical_best: bool,

    /// 1 = caption, last, best and delta rows; 2 = last and delta only
    #[validate(range(min = 1, max = 2))]
    pub ui_layout: u8,
}

impl Default for MainAppSettings {
    fn default() -> Self {
        Self {
            main_window_scale: 1.0,
            opacity_level: 50,
            theoretical_best: true,
            ui_layout: 1,
        }
    }
}

impl MainAppSettings {
    pub fn layout(&self) -> UiLayout {
        UiLayout::from_code(self.ui_layout)
    }
}

/// Settings window settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct SettingsAppSettings {
    /// Window scale factor
    #[validate(range(min = 0.5, max = 3.0))]
    pub settings_window_scale: f64,

    /// Background opacity in percent
    #[validate(range(min = 0, max = 100))]
    pub opacity_level: u8,

    /// Play a sound on a new best sector
    pub new_best_sfx: bool,

    /// Upper bound of the sector count spinner
    #[validate(range(min = 2, max = 50))]
    pub max_sector_number: usize,

    /// Seconds before the timing window flips to the next page
    #[validate(range(min = 1, max = 15))]
    pub next_page_delay: u64,
}

impl Default for SettingsAppSettings {
    fn default() -> Self {
        Self {
            settings_window_scale: 1.0,
            opacity_level: 50,
            new_best_sfx: true,
            max_sector_number: 20,
            next_page_delay: 5,
        }
    }
}

/// Arrangement of the timing rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UiLayout {
    /// Caption, last, best and delta
    #[default]
    Full,
    /// Last and delta only
    Compact,
}

impl UiLayout {
    pub fn from_code(code: u8) -> Self {
        match code {
            2 => UiLayout::Compact,
            _ => UiLayout::Full,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            UiLayout::Full => 1,
            UiLayout::Compact => 2,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            UiLayout::Full => UiLayout::Compact,
            UiLayout::Compact => UiLayout::Full,
        }
    }
}
