// Theme handling: a single seed (preset name or literal color) drives the whole
// palette; light/dark mode is a separate persisted preference.

pub mod color;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ThemeError;

pub use color::{derive, DerivedTheme, Oklch, Rgb};

/// Color scheme applied before the backend settings arrive.
pub const DEFAULT_PRESET: &str = "blue";

/// The single user- or backend-selected value driving all derived colors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Seed {
    /// Named style-sheet variant. No numeric derivation happens for presets.
    Preset(String),
    /// Literal sRGB color, parsed from `#RRGGBB` or `#RGB`.
    Literal(Rgb),
}

impl Seed {
    /// Name of the style-sheet variant the presentation layer should select.
    pub fn scheme_name(&self) -> &str {
        match self {
            Seed::Preset(name) => name,
            Seed::Literal(_) => "custom",
        }
    }
}

impl Default for Seed {
    fn default() -> Self {
        Seed::Preset(DEFAULT_PRESET.to_string())
    }
}

impl FromStr for Seed {
    type Err = ThemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.starts_with('#') {
            Ok(Seed::Literal(s.parse()?))
        } else {
            Ok(Seed::Preset(s.to_string()))
        }
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Seed::Preset(name) => f.write_str(name),
            Seed::Literal(rgb) => write!(f, "{rgb}"),
        }
    }
}

/// Light/dark preference, persisted under the `theme` storage key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }

    /// Unrecognised stored values fall back to light.
    pub fn from_stored(value: Option<&str>) -> Self {
        match value {
            Some("dark") => ThemeMode::Dark,
            _ => ThemeMode::Light,
        }
    }
}
