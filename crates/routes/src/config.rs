use serde::{Deserialize, Serialize};

use crate::surface::{ArrowStyle, RouteStyle};

pub const RED: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
pub const YELLOW: [f32; 4] = [1.0, 1.0, 0.0, 1.0];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteStyles {
    pub line: RouteStyle,
    /// Transient style of a highlighted route.
    pub emphasis: RouteStyle,
    pub arrow_pixel_size: f32,
    pub arrow_weight: f32,
}

impl RouteStyles {
    pub fn arrow_for(&self, line: RouteStyle) -> ArrowStyle {
        ArrowStyle {
            color: line.color,
            weight: self.arrow_weight,
            pixel_size: self.arrow_pixel_size,
        }
    }
}

impl Default for RouteStyles {
    fn default() -> Self {
        Self {
            line: RouteStyle::new(RED, 3.0),
            emphasis: RouteStyle::new(YELLOW, 4.0),
            arrow_pixel_size: 15.0,
            arrow_weight: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteMapConfig {
    pub styles: RouteStyles,
    /// Emphasis duration when a route is drawn because its result was picked.
    pub fresh_highlight_s: f64,
    /// Emphasis duration when an already drawn route is picked again.
    pub existing_highlight_s: f64,
    /// Results listed in a route popup before the "more" summary.
    pub popup_max_entries: usize,
}

impl Default for RouteMapConfig {
    fn default() -> Self {
        Self {
            styles: RouteStyles::default(),
            fresh_highlight_s: 0.5,
            existing_highlight_s: 2.0,
            popup_max_entries: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Json(String),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Json(msg) => write!(f, "route map config is not valid JSON: {msg}"),
            ConfigError::Invalid(msg) => write!(f, "invalid route map config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl RouteMapConfig {
    /// Reads a config where every field is optional and defaults as above.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: RouteMapConfig =
            serde_json::from_str(text).map_err(|e| ConfigError::Json(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, v) in [
            ("fresh_highlight_s", self.fresh_highlight_s),
            ("existing_highlight_s", self.existing_highlight_s),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(ConfigError::Invalid(format!("{name} must be >= 0, got {v}")));
            }
        }
        if self.popup_max_entries == 0 {
            return Err(ConfigError::Invalid(
                "popup_max_entries must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
