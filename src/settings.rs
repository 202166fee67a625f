//! Viewer settings
//!
//! Read once at startup from an inline JSON block in the page. Never written back.

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    /// Upper bound on the canvas pixel ratio
    pub fn max_pixel_ratio(&self) -> f64 {
        match self {
            QualityPreset::Low => 1.0,
            QualityPreset::Medium => 1.5,
            QualityPreset::High => f64::INFINITY,
        }
    }

    /// Radial segments for the fan housing cylinder
    pub fn fan_segments(&self) -> u32 {
        match self {
            QualityPreset::Low => 12,
            QualityPreset::Medium => 24,
            QualityPreset::High => 32,
        }
    }
}

/// Viewer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,

    // === Controls ===
    /// Walk distance per frame (world units)
    pub move_speed: f32,
    /// Look sensitivity multiplier
    pub pointer_speed: f32,
    /// Vertical field of view (degrees)
    pub fov_degrees: f32,

    // === Effects ===
    /// Whether fan spin and seat bob start enabled
    pub effects_on_start: bool,

    // === HUD ===
    /// Show FPS counter
    pub show_fps: bool,

    /// URL prefix for floor/wall/screen textures
    pub asset_root: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            move_speed: 0.1,
            pointer_speed: 1.0,
            fov_degrees: 75.0,
            effects_on_start: true,
            show_fps: true,
            asset_root: "textures".to_string(),
        }
    }
}

impl Settings {
    /// Create settings from a quality preset
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    /// Parse and validate settings JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        check_range("move_speed", self.move_speed, |v| v > 0.0 && v <= 1.0)?;
        check_range("pointer_speed", self.pointer_speed, |v| v > 0.0 && v <= 10.0)?;
        check_range("fov_degrees", self.fov_degrees, |v| (30.0..=120.0).contains(&v))?;
        Ok(())
    }

    /// Canvas pixel ratio for a device ratio, capped by quality
    pub fn pixel_ratio(&self, device_pixel_ratio: f64) -> f64 {
        device_pixel_ratio.min(self.quality.max_pixel_ratio()).max(1.0)
    }

    /// Element id of the inline settings block
    const ELEMENT_ID: &'static str = "hall-settings";

    /// Load settings from the page (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let json = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(Self::ELEMENT_ID))
            .and_then(|el| el.text_content());

        match json {
            Some(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from #{}", Self::ELEMENT_ID);
                    settings
                }
                Err(e) => {
                    log::warn!("Ignoring settings block: {}", e);
                    Self::default()
                }
            },
            None => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        log::debug!("No #{} block outside the browser", Self::ELEMENT_ID);
        Self::default()
    }
}

fn check_range(field: &'static str, value: f32, ok: impl Fn(f32) -> bool) -> Result<(), SettingsError> {
    if ok(value) {
        Ok(())
    } else {
        Err(SettingsError::OutOfRange { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = Settings::from_json(r#"{ "move_speed": 0.2, "quality": "High" }"#).unwrap();
        assert_eq!(settings.quality, QualityPreset::High);
        assert!((settings.move_speed - 0.2).abs() < 1e-6);
        assert!((settings.fov_degrees - 75.0).abs() < 1e-6);
        assert!(settings.effects_on_start);
        assert_eq!(settings.asset_root, "textures");
    }

    #[test]
    fn test_round_trip() {
        let settings = Settings {
            effects_on_start: false,
            asset_root: "assets/img".to_string(),
            ..Settings::from_preset(QualityPreset::Low)
        };
        let json = serde_json::to_string(&settings).unwrap();
        assert_eq!(Settings::from_json(&json).unwrap(), settings);
    }

    #[test]
    fn test_out_of_range_rejected() {
        let err = Settings::from_json(r#"{ "fov_degrees": 170.0 }"#).unwrap_err();
        assert!(matches!(err, SettingsError::OutOfRange { field: "fov_degrees", .. }));

        let err = Settings::from_json(r#"{ "move_speed": 0.0 }"#).unwrap_err();
        assert!(matches!(err, SettingsError::OutOfRange { field: "move_speed", .. }));
    }

    #[test]
    fn test_bad_json_rejected() {
        assert!(matches!(
            Settings::from_json("{ not json"),
            Err(SettingsError::Parse(_))
        ));
    }

    #[test]
    fn test_pixel_ratio_capped_by_quality() {
        assert_eq!(Settings::from_preset(QualityPreset::Low).pixel_ratio(3.0), 1.0);
        assert_eq!(Settings::from_preset(QualityPreset::Medium).pixel_ratio(3.0), 1.5);
        assert_eq!(Settings::from_preset(QualityPreset::High).pixel_ratio(3.0), 3.0);
        // Never below 1
        assert_eq!(Settings::from_preset(QualityPreset::High).pixel_ratio(0.5), 1.0);
    }

    #[test]
    fn test_preset_names() {
        assert_eq!(QualityPreset::High.as_str(), "High");
        assert!(Settings::from_json(r#"{ "quality": "Ultra" }"#).is_err());
    }
}
