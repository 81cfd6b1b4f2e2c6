//! Visualizer settings and physics tuning
//!
//! Persisted separately from the task list in LocalStorage.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::sim::SimParams;

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

    /// Next preset, wrapping around
    pub fn next(&self) -> Self {
        match self {
            QualityPreset::Low => QualityPreset::Medium,
            QualityPreset::Medium => QualityPreset::High,
            QualityPreset::High => QualityPreset::Low,
        }
    }

    /// Transparent layers composited per pixel
    pub fn transparency_layers(&self) -> u32 {
        match self {
            QualityPreset::Low => 1,
            QualityPreset::Medium => 2,
            QualityPreset::High => 4,
        }
    }

    /// Whether bubbles get the rotating band pattern
    pub fn bands_enabled(&self) -> bool {
        !matches!(self, QualityPreset::Low)
    }
}

/// Visualizer settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,

    // === Physics ===
    /// Force pulling every bubble toward the cluster center
    pub centripetal_strength: f32,
    /// Extra constant acceleration (zero keeps bubbles floating)
    pub gravity: [f32; 3],
    pub linear_damping: f32,
    pub angular_damping: f32,
    /// Bounciness of bubble-bubble contacts (0-1)
    pub restitution: f32,
    /// Cluster rotation speed (radians/s)
    pub cluster_spin: f32,

    // === HUD ===
    /// Show FPS counter
    pub show_fps: bool,

    // === Accessibility ===
    /// Reduced motion (no cluster spin)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        let sim = SimParams::default();
        Self {
            quality: QualityPreset::Medium,

            centripetal_strength: sim.centripetal_strength,
            gravity: sim.gravity.to_array(),
            linear_damping: sim.linear_damping,
            angular_damping: sim.angular_damping,
            restitution: sim.restitution,
            cluster_spin: sim.cluster_spin,

            show_fps: true,

            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Effective cluster spin (respects reduced_motion)
    pub fn effective_cluster_spin(&self) -> f32 {
        if self.reduced_motion {
            0.0
        } else {
            self.cluster_spin
        }
    }

    /// Physics parameters for the tick, with values clamped to sane ranges
    pub fn sim_params(&self) -> SimParams {
        SimParams {
            centripetal_strength: self.centripetal_strength.max(0.0),
            gravity: Vec3::from_array(self.gravity),
            linear_damping: self.linear_damping.clamp(0.0, 1.0),
            angular_damping: self.angular_damping.clamp(0.0, 1.0),
            restitution: self.restitution.clamp(0.0, 1.0),
            cluster_spin: self.effective_cluster_spin(),
        }
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "task_bubbles_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match serde_json::from_str(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring unreadable settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
