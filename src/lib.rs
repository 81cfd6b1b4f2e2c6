//! Task Bubbles - floating 3D task visualizer
//!
//! Core modules:
//! - `task`: Task model and form validation
//! - `mapping`: Task metadata to bubble size/opacity/color
//! - `sim`: Deterministic sphere simulation, bubble registry, picking
//! - `renderer`: WebGPU rendering pipeline and orbit camera
//! - `persistence`: Task list save/load
//! - `settings`: Runtime preferences and physics tuning

pub mod error;
pub mod mapping;
pub mod persistence;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod task;

pub use error::{GpuError, PersistenceError, TaskError, WorldError};
pub use settings::{QualityPreset, Settings};
pub use task::{Priority, Task, TaskForm};

/// Configuration constants
pub mod consts {
    use glam::Vec3;

    /// Fixed simulation sub-step (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Largest frame delta fed to the accumulator (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Point every bubble is pulled toward
    pub const CLUSTER_TARGET: Vec3 = Vec3::ZERO;
    /// Bubbles spawn this far below the cluster target and float up
    pub const SPAWN_DEPTH: f32 = 6.0;
    /// Horizontal jitter of the spawn point (± units)
    pub const SPAWN_JITTER: f32 = 1.5;
    /// Renderer and registry capacity
    pub const MAX_BUBBLES: usize = 64;

    /// Bubble radius range (world units)
    pub const MIN_RADIUS: f32 = 0.4;
    pub const MAX_RADIUS: f32 = 1.2;
    /// Days ahead at which a task stops looking urgent
    pub const URGENCY_WINDOW_DAYS: i64 = 30;

    /// Opacity range mapped from priority 1..=5
    pub const MIN_OPACITY: f32 = 0.4;
    pub const MAX_OPACITY: f32 = 1.0;

    /// Fixed HSV saturation/value for category colors
    pub const CATEGORY_SATURATION: f32 = 0.65;
    pub const CATEGORY_VALUE: f32 = 0.9;

    /// Every bubble body has the same mass so the attraction pulls evenly
    pub const BUBBLE_MASS: f32 = 1.0;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}
