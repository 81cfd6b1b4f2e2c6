//! Deterministic bubble simulation
//!
//! All physics and registry logic lives here. This module must be pure and
//! deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by bubble ID)
//! - No rendering or platform dependencies

pub mod body;
pub mod collision;
pub mod pick;
pub mod state;
pub mod tick;

pub use body::SphereBody;
pub use collision::{Contact, resolve_contact, sphere_contact};
pub use pick::{PickOutcome, Ray, apply_pick, pick_nearest, ray_sphere};
pub use state::{Bubble, BubbleEvent, BubbleWorld, launch};
pub use tick::{SimParams, StepClock, TickInput, tick};
