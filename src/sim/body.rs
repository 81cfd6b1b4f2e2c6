//! Rigid sphere body
//!
//! Just enough rigid-body dynamics for floating bubbles: linear and angular
//! state, point impulses, damped semi-implicit Euler integration.

use glam::{Quat, Vec3};

use crate::consts::BUBBLE_MASS;

#[derive(Debug, Clone, PartialEq)]
pub struct SphereBody {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Unit quaternion
    pub orientation: Quat,
    /// Radians per second, world space
    pub angular_velocity: Vec3,
    pub radius: f32,
    pub mass: f32,
    /// Accumulated force, cleared on integrate
    force: Vec3,
}

impl SphereBody {
    /// Solid sphere of the given radius at `position`
    pub fn new(position: Vec3, radius: f32) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            angular_velocity: Vec3::ZERO,
            radius,
            mass: BUBBLE_MASS,
            force: Vec3::ZERO,
        }
    }

    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass.max(f32::EPSILON);
        self
    }

    #[inline]
    pub fn inv_mass(&self) -> f32 {
        1.0 / self.mass
    }

    /// Moment of inertia of a solid sphere (2/5 m r²)
    #[inline]
    pub fn inertia(&self) -> f32 {
        0.4 * self.mass * self.radius * self.radius
    }

    #[inline]
    pub fn force(&self) -> Vec3 {
        self.force
    }

    pub fn apply_force(&mut self, force: Vec3) {
        self.force += force;
    }

    /// Apply an impulse at a world-space point. Off-center impulses spin
    /// the body.
    pub fn apply_impulse(&mut self, impulse: Vec3, world_point: Vec3) {
        self.velocity += impulse * self.inv_mass();
        let r = world_point - self.position;
        self.angular_velocity += r.cross(impulse) / self.inertia();
    }

    /// Advance by `dt`. Damping is the fraction of velocity lost per second.
    pub fn integrate(&mut self, dt: f32, linear_damping: f32, angular_damping: f32) {
        self.velocity += self.force * self.inv_mass() * dt;
        self.velocity *= (1.0 - linear_damping.clamp(0.0, 1.0)).powf(dt);
        self.angular_velocity *= (1.0 - angular_damping.clamp(0.0, 1.0)).powf(dt);

        self.position += self.velocity * dt;

        let spin = self.angular_velocity * dt;
        let angle = spin.length();
        if angle > 1e-9 {
            let delta = Quat::from_axis_angle(spin / angle, angle);
            self.orientation = (delta * self.orientation).normalize();
        }

        self.force = Vec3::ZERO;
    }

    /// Put the body back at rest at `position`
    pub fn reset(&mut self, position: Vec3) {
        self.position = position;
        self.velocity = Vec3::ZERO;
        self.angular_velocity = Vec3::ZERO;
        self.orientation = Quat::IDENTITY;
        self.force = Vec3::ZERO;
    }
}
