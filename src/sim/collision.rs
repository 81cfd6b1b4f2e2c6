//! Sphere-sphere contact detection and response

use glam::Vec3;

use super::body::SphereBody;

/// Positional correction strength (fraction of penetration removed per step)
const CORRECTION_PERCENT: f32 = 0.8;
/// Penetration allowed before positional correction kicks in
const CORRECTION_SLOP: f32 = 0.001;

/// Overlap between two spheres
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Unit normal pointing from `a` toward `b`
    pub normal: Vec3,
    /// Overlap depth (positive)
    pub penetration: f32,
}

/// Check whether two spheres overlap
pub fn sphere_contact(a: &SphereBody, b: &SphereBody) -> Option<Contact> {
    let delta = b.position - a.position;
    let dist_sq = delta.length_squared();
    let radii = a.radius + b.radius;
    if dist_sq >= radii * radii {
        return None;
    }

    let dist = dist_sq.sqrt();
    // Coincident centers: push apart along +Y
    let normal = if dist > 1e-6 { delta / dist } else { Vec3::Y };
    Some(Contact {
        normal,
        penetration: radii - dist,
    })
}

/// Resolve a contact with a normal impulse and positional correction
pub fn resolve_contact(a: &mut SphereBody, b: &mut SphereBody, contact: &Contact, restitution: f32) {
    let inv_a = a.inv_mass();
    let inv_b = b.inv_mass();
    let inv_sum = inv_a + inv_b;
    if inv_sum <= 0.0 {
        return;
    }

    let rel_vel = b.velocity - a.velocity;
    let vel_along_normal = rel_vel.dot(contact.normal);

    // Only bounce if approaching
    if vel_along_normal < 0.0 {
        let j = -(1.0 + restitution) * vel_along_normal / inv_sum;
        let impulse = contact.normal * j;
        a.velocity -= impulse * inv_a;
        b.velocity += impulse * inv_b;
    }

    let correction =
        contact.normal * ((contact.penetration - CORRECTION_SLOP).max(0.0) / inv_sum * CORRECTION_PERCENT);
    a.position -= correction * inv_a;
    b.position += correction * inv_b;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_separated_spheres_miss() {
        let a = SphereBody::new(Vec3::ZERO, 1.0);
        let b = SphereBody::new(Vec3::new(2.5, 0.0, 0.0), 1.0);
        assert!(sphere_contact(&a, &b).is_none());
    }

    #[test]
    fn test_overlapping_spheres_hit() {
        let a = SphereBody::new(Vec3::ZERO, 1.0);
        let b = SphereBody::new(Vec3::new(1.5, 0.0, 0.0), 1.0);
        let c = sphere_contact(&a, &b).unwrap();
        assert!((c.normal - Vec3::X).length() < 1e-6);
        assert!((c.penetration - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_coincident_centers_have_normal() {
        let a = SphereBody::new(Vec3::ZERO, 1.0);
        let b = SphereBody::new(Vec3::ZERO, 0.5);
        let c = sphere_contact(&a, &b).unwrap();
        assert_eq!(c.normal, Vec3::Y);
        assert!((c.penetration - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_head_on_elastic_swap() {
        let mut a = SphereBody::new(Vec3::ZERO, 1.0);
        let mut b = SphereBody::new(Vec3::new(1.9, 0.0, 0.0), 1.0);
        a.velocity = Vec3::X * 2.0;
        let c = sphere_contact(&a, &b).unwrap();
        resolve_contact(&mut a, &mut b, &c, 1.0);
        // Equal masses exchange velocities
        assert!(a.velocity.length() < 1e-4);
        assert!((b.velocity.x - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_separating_spheres_keep_velocity() {
        let mut a = SphereBody::new(Vec3::ZERO, 1.0);
        let mut b = SphereBody::new(Vec3::new(1.9, 0.0, 0.0), 1.0);
        a.velocity = -Vec3::X;
        let c = sphere_contact(&a, &b).unwrap();
        resolve_contact(&mut a, &mut b, &c, 0.5);
        assert_eq!(a.velocity, -Vec3::X);
        assert_eq!(b.velocity, Vec3::ZERO);
    }

    #[test]
    fn test_positional_correction_reduces_overlap() {
        let mut a = SphereBody::new(Vec3::ZERO, 1.0);
        let mut b = SphereBody::new(Vec3::new(1.0, 0.0, 0.0), 1.0);
        let before = sphere_contact(&a, &b).unwrap().penetration;
        let c = sphere_contact(&a, &b).unwrap();
        resolve_contact(&mut a, &mut b, &c, 0.0);
        let after = sphere_contact(&a, &b).map(|c| c.penetration).unwrap_or(0.0);
        assert!(after < before);
    }
}
