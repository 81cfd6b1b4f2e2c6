//! Pointer picking: ray against the rendered bubbles

use glam::Vec3;

use super::state::BubbleWorld;

/// A ray with normalized direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self {
            origin,
            dir: dir.normalize_or_zero(),
        }
    }

    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.dir * t
    }
}

/// What a click did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickOutcome {
    /// Repeating task: bubble sent back to the spawn area
    Relaunched(u32),
    /// One-off task: bubble removed
    Dismissed(u32),
}

/// Nearest non-negative hit distance. A ray starting inside the sphere hits
/// where it exits.
pub fn ray_sphere(ray: &Ray, center: Vec3, radius: f32) -> Option<f32> {
    let oc = ray.origin - center;
    let b = oc.dot(ray.dir);
    let c = oc.length_squared() - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let sq = disc.sqrt();
    let t_near = -b - sq;
    let t_far = -b + sq;
    if t_near >= 0.0 {
        Some(t_near)
    } else if t_far >= 0.0 {
        Some(t_far)
    } else {
        None
    }
}

/// Id of the nearest bubble under the ray, tested at the drawn positions
pub fn pick_nearest(world: &BubbleWorld, ray: &Ray) -> Option<u32> {
    world
        .bubbles
        .iter()
        .filter_map(|b| {
            ray_sphere(ray, world.render_position(b), b.body.radius).map(|t| (t, b.id))
        })
        .min_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(_, id)| id)
}

/// Pick and act: repeating tasks relaunch, others are dismissed
pub fn apply_pick(world: &mut BubbleWorld, ray: &Ray) -> Option<PickOutcome> {
    let id = pick_nearest(world, ray)?;
    let repeat = world.get(id)?.task.repeat;
    if repeat {
        world.relaunch(id);
        log::info!("Relaunched bubble {}", id);
        Some(PickOutcome::Relaunched(id))
    } else {
        let bubble = world.dismiss(id)?;
        log::info!("Dismissed bubble {} '{}'", id, bubble.task.name);
        Some(PickOutcome::Dismissed(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Task;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn world_with(positions: &[(Vec3, bool)]) -> BubbleWorld {
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let mut world = BubbleWorld::new(5);
        for (i, (pos, repeat)) in positions.iter().enumerate() {
            world
                .spawn(Task::new(format!("t{i}")).repeating(*repeat), today)
                .unwrap();
            let last = world.bubbles.len() - 1;
            world.bubbles[last].body.position = *pos;
        }
        world.drain_events();
        world
    }

    #[test]
    fn test_ray_sphere_front_hit() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), -Vec3::Z);
        let t = ray_sphere(&ray, Vec3::ZERO, 1.0).unwrap();
        assert!((t - 9.0).abs() < 1e-5);
    }

    #[test]
    fn test_ray_sphere_miss_and_behind() {
        let ray = Ray::new(Vec3::new(0.0, 5.0, 10.0), -Vec3::Z);
        assert!(ray_sphere(&ray, Vec3::ZERO, 1.0).is_none());
        let away = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::Z);
        assert!(ray_sphere(&away, Vec3::ZERO, 1.0).is_none());
    }

    #[test]
    fn test_ray_sphere_from_inside() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        let t = ray_sphere(&ray, Vec3::ZERO, 2.0).unwrap();
        assert!((t - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_pick_prefers_nearest() {
        let world = world_with(&[
            (Vec3::new(0.0, 0.0, -3.0), false),
            (Vec3::new(0.0, 0.0, 3.0), false),
        ]);
        let ray = Ray::new(Vec3::new(0.0, 0.0, 20.0), -Vec3::Z);
        assert_eq!(pick_nearest(&world, &ray), Some(world.bubbles[1].id));
    }

    #[test]
    fn test_pick_uses_cluster_rotation() {
        let mut world = world_with(&[(Vec3::X * 3.0, false)]);
        let ray = Ray::new(Vec3::new(3.0, 0.0, 20.0), -Vec3::Z);
        assert!(pick_nearest(&world, &ray).is_some());
        // Rotated a quarter turn the bubble is drawn at -Z, off the ray
        world.cluster_angle = std::f32::consts::FRAC_PI_2;
        assert!(pick_nearest(&world, &ray).is_none());
    }

    #[test]
    fn test_apply_pick_dismisses_one_off() {
        let mut world = world_with(&[(Vec3::ZERO, false)]);
        let id = world.bubbles[0].id;
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), -Vec3::Z);
        assert_eq!(apply_pick(&mut world, &ray), Some(PickOutcome::Dismissed(id)));
        assert!(world.is_empty());
    }

    #[test]
    fn test_apply_pick_relaunches_repeating() {
        let mut world = world_with(&[(Vec3::ZERO, true)]);
        let id = world.bubbles[0].id;
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), -Vec3::Z);
        assert_eq!(apply_pick(&mut world, &ray), Some(PickOutcome::Relaunched(id)));
        assert_eq!(world.len(), 1);
        assert!(world.bubbles[0].body.velocity.y > 0.0);
    }

    #[test]
    fn test_apply_pick_on_empty_space() {
        let mut world = world_with(&[(Vec3::ZERO, false)]);
        let ray = Ray::new(Vec3::new(50.0, 0.0, 10.0), -Vec3::Z);
        assert_eq!(apply_pick(&mut world, &ray), None);
        assert_eq!(world.len(), 1);
    }

    proptest! {
        #[test]
        fn hit_point_lies_on_sphere(
            ox in -20.0f32..20.0, oy in -20.0f32..20.0, oz in 5.0f32..20.0,
            r in 0.2f32..3.0,
        ) {
            // Aim at the center so the ray always hits
            let origin = Vec3::new(ox, oy, oz);
            let ray = Ray::new(origin, -origin);
            let t = ray_sphere(&ray, Vec3::ZERO, r).unwrap();
            prop_assert!((ray.at(t).length() - r).abs() < 1e-3);
        }
    }
}
