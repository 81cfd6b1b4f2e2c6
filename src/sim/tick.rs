//! Fixed timestep simulation tick
//!
//! Advances the bubble world deterministically: picks, attraction toward
//! the cluster target, integration, contacts, cluster spin.

use glam::Vec3;

use super::collision::{resolve_contact, sphere_contact};
use super::pick::{Ray, apply_pick};
use super::state::BubbleWorld;
use crate::consts::*;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Click ray through the camera (one-shot)
    pub pick: Option<Ray>,
}

/// Physics tuning consumed by the tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimParams {
    /// Constant force magnitude pulling each body toward the target
    pub centripetal_strength: f32,
    pub gravity: Vec3,
    /// Fraction of linear velocity lost per second
    pub linear_damping: f32,
    /// Fraction of angular velocity lost per second
    pub angular_damping: f32,
    pub restitution: f32,
    /// Cluster spin (radians/s)
    pub cluster_spin: f32,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            centripetal_strength: 6.0,
            gravity: Vec3::ZERO,
            linear_damping: 0.6,
            angular_damping: 0.3,
            restitution: 0.3,
            cluster_spin: 0.15,
        }
    }
}

/// Advance the world by one fixed timestep
pub fn tick(world: &mut BubbleWorld, input: &TickInput, params: &SimParams, dt: f32) {
    if let Some(ray) = &input.pick {
        apply_pick(world, ray);
    }

    world.time_ticks += 1;

    for bubble in &mut world.bubbles {
        let body = &mut bubble.body;
        let to_target = CLUSTER_TARGET - body.position;
        if to_target.length_squared() > 1e-8 {
            body.apply_force(to_target.normalize() * params.centripetal_strength);
        }
        body.apply_force(params.gravity * body.mass);
        body.integrate(dt, params.linear_damping, params.angular_damping);
    }

    resolve_contacts(world, params.restitution);

    world.spin_cluster(params.cluster_spin * dt);

    // Ensure deterministic ordering
    world.normalize_order();
}

/// Resolve every overlapping pair in id order
fn resolve_contacts(world: &mut BubbleWorld, restitution: f32) {
    let n = world.bubbles.len();
    for i in 0..n {
        let (head, tail) = world.bubbles.split_at_mut(i + 1);
        let a = &mut head[i].body;
        for other in tail.iter_mut() {
            let b = &mut other.body;
            if let Some(contact) = sphere_contact(a, b) {
                resolve_contact(a, b, &contact, restitution);
            }
        }
    }
}

/// Fixed-step accumulator driven by variable frame times
#[derive(Debug, Clone, Default)]
pub struct StepClock {
    accumulator: f32,
}

impl StepClock {
    /// Number of `SIM_DT` substeps to run for a frame of `frame_dt` seconds
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt.clamp(0.0, MAX_FRAME_DT);
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        substeps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Task;
    use chrono::NaiveDate;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn run(world: &mut BubbleWorld, params: &SimParams, ticks: usize) {
        let input = TickInput::default();
        for _ in 0..ticks {
            tick(world, &input, params, SIM_DT);
        }
    }

    #[test]
    fn test_bubbles_cluster_toward_target() {
        let mut world = BubbleWorld::new(11);
        for i in 0..6 {
            world.spawn(Task::new(format!("t{i}")), today()).unwrap();
        }
        let start: f32 = world
            .bubbles
            .iter()
            .map(|b| b.body.position.distance(CLUSTER_TARGET))
            .sum();
        run(&mut world, &SimParams::default(), 600);
        let end: f32 = world
            .bubbles
            .iter()
            .map(|b| b.body.position.distance(CLUSTER_TARGET))
            .sum();
        assert!(end < start * 0.5, "start {start}, end {end}");
    }

    #[test]
    fn test_settled_bubbles_do_not_overlap_much() {
        let mut world = BubbleWorld::new(2);
        for i in 0..8 {
            world.spawn(Task::new(format!("t{i}")), today()).unwrap();
        }
        run(&mut world, &SimParams::default(), 900);
        for (i, a) in world.bubbles.iter().enumerate() {
            for b in &world.bubbles[i + 1..] {
                let overlap = a.body.radius + b.body.radius - a.body.position.distance(b.body.position);
                assert!(overlap < 0.25 * a.body.radius.min(b.body.radius), "overlap {overlap}");
            }
        }
    }

    #[test]
    fn test_cluster_spins() {
        let mut world = BubbleWorld::new(1);
        let params = SimParams {
            cluster_spin: 1.0,
            ..Default::default()
        };
        run(&mut world, &params, 60);
        assert!((world.cluster_angle - 1.0).abs() < 1e-3);
        assert_eq!(world.time_ticks, 60);
    }

    #[test]
    fn test_pick_input_dismisses() {
        let mut world = BubbleWorld::new(4);
        world.spawn(Task::new("click me"), today()).unwrap();
        world.bubbles[0].body.position = CLUSTER_TARGET;
        world.bubbles[0].body.velocity = Vec3::ZERO;
        let input = TickInput {
            pick: Some(Ray::new(CLUSTER_TARGET + Vec3::Z * 10.0, -Vec3::Z)),
        };
        tick(&mut world, &input, &SimParams::default(), SIM_DT);
        assert!(world.is_empty());
    }

    #[test]
    fn test_determinism() {
        // Two worlds with the same seed should produce identical results
        let mut w1 = BubbleWorld::new(99999);
        let mut w2 = BubbleWorld::new(99999);
        for w in [&mut w1, &mut w2] {
            w.spawn(Task::new("a"), today()).unwrap();
            w.spawn(Task::new("b"), today()).unwrap();
        }
        run(&mut w1, &SimParams::default(), 240);
        run(&mut w2, &SimParams::default(), 240);
        for (a, b) in w1.bubbles.iter().zip(&w2.bubbles) {
            assert_eq!(a.body, b.body);
        }
    }

    #[test]
    fn test_step_clock_accumulates_partial_frames() {
        let mut clock = StepClock::default();
        assert_eq!(clock.advance(SIM_DT * 0.5), 0);
        assert_eq!(clock.advance(SIM_DT * 0.6), 1);
        assert_eq!(clock.advance(0.0), 0);
    }

    #[test]
    fn test_step_clock_clamps_long_frames() {
        let mut clock = StepClock::default();
        // A 10 s stall only counts as MAX_FRAME_DT of simulated time
        let expected = (MAX_FRAME_DT / SIM_DT) as u32;
        assert_eq!(expected, 6);
        assert_eq!(clock.advance(10.0), expected);
        for _ in 0..100 {
            assert_eq!(clock.advance(10.0), expected);
        }
        // Negative frame times add nothing
        let mut clock = StepClock::default();
        assert_eq!(clock.advance(-1.0), 0);
    }

    #[test]
    fn test_step_clock_carries_remainder() {
        let mut clock = StepClock::default();
        // 2.5 steps: two now, the half carries over
        assert_eq!(clock.advance(SIM_DT * 2.5), 2);
        assert_eq!(clock.advance(SIM_DT * 0.6), 1);
        assert_eq!(clock.advance(SIM_DT * 0.5), 0);
    }
}
