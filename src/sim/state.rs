//! Bubble registry and scene object factory
//!
//! A bubble pairs a task with its look and its physics body. The renderer
//! reads bodies straight out of the registry, so adding or removing a
//! bubble updates both sides at once.

use chrono::NaiveDate;
use glam::{Quat, Vec3};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::body::SphereBody;
use crate::consts::*;
use crate::error::WorldError;
use crate::mapping::BubbleLook;
use crate::normalize_angle;
use crate::task::Task;

/// Upward launch speed range (units/s)
pub const LAUNCH_SPEED_MIN: f32 = 4.0;
pub const LAUNCH_SPEED_MAX: f32 = 7.0;
/// Sideways launch speed (± units/s)
pub const LAUNCH_LATERAL: f32 = 1.0;

/// Something the frame loop may want to react to (logging, saving)
#[derive(Debug, Clone, PartialEq)]
pub enum BubbleEvent {
    Spawned { id: u32 },
    Relaunched { id: u32 },
    Dismissed { id: u32, task: Task },
}

/// One task in the scene
#[derive(Debug, Clone)]
pub struct Bubble {
    pub id: u32,
    pub task: Task,
    pub look: BubbleLook,
    pub body: SphereBody,
}

/// All active bubbles plus the shared simulation state
#[derive(Debug, Clone)]
pub struct BubbleWorld {
    pub seed: u64,
    rng: Pcg32,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Rotation of the whole cluster about +Y (radians)
    pub cluster_angle: f32,
    /// Active bubbles (sorted by id for determinism)
    pub bubbles: Vec<Bubble>,
    events: Vec<BubbleEvent>,
    next_id: u32,
    /// Day bubble looks are computed for
    today: Option<NaiveDate>,
}

impl BubbleWorld {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            time_ticks: 0,
            cluster_angle: 0.0,
            bubbles: Vec::new(),
            events: Vec::new(),
            next_id: 1,
            today: None,
        }
    }

    /// Allocate a new entity ID
    fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn len(&self) -> usize {
        self.bubbles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bubbles.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<&Bubble> {
        self.bubbles.iter().find(|b| b.id == id)
    }

    /// Create a bubble for `task` and launch it toward the cluster
    pub fn spawn(&mut self, task: Task, today: NaiveDate) -> Result<u32, WorldError> {
        if self.bubbles.len() >= MAX_BUBBLES {
            return Err(WorldError::Full(MAX_BUBBLES));
        }

        self.today = Some(today);
        let look = BubbleLook::for_task(&task, today);
        let mut body = SphereBody::new(spawn_point(&mut self.rng), look.radius);
        launch(&mut body, &mut self.rng);

        let id = self.next_entity_id();
        log::info!(
            "Spawned bubble {} '{}' (r={:.2}, a={:.2})",
            id,
            task.name,
            look.radius,
            look.opacity
        );
        self.bubbles.push(Bubble { id, task, look, body });
        self.events.push(BubbleEvent::Spawned { id });
        Ok(id)
    }

    /// Advance the calendar day used for looks of relaunched bubbles
    pub fn set_today(&mut self, today: NaiveDate) {
        self.today = Some(today);
    }

    /// Send a bubble back to the spawn area and launch it again, with its
    /// look recomputed for the current day
    pub fn relaunch(&mut self, id: u32) -> bool {
        let today = self.today;
        let Some(bubble) = self.bubbles.iter_mut().find(|b| b.id == id) else {
            return false;
        };
        if let Some(today) = today {
            bubble.look = BubbleLook::for_task(&bubble.task, today);
            bubble.body.radius = bubble.look.radius;
        }
        bubble.body.reset(spawn_point(&mut self.rng));
        launch(&mut bubble.body, &mut self.rng);
        self.events.push(BubbleEvent::Relaunched { id });
        true
    }

    /// Remove a bubble (body and render sphere together)
    pub fn dismiss(&mut self, id: u32) -> Option<Bubble> {
        let index = self.bubbles.iter().position(|b| b.id == id)?;
        let bubble = self.bubbles.remove(index);
        self.events.push(BubbleEvent::Dismissed {
            id,
            task: bubble.task.clone(),
        });
        Some(bubble)
    }

    /// Rotation applied to the whole cluster when drawing
    pub fn cluster_rotation(&self) -> Quat {
        Quat::from_rotation_y(self.cluster_angle)
    }

    /// Where a bubble is drawn (body position rotated about the cluster target)
    pub fn render_position(&self, bubble: &Bubble) -> Vec3 {
        CLUSTER_TARGET + self.cluster_rotation() * (bubble.body.position - CLUSTER_TARGET)
    }

    /// Orientation a bubble is drawn with
    pub fn render_orientation(&self, bubble: &Bubble) -> Quat {
        (self.cluster_rotation() * bubble.body.orientation).normalize()
    }

    /// Advance the cluster spin, wrapped to [-π, π)
    pub fn spin_cluster(&mut self, delta: f32) {
        self.cluster_angle = normalize_angle(self.cluster_angle + delta);
    }

    /// Tasks of all active bubbles, in id order
    pub fn tasks(&self) -> Vec<Task> {
        self.bubbles.iter().map(|b| b.task.clone()).collect()
    }

    pub fn drain_events(&mut self) -> Vec<BubbleEvent> {
        std::mem::take(&mut self.events)
    }

    /// Ensure bubbles are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.bubbles.sort_by_key(|b| b.id);
    }
}

/// Jittered point below the cluster target
fn spawn_point(rng: &mut Pcg32) -> Vec3 {
    CLUSTER_TARGET
        + Vec3::new(
            rng.random_range(-SPAWN_JITTER..=SPAWN_JITTER),
            -SPAWN_DEPTH,
            rng.random_range(-SPAWN_JITTER..=SPAWN_JITTER),
        )
}

/// Randomized upward impulse, applied slightly off-center so the bubble spins
pub fn launch(body: &mut SphereBody, rng: &mut Pcg32) {
    let velocity = Vec3::new(
        rng.random_range(-LAUNCH_LATERAL..=LAUNCH_LATERAL),
        rng.random_range(LAUNCH_SPEED_MIN..=LAUNCH_SPEED_MAX),
        rng.random_range(-LAUNCH_LATERAL..=LAUNCH_LATERAL),
    );
    let offset = Vec3::new(
        rng.random_range(-0.3..=0.3),
        0.0,
        rng.random_range(-0.3..=0.3),
    ) * body.radius;
    body.apply_impulse(velocity * body.mass, body.position + offset);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test]
    fn test_spawn_launches_upward() {
        let mut world = BubbleWorld::new(7);
        let id = world.spawn(Task::new("a"), today()).unwrap();
        let bubble = world.get(id).unwrap();
        assert!(bubble.body.position.y < CLUSTER_TARGET.y);
        assert!(bubble.body.velocity.y >= LAUNCH_SPEED_MIN - 1e-4);
        assert!(bubble.body.velocity.y <= LAUNCH_SPEED_MAX + 1e-4);
        assert_eq!(bubble.body.radius, bubble.look.radius);
        assert_eq!(world.drain_events(), vec![BubbleEvent::Spawned { id }]);
        assert!(world.drain_events().is_empty());
    }

    #[test]
    fn test_ids_are_unique_and_ordered() {
        let mut world = BubbleWorld::new(1);
        let a = world.spawn(Task::new("a"), today()).unwrap();
        let b = world.spawn(Task::new("b"), today()).unwrap();
        world.dismiss(a);
        let c = world.spawn(Task::new("c"), today()).unwrap();
        assert!(a < b && b < c);
        assert_eq!(world.len(), 2);
    }

    #[test]
    fn test_spawn_rejects_when_full() {
        let mut world = BubbleWorld::new(1);
        for i in 0..MAX_BUBBLES {
            world.spawn(Task::new(format!("t{i}")), today()).unwrap();
        }
        assert_eq!(
            world.spawn(Task::new("one too many"), today()),
            Err(WorldError::Full(MAX_BUBBLES))
        );
    }

    #[test]
    fn test_dismiss_removes_bubble() {
        let mut world = BubbleWorld::new(3);
        let id = world.spawn(Task::new("gone"), today()).unwrap();
        world.drain_events();
        let removed = world.dismiss(id).unwrap();
        assert_eq!(removed.task.name, "gone");
        assert!(world.get(id).is_none());
        assert!(world.dismiss(id).is_none());
        assert!(matches!(
            world.drain_events().as_slice(),
            [BubbleEvent::Dismissed { id: d, .. }] if *d == id
        ));
    }

    #[test]
    fn test_relaunch_resets_body() {
        let mut world = BubbleWorld::new(3);
        let id = world.spawn(Task::new("again").repeating(true), today()).unwrap();
        world.bubbles[0].body.position = Vec3::new(0.0, 2.0, 0.0);
        world.bubbles[0].body.velocity = Vec3::new(0.0, -9.0, 0.0);
        assert!(world.relaunch(id));
        let body = &world.get(id).unwrap().body;
        assert!((body.position.y - (CLUSTER_TARGET.y - SPAWN_DEPTH)).abs() < 1e-5);
        assert!(body.velocity.y > 0.0);
        assert!(!world.relaunch(999));
    }

    #[test]
    fn test_relaunch_updates_look_for_new_day() {
        let mut world = BubbleWorld::new(3);
        let due = today() + chrono::Duration::days(30);
        let id = world
            .spawn(Task::new("rent").with_due(due).repeating(true), today())
            .unwrap();
        assert!((world.get(id).unwrap().look.radius - MIN_RADIUS).abs() < 1e-5);

        world.set_today(due);
        assert!(world.relaunch(id));
        let bubble = world.get(id).unwrap();
        assert!((bubble.look.radius - MAX_RADIUS).abs() < 1e-5);
        assert_eq!(bubble.body.radius, bubble.look.radius);
    }

    #[test]
    fn test_same_seed_same_launch() {
        let mut a = BubbleWorld::new(42);
        let mut b = BubbleWorld::new(42);
        a.spawn(Task::new("x"), today()).unwrap();
        b.spawn(Task::new("x"), today()).unwrap();
        assert_eq!(a.bubbles[0].body, b.bubbles[0].body);
    }

    #[test]
    fn test_render_position_rotates_about_target() {
        let mut world = BubbleWorld::new(1);
        world.spawn(Task::new("x"), today()).unwrap();
        world.bubbles[0].body.position = CLUSTER_TARGET + Vec3::X;
        world.cluster_angle = std::f32::consts::FRAC_PI_2;
        let p = world.render_position(&world.bubbles[0]);
        // +X rotated 90° about +Y lands on -Z
        assert!((p - (CLUSTER_TARGET - Vec3::Z)).length() < 1e-5);
    }
}
