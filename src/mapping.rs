//! Task metadata to bubble appearance
//!
//! Pure functions only. The same task on the same day always produces the
//! same look.

use chrono::NaiveDate;

use crate::consts::*;
use crate::task::{Priority, Task};

/// Size, opacity and color of a bubble
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BubbleLook {
    pub radius: f32,
    pub opacity: f32,
    /// Linear RGB, 0-1
    pub color: [f32; 3],
}

impl BubbleLook {
    pub fn for_task(task: &Task, today: NaiveDate) -> Self {
        Self {
            radius: due_radius(task.due, today),
            opacity: priority_opacity(task.priority),
            color: category_color(&task.category),
        }
    }
}

/// Whole days from `today` until `due` (negative when overdue)
#[inline]
pub fn days_until(due: NaiveDate, today: NaiveDate) -> i64 {
    (due - today).num_days()
}

/// Urgency in [0, 1]: 0 for no due date or a due date a full window away,
/// 1 for due today or overdue
pub fn urgency(days: Option<i64>) -> f32 {
    match days {
        None => 0.0,
        Some(d) => {
            let d = d.clamp(0, URGENCY_WINDOW_DAYS);
            1.0 - d as f32 / URGENCY_WINDOW_DAYS as f32
        }
    }
}

/// Bubble radius from due date (linear urgency ramp)
pub fn due_radius(due: Option<NaiveDate>, today: NaiveDate) -> f32 {
    let u = urgency(due.map(|d| days_until(d, today)));
    (MIN_RADIUS + u * (MAX_RADIUS - MIN_RADIUS)).clamp(MIN_RADIUS, MAX_RADIUS)
}

/// Bubble opacity from priority: 1 → 0.4, 5 → 1.0
pub fn priority_opacity(priority: Priority) -> f32 {
    let span = (Priority::MAX.get() - Priority::MIN.get()) as f32;
    let t = (priority.get() - Priority::MIN.get()) as f32 / span;
    (MIN_OPACITY + t * (MAX_OPACITY - MIN_OPACITY)).clamp(MIN_OPACITY, MAX_OPACITY)
}

/// 31-multiplier rolling hash over UTF-16 code units, wrapping at 32 bits.
/// Categories are trimmed and lowercased first.
pub fn category_hash(category: &str) -> i32 {
    category
        .trim()
        .to_lowercase()
        .encode_utf16()
        .fold(0i32, |h, c| h.wrapping_mul(31).wrapping_add(c as i32))
}

/// Category color: hash → hue, fixed saturation/value
pub fn category_color(category: &str) -> [f32; 3] {
    let hue = category_hash(category).unsigned_abs() % 360;
    hsv_to_rgb(hue as f32, CATEGORY_SATURATION, CATEGORY_VALUE)
}

/// HSV to RGB. Hue in degrees (wrapped), saturation/value in [0, 1].
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> [f32; 3] {
    let h = h.rem_euclid(360.0) / 60.0;
    let c = v * s;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let m = v - c;
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    [r + m, g + m, b + m]
}
