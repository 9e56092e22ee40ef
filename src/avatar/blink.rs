//! Blink and wink driver.
//!
//! The blink channels run at a faster rate than expressions so eye closes
//! read as snappy instead of smoothed. Flag scheduling (random blink
//! intervals, manual wink keys) belongs to the caller.

use super::blend::approach;
use crate::model::MorphRegistry;

/// Ease the two blink channels toward their flag-driven targets.
pub fn apply_blink(
    blink: bool,
    wink_left: bool,
    wink_right: bool,
    registry: &mut MorphRegistry,
    blink_channels: (&str, &str),
    rate: f32,
) {
    let left_target = if blink || wink_left { 1.0 } else { 0.0 };
    let right_target = if blink || wink_right { 1.0 } else { 0.0 };

    ease(registry, blink_channels.0, left_target, rate);
    ease(registry, blink_channels.1, right_target, rate);
}

fn ease(registry: &mut MorphRegistry, name: &str, target: f32, rate: f32) {
    if let Some(idx) = registry.index_of(name) {
        let next = approach(registry.weight(idx), target, rate);
        registry.set_weight(idx, next);
    }
}
