//! Small numeric helpers shared by the heuristics in other crates.

/// Maps `value` linearly from `[min, max]` to `[min_target, max_target]`.
///
/// Values outside `[min, max]` are clamped to the nearest target endpoint.
/// The target range may be descending.
pub fn scale(value: f32, min: f32, max: f32, min_target: f32, max_target: f32) -> f32 {
    if value <= min {
        return min_target;
    }
    if value >= max {
        return max_target;
    }
    let t = (value - min) / (max - min);
    min_target + t * (max_target - min_target)
}
