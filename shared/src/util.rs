use once_cell::sync::Lazy;
use std::f32::consts::{PI, TAU};

const LOOKUP_TABLE_SIZE: usize = 720;

/// Precomputed sine and cosine values for equally spaced headings.
static SIN_COS_TABLE: Lazy<[(f32, f32); LOOKUP_TABLE_SIZE]> = Lazy::new(|| {
    let mut arr = [(0.0f32, 0.0f32); LOOKUP_TABLE_SIZE];
    let step = TAU / LOOKUP_TABLE_SIZE as f32;
    for (i, entry) in arr.iter_mut().enumerate() {
        let angle = i as f32 * step;
        *entry = (angle.sin(), angle.cos());
    }
    arr
});

/// Table-driven `(sin, cos)` of a heading, rounded to the nearest half degree.
#[inline(always)]
pub fn fast_sin_cos(angle: f32) -> (f32, f32) {
    let frac = angle.rem_euclid(TAU) / TAU;
    let idx = ((frac * LOOKUP_TABLE_SIZE as f32).round() as usize) % LOOKUP_TABLE_SIZE;
    SIN_COS_TABLE[idx]
}

/// Wraps an angle into `[-π, π]`.
///
/// NaN collapses to 0 so a corrupted heading can never poison steering.
#[inline]
pub fn wrap_angle(angle: f32) -> f32 {
    if !angle.is_finite() {
        return 0.0;
    }
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    wrapped.clamp(-PI, PI)
}
