use std::time::Instant;

/// Seconds elapsed since `instant`, for timing reports in the logs.
#[inline]
pub fn seconds_since(instant: Instant) -> f32 {
    let elapsed = instant.elapsed();
    elapsed.as_secs() as f32 + elapsed.subsec_nanos() as f32 * 1e-9
}
