//! The fixed 16-point hazard ring.
//!
//! Regenerated on every broadcast tick rather than cached: the ring is
//! tiny and the hazard frame it is expressed in never moves relative to
//! itself, so there is nothing worth keeping between ticks.

use std::f64::consts::PI;

use digbot_types::PointXyz;

/// Number of points on the ring.
pub const RING_POINTS: usize = 16;

/// Angular step between consecutive points: the 16 points span a full
/// circle.
pub const RING_STEP: f64 = PI / 8.0;

/// Generate the ring of [`RING_POINTS`] points at `radius` from the frame
/// origin, at z = 0, in the hazard's own frame.
pub fn generate_ring(radius: f64) -> Vec<PointXyz> {
    (0..RING_POINTS)
        .map(|i| {
            let offset = i as f64 * RING_STEP;
            PointXyz {
                x: radius * offset.cos(),
                y: radius * offset.sin(),
                z: 0.0,
            }
        })
        .collect()
}
