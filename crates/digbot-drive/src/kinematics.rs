//! Differential-drive kinematics.
//!
//! Closed-form conversion from a body twist to per-wheel angular
//! velocities.  The geometry constants come from the robot description at
//! startup, but the validity check is cheap and the failure mode (a zero
//! radius silently dividing) is bad enough that it is re-checked on every
//! conversion.

use digbot_types::{DigError, WheelSpeeds};

/// Drivebase geometry: wheel radius and the span between the tread
/// centerlines, both in meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriveGeometry {
    pub wheel_radius: f64,
    pub wheel_span: f64,
}

impl DriveGeometry {
    /// Build a validated geometry.
    ///
    /// # Errors
    ///
    /// Returns [`DigError::InvalidGeometry`] when the radius or span is not
    /// a positive finite number.
    pub fn new(wheel_radius: f64, wheel_span: f64) -> Result<Self, DigError> {
        let geometry = Self {
            wheel_radius,
            wheel_span,
        };
        geometry.validate()?;
        Ok(geometry)
    }

    fn validate(&self) -> Result<(), DigError> {
        if !(self.wheel_radius > 0.0 && self.wheel_radius.is_finite()) {
            return Err(DigError::InvalidGeometry(format!(
                "wheel radius must be positive and finite, got {}",
                self.wheel_radius
            )));
        }
        if !(self.wheel_span > 0.0 && self.wheel_span.is_finite()) {
            return Err(DigError::InvalidGeometry(format!(
                "wheel span must be positive and finite, got {}",
                self.wheel_span
            )));
        }
        Ok(())
    }
}

/// Convert a body twist into per-wheel angular velocities.
///
/// Each wheel's desired ground velocity is the linear velocity offset by
/// half the span times the yaw rate; dividing by the wheel radius turns
/// that into the wheel's angular velocity:
///
/// ```text
/// left  = (linear - span * angular / 2) / radius
/// right = (linear + span * angular / 2) / radius
/// ```
///
/// # Errors
///
/// Returns [`DigError::InvalidGeometry`] when `geometry` is degenerate.
pub fn twist_to_wheel_speeds(
    linear: f64,
    angular: f64,
    geometry: DriveGeometry,
) -> Result<WheelSpeeds, DigError> {
    geometry.validate()?;

    let half_span = geometry.wheel_span * angular / 2.0;
    Ok(WheelSpeeds {
        left: (linear - half_span) / geometry.wheel_radius,
        right: (linear + half_span) / geometry.wheel_radius,
    })
}
