//! [`JointLimits`] – validated per-joint position bounds.
//!
//! The limit tables come from the robot description at startup and are
//! fixed for the process lifetime.  Simulated integration clamps every
//! joint position into its `[lower, upper]` range.

use digbot_types::{DigError, Joint};

/// Lower/upper position bounds for every joint, in register-file order.
///
/// Construction validates the tables: every value must be finite and each
/// lower bound must not exceed its upper bound.  The array type already
/// fixes the length to [`Joint::COUNT`], so there is no runtime length
/// check to get wrong.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointLimits {
    lower: [f64; Joint::COUNT],
    upper: [f64; Joint::COUNT],
}

impl JointLimits {
    /// Build a validated limit table.
    ///
    /// # Errors
    ///
    /// Returns [`DigError::JointLimits`] when any bound is non-finite or a
    /// lower bound exceeds its upper bound.
    pub fn new(lower: [f64; Joint::COUNT], upper: [f64; Joint::COUNT]) -> Result<Self, DigError> {
        for joint in Joint::ALL {
            let (lo, hi) = (lower[joint.index()], upper[joint.index()]);
            if !lo.is_finite() || !hi.is_finite() {
                return Err(DigError::JointLimits(format!(
                    "{}: bounds must be finite, got [{lo}, {hi}]",
                    joint.name()
                )));
            }
            if lo > hi {
                return Err(DigError::JointLimits(format!(
                    "{}: lower bound {lo} exceeds upper bound {hi}",
                    joint.name()
                )));
            }
        }
        Ok(Self { lower, upper })
    }

    /// Unbounded limits for joints that have no meaningful travel range in
    /// simulation (e.g. continuously rotating treads).
    pub fn unbounded() -> Self {
        // f64::MAX rather than infinity so the table stays finite and
        // clamp() remains a no-op.
        Self {
            lower: [f64::MIN; Joint::COUNT],
            upper: [f64::MAX; Joint::COUNT],
        }
    }

    /// Lower bound for `joint`.
    pub fn lower(&self, joint: Joint) -> f64 {
        self.lower[joint.index()]
    }

    /// Upper bound for `joint`.
    pub fn upper(&self, joint: Joint) -> f64 {
        self.upper[joint.index()]
    }

    /// Clamp `position` into the `[lower, upper]` range of `joint`.
    pub fn clamp(&self, joint: Joint, position: f64) -> f64 {
        position.clamp(self.lower(joint), self.upper(joint))
    }
}
