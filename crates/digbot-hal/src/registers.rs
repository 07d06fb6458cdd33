//! [`Registers`] – the per-joint command/state register file.
//!
//! Four parallel fixed-size arrays indexed by joint ordinal.  `command` is
//! externally written and internally read; `position`, `velocity`, and
//! `effort` are internally written and externally read.  The register file
//! is owned exclusively by the [`JointInterface`][crate::JointInterface];
//! the governing loop only ever touches it through that interface.

use digbot_types::Joint;

/// The command/position/velocity/effort register file.
///
/// All registers start at zero.  Indices are stable for the process
/// lifetime ([`Joint::index`]).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Registers {
    command: [f64; Joint::COUNT],
    position: [f64; Joint::COUNT],
    velocity: [f64; Joint::COUNT],
    effort: [f64; Joint::COUNT],
}

impl Registers {
    /// A zeroed register file.
    pub fn new() -> Self {
        Self::default()
    }

    /// Commanded value for `joint` (velocity for treads, effort otherwise).
    pub fn command(&self, joint: Joint) -> f64 {
        self.command[joint.index()]
    }

    /// Write the command register for `joint`.  Called by the governing
    /// loop before each cycle.
    pub fn set_command(&mut self, joint: Joint, value: f64) {
        self.command[joint.index()] = value;
    }

    /// Most recently read position of `joint`.
    pub fn position(&self, joint: Joint) -> f64 {
        self.position[joint.index()]
    }

    /// Most recently read velocity of `joint`.
    pub fn velocity(&self, joint: Joint) -> f64 {
        self.velocity[joint.index()]
    }

    /// Most recently read effort of `joint`.
    pub fn effort(&self, joint: Joint) -> f64 {
        self.effort[joint.index()]
    }

    /// Overwrite the state registers for `joint`.  Called by sensor drivers
    /// and the simulated integrator, never by the governing loop.
    pub fn set_state(&mut self, joint: Joint, position: f64, velocity: f64, effort: f64) {
        let i = joint.index();
        self.position[i] = position;
        self.velocity[i] = velocity;
        self.effort[i] = effort;
    }
}
