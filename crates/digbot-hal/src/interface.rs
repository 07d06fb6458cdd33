//! [`JointInterface`] – the read/write cycle between the register file and
//! the robot.
//!
//! The governing loop drives the interface synchronously at a fixed rate:
//!
//! 1. [`JointInterface::read`] – populate the state registers, either from
//!    the sensor driver or from simulated integration.
//! 2. The loop computes and writes new command registers.
//! 3. [`JointInterface::write`] – forward the command registers to the
//!    actuator driver (real mode) and reset the cycle clock.
//!
//! In simulated mode joints track their commanded velocity with no
//! dynamics: `position += command * dt`, clamped to the joint's limits,
//! and `velocity = command`.

use std::time::Instant;

use digbot_types::{Actuation, DigError, Joint};
use tracing::trace;

use crate::limits::JointLimits;
use crate::registers::Registers;

/// Sensor driver seam: populates the state registers from real hardware.
///
/// Implementations are expected to fill position/velocity/effort for every
/// joint they know about via [`Registers::set_state`].
pub trait JointSensors: Send {
    /// Read current joint state into `registers`.
    ///
    /// # Errors
    ///
    /// Returns [`DigError::HardwareFault`] when the sensor bus cannot be
    /// read.  The interface propagates the error without retrying.
    fn read_state(&mut self, registers: &mut Registers) -> Result<(), DigError>;
}

/// Actuator driver seam: forwards the command registers to real hardware.
pub trait JointActuators: Send {
    /// Send the current command registers to the actuators.
    ///
    /// # Errors
    ///
    /// Returns [`DigError::HardwareFault`] when a command cannot be applied.
    fn write_commands(&mut self, registers: &Registers) -> Result<(), DigError>;
}

enum Backend {
    /// Real hardware behind the driver traits.
    Real {
        sensors: Box<dyn JointSensors>,
        actuators: Box<dyn JointActuators>,
    },
    /// No hardware: joint state is integrated from the commands directly.
    Simulated,
}

/// The hardware register interface handed to the governing control loop.
///
/// Owns the [`Registers`] exclusively; the loop accesses them only through
/// this type.
pub struct JointInterface {
    registers: Registers,
    limits: JointLimits,
    backend: Backend,
    /// End of the previous write cycle; baseline for the next read's dt.
    prev_time: Instant,
}

impl JointInterface {
    /// Interface over real hardware drivers.
    ///
    /// `limits` is already validated by [`JointLimits::new`]; it is kept for
    /// the lifetime of the interface.
    pub fn new_real(
        sensors: Box<dyn JointSensors>,
        actuators: Box<dyn JointActuators>,
        limits: JointLimits,
    ) -> Self {
        Self {
            registers: Registers::new(),
            limits,
            backend: Backend::Real { sensors, actuators },
            prev_time: Instant::now(),
        }
    }

    /// Simulated interface: state is integrated from the commands, no
    /// drivers involved.
    pub fn new_sim(limits: JointLimits) -> Self {
        Self {
            registers: Registers::new(),
            limits,
            backend: Backend::Simulated,
            prev_time: Instant::now(),
        }
    }

    /// The fixed `(name, actuation)` pairs this interface registers with the
    /// governing loop, in register-file order.
    pub fn registration(&self) -> [(&'static str, Actuation); Joint::COUNT] {
        Joint::ALL.map(|j| (j.name(), j.actuation()))
    }

    /// Populate the state registers for this cycle.
    ///
    /// # Errors
    ///
    /// Real mode propagates sensor driver faults; simulated mode cannot fail.
    pub fn read(&mut self) -> Result<(), DigError> {
        match &mut self.backend {
            Backend::Real { sensors, .. } => sensors.read_state(&mut self.registers),
            Backend::Simulated => {
                let dt = self.update_time();
                self.simulate(dt);
                Ok(())
            }
        }
    }

    /// Forward the command registers to the actuators and close the cycle.
    ///
    /// `prev_time` is reset unconditionally, even when the actuator write
    /// fails, so the next cycle's dt stays honest.
    pub fn write(&mut self) -> Result<(), DigError> {
        let result = match &mut self.backend {
            Backend::Real { actuators, .. } => actuators.write_commands(&self.registers),
            Backend::Simulated => Ok(()),
        };
        self.prev_time = Instant::now();
        result
    }

    /// Seconds elapsed since the end of the previous write cycle.
    ///
    /// Monotonic, so never negative.  The first cycle's baseline is the
    /// construction time.
    pub fn update_time(&self) -> f64 {
        self.prev_time.elapsed().as_secs_f64()
    }

    /// Write the command register for `joint`.
    pub fn set_command(&mut self, joint: Joint, value: f64) {
        self.registers.set_command(joint, value);
    }

    /// Read-only view of the register file.
    pub fn registers(&self) -> &Registers {
        &self.registers
    }

    // Simulated joints track commanded velocity with no dynamics.
    fn simulate(&mut self, dt: f64) {
        for joint in Joint::ALL {
            let command = self.registers.command(joint);
            let position = self
                .limits
                .clamp(joint, self.registers.position(joint) + command * dt);
            self.registers.set_state(joint, position, command, 0.0);
        }
        trace!(dt, "simulated joint integration step");
    }
}
