//! `digbot-hal` – the hardware register interface.
//!
//! A fixed 7-slot register file (command / position / velocity / effort per
//! joint) exchanged with a governing control loop each cycle.  The loop
//! writes commands, calls [`JointInterface::read`] before its update and
//! [`JointInterface::write`] after it; the interface moves values between
//! the registers and either real sensor/actuator drivers or a simulated
//! integrator.
//!
//! # Modules
//!
//! - [`limits`] – [`JointLimits`][limits::JointLimits]: validated per-joint
//!   position bounds used to clamp simulated integration.
//! - [`registers`] – [`Registers`][registers::Registers]: the
//!   struct-of-arrays register file, indexed by [`Joint`][digbot_types::Joint].
//! - [`interface`] – [`JointInterface`][interface::JointInterface]: the
//!   read/write cycle plus the [`JointSensors`][interface::JointSensors] and
//!   [`JointActuators`][interface::JointActuators] driver traits.

pub mod interface;
pub mod limits;
pub mod registers;

pub use interface::{JointActuators, JointInterface, JointSensors};
pub use limits::JointLimits;
pub use registers::Registers;
