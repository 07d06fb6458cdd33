//! `digbot-drive` – the differential-drive translator.
//!
//! Converts twist-shaped velocity commands (forward speed + yaw rate) into
//! the two independent tread angular velocities the drivebase actually
//! runs on.
//!
//! # Modules
//!
//! - [`kinematics`] – [`DriveGeometry`][kinematics::DriveGeometry] and the
//!   pure [`twist_to_wheel_speeds`][kinematics::twist_to_wheel_speeds]
//!   conversion.
//! - [`publisher`] – [`DrivebasePublisher`][publisher::DrivebasePublisher]:
//!   the subscribe/convert/publish shell over the event bus.

pub mod kinematics;
pub mod publisher;

pub use kinematics::{DriveGeometry, twist_to_wheel_speeds};
pub use publisher::DrivebasePublisher;
