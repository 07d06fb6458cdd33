//! `digbot-beacon` – the hazard broadcaster.
//!
//! Holds one settable hazard pose (the excavation hole the robot must
//! never drive into), periodically re-emits it as a frame transform, and,
//! once localized, also emits a fixed 16-point ring point cloud around the
//! hazard origin each tick.
//!
//! # Modules
//!
//! - [`ring`] – generation of the fixed 16-point hazard ring.
//! - [`broadcaster`] – [`HazardBroadcaster`][broadcaster::HazardBroadcaster]:
//!   the Unset → Set state machine, the broadcast tick, and the localize
//!   service loop.

pub mod broadcaster;
pub mod ring;

pub use broadcaster::{BeaconConfig, HazardBroadcaster};
pub use ring::generate_ring;
