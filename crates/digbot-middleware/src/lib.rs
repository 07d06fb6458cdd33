//! `digbot-middleware` – in-process transport between the nodes.
//!
//! Routes data between the drivebase translator, the hazard broadcaster,
//! and the control loop without caring about the data's meaning.
//!
//! # Modules
//!
//! - [`bus`] – Typed, topic-based publish/subscribe event bus built on
//!   Tokio broadcast channels.
//! - [`service`] – Single request/response call primitive used for the
//!   hazard localize operation.  The response doubles as the delivery
//!   acknowledgement: it is only sent once the handler's side effects
//!   (the transform re-publish) are observable.

pub mod bus;
pub mod service;

pub use bus::{EventBus, Topic, TopicReceiver};
pub use service::{Responder, ServiceClient, ServiceServer, service_pair};
