//! [`DrivebasePublisher`] – subscribe/convert/publish shell.
//!
//! Listens on [`Topic::VelocityCommands`], converts every message through
//! [`twist_to_wheel_speeds`], and publishes the resulting pair on
//! [`Topic::WheelCommands`].  One message in, one message out: no
//! debouncing, no rate limiting, no smoothing.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use digbot_middleware::{EventBus, Topic};
use digbot_types::{Event, EventPayload};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::kinematics::{DriveGeometry, twist_to_wheel_speeds};

/// Event source tag for everything this node publishes.
const SOURCE: &str = "digbot-drive";

/// The drivebase translator node.
pub struct DrivebasePublisher {
    bus: EventBus,
    geometry: DriveGeometry,
}

impl DrivebasePublisher {
    /// Build the node.  `geometry` is validated at construction via
    /// [`DriveGeometry::new`] by the caller.
    pub fn new(bus: EventBus, geometry: DriveGeometry) -> Self {
        Self { bus, geometry }
    }

    /// Run until `shutdown` flips or the bus closes.
    ///
    /// Lagged receivers skip ahead and continue (the bus logs the lag);
    /// conversion failures surface as `Fault` events on
    /// [`Topic::SystemAlerts`] without stopping the loop.
    pub async fn run(self, shutdown: Arc<AtomicBool>) {
        let mut commands = self.bus.subscribe_to(Topic::VelocityCommands);

        while !shutdown.load(Ordering::Relaxed) {
            match commands.recv().await {
                Ok(event) => self.handle(event),
                Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break,
            }
        }
        debug!("drivebase publisher stopped");
    }

    /// Translate one inbound event.  Non-velocity payloads on the command
    /// topic are ignored.
    fn handle(&self, event: Event) {
        let EventPayload::Velocity(cmd) = event.payload else {
            return;
        };

        match twist_to_wheel_speeds(cmd.linear, cmd.angular, self.geometry) {
            Ok(speeds) => {
                debug!(
                    linear = cmd.linear,
                    angular = cmd.angular,
                    left = speeds.left,
                    right = speeds.right,
                    "translated velocity command"
                );
                // No subscriber on the wheel topic just means nobody is
                // listening yet; not worth more than a debug line.
                if self
                    .bus
                    .publish_to(Topic::WheelCommands, Event::new(SOURCE, EventPayload::Wheels(speeds)))
                    .is_err()
                {
                    debug!("no subscribers for wheel commands");
                }
            }
            Err(err) => {
                warn!(%err, "velocity command rejected");
                let _ = self.bus.publish_to(
                    Topic::SystemAlerts,
                    Event::new(
                        SOURCE,
                        EventPayload::Fault {
                            component: "drivebase".to_string(),
                            code: 1,
                            message: err.to_string(),
                        },
                    ),
                );
            }
        }
    }
}
