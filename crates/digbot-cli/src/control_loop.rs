//! The fixed-rate hardware cycle.
//!
//! Plays the role the external controller manager played for the register
//! file: each tick it calls [`JointInterface::read`], maps the freshest
//! wheel command into the tread command registers, and calls
//! [`JointInterface::write`].  All register access happens on this one
//! task.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use digbot_hal::JointInterface;
use digbot_middleware::{EventBus, Topic, TopicReceiver};
use digbot_types::{Event, EventPayload, Joint, WheelSpeeds};
use tracing::{debug, error, warn};

/// Event source tag for faults raised by the cycle.
const SOURCE: &str = "digbot-control";

/// The read → apply → write cycle driver.
pub struct ControlLoop {
    interface: JointInterface,
    bus: EventBus,
    wheel_commands: TopicReceiver,
    rate_hz: f64,
}

impl ControlLoop {
    pub fn new(interface: JointInterface, bus: EventBus, rate_hz: f64) -> Self {
        let wheel_commands = bus.subscribe_to(Topic::WheelCommands);
        Self {
            interface,
            bus,
            wheel_commands,
            rate_hz,
        }
    }

    /// Run until `shutdown` flips; returns the interface so callers can
    /// inspect the final register state.
    pub async fn run(mut self, shutdown: Arc<AtomicBool>) -> JointInterface {
        let period = if self.rate_hz.is_finite() && self.rate_hz > 0.0 {
            Duration::from_secs_f64(1.0 / self.rate_hz)
        } else {
            warn!(
                rate_hz = self.rate_hz,
                "invalid control rate, falling back to 50 Hz"
            );
            Duration::from_millis(20)
        };
        let mut ticks = tokio::time::interval(period);

        while !shutdown.load(Ordering::Relaxed) {
            ticks.tick().await;
            self.cycle();
        }
        debug!("control loop stopped");
        self.interface
    }

    /// One hardware cycle.  Driver faults are surfaced as alerts and the
    /// loop keeps running; there is no retry logic.
    fn cycle(&mut self) {
        if let Err(err) = self.interface.read() {
            error!(%err, "joint state read failed");
            self.raise_fault(err.to_string());
        }

        if let Some(speeds) = self.latest_wheel_command() {
            self.interface.set_command(Joint::LeftTread, speeds.left);
            self.interface.set_command(Joint::RightTread, speeds.right);
        }

        if let Err(err) = self.interface.write() {
            error!(%err, "joint command write failed");
            self.raise_fault(err.to_string());
        }
    }

    /// Drain the wheel topic and keep only the freshest command; a control
    /// cycle always acts on the latest request, not a backlog.
    fn latest_wheel_command(&mut self) -> Option<WheelSpeeds> {
        let mut latest = None;
        while let Ok(event) = self.wheel_commands.try_recv() {
            if let EventPayload::Wheels(speeds) = event.payload {
                latest = Some(speeds);
            }
        }
        latest
    }

    fn raise_fault(&self, message: String) {
        let _ = self.bus.publish_to(
            Topic::SystemAlerts,
            Event::new(
                SOURCE,
                EventPayload::Fault {
                    component: "joint_interface".to_string(),
                    code: 2,
                    message,
                },
            ),
        );
    }
}
