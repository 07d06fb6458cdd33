//! Typed, topic-based publish/subscribe event bus.
//!
//! Uses [`tokio::sync::broadcast`] channels under the hood so that every
//! subscriber receives every message without any single subscriber blocking
//! the others.
//!
//! # Topics
//!
//! Traffic is partitioned into five [`Topic`] lanes so components only
//! receive the messages they care about:
//!
//! | Topic | Typical traffic |
//! |---|---|
//! | [`Topic::VelocityCommands`] | Twist-shaped drivebase commands from the operator or planner |
//! | [`Topic::WheelCommands`] | Translated `[left, right]` wheel velocities |
//! | [`Topic::Transforms`] | Frame transform broadcasts |
//! | [`Topic::PointClouds`] | Hazard ring point clouds |
//! | [`Topic::SystemAlerts`] | Component faults and shutdown notices |

use digbot_types::{DigError, Event};
use tokio::sync::broadcast;
use tracing::warn;

/// Default channel capacity (number of buffered events before old ones are
/// dropped for slow subscribers).
const DEFAULT_CAPACITY: usize = 256;

/// Enumeration of all first-class routing topics on the event bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Inbound drivebase commands (linear + angular velocity).
    VelocityCommands,
    /// Translated per-wheel velocity pairs consumed by the control loop.
    WheelCommands,
    /// Periodic frame transform broadcasts.
    Transforms,
    /// Hazard ring point clouds, published once localized.
    PointClouds,
    /// Component faults and shutdown notices.
    SystemAlerts,
}

/// Shared event bus.  Clone it cheaply – all clones share the same underlying
/// broadcast channels.
#[derive(Clone, Debug)]
pub struct EventBus {
    velocity_commands: broadcast::Sender<Event>,
    wheel_commands: broadcast::Sender<Event>,
    transforms: broadcast::Sender<Event>,
    point_clouds: broadcast::Sender<Event>,
    system_alerts: broadcast::Sender<Event>,
}

impl EventBus {
    /// Create a new bus with the given channel capacity.
    ///
    /// The `capacity` is applied to every topic channel independently.
    pub fn new(capacity: usize) -> Self {
        let (velocity_commands, _) = broadcast::channel(capacity);
        let (wheel_commands, _) = broadcast::channel(capacity);
        let (transforms, _) = broadcast::channel(capacity);
        let (point_clouds, _) = broadcast::channel(capacity);
        let (system_alerts, _) = broadcast::channel(capacity);
        Self {
            velocity_commands,
            wheel_commands,
            transforms,
            point_clouds,
            system_alerts,
        }
    }

    /// Publish `event` to the given [`Topic`] channel.
    ///
    /// Returns the number of active receivers that were handed the event, or
    /// [`DigError::Channel`] when no subscriber is currently listening on the
    /// topic.
    pub fn publish_to(&self, topic: Topic, event: Event) -> Result<usize, DigError> {
        self.topic_sender(topic).send(event).map_err(|_| {
            DigError::Channel(format!("no subscribers for topic {topic:?}"))
        })
    }

    /// Subscribe to a specific [`Topic`] channel.
    ///
    /// The returned [`TopicReceiver`] yields only events published to that
    /// topic.
    pub fn subscribe_to(&self, topic: Topic) -> TopicReceiver {
        TopicReceiver {
            topic,
            receiver: self.topic_sender(topic).subscribe(),
        }
    }

    fn topic_sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::VelocityCommands => &self.velocity_commands,
            Topic::WheelCommands => &self.wheel_commands,
            Topic::Transforms => &self.transforms,
            Topic::PointClouds => &self.point_clouds,
            Topic::SystemAlerts => &self.system_alerts,
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// An async receiver bound to a single [`Topic`] channel.
///
/// Obtained via [`EventBus::subscribe_to`].
pub struct TopicReceiver {
    topic: Topic,
    receiver: broadcast::Receiver<Event>,
}

impl TopicReceiver {
    /// Wait for the next event on this topic.
    ///
    /// Returns:
    /// * `Ok(event)` – a successfully received event.
    /// * `Err(broadcast::error::RecvError::Lagged(n))` – the subscriber fell
    ///   behind and `n` messages were dropped.  The lag is logged here; the
    ///   caller decides whether to continue or abort.
    /// * `Err(broadcast::error::RecvError::Closed)` – the bus has shut down.
    pub async fn recv(&mut self) -> Result<Event, broadcast::error::RecvError> {
        match self.receiver.recv().await {
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                warn!(topic = ?self.topic, missed, "subscriber lagged, events dropped");
                Err(broadcast::error::RecvError::Lagged(missed))
            }
            other => other,
        }
    }

    /// Non-blocking receive, used by fixed-rate loops that only want the
    /// freshest pending message.
    pub fn try_recv(&mut self) -> Result<Event, broadcast::error::TryRecvError> {
        self.receiver.try_recv()
    }

    /// The [`Topic`] this receiver is bound to.
    pub fn topic(&self) -> Topic {
        self.topic
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use digbot_types::{EventPayload, VelocityCommand, WheelSpeeds};

    fn velocity_event(linear: f64, angular: f64) -> Event {
        Event::new(
            "test",
            EventPayload::Velocity(VelocityCommand { linear, angular }),
        )
    }

    #[tokio::test]
    async fn publish_and_receive() -> Result<(), Box<dyn std::error::Error>> {
        let bus = EventBus::default();
        let mut rx = bus.subscribe_to(Topic::VelocityCommands);

        let event = velocity_event(1.0, 0.0);
        bus.publish_to(Topic::VelocityCommands, event.clone())?;

        let received = rx.recv().await?;
        assert_eq!(received.id, event.id);
        Ok(())
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() -> Result<(), Box<dyn std::error::Error>> {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe_to(Topic::WheelCommands);
        let mut rx2 = bus.subscribe_to(Topic::WheelCommands);

        let event = Event::new(
            "digbot-drive",
            EventPayload::Wheels(WheelSpeeds {
                left: 0.5,
                right: 0.5,
            }),
        );
        bus.publish_to(Topic::WheelCommands, event.clone())?;

        assert_eq!(rx1.recv().await?.id, event.id);
        assert_eq!(rx2.recv().await?.id, event.id);
        Ok(())
    }

    /// A subscriber on one topic must never see traffic from another.
    #[tokio::test]
    async fn topics_are_isolated() -> Result<(), Box<dyn std::error::Error>> {
        let bus = EventBus::default();
        let mut transforms = bus.subscribe_to(Topic::Transforms);
        let _wheels = bus.subscribe_to(Topic::WheelCommands);

        bus.publish_to(
            Topic::WheelCommands,
            Event::new(
                "digbot-drive",
                EventPayload::Wheels(WheelSpeeds {
                    left: 1.0,
                    right: 1.0,
                }),
            ),
        )?;

        let result = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            transforms.recv(),
        )
        .await;
        assert!(
            result.is_err(),
            "Transforms subscriber must not receive a WheelCommands event"
        );
        Ok(())
    }

    #[test]
    fn publish_with_no_subscribers_returns_error() {
        let bus = EventBus::default();
        let result = bus.publish_to(Topic::PointClouds, velocity_event(0.0, 0.0));
        assert!(matches!(result, Err(DigError::Channel(_))));
    }

    /// Flooding a low-capacity channel while a subscriber sleeps must produce
    /// a `Lagged` error rather than panicking or blocking.
    #[tokio::test]
    async fn slow_subscriber_observes_lag() {
        const CAPACITY: usize = 8;
        let bus = EventBus::new(CAPACITY);
        let mut slow = bus.subscribe_to(Topic::VelocityCommands);

        for i in 0..100 {
            let _ = bus.publish_to(Topic::VelocityCommands, velocity_event(i as f64, 0.0));
        }

        let result = slow.recv().await;
        assert!(
            matches!(result, Err(broadcast::error::RecvError::Lagged(_))),
            "expected Lagged error, got: {result:?}"
        );
    }

    #[test]
    fn try_recv_on_empty_topic_is_empty() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe_to(Topic::SystemAlerts);
        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
        assert_eq!(rx.topic(), Topic::SystemAlerts);
    }
}
