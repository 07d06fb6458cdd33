//! [`HazardBroadcaster`] – the Unset → Set hazard state machine.
//!
//! In **Unset** state every broadcast tick emits only the parent→hazard
//! transform at its default pose (zero translation, identity rotation).
//! A localize request moves the broadcaster to the terminal **Set** state:
//! from then on each tick also emits the hazard ring point cloud, and
//! there is no way back to Unset for the life of the process.
//!
//! The localize caller's guarantee that the transform is observable before
//! the call completes comes from the service acknowledgement: the response
//! is sent only after the transform has been re-published, replacing the
//! fixed 100 ms sleep of earlier event-loop designs.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::Utc;
use digbot_middleware::{EventBus, ServiceServer, Topic};
use digbot_types::{
    Event, EventPayload, FrameTransform, PointCloud, PoseRequest, Quaternion, Vec3,
};
use tracing::{debug, info, warn};

use crate::ring::generate_ring;

/// Event source tag for everything this node publishes.
const SOURCE: &str = "digbot-beacon";

/// Startup configuration for the broadcaster.
#[derive(Debug, Clone)]
pub struct BeaconConfig {
    /// Frame the hazard transform hangs off (e.g. "map").
    pub parent_frame: String,
    /// The hazard's own frame name.
    pub hazard_frame: String,
    /// Diameter of the hazard ring in meters.
    pub diameter: f64,
    /// Fixed z offset of the hazard origin.  Localize requests never carry
    /// z; this constant always wins.
    pub height: f64,
    /// Broadcast rate in Hz.
    pub hz: f64,
    /// Name the localize endpoint is advertised under.
    pub service_name: String,
}

/// The hazard pose, tagged by whether a localize request has arrived yet.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Hazard {
    /// No localize request yet: broadcast the default pose, no cloud.
    Unset,
    /// Localized.  Terminal: persists until process end.
    Set {
        translation: Vec3,
        rotation: Quaternion,
    },
}

/// The hazard broadcaster node.
pub struct HazardBroadcaster {
    bus: EventBus,
    config: BeaconConfig,
    hazard: Hazard,
}

impl HazardBroadcaster {
    pub fn new(bus: EventBus, config: BeaconConfig) -> Self {
        Self {
            bus,
            config,
            hazard: Hazard::Unset,
        }
    }

    /// One broadcast tick: always the transform, plus the ring cloud once
    /// localized.
    pub fn broadcast(&self) {
        self.publish_transform();

        if matches!(self.hazard, Hazard::Set { .. }) {
            let cloud = PointCloud {
                frame_id: self.config.hazard_frame.clone(),
                points: generate_ring(self.config.diameter / 2.0),
            };
            if self
                .bus
                .publish_to(Topic::PointClouds, Event::new(SOURCE, EventPayload::Cloud(cloud)))
                .is_err()
            {
                debug!("no subscribers for the hazard cloud");
            }
        }
    }

    /// Apply a localize request: translation becomes `(x, y, height)`, where
    /// the height is the configured constant and never a request field.
    /// The rotation is copied verbatim, and the transform is re-published
    /// immediately so the acknowledgement implies observability.
    ///
    /// Always succeeds; the request is not validated.
    pub fn localize(&mut self, request: PoseRequest) {
        self.hazard = Hazard::Set {
            translation: Vec3::new(request.x, request.y, self.config.height),
            rotation: request.rotation,
        };
        info!(
            x = request.x,
            y = request.y,
            frame = %self.config.hazard_frame,
            "hazard localized"
        );
        self.publish_transform();
    }

    /// Run the broadcast/serve loop until `shutdown` flips.
    ///
    /// Single governing loop: localize requests and broadcast ticks are
    /// interleaved on one task, so the shared hazard state is never touched
    /// concurrently.
    pub async fn run(
        mut self,
        mut localize_requests: ServiceServer<PoseRequest, bool>,
        shutdown: Arc<AtomicBool>,
    ) {
        let period = if self.config.hz.is_finite() && self.config.hz > 0.0 {
            Duration::from_secs_f64(1.0 / self.config.hz)
        } else {
            warn!(hz = self.config.hz, "invalid rate, falling back to 5 Hz");
            Duration::from_millis(200)
        };
        let mut ticks = tokio::time::interval(period);
        info!(service = %self.config.service_name, "localize service open");

        while !shutdown.load(Ordering::Relaxed) {
            tokio::select! {
                _ = ticks.tick() => self.broadcast(),
                request = localize_requests.next() => match request {
                    Some((pose, responder)) => {
                        self.localize(pose);
                        // The transform is on the wire; complete the call.
                        responder.respond(true);
                    }
                    None => break,
                },
            }
        }
        debug!("hazard broadcaster stopped");
    }

    fn publish_transform(&self) {
        let (translation, rotation) = match self.hazard {
            Hazard::Unset => (Vec3::zero(), Quaternion::identity()),
            Hazard::Set {
                translation,
                rotation,
            } => (translation, rotation),
        };
        let transform = FrameTransform {
            parent_frame: self.config.parent_frame.clone(),
            child_frame: self.config.hazard_frame.clone(),
            translation,
            rotation,
            stamp: Utc::now(),
        };
        if self
            .bus
            .publish_to(
                Topic::Transforms,
                Event::new(SOURCE, EventPayload::Transform(transform)),
            )
            .is_err()
        {
            debug!("no subscribers for the hazard transform");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use digbot_middleware::service_pair;

    fn test_config() -> BeaconConfig {
        BeaconConfig {
            parent_frame: "map".to_string(),
            hazard_frame: "hazard".to_string(),
            diameter: 1.5,
            height: -0.16,
            hz: 5.0,
            service_name: "localize_hazard".to_string(),
        }
    }

    fn expect_transform(event: Event) -> FrameTransform {
        match event.payload {
            EventPayload::Transform(tf) => tf,
            other => panic!("expected transform, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unset_broadcast_emits_transform_but_no_cloud() {
        let bus = EventBus::default();
        let mut transforms = bus.subscribe_to(Topic::Transforms);
        let mut clouds = bus.subscribe_to(Topic::PointClouds);

        let broadcaster = HazardBroadcaster::new(bus.clone(), test_config());
        broadcaster.broadcast();

        let tf = expect_transform(transforms.try_recv().unwrap());
        assert_eq!(tf.parent_frame, "map");
        assert_eq!(tf.child_frame, "hazard");
        assert_eq!(tf.translation, Vec3::zero());
        assert_eq!(tf.rotation, Quaternion::identity());

        assert!(clouds.try_recv().is_err(), "no cloud before localize");
    }

    #[tokio::test]
    async fn localize_overrides_z_with_configured_height() {
        let bus = EventBus::default();
        let mut transforms = bus.subscribe_to(Topic::Transforms);

        let mut broadcaster = HazardBroadcaster::new(bus.clone(), test_config());
        broadcaster.localize(PoseRequest {
            x: 3.0,
            y: 4.0,
            rotation: Quaternion::new(0.0, 0.0, 0.0, 1.0),
        });

        // localize itself re-publishes the transform.
        let tf = expect_transform(transforms.try_recv().unwrap());
        assert_eq!(tf.translation, Vec3::new(3.0, 4.0, -0.16));
        assert_eq!(tf.rotation, Quaternion::new(0.0, 0.0, 0.0, 1.0));
    }

    #[tokio::test]
    async fn set_broadcast_emits_ring_every_tick() {
        let bus = EventBus::default();
        let mut clouds = bus.subscribe_to(Topic::PointClouds);
        let mut transforms = bus.subscribe_to(Topic::Transforms);

        let mut broadcaster = HazardBroadcaster::new(bus.clone(), test_config());
        broadcaster.localize(PoseRequest {
            x: 3.0,
            y: 4.0,
            rotation: Quaternion::identity(),
        });
        let _ = transforms.try_recv();

        for _ in 0..3 {
            broadcaster.broadcast();
            let event = clouds.try_recv().expect("a cloud per tick once set");
            let EventPayload::Cloud(cloud) = event.payload else {
                panic!("expected cloud");
            };
            assert_eq!(cloud.frame_id, "hazard");
            assert_eq!(cloud.points.len(), 16);
            let radius = test_config().diameter / 2.0;
            for p in &cloud.points {
                let dist = (p.x * p.x + p.y * p.y).sqrt();
                assert!((dist - radius).abs() < 1e-9);
                assert_eq!(p.z, 0.0);
            }
            let _ = transforms.try_recv();
        }
    }

    #[tokio::test]
    async fn localize_call_resolves_after_transform_is_observable() {
        let bus = EventBus::default();
        let mut transforms = bus.subscribe_to(Topic::Transforms);
        let (client, server) = service_pair::<PoseRequest, bool>();
        let shutdown = Arc::new(AtomicBool::new(false));

        let broadcaster = HazardBroadcaster::new(bus.clone(), test_config());
        tokio::spawn(broadcaster.run(server, shutdown.clone()));

        let accepted = client
            .call(PoseRequest {
                x: 1.0,
                y: 2.0,
                rotation: Quaternion::identity(),
            })
            .await
            .unwrap();
        assert!(accepted, "localize always reports success");

        // The re-published transform must already be buffered when the call
        // returns; no sleep needed.
        let mut saw_localized = false;
        while let Ok(event) = transforms.try_recv() {
            let tf = expect_transform(event);
            if tf.translation == Vec3::new(1.0, 2.0, -0.16) {
                saw_localized = true;
            }
        }
        assert!(saw_localized, "transform must be observable before the ack");

        shutdown.store(true, Ordering::Relaxed);
    }

    #[tokio::test]
    async fn run_loop_broadcasts_at_rate() {
        let bus = EventBus::default();
        let mut transforms = bus.subscribe_to(Topic::Transforms);
        let (_client, server) = service_pair::<PoseRequest, bool>();
        let shutdown = Arc::new(AtomicBool::new(false));

        let mut config = test_config();
        config.hz = 100.0;
        let broadcaster = HazardBroadcaster::new(bus.clone(), config);
        tokio::spawn(broadcaster.run(server, shutdown.clone()));

        for _ in 0..3 {
            let event = tokio::time::timeout(Duration::from_secs(1), transforms.recv())
                .await
                .expect("periodic transform must arrive")
                .unwrap();
            expect_transform(event);
        }
        shutdown.store(true, Ordering::Relaxed);
    }
}
