use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// The seven actuator roles managed by the hardware interface.
///
/// The ordinal order is stable for the lifetime of the process and is the
/// index order of the register file in `digbot-hal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Joint {
    LeftTread,
    RightTread,
    Bin,
    Turntable,
    LowerArm,
    UpperArm,
    Scoop,
}

impl Joint {
    /// Fixed number of joints; the register file has exactly this many slots.
    pub const COUNT: usize = 7;

    /// All joints in register-file index order.
    pub const ALL: [Joint; Joint::COUNT] = [
        Joint::LeftTread,
        Joint::RightTread,
        Joint::Bin,
        Joint::Turntable,
        Joint::LowerArm,
        Joint::UpperArm,
        Joint::Scoop,
    ];

    /// Register-file slot for this joint.
    pub fn index(self) -> usize {
        match self {
            Joint::LeftTread => 0,
            Joint::RightTread => 1,
            Joint::Bin => 2,
            Joint::Turntable => 3,
            Joint::LowerArm => 4,
            Joint::UpperArm => 5,
            Joint::Scoop => 6,
        }
    }

    /// Stable registration name exposed to the governing control loop.
    pub fn name(self) -> &'static str {
        match self {
            Joint::LeftTread => "left_tread",
            Joint::RightTread => "right_tread",
            Joint::Bin => "bin",
            Joint::Turntable => "turntable",
            Joint::LowerArm => "lower_arm",
            Joint::UpperArm => "upper_arm",
            Joint::Scoop => "scoop",
        }
    }

    /// How this joint's command register is interpreted: the treads are
    /// velocity-controlled, everything else is effort-controlled.
    pub fn actuation(self) -> Actuation {
        match self {
            Joint::LeftTread | Joint::RightTread => Actuation::Velocity,
            _ => Actuation::Effort,
        }
    }
}

/// Command-register interpretation for a joint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Actuation {
    /// Command is a target angular velocity (rad/s).
    Velocity,
    /// Command is a motor effort.
    Effort,
}

// ───────────────────────────────────────────────────────────────────────────
// Geometry
// ───────────────────────────────────────────────────────────────────────────

/// A 3-D translation vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}

/// A quaternion rotation (w, x, y, z convention).  Carried verbatim between
/// messages; no rotation algebra happens in this workspace.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Quaternion {
    pub fn new(w: f64, x: f64, y: f64, z: f64) -> Self {
        Self { w, x, y, z }
    }

    /// The identity rotation (no rotation).
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 0.0)
    }
}

/// One point of a published point cloud.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointXyz {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

// ───────────────────────────────────────────────────────────────────────────
// Messages
// ───────────────────────────────────────────────────────────────────────────

/// Inbound drivebase command: forward speed plus yaw rate
/// (the `linear.x` / `angular.z` pair of a twist).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VelocityCommand {
    /// Forward velocity in m/s.
    pub linear: f64,
    /// Yaw rate in rad/s.
    pub angular: f64,
}

/// Outbound drivebase command: independent wheel angular velocities in rad/s.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WheelSpeeds {
    pub left: f64,
    pub right: f64,
}

/// A stamped transform relating a child frame to its parent frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameTransform {
    pub parent_frame: String,
    pub child_frame: String,
    pub translation: Vec3,
    pub rotation: Quaternion,
    pub stamp: DateTime<Utc>,
}

/// An unordered point cloud expressed in `frame_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointCloud {
    pub frame_id: String,
    pub points: Vec<PointXyz>,
}

/// Localize request for the hazard broadcaster.
///
/// Deliberately carries no z: the broadcaster always substitutes its
/// configured height constant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoseRequest {
    pub x: f64,
    pub y: f64,
    pub rotation: Quaternion,
}

// ───────────────────────────────────────────────────────────────────────────
// Event bus wrapper
// ───────────────────────────────────────────────────────────────────────────

/// Unified event wrapper for the internal event bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// e.g. "digbot-drive" or "digbot-beacon"
    pub source: String,
    pub payload: EventPayload,
}

impl Event {
    /// Build an event stamped now with a fresh id.
    pub fn new(source: impl Into<String>, payload: EventPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            source: source.into(),
            payload,
        }
    }
}

/// Variants of data routed over the internal event bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventPayload {
    /// Inbound twist-shaped drivebase command.
    Velocity(VelocityCommand),
    /// Translated per-wheel drivebase command.
    Wheels(WheelSpeeds),
    /// A frame transform broadcast.
    Transform(FrameTransform),
    /// A point-cloud publish.
    Cloud(PointCloud),
    /// A component fault surfaced on the alerts lane.
    Fault {
        component: String,
        code: u32,
        message: String,
    },
}

// ───────────────────────────────────────────────────────────────────────────
// Errors
// ───────────────────────────────────────────────────────────────────────────

/// Global error type spanning geometry validation, hardware faults, and
/// middleware failures.
#[derive(Error, Debug)]
pub enum DigError {
    #[error("Invalid drive geometry: {0}")]
    InvalidGeometry(String),

    #[error("Invalid joint limits: {0}")]
    JointLimits(String),

    #[error("Hardware fault on {component}: {details}")]
    HardwareFault { component: String, details: String },

    #[error("Event bus error: {0}")]
    Channel(String),

    #[error("Service call error: {0}")]
    Service(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joint_indices_cover_all_slots_in_order() {
        for (expected, joint) in Joint::ALL.iter().enumerate() {
            assert_eq!(joint.index(), expected);
        }
    }

    #[test]
    fn treads_are_velocity_controlled_rest_are_effort() {
        assert_eq!(Joint::LeftTread.actuation(), Actuation::Velocity);
        assert_eq!(Joint::RightTread.actuation(), Actuation::Velocity);
        for joint in [
            Joint::Bin,
            Joint::Turntable,
            Joint::LowerArm,
            Joint::UpperArm,
            Joint::Scoop,
        ] {
            assert_eq!(joint.actuation(), Actuation::Effort);
        }
    }

    #[test]
    fn joint_names_are_unique() {
        let mut names: Vec<&str> = Joint::ALL.iter().map(|j| j.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Joint::COUNT);
    }

    #[test]
    fn velocity_command_roundtrip() {
        let cmd = VelocityCommand {
            linear: 1.5,
            angular: -0.3,
        };
        let json = serde_json::to_string(&cmd).unwrap();
        let back: VelocityCommand = serde_json::from_str(&json).unwrap();
        assert_eq!(cmd, back);
    }

    #[test]
    fn frame_transform_roundtrip() {
        let tf = FrameTransform {
            parent_frame: "map".to_string(),
            child_frame: "hazard".to_string(),
            translation: Vec3::new(3.0, 4.0, -0.16),
            rotation: Quaternion::identity(),
            stamp: Utc::now(),
        };
        let json = serde_json::to_string(&tf).unwrap();
        let back: FrameTransform = serde_json::from_str(&json).unwrap();
        assert_eq!(tf.translation, back.translation);
        assert_eq!(tf.child_frame, back.child_frame);
    }

    #[test]
    fn event_roundtrip() {
        let event = Event::new(
            "digbot-drive",
            EventPayload::Wheels(WheelSpeeds {
                left: -1.0,
                right: 1.0,
            }),
        );
        let json = serde_json::to_string(&event).unwrap();
        let back: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(event.id, back.id);
        assert_eq!(event.source, back.source);
    }

    #[test]
    fn dig_error_display() {
        let err = DigError::InvalidGeometry("wheel radius must be positive".to_string());
        assert!(err.to_string().contains("wheel radius"));

        let err2 = DigError::HardwareFault {
            component: "scoop".to_string(),
            details: "overcurrent".to_string(),
        };
        assert!(err2.to_string().contains("scoop"));
    }
}
