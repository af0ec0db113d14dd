//! Wyrm core engine: platform-agnostic logic for follow-chains, head drivers,
//! wandering formations and heart episodes.
//!
//! The engine never reads a clock or talks to a window. The host passes in
//! timestamps and [`InputEvent`]s, calls [`Engine::frame`] once per display
//! refresh, and draws whatever [`Engine::render`] hands to its [`PoseSink`].

pub mod angle;
pub mod chain;
pub mod config;
pub mod driver;
pub mod engine;
pub mod error;
pub mod formation;
pub mod heart;
pub mod input;
pub mod render;
pub mod scheduler;
pub mod snapshot;
pub mod solo;
pub mod viewport;
pub mod wander;

pub use chain::{Chain, Segment, SegmentKind, SegmentPose};
pub use config::{EngineConfig, ProfileConfig, ProfileKind};
pub use driver::{DriverMode, HeadDriver, PermissionOutcome};
pub use engine::{Engine, Resize, Scene};
pub use error::{ConfigError, OrientationError};
pub use formation::{Dragon, Formation};
pub use heart::{HeartEpisode, HeartPhase, Side};
pub use input::InputEvent;
pub use render::{PoseSink, SegmentStroke};
pub use scheduler::FrameGate;
pub use snapshot::EngineSnapshot;
pub use viewport::Viewport;

pub use glam::Vec2;
