use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::viewport::Viewport;

/// Host input, delivered between ticks. Positions are viewport pixels, tilt
/// is in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    PointerMoved(Vec2),
    /// Every active touch point; only the first one steers.
    TouchMoved(Vec<Vec2>),
    Orientation {
        /// Left-right tilt.
        gamma: Option<f32>,
        /// Front-back tilt.
        beta: Option<f32>,
    },
    Resized(Viewport),
}
