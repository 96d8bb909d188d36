use std::io;

use blink_vision::LandmarkCountError;
use thiserror::Error;

/// Transient failure inside the landmark tracker. Logged, never fatal.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("no landmarks in frame")]
    NoLandmarks,
    #[error("tracker failed: {0}")]
    Failed(String),
}

#[derive(Debug, Error)]
pub enum SensorError {
    /// The tracker is configured for a different landmark model.
    #[error("landmark contract violated: {0}")]
    LandmarkCount(#[from] LandmarkCountError),
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("terminal i/o error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("camera initialization failed: {0}")]
    Camera(String),
    #[error("display initialization failed: {0}")]
    Display(#[source] RenderError),
    #[error("failed to spawn sensor thread: {0}")]
    SensorThread(#[source] io::Error),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error("sensor loop stopped: {0}")]
    Sensor(#[from] SensorError),
    #[error("interactive loop stopped: {0}")]
    Render(#[from] RenderError),
    #[error("sensor thread panicked")]
    SensorPanicked,
}
