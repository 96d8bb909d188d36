//! Plays back a recorded landmark session, one JSON object per line:
//! `{"landmarks": [[x, y], ...]}`, or `{"landmarks": null}` for a frame
//! with no face.

use std::collections::VecDeque;
use std::fs;
use std::path::Path;
use std::time::Duration;

use blink_vision::Point2D;
use serde::Deserialize;
use tracing::{info, warn};

use super::{FaceRegion, FramePacer, FrameSource, LandmarkTracker};
use crate::error::{StartupError, TrackerError};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RecordedFrame {
    pub landmarks: Option<Vec<Point2D>>,
}

pub struct ReplayCamera {
    frames: VecDeque<RecordedFrame>,
    pacer: FramePacer,
}

impl ReplayCamera {
    pub fn open(path: &Path, frame_period: Duration) -> Result<Self, StartupError> {
        let contents = fs::read_to_string(path)
            .map_err(|err| StartupError::Camera(format!("{}: {err}", path.display())))?;
        let camera = Self::from_lines(&contents, frame_period);
        info!(path = %path.display(), frames = camera.remaining(), "replay session loaded");
        Ok(camera)
    }

    /// Malformed lines are skipped; blank lines are ignored.
    pub fn from_lines(contents: &str, frame_period: Duration) -> Self {
        let frames = contents
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .filter_map(|(index, line)| match serde_json::from_str::<RecordedFrame>(line) {
                Ok(frame) => Some(frame),
                Err(err) => {
                    warn!(line = index + 1, error = %err, "skipping malformed replay line");
                    None
                }
            })
            .collect();

        Self {
            frames,
            pacer: FramePacer::new(frame_period),
        }
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl FrameSource for ReplayCamera {
    type Frame = RecordedFrame;

    fn next_frame(&mut self) -> Option<RecordedFrame> {
        let frame = self.frames.pop_front()?;
        self.pacer.wait();
        Some(frame)
    }

    fn release(&mut self) {
        self.frames.clear();
    }
}

/// Recorded frames already carry landmarks; face localization is their
/// bounding box.
#[derive(Debug, Default)]
pub struct ReplayTracker;

impl LandmarkTracker for ReplayTracker {
    type Frame = RecordedFrame;
    type Input = RecordedFrame;

    fn prepare(&self, frame: RecordedFrame) -> RecordedFrame {
        frame
    }

    fn locate_face(&mut self, input: &RecordedFrame) -> Option<FaceRegion> {
        input.landmarks.as_deref().and_then(FaceRegion::bounding)
    }

    fn landmarks(&mut self, input: &RecordedFrame, _face: &FaceRegion) -> Result<Vec<Point2D>, TrackerError> {
        input.landmarks.clone().ok_or(TrackerError::NoLandmarks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_lines_skips_garbage() {
        let contents = "{\"landmarks\": [[1.0, 2.0], [3.0, 4.0]]}\n\nnot json\n{\"landmarks\": null}\n";
        let mut camera = ReplayCamera::from_lines(contents, Duration::ZERO);
        assert_eq!(camera.remaining(), 2);

        let first = camera.next_frame().unwrap();
        assert_eq!(
            first.landmarks,
            Some(vec![Point2D::new(1.0, 2.0), Point2D::new(3.0, 4.0)])
        );
        assert_eq!(camera.next_frame().unwrap().landmarks, None);
        assert!(camera.next_frame().is_none());
    }

    #[test]
    fn test_tracker_bounds_recorded_face() {
        let mut tracker = ReplayTracker;
        let frame = RecordedFrame {
            landmarks: Some(vec![Point2D::new(10.0, 5.0), Point2D::new(30.0, 45.0)]),
        };
        let face = tracker.locate_face(&frame).unwrap();
        assert_eq!(
            face,
            FaceRegion {
                left: 10.0,
                top: 5.0,
                width: 20.0,
                height: 40.0
            }
        );
        assert_eq!(tracker.landmarks(&frame, &face).unwrap().len(), 2);
    }

    #[test]
    fn test_tracker_errors_on_faceless_frame() {
        let mut tracker = ReplayTracker;
        let frame = RecordedFrame { landmarks: None };
        assert!(tracker.locate_face(&frame).is_none());
        let stale = FaceRegion {
            left: 0.0,
            top: 0.0,
            width: 1.0,
            height: 1.0,
        };
        assert!(matches!(
            tracker.landmarks(&frame, &stale),
            Err(TrackerError::NoLandmarks)
        ));
    }

    #[test]
    fn test_open_missing_file_is_camera_failure() {
        let err = ReplayCamera::open(Path::new("/nonexistent/blink/session.jsonl"), Duration::ZERO)
            .err()
            .unwrap();
        assert!(matches!(err, StartupError::Camera(_)));
    }
}
