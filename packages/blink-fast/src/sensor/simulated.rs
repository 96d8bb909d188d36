//! Synthetic camera + tracker pair for running without a webcam.
//!
//! The camera plays an openness profile with randomly spaced blinks; the
//! tracker turns it into a 68-point landmark set whose eye contours have
//! exactly that aspect ratio.

use std::f64::consts::PI;
use std::time::{Duration, Instant};

use blink_vision::{EyeContour, Point2D, FACE_LANDMARK_COUNT, LEFT_EYE_START, RIGHT_EYE_START};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::{FaceRegion, FramePacer, FrameSource, LandmarkTracker};
use crate::error::TrackerError;

pub const OPEN_EAR: f64 = 0.30;
pub const CLOSED_EAR: f64 = 0.08;

const EAR_JITTER: f64 = 0.01;
const BLINK_LENGTH: Duration = Duration::from_millis(150);
const FIRST_BLINK_AFTER: Duration = Duration::from_millis(1500);
const BLINK_GAP_SECS: std::ops::Range<f64> = 1.0..4.0;
const DROP_RATE: f64 = 0.005;
const FACE_LOSS_RATE: f64 = 0.002;

const JAW_POINTS: usize = 17;
const BROW_POINTS: usize = 10;
const NOSE_POINTS: usize = 9;
const MOUTH_START: usize = 48;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulatedFrame {
    pub ear: f64,
    pub face_visible: bool,
}

pub struct SimulatedCamera {
    rng: ChaCha8Rng,
    pacer: FramePacer,
    started: Option<Instant>,
    next_blink: Duration,
}

impl SimulatedCamera {
    pub fn new(frame_period: Duration, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed.wrapping_add(1)),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            rng,
            pacer: FramePacer::new(frame_period),
            started: None,
            next_blink: FIRST_BLINK_AFTER,
        }
    }
}

impl FrameSource for SimulatedCamera {
    type Frame = SimulatedFrame;

    fn next_frame(&mut self) -> Option<SimulatedFrame> {
        let now = self.pacer.wait();
        let started = *self.started.get_or_insert(now);
        let elapsed = now.saturating_duration_since(started);

        if elapsed >= self.next_blink + BLINK_LENGTH {
            self.next_blink = elapsed + Duration::from_secs_f64(self.rng.gen_range(BLINK_GAP_SECS));
        }

        if self.rng.gen_bool(DROP_RATE) {
            return None;
        }

        let closed = elapsed >= self.next_blink && elapsed < self.next_blink + BLINK_LENGTH;
        let base = if closed { CLOSED_EAR } else { OPEN_EAR };

        Some(SimulatedFrame {
            ear: base + self.rng.gen_range(-EAR_JITTER..EAR_JITTER),
            face_visible: !self.rng.gen_bool(FACE_LOSS_RATE),
        })
    }
}

pub struct SimulatedTracker {
    face: FaceRegion,
}

impl Default for SimulatedTracker {
    fn default() -> Self {
        // roughly centred in a 160x120 capture
        Self {
            face: FaceRegion {
                left: 40.0,
                top: 20.0,
                width: 80.0,
                height: 90.0,
            },
        }
    }
}

impl LandmarkTracker for SimulatedTracker {
    type Frame = SimulatedFrame;
    type Input = SimulatedFrame;

    fn prepare(&self, frame: SimulatedFrame) -> SimulatedFrame {
        frame
    }

    fn locate_face(&mut self, input: &SimulatedFrame) -> Option<FaceRegion> {
        input.face_visible.then_some(self.face)
    }

    fn landmarks(&mut self, input: &SimulatedFrame, face: &FaceRegion) -> Result<Vec<Point2D>, TrackerError> {
        if !input.face_visible {
            return Err(TrackerError::NoLandmarks);
        }
        Ok(synthetic_face(face, input.ear))
    }
}

/// Eye contour centred on `center`, `width` corner to corner, with the given
/// aspect ratio. Lids sit at a third of the width in from each corner.
pub fn synthetic_eye(center: Point2D, width: f64, ear: f64) -> EyeContour {
    // verticals are 2h each, horizontal is w, so ear = 2h / w
    let h = ear.max(0.0) * width / 2.0;
    let (half, sixth) = (width / 2.0, width / 6.0);
    [
        Point2D::new(center.x - half, center.y),
        Point2D::new(center.x - sixth, center.y - h),
        Point2D::new(center.x + sixth, center.y - h),
        Point2D::new(center.x + half, center.y),
        Point2D::new(center.x + sixth, center.y + h),
        Point2D::new(center.x - sixth, center.y + h),
    ]
}

/// Full 68-point landmark set inside `face` with both eyes at `ear`.
pub fn synthetic_face(face: &FaceRegion, ear: f64) -> Vec<Point2D> {
    let at = |fx: f64, fy: f64| Point2D::new(face.left + fx * face.width, face.top + fy * face.height);
    let mut points = Vec::with_capacity(FACE_LANDMARK_COUNT);

    for i in 0..JAW_POINTS {
        let angle = PI * i as f64 / (JAW_POINTS - 1) as f64;
        points.push(at(0.5 - 0.5 * angle.cos(), 0.4 + 0.6 * angle.sin()));
    }
    for i in 0..BROW_POINTS {
        let fx = 0.15 + 0.7 * i as f64 / (BROW_POINTS - 1) as f64;
        points.push(at(fx, 0.28));
    }
    for i in 0..NOSE_POINTS {
        let fy = 0.4 + 0.25 * i as f64 / (NOSE_POINTS - 1) as f64;
        points.push(at(0.5, fy));
    }

    let eye_width = face.width * 0.2;
    let right = synthetic_eye(at(0.3, 0.38), eye_width, ear);
    let left = synthetic_eye(at(0.7, 0.38), eye_width, ear);
    debug_assert_eq!(points.len(), RIGHT_EYE_START);
    points.extend_from_slice(&right);
    debug_assert_eq!(points.len(), LEFT_EYE_START);
    points.extend_from_slice(&left);

    let mouth_points = FACE_LANDMARK_COUNT - MOUTH_START;
    for i in 0..mouth_points {
        let angle = 2.0 * PI * i as f64 / mouth_points as f64;
        points.push(at(0.5 + 0.15 * angle.cos(), 0.8 + 0.05 * angle.sin()));
    }

    points
}
