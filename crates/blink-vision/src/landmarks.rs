use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of points produced by the 68-point face landmark model.
pub const FACE_LANDMARK_COUNT: usize = 68;

/// Points per eye contour: outer corner, top1, top2, inner corner, bottom2, bottom1.
pub const EYE_CONTOUR_POINTS: usize = 6;

// 68-point model eye contour offsets
pub const RIGHT_EYE_START: usize = 36;
pub const LEFT_EYE_START: usize = 42;

/// A 2-D image-space point. Serialized as a `[x, y]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<[f64; 2]> for Point2D {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point2D> for [f64; 2] {
    fn from(p: Point2D) -> Self {
        [p.x, p.y]
    }
}

pub type EyeContour = [Point2D; EYE_CONTOUR_POINTS];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyePair {
    pub left: EyeContour,
    pub right: EyeContour,
}

/// The tracker handed back a landmark set of the wrong cardinality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("expected {expected} face landmarks, tracker returned {actual}")]
pub struct LandmarkCountError {
    pub expected: usize,
    pub actual: usize,
}

/// Pull both eye contours out of a full 68-point landmark set.
pub fn extract_eyes(landmarks: &[Point2D]) -> Result<EyePair, LandmarkCountError> {
    if landmarks.len() != FACE_LANDMARK_COUNT {
        return Err(LandmarkCountError {
            expected: FACE_LANDMARK_COUNT,
            actual: landmarks.len(),
        });
    }

    Ok(EyePair {
        left: contour_at(landmarks, LEFT_EYE_START),
        right: contour_at(landmarks, RIGHT_EYE_START),
    })
}

fn contour_at(landmarks: &[Point2D], start: usize) -> EyeContour {
    std::array::from_fn(|i| landmarks[start + i])
}
