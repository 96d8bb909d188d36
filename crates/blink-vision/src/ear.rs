use crate::landmarks::{EyeContour, EyePair, Point2D};

/// Below this corner-to-corner distance the contour is treated as degenerate.
pub const MIN_HORIZONTAL_DISTANCE: f64 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EARResult {
    pub left_ear: f64,
    pub right_ear: f64,
    pub avg_ear: f64,
}

#[inline]
pub fn euclidean_distance(p1: &Point2D, p2: &Point2D) -> f64 {
    let dx = p2.x - p1.x;
    let dy = p2.y - p1.y;
    (dx * dx + dy * dy).sqrt()
}

/// Eye aspect ratio of one contour: `(|p2-p6| + |p3-p5|) / (2 * |p1-p4|)`.
///
/// Returns `None` when the horizontal span collapses, which happens with a
/// mis-tracked face rather than a closed eye.
pub fn eye_aspect_ratio(eye: &EyeContour) -> Option<f64> {
    let vertical1 = euclidean_distance(&eye[1], &eye[5]);
    let vertical2 = euclidean_distance(&eye[2], &eye[4]);
    let horizontal = euclidean_distance(&eye[0], &eye[3]);

    if horizontal < MIN_HORIZONTAL_DISTANCE {
        return None;
    }

    Some((vertical1 + vertical2) / (2.0 * horizontal))
}

/// Frame-level openness: both eyes' aspect ratios and their mean.
pub fn openness(eyes: &EyePair) -> Option<EARResult> {
    let left_ear = eye_aspect_ratio(&eyes.left)?;
    let right_ear = eye_aspect_ratio(&eyes.right)?;

    Some(EARResult {
        left_ear,
        right_ear,
        avg_ear: (left_ear + right_ear) / 2.0,
    })
}
