//! Camera-driven producer loop: frames -> landmarks -> openness -> blink events.

pub mod replay;
pub mod simulated;

use std::thread;
use std::time::{Duration, Instant};

use blink_vision::{extract_eyes, openness, BlinkConfig, BlinkDetector, BlinkEvent, Point2D};
use tracing::{debug, error, info, warn};

use crate::error::{SensorError, TrackerError};
use crate::sync::{SharedGame, Shutdown};

/// Axis-aligned face bounding box in frame coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceRegion {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl FaceRegion {
    pub fn bounding(points: &[Point2D]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self {
            left: min_x,
            top: min_y,
            width: max_x - min_x,
            height: max_y - min_y,
        })
    }
}

/// A camera. `next_frame` must come back within about one frame period.
pub trait FrameSource: Send {
    type Frame: Send;

    /// `None` means no frame this time; the caller simply tries again.
    fn next_frame(&mut self) -> Option<Self::Frame>;

    /// Releases the device. Called once, after the sensor thread has stopped.
    fn release(&mut self) {}
}

/// Face localization plus 68-point landmark fitting.
pub trait LandmarkTracker: Send {
    type Frame;
    /// The representation the tracker works on (e.g. grayscale).
    type Input;

    fn prepare(&self, frame: Self::Frame) -> Self::Input;

    fn locate_face(&mut self, input: &Self::Input) -> Option<FaceRegion>;

    fn landmarks(&mut self, input: &Self::Input, face: &FaceRegion) -> Result<Vec<Point2D>, TrackerError>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorSettings {
    pub detection: BlinkConfig,
    /// Full face localization runs every this many frames.
    pub redetect_every: u64,
    pub idle_sleep: Duration,
}

impl Default for SensorSettings {
    fn default() -> Self {
        Self {
            detection: BlinkConfig::default(),
            redetect_every: 10,
            idle_sleep: Duration::from_millis(10),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SensorStats {
    pub frames: u64,
    pub dropped_frames: u64,
    pub face_searches: u64,
    pub tracker_failures: u64,
    pub blinks: u64,
}

/// Sleeps so successive frames are at least `period` apart.
#[derive(Debug)]
pub struct FramePacer {
    period: Duration,
    last: Option<Instant>,
}

impl FramePacer {
    pub fn new(period: Duration) -> Self {
        Self { period, last: None }
    }

    pub fn wait(&mut self) -> Instant {
        if let Some(last) = self.last {
            let due = last + self.period;
            let now = Instant::now();
            if due > now {
                thread::sleep(due - now);
            }
        }
        let now = Instant::now();
        self.last = Some(now);
        now
    }
}

pub struct SensorLoop<C, T> {
    camera: C,
    tracker: T,
    detector: BlinkDetector,
    settings: SensorSettings,
    last_face: Option<FaceRegion>,
    stats: SensorStats,
}

impl<C, T> SensorLoop<C, T>
where
    C: FrameSource,
    T: LandmarkTracker<Frame = C::Frame>,
{
    pub fn new(camera: C, tracker: T, settings: SensorSettings) -> Self {
        let settings = SensorSettings {
            redetect_every: settings.redetect_every.max(1),
            ..settings
        };
        Self {
            camera,
            tracker,
            detector: BlinkDetector::new(settings.detection),
            settings,
            last_face: None,
            stats: SensorStats::default(),
        }
    }

    /// Runs until `shutdown` is triggered. A landmark contract violation ends
    /// the loop, and the process, with an error.
    pub fn run(&mut self, game: &SharedGame, shutdown: &Shutdown) -> Result<SensorStats, SensorError> {
        info!(redetect_every = self.settings.redetect_every, "sensor loop started");

        while !shutdown.is_triggered() {
            match self.step(Instant::now()) {
                Ok(Some(event)) => {
                    let outcome = game.on_blink();
                    info!(
                        blink_count = outcome.blink_count,
                        ear = event.ear,
                        missed = outcome.missed,
                        score = outcome.score,
                        streak = outcome.streak,
                        "blink detected"
                    );
                    debug!(row = outcome.target.row, col = outcome.target.col, "target moved");
                }
                Ok(None) => {}
                Err(err) => {
                    error!(error = %err, "sensor loop aborted");
                    shutdown.trigger();
                    return Err(err);
                }
            }
            thread::sleep(self.settings.idle_sleep);
        }

        info!(frames = self.stats.frames, blinks = self.stats.blinks, "sensor loop stopped");
        Ok(self.stats)
    }

    /// One iteration. `now` is the timestamp the detector sees.
    pub fn step(&mut self, now: Instant) -> Result<Option<BlinkEvent>, SensorError> {
        let Some(frame) = self.camera.next_frame() else {
            self.stats.dropped_frames += 1;
            debug!("frame unavailable");
            return Ok(None);
        };
        self.stats.frames += 1;

        let input = self.tracker.prepare(frame);

        if self.last_face.is_none() || self.stats.frames % self.settings.redetect_every == 0 {
            self.stats.face_searches += 1;
            if let Some(face) = self.tracker.locate_face(&input) {
                self.last_face = Some(face);
            }
        }

        let Some(face) = self.last_face else {
            return Ok(None);
        };

        let points = match self.tracker.landmarks(&input, &face) {
            Ok(points) => points,
            Err(err) => {
                self.stats.tracker_failures += 1;
                warn!(error = %err, "landmark tracking failed, skipping frame");
                return Ok(None);
            }
        };

        let eyes = extract_eyes(&points)?;
        let Some(ear) = openness(&eyes) else {
            debug!("degenerate eye geometry, skipping frame");
            return Ok(None);
        };

        let event = self.detector.observe(ear.avg_ear, now);
        if event.is_some() {
            self.stats.blinks += 1;
        }
        Ok(event)
    }

    pub fn stats(&self) -> SensorStats {
        self.stats
    }

    pub fn detector(&self) -> &BlinkDetector {
        &self.detector
    }

    pub fn last_face(&self) -> Option<FaceRegion> {
        self.last_face
    }

    pub fn into_camera(self) -> C {
        self.camera
    }
}
