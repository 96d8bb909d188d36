#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use blink_fast::error::{RenderError, TrackerError};
use blink_fast::interactive::{InputEvent, InputSource, Rect, RenderSurface};
use blink_fast::scoring::Rgb;
use blink_fast::sensor::simulated::{SimulatedFrame, SimulatedTracker};
use blink_fast::sensor::{FaceRegion, FrameSource, LandmarkTracker};
use blink_vision::Point2D;

pub const OPEN: f64 = 0.30;
pub const SHUT: f64 = 0.08;

pub fn open() -> Option<SimulatedFrame> {
    Some(SimulatedFrame {
        ear: OPEN,
        face_visible: true,
    })
}

pub fn shut() -> Option<SimulatedFrame> {
    Some(SimulatedFrame {
        ear: SHUT,
        face_visible: true,
    })
}

pub fn faceless() -> Option<SimulatedFrame> {
    Some(SimulatedFrame {
        ear: OPEN,
        face_visible: false,
    })
}

/// Plays a fixed script; `None` entries are unavailable frames. Once the
/// script runs out every call reports no frame.
pub struct ScriptedCamera {
    frames: VecDeque<Option<SimulatedFrame>>,
    released: Arc<AtomicBool>,
}

impl ScriptedCamera {
    pub fn new(frames: impl IntoIterator<Item = Option<SimulatedFrame>>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
            released: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn released_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.released)
    }
}

impl FrameSource for ScriptedCamera {
    type Frame = SimulatedFrame;

    fn next_frame(&mut self) -> Option<SimulatedFrame> {
        self.frames.pop_front().flatten()
    }

    fn release(&mut self) {
        self.released.store(true, Ordering::SeqCst);
    }
}

/// Simulated tracker that counts face searches and can be told to return a
/// truncated landmark set.
pub struct CountingTracker {
    inner: SimulatedTracker,
    searches: Arc<AtomicUsize>,
    truncate_to: Option<usize>,
}

impl CountingTracker {
    pub fn new() -> Self {
        Self {
            inner: SimulatedTracker::default(),
            searches: Arc::new(AtomicUsize::new(0)),
            truncate_to: None,
        }
    }

    pub fn truncating(count: usize) -> Self {
        Self {
            truncate_to: Some(count),
            ..Self::new()
        }
    }

    pub fn searches(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.searches)
    }
}

impl LandmarkTracker for CountingTracker {
    type Frame = SimulatedFrame;
    type Input = SimulatedFrame;

    fn prepare(&self, frame: SimulatedFrame) -> SimulatedFrame {
        frame
    }

    fn locate_face(&mut self, input: &SimulatedFrame) -> Option<FaceRegion> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        self.inner.locate_face(input)
    }

    fn landmarks(&mut self, input: &SimulatedFrame, face: &FaceRegion) -> Result<Vec<Point2D>, TrackerError> {
        let mut points = self.inner.landmarks(input, face)?;
        if let Some(count) = self.truncate_to {
            points.truncate(count);
        }
        Ok(points)
    }
}

/// Hands out one scripted batch per poll; sleeps for the timeout once the
/// script is exhausted, like an idle terminal.
pub struct ScriptedInput {
    batches: VecDeque<Vec<InputEvent>>,
}

impl ScriptedInput {
    pub fn new(batches: impl IntoIterator<Item = Vec<InputEvent>>) -> Self {
        Self {
            batches: batches.into_iter().collect(),
        }
    }
}

impl InputSource for ScriptedInput {
    fn poll_events(&mut self, timeout: Duration) -> Result<Vec<InputEvent>, RenderError> {
        match self.batches.pop_front() {
            Some(batch) => Ok(batch),
            None => {
                thread::sleep(timeout);
                Ok(Vec::new())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Clear(Rgb),
    Fill(Rect, Rgb),
    Text(u16, u16, String, Rgb),
    Present,
}

/// Records draw calls into a log the test keeps a handle to.
#[derive(Clone, Default)]
pub struct MemorySurface {
    ops: Arc<Mutex<Vec<DrawOp>>>,
}

impl MemorySurface {
    pub fn ops(&self) -> Vec<DrawOp> {
        self.ops.lock().unwrap().clone()
    }

    pub fn presents(&self) -> usize {
        self.ops().iter().filter(|op| **op == DrawOp::Present).count()
    }

    pub fn texts(&self) -> Vec<String> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                DrawOp::Text(_, _, text, _) => Some(text),
                _ => None,
            })
            .collect()
    }

    fn push(&self, op: DrawOp) {
        self.ops.lock().unwrap().push(op);
    }
}

impl RenderSurface for MemorySurface {
    fn clear(&mut self, color: Rgb) -> Result<(), RenderError> {
        self.push(DrawOp::Clear(color));
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgb) -> Result<(), RenderError> {
        self.push(DrawOp::Fill(rect, color));
        Ok(())
    }

    fn draw_text(&mut self, x: u16, y: u16, text: &str, color: Rgb) -> Result<(), RenderError> {
        self.push(DrawOp::Text(x, y, text.to_string(), color));
        Ok(())
    }

    fn present(&mut self) -> Result<(), RenderError> {
        self.push(DrawOp::Present);
        Ok(())
    }
}

/// A surface whose terminal went away.
pub struct BrokenSurface;

impl RenderSurface for BrokenSurface {
    fn clear(&mut self, _color: Rgb) -> Result<(), RenderError> {
        Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "terminal closed").into())
    }

    fn fill_rect(&mut self, _rect: Rect, _color: Rgb) -> Result<(), RenderError> {
        Ok(())
    }

    fn draw_text(&mut self, _x: u16, _y: u16, _text: &str, _color: Rgb) -> Result<(), RenderError> {
        Ok(())
    }

    fn present(&mut self) -> Result<(), RenderError> {
        Ok(())
    }
}
