use std::time::{Duration, Instant};

pub const DEFAULT_BLINK_THRESHOLD: f64 = 0.18;
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlinkConfig {
    /// Openness below this counts as a closed eye.
    pub threshold: f64,
    /// Minimum time between two accepted detections.
    pub debounce: Duration,
}

impl Default for BlinkConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_BLINK_THRESHOLD,
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EyeState {
    Open,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlinkEvent {
    pub timestamp: Instant,
    pub ear: f64,
    /// 1-based count of detections made by this detector.
    pub sequence: u64,
}

/// Debounced two-state blink detector.
///
/// `Open -> Closed` emits an event when openness drops below the threshold and
/// the debounce interval since the last *emitted* event has elapsed.
/// `Closed -> Open` happens silently once openness is back at or above the
/// threshold. While `Closed` nothing fires, however long the eye stays shut.
#[derive(Debug, Clone)]
pub struct BlinkDetector {
    config: BlinkConfig,
    state: EyeState,
    last_blink: Option<Instant>,
    detected: u64,
}

impl BlinkDetector {
    pub fn new(config: BlinkConfig) -> Self {
        Self {
            config,
            state: EyeState::Open,
            last_blink: None,
            detected: 0,
        }
    }

    pub fn observe(&mut self, ear: f64, now: Instant) -> Option<BlinkEvent> {
        match self.state {
            EyeState::Open if ear < self.config.threshold && self.debounce_elapsed(now) => {
                self.state = EyeState::Closed;
                self.last_blink = Some(now);
                self.detected += 1;
                Some(BlinkEvent {
                    timestamp: now,
                    ear,
                    sequence: self.detected,
                })
            }
            EyeState::Closed if ear >= self.config.threshold => {
                self.state = EyeState::Open;
                None
            }
            _ => None,
        }
    }

    fn debounce_elapsed(&self, now: Instant) -> bool {
        match self.last_blink {
            Some(last) => now.saturating_duration_since(last) >= self.config.debounce,
            None => true,
        }
    }

    pub fn state(&self) -> EyeState {
        self.state
    }

    pub fn last_blink(&self) -> Option<Instant> {
        self.last_blink
    }

    pub fn detected_count(&self) -> u64 {
        self.detected
    }

    pub fn reset(&mut self) {
        self.state = EyeState::Open;
        self.last_blink = None;
        self.detected = 0;
    }
}

impl Default for BlinkDetector {
    fn default() -> Self {
        Self::new(BlinkConfig::default())
    }
}
