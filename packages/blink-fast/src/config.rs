use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use blink_vision::{BlinkConfig, DEFAULT_BLINK_THRESHOLD};

use crate::interactive::Layout;
use crate::sensor::SensorSettings;
use crate::state::{BoardRules, MAX_GRID_SIZE, MAX_TRAIL_LEN};

const STATUS_STRIP_ROWS: u16 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    Simulated,
    Replay(PathBuf),
}

impl SourceKind {
    fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("simulated") {
            return Some(Self::Simulated);
        }
        value
            .strip_prefix("replay:")
            .filter(|path| !path.is_empty())
            .map(|path| Self::Replay(PathBuf::from(path)))
    }
}

#[derive(Debug, Clone)]
pub struct GameConfig {
    pub grid_size: usize,
    pub cell_width: u16,
    pub cell_height: u16,
    pub max_num: u8,
    pub blink_threshold: f64,
    pub debounce: Duration,
    pub face_redetect_every: u64,
    pub sensor_sleep: Duration,
    pub ui_tick: Duration,
    pub join_timeout: Duration,
    pub trail_len: usize,
    pub seed: Option<u64>,
    pub source: SourceKind,
    pub camera_fps: u32,
    pub debug: bool,
    pub log_level: String,
    pub file_logs: bool,
    pub log_dir: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_size: 8,
            cell_width: 6,
            cell_height: 3,
            max_num: 9,
            blink_threshold: DEFAULT_BLINK_THRESHOLD,
            debounce: Duration::from_millis(500),
            face_redetect_every: 10,
            sensor_sleep: Duration::from_millis(10),
            ui_tick: Duration::from_millis(16),
            join_timeout: Duration::from_millis(2000),
            trail_len: 10,
            seed: None,
            source: SourceKind::Simulated,
            camera_fps: 60,
            debug: false,
            log_level: "info".to_string(),
            file_logs: true,
            log_dir: PathBuf::from("./logs"),
        }
    }
}

impl GameConfig {
    /// Reads `.env` (if any) and the process environment.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let parsed = |key: &str| lookup(key).and_then(|value| value.trim().parse::<u64>().ok());
        let millis = |key: &str, fallback: Duration| {
            parsed(key).map(Duration::from_millis).unwrap_or(fallback)
        };

        Self {
            grid_size: parse_or(&lookup, "BLINK_GRID_SIZE", defaults.grid_size).clamp(1, MAX_GRID_SIZE),
            cell_width: parse_or(&lookup, "BLINK_CELL_WIDTH", defaults.cell_width).max(2),
            cell_height: parse_or(&lookup, "BLINK_CELL_HEIGHT", defaults.cell_height).max(1),
            max_num: parse_or(&lookup, "BLINK_MAX_NUM", defaults.max_num),
            blink_threshold: parse_or(&lookup, "BLINK_THRESHOLD", defaults.blink_threshold),
            debounce: millis("BLINK_DEBOUNCE_MS", defaults.debounce),
            face_redetect_every: parse_or(&lookup, "BLINK_FACE_REDETECT_EVERY", defaults.face_redetect_every)
                .max(1),
            sensor_sleep: millis("BLINK_SENSOR_SLEEP_MS", defaults.sensor_sleep),
            ui_tick: millis("BLINK_UI_TICK_MS", defaults.ui_tick),
            join_timeout: millis("BLINK_JOIN_TIMEOUT_MS", defaults.join_timeout),
            trail_len: parse_or(&lookup, "BLINK_TRAIL_LEN", defaults.trail_len).min(MAX_TRAIL_LEN),
            seed: parsed("BLINK_SEED"),
            source: lookup("BLINK_SOURCE")
                .and_then(|value| SourceKind::parse(&value))
                .unwrap_or(defaults.source),
            camera_fps: parse_or(&lookup, "BLINK_CAMERA_FPS", defaults.camera_fps).max(1),
            debug: lookup("BLINK_DEBUG").map(|v| is_truthy(&v)).unwrap_or(defaults.debug),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            file_logs: lookup("BLINK_FILE_LOGS")
                .map(|v| is_truthy(&v))
                .unwrap_or(defaults.file_logs),
            log_dir: lookup("BLINK_LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.log_dir),
        }
    }

    /// `--debug` is the only recognised command-line flag.
    pub fn apply_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if args.into_iter().any(|arg| arg.as_ref() == "--debug") {
            self.debug = true;
        }
        self
    }

    pub fn board_rules(&self) -> BoardRules {
        BoardRules {
            grid_size: self.grid_size,
            max_num: self.max_num,
            trail_len: self.trail_len,
        }
    }

    pub fn sensor_settings(&self) -> SensorSettings {
        SensorSettings {
            detection: BlinkConfig {
                threshold: self.blink_threshold,
                debounce: self.debounce,
            },
            redetect_every: self.face_redetect_every,
            idle_sleep: self.sensor_sleep,
        }
    }

    pub fn layout(&self) -> Layout {
        Layout {
            grid_size: self.grid_size,
            cell_width: self.cell_width,
            cell_height: self.cell_height,
            status_height: STATUS_STRIP_ROWS,
        }
    }

    pub fn frame_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.camera_fps))
    }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, fallback: T) -> T {
    lookup(key)
        .and_then(|value| value.trim().parse::<T>().ok())
        .unwrap_or(fallback)
}

fn is_truthy(value: &str) -> bool {
    matches!(value.trim(), "1" | "true" | "TRUE" | "yes" | "on")
}
