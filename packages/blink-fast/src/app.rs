//! Wires the two loops together: sensor on its own thread, UI on the caller's.

use std::thread;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::config::GameConfig;
use crate::error::{AppError, SensorError, StartupError};
use crate::interactive::{InputSource, InteractiveLoop, InteractiveStats, Layout, RenderSurface};
use crate::sensor::{FrameSource, LandmarkTracker, SensorLoop, SensorSettings, SensorStats};
use crate::state::GameSnapshot;
use crate::sync::{join_with_timeout, SharedGame, Shutdown};

const SENSOR_THREAD_NAME: &str = "blink-sensor";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSettings {
    pub sensor: SensorSettings,
    pub layout: Layout,
    pub ui_tick: Duration,
    pub join_timeout: Duration,
    pub debug: bool,
}

impl SessionSettings {
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            sensor: config.sensor_settings(),
            layout: config.layout(),
            ui_tick: config.ui_tick,
            join_timeout: config.join_timeout,
            debug: config.debug,
        }
    }
}

enum SensorJoin {
    Stopped(Result<SensorStats, SensorError>),
    Panicked,
    Detached,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionReport {
    /// `None` when the sensor thread did not stop within the join timeout.
    pub sensor: Option<SensorStats>,
    pub interactive: InteractiveStats,
    pub final_state: GameSnapshot,
}

/// Runs one game session to completion.
///
/// Teardown order is fixed: the UI loop exits, shutdown is signalled, the
/// sensor thread is joined (bounded), the camera is released, and only then
/// is the surface dropped.
pub fn run_session<C, T, I, R>(
    settings: &SessionSettings,
    game: SharedGame,
    camera: C,
    tracker: T,
    input: I,
    surface: R,
) -> Result<SessionReport, AppError>
where
    C: FrameSource + 'static,
    T: LandmarkTracker<Frame = C::Frame> + 'static,
    I: InputSource,
    R: RenderSurface,
{
    let shutdown = Shutdown::new();

    let sensor_handle = {
        let game = game.clone();
        let shutdown = shutdown.clone();
        let sensor_settings = settings.sensor;
        thread::Builder::new()
            .name(SENSOR_THREAD_NAME.to_string())
            .spawn(move || {
                let mut sensor = SensorLoop::new(camera, tracker, sensor_settings);
                let result = sensor.run(&game, &shutdown);
                (sensor.into_camera(), result)
            })
            .map_err(StartupError::SensorThread)?
    };
    info!(thread = SENSOR_THREAD_NAME, "sensor thread started");

    let mut ui = InteractiveLoop::new(input, surface, settings.layout, settings.ui_tick, settings.debug);
    let ui_result = ui.run(&game, &shutdown);
    if let Err(err) = &ui_result {
        error!(error = %err, "interactive loop failed");
    }
    shutdown.trigger();

    let joined = match join_with_timeout(sensor_handle, settings.join_timeout) {
        Some(Ok((mut camera, result))) => {
            camera.release();
            info!("camera released");
            SensorJoin::Stopped(result)
        }
        Some(Err(_)) => {
            error!("sensor thread panicked");
            SensorJoin::Panicked
        }
        None => {
            warn!(
                timeout_ms = settings.join_timeout.as_millis() as u64,
                "sensor thread did not stop in time, detaching"
            );
            SensorJoin::Detached
        }
    };

    let interactive = ui.stats();
    drop(ui);

    let final_state = game.snapshot();
    info!(
        score = final_state.score,
        streak = final_state.streak,
        blinks = final_state.blink_count,
        "session ended"
    );

    ui_result?;
    let sensor = match joined {
        SensorJoin::Stopped(result) => Some(result?),
        SensorJoin::Panicked => return Err(AppError::SensorPanicked),
        SensorJoin::Detached => None,
    };

    Ok(SessionReport {
        sensor,
        interactive,
        final_state,
    })
}
