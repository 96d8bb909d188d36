use std::process::ExitCode;

use tracing::{error, info};

use blink_fast::app::{run_session, SessionReport, SessionSettings};
use blink_fast::config::{GameConfig, SourceKind};
use blink_fast::error::{AppError, StartupError};
use blink_fast::interactive::render::PAPER;
use blink_fast::interactive::terminal::{TerminalInput, TerminalSurface};
use blink_fast::logging::init_tracing;
use blink_fast::sensor::replay::{ReplayCamera, ReplayTracker};
use blink_fast::sensor::simulated::{SimulatedCamera, SimulatedTracker};
use blink_fast::sensor::{FrameSource, LandmarkTracker};
use blink_fast::state::GameState;
use blink_fast::sync::SharedGame;

fn main() -> ExitCode {
    let config = GameConfig::from_env().apply_args(std::env::args());
    let log_dir = config.file_logs.then_some(config.log_dir.as_path());
    let _log_guard = init_tracing(&config.log_level, log_dir);

    info!(
        grid_size = config.grid_size,
        source = ?config.source,
        debug = config.debug,
        "blink-fast starting"
    );

    match run(&config) {
        Ok(report) => {
            info!(
                score = report.final_state.score,
                blinks = report.final_state.blink_count,
                clicks = report.interactive.clicks,
                "blink-fast exited"
            );
            println!(
                "Final score: {}  (blinks: {})",
                report.final_state.score, report.final_state.blink_count
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "blink-fast failed");
            eprintln!("blink-fast: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &GameConfig) -> Result<SessionReport, AppError> {
    let game = SharedGame::new(GameState::new(config.board_rules(), config.seed));
    let settings = SessionSettings::from_config(config);

    match &config.source {
        SourceKind::Simulated => {
            let camera = SimulatedCamera::new(config.frame_period(), config.seed);
            launch(&settings, game, camera, SimulatedTracker::default())
        }
        SourceKind::Replay(path) => {
            let camera = ReplayCamera::open(path, config.frame_period())?;
            launch(&settings, game, camera, ReplayTracker)
        }
    }
}

/// The camera is opened before the display so a missing device fails
/// without touching the terminal.
fn launch<C, T>(
    settings: &SessionSettings,
    game: SharedGame,
    mut camera: C,
    tracker: T,
) -> Result<SessionReport, AppError>
where
    C: FrameSource + 'static,
    T: LandmarkTracker<Frame = C::Frame> + 'static,
{
    let surface = match TerminalSurface::open(PAPER) {
        Ok(surface) => surface,
        Err(err) => {
            camera.release();
            return Err(StartupError::Display(err).into());
        }
    };
    run_session(settings, game, camera, tracker, TerminalInput, surface)
}
