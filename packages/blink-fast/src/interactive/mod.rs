//! UI-cadence consumer loop: input in, redraws out.

pub mod render;
pub mod terminal;

use std::time::Duration;

use tracing::{debug, info};

use crate::error::RenderError;
use crate::scoring::Rgb;
use crate::state::{Cell, ClickOutcome};
use crate::sync::{SharedGame, Shutdown};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// Pointer press at surface coordinates.
    Click { x: u16, y: u16 },
    /// Surface size changed; everything must be repainted.
    Resize,
    Quit,
}

pub trait InputSource {
    /// Waits at most `timeout` and returns everything pending.
    fn poll_events(&mut self, timeout: Duration) -> Result<Vec<InputEvent>, RenderError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

/// Drawing primitives. Nothing is visible until `present`.
pub trait RenderSurface {
    fn clear(&mut self, color: Rgb) -> Result<(), RenderError>;
    fn fill_rect(&mut self, rect: Rect, color: Rgb) -> Result<(), RenderError>;
    fn draw_text(&mut self, x: u16, y: u16, text: &str, color: Rgb) -> Result<(), RenderError>;
    fn present(&mut self) -> Result<(), RenderError>;
}

/// Grid of fixed-size cells with a status strip underneath.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub grid_size: usize,
    pub cell_width: u16,
    pub cell_height: u16,
    pub status_height: u16,
}

impl Layout {
    pub fn grid_width(&self) -> u16 {
        self.cell_width.saturating_mul(to_u16(self.grid_size))
    }

    pub fn grid_height(&self) -> u16 {
        self.cell_height.saturating_mul(to_u16(self.grid_size))
    }

    /// Maps a pointer position to a grid cell; `None` outside the grid.
    pub fn cell_at(&self, x: u16, y: u16) -> Option<Cell> {
        if self.cell_width == 0 || self.cell_height == 0 {
            return None;
        }
        let cell = Cell::new((y / self.cell_height) as usize, (x / self.cell_width) as usize);
        (cell.row < self.grid_size && cell.col < self.grid_size).then_some(cell)
    }

    pub fn cell_rect(&self, cell: Cell) -> Rect {
        Rect {
            x: self.cell_width.saturating_mul(to_u16(cell.col)),
            y: self.cell_height.saturating_mul(to_u16(cell.row)),
            width: self.cell_width,
            height: self.cell_height,
        }
    }

    pub fn status_rect(&self) -> Rect {
        Rect {
            x: 0,
            y: self.grid_height(),
            width: self.grid_width(),
            height: self.status_height,
        }
    }
}

fn to_u16(value: usize) -> u16 {
    u16::try_from(value).unwrap_or(u16::MAX)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InteractiveStats {
    pub clicks: u64,
    pub ignored_clicks: u64,
    pub redraws: u64,
}

pub struct InteractiveLoop<I, R> {
    input: I,
    surface: R,
    layout: Layout,
    poll_timeout: Duration,
    debug: bool,
    stats: InteractiveStats,
}

impl<I, R> InteractiveLoop<I, R>
where
    I: InputSource,
    R: RenderSurface,
{
    pub fn new(input: I, surface: R, layout: Layout, poll_timeout: Duration, debug: bool) -> Self {
        Self {
            input,
            surface,
            layout,
            poll_timeout,
            debug,
            stats: InteractiveStats::default(),
        }
    }

    /// Runs until quit is requested or the sensor side shuts down.
    pub fn run(&mut self, game: &SharedGame, shutdown: &Shutdown) -> Result<InteractiveStats, RenderError> {
        while !shutdown.is_triggered() {
            self.tick(game, shutdown)?;
        }
        Ok(self.stats)
    }

    /// One iteration: drain input, then redraw if the state changed.
    pub fn tick(&mut self, game: &SharedGame, shutdown: &Shutdown) -> Result<(), RenderError> {
        for event in self.input.poll_events(self.poll_timeout)? {
            match event {
                InputEvent::Quit => {
                    info!("quit requested");
                    shutdown.trigger();
                }
                InputEvent::Resize => game.mark_dirty(),
                InputEvent::Click { x, y } => self.handle_click(game, x, y),
            }
        }

        // snapshot is taken under the lock; drawing happens after it is released
        if let Some(snapshot) = game.take_redraw() {
            render::draw_board(&mut self.surface, &snapshot, &self.layout, self.debug)?;
            self.stats.redraws += 1;
        }
        Ok(())
    }

    fn handle_click(&mut self, game: &SharedGame, x: u16, y: u16) {
        let Some(cell) = self.layout.cell_at(x, y) else {
            self.stats.ignored_clicks += 1;
            debug!(x, y, "click outside grid ignored");
            return;
        };
        self.stats.clicks += 1;

        match game.on_click(cell) {
            ClickOutcome::Correct { reward, score, streak } => {
                info!(row = cell.row, col = cell.col, reward, score, streak, "correct guess");
            }
            ClickOutcome::Wrong { forfeited } => {
                info!(row = cell.row, col = cell.col, forfeited, "wrong guess, score reset");
            }
        }
    }

    pub fn stats(&self) -> InteractiveStats {
        self.stats
    }
}
