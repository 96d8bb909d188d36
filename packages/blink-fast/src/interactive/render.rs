use super::{Layout, Rect, RenderSurface};
use crate::error::RenderError;
use crate::scoring::{score_color, streak_color, trail_color, Rgb, BLACK, DEBUG_TARGET, WHITE};
use crate::state::{Cell, GameSnapshot};

pub const PAPER: Rgb = WHITE;

const STATUS_GAP: u16 = 2;

/// Paints the whole board and status strip from one snapshot, then presents.
pub fn draw_board<R: RenderSurface>(
    surface: &mut R,
    snapshot: &GameSnapshot,
    layout: &Layout,
    debug: bool,
) -> Result<(), RenderError> {
    surface.clear(PAPER)?;

    for (row, values) in snapshot.grid.rows().enumerate() {
        for (col, value) in values.iter().enumerate() {
            let cell = Cell::new(row, col);
            let text = value.to_string();
            let (x, y) = centered(layout.cell_rect(cell), &text);
            surface.draw_text(x, y, &text, cell_color(snapshot, cell, debug))?;
        }
    }

    draw_status(surface, snapshot, layout.status_rect(), debug)?;
    surface.present()
}

/// Feedback wins over the debug marker, which wins over the trail.
pub fn cell_color(snapshot: &GameSnapshot, cell: Cell, debug: bool) -> Rgb {
    if let Some(feedback) = snapshot.feedback.filter(|f| f.cell == cell) {
        return feedback.color;
    }
    if debug && snapshot.target == cell {
        return DEBUG_TARGET;
    }
    snapshot
        .trail
        .iter()
        .find(|entry| entry.cell == cell)
        .map(|entry| trail_color(entry.age))
        .unwrap_or(BLACK)
}

fn draw_status<R: RenderSurface>(
    surface: &mut R,
    snapshot: &GameSnapshot,
    strip: Rect,
    debug: bool,
) -> Result<(), RenderError> {
    surface.fill_rect(strip, PAPER)?;
    if strip.height == 0 {
        return Ok(());
    }

    let top = strip.y + strip.height.saturating_sub(2);
    let segments = [
        (format!("Score: {}", snapshot.score), score_color(snapshot.score)),
        (format!("Streak: {}", snapshot.streak), streak_color(snapshot.streak)),
        (format!("Blinks: {}", snapshot.blink_count), BLACK),
    ];
    let mut x = strip.x + 1;
    for (text, color) in &segments {
        surface.draw_text(x, top, text, *color)?;
        x = x.saturating_add(text.len() as u16 + STATUS_GAP);
    }

    if strip.height < 2 {
        return Ok(());
    }
    let message = snapshot.last_result.message();
    surface.draw_text(strip.x + 1, top + 1, message, BLACK)?;
    if debug {
        let overlay = format!("target ({}, {})", snapshot.target.row, snapshot.target.col);
        let x = strip.x + 1 + message.len() as u16 + STATUS_GAP;
        surface.draw_text(x, top + 1, &overlay, DEBUG_TARGET)?;
    }
    Ok(())
}

fn centered(rect: Rect, text: &str) -> (u16, u16) {
    let len = text.len() as u16;
    (
        rect.x + rect.width.saturating_sub(len) / 2,
        rect.y + rect.height / 2,
    )
}
