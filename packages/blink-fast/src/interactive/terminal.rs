//! Terminal rendering surface and pointer input on top of crossterm.

use std::io::{self, Stdout, Write};
use std::time::Duration;

use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEventKind,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};

use super::{InputEvent, InputSource, Rect, RenderSurface};
use crate::error::RenderError;
use crate::scoring::Rgb;

fn color(rgb: Rgb) -> Color {
    Color::Rgb {
        r: rgb.0,
        g: rgb.1,
        b: rgb.2,
    }
}

/// Owns the terminal while the game runs: raw mode, alternate screen, mouse
/// capture. Dropping it restores the terminal.
pub struct TerminalSurface {
    out: Stdout,
    paper: Rgb,
    active: bool,
}

impl TerminalSurface {
    pub fn open(paper: Rgb) -> Result<Self, RenderError> {
        terminal::enable_raw_mode()?;
        let mut out = io::stdout();
        if let Err(err) = execute!(out, EnterAlternateScreen, EnableMouseCapture, cursor::Hide) {
            let _ = terminal::disable_raw_mode();
            return Err(err.into());
        }
        Ok(Self {
            out,
            paper,
            active: true,
        })
    }

    pub fn close(&mut self) -> Result<(), RenderError> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        execute!(
            self.out,
            ResetColor,
            cursor::Show,
            DisableMouseCapture,
            LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()?;
        Ok(())
    }
}

impl RenderSurface for TerminalSurface {
    fn clear(&mut self, rgb: Rgb) -> Result<(), RenderError> {
        queue!(self.out, SetBackgroundColor(color(rgb)), Clear(ClearType::All))?;
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rect, rgb: Rgb) -> Result<(), RenderError> {
        let blank = " ".repeat(usize::from(rect.width));
        queue!(self.out, SetBackgroundColor(color(rgb)))?;
        for row in rect.y..rect.y.saturating_add(rect.height) {
            queue!(self.out, cursor::MoveTo(rect.x, row), Print(&blank))?;
        }
        Ok(())
    }

    fn draw_text(&mut self, x: u16, y: u16, text: &str, rgb: Rgb) -> Result<(), RenderError> {
        queue!(
            self.out,
            cursor::MoveTo(x, y),
            SetBackgroundColor(color(self.paper)),
            SetForegroundColor(color(rgb)),
            Print(text)
        )?;
        Ok(())
    }

    fn present(&mut self) -> Result<(), RenderError> {
        queue!(self.out, ResetColor)?;
        self.out.flush()?;
        Ok(())
    }
}

impl Drop for TerminalSurface {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

#[derive(Debug, Default)]
pub struct TerminalInput;

impl InputSource for TerminalInput {
    fn poll_events(&mut self, timeout: Duration) -> Result<Vec<InputEvent>, RenderError> {
        let mut events = Vec::new();
        if !event::poll(timeout)? {
            return Ok(events);
        }
        loop {
            if let Some(mapped) = map_event(event::read()?) {
                events.push(mapped);
            }
            if !event::poll(Duration::ZERO)? {
                break;
            }
        }
        Ok(events)
    }
}

fn map_event(event: Event) -> Option<InputEvent> {
    match event {
        Event::Key(key) => map_key(key),
        Event::Mouse(mouse) => match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => Some(InputEvent::Click {
                x: mouse.column,
                y: mouse.row,
            }),
            _ => None,
        },
        Event::Resize(_, _) => Some(InputEvent::Resize),
        _ => None,
    }
}

fn map_key(key: KeyEvent) -> Option<InputEvent> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Some(InputEvent::Quit),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(InputEvent::Quit),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventState, MouseEvent};

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn test_left_press_is_a_click() {
        assert_eq!(
            map_event(mouse(MouseEventKind::Down(MouseButton::Left), 7, 4)),
            Some(InputEvent::Click { x: 7, y: 4 })
        );
        assert_eq!(map_event(mouse(MouseEventKind::Down(MouseButton::Right), 7, 4)), None);
        assert_eq!(map_event(mouse(MouseEventKind::Up(MouseButton::Left), 7, 4)), None);
    }

    #[test]
    fn test_quit_keys() {
        let press = |code, modifiers| {
            Event::Key(KeyEvent {
                code,
                modifiers,
                kind: KeyEventKind::Press,
                state: KeyEventState::NONE,
            })
        };
        assert_eq!(map_event(press(KeyCode::Char('q'), KeyModifiers::NONE)), Some(InputEvent::Quit));
        assert_eq!(map_event(press(KeyCode::Esc, KeyModifiers::NONE)), Some(InputEvent::Quit));
        assert_eq!(map_event(press(KeyCode::Char('c'), KeyModifiers::CONTROL)), Some(InputEvent::Quit));
        assert_eq!(map_event(press(KeyCode::Char('c'), KeyModifiers::NONE)), None);
    }

    #[test]
    fn test_resize_requests_repaint() {
        assert_eq!(map_event(Event::Resize(80, 40)), Some(InputEvent::Resize));
    }
}
