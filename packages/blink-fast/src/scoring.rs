//! Reward arithmetic and the status palette.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

pub const WHITE: Rgb = Rgb(255, 255, 255);
pub const BLACK: Rgb = Rgb(0, 0, 0);
pub const SUCCESS_GREEN: Rgb = Rgb(0, 200, 0);
pub const DEBUG_TARGET: Rgb = Rgb(200, 0, 200);

const STREAK_SATURATION: u32 = 10;
const SCORE_SATURATION: u64 = 20;
const TRAIL_FADE_STEP: u32 = 25;

/// Points for a correct guess that brings the streak to `streak`: `2^(streak-1)`.
pub fn reward(streak: u32) -> u64 {
    match streak {
        0 => 0,
        n => 1u64.checked_shl(n - 1).unwrap_or(u64::MAX),
    }
}

/// Red ramp, full red from a streak of 10.
pub fn streak_color(streak: u32) -> Rgb {
    if streak >= STREAK_SATURATION {
        Rgb(255, 0, 0)
    } else {
        Rgb((255 * streak / STREAK_SATURATION) as u8, 0, 0)
    }
}

/// Green ramp, full green from a score of 20.
pub fn score_color(score: u64) -> Rgb {
    if score >= SCORE_SATURATION {
        Rgb(0, 255, 0)
    } else {
        Rgb(0, (255 * score / SCORE_SATURATION) as u8, 0)
    }
}

pub fn trail_color(age: u8) -> Rgb {
    let intensity = 255u32.saturating_sub(u32::from(age) * TRAIL_FADE_STEP) as u8;
    Rgb(intensity, intensity, 0)
}
