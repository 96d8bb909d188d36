use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::scoring::{self, Rgb, SUCCESS_GREEN};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LastResult {
    Waiting,
    Correct,
    Wrong,
    Missed,
}

impl LastResult {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Waiting => "Waiting for first blink...",
            Self::Correct => "Correct!",
            Self::Wrong => "Wrong!",
            Self::Missed => "Missed! Streak reset.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Feedback {
    pub cell: Cell,
    pub color: Rgb,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrailEntry {
    pub cell: Cell,
    pub age: u8,
}

/// Largest board side; keeps cell coordinates inside terminal `u16` space.
pub const MAX_GRID_SIZE: usize = 255;
/// Trail ages are `u8`, so no more than 256 distinct ages exist.
pub const MAX_TRAIL_LEN: usize = u8::MAX as usize + 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardRules {
    pub grid_size: usize,
    /// Inclusive upper bound for cell values.
    pub max_num: u8,
    pub trail_len: usize,
}

impl Default for BoardRules {
    fn default() -> Self {
        Self {
            grid_size: 8,
            max_num: 9,
            trail_len: 10,
        }
    }
}

/// Square matrix of small integers, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    size: usize,
    cells: Vec<u8>,
}

impl Grid {
    fn random(size: usize, max_num: u8, rng: &mut impl Rng) -> Self {
        let cells = (0..size * size).map(|_| rng.gen_range(0..=max_num)).collect();
        Self { size, cells }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.row < self.size && cell.col < self.size
    }

    pub fn get(&self, cell: Cell) -> Option<u8> {
        self.contains(cell).then(|| self.cells[cell.row * self.size + cell.col])
    }

    fn set(&mut self, cell: Cell, value: u8) {
        if self.contains(cell) {
            self.cells[cell.row * self.size + cell.col] = value;
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.cells.chunks(self.size)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlinkOutcome {
    pub blink_count: u64,
    /// The previous target expired without a guess.
    pub missed: bool,
    pub target: Cell,
    pub score: u64,
    pub streak: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    Correct { reward: u64, score: u64, streak: u32 },
    Wrong { forfeited: u64 },
}

/// Everything the renderer needs, copied out in one critical section.
#[derive(Debug, Clone, PartialEq)]
pub struct GameSnapshot {
    pub grid: Grid,
    pub target: Cell,
    pub awaiting_guess: bool,
    pub score: u64,
    pub streak: u32,
    pub blink_count: u64,
    pub last_result: LastResult,
    pub feedback: Option<Feedback>,
    pub trail: Vec<TrailEntry>,
}

#[derive(Debug, Clone)]
pub struct GameState {
    rules: BoardRules,
    grid: Grid,
    target: Cell,
    awaiting_guess: bool,
    score: u64,
    streak: u32,
    last_result: LastResult,
    feedback: Option<Feedback>,
    trail: VecDeque<TrailEntry>,
    dirty: bool,
    blink_count: u64,
    rng: ChaCha8Rng,
}

impl GameState {
    /// `seed` makes grid and target selection reproducible.
    pub fn new(rules: BoardRules, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self::with_rng(rules, rng)
    }

    fn with_rng(rules: BoardRules, mut rng: ChaCha8Rng) -> Self {
        let rules = BoardRules {
            grid_size: rules.grid_size.clamp(1, MAX_GRID_SIZE),
            max_num: rules.max_num,
            trail_len: rules.trail_len.min(MAX_TRAIL_LEN),
        };
        let grid = Grid::random(rules.grid_size, rules.max_num, &mut rng);
        let target = random_cell(rules.grid_size, &mut rng);

        Self {
            rules,
            grid,
            target,
            awaiting_guess: false,
            score: 0,
            streak: 0,
            last_result: LastResult::Waiting,
            feedback: None,
            trail: VecDeque::with_capacity(rules.trail_len),
            dirty: true,
            blink_count: 0,
            rng,
        }
    }

    /// A blink moves the target and rewrites its value so the change is visible.
    pub fn apply_blink(&mut self) -> BlinkOutcome {
        self.feedback = None;
        self.trail.clear();

        let missed = self.awaiting_guess;
        if missed {
            self.streak = 0;
            self.last_result = LastResult::Missed;
        }
        self.awaiting_guess = true;

        self.target = random_cell(self.rules.grid_size, &mut self.rng);
        let value = self.rng.gen_range(0..=self.rules.max_num);
        self.grid.set(self.target, value);

        self.blink_count += 1;
        self.dirty = true;

        BlinkOutcome {
            blink_count: self.blink_count,
            missed,
            target: self.target,
            score: self.score,
            streak: self.streak,
        }
    }

    /// Scores a guess. A wrong guess forfeits the whole score.
    pub fn apply_click(&mut self, cell: Cell) -> ClickOutcome {
        self.awaiting_guess = false;
        self.dirty = true;
        self.push_trail(cell);

        if cell == self.target {
            self.streak = self.streak.saturating_add(1);
            let reward = scoring::reward(self.streak);
            self.score = self.score.saturating_add(reward);
            self.last_result = LastResult::Correct;
            self.feedback = Some(Feedback {
                cell,
                color: SUCCESS_GREEN,
            });
            ClickOutcome::Correct {
                reward,
                score: self.score,
                streak: self.streak,
            }
        } else {
            let forfeited = self.score;
            self.streak = 0;
            self.score = 0;
            self.last_result = LastResult::Wrong;
            self.feedback = None;
            ClickOutcome::Wrong { forfeited }
        }
    }

    fn push_trail(&mut self, cell: Cell) {
        if self.rules.trail_len == 0 {
            return;
        }
        for entry in self.trail.iter_mut() {
            entry.age = entry.age.saturating_add(1);
        }
        self.trail
            .retain(|entry| usize::from(entry.age) < self.rules.trail_len);
        self.trail.push_front(TrailEntry { cell, age: 0 });
        self.trail.truncate(self.rules.trail_len);
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Returns a snapshot and clears `dirty` if a redraw is due.
    pub fn take_redraw(&mut self) -> Option<GameSnapshot> {
        if !self.dirty {
            return None;
        }
        self.dirty = false;
        Some(self.snapshot())
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            grid: self.grid.clone(),
            target: self.target,
            awaiting_guess: self.awaiting_guess,
            score: self.score,
            streak: self.streak,
            blink_count: self.blink_count,
            last_result: self.last_result,
            feedback: self.feedback,
            trail: self.trail.iter().copied().collect(),
        }
    }

    pub fn rules(&self) -> &BoardRules {
        &self.rules
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn target(&self) -> Cell {
        self.target
    }

    pub fn awaiting_guess(&self) -> bool {
        self.awaiting_guess
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn last_result(&self) -> LastResult {
        self.last_result
    }

    pub fn feedback(&self) -> Option<Feedback> {
        self.feedback
    }

    pub fn trail(&self) -> impl Iterator<Item = &TrailEntry> {
        self.trail.iter()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn blink_count(&self) -> u64 {
        self.blink_count
    }
}

fn random_cell(size: usize, rng: &mut impl Rng) -> Cell {
    Cell::new(rng.gen_range(0..size), rng.gen_range(0..size))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> GameState {
        GameState::new(BoardRules::default(), Some(7))
    }

    fn miss_cell(state: &GameState) -> Cell {
        let target = state.target();
        Cell::new(target.row, (target.col + 1) % state.rules().grid_size)
    }

    #[test]
    fn test_initial_state() {
        let state = seeded();
        assert_eq!(state.grid().size(), 8);
        assert!(state.grid().contains(state.target()));
        assert!(!state.awaiting_guess());
        assert_eq!(state.last_result(), LastResult::Waiting);
        assert!(state.is_dirty());
        assert!(state.grid().rows().flatten().all(|&v| v <= 9));
    }

    #[test]
    fn test_same_seed_same_game() {
        let mut a = seeded();
        let mut b = seeded();
        assert_eq!(a.snapshot(), b.snapshot());
        for _ in 0..5 {
            assert_eq!(a.apply_blink(), b.apply_blink());
        }
        assert_eq!(a.snapshot(), b.snapshot());
    }

    #[test]
    fn test_blink_sets_awaiting_and_clears_highlights() {
        let mut state = seeded();
        state.apply_click(state.target());
        assert!(state.feedback().is_some());
        assert_eq!(state.trail().count(), 1);
        state.take_redraw();

        let outcome = state.apply_blink();
        assert!(!outcome.missed);
        assert!(state.awaiting_guess());
        assert!(state.feedback().is_none());
        assert_eq!(state.trail().count(), 0);
        assert!(state.is_dirty());
        assert_eq!(state.blink_count(), 1);
        assert_eq!(outcome.target, state.target());
    }

    #[test]
    fn test_blink_while_awaiting_is_a_miss() {
        let mut state = seeded();
        state.apply_blink();
        state.apply_click(state.target());
        state.apply_blink();
        state.apply_click(state.target());
        assert_eq!(state.streak(), 2);
        assert_eq!(state.score(), 3);

        state.apply_blink();
        let outcome = state.apply_blink();
        assert!(outcome.missed);
        assert_eq!(state.last_result(), LastResult::Missed);
        assert_eq!(state.streak(), 0);
        assert_eq!(state.score(), 3);
    }

    #[test]
    fn test_three_correct_guesses_score_seven() {
        let mut state = seeded();
        for _ in 0..3 {
            state.apply_blink();
            let target = state.target();
            state.apply_click(target);
        }
        assert_eq!(state.streak(), 3);
        assert_eq!(state.score(), 1 + 2 + 4);
        assert_eq!(state.last_result(), LastResult::Correct);
    }

    #[test]
    fn test_wrong_guess_forfeits_everything() {
        let mut state = seeded();
        for _ in 0..3 {
            state.apply_blink();
            state.apply_click(state.target());
        }
        state.apply_blink();
        let outcome = state.apply_click(miss_cell(&state));

        assert_eq!(outcome, ClickOutcome::Wrong { forfeited: 7 });
        assert_eq!(state.score(), 0);
        assert_eq!(state.streak(), 0);
        assert!(!state.awaiting_guess());
        assert!(state.feedback().is_none());
        assert_eq!(state.last_result(), LastResult::Wrong);
    }

    #[test]
    fn test_correct_guess_sets_success_feedback() {
        let mut state = seeded();
        state.apply_blink();
        let target = state.target();
        let outcome = state.apply_click(target);
        assert_eq!(
            outcome,
            ClickOutcome::Correct {
                reward: 1,
                score: 1,
                streak: 1
            }
        );
        assert_eq!(
            state.feedback(),
            Some(Feedback {
                cell: target,
                color: SUCCESS_GREEN
            })
        );
    }

    #[test]
    fn test_take_redraw_clears_dirty_once() {
        let mut state = seeded();
        assert!(state.take_redraw().is_some());
        assert!(state.take_redraw().is_none());
        state.apply_click(Cell::new(0, 0));
        assert!(state.take_redraw().is_some());
        assert!(!state.is_dirty());
        state.mark_dirty();
        assert!(state.take_redraw().is_some());
    }

    #[test]
    fn test_trail_ages_and_is_bounded() {
        let rules = BoardRules {
            trail_len: 3,
            ..BoardRules::default()
        };
        let mut state = GameState::new(rules, Some(1));
        for col in 0..5 {
            state.apply_click(Cell::new(0, col));
        }
        let trail: Vec<TrailEntry> = state.trail().copied().collect();
        assert_eq!(
            trail,
            vec![
                TrailEntry { cell: Cell::new(0, 4), age: 0 },
                TrailEntry { cell: Cell::new(0, 3), age: 1 },
                TrailEntry { cell: Cell::new(0, 2), age: 2 },
            ]
        );
    }

    #[test]
    fn test_long_trail_stays_bounded_past_saturated_ages() {
        let rules = BoardRules {
            trail_len: 300,
            ..BoardRules::default()
        };
        let mut state = GameState::new(rules, Some(6));
        assert_eq!(state.rules().trail_len, MAX_TRAIL_LEN);

        for i in 0..1000 {
            state.apply_click(Cell::new(i % 8, (i / 8) % 8));
        }
        assert_eq!(state.trail().count(), MAX_TRAIL_LEN);
        assert_eq!(state.trail().last().map(|entry| entry.age), Some(u8::MAX));
    }

    #[test]
    fn test_oversized_board_is_clamped() {
        let rules = BoardRules {
            grid_size: 70_000,
            ..BoardRules::default()
        };
        let state = GameState::new(rules, Some(2));
        assert_eq!(state.rules().grid_size, MAX_GRID_SIZE);
        assert_eq!(state.grid().size(), MAX_GRID_SIZE);
        assert!(state.grid().contains(state.target()));
    }

    #[test]
    fn test_zero_trail_len_disables_trail() {
        let rules = BoardRules {
            trail_len: 0,
            ..BoardRules::default()
        };
        let mut state = GameState::new(rules, Some(1));
        state.apply_click(Cell::new(1, 1));
        assert_eq!(state.trail().count(), 0);
    }

    #[test]
    fn test_single_cell_board() {
        let rules = BoardRules {
            grid_size: 1,
            max_num: 0,
            trail_len: 2,
        };
        let mut state = GameState::new(rules, None);
        state.apply_blink();
        assert_eq!(state.target(), Cell::new(0, 0));
        assert_eq!(state.grid().get(Cell::new(0, 0)), Some(0));
        assert!(matches!(state.apply_click(Cell::new(0, 0)), ClickOutcome::Correct { .. }));
    }
}
