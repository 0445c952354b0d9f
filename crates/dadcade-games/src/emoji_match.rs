use serde::Serialize;

use dadcade_engine::*;

use crate::config::MatchConfig;

/// Event kind: a = target symbol index.
pub const EVENT_TARGET: f32 = 101.0;

/// Result of a single cell click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Target cleared; `round_cleared` when it was the last one.
    Hit { round_cleared: bool },
    Miss,
    /// Empty cell, out of range, or a reseed is pending.
    Ignored,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MatchSnapshot<'a> {
    target: u8,
    grid: &'a [Option<u8>],
    grid_size: usize,
    score: u32,
    seconds_left: u32,
    round: u32,
    reseeding: bool,
}

/// Find-the-target grid game.
///
/// A square grid is seeded with random symbols, a share of them forced to the
/// round's target. Clicking a target clears it for points; clicking any other
/// symbol costs points. Clearing every target earns a bonus and a new grid.
pub struct EmojiMatch {
    config: MatchConfig,
    grid: Vec<Option<u8>>,
    target: u8,
    score: u32,
    round: u32,
    clock: Countdown,
    reseed: Countdown,
}

impl EmojiMatch {
    pub fn new(config: MatchConfig) -> Self {
        let cells = config.grid_size * config.grid_size;
        Self {
            clock: Countdown::start(config.duration),
            config,
            grid: vec![None; cells],
            target: 0,
            score: 0,
            round: 0,
            reseed: Countdown::idle(),
        }
    }

    pub fn target(&self) -> u8 {
        self.target
    }

    pub fn grid(&self) -> &[Option<u8>] {
        &self.grid
    }

    pub fn remaining_targets(&self) -> usize {
        self.grid.iter().filter(|c| **c == Some(self.target)).count()
    }

    pub fn occupied_cells(&self) -> usize {
        self.grid.iter().filter(|c| c.is_some()).count()
    }

    pub fn seconds_left(&self) -> f32 {
        self.clock.remaining()
    }

    pub fn is_reseeding(&self) -> bool {
        self.reseed.is_armed()
    }

    /// Fill the grid with a fresh random layout and target.
    fn seed_grid(&mut self, rng: &mut Rng) {
        let symbols = self.config.symbols as u32;
        self.target = rng.next_int(symbols) as u8;
        for cell in self.grid.iter_mut() {
            *cell = Some(if rng.chance(self.config.target_density) {
                self.target
            } else {
                rng.next_int(symbols) as u8
            });
        }
        if self.remaining_targets() == 0 && !self.grid.is_empty() {
            let i = rng.index(self.grid.len());
            self.grid[i] = Some(self.target);
        }
        self.round += 1;
    }

    /// Apply a click on cell `index` (row-major).
    pub fn click(&mut self, index: usize) -> ClickOutcome {
        if self.reseed.is_armed() {
            return ClickOutcome::Ignored;
        }
        let Some(cell) = self.grid.get_mut(index) else {
            return ClickOutcome::Ignored;
        };
        match *cell {
            None => ClickOutcome::Ignored,
            Some(symbol) if symbol == self.target => {
                *cell = None;
                self.score += self.config.hit_reward;
                let round_cleared = self.remaining_targets() == 0;
                if round_cleared {
                    self.reseed.arm(self.config.reseed_delay);
                }
                ClickOutcome::Hit { round_cleared }
            }
            Some(_) => {
                self.score = self.score.saturating_sub(self.config.miss_penalty);
                ClickOutcome::Miss
            }
        }
    }
}

impl Game for EmojiMatch {
    fn config(&self) -> GameConfig {
        let side = self.config.grid_size as f32;
        GameConfig {
            world_width: side,
            world_height: side,
            ..GameConfig::default()
        }
    }

    fn game_type(&self) -> GameType {
        GameType::Match
    }

    fn init(&mut self, ctx: &mut EngineContext) {
        self.score = 0;
        self.round = 0;
        self.clock = Countdown::start(self.config.duration);
        self.reseed.cancel();
        self.seed_grid(&mut ctx.rng);
        ctx.emit_event(GameEvent::new(EVENT_TARGET, self.target as f32, 0.0, 0.0));
    }

    fn update(&mut self, ctx: &mut EngineContext, input: &InputQueue) {
        if ctx.is_finished() {
            return;
        }
        let before = self.score;
        for index in input.selections() {
            match self.click(index) {
                ClickOutcome::Hit { .. } => ctx.emit_sound(SoundEvent::HIT),
                ClickOutcome::Miss => ctx.emit_sound(SoundEvent::MISS),
                ClickOutcome::Ignored => {}
            }
        }

        let dt = ctx.dt();
        let whole_before = self.clock.remaining().ceil();
        if self.clock.tick(dt) {
            self.reseed.cancel();
            ctx.emit_sound(SoundEvent::GAME_OVER);
            ctx.emit_event(GameEvent::new(event_kind::GAME_OVER, self.score as f32, 0.0, 0.0));
            ctx.finish(self.score);
            return;
        }
        if self.clock.remaining().ceil() < whole_before {
            ctx.emit_event(GameEvent::new(event_kind::TIMER, self.clock.remaining().ceil(), 0.0, 0.0));
        }

        if self.reseed.tick(dt) {
            self.score += self.config.clear_bonus;
            self.seed_grid(&mut ctx.rng);
            log::debug!("match round {} target {}", self.round, self.target);
            ctx.emit_sound(SoundEvent::BONUS);
            ctx.emit_event(GameEvent::new(EVENT_TARGET, self.target as f32, 0.0, 0.0));
            ctx.emit_event(GameEvent::new(event_kind::ROUND, self.round as f32, 0.0, 0.0));
        }

        if self.score != before {
            ctx.emit_event(GameEvent::new(event_kind::SCORE, self.score as f32, 0.0, 0.0));
        }
    }

    fn score(&self) -> u32 {
        self.score
    }

    fn render(&self, ctx: &mut RenderContext) {
        let side = self.config.grid_size;
        for (i, cell) in self.grid.iter().enumerate() {
            if let Some(symbol) = cell {
                let (row, col) = (i / side, i % side);
                ctx.render_buffer.push(RenderInstance::rect(
                    col as f32 + 0.5,
                    row as f32 + 0.5,
                    0.9,
                    0.9,
                    sprite::CELL,
                    *symbol as f32,
                ));
            }
        }
    }

    fn snapshot(&self) -> serde_json::Value {
        serde_json::to_value(MatchSnapshot {
            target: self.target,
            grid: &self.grid,
            grid_size: self.config.grid_size,
            score: self.score,
            seconds_left: self.clock.remaining().ceil() as u32,
            round: self.round,
            reseeding: self.reseed.is_armed(),
        })
        .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 5×5 grid, target 3 at cells 0 and 1, symbol 7 at cell 2, rest empty.
    fn fixed_game() -> EmojiMatch {
        let mut game = EmojiMatch::new(MatchConfig::default());
        game.target = 3;
        game.grid = vec![None; 25];
        game.grid[0] = Some(3);
        game.grid[1] = Some(3);
        game.grid[2] = Some(7);
        game.grid[3] = Some(3);
        game
    }

    #[test]
    fn init_guarantees_a_target() {
        let config = MatchConfig {
            target_density: 0.0,
            ..MatchConfig::default()
        };
        for seed in 1..50 {
            let mut game = EmojiMatch::new(config.clone());
            let mut ctx = EngineContext::new(seed);
            game.init(&mut ctx);
            assert!(game.remaining_targets() >= 1, "seed {}", seed);
            assert_eq!(game.occupied_cells(), 25);
        }
    }

    #[test]
    fn two_correct_clicks_score_twenty_and_clear_two_cells() {
        let mut game = fixed_game();
        let cells = game.occupied_cells();
        assert_eq!(game.click(0), ClickOutcome::Hit { round_cleared: false });
        assert_eq!(game.click(1), ClickOutcome::Hit { round_cleared: false });
        assert_eq!(game.score(), 20);
        assert_eq!(game.occupied_cells(), cells - 2);
    }

    #[test]
    fn wrong_click_penalty_clamps_at_zero() {
        let mut game = fixed_game();
        assert_eq!(game.click(2), ClickOutcome::Miss);
        assert_eq!(game.score(), 0);
        game.click(0);
        game.click(2);
        assert_eq!(game.score(), 5);
    }

    #[test]
    fn empty_and_out_of_range_clicks_are_ignored() {
        let mut game = fixed_game();
        assert_eq!(game.click(10), ClickOutcome::Ignored);
        assert_eq!(game.click(999), ClickOutcome::Ignored);
        assert_eq!(game.score(), 0);
    }

    #[test]
    fn last_target_pays_bonus_and_reseeds() {
        let mut game = fixed_game();
        let mut ctx = EngineContext::new(9);
        game.click(0);
        game.click(1);
        assert_eq!(game.click(3), ClickOutcome::Hit { round_cleared: true });
        assert!(game.is_reseeding());
        assert_eq!(game.click(2), ClickOutcome::Ignored, "clicks ignored while pending");
        assert_eq!(game.score(), 30);

        let empty = InputQueue::new();
        for _ in 0..40 {
            game.update(&mut ctx, &empty);
        }
        assert!(!game.is_reseeding());
        assert_eq!(game.score(), 80);
        assert_eq!(game.occupied_cells(), 25);
        assert!(game.remaining_targets() >= 1);
    }

    #[test]
    fn countdown_finishes_session() {
        let config = MatchConfig {
            duration: 1.0,
            ..MatchConfig::default()
        };
        let mut game = EmojiMatch::new(config);
        let mut ctx = EngineContext::new(4);
        game.init(&mut ctx);
        let empty = InputQueue::new();
        for _ in 0..70 {
            game.update(&mut ctx, &empty);
        }
        assert_eq!(ctx.finished(), Some(game.score()));
    }

    #[test]
    fn selections_from_input_are_applied() {
        let mut game = fixed_game();
        let mut ctx = EngineContext::new(2);
        let input: InputQueue = [InputEvent::Select { index: 0 }].into_iter().collect();
        game.update(&mut ctx, &input);
        assert_eq!(game.score(), 10);
        assert_eq!(ctx.sounds, vec![SoundEvent::HIT]);
    }
}
