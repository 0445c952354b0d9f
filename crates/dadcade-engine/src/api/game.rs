use crate::api::types::{GameEvent, GameType, SoundEvent};
use crate::input::queue::InputQueue;
use crate::renderer::instance::RenderBuffer;
use crate::systems::effects::{EffectsState, Rng};

/// Configuration for the runtime, provided by the game.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Fixed timestep in seconds (default: 1/60).
    pub fixed_dt: f32,
    /// Playfield width in game units.
    pub world_width: f32,
    /// Playfield height in game units.
    pub world_height: f32,
    /// Maximum number of render instances (default: 256).
    pub max_instances: usize,
    /// Maximum number of sound events per frame (default: 32).
    pub max_sounds: usize,
    /// Maximum number of game events per frame (default: 32).
    pub max_events: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            world_width: 400.0,
            world_height: 300.0,
            max_instances: 256,
            max_sounds: 32,
            max_events: 32,
        }
    }
}

/// The contract every arcade game fulfills.
///
/// The host owns the lifecycle: it calls `init` once to start (and again to
/// reset), `update` once per fixed tick until the game finishes through
/// [`EngineContext::finish`], and never again afterward.
pub trait Game {
    /// Return runtime configuration. Called once before init.
    fn config(&self) -> GameConfig {
        GameConfig::default()
    }

    fn game_type(&self) -> GameType;

    /// Put the game into a fresh random initial state.
    /// Calling it on a game already in its initial state changes nothing observable.
    fn init(&mut self, ctx: &mut EngineContext);

    /// One fixed tick: consume input, advance timers and simulation.
    fn update(&mut self, ctx: &mut EngineContext, input: &InputQueue);

    /// Current score.
    fn score(&self) -> u32;

    /// Whether a player quit may be recorded with the current score.
    /// Games whose score is only meaningful at their end condition return false,
    /// and quitting them is treated as a cancel.
    fn may_end_early(&self) -> bool {
        true
    }

    /// Optional read-only render pass. Rendering is a pure projection of state.
    fn render(&self, _ctx: &mut RenderContext) {}

    /// Text-bearing state the UI layer draws itself (questions, targets, timers).
    fn snapshot(&self) -> serde_json::Value {
        serde_json::Value::Null
    }
}

/// Mutable runtime state, passed to `Game::init` and `Game::update`.
pub struct EngineContext {
    pub effects: EffectsState,
    pub sounds: Vec<SoundEvent>,
    pub events: Vec<GameEvent>,
    pub rng: Rng,
    dt: f32,
    finished: Option<u32>,
}

impl EngineContext {
    pub fn new(seed: u64) -> Self {
        Self::with_dt(seed, GameConfig::default().fixed_dt)
    }

    /// Create a context whose tick length matches the game's fixed timestep.
    pub fn with_dt(seed: u64, dt: f32) -> Self {
        Self {
            effects: EffectsState::new(seed),
            sounds: Vec::new(),
            events: Vec::new(),
            rng: Rng::new(seed),
            dt,
            finished: None,
        }
    }

    /// Length of one tick in seconds.
    pub fn dt(&self) -> f32 {
        self.dt
    }

    /// Emit a sound event to be forwarded to TypeScript.
    pub fn emit_sound(&mut self, event: SoundEvent) {
        self.sounds.push(event);
    }

    /// Emit a game event to be forwarded to TypeScript.
    pub fn emit_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Signal that the game reached its terminal condition.
    /// Only the first call counts; later calls are ignored.
    pub fn finish(&mut self, score: u32) {
        if self.finished.is_none() {
            log::debug!("game finished with score {}", score);
            self.finished = Some(score);
        }
    }

    /// Final score, once the game has finished.
    pub fn finished(&self) -> Option<u32> {
        self.finished
    }

    pub fn is_finished(&self) -> bool {
        self.finished.is_some()
    }

    /// Clear per-frame transient data (sounds, events).
    pub fn clear_frame_data(&mut self) {
        self.sounds.clear();
        self.events.clear();
    }

    /// Forget the finish signal and all transient state. Used on reset.
    pub fn reset(&mut self) {
        self.finished = None;
        self.effects.clear();
        self.clear_frame_data();
    }
}

impl Default for EngineContext {
    fn default() -> Self {
        Self::new(42)
    }
}

/// Render context for the projection pass.
pub struct RenderContext<'a> {
    pub render_buffer: &'a mut RenderBuffer,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finish_is_sticky() {
        let mut ctx = EngineContext::new(1);
        assert!(!ctx.is_finished());
        ctx.finish(30);
        ctx.finish(99);
        assert_eq!(ctx.finished(), Some(30));
    }

    #[test]
    fn reset_clears_finish_and_frame_data() {
        let mut ctx = EngineContext::new(1);
        ctx.emit_sound(SoundEvent::HIT);
        ctx.emit_event(GameEvent::new(1.0, 2.0, 0.0, 0.0));
        ctx.finish(10);
        ctx.reset();
        assert!(ctx.finished().is_none());
        assert!(ctx.sounds.is_empty());
        assert!(ctx.events.is_empty());
    }

    #[test]
    fn with_dt_sets_tick_length() {
        let ctx = EngineContext::with_dt(1, 0.5);
        assert_eq!(ctx.dt(), 0.5);
    }
}
