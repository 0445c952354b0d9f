mod world;

pub use world::{Ball, CatchWorld, Paddle, StepReport};

use dadcade_engine::*;

use crate::config::CatchConfig;

const BURST_PARTICLES: usize = 12;
const BURST_SPEED: f32 = 140.0;
const BURST_LIFETIME: f32 = 0.6;

/// Catch the falling balls with a paddle. Three misses end the game.
pub struct CatchBall {
    world: CatchWorld,
}

impl CatchBall {
    pub fn new(config: CatchConfig) -> Self {
        Self {
            world: CatchWorld::new(config),
        }
    }

    pub fn world(&self) -> &CatchWorld {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut CatchWorld {
        &mut self.world
    }

    fn apply_input(&mut self, input: &InputQueue) {
        let step = self.world.config().paddle_step;
        for event in input.iter() {
            if let InputEvent::KeyDown { key_code: code } = *event {
                match code {
                    key_code::ARROW_LEFT => self.world.nudge_paddle(-step),
                    key_code::ARROW_RIGHT => self.world.nudge_paddle(step),
                    _ => {}
                }
            }
        }
        if let Some(x) = input.last_pointer_x() {
            self.world.set_paddle(x);
        }
    }
}

impl Game for CatchBall {
    fn config(&self) -> GameConfig {
        let c = self.world.config();
        GameConfig {
            world_width: c.width,
            world_height: c.height,
            ..GameConfig::default()
        }
    }

    fn game_type(&self) -> GameType {
        GameType::Catch
    }

    fn init(&mut self, ctx: &mut EngineContext) {
        self.world.reset();
        ctx.effects.clear();
        ctx.emit_event(GameEvent::new(event_kind::LIVES, self.world.lives() as f32, 0.0, 0.0));
    }

    fn update(&mut self, ctx: &mut EngineContext, input: &InputQueue) {
        if ctx.is_finished() {
            return;
        }
        self.apply_input(input);

        let dt = ctx.dt();
        let report = self.world.step(dt, &mut ctx.rng);

        for at in &report.caught {
            ctx.effects
                .spawn_burst(*at, BURST_PARTICLES, BURST_SPEED, BURST_LIFETIME);
            ctx.emit_sound(SoundEvent::HIT);
        }
        if !report.caught.is_empty() {
            ctx.emit_event(GameEvent::new(event_kind::SCORE, self.world.score() as f32, 0.0, 0.0));
        }
        if report.level_changed {
            ctx.emit_sound(SoundEvent::BONUS);
            ctx.emit_event(GameEvent::new(event_kind::LEVEL, self.world.level() as f32, 0.0, 0.0));
        }
        if report.missed > 0 {
            ctx.emit_sound(SoundEvent::MISS);
            ctx.emit_event(GameEvent::new(event_kind::LIVES, self.world.lives() as f32, 0.0, 0.0));
        }
        ctx.effects.tick(dt);

        if report.game_over {
            let score = self.world.score();
            log::info!("catch-ball over at level {} with {}", self.world.level(), score);
            ctx.emit_sound(SoundEvent::GAME_OVER);
            ctx.emit_event(GameEvent::new(event_kind::GAME_OVER, score as f32, 0.0, 0.0));
            ctx.finish(score);
        }
    }

    fn score(&self) -> u32 {
        self.world.score()
    }

    fn render(&self, ctx: &mut RenderContext) {
        self.world.project(ctx.render_buffer);
    }

    fn snapshot(&self) -> serde_json::Value {
        serde_json::json!({
            "score": self.world.score(),
            "lives": self.world.lives(),
            "level": self.world.level(),
            "balls": self.world.balls().len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn started() -> (CatchBall, EngineContext) {
        let mut game = CatchBall::new(CatchConfig::default());
        let mut ctx = EngineContext::new(12);
        game.init(&mut ctx);
        ctx.clear_frame_data();
        (game, ctx)
    }

    #[test]
    fn pointer_moves_paddle_with_clamp() {
        let (mut game, mut ctx) = started();
        let input: InputQueue = [InputEvent::PointerMove { x: 5.0, y: 0.0 }].into_iter().collect();
        game.update(&mut ctx, &input);
        assert_eq!(game.world().paddle().x, 30.0);
    }

    #[test]
    fn arrow_keys_nudge_paddle() {
        let (mut game, mut ctx) = started();
        let input: InputQueue = [
            InputEvent::KeyDown { key_code: key_code::ARROW_RIGHT },
            InputEvent::KeyDown { key_code: key_code::ARROW_RIGHT },
        ]
        .into_iter()
        .collect();
        game.update(&mut ctx, &input);
        assert_eq!(game.world().paddle().x, 240.0);
    }

    #[test]
    fn catch_spawns_particles_and_scores() {
        let (mut game, mut ctx) = started();
        game.world_mut().insert_ball(Vec2::new(200.0, 272.0), Vec2::new(0.0, 120.0));
        game.update(&mut ctx, &InputQueue::new());
        assert_eq!(game.score(), 10);
        assert!(!ctx.effects.is_empty());
        assert!(ctx.sounds.contains(&SoundEvent::HIT));
    }

    #[test]
    fn losing_all_lives_finishes_once() {
        let (mut game, mut ctx) = started();
        let empty = InputQueue::new();
        game.world_mut().set_paddle(30.0);
        for _ in 0..3 {
            game.world_mut().insert_ball(Vec2::new(350.0, 309.0), Vec2::new(0.0, 300.0));
            game.update(&mut ctx, &empty);
        }
        assert_eq!(ctx.finished(), Some(0));
        let before = game.world().balls().len();
        game.update(&mut ctx, &empty);
        assert_eq!(game.world().balls().len(), before);
    }

    #[test]
    fn init_resets_world_and_effects() {
        let (mut game, mut ctx) = started();
        game.world_mut().insert_ball(Vec2::new(200.0, 272.0), Vec2::new(0.0, 120.0));
        game.update(&mut ctx, &InputQueue::new());
        game.init(&mut ctx);
        assert_eq!(game.score(), 0);
        assert_eq!(game.world().lives(), 3);
        assert!(game.world().balls().is_empty());
        assert!(ctx.effects.is_empty());
    }
}
