//! Authoritative catch-ball simulation.
//!
//! One `step` runs the whole tick in a fixed order: spawn, integrate,
//! bounce off the side walls, test the paddle, test the floor, then apply
//! score, lives and level. Nothing outside this module mutates the world.

use glam::Vec2;

use dadcade_engine::{sprite, RenderBuffer, RenderInstance, Interval, Rng};

use crate::config::CatchConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ball {
    pub id: u32,
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paddle {
    /// Horizontal center.
    pub x: f32,
    pub width: f32,
    pub height: f32,
    /// Y of the top edge.
    pub top: f32,
}

impl Paddle {
    pub fn left(&self) -> f32 {
        self.x - self.width * 0.5
    }

    pub fn right(&self) -> f32 {
        self.x + self.width * 0.5
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    /// Circle vs axis-aligned box overlap.
    fn overlaps(&self, center: Vec2, radius: f32) -> bool {
        let closest = Vec2::new(
            center.x.clamp(self.left(), self.right()),
            center.y.clamp(self.top, self.bottom()),
        );
        center.distance_squared(closest) <= radius * radius
    }

    /// Whether the ball's lowest point crossed the paddle top during this tick
    /// while horizontally within reach. Catches fast balls that jump past the box.
    fn swept(&self, from: Vec2, to: Vec2, radius: f32) -> bool {
        let (before, after) = (from.y + radius, to.y + radius);
        if !(before <= self.top && after >= self.top) {
            return false;
        }
        let t = if after > before { (self.top - before) / (after - before) } else { 0.0 };
        let x = from.x + (to.x - from.x) * t;
        x >= self.left() - radius && x <= self.right() + radius
    }
}

/// What happened during one step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepReport {
    /// Positions where balls were caught.
    pub caught: Vec<Vec2>,
    pub missed: u32,
    pub spawned: u32,
    pub level_changed: bool,
    pub game_over: bool,
}

pub struct CatchWorld {
    config: CatchConfig,
    paddle: Paddle,
    balls: Vec<Ball>,
    next_id: u32,
    lives: u32,
    level: u32,
    score: u32,
    spawn: Interval,
    over: bool,
}

impl CatchWorld {
    pub fn new(config: CatchConfig) -> Self {
        let paddle = Paddle {
            x: config.width * 0.5,
            width: config.paddle_width,
            height: config.paddle_height,
            top: config.paddle_top,
        };
        Self {
            paddle,
            balls: Vec::with_capacity(config.max_balls),
            next_id: 0,
            lives: config.lives,
            level: 1,
            score: 0,
            spawn: Interval::new(config.spawn_interval(1)),
            over: false,
            config,
        }
    }

    /// Back to the initial state. Calling it twice changes nothing.
    pub fn reset(&mut self) {
        self.balls.clear();
        self.next_id = 0;
        self.lives = self.config.lives;
        self.level = 1;
        self.score = 0;
        self.paddle.x = self.config.width * 0.5;
        self.spawn = Interval::new(self.config.spawn_interval(1));
        self.over = false;
    }

    pub fn config(&self) -> &CatchConfig {
        &self.config
    }

    pub fn paddle(&self) -> &Paddle {
        &self.paddle
    }

    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn is_over(&self) -> bool {
        self.over
    }

    /// Center the paddle on `x`, kept fully inside the playfield.
    pub fn set_paddle(&mut self, x: f32) {
        let half = self.paddle.width * 0.5;
        if x.is_finite() {
            self.paddle.x = x.clamp(half, self.config.width - half);
        }
    }

    pub fn nudge_paddle(&mut self, dx: f32) {
        self.set_paddle(self.paddle.x + dx);
    }

    /// Add a ball at the top of the field. Skipped at the ball cap.
    pub fn spawn_ball(&mut self, rng: &mut Rng) -> bool {
        if self.balls.len() >= self.config.max_balls {
            return false;
        }
        let r = self.config.ball_radius;
        let vx = self.config.max_launch_vx;
        self.balls.push(Ball {
            id: self.next_id,
            position: Vec2::new(rng.range_f32(r, self.config.width - r), -r),
            velocity: Vec2::new(rng.range_f32(-vx, vx), self.config.launch_vy(self.level)),
            radius: r,
        });
        self.next_id = self.next_id.wrapping_add(1);
        true
    }

    /// Place a ball directly. Respects the cap like `spawn_ball`.
    pub fn insert_ball(&mut self, position: Vec2, velocity: Vec2) -> bool {
        if self.balls.len() >= self.config.max_balls {
            return false;
        }
        self.balls.push(Ball {
            id: self.next_id,
            position,
            velocity: Vec2::new(velocity.x, velocity.y.max(0.0)),
            radius: self.config.ball_radius,
        });
        self.next_id = self.next_id.wrapping_add(1);
        true
    }

    /// Advance the world by `dt` seconds.
    pub fn step(&mut self, dt: f32, rng: &mut Rng) -> StepReport {
        let mut report = StepReport::default();
        if self.over {
            return report;
        }

        self.spawn.set_period(self.config.spawn_interval(self.level));
        for _ in 0..self.spawn.tick(dt) {
            if self.spawn_ball(rng) {
                report.spawned += 1;
            }
        }

        let gravity = self.config.gravity(self.level);
        let width = self.config.width;
        let floor = self.config.height;
        let paddle = self.paddle;

        self.balls.retain_mut(|ball| {
            let from = ball.position;
            ball.velocity.y += gravity * dt;
            ball.position += ball.velocity * dt;

            let r = ball.radius;
            if ball.position.x - r < 0.0 {
                ball.position.x = r;
                ball.velocity.x = ball.velocity.x.abs();
            } else if ball.position.x + r > width {
                ball.position.x = width - r;
                ball.velocity.x = -ball.velocity.x.abs();
            }

            if paddle.overlaps(ball.position, r) || paddle.swept(from, ball.position, r) {
                report.caught.push(ball.position);
                return false;
            }
            if ball.position.y - r > floor {
                report.missed += 1;
                return false;
            }
            true
        });

        if !report.caught.is_empty() {
            self.score += self.config.catch_reward * report.caught.len() as u32;
            let level = self.config.level_for(self.score);
            if level != self.level {
                log::debug!("catch level {} -> {}", self.level, level);
                self.level = level;
                report.level_changed = true;
            }
        }
        if report.missed > 0 {
            self.lives = self.lives.saturating_sub(report.missed);
            if self.lives == 0 {
                self.over = true;
                self.balls.clear();
                report.game_over = true;
            }
        }
        report
    }

    /// Write paddle and balls into the render buffer.
    pub fn project(&self, buffer: &mut RenderBuffer) {
        let p = &self.paddle;
        buffer.push(RenderInstance::rect(
            p.x,
            p.top + p.height * 0.5,
            p.width,
            p.height,
            sprite::PADDLE,
            0.0,
        ));
        for ball in &self.balls {
            let d = ball.radius * 2.0;
            buffer.push(RenderInstance::rect(
                ball.position.x,
                ball.position.y,
                d,
                d,
                sprite::BALL,
                (ball.id % 4) as f32,
            ));
        }
    }
}
