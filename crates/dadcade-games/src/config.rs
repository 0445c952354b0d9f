use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid arcade config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("arcade config out of range: {0}")]
    Invalid(String),
}

/// Every tunable of the four games and the host.
/// Loaded from JSON at runtime; missing fields keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ArcadeConfig {
    #[serde(rename = "match")]
    pub match_game: MatchConfig,
    pub memory: MemoryConfig,
    pub trivia: TriviaConfig,
    pub catch: CatchConfig,
    /// Seconds the final score stays on screen before the host returns to idle.
    pub display_delay: f32,
}

impl Default for ArcadeConfig {
    fn default() -> Self {
        Self {
            match_game: MatchConfig::default(),
            memory: MemoryConfig::default(),
            trivia: TriviaConfig::default(),
            catch: CatchConfig::default(),
            display_delay: 2.0,
        }
    }
}

impl ArcadeConfig {
    /// Parse a config from a JSON string, then check it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let m = &self.match_game;
        if m.grid_size == 0 || m.symbols < 2 {
            return Err(ConfigError::Invalid(
                "match grid needs at least one cell and two symbols".into(),
            ));
        }
        if !(0.0..=1.0).contains(&m.target_density) {
            return Err(ConfigError::Invalid("match target density must be in [0, 1]".into()));
        }
        if self.memory.pairs == 0 {
            return Err(ConfigError::Invalid("memory needs at least one pair".into()));
        }
        if self.trivia.questions == 0 {
            return Err(ConfigError::Invalid("trivia needs at least one question".into()));
        }
        let c = &self.catch;
        if c.paddle_width <= 0.0 || c.paddle_width > c.width {
            return Err(ConfigError::Invalid("paddle must fit inside the playfield".into()));
        }
        if c.ball_radius <= 0.0 || c.min_spawn_interval <= 0.0 {
            return Err(ConfigError::Invalid("catch radius and spawn interval must be positive".into()));
        }
        if self.display_delay < 0.0 {
            return Err(ConfigError::Invalid("display delay must not be negative".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MatchConfig {
    /// Cells per side; the grid is square.
    pub grid_size: usize,
    pub symbols: u8,
    /// Probability that a cell is forced to the target symbol.
    pub target_density: f32,
    pub hit_reward: u32,
    pub miss_penalty: u32,
    pub clear_bonus: u32,
    /// Delay before the bonus lands and the grid reseeds.
    pub reseed_delay: f32,
    pub duration: f32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            grid_size: 5,
            symbols: 10,
            target_density: 0.3,
            hit_reward: 10,
            miss_penalty: 5,
            clear_bonus: 50,
            reseed_delay: 0.5,
            duration: 60.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MemoryConfig {
    pub pairs: u8,
    /// How long a flipped pair stays face up before it is judged.
    pub reveal_delay: f32,
    pub base_score: u32,
    /// Points lost per failed move.
    pub move_penalty: u32,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            pairs: 6,
            reveal_delay: 1.0,
            base_score: 1000,
            move_penalty: 25,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TriviaConfig {
    pub questions: u32,
    /// Refetches allowed when the source returns an already-seen question.
    pub retry_budget: u32,
    pub reveal_delay: f32,
}

impl Default for TriviaConfig {
    fn default() -> Self {
        Self {
            questions: 10,
            retry_budget: 5,
            reveal_delay: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CatchConfig {
    pub width: f32,
    pub height: f32,
    pub paddle_width: f32,
    pub paddle_height: f32,
    /// Y of the paddle's top edge.
    pub paddle_top: f32,
    /// Distance the paddle moves per arrow-key press.
    pub paddle_step: f32,
    pub ball_radius: f32,
    pub lives: u32,
    pub catch_reward: u32,
    /// Gravity per level, in px/s².
    pub gravity_per_level: f32,
    pub base_spawn_interval: f32,
    pub spawn_interval_step: f32,
    pub min_spawn_interval: f32,
    /// Horizontal launch speed bound, in px/s.
    pub max_launch_vx: f32,
    /// Concurrent balls allowed; spawns at the cap are skipped.
    pub max_balls: usize,
    pub points_per_level: u32,
}

impl Default for CatchConfig {
    fn default() -> Self {
        Self {
            width: 400.0,
            height: 300.0,
            paddle_width: 60.0,
            paddle_height: 10.0,
            paddle_top: 280.0,
            paddle_step: 20.0,
            ball_radius: 10.0,
            lives: 3,
            catch_reward: 10,
            gravity_per_level: 60.0,
            base_spawn_interval: 1.0,
            spawn_interval_step: 0.1,
            min_spawn_interval: 0.3,
            max_launch_vx: 40.0,
            max_balls: 24,
            points_per_level: 100,
        }
    }
}

impl CatchConfig {
    pub fn gravity(&self, level: u32) -> f32 {
        self.gravity_per_level * level as f32
    }

    pub fn spawn_interval(&self, level: u32) -> f32 {
        (self.base_spawn_interval - self.spawn_interval_step * level as f32)
            .max(self.min_spawn_interval)
    }

    /// Initial downward speed of a ball spawned at `level`.
    pub fn launch_vy(&self, level: u32) -> f32 {
        (2.0 + 0.5 * level as f32) * 60.0
    }

    pub fn level_for(&self, score: u32) -> u32 {
        score / self.points_per_level.max(1) + 1
    }
}
