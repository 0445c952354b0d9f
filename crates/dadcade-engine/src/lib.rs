pub mod api;
pub mod core;
pub mod systems;
pub mod renderer;
pub mod bridge;
pub mod input;

// Re-export key types at crate root for convenience
pub use api::game::{Game, GameConfig, EngineContext, RenderContext};
pub use api::types::{GameEvent, GameType, SoundEvent, event_kind};
pub use api::session::{GameSession, ScoreRecorder, RecordError, MemoryRecorder};
pub use core::time::{FixedTimestep, Countdown, Interval};
pub use renderer::instance::{RenderInstance, RenderBuffer, sprite};
pub use input::queue::{InputEvent, InputQueue, key_code};
pub use bridge::protocol::ProtocolLayout;
pub use systems::effects::{EffectsState, Particle, Rng};
