pub mod catch_ball;
pub mod config;
pub mod emoji_match;
pub mod host;
pub mod memory;
pub mod stats;
pub mod trivia;

pub use catch_ball::{CatchBall, CatchWorld};
pub use config::{ArcadeConfig, CatchConfig, ConfigError, MatchConfig, MemoryConfig, TriviaConfig};
pub use emoji_match::EmojiMatch;
pub use host::{DefaultCatalog, GameFactory, GameHost, HostError, HostPhase, SessionHandle};
pub use memory::Memory;
pub use stats::ArcadeStats;
pub use trivia::{
    Category, Difficulty, FallbackBank, QueueSource, SourceError, Trivia, TriviaQuestion, TriviaSource,
};
