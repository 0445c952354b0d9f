use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Which of the four arcade games a session belongs to.
/// Serialized with the identifiers the persistence schema uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GameType {
    #[serde(rename = "emoji-match")]
    Match,
    #[serde(rename = "emoji-memory")]
    Memory,
    #[serde(rename = "trivia")]
    Trivia,
    #[serde(rename = "catch-ball")]
    Catch,
}

impl GameType {
    pub const ALL: [GameType; 4] = [
        GameType::Match,
        GameType::Memory,
        GameType::Trivia,
        GameType::Catch,
    ];

    /// Wire identifier, as used by the UI and the session records.
    pub fn as_str(self) -> &'static str {
        match self {
            GameType::Match => "emoji-match",
            GameType::Memory => "emoji-memory",
            GameType::Trivia => "trivia",
            GameType::Catch => "catch-ball",
        }
    }

    /// Parse a wire identifier. Unknown ids yield `None`.
    pub fn parse(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.as_str() == id)
    }

    /// Title shown on the arcade selector.
    pub fn title(self) -> &'static str {
        match self {
            GameType::Match => "EMOJI MATCH",
            GameType::Memory => "MEMORY MASTER",
            GameType::Trivia => "DAD TRIVIA",
            GameType::Catch => "CATCH MASTER",
        }
    }
}

/// A sound event emitted by the game logic.
/// The numeric value maps to a sound in the TypeScript SoundManager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct SoundEvent(pub u32);

impl SoundEvent {
    pub const HIT: SoundEvent = SoundEvent(0);
    pub const MISS: SoundEvent = SoundEvent(1);
    pub const BONUS: SoundEvent = SoundEvent(2);
    pub const GAME_OVER: SoundEvent = SoundEvent(3);
}

/// A game event communicated from Rust to TypeScript through wasm memory.
/// Generic container: `kind` identifies the event, `a/b/c` carry payload.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct GameEvent {
    pub kind: f32,
    pub a: f32,
    pub b: f32,
    pub c: f32,
}

impl GameEvent {
    pub const FLOATS: usize = 4;

    pub fn new(kind: f32, a: f32, b: f32, c: f32) -> Self {
        Self { kind, a, b, c }
    }
}

/// Event kinds shared by every game. Games may define their own above 100.
pub mod event_kind {
    /// a = score
    pub const SCORE: f32 = 1.0;
    /// a = lives remaining
    pub const LIVES: f32 = 2.0;
    /// a = level
    pub const LEVEL: f32 = 3.0;
    /// a = seconds remaining
    pub const TIMER: f32 = 4.0;
    /// a = final score
    pub const GAME_OVER: f32 = 5.0;
    /// a = round number
    pub const ROUND: f32 = 6.0;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn game_type_wire_ids_round_trip() {
        for g in GameType::ALL {
            assert_eq!(GameType::parse(g.as_str()), Some(g));
        }
        assert_eq!(GameType::parse("pinball"), None);
    }

    #[test]
    fn game_type_serde_uses_wire_ids() {
        let json = serde_json::to_string(&GameType::Catch).unwrap();
        assert_eq!(json, "\"catch-ball\"");
    }

    #[test]
    fn game_event_is_four_floats() {
        assert_eq!(std::mem::size_of::<GameEvent>(), GameEvent::FLOATS * 4);
    }
}
