use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

use crate::api::types::GameType;

/// A single finalized play-through, handed to the persistence collaborator.
/// Built once by the game host and never mutated afterward.
///
/// Serializes with a derived `durationSeconds` field; it is ignored on input.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSession {
    pub game_type: GameType,
    pub score: u32,
    /// Epoch milliseconds.
    pub start_time: u64,
    /// Epoch milliseconds.
    pub end_time: u64,
    /// False when the player stopped before the game's own end condition.
    pub completed: bool,
}

impl GameSession {
    pub fn new(game_type: GameType, score: u32, start_time: u64, end_time: u64, completed: bool) -> Self {
        Self {
            game_type,
            score,
            start_time,
            end_time: end_time.max(start_time),
            completed,
        }
    }

    /// A session that reached its end condition.
    pub fn completed(game_type: GameType, score: u32, start_time: u64, end_time: u64) -> Self {
        Self::new(game_type, score, start_time, end_time, true)
    }

    /// A session the player stopped early.
    pub fn ended_early(game_type: GameType, score: u32, start_time: u64, end_time: u64) -> Self {
        Self::new(game_type, score, start_time, end_time, false)
    }

    /// Whole seconds between start and end.
    pub fn duration_seconds(&self) -> u64 {
        self.end_time.saturating_sub(self.start_time) / 1000
    }

    /// JSON payload for the session endpoint, including the derived duration.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl Serialize for GameSession {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Payload {
            game_type: GameType,
            score: u32,
            start_time: u64,
            end_time: u64,
            completed: bool,
            duration_seconds: u64,
        }
        Payload {
            game_type: self.game_type,
            score: self.score,
            start_time: self.start_time,
            end_time: self.end_time,
            completed: self.completed,
            duration_seconds: self.duration_seconds(),
        }
        .serialize(serializer)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("score store unavailable: {0}")]
    Unavailable(String),
    #[error("score store rejected session: {0}")]
    Rejected(String),
}

/// Persistence collaborator for finished sessions.
/// Failures are reported to the caller, which logs and swallows them.
pub trait ScoreRecorder {
    fn record(&mut self, session: &GameSession) -> Result<(), RecordError>;
}

/// In-memory recorder. Used as an outbox by the web bridge and by tests.
#[derive(Debug, Default)]
pub struct MemoryRecorder {
    sessions: Vec<GameSession>,
}

impl MemoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sessions(&self) -> &[GameSession] {
        &self.sessions
    }

    /// Take all recorded sessions, leaving the recorder empty.
    pub fn drain(&mut self) -> Vec<GameSession> {
        std::mem::take(&mut self.sessions)
    }
}

impl ScoreRecorder for MemoryRecorder {
    fn record(&mut self, session: &GameSession) -> Result<(), RecordError> {
        self.sessions.push(session.clone());
        Ok(())
    }
}

impl<R: ScoreRecorder + ?Sized> ScoreRecorder for Box<R> {
    fn record(&mut self, session: &GameSession) -> Result<(), RecordError> {
        (**self).record(session)
    }
}
