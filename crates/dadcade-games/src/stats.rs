//! Running totals over recorded sessions, shown on the arcade dashboard.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use dadcade_engine::{GameSession, GameType};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ArcadeStats {
    pub games_played: u32,
    pub total_score: u64,
    /// Whole seconds across all sessions.
    pub time_played: u64,
    /// Best score per game; games never played are absent.
    pub high_scores: BTreeMap<GameType, u32>,
}

impl ArcadeStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Totals over sessions loaded from storage.
    pub fn from_sessions<'a>(sessions: impl IntoIterator<Item = &'a GameSession>) -> Self {
        let mut stats = Self::new();
        for session in sessions {
            stats.record(session);
        }
        stats
    }

    pub fn record(&mut self, session: &GameSession) {
        self.games_played = self.games_played.saturating_add(1);
        self.total_score = self.total_score.saturating_add(u64::from(session.score));
        self.time_played = self.time_played.saturating_add(session.duration_seconds());
        let best = self.high_scores.entry(session.game_type).or_insert(0);
        *best = (*best).max(session.score);
    }

    pub fn high_score(&self, game_type: GameType) -> u32 {
        self.high_scores.get(&game_type).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_and_best_per_game() {
        let sessions = [
            GameSession::completed(GameType::Catch, 40, 0, 30_000),
            GameSession::completed(GameType::Catch, 90, 0, 45_000),
            GameSession::ended_early(GameType::Trivia, 20, 0, 5_500),
        ];
        let stats = ArcadeStats::from_sessions(&sessions);
        assert_eq!(stats.games_played, 3);
        assert_eq!(stats.total_score, 150);
        assert_eq!(stats.time_played, 80);
        assert_eq!(stats.high_score(GameType::Catch), 90);
        assert_eq!(stats.high_score(GameType::Trivia), 20);
        assert_eq!(stats.high_score(GameType::Memory), 0);
    }

    #[test]
    fn serializes_high_scores_by_game_id() {
        let mut stats = ArcadeStats::new();
        stats.record(&GameSession::completed(GameType::Match, 70, 0, 60_000));
        let v = serde_json::to_value(&stats).unwrap();
        assert_eq!(v["gamesPlayed"], 1);
        assert_eq!(v["timePlayed"], 60);
        assert_eq!(v["highScores"]["emoji-match"], 70);

        let back: ArcadeStats = serde_json::from_value(v).unwrap();
        assert_eq!(back, stats);
    }
}
