//! Session host: owns at most one running game and its lifecycle.
//!
//! ```text
//! Idle --start--> Running --finish / end_game--> Finished --display delay--> Idle
//!                    \--close, or end_game on a game that cannot end early----^
//! ```
//! The finished session is recorded exactly once, on entry to `Finished`.
//! The game instance, with every timer it owns, is dropped on the way back to
//! `Idle`.

use serde::Serialize;
use thiserror::Error;

use dadcade_engine::*;

use crate::catch_ball::CatchBall;
use crate::config::ArcadeConfig;
use crate::emoji_match::EmojiMatch;
use crate::memory::Memory;
use crate::stats::ArcadeStats;
use crate::trivia::{FallbackBank, Trivia, TriviaSource};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("a {} session is already active", .0.as_str())]
    SessionActive(GameType),
    #[error("no game is running")]
    NotRunning,
    #[error("unknown game type: {0}")]
    UnknownGame(String),
}

/// Builds game instances on demand.
pub trait GameFactory {
    fn create(&mut self, game_type: GameType) -> Box<dyn Game>;
}

/// The four arcade games, tuned by an [`ArcadeConfig`].
pub struct DefaultCatalog {
    config: ArcadeConfig,
    trivia_source: Box<dyn FnMut() -> Box<dyn TriviaSource>>,
}

impl DefaultCatalog {
    /// Catalog whose trivia game runs on the built-in question bank.
    pub fn new(config: ArcadeConfig) -> Self {
        Self {
            config,
            trivia_source: Box::new(|| Box::new(FallbackBank::new())),
        }
    }

    pub fn with_trivia_source(mut self, make: impl FnMut() -> Box<dyn TriviaSource> + 'static) -> Self {
        self.trivia_source = Box::new(make);
        self
    }

    pub fn config(&self) -> &ArcadeConfig {
        &self.config
    }
}

impl GameFactory for DefaultCatalog {
    fn create(&mut self, game_type: GameType) -> Box<dyn Game> {
        match game_type {
            GameType::Match => Box::new(EmojiMatch::new(self.config.match_game.clone())),
            GameType::Memory => Box::new(Memory::new(self.config.memory.clone())),
            GameType::Trivia => Box::new(Trivia::new(
                self.config.trivia.clone(),
                (self.trivia_source)(),
            )),
            GameType::Catch => Box::new(CatchBall::new(self.config.catch.clone())),
        }
    }
}

/// Identifies one started session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionHandle {
    pub id: u64,
    pub game_type: GameType,
    /// Epoch milliseconds.
    pub started_at: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HostPhase {
    Idle,
    Running,
    Finished,
}

enum Phase {
    Idle,
    Running {
        handle: SessionHandle,
        game: Box<dyn Game>,
    },
    Finished {
        session: GameSession,
        game: Box<dyn Game>,
        display: Countdown,
    },
}

pub struct GameHost<R: ScoreRecorder = MemoryRecorder> {
    factory: Box<dyn GameFactory>,
    recorder: R,
    ctx: EngineContext,
    phase: Phase,
    display_delay: f32,
    seeds: Rng,
    next_id: u64,
    stats: ArcadeStats,
}

impl<R: ScoreRecorder> GameHost<R> {
    pub fn new(factory: Box<dyn GameFactory>, recorder: R, display_delay: f32, seed: u64) -> Self {
        Self {
            factory,
            recorder,
            ctx: EngineContext::new(seed),
            phase: Phase::Idle,
            display_delay: display_delay.max(0.0),
            seeds: Rng::new(seed),
            next_id: 1,
            stats: ArcadeStats::new(),
        }
    }

    pub fn phase(&self) -> HostPhase {
        match self.phase {
            Phase::Idle => HostPhase::Idle,
            Phase::Running { .. } => HostPhase::Running,
            Phase::Finished { .. } => HostPhase::Finished,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.phase, Phase::Idle)
    }

    /// The running session, if any.
    pub fn session(&self) -> Option<&SessionHandle> {
        match &self.phase {
            Phase::Running { handle, .. } => Some(handle),
            _ => None,
        }
    }

    pub fn game_type(&self) -> Option<GameType> {
        match &self.phase {
            Phase::Idle => None,
            Phase::Running { handle, .. } => Some(handle.game_type),
            Phase::Finished { session, .. } => Some(session.game_type),
        }
    }

    /// Live score while running, final score while on display.
    pub fn score(&self) -> Option<u32> {
        match &self.phase {
            Phase::Idle => None,
            Phase::Running { game, .. } => Some(game.score()),
            Phase::Finished { session, .. } => Some(session.score),
        }
    }

    /// The session last finalized, while its score is on display.
    pub fn finished_session(&self) -> Option<&GameSession> {
        match &self.phase {
            Phase::Finished { session, .. } => Some(session),
            _ => None,
        }
    }

    /// Runtime configuration of the current game.
    pub fn game_config(&self) -> Option<GameConfig> {
        match &self.phase {
            Phase::Idle => None,
            Phase::Running { game, .. } | Phase::Finished { game, .. } => Some(game.config()),
        }
    }

    pub fn context(&self) -> &EngineContext {
        &self.ctx
    }

    pub fn recorder(&self) -> &R {
        &self.recorder
    }

    pub fn recorder_mut(&mut self) -> &mut R {
        &mut self.recorder
    }

    /// Totals over every session finalized by this host, plus any loaded ones.
    pub fn stats(&self) -> &ArcadeStats {
        &self.stats
    }

    /// Replace the totals, e.g. with ones rebuilt from stored sessions.
    pub fn set_stats(&mut self, stats: ArcadeStats) {
        self.stats = stats;
    }

    pub fn clear_frame_data(&mut self) {
        self.ctx.clear_frame_data();
    }

    /// Start a new session. Only allowed from idle.
    pub fn start(&mut self, game_type: GameType, now_ms: u64) -> Result<SessionHandle, HostError> {
        if let Some(active) = self.game_type() {
            return Err(HostError::SessionActive(active));
        }
        let mut game = self.factory.create(game_type);
        self.ctx = EngineContext::with_dt(self.seeds.next_u64(), game.config().fixed_dt);
        game.init(&mut self.ctx);

        let handle = SessionHandle {
            id: self.next_id,
            game_type,
            started_at: now_ms,
        };
        self.next_id += 1;
        log::info!("session {} started: {}", handle.id, game_type.as_str());
        self.phase = Phase::Running { handle, game };
        Ok(handle)
    }

    /// One fixed tick. Returns the session finalized during this tick, if any.
    pub fn tick(&mut self, input: &InputQueue, now_ms: u64) -> Option<GameSession> {
        match &mut self.phase {
            Phase::Idle => None,
            Phase::Running { game, .. } => {
                game.update(&mut self.ctx, input);
                let score = self.ctx.finished()?;
                self.finalize(score, true, now_ms)
            }
            Phase::Finished { display, .. } => {
                let dt = self.ctx.dt();
                self.ctx.effects.tick(dt);
                if display.tick(dt) {
                    self.teardown();
                }
                None
            }
        }
    }

    /// The player quits a running game.
    ///
    /// Games that allow an early end are recorded with their current score and
    /// `completed: false`. Other games are cancelled as by [`close`](Self::close)
    /// and `Ok(None)` is returned.
    pub fn end_game(&mut self, now_ms: u64) -> Result<Option<GameSession>, HostError> {
        let (score, may_end_early) = match &self.phase {
            Phase::Running { game, .. } => (game.score(), game.may_end_early()),
            _ => return Err(HostError::NotRunning),
        };
        if !may_end_early {
            self.close();
            return Ok(None);
        }
        self.ctx.finish(score);
        self.finalize(score, false, now_ms)
            .map(Some)
            .ok_or(HostError::NotRunning)
    }

    /// Close the game view. A running game is cancelled without a record.
    pub fn close(&mut self) {
        match &self.phase {
            Phase::Running { handle, .. } => {
                log::info!("session {} cancelled", handle.id);
            }
            Phase::Finished { .. } => {}
            Phase::Idle => return,
        }
        self.teardown();
    }

    /// Project the current game (and its particles) into `buffer`.
    pub fn render(&self, buffer: &mut RenderBuffer) {
        let game = match &self.phase {
            Phase::Idle => return,
            Phase::Running { game, .. } | Phase::Finished { game, .. } => game,
        };
        {
            let mut rctx = RenderContext { render_buffer: &mut *buffer };
            game.render(&mut rctx);
        }
        self.ctx.effects.project(buffer);
    }

    pub fn snapshot(&self) -> serde_json::Value {
        let game = match &self.phase {
            Phase::Running { game, .. } | Phase::Finished { game, .. } => game.snapshot(),
            Phase::Idle => serde_json::Value::Null,
        };
        serde_json::json!({
            "phase": self.phase(),
            "gameType": self.game_type(),
            "score": self.score(),
            "finalScore": self.finished_session().map(|s| s.score),
            "highScore": self.game_type().map(|g| self.stats.high_score(g)),
            "game": game,
        })
    }

    /// Running -> Finished, recording the session. `None` if nothing was running.
    fn finalize(&mut self, score: u32, completed: bool, now_ms: u64) -> Option<GameSession> {
        let (handle, game) = match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Running { handle, game } => (handle, game),
            other => {
                self.phase = other;
                return None;
            }
        };
        let session = GameSession::new(handle.game_type, score, handle.started_at, now_ms, completed);
        match self.recorder.record(&session) {
            Ok(()) => log::info!(
                "session {} recorded: {} scored {}",
                handle.id,
                handle.game_type.as_str(),
                score
            ),
            Err(e) => log::warn!("session {} not recorded: {}", handle.id, e),
        }
        self.stats.record(&session);
        self.phase = Phase::Finished {
            session: session.clone(),
            game,
            display: Countdown::start(self.display_delay),
        };
        Some(session)
    }

    fn teardown(&mut self) {
        self.phase = Phase::Idle;
        self.ctx.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Finishes after a fixed number of ticks, scoring one point per tick.
    struct Ticker {
        ticks: Rc<Cell<u32>>,
        limit: u32,
    }

    impl Game for Ticker {
        fn game_type(&self) -> GameType {
            GameType::Catch
        }

        fn init(&mut self, _ctx: &mut EngineContext) {
            self.ticks.set(0);
        }

        fn update(&mut self, ctx: &mut EngineContext, _input: &InputQueue) {
            self.ticks.set(self.ticks.get() + 1);
            if self.ticks.get() >= self.limit {
                ctx.finish(self.score());
            }
        }

        fn score(&self) -> u32 {
            self.ticks.get()
        }
    }

    struct TickerFactory(Rc<Cell<u32>>);

    impl GameFactory for TickerFactory {
        fn create(&mut self, _: GameType) -> Box<dyn Game> {
            Box::new(Ticker {
                ticks: self.0.clone(),
                limit: 5,
            })
        }
    }

    struct FailingRecorder;

    impl ScoreRecorder for FailingRecorder {
        fn record(&mut self, _: &GameSession) -> Result<(), RecordError> {
            Err(RecordError::Unavailable("offline".into()))
        }
    }

    fn ticker_host() -> (GameHost, Rc<Cell<u32>>) {
        let ticks = Rc::new(Cell::new(0));
        let host = GameHost::new(Box::new(TickerFactory(ticks.clone())), MemoryRecorder::new(), 2.0, 7);
        (host, ticks)
    }

    fn run(host: &mut GameHost, ticks: usize) {
        let empty = InputQueue::new();
        for _ in 0..ticks {
            host.tick(&empty, 10_000);
        }
    }

    #[test]
    fn second_start_while_active_is_rejected() {
        let (mut host, _) = ticker_host();
        host.start(GameType::Catch, 0).unwrap();
        assert_eq!(
            host.start(GameType::Match, 0),
            Err(HostError::SessionActive(GameType::Catch))
        );
    }

    #[test]
    fn finish_records_once_then_returns_to_idle_after_display() {
        let (mut host, ticks) = ticker_host();
        host.start(GameType::Catch, 1_000).unwrap();
        run(&mut host, 5);
        assert_eq!(host.phase(), HostPhase::Finished);
        assert_eq!(host.recorder().sessions().len(), 1);
        let s = &host.recorder().sessions()[0];
        assert_eq!((s.score, s.start_time, s.end_time), (5, 1_000, 10_000));
        assert!(s.completed);

        // No game tick after termination.
        run(&mut host, 60);
        assert_eq!(ticks.get(), 5);
        assert_eq!(host.phase(), HostPhase::Finished);
        assert_eq!(host.score(), Some(5));

        run(&mut host, 70);
        assert!(host.is_idle());
        assert_eq!(host.recorder().sessions().len(), 1);
    }

    #[test]
    fn close_mid_game_records_nothing() {
        let (mut host, _) = ticker_host();
        host.start(GameType::Catch, 0).unwrap();
        run(&mut host, 2);
        host.close();
        assert!(host.is_idle());
        assert!(host.recorder().sessions().is_empty());
        assert!(host.start(GameType::Memory, 0).is_ok());
    }

    #[test]
    fn end_game_records_current_score() {
        let (mut host, _) = ticker_host();
        host.start(GameType::Catch, 0).unwrap();
        run(&mut host, 3);
        let session = host.end_game(4_000).unwrap().unwrap();
        assert_eq!(session.score, 3);
        assert!(!session.completed);
        assert_eq!(host.phase(), HostPhase::Finished);
        assert_eq!(host.end_game(5_000), Err(HostError::NotRunning));
        assert_eq!(host.recorder().sessions().len(), 1);
    }

    #[test]
    fn quitting_memory_cancels_instead_of_recording() {
        let catalog = DefaultCatalog::new(ArcadeConfig::default());
        let mut host = GameHost::new(Box::new(catalog), MemoryRecorder::new(), 2.0, 11);
        host.start(GameType::Memory, 0).unwrap();
        host.tick(&InputQueue::new(), 50);
        assert_eq!(host.end_game(100), Ok(None));
        assert!(host.is_idle());
        assert!(host.recorder().sessions().is_empty());
        assert!(host.start(GameType::Memory, 200).is_ok());
    }

    #[test]
    fn quitting_trivia_records_an_incomplete_session() {
        let catalog = DefaultCatalog::new(ArcadeConfig::default());
        let mut host = GameHost::new(Box::new(catalog), MemoryRecorder::new(), 2.0, 11);
        host.start(GameType::Trivia, 0).unwrap();
        host.tick(&InputQueue::new(), 50);
        let session = host.end_game(3_000).unwrap().unwrap();
        assert_eq!(session.game_type, GameType::Trivia);
        assert!(!session.completed);
        assert_eq!(host.recorder().sessions(), &[session]);
    }

    #[test]
    fn record_failure_is_swallowed() {
        let ticks = Rc::new(Cell::new(0));
        let mut host = GameHost::new(Box::new(TickerFactory(ticks)), FailingRecorder, 0.0, 1);
        host.start(GameType::Catch, 0).unwrap();
        let empty = InputQueue::new();
        let mut finished = None;
        for _ in 0..5 {
            finished = finished.or(host.tick(&empty, 50));
        }
        assert_eq!(finished.map(|s| s.score), Some(5));
        host.tick(&empty, 60);
        assert!(host.is_idle());
    }

    #[test]
    fn stats_follow_finalized_sessions_only() {
        let (mut host, _) = ticker_host();
        host.start(GameType::Catch, 0).unwrap();
        run(&mut host, 5);
        run(&mut host, 130);
        host.start(GameType::Catch, 0).unwrap();
        run(&mut host, 2);
        host.close();

        let stats = host.stats();
        assert_eq!(stats.games_played, 1);
        assert_eq!(stats.total_score, 5);
        assert_eq!(stats.time_played, 10);
        assert_eq!(stats.high_score(GameType::Catch), 5);
    }

    #[test]
    fn stats_count_sessions_the_recorder_rejected() {
        let ticks = Rc::new(Cell::new(0));
        let mut host = GameHost::new(Box::new(TickerFactory(ticks)), FailingRecorder, 0.0, 1);
        host.start(GameType::Catch, 0).unwrap();
        let empty = InputQueue::new();
        for _ in 0..5 {
            host.tick(&empty, 50);
        }
        assert_eq!(host.stats().games_played, 1);
    }

    #[test]
    fn catalog_builds_each_game_type() {
        let mut catalog = DefaultCatalog::new(ArcadeConfig::default());
        for g in GameType::ALL {
            assert_eq!(catalog.create(g).game_type(), g);
        }
    }

    #[test]
    fn real_match_game_runs_to_its_timer() {
        let mut config = ArcadeConfig::default();
        config.match_game.duration = 0.5;
        let mut host = GameHost::new(Box::new(DefaultCatalog::new(config)), MemoryRecorder::new(), 2.0, 3);
        host.start(GameType::Match, 0).unwrap();
        run(&mut host, 40);
        assert_eq!(host.phase(), HostPhase::Finished);
        let s = &host.recorder().sessions()[0];
        assert_eq!(s.game_type, GameType::Match);
    }

    #[test]
    fn snapshot_reports_phase() {
        let (mut host, _) = ticker_host();
        assert_eq!(host.snapshot()["phase"], "idle");
        host.start(GameType::Catch, 0).unwrap();
        assert_eq!(host.snapshot()["phase"], "running");
        assert_eq!(host.snapshot()["gameType"], "catch-ball");
    }
}
