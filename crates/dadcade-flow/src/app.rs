//! The app controller: owns the onboarding state, the questionnaire and the
//! arcade host, applies stage transitions and hands effects to the caller.

use thiserror::Error;

use dadcade_engine::*;
use dadcade_games::{ArcadeStats, DefaultCatalog, GameFactory, GameHost, HostError, SessionHandle};

use crate::avatar::SvgAvatar;
use crate::card::{CardText, CardTextGenerator};
use crate::checkout::{CheckoutError, CheckoutProvider};
use crate::config::AppConfig;
use crate::entitlement::{Account, UsageGate};
use crate::questionnaire::{Questionnaire, ValidationError};
use crate::stage::{transition, CardOutcome, Effect, Onboarding, Services, Stage, StageError, StageEvent, StageTicket};
use crate::view::{project, ViewInputs, ViewModel};

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Stage(#[from] StageError),
    #[error(transparent)]
    Host(#[from] HostError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Checkout(#[from] CheckoutError),
    #[error("the arcade is closed during {0}")]
    ArcadeClosed(Stage),
}

pub struct App<R: ScoreRecorder = MemoryRecorder> {
    config: AppConfig,
    state: Onboarding,
    questionnaire: Questionnaire,
    host: GameHost<R>,
    gate: UsageGate,
    avatars: SvgAvatar,
}

impl App<MemoryRecorder> {
    /// App with the built-in game catalog and an in-memory session outbox.
    pub fn new(config: AppConfig, seed: u64) -> Self {
        let catalog = DefaultCatalog::new(config.arcade.clone());
        Self::with_factory(config, Box::new(catalog), MemoryRecorder::new(), seed)
    }

    /// Sessions recorded since the last drain.
    pub fn drain_sessions(&mut self) -> Vec<GameSession> {
        self.host.recorder_mut().drain()
    }
}

impl<R: ScoreRecorder> App<R> {
    pub fn with_factory(config: AppConfig, factory: Box<dyn GameFactory>, recorder: R, seed: u64) -> Self {
        let host = GameHost::new(factory, recorder, config.arcade.display_delay, seed);
        let gate = UsageGate::new(Account::default(), config.limits);
        Self {
            config,
            state: Onboarding::new(),
            questionnaire: Questionnaire::new(),
            host,
            gate,
            avatars: SvgAvatar,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn state(&self) -> &Onboarding {
        &self.state
    }

    pub fn stage(&self) -> Stage {
        self.state.stage()
    }

    pub fn ticket(&self) -> StageTicket {
        self.state.ticket()
    }

    pub fn host(&self) -> &GameHost<R> {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut GameHost<R> {
        &mut self.host
    }

    pub fn account(&self) -> &Account {
        self.gate.account()
    }

    /// Replace the usage counters with the ones the host page loaded.
    pub fn set_account(&mut self, account: Account) {
        self.gate.set_account(account);
    }

    /// Apply one stage event. The returned effects are for the caller to run.
    pub fn dispatch(&mut self, ticket: StageTicket, event: StageEvent) -> Result<Vec<Effect>, AppError> {
        let services = Services {
            gate: &self.gate,
            avatars: &self.avatars,
        };
        let (next, effects) = transition(&self.state, ticket, event, &services)?;
        let left_arcade = self.state.stage() == Stage::Arcade && next.stage() != Stage::Arcade;
        if next.stage() == Stage::Questionnaire && self.state.stage() != Stage::Questionnaire {
            self.questionnaire = Questionnaire::new();
        }
        self.state = next;

        if left_arcade {
            self.host.close();
        }
        for effect in &effects {
            if let Effect::PersistCard { .. } = effect {
                self.gate.record_card();
            }
        }
        Ok(effects)
    }

    fn require(&self, stage: Stage, event: &'static str) -> Result<(), AppError> {
        if self.state.stage() != stage {
            return Err(StageError::UnexpectedEvent {
                stage: self.state.stage(),
                event,
            }
            .into());
        }
        Ok(())
    }

    pub fn questionnaire(&self) -> &Questionnaire {
        &self.questionnaire
    }

    pub fn answer(&mut self, value: &str) -> Result<(), AppError> {
        self.require(Stage::Questionnaire, "answer")?;
        Ok(self.questionnaire.answer(value)?)
    }

    /// Advance the questionnaire. After the last question the profile is
    /// submitted and the card request comes back as an effect.
    pub fn next_question(&mut self) -> Result<Vec<Effect>, AppError> {
        self.require(Stage::Questionnaire, "next")?;
        match self.questionnaire.next()? {
            Some(profile) => self.dispatch(self.ticket(), StageEvent::ProfileSubmitted { profile }),
            None => Ok(Vec::new()),
        }
    }

    pub fn previous_question(&mut self) -> Result<(), AppError> {
        self.require(Stage::Questionnaire, "back")?;
        self.questionnaire.back();
        Ok(())
    }

    /// Run a synchronous card generator for the pending request.
    pub fn fulfil_card_request(&mut self, generator: &mut dyn CardTextGenerator) -> Result<Vec<Effect>, AppError> {
        self.require(Stage::CardPreview, "cardReady")?;
        let Some(profile) = self.state.profile() else {
            return Err(StageError::UnexpectedEvent {
                stage: Stage::CardPreview,
                event: "cardReady",
            }
            .into());
        };
        let outcome = CardOutcome::from(generator.generate(profile));
        self.dispatch(self.ticket(), StageEvent::CardReady { outcome })
    }

    /// Feed back the generator's JSON response. Unparseable text uses the local card.
    pub fn card_result(&mut self, json: &str) -> Result<Vec<Effect>, AppError> {
        let outcome = CardOutcome::from(CardText::from_json(json));
        self.dispatch(self.ticket(), StageEvent::CardReady { outcome })
    }

    pub fn card_failed(&mut self, reason: &str) -> Result<Vec<Effect>, AppError> {
        let outcome = CardOutcome::Failed {
            reason: reason.to_string(),
        };
        self.dispatch(self.ticket(), StageEvent::CardReady { outcome })
    }

    pub fn start_game(&mut self, game_type: GameType, now_ms: u64) -> Result<SessionHandle, AppError> {
        if self.state.stage() != Stage::Arcade {
            return Err(AppError::ArcadeClosed(self.state.stage()));
        }
        let handle = self.host.start(game_type, now_ms)?;
        self.gate.record_game();
        Ok(handle)
    }

    /// One fixed arcade tick.
    pub fn tick_arcade(&mut self, input: &InputQueue, now_ms: u64) -> Option<GameSession> {
        self.host.tick(input, now_ms)
    }

    /// Quit the running game. `None` when the game cannot end early and was cancelled.
    pub fn end_game(&mut self, now_ms: u64) -> Result<Option<GameSession>, AppError> {
        Ok(self.host.end_game(now_ms)?)
    }

    pub fn stats(&self) -> &ArcadeStats {
        self.host.stats()
    }

    /// Rebuild the arcade totals from sessions the page loaded from storage.
    pub fn load_sessions(&mut self, sessions: &[GameSession]) {
        self.host.set_stats(ArcadeStats::from_sessions(sessions));
    }

    pub fn close_game(&mut self) {
        self.host.close();
    }

    pub fn render(&self, buffer: &mut RenderBuffer) {
        self.host.render(buffer);
    }

    pub fn view(&self) -> ViewModel {
        project(
            &self.state,
            ViewInputs {
                questionnaire: &self.questionnaire,
                price_cents: self.config.price_cents,
                arcade: self.host.snapshot(),
                stats: self.host.stats().clone(),
            },
        )
    }

    /// Ask the payment provider for the upgrade page URL.
    pub fn checkout_with(&self, provider: &mut dyn CheckoutProvider) -> Result<String, AppError> {
        Ok(provider.create_checkout(&self.gate.account().user_id, self.config.price_cents)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::CardError;
    use crate::checkout::StaticCheckout;
    use crate::intro::ArcadeIntro;
    use crate::profile::DadProfile;
    use crate::theme::Theme;
    use crate::view::StageView;

    struct Offline;

    impl CardTextGenerator for Offline {
        fn generate(&mut self, _: &DadProfile) -> Result<CardText, CardError> {
            Err(CardError::Unavailable("503".into()))
        }
    }

    fn go(app: &mut App, event: StageEvent) -> Vec<Effect> {
        let ticket = app.ticket();
        app.dispatch(ticket, event).unwrap()
    }

    fn to_questionnaire(app: &mut App) {
        let effects = go(app, StageEvent::ThemeChosen { theme: Theme::Forest });
        assert!(matches!(effects.as_slice(), [Effect::ApplyTheme { css_class: "theme-forest", .. }]));
        go(app, StageEvent::EnvelopeOpened);
    }

    fn answer_all(app: &mut App) -> Vec<Effect> {
        let mut effects = Vec::new();
        for a in ["Tom", "golf", "funny", "Our first hole-in-one", "Endless patience"] {
            app.answer(a).unwrap();
            effects = app.next_question().unwrap();
        }
        effects
    }

    fn to_arcade(app: &mut App) {
        to_questionnaire(app);
        answer_all(app);
        app.fulfil_card_request(&mut Offline).unwrap();
        go(app, StageEvent::CardAccepted);
        go(app, StageEvent::Skip);
        go(app, StageEvent::GiftOpened);
        go(app, StageEvent::IntroConfigured { intro: ArcadeIntro::default() });
    }

    #[test]
    fn questionnaire_requests_card_and_fallback_fills_it() {
        let mut app = App::new(AppConfig::default(), 3);
        to_questionnaire(&mut app);
        let effects = answer_all(&mut app);
        assert!(matches!(effects.as_slice(), [Effect::RequestCardText { .. }]));
        assert!(matches!(app.view().view, StageView::Loading { .. }));

        app.fulfil_card_request(&mut Offline).unwrap();
        let card = app.state().card().unwrap();
        assert!(card.title.contains("Tom"));
        assert!(card.body.contains("golf"));
        assert_eq!(card.theme.primary, "#FF6B35");
        assert_eq!(app.account().cards_generated, 1);
    }

    #[test]
    fn blank_answer_stays_on_question() {
        let mut app = App::new(AppConfig::default(), 3);
        to_questionnaire(&mut app);
        app.answer("  ").unwrap();
        assert!(matches!(
            app.next_question(),
            Err(AppError::Validation(ValidationError::Blank("name")))
        ));
        assert_eq!(app.stage(), Stage::Questionnaire);
    }

    #[test]
    fn card_json_from_host_page_is_used() {
        let mut app = App::new(AppConfig::default(), 3);
        to_questionnaire(&mut app);
        answer_all(&mut app);
        app.card_result(r#"{"title":"For Tom","message":"Thanks for everything"}"#)
            .unwrap();
        assert_eq!(app.state().card().unwrap().title, "For Tom");
        assert!(!app.state().card().unwrap().fallback);
    }

    #[test]
    fn games_only_start_in_the_arcade() {
        let mut app = App::new(AppConfig::default(), 3);
        assert!(matches!(
            app.start_game(GameType::Match, 0),
            Err(AppError::ArcadeClosed(Stage::ThemeSelection))
        ));

        to_arcade(&mut app);
        assert_eq!(app.stage(), Stage::Arcade);
        app.start_game(GameType::Match, 1_000).unwrap();
        assert!(matches!(app.start_game(GameType::Catch, 1_000), Err(AppError::Host(_))));
        let session = app.end_game(4_000).unwrap().unwrap();
        assert_eq!(session.game_type, GameType::Match);
        assert!(!session.completed);
        assert_eq!(app.drain_sessions().len(), 1);
        assert_eq!(app.account().games_played, 1);
    }

    #[test]
    fn arcade_view_shows_stats_from_stored_and_new_sessions() {
        let mut app = App::new(AppConfig::default(), 3);
        to_arcade(&mut app);
        app.load_sessions(&[
            GameSession::completed(GameType::Catch, 120, 0, 30_000),
            GameSession::completed(GameType::Match, 80, 0, 60_000),
        ]);
        app.start_game(GameType::Catch, 1_000).unwrap();
        app.end_game(11_000).unwrap();

        match app.view().view {
            StageView::Arcade { stats, .. } => {
                assert_eq!(stats.games_played, 3);
                assert_eq!(stats.time_played, 100);
                assert_eq!(stats.high_score(GameType::Catch), 120);
                assert_eq!(stats.high_score(GameType::Match), 80);
            }
            other => panic!("expected arcade view, got {other:?}"),
        }
        let json = serde_json::to_value(app.view()).unwrap();
        assert_eq!(json["stats"]["highScores"]["catch-ball"], 120);
    }

    #[test]
    fn drained_sessions_carry_duration() {
        let mut app = App::new(AppConfig::default(), 3);
        to_arcade(&mut app);
        app.start_game(GameType::Catch, 1_000).unwrap();
        app.end_game(61_000).unwrap();
        let json = serde_json::to_value(app.drain_sessions()).unwrap();
        assert_eq!(json[0]["gameType"], "catch-ball");
        assert_eq!(json[0]["durationSeconds"], 60);
        assert_eq!(json[0]["completed"], false);
    }

    #[test]
    fn quitting_memory_records_nothing() {
        let mut app = App::new(AppConfig::default(), 3);
        to_arcade(&mut app);
        app.start_game(GameType::Memory, 0).unwrap();
        assert!(app.end_game(500).unwrap().is_none());
        assert!(app.host().is_idle());
        assert!(app.drain_sessions().is_empty());
        assert_eq!(app.stats().games_played, 0);
    }

    #[test]
    fn leaving_for_thank_you_cancels_running_game() {
        let mut app = App::new(AppConfig::default(), 3);
        to_arcade(&mut app);
        app.start_game(GameType::Catch, 0).unwrap();
        app.tick_arcade(&InputQueue::new(), 16);
        go(&mut app, StageEvent::OpenThankYou);
        assert!(app.host().is_idle());
        assert!(app.drain_sessions().is_empty());
        assert!(matches!(app.view().view, StageView::ThankYou { .. }));
    }

    #[test]
    fn checkout_uses_account_and_price() {
        let mut app = App::new(AppConfig::default(), 3);
        app.set_account(Account {
            user_id: "u7".into(),
            ..Default::default()
        });
        let url = app
            .checkout_with(&mut StaticCheckout::new("https://pay.example"))
            .unwrap();
        assert_eq!(url, "https://pay.example?user=u7&amount=999");
    }
}
