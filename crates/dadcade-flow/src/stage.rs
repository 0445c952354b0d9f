//! Onboarding stage machine.
//!
//! ```text
//! theme-selection -> envelope -> questionnaire -> card-preview -> paywall
//!     paywall --upgrade | skip--> gift-reveal -> arcade-intro -> arcade <-> thank-you
//! ```
//!
//! [`transition`] is pure: it takes the current state and one event and
//! returns the next state plus the effects the caller must run. Every
//! activation of a stage gets a fresh [`StageTicket`]; events carrying any
//! other ticket are rejected, so a stage completes at most once per
//! activation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::avatar::AvatarGenerator;
use crate::card::{finish_card, CardError, CardText, GeneratedCard};
use crate::entitlement::{Access, EntitlementGate, Feature};
use crate::intro::ArcadeIntro;
use crate::profile::DadProfile;
use crate::questionnaire::{validate_text, ValidationError};
use crate::thank_you::ThankYouCard;
use crate::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    #[default]
    ThemeSelection,
    Envelope,
    Questionnaire,
    CardPreview,
    Paywall,
    GiftReveal,
    ArcadeIntro,
    Arcade,
    ThankYou,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::ThemeSelection => "theme-selection",
            Stage::Envelope => "envelope",
            Stage::Questionnaire => "questionnaire",
            Stage::CardPreview => "card-preview",
            Stage::Paywall => "paywall",
            Stage::GiftReveal => "gift-reveal",
            Stage::ArcadeIntro => "arcade-intro",
            Stage::Arcade => "arcade",
            Stage::ThankYou => "thank-you",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Proof that an event targets the live activation of a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageTicket {
    pub stage: Stage,
    pub activation: u32,
}

/// What the card generator came back with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum CardOutcome {
    Ready { text: CardText },
    Failed { reason: String },
}

impl From<Result<CardText, CardError>> for CardOutcome {
    fn from(result: Result<CardText, CardError>) -> Self {
        match result {
            Ok(text) => CardOutcome::Ready { text },
            Err(e) => CardOutcome::Failed { reason: e.to_string() },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StageEvent {
    ThemeChosen { theme: Theme },
    EnvelopeOpened,
    ProfileSubmitted { profile: DadProfile },
    CardReady { outcome: CardOutcome },
    CardAccepted,
    Upgrade,
    Skip,
    GiftOpened,
    IntroConfigured { intro: ArcadeIntro },
    OpenThankYou,
    ThankYouDone {
        #[serde(default)]
        card: Option<ThankYouCard>,
    },
}

impl StageEvent {
    pub fn name(&self) -> &'static str {
        match self {
            StageEvent::ThemeChosen { .. } => "themeChosen",
            StageEvent::EnvelopeOpened => "envelopeOpened",
            StageEvent::ProfileSubmitted { .. } => "profileSubmitted",
            StageEvent::CardReady { .. } => "cardReady",
            StageEvent::CardAccepted => "cardAccepted",
            StageEvent::Upgrade => "upgrade",
            StageEvent::Skip => "skip",
            StageEvent::GiftOpened => "giftOpened",
            StageEvent::IntroConfigured { .. } => "introConfigured",
            StageEvent::OpenThankYou => "openThankYou",
            StageEvent::ThankYouDone { .. } => "thankYouDone",
        }
    }
}

/// Work the caller runs after a transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Effect {
    ApplyTheme {
        theme: Theme,
        #[serde(rename = "cssClass")]
        css_class: &'static str,
    },
    RequestCardText { profile: DadProfile },
    PersistCard { card: GeneratedCard },
    BeginCheckout,
    OfferUpgrade { feature: Feature, reason: String },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StageError {
    #[error("ticket for {stage} activation {activation} is no longer live")]
    StaleTicket { stage: Stage, activation: u32 },
    #[error("{event} is not accepted during {stage}")]
    UnexpectedEvent { stage: Stage, event: &'static str },
    #[error("the card is not ready yet")]
    CardNotReady,
    #[error("the card was already generated")]
    CardAlreadyReady,
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Everything the onboarding has collected so far.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Onboarding {
    stage: Stage,
    activation: u32,
    theme: Theme,
    profile: Option<DadProfile>,
    card: Option<GeneratedCard>,
    upgraded: bool,
    intro: Option<ArcadeIntro>,
    thank_you: Option<ThankYouCard>,
    banner: Option<String>,
}

impl Onboarding {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn ticket(&self) -> StageTicket {
        StageTicket {
            stage: self.stage,
            activation: self.activation,
        }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn profile(&self) -> Option<&DadProfile> {
        self.profile.as_ref()
    }

    pub fn card(&self) -> Option<&GeneratedCard> {
        self.card.as_ref()
    }

    pub fn upgraded(&self) -> bool {
        self.upgraded
    }

    pub fn intro(&self) -> Option<&ArcadeIntro> {
        self.intro.as_ref()
    }

    pub fn thank_you(&self) -> Option<&ThankYouCard> {
        self.thank_you.as_ref()
    }

    /// Upgrade prompt shown after a denied entitlement check.
    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    fn enter(&mut self, stage: Stage, gate: &dyn EntitlementGate, effects: &mut Vec<Effect>) {
        self.stage = stage;
        self.activation = self.activation.wrapping_add(1);
        self.banner = None;

        let feature = match stage {
            Stage::Questionnaire => Feature::CardGeneration,
            Stage::Arcade => Feature::UnlimitedGames,
            _ => return,
        };
        if let Access::Denied { reason } = gate.check_access(feature) {
            log::info!("{:?} denied on entering {}: {}", feature, stage, reason);
            self.banner = Some(reason.clone());
            effects.push(Effect::OfferUpgrade { feature, reason });
        }
    }
}

/// Collaborators a transition may consult.
pub struct Services<'a> {
    pub gate: &'a dyn EntitlementGate,
    pub avatars: &'a dyn AvatarGenerator,
}

fn check_profile(profile: DadProfile) -> Result<DadProfile, ValidationError> {
    Ok(DadProfile {
        name: validate_text("name", &profile.name)?,
        favorite_hobby: validate_text("favoriteHobby", &profile.favorite_hobby)?,
        personality: profile.personality,
        favorite_memory: validate_text("favoriteMemory", &profile.favorite_memory)?,
        special_trait: validate_text("specialTrait", &profile.special_trait)?,
    })
}

/// Apply one event to `state`.
pub fn transition(
    state: &Onboarding,
    ticket: StageTicket,
    event: StageEvent,
    services: &Services<'_>,
) -> Result<(Onboarding, Vec<Effect>), StageError> {
    if ticket != state.ticket() {
        return Err(StageError::StaleTicket {
            stage: ticket.stage,
            activation: ticket.activation,
        });
    }

    let mut next = state.clone();
    let mut effects = Vec::new();
    let gate = services.gate;

    match (state.stage, event) {
        (Stage::ThemeSelection, StageEvent::ThemeChosen { theme }) => {
            next.theme = theme;
            effects.push(Effect::ApplyTheme {
                theme,
                css_class: theme.css_class(),
            });
            next.enter(Stage::Envelope, gate, &mut effects);
        }
        (Stage::Envelope, StageEvent::EnvelopeOpened) => {
            next.enter(Stage::Questionnaire, gate, &mut effects);
        }
        (Stage::Questionnaire, StageEvent::ProfileSubmitted { profile }) => {
            let profile = check_profile(profile)?;
            effects.push(Effect::RequestCardText {
                profile: profile.clone(),
            });
            next.profile = Some(profile);
            next.card = None;
            next.enter(Stage::CardPreview, gate, &mut effects);
        }
        (Stage::CardPreview, StageEvent::CardReady { outcome }) => {
            if state.card.is_some() {
                return Err(StageError::CardAlreadyReady);
            }
            let Some(profile) = state.profile.as_ref() else {
                log::warn!("card result arrived without a profile");
                return Err(StageError::UnexpectedEvent {
                    stage: state.stage,
                    event: "cardReady",
                });
            };
            let result = match outcome {
                CardOutcome::Ready { text } => Ok(text),
                CardOutcome::Failed { reason } => Err(CardError::Unavailable(reason)),
            };
            let card = finish_card(profile, result, services.avatars);
            effects.push(Effect::PersistCard { card: card.clone() });
            next.card = Some(card);
        }
        (Stage::CardPreview, StageEvent::CardAccepted) => {
            if state.card.is_none() {
                return Err(StageError::CardNotReady);
            }
            next.enter(Stage::Paywall, gate, &mut effects);
        }
        (Stage::Paywall, StageEvent::Upgrade) => {
            next.upgraded = true;
            effects.push(Effect::BeginCheckout);
            next.enter(Stage::GiftReveal, gate, &mut effects);
        }
        (Stage::Paywall, StageEvent::Skip) => {
            next.enter(Stage::GiftReveal, gate, &mut effects);
        }
        (Stage::GiftReveal, StageEvent::GiftOpened) => {
            next.enter(Stage::ArcadeIntro, gate, &mut effects);
        }
        (Stage::ArcadeIntro, StageEvent::IntroConfigured { intro }) => {
            next.intro = Some(intro.validated()?);
            next.enter(Stage::Arcade, gate, &mut effects);
        }
        (Stage::Arcade, StageEvent::OpenThankYou) => {
            next.enter(Stage::ThankYou, gate, &mut effects);
        }
        (Stage::ThankYou, StageEvent::ThankYouDone { card }) => {
            if card.is_some() {
                next.thank_you = card;
            }
            next.enter(Stage::Arcade, gate, &mut effects);
        }
        (stage, event) => {
            return Err(StageError::UnexpectedEvent {
                stage,
                event: event.name(),
            })
        }
    }

    if next.stage != state.stage {
        log::info!("stage {} -> {}", state.stage, next.stage);
    }
    Ok((next, effects))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::avatar::SvgAvatar;
    use crate::entitlement::{Account, OpenGate, UsageGate, UsageLimits};
    use crate::profile::Personality;

    fn tom() -> DadProfile {
        DadProfile {
            name: "Tom".into(),
            favorite_hobby: "golf".into(),
            personality: Personality::Funny,
            favorite_memory: "the lake".into(),
            special_trait: "patience".into(),
        }
    }

    fn step(
        state: &Onboarding,
        event: StageEvent,
        gate: &dyn EntitlementGate,
    ) -> Result<(Onboarding, Vec<Effect>), StageError> {
        let services = Services {
            gate,
            avatars: &SvgAvatar,
        };
        transition(state, state.ticket(), event, &services)
    }

    fn happy_path(skip: bool) -> Vec<StageEvent> {
        vec![
            StageEvent::ThemeChosen { theme: Theme::Ocean },
            StageEvent::EnvelopeOpened,
            StageEvent::ProfileSubmitted { profile: tom() },
            StageEvent::CardReady {
                outcome: CardOutcome::Failed { reason: "offline".into() },
            },
            StageEvent::CardAccepted,
            if skip { StageEvent::Skip } else { StageEvent::Upgrade },
            StageEvent::GiftOpened,
            StageEvent::IntroConfigured {
                intro: ArcadeIntro::default(),
            },
            StageEvent::OpenThankYou,
            StageEvent::ThankYouDone { card: None },
        ]
    }

    #[test]
    fn happy_path_visits_every_stage_in_order() {
        for skip in [true, false] {
            let mut state = Onboarding::new();
            let mut visited = vec![state.stage()];
            for event in happy_path(skip) {
                let (next, _) = step(&state, event, &OpenGate).unwrap();
                if next.stage() != *visited.last().unwrap() {
                    visited.push(next.stage());
                }
                state = next;
            }
            assert_eq!(
                visited,
                vec![
                    Stage::ThemeSelection,
                    Stage::Envelope,
                    Stage::Questionnaire,
                    Stage::CardPreview,
                    Stage::Paywall,
                    Stage::GiftReveal,
                    Stage::ArcadeIntro,
                    Stage::Arcade,
                    Stage::ThankYou,
                    Stage::Arcade,
                ]
            );
            assert_eq!(state.upgraded(), !skip);
            assert_eq!(state.theme(), Theme::Ocean);
        }
    }

    #[test]
    fn events_cannot_skip_stages() {
        let state = Onboarding::new();
        for event in happy_path(true).into_iter().skip(1) {
            assert!(matches!(
                step(&state, event, &OpenGate),
                Err(StageError::UnexpectedEvent { stage: Stage::ThemeSelection, .. })
            ));
        }
    }

    #[test]
    fn stale_and_duplicate_tickets_are_rejected() {
        let state = Onboarding::new();
        let first = state.ticket();
        let services = Services { gate: &OpenGate, avatars: &SvgAvatar };
        let event = StageEvent::ThemeChosen { theme: Theme::Warm };
        let (next, _) = transition(&state, first, event.clone(), &services).unwrap();

        assert_eq!(
            transition(&next, first, event, &services),
            Err(StageError::StaleTicket {
                stage: Stage::ThemeSelection,
                activation: 0
            })
        );
        let forged = StageTicket { stage: Stage::Envelope, activation: 99 };
        assert!(matches!(
            transition(&next, forged, StageEvent::EnvelopeOpened, &services),
            Err(StageError::StaleTicket { .. })
        ));
    }

    #[test]
    fn card_preview_falls_back_and_completes_once() {
        let mut state = Onboarding::new();
        for event in happy_path(true).into_iter().take(3) {
            state = step(&state, event, &OpenGate).unwrap().0;
        }
        assert_eq!(state.stage(), Stage::CardPreview);
        assert_eq!(step(&state, StageEvent::CardAccepted, &OpenGate), Err(StageError::CardNotReady));

        let failed = StageEvent::CardReady {
            outcome: CardOutcome::Failed { reason: "timeout".into() },
        };
        let (state, effects) = step(&state, failed.clone(), &OpenGate).unwrap();
        let card = state.card().unwrap();
        assert!(card.fallback);
        assert!(card.title.contains("Tom"));
        assert!(matches!(effects.as_slice(), [Effect::PersistCard { .. }]));
        assert_eq!(step(&state, failed, &OpenGate), Err(StageError::CardAlreadyReady));
    }

    #[test]
    fn blank_profile_blocks_the_questionnaire() {
        let mut state = Onboarding::new();
        for event in happy_path(true).into_iter().take(2) {
            state = step(&state, event, &OpenGate).unwrap().0;
        }
        let blank = DadProfile { name: "  ".into(), ..tom() };
        assert_eq!(
            step(&state, StageEvent::ProfileSubmitted { profile: blank }, &OpenGate),
            Err(StageError::Invalid(ValidationError::Blank("name")))
        );
    }

    #[test]
    fn denied_entitlement_offers_upgrade_without_blocking() {
        let account = Account {
            cards_generated: 3,
            ..Default::default()
        };
        let gate = UsageGate::new(account, UsageLimits::default());
        let mut state = Onboarding::new();
        state = step(&state, StageEvent::ThemeChosen { theme: Theme::Dark }, &gate).unwrap().0;
        let (state, effects) = step(&state, StageEvent::EnvelopeOpened, &gate).unwrap();
        assert_eq!(state.stage(), Stage::Questionnaire);
        assert!(state.banner().is_some());
        assert!(matches!(
            effects.as_slice(),
            [Effect::OfferUpgrade { feature: Feature::CardGeneration, .. }]
        ));
    }

    #[test]
    fn events_parse_from_tagged_json() {
        let event: StageEvent =
            serde_json::from_str(r#"{"type":"themeChosen","theme":"forest"}"#).unwrap();
        assert_eq!(event, StageEvent::ThemeChosen { theme: Theme::Forest });
        let event: StageEvent = serde_json::from_str(r#"{"type":"thankYouDone"}"#).unwrap();
        assert_eq!(event, StageEvent::ThankYouDone { card: None });
    }
}
