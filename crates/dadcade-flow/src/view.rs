//! What the UI should draw for the current stage.

use serde::Serialize;

use dadcade_engine::GameType;
use dadcade_games::ArcadeStats;

use crate::card::GeneratedCard;
use crate::intro::ArcadeIntro;
use crate::questionnaire::{QuestionView, Questionnaire};
use crate::stage::{Onboarding, Stage};
use crate::thank_you::{ThankYouCard, ThankYouNote};
use crate::theme::Theme;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeOption {
    pub id: Theme,
    pub name: &'static str,
    pub css_class: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameOption {
    pub id: GameType,
    pub title: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "view", rename_all = "camelCase")]
pub enum StageView {
    Loading {
        message: &'static str,
    },
    ThemeSelection {
        options: Vec<ThemeOption>,
        selected: Theme,
    },
    Envelope {
        upgraded: bool,
    },
    Questionnaire {
        question: QuestionView,
    },
    CardPreview {
        card: GeneratedCard,
    },
    Paywall {
        #[serde(rename = "priceCents")]
        price_cents: u32,
    },
    GiftReveal {
        #[serde(rename = "dadName")]
        dad_name: String,
        card: GeneratedCard,
    },
    ArcadeIntro {
        intro: ArcadeIntro,
    },
    Arcade {
        intro: ArcadeIntro,
        games: Vec<GameOption>,
        host: serde_json::Value,
        stats: ArcadeStats,
    },
    ThankYou {
        draft: ThankYouCard,
        preview: ThankYouNote,
    },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewModel {
    pub stage: Stage,
    pub theme_class: &'static str,
    pub banner: Option<String>,
    #[serde(flatten)]
    pub view: StageView,
}

/// Inputs the projection needs beyond the onboarding state.
pub struct ViewInputs<'a> {
    pub questionnaire: &'a Questionnaire,
    pub price_cents: u32,
    pub arcade: serde_json::Value,
    pub stats: ArcadeStats,
}

const WAITING_FOR_CARD: &str = "Creating your card...";
const MISSING_PROFILE: &str = "Loading...";

/// Project the state into a view. Missing prerequisites show `Loading`.
pub fn project(state: &Onboarding, inputs: ViewInputs<'_>) -> ViewModel {
    let view = match state.stage() {
        Stage::ThemeSelection => StageView::ThemeSelection {
            options: Theme::ALL
                .iter()
                .map(|t| ThemeOption {
                    id: *t,
                    name: t.name(),
                    css_class: t.css_class(),
                })
                .collect(),
            selected: state.theme(),
        },
        Stage::Envelope => StageView::Envelope {
            upgraded: state.upgraded(),
        },
        Stage::Questionnaire => StageView::Questionnaire {
            question: inputs.questionnaire.view(),
        },
        Stage::CardPreview => match (state.profile(), state.card()) {
            (None, _) => {
                log::warn!("card preview reached without a profile");
                StageView::Loading { message: MISSING_PROFILE }
            }
            (Some(_), None) => {
                log::warn!("card preview shown before the card is ready");
                StageView::Loading { message: WAITING_FOR_CARD }
            }
            (Some(_), Some(card)) => StageView::CardPreview { card: card.clone() },
        },
        Stage::Paywall => StageView::Paywall {
            price_cents: inputs.price_cents,
        },
        Stage::GiftReveal => match (state.profile(), state.card()) {
            (Some(profile), Some(card)) => StageView::GiftReveal {
                dad_name: profile.name.clone(),
                card: card.clone(),
            },
            _ => {
                log::warn!("gift reveal reached without a card");
                StageView::Loading { message: MISSING_PROFILE }
            }
        },
        Stage::ArcadeIntro => StageView::ArcadeIntro {
            intro: state.intro().cloned().unwrap_or_default(),
        },
        Stage::Arcade => StageView::Arcade {
            intro: state.intro().cloned().unwrap_or_default(),
            games: GameType::ALL
                .iter()
                .map(|g| GameOption {
                    id: *g,
                    title: g.title(),
                })
                .collect(),
            host: inputs.arcade,
            stats: inputs.stats,
        },
        Stage::ThankYou => {
            let draft = state.thank_you().cloned().unwrap_or_else(|| ThankYouCard {
                dad_name: state
                    .profile()
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|| "Dad".to_string()),
                ..ThankYouCard::default()
            });
            StageView::ThankYou {
                preview: draft.render(),
                draft,
            }
        }
    };
    ViewModel {
        stage: state.stage(),
        theme_class: state.theme().css_class(),
        banner: state.banner().map(str::to_string),
        view,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::avatar::SvgAvatar;
    use crate::entitlement::OpenGate;
    use crate::profile::{DadProfile, Personality};
    use crate::stage::{transition, CardOutcome, Services, StageEvent};

    fn inputs(q: &Questionnaire) -> ViewInputs<'_> {
        ViewInputs {
            questionnaire: q,
            price_cents: 999,
            arcade: serde_json::Value::Null,
            stats: ArcadeStats::default(),
        }
    }

    fn advance(state: Onboarding, event: StageEvent) -> Onboarding {
        let services = Services { gate: &OpenGate, avatars: &SvgAvatar };
        transition(&state, state.ticket(), event, &services).unwrap().0
    }

    fn at_card_preview() -> Onboarding {
        let mut state = Onboarding::new();
        state = advance(state, StageEvent::ThemeChosen { theme: Theme::Warm });
        state = advance(state, StageEvent::EnvelopeOpened);
        advance(
            state,
            StageEvent::ProfileSubmitted {
                profile: DadProfile {
                    name: "Tom".into(),
                    favorite_hobby: "golf".into(),
                    personality: Personality::Gentle,
                    favorite_memory: "camping".into(),
                    special_trait: "his laugh".into(),
                },
            },
        )
    }

    #[test]
    fn card_preview_loads_until_card_arrives() {
        let q = Questionnaire::new();
        let state = at_card_preview();
        let view = project(&state, inputs(&q));
        assert!(matches!(view.view, StageView::Loading { .. }));
        assert_eq!(view.theme_class, "theme-warm");

        let state = advance(
            state,
            StageEvent::CardReady {
                outcome: CardOutcome::Failed { reason: "offline".into() },
            },
        );
        let view = project(&state, inputs(&q));
        assert!(matches!(view.view, StageView::CardPreview { .. }));
    }

    #[test]
    fn view_serializes_with_flat_tag() {
        let q = Questionnaire::new();
        let json = serde_json::to_value(project(&Onboarding::new(), inputs(&q))).unwrap();
        assert_eq!(json["stage"], "theme-selection");
        assert_eq!(json["view"], "themeSelection");
        assert_eq!(json["options"].as_array().unwrap().len(), 5);
    }
}
