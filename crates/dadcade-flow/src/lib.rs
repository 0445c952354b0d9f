pub mod app;
pub mod avatar;
pub mod card;
pub mod checkout;
pub mod config;
pub mod entitlement;
pub mod intro;
pub mod profile;
pub mod questionnaire;
pub mod stage;
pub mod thank_you;
pub mod theme;
pub mod view;

pub use app::{App, AppError};
pub use avatar::{AvatarGenerator, SvgAvatar};
pub use card::{
    compose_card, fallback_card, finish_card, CardError, CardText, CardTextGenerator, ColorTheme,
    GeneratedCard,
};
pub use checkout::{CheckoutError, CheckoutProvider, StaticCheckout};
pub use config::AppConfig;
pub use entitlement::{
    Access, Account, EntitlementGate, Feature, OpenGate, SubscriptionStatus, UsageGate, UsageLimits,
};
pub use intro::{ArcadeIntro, IntroStyle, Music};
pub use profile::{DadProfile, Personality};
pub use questionnaire::{Question, QuestionView, Questionnaire, ValidationError};
pub use stage::{
    transition, CardOutcome, Effect, Onboarding, Services, Stage, StageError, StageEvent, StageTicket,
};
pub use thank_you::{ThankYouCard, ThankYouNote, ThankYouStyle};
pub use theme::Theme;
pub use view::{project, StageView, ViewModel};
