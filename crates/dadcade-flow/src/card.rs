use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::avatar::{is_svg, AvatarGenerator};
use crate::profile::{DadProfile, Personality};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CardError {
    #[error("card generator unavailable: {0}")]
    Unavailable(String),
    #[error("card generator returned bad json: {0}")]
    BadResponse(String),
    #[error("card response is missing {0}")]
    Missing(&'static str),
}

impl From<serde_json::Error> for CardError {
    fn from(e: serde_json::Error) -> Self {
        CardError::BadResponse(e.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorTheme {
    pub primary: String,
    pub secondary: String,
    pub accent: String,
}

impl ColorTheme {
    pub fn new(primary: &str, secondary: &str, accent: &str) -> Self {
        Self {
            primary: primary.to_string(),
            secondary: secondary.to_string(),
            accent: accent.to_string(),
        }
    }

    /// Palette used by the local card for each personality.
    pub fn for_personality(personality: Personality) -> Self {
        match personality {
            Personality::Funny => Self::new("#FF6B35", "#F7931E", "#FFD23F"),
            Personality::Serious => Self::new("#2C5F41", "#4A7C59", "#8FB996"),
            Personality::Adventurous => Self::new("#1B4D3E", "#2E7D6B", "#4ECDC4"),
            Personality::Gentle => Self::new("#8E7CC3", "#A18CD4", "#C8B2DB"),
        }
    }
}

/// Text the card generator returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawCardText")]
pub struct CardText {
    pub title: String,
    pub message: String,
    pub signature: Option<String>,
    pub colors: Option<ColorTheme>,
    /// Generator-drawn avatar, used when it is plain SVG.
    pub avatar: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCardTheme {
    primary_color: String,
    secondary_color: String,
    accent_color: String,
}

/// Both response shapes the generator is known to produce.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCardText {
    title: Option<String>,
    message: Option<String>,
    front_message: Option<String>,
    inside_message: Option<String>,
    signature: Option<String>,
    colors: Option<ColorTheme>,
    card_theme: Option<RawCardTheme>,
    #[serde(alias = "avatar")]
    dad_avatar: Option<String>,
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

impl TryFrom<RawCardText> for CardText {
    type Error = CardError;

    fn try_from(raw: RawCardText) -> Result<Self, CardError> {
        let title = non_blank(raw.title)
            .or_else(|| non_blank(raw.front_message.clone()))
            .ok_or(CardError::Missing("title"))?;
        let message = non_blank(raw.message)
            .or_else(|| non_blank(raw.inside_message))
            .ok_or(CardError::Missing("message"))?;
        let colors = raw.colors.or_else(|| {
            raw.card_theme
                .map(|t| ColorTheme::new(&t.primary_color, &t.secondary_color, &t.accent_color))
        });
        Ok(Self {
            title,
            message,
            signature: non_blank(raw.signature),
            colors,
            avatar: raw.dad_avatar.filter(|a| is_svg(a)),
        })
    }
}

impl CardText {
    /// Parse a generator response.
    pub fn from_json(json: &str) -> Result<Self, CardError> {
        let raw: RawCardText = serde_json::from_str(json)?;
        Self::try_from(raw)
    }
}

/// The finished card. Never modified once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedCard {
    pub title: String,
    pub body: String,
    pub signature: String,
    pub theme: ColorTheme,
    pub avatar: String,
    /// True when the local template stood in for the generator.
    pub fallback: bool,
}

/// Remote text generator. Failures fall back to [`fallback_card`].
pub trait CardTextGenerator {
    fn generate(&mut self, profile: &DadProfile) -> Result<CardText, CardError>;
}

pub const DEFAULT_SIGNATURE: &str = "With love, always";

/// Local template card keyed by personality.
pub fn fallback_card(profile: &DadProfile) -> CardText {
    let p = profile;
    let (title, message) = match p.personality {
        Personality::Funny => (
            format!("Happy Father's Day, {}!", p.name),
            format!(
                "{}, you're the dad with all the best jokes and the biggest heart! Your love for {} and your amazing sense of humor make every day brighter. {} is just one of the countless memories that show what an incredible father you are. {} - that's what makes you one of a kind!",
                p.name, p.favorite_hobby, p.favorite_memory, p.special_trait
            ),
        ),
        Personality::Serious => (
            format!("To the Wisest Dad, {}", p.name),
            format!(
                "{}, your thoughtful guidance and wisdom have shaped who I am today. Whether you're enjoying {} or sharing life lessons, you always know the right thing to say. {} reminds me of your incredible strength and love. {} - these qualities make you an extraordinary father.",
                p.name, p.favorite_hobby, p.favorite_memory, p.special_trait
            ),
        ),
        Personality::Adventurous => (
            format!("Adventure Awaits, {}!", p.name),
            format!(
                "{}, from your passion for {} to all our amazing adventures together, you've taught me to embrace life fully! {} is proof of your adventurous spirit and loving heart. {} - you're not just a dad, you're a true life explorer!",
                p.name, p.favorite_hobby, p.favorite_memory, p.special_trait
            ),
        ),
        Personality::Gentle => (
            format!("With Love for {}", p.name),
            format!(
                "{}, your gentle heart and caring nature make you the most wonderful dad. Whether you're enjoying {} or just being there when I need you most, your love shines through. {} captures the essence of your beautiful soul. {} - you are truly a gift to our family.",
                p.name, p.favorite_hobby, p.favorite_memory, p.special_trait
            ),
        ),
    };
    CardText {
        title,
        message,
        signature: None,
        colors: Some(ColorTheme::for_personality(p.personality)),
        avatar: None,
    }
}

/// Turn a generator outcome into the final card. Failures use the local template.
pub fn finish_card(
    profile: &DadProfile,
    outcome: Result<CardText, CardError>,
    avatars: &dyn AvatarGenerator,
) -> GeneratedCard {
    let (text, fallback) = match outcome {
        Ok(text) => (text, false),
        Err(e) => {
            log::warn!("card generation failed, using local card: {}", e);
            (fallback_card(profile), true)
        }
    };
    GeneratedCard {
        title: text.title,
        body: text.message,
        signature: text.signature.unwrap_or_else(|| DEFAULT_SIGNATURE.to_string()),
        theme: text
            .colors
            .unwrap_or_else(|| ColorTheme::for_personality(profile.personality)),
        avatar: text.avatar.unwrap_or_else(|| avatars.generate(profile)),
        fallback,
    }
}

/// Generate text through `generator` and build the card.
pub fn compose_card(
    profile: &DadProfile,
    generator: &mut dyn CardTextGenerator,
    avatars: &dyn AvatarGenerator,
) -> GeneratedCard {
    finish_card(profile, generator.generate(profile), avatars)
}
