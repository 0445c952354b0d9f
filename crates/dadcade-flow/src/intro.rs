use serde::{Deserialize, Serialize};

use crate::questionnaire::{validate_text, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntroStyle {
    #[default]
    Classic,
    Neon,
    Retro,
    Space,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Music {
    #[default]
    Arcade,
    Electronic,
    Jazz,
    Rock,
    None,
}

/// How the arcade greets Dad the first time it opens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ArcadeIntro {
    pub style: IntroStyle,
    pub welcome_message: String,
    pub nickname: String,
    pub favorite_color: String,
    pub music: Music,
}

impl Default for ArcadeIntro {
    fn default() -> Self {
        Self {
            style: IntroStyle::Classic,
            welcome_message: "Welcome to your arcade, champion!".to_string(),
            nickname: "Player One".to_string(),
            favorite_color: "#FF6B35".to_string(),
            music: Music::Arcade,
        }
    }
}

/// Whether `s` is a `#RRGGBB` color.
pub fn is_hex_color(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 7 && bytes[0] == b'#' && bytes[1..].iter().all(u8::is_ascii_hexdigit)
}

impl ArcadeIntro {
    /// Trim the text fields and check them. Returns the cleaned intro.
    pub fn validated(self) -> Result<Self, ValidationError> {
        let color = self.favorite_color.trim().to_string();
        if !is_hex_color(&color) {
            return Err(ValidationError::BadColor(color));
        }
        Ok(Self {
            welcome_message: validate_text("welcomeMessage", &self.welcome_message)?,
            nickname: validate_text("nickname", &self.nickname)?,
            favorite_color: color,
            ..self
        })
    }
}
