use serde::{Deserialize, Serialize};

use crate::card::ColorTheme;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThankYouStyle {
    #[default]
    Heartfelt,
    Funny,
    Grateful,
    Proud,
}

impl ThankYouStyle {
    pub fn colors(self) -> ColorTheme {
        match self {
            ThankYouStyle::Heartfelt => ColorTheme::new("#E91E63", "#F8BBD9", "#AD1457"),
            ThankYouStyle::Funny => ColorTheme::new("#FF9800", "#FFE0B2", "#F57C00"),
            ThankYouStyle::Grateful => ColorTheme::new("#4CAF50", "#C8E6C9", "#388E3C"),
            ThankYouStyle::Proud => ColorTheme::new("#2196F3", "#BBDEFB", "#1976D2"),
        }
    }
}

/// Note Dad can write back from the arcade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ThankYouCard {
    pub dad_name: String,
    pub personal_message: String,
    pub favorite_memory: String,
    pub style: ThankYouStyle,
    pub signature: String,
}

impl Default for ThankYouCard {
    fn default() -> Self {
        Self {
            dad_name: "Dad".to_string(),
            personal_message: String::new(),
            favorite_memory: String::new(),
            style: ThankYouStyle::Heartfelt,
            signature: "Your Child".to_string(),
        }
    }
}

/// The rendered note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThankYouNote {
    pub title: String,
    pub message: String,
    pub memory: Option<String>,
    pub signature: String,
    pub colors: ColorTheme,
}

fn or_default(value: &str, default: &str) -> String {
    let v = value.trim();
    if v.is_empty() { default.to_string() } else { v.to_string() }
}

impl ThankYouCard {
    /// Fill blank fields with the stock wording.
    pub fn render(&self) -> ThankYouNote {
        let dad = or_default(&self.dad_name, "Dad");
        let fallback = format!(
            "Dear {}, thank you for being the amazing father you are. Your love and support mean everything to me.",
            dad
        );
        let memory = self.favorite_memory.trim();
        ThankYouNote {
            title: format!("Thank You, {}!", dad),
            message: or_default(&self.personal_message, &fallback),
            memory: (!memory.is_empty()).then(|| memory.to_string()),
            signature: or_default(&self.signature, "Your Child"),
            colors: self.style.colors(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_card_uses_stock_text() {
        let card = ThankYouCard { dad_name: " ".into(), ..Default::default() };
        let note = card.render();
        assert_eq!(note.title, "Thank You, Dad!");
        assert!(note.message.starts_with("Dear Dad,"));
        assert_eq!(note.signature, "Your Child");
        assert_eq!(note.memory, None);
        assert_eq!(note.colors.primary, "#E91E63");
    }

    #[test]
    fn personal_message_wins() {
        let card = ThankYouCard {
            dad_name: "Tom".into(),
            personal_message: "Best gift ever".into(),
            style: ThankYouStyle::Proud,
            ..Default::default()
        };
        let note = card.render();
        assert_eq!(note.title, "Thank You, Tom!");
        assert_eq!(note.message, "Best gift ever");
        assert_eq!(note.colors.accent, "#1976D2");
    }
}
