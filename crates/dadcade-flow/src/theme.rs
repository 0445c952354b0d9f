use serde::{Deserialize, Serialize};

/// Page color scheme picked on the first screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Warm,
    Ocean,
    Forest,
    Light,
}

impl Theme {
    pub const ALL: [Theme; 5] = [Theme::Dark, Theme::Warm, Theme::Ocean, Theme::Forest, Theme::Light];

    /// Class applied to the document root.
    pub fn css_class(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Warm => "theme-warm",
            Theme::Ocean => "theme-ocean",
            Theme::Forest => "theme-forest",
            Theme::Light => "theme-light",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Theme::Dark => "Retro Arcade",
            Theme::Warm => "Cozy Evening",
            Theme::Ocean => "Deep Ocean",
            Theme::Forest => "Forest Night",
            Theme::Light => "Clean Light",
        }
    }

    /// Accepts either the short id or the CSS class.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.css_class() == s || t.css_class().trim_start_matches("theme-") == s)
    }
}
