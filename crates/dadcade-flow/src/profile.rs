use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Personality {
    #[default]
    Funny,
    Serious,
    Adventurous,
    Gentle,
}

impl Personality {
    pub const ALL: [Personality; 4] = [
        Personality::Funny,
        Personality::Serious,
        Personality::Adventurous,
        Personality::Gentle,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Personality::Funny => "funny",
            Personality::Serious => "serious",
            Personality::Adventurous => "adventurous",
            Personality::Gentle => "gentle",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == s.trim())
    }

    /// Option label shown by the questionnaire.
    pub fn label(self) -> &'static str {
        match self {
            Personality::Funny => "Funny & Jokes Around",
            Personality::Serious => "Wise & Thoughtful",
            Personality::Adventurous => "Active & Adventurous",
            Personality::Gentle => "Caring & Gentle",
        }
    }
}

/// What the questionnaire learned about Dad. Built once, never edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DadProfile {
    pub name: String,
    pub favorite_hobby: String,
    pub personality: Personality,
    pub favorite_memory: String,
    pub special_trait: String,
}
