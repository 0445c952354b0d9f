use crate::profile::{DadProfile, Personality};

/// Produces the cartoon avatar shown on the card, as SVG markup.
pub trait AvatarGenerator {
    fn generate(&self, profile: &DadProfile) -> String;
}

/// Built-in avatar: a base face with personality features and a hobby prop.
#[derive(Debug, Clone, Copy, Default)]
pub struct SvgAvatar;

const FACE: &str = r##"<circle cx="100" cy="100" r="60" fill="#FDBCB4" stroke="#8B4513" stroke-width="2"/>
<circle cx="80" cy="85" r="8" fill="#000"/>
<circle cx="120" cy="85" r="8" fill="#000"/>
<circle cx="82" cy="83" r="3" fill="#FFF"/>
<circle cx="122" cy="83" r="3" fill="#FFF"/>
<ellipse cx="100" cy="100" rx="4" ry="6" fill="#CD853F"/>
<path d="M 85 115 Q 100 130 115 115" stroke="#8B4513" stroke-width="3" fill="none" stroke-linecap="round"/>"##;

fn personality_features(personality: Personality) -> &'static str {
    match personality {
        Personality::Funny => r##"<path d="M 75 105 Q 85 110 95 105 Q 105 110 115 105 Q 125 110 135 105" stroke="#8B4513" stroke-width="4" fill="none"/>
<path d="M 70 75 Q 80 70 90 75" stroke="#8B4513" stroke-width="3" fill="none"/>
<path d="M 110 75 Q 120 70 130 75" stroke="#8B4513" stroke-width="3" fill="none"/>"##,
        Personality::Serious => r##"<rect x="65" y="80" width="30" height="20" fill="none" stroke="#000" stroke-width="2" rx="5"/>
<rect x="105" y="80" width="30" height="20" fill="none" stroke="#000" stroke-width="2" rx="5"/>
<line x1="95" y1="90" x2="105" y2="90" stroke="#000" stroke-width="2"/>
<path d="M 80 130 Q 100 140 120 130" stroke="#8B4513" stroke-width="6" fill="#8B4513"/>"##,
        Personality::Adventurous => r##"<ellipse cx="100" cy="50" rx="60" ry="15" fill="#D2691E"/>
<ellipse cx="100" cy="45" rx="55" ry="20" fill="#8B4513"/>
<circle cx="100" cy="45" r="5" fill="#FFD700"/>"##,
        Personality::Gentle => r##"<path d="M 75 80 Q 80 75 85 80" stroke="#8B4513" stroke-width="2" fill="none"/>
<path d="M 115 80 Q 120 75 125 80" stroke="#8B4513" stroke-width="2" fill="none"/>
<path d="M 85 115 Q 100 125 115 115" stroke="#FF69B4" stroke-width="3" fill="none"/>"##,
    }
}

fn hobby_accessory(hobby: &str) -> &'static str {
    let hobby = hobby.to_lowercase();
    let any = |words: &[&str]| words.iter().any(|w| hobby.contains(w));
    if any(&["sport", "football", "baseball", "golf"]) {
        r##"<circle cx="150" cy="60" r="12" fill="#8B4513" stroke="#000" stroke-width="1"/>"##
    } else if any(&["music", "guitar"]) {
        r##"<path d="M 140 50 L 160 50 L 160 80 L 140 80 Z" fill="#8B4513" stroke="#000"/>"##
    } else if any(&["cook", "grill"]) {
        r##"<rect x="140" y="45" width="20" height="5" fill="#D3D3D3" stroke="#000"/>"##
    } else {
        ""
    }
}

impl AvatarGenerator for SvgAvatar {
    fn generate(&self, profile: &DadProfile) -> String {
        format!(
            r#"<svg width="200" height="200" viewBox="0 0 200 200" xmlns="http://www.w3.org/2000/svg">
{}
{}
{}
</svg>"#,
            FACE,
            personality_features(profile.personality),
            hobby_accessory(&profile.favorite_hobby),
        )
    }
}

/// Whether a generator-supplied string looks like a standalone SVG document.
pub fn is_svg(markup: &str) -> bool {
    let m = markup.trim();
    m.starts_with("<svg") && m.ends_with("</svg>") && !m.to_lowercase().contains("<script")
}
