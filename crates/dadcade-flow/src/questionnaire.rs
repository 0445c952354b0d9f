use serde::Serialize;
use thiserror::Error;

use crate::profile::{DadProfile, Personality};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} cannot be blank")]
    Blank(&'static str),
    #[error("{field} is longer than {max} characters")]
    TooLong { field: &'static str, max: usize },
    #[error("unknown {field}: {value}")]
    Unknown { field: &'static str, value: String },
    #[error("{0} is not a #RRGGBB color")]
    BadColor(String),
}

/// Longest answer accepted for any free-text question.
pub const MAX_ANSWER_LEN: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Question {
    Name,
    FavoriteHobby,
    Personality,
    FavoriteMemory,
    SpecialTrait,
}

impl Question {
    pub const ALL: [Question; 5] = [
        Question::Name,
        Question::FavoriteHobby,
        Question::Personality,
        Question::FavoriteMemory,
        Question::SpecialTrait,
    ];

    pub fn field(self) -> &'static str {
        match self {
            Question::Name => "name",
            Question::FavoriteHobby => "favoriteHobby",
            Question::Personality => "personality",
            Question::FavoriteMemory => "favoriteMemory",
            Question::SpecialTrait => "specialTrait",
        }
    }

    pub fn prompt(self) -> &'static str {
        match self {
            Question::Name => "What's your dad's name?",
            Question::FavoriteHobby => "What's his favorite hobby or activity?",
            Question::Personality => "Which best describes dad's personality?",
            Question::FavoriteMemory => "Share a favorite memory with dad",
            Question::SpecialTrait => "What makes dad special or unique?",
        }
    }
}

/// Validate one free-text answer, returning it trimmed.
pub fn validate_text(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Blank(field));
    }
    if trimmed.chars().count() > MAX_ANSWER_LEN {
        return Err(ValidationError::TooLong { field, max: MAX_ANSWER_LEN });
    }
    Ok(trimmed.to_string())
}

/// Progress through the five questions, one at a time.
#[derive(Debug, Clone, Default)]
pub struct Questionnaire {
    step: usize,
    answers: [String; 5],
    personality: Personality,
    error: Option<ValidationError>,
}

/// What the questionnaire screen shows.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    pub question: Question,
    pub prompt: &'static str,
    pub number: usize,
    pub total: usize,
    pub answer: String,
    pub options: Vec<(Personality, &'static str)>,
    pub error: Option<String>,
    pub is_last: bool,
}

impl Questionnaire {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Question {
        Question::ALL[self.step]
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn is_last(&self) -> bool {
        self.step + 1 == Question::ALL.len()
    }

    /// Record the answer to the current question. Clears any shown error.
    pub fn answer(&mut self, value: &str) -> Result<(), ValidationError> {
        self.error = None;
        if self.current() == Question::Personality {
            self.personality = Personality::parse(value).ok_or_else(|| ValidationError::Unknown {
                field: "personality",
                value: value.to_string(),
            })?;
        } else {
            self.answers[self.step] = value.to_string();
        }
        Ok(())
    }

    fn check_current(&self) -> Result<(), ValidationError> {
        let q = self.current();
        if q != Question::Personality {
            validate_text(q.field(), &self.answers[self.step])?;
        }
        Ok(())
    }

    /// Advance to the next question. A blank answer blocks and is kept as the
    /// inline error. On the last question, returns the finished profile.
    pub fn next(&mut self) -> Result<Option<DadProfile>, ValidationError> {
        if let Err(e) = self.check_current() {
            self.error = Some(e.clone());
            return Err(e);
        }
        self.error = None;
        if self.is_last() {
            return self.profile().map(Some);
        }
        self.step += 1;
        Ok(None)
    }

    pub fn back(&mut self) {
        self.error = None;
        self.step = self.step.saturating_sub(1);
    }

    /// Build the profile from every answer, validating them all.
    pub fn profile(&self) -> Result<DadProfile, ValidationError> {
        let text = |q: Question| validate_text(q.field(), &self.answers[q as usize]);
        Ok(DadProfile {
            name: text(Question::Name)?,
            favorite_hobby: text(Question::FavoriteHobby)?,
            personality: self.personality,
            favorite_memory: text(Question::FavoriteMemory)?,
            special_trait: text(Question::SpecialTrait)?,
        })
    }

    pub fn view(&self) -> QuestionView {
        let q = self.current();
        QuestionView {
            question: q,
            prompt: q.prompt(),
            number: self.step + 1,
            total: Question::ALL.len(),
            answer: if q == Question::Personality {
                self.personality.as_str().to_string()
            } else {
                self.answers[self.step].clone()
            },
            options: if q == Question::Personality {
                Personality::ALL.iter().map(|p| (*p, p.label())).collect()
            } else {
                Vec::new()
            },
            error: self.error.as_ref().map(|e| e.to_string()),
            is_last: self.is_last(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill(q: &mut Questionnaire, answers: [&str; 5]) -> Option<DadProfile> {
        let mut out = None;
        for a in answers {
            q.answer(a).unwrap();
            out = q.next().unwrap();
        }
        out
    }

    #[test]
    fn five_answers_build_a_profile() {
        let mut q = Questionnaire::new();
        let p = fill(&mut q, ["  Tom ", "golf", "serious", "the lake trip", "patience"]).unwrap();
        assert_eq!(p.name, "Tom");
        assert_eq!(p.personality, Personality::Serious);
        assert_eq!(p.special_trait, "patience");
    }

    #[test]
    fn blank_answer_blocks_advance() {
        let mut q = Questionnaire::new();
        q.answer("   ").unwrap();
        assert_eq!(q.next(), Err(ValidationError::Blank("name")));
        assert_eq!(q.step(), 0);
        assert!(q.view().error.is_some());
        q.answer("Tom").unwrap();
        assert!(q.view().error.is_none());
        assert_eq!(q.next(), Ok(None));
        assert_eq!(q.current(), Question::FavoriteHobby);
    }

    #[test]
    fn back_keeps_answers() {
        let mut q = Questionnaire::new();
        q.answer("Tom").unwrap();
        q.next().unwrap();
        q.back();
        q.back();
        assert_eq!(q.step(), 0);
        assert_eq!(q.view().answer, "Tom");
    }

    #[test]
    fn unknown_personality_is_rejected() {
        let mut q = Questionnaire::new();
        q.answer("Tom").unwrap();
        q.next().unwrap();
        q.answer("golf").unwrap();
        q.next().unwrap();
        assert!(matches!(q.answer("grumpy"), Err(ValidationError::Unknown { .. })));
        assert_eq!(q.view().options.len(), 4);
    }

    #[test]
    fn overly_long_answer_is_rejected() {
        let long = "x".repeat(MAX_ANSWER_LEN + 1);
        assert!(matches!(
            validate_text("name", &long),
            Err(ValidationError::TooLong { .. })
        ));
    }
}
