use std::cell::RefCell;
use std::collections::{HashSet, VecDeque};
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use dadcade_engine::*;

use crate::config::TriviaConfig;

/// Event kind: a = questions answered, b = 1 if the last answer was correct.
pub const EVENT_ANSWERED: f32 = 103.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Dad,
    General,
    Sports,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Dad, Category::General, Category::Sports];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Dad => "dad",
            Category::General => "general",
            Category::Sports => "sports",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Medium,
    Hard,
    /// Unknown difficulty labels score as easy.
    #[serde(other)]
    Easy,
}

impl Difficulty {
    pub fn points(self) -> u32 {
        match self {
            Difficulty::Easy => 10,
            Difficulty::Medium => 20,
            Difficulty::Hard => 30,
        }
    }
}

/// A question as served by the trivia endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriviaQuestion {
    pub id: String,
    pub category: String,
    pub question: String,
    pub correct_answer: String,
    pub incorrect_answers: Vec<String>,
    pub difficulty: Difficulty,
}

impl TriviaQuestion {
    pub fn from_json(json: &str) -> Result<Self, SourceError> {
        let q: Self = serde_json::from_str(json)?;
        if q.question.trim().is_empty() || q.correct_answer.trim().is_empty() {
            return Err(SourceError::Malformed(format!("question {} is empty", q.id)));
        }
        Ok(q)
    }
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("trivia source unavailable: {0}")]
    Unavailable(String),
    #[error("malformed trivia question: {0}")]
    Malformed(String),
    #[error("trivia json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Where questions come from. Failures fall back to the built-in bank.
pub trait TriviaSource {
    fn fetch(&mut self, category: Category) -> Result<TriviaQuestion, SourceError>;
}

impl<S: TriviaSource + ?Sized> TriviaSource for Box<S> {
    fn fetch(&mut self, category: Category) -> Result<TriviaQuestion, SourceError> {
        (**self).fetch(category)
    }
}

/// The three questions used whenever the source fails.
pub fn fallback_questions() -> Vec<TriviaQuestion> {
    fn q(id: &str, category: &str, question: &str, correct: &str, wrong: [&str; 3], difficulty: Difficulty) -> TriviaQuestion {
        TriviaQuestion {
            id: id.to_string(),
            category: category.to_string(),
            question: question.to_string(),
            correct_answer: correct.to_string(),
            incorrect_answers: wrong.iter().map(|s| s.to_string()).collect(),
            difficulty,
        }
    }
    vec![
        q(
            "fallback-1",
            "dad",
            "When is Father's Day celebrated in the United States?",
            "Third Sunday in June",
            ["First Sunday in June", "Second Sunday in May", "Last Sunday in June"],
            Difficulty::Medium,
        ),
        q(
            "fallback-2",
            "general",
            "What does \"www\" stand for in a website address?",
            "World Wide Web",
            ["World Wide Window", "Web Wide World", "Wide World Web"],
            Difficulty::Easy,
        ),
        q(
            "fallback-3",
            "sports",
            "How many players are on a basketball team on the court at one time?",
            "5",
            ["6", "7", "4"],
            Difficulty::Easy,
        ),
    ]
}

/// Offline source cycling through the built-in bank.
#[derive(Debug, Clone)]
pub struct FallbackBank {
    questions: Vec<TriviaQuestion>,
    next: usize,
}

impl FallbackBank {
    pub fn new() -> Self {
        Self {
            questions: fallback_questions(),
            next: 0,
        }
    }
}

impl Default for FallbackBank {
    fn default() -> Self {
        Self::new()
    }
}

impl TriviaSource for FallbackBank {
    fn fetch(&mut self, category: Category) -> Result<TriviaQuestion, SourceError> {
        let n = self.questions.len();
        if n == 0 {
            return Err(SourceError::Unavailable("fallback bank is empty".into()));
        }
        let pick = (0..n)
            .map(|k| (self.next + k) % n)
            .find(|&i| self.questions[i].category == category.as_str())
            .unwrap_or(self.next % n);
        self.next = (pick + 1) % n;
        Ok(self.questions[pick].clone())
    }
}

/// Source fed with prefetched questions by the host page.
/// Clones share one queue, so the page can keep pushing while a game reads.
#[derive(Debug, Clone, Default)]
pub struct QueueSource {
    queue: Rc<RefCell<VecDeque<TriviaQuestion>>>,
}

impl QueueSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, question: TriviaQuestion) {
        self.queue.borrow_mut().push_back(question);
    }

    pub fn push_json(&self, json: &str) -> Result<(), SourceError> {
        self.push(TriviaQuestion::from_json(json)?);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }
}

impl TriviaSource for QueueSource {
    fn fetch(&mut self, category: Category) -> Result<TriviaQuestion, SourceError> {
        let mut queue = self.queue.borrow_mut();
        let pos = queue
            .iter()
            .position(|q| q.category == category.as_str())
            .unwrap_or(0);
        queue
            .remove(pos)
            .ok_or_else(|| SourceError::Unavailable("no prefetched questions".into()))
    }
}

/// The question on screen, with its answers in display order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveQuestion {
    pub id: String,
    pub category: String,
    pub question: String,
    pub answers: Vec<String>,
    #[serde(skip)]
    pub correct: usize,
    pub difficulty: Difficulty,
}

/// Ten-question quiz. Each question is pulled from the source on demand;
/// a correct answer scores by difficulty, then the next question follows
/// after a short reveal.
pub struct Trivia {
    config: TriviaConfig,
    source: Box<dyn TriviaSource>,
    fallback: Vec<TriviaQuestion>,
    seen: HashSet<String>,
    current: Option<ActiveQuestion>,
    selected: Option<usize>,
    answered: u32,
    score: u32,
    reveal: Countdown,
}

impl Trivia {
    pub fn new(config: TriviaConfig, source: Box<dyn TriviaSource>) -> Self {
        Self {
            config,
            source,
            fallback: fallback_questions(),
            seen: HashSet::new(),
            current: None,
            selected: None,
            answered: 0,
            score: 0,
            reveal: Countdown::idle(),
        }
    }

    pub fn current(&self) -> Option<&ActiveQuestion> {
        self.current.as_ref()
    }

    pub fn answered(&self) -> u32 {
        self.answered
    }

    pub fn seen_ids(&self) -> &HashSet<String> {
        &self.seen
    }

    /// Pick a fallback question, unseen ones first.
    fn fallback_question(&self, rng: &mut Rng) -> Option<TriviaQuestion> {
        let unseen: Vec<&TriviaQuestion> = self
            .fallback
            .iter()
            .filter(|q| !self.seen.contains(&q.id))
            .collect();
        match rng.pick(&unseen) {
            Some(q) => Some((*q).clone()),
            None => rng.pick(&self.fallback).cloned(),
        }
    }

    /// Fetch the next question, refetching duplicates up to the retry budget.
    fn next_question(&mut self, rng: &mut Rng) -> Option<TriviaQuestion> {
        let mut retries = 0;
        loop {
            let category = rng.pick(&Category::ALL).copied().unwrap_or(Category::General);
            match self.source.fetch(category) {
                Ok(q) if !self.seen.contains(&q.id) => return Some(q),
                Ok(q) if retries < self.config.retry_budget => {
                    retries += 1;
                    log::debug!("trivia question {} already seen, retry {}", q.id, retries);
                }
                Ok(q) => {
                    log::info!("trivia retries exhausted, using fallback");
                    let fb = self.fallback_question(rng);
                    return match fb {
                        Some(f) if !self.seen.contains(&f.id) => Some(f),
                        _ => Some(q),
                    };
                }
                Err(e) => {
                    log::warn!("trivia source failed, using fallback: {}", e);
                    return self.fallback_question(rng);
                }
            }
        }
    }

    fn load_next(&mut self, rng: &mut Rng) {
        self.selected = None;
        self.current = self.next_question(rng).map(|q| {
            self.seen.insert(q.id.clone());
            let mut answers = q.incorrect_answers.clone();
            answers.push(q.correct_answer.clone());
            rng.shuffle(&mut answers);
            let correct = answers
                .iter()
                .position(|a| *a == q.correct_answer)
                .unwrap_or(0);
            ActiveQuestion {
                id: q.id,
                category: q.category,
                question: q.question,
                answers,
                correct,
                difficulty: q.difficulty,
            }
        });
    }

    /// Choose an answer for the current question. Returns whether it was correct,
    /// or `None` if the choice was not accepted.
    pub fn answer(&mut self, index: usize) -> Option<bool> {
        if self.selected.is_some() || self.reveal.is_armed() {
            return None;
        }
        let q = self.current.as_ref()?;
        if index >= q.answers.len() {
            return None;
        }
        let correct = index == q.correct;
        if correct {
            self.score += q.difficulty.points();
        }
        self.selected = Some(index);
        self.answered += 1;
        self.reveal.arm(self.config.reveal_delay);
        Some(correct)
    }
}

impl Game for Trivia {
    fn game_type(&self) -> GameType {
        GameType::Trivia
    }

    fn init(&mut self, ctx: &mut EngineContext) {
        self.seen.clear();
        self.answered = 0;
        self.score = 0;
        self.reveal.cancel();
        self.load_next(&mut ctx.rng);
    }

    fn update(&mut self, ctx: &mut EngineContext, input: &InputQueue) {
        if ctx.is_finished() {
            return;
        }
        for index in input.selections() {
            if let Some(correct) = self.answer(index) {
                ctx.emit_sound(if correct { SoundEvent::HIT } else { SoundEvent::MISS });
                ctx.emit_event(GameEvent::new(
                    EVENT_ANSWERED,
                    self.answered as f32,
                    if correct { 1.0 } else { 0.0 },
                    0.0,
                ));
                ctx.emit_event(GameEvent::new(event_kind::SCORE, self.score as f32, 0.0, 0.0));
            }
        }

        if self.reveal.tick(ctx.dt()) {
            if self.answered >= self.config.questions {
                ctx.emit_sound(SoundEvent::GAME_OVER);
                ctx.emit_event(GameEvent::new(event_kind::GAME_OVER, self.score as f32, 0.0, 0.0));
                ctx.finish(self.score);
            } else {
                self.load_next(&mut ctx.rng);
                ctx.emit_event(GameEvent::new(event_kind::ROUND, self.answered as f32 + 1.0, 0.0, 0.0));
            }
        }
    }

    fn score(&self) -> u32 {
        self.score
    }

    fn render(&self, ctx: &mut RenderContext) {
        let Some(q) = &self.current else { return };
        for i in 0..q.answers.len() {
            let state = match self.selected {
                Some(_) if i == q.correct => 1.0,
                Some(s) if s == i => 2.0,
                _ => 0.0,
            };
            ctx.render_buffer.push(RenderInstance::rect(
                200.0,
                150.0 + i as f32 * 40.0,
                320.0,
                32.0,
                sprite::ANSWER,
                state,
            ));
        }
    }

    fn snapshot(&self) -> serde_json::Value {
        serde_json::json!({
            "question": self.current,
            "selected": self.selected,
            "correct": self.selected.and(self.current.as_ref().map(|q| q.correct)),
            "number": self.answered + u32::from(self.selected.is_none()),
            "total": self.config.questions,
            "score": self.score,
        })
    }
}
