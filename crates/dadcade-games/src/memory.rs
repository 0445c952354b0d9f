use serde::Serialize;

use dadcade_engine::*;

use crate::config::MemoryConfig;

/// Event kind: a = moves, b = pairs found.
pub const EVENT_MOVES: f32 = 102.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub symbol: u8,
    pub face_up: bool,
    pub matched: bool,
}

/// Classic pairs game. Flip two cards; after a short reveal they either lock
/// as a match or turn back face down. Every judged pair costs one move.
pub struct Memory {
    config: MemoryConfig,
    cards: Vec<Card>,
    flipped: Vec<usize>,
    moves: u32,
    pairs_found: u32,
    reveal: Countdown,
}

impl Memory {
    pub fn new(config: MemoryConfig) -> Self {
        Self {
            cards: Vec::with_capacity(config.pairs as usize * 2),
            config,
            flipped: Vec::with_capacity(2),
            moves: 0,
            pairs_found: 0,
            reveal: Countdown::idle(),
        }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn pairs_found(&self) -> u32 {
        self.pairs_found
    }

    pub fn is_won(&self) -> bool {
        !self.cards.is_empty() && self.cards.iter().all(|c| c.matched)
    }

    /// Score for a finished board: base minus a penalty per failed move.
    pub fn score_for(config: &MemoryConfig, moves: u32, pairs: u32) -> u32 {
        let misses = moves.saturating_sub(pairs);
        config
            .base_score
            .saturating_sub(config.move_penalty.saturating_mul(misses))
    }

    fn deal(&mut self, rng: &mut Rng) {
        self.cards.clear();
        for symbol in 0..self.config.pairs {
            let card = Card {
                symbol,
                face_up: false,
                matched: false,
            };
            self.cards.push(card);
            self.cards.push(card);
        }
        rng.shuffle(&mut self.cards);
    }

    /// Turn a card face up. Returns false when the flip is not allowed.
    pub fn flip(&mut self, index: usize) -> bool {
        if self.reveal.is_armed() || self.flipped.len() >= 2 {
            return false;
        }
        let Some(card) = self.cards.get_mut(index) else {
            return false;
        };
        if card.matched || card.face_up {
            return false;
        }
        card.face_up = true;
        self.flipped.push(index);
        if self.flipped.len() == 2 {
            self.reveal.arm(self.config.reveal_delay);
        }
        true
    }

    /// Judge the two face-up cards. Returns whether they matched.
    fn judge(&mut self) -> bool {
        let (a, b) = match self.flipped[..] {
            [a, b] => (a, b),
            _ => return false,
        };
        self.flipped.clear();
        self.moves += 1;
        let matched = self.cards[a].symbol == self.cards[b].symbol;
        for i in [a, b] {
            if matched {
                self.cards[i].matched = true;
            } else {
                self.cards[i].face_up = false;
            }
        }
        if matched {
            self.pairs_found += 1;
        }
        matched
    }
}

impl Game for Memory {
    fn config(&self) -> GameConfig {
        GameConfig {
            world_width: 4.0,
            world_height: (self.config.pairs as f32 * 2.0 / 4.0).ceil(),
            ..GameConfig::default()
        }
    }

    fn game_type(&self) -> GameType {
        GameType::Memory
    }

    fn init(&mut self, ctx: &mut EngineContext) {
        self.flipped.clear();
        self.moves = 0;
        self.pairs_found = 0;
        self.reveal.cancel();
        self.deal(&mut ctx.rng);
    }

    fn update(&mut self, ctx: &mut EngineContext, input: &InputQueue) {
        if ctx.is_finished() {
            return;
        }
        for index in input.selections() {
            self.flip(index);
        }

        if self.reveal.tick(ctx.dt()) {
            if self.judge() {
                ctx.emit_sound(SoundEvent::HIT);
            } else {
                ctx.emit_sound(SoundEvent::MISS);
            }
            ctx.emit_event(GameEvent::new(
                EVENT_MOVES,
                self.moves as f32,
                self.pairs_found as f32,
                0.0,
            ));
            ctx.emit_event(GameEvent::new(event_kind::SCORE, self.score() as f32, 0.0, 0.0));

            if self.is_won() {
                let score = self.score();
                ctx.emit_sound(SoundEvent::GAME_OVER);
                ctx.emit_event(GameEvent::new(event_kind::GAME_OVER, score as f32, 0.0, 0.0));
                ctx.finish(score);
            }
        }
    }

    fn score(&self) -> u32 {
        Self::score_for(&self.config, self.moves, self.pairs_found)
    }

    /// The score only means something once every pair is matched.
    fn may_end_early(&self) -> bool {
        false
    }

    fn render(&self, ctx: &mut RenderContext) {
        for (i, card) in self.cards.iter().enumerate() {
            let (row, col) = (i / 4, i % 4);
            let (sprite, variant) = if card.face_up || card.matched {
                (sprite::CARD_FACE, card.symbol as f32)
            } else {
                (sprite::CARD_BACK, 0.0)
            };
            let mut inst = RenderInstance::rect(col as f32 + 0.5, row as f32 + 0.5, 0.9, 0.9, sprite, variant);
            if card.matched {
                inst.alpha = 0.6;
            }
            ctx.render_buffer.push(inst);
        }
    }

    fn snapshot(&self) -> serde_json::Value {
        serde_json::json!({
            "cards": self.cards,
            "moves": self.moves,
            "pairsFound": self.pairs_found,
            "score": self.score(),
            "revealing": self.reveal.is_armed(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started(seed: u64) -> (Memory, EngineContext) {
        let mut game = Memory::new(MemoryConfig::default());
        let mut ctx = EngineContext::new(seed);
        game.init(&mut ctx);
        (game, ctx)
    }

    fn partner_of(game: &Memory, index: usize) -> usize {
        let symbol = game.cards()[index].symbol;
        (0..game.cards().len())
            .find(|&j| j != index && game.cards()[j].symbol == symbol)
            .unwrap()
    }

    fn wait_reveal(game: &mut Memory, ctx: &mut EngineContext) {
        let empty = InputQueue::new();
        for _ in 0..70 {
            game.update(ctx, &empty);
        }
    }

    #[test]
    fn deals_each_symbol_twice() {
        let (game, _) = started(5);
        assert_eq!(game.cards().len(), 12);
        for s in 0..6u8 {
            assert_eq!(game.cards().iter().filter(|c| c.symbol == s).count(), 2);
        }
    }

    #[test]
    fn third_flip_waits_for_reveal() {
        let (mut game, _) = started(5);
        assert!(game.flip(0));
        assert!(game.flip(1));
        assert!(!game.flip(2));
        assert!(!game.flip(0), "face-up card cannot flip again");
    }

    #[test]
    fn mismatch_flips_back_and_costs_a_move() {
        let (mut game, mut ctx) = started(11);
        let a = 0;
        let b = (1..12).find(|&j| game.cards()[j].symbol != game.cards()[a].symbol).unwrap();
        game.flip(a);
        game.flip(b);
        wait_reveal(&mut game, &mut ctx);
        assert_eq!(game.moves(), 1);
        assert!(!game.cards()[a].face_up && !game.cards()[b].face_up);
        assert_eq!(game.score(), 975);
    }

    #[test]
    fn perfect_game_scores_full_and_finishes() {
        let (mut game, mut ctx) = started(21);
        while !game.is_won() {
            let a = (0..12).find(|&i| !game.cards()[i].matched).unwrap();
            let b = partner_of(&game, a);
            game.flip(a);
            game.flip(b);
            wait_reveal(&mut game, &mut ctx);
        }
        assert_eq!(game.moves(), 6);
        assert_eq!(ctx.finished(), Some(1000));
    }

    #[test]
    fn score_is_non_increasing_in_moves() {
        let config = MemoryConfig::default();
        let mut last = u32::MAX;
        for moves in 6..80 {
            let s = Memory::score_for(&config, moves, 6);
            assert!(s <= last);
            last = s;
        }
        assert_eq!(Memory::score_for(&config, 500, 6), 0);
    }
}
