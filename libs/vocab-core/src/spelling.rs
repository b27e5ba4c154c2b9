//! Spelling mini-game: rebuild a word from shuffled letter tiles.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A single letter tile. `id` is stable for the round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub id: usize,
    pub letter: char,
}

/// Result of checking the current attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpellingOutcome {
    Correct,
    Incorrect,
    Incomplete,
}

#[derive(Debug, Clone)]
pub struct SpellingRound {
    answer: Vec<char>,
    tiles: Vec<Tile>,
    slots: Vec<Option<usize>>,
}

impl SpellingRound {
    /// Build a round with one shuffled tile per letter of `word`.
    pub fn new<R: Rng + ?Sized>(word: &str, rng: &mut R) -> Self {
        let answer: Vec<char> = word.chars().filter(|c| !c.is_whitespace()).collect();
        let mut tiles: Vec<Tile> = answer
            .iter()
            .enumerate()
            .map(|(id, &letter)| Tile { id, letter })
            .collect();

        let scrambles = answer.windows(2).any(|w| !w[0].eq_ignore_ascii_case(&w[1]));
        if scrambles {
            tiles.shuffle(rng);
            // Never hand out the word already solved.
            if letters_of(&tiles).eq_ignore_ascii_case(&answer.iter().collect::<String>()) {
                let first = tiles
                    .iter()
                    .position(|t| !t.letter.eq_ignore_ascii_case(&tiles[0].letter))
                    .unwrap_or(0);
                tiles.swap(0, first);
            }
        }

        Self {
            slots: vec![None; answer.len()],
            answer,
            tiles,
        }
    }

    pub fn answer(&self) -> String {
        self.answer.iter().collect()
    }

    /// Tiles in their shuffled order.
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Tiles not yet placed in a slot, in shuffled order.
    pub fn tray(&self) -> Vec<Tile> {
        self.tiles
            .iter()
            .filter(|t| !self.slots.contains(&Some(t.id)))
            .copied()
            .collect()
    }

    /// Letter currently in each slot.
    pub fn slots(&self) -> Vec<Option<char>> {
        self.slots
            .iter()
            .map(|slot| slot.and_then(|id| self.letter(id)))
            .collect()
    }

    /// Put a tile into a slot. A tile already placed elsewhere moves; a tile
    /// already in the target slot goes back to the tray.
    pub fn place(&mut self, tile_id: usize, slot: usize) -> bool {
        if slot >= self.slots.len() || self.letter(tile_id).is_none() {
            return false;
        }
        for s in self.slots.iter_mut() {
            if *s == Some(tile_id) {
                *s = None;
            }
        }
        self.slots[slot] = Some(tile_id);
        true
    }

    /// Place a tile into the first empty slot.
    pub fn push(&mut self, tile_id: usize) -> bool {
        match self.slots.iter().position(Option::is_none) {
            Some(slot) if !self.slots.contains(&Some(tile_id)) => self.place(tile_id, slot),
            _ => false,
        }
    }

    /// Clear the board and lay tiles out to spell `text`, letter by letter.
    /// Returns false if a letter has no free tile left.
    pub fn spell(&mut self, text: &str) -> bool {
        self.clear();
        for c in text.chars().filter(|c| !c.is_whitespace()) {
            let free = self
                .tray()
                .into_iter()
                .find(|t| t.letter.to_lowercase().eq(c.to_lowercase()));
            match free {
                Some(tile) if self.push(tile.id) => {}
                _ => return false,
            }
        }
        true
    }

    /// Return a slot's tile to the tray.
    pub fn remove(&mut self, slot: usize) -> Option<usize> {
        self.slots.get_mut(slot).and_then(Option::take)
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = None);
    }

    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// Letters placed so far, skipping empty slots.
    pub fn attempt(&self) -> String {
        self.slots().into_iter().flatten().collect()
    }

    pub fn check(&self) -> SpellingOutcome {
        if !self.is_complete() {
            return SpellingOutcome::Incomplete;
        }
        if self.attempt().to_lowercase() == self.answer().to_lowercase() {
            SpellingOutcome::Correct
        } else {
            SpellingOutcome::Incorrect
        }
    }

    /// First slot that is empty or holds the wrong letter, with the letter
    /// that belongs there.
    pub fn hint(&self) -> Option<(usize, char)> {
        self.slots()
            .into_iter()
            .zip(self.answer.iter())
            .enumerate()
            .find(|(_, (placed, expected))| {
                !placed.map_or(false, |c| c.to_lowercase().eq(expected.to_lowercase()))
            })
            .map(|(i, (_, expected))| (i, *expected))
    }

    fn letter(&self, tile_id: usize) -> Option<char> {
        self.tiles.iter().find(|t| t.id == tile_id).map(|t| t.letter)
    }
}

fn letters_of(tiles: &[Tile]) -> String {
    tiles.iter().map(|t| t.letter).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn solve(round: &mut SpellingRound) {
        let answer: Vec<char> = round.answer().chars().collect();
        let mut used = Vec::new();
        for (slot, letter) in answer.iter().enumerate() {
            let tile = round
                .tiles()
                .iter()
                .find(|t| t.letter == *letter && !used.contains(&t.id))
                .copied()
                .unwrap();
            used.push(tile.id);
            assert!(round.place(tile.id, slot));
        }
    }

    #[test]
    fn tiles_never_start_solved() {
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let round = SpellingRound::new("at", &mut rng);
            assert_eq!(letters_of(round.tiles()), "ta");
        }
    }

    #[test]
    fn single_repeated_letter_is_left_alone() {
        let mut rng = StdRng::seed_from_u64(1);
        let round = SpellingRound::new("aaa", &mut rng);
        assert_eq!(letters_of(round.tiles()), "aaa");
    }

    #[test]
    fn solving_checks_correct() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut round = SpellingRound::new("rabbit", &mut rng);
        assert_eq!(round.check(), SpellingOutcome::Incomplete);
        solve(&mut round);
        assert!(round.tray().is_empty());
        assert_eq!(round.attempt(), "rabbit");
        assert_eq!(round.check(), SpellingOutcome::Correct);
        assert_eq!(round.hint(), None);
    }

    #[test]
    fn wrong_order_is_incorrect_with_hint() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut round = SpellingRound::new("dog", &mut rng);
        solve(&mut round);
        let first = round.remove(0).unwrap();
        let second = round.remove(1).unwrap();
        round.place(second, 0);
        round.place(first, 1);

        assert_eq!(round.attempt(), "odg");
        assert_eq!(round.check(), SpellingOutcome::Incorrect);
        assert_eq!(round.hint(), Some((0, 'd')));
    }

    #[test]
    fn spell_lays_out_typed_text() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut round = SpellingRound::new("Tree", &mut rng);
        assert!(round.spell("tree"));
        assert_eq!(round.check(), SpellingOutcome::Correct);

        assert!(round.spell("ter"));
        assert_eq!(round.check(), SpellingOutcome::Incomplete);

        assert!(!round.spell("trees"));
        assert!(!round.spell("tx"));
    }

    #[test]
    fn placing_moves_tile_between_slots() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut round = SpellingRound::new("sun", &mut rng);
        let tile = round.tiles()[0].id;
        assert!(round.place(tile, 0));
        assert!(round.place(tile, 2));
        assert_eq!(round.slots()[0], None);
        assert!(round.slots()[2].is_some());
        assert_eq!(round.tray().len(), 2);
        assert!(!round.place(tile, 7));
        assert!(!round.push(tile));
    }
}
