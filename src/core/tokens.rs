//! Grape and wine tokens.
//!
//! ## TokenLadder
//!
//! A ladder is a row of nine slots indexed by value 1..=9. At most one
//! token sits on each value. Placing a token that lands on an occupied
//! value slides it down to the nearest free slot; if none is free at or
//! above the ladder's floor the token is lost. Tokens never gain value on
//! placement.
//!
//! Each year the ladders age: scanning from the top, every token moves up
//! one slot unless it is already on value 9 or the slot above was taken
//! during this scan.

use serde::{Deserialize, Serialize};

/// Number of slots on a ladder.
pub const LADDER_SIZE: usize = 9;

/// Nine-slot token ladder.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenLadder([bool; LADDER_SIZE]);

impl TokenLadder {
    /// Create an empty ladder.
    #[must_use]
    pub const fn new() -> Self {
        Self([false; LADDER_SIZE])
    }

    /// Create a ladder from raw slots, index 0 = value 1.
    #[must_use]
    pub const fn from_slots(slots: [bool; LADDER_SIZE]) -> Self {
        Self(slots)
    }

    /// Raw slots, index 0 = value 1.
    #[must_use]
    pub const fn slots(&self) -> &[bool; LADDER_SIZE] {
        &self.0
    }

    /// Check whether a value is occupied. Out-of-range values are never
    /// occupied.
    #[must_use]
    pub fn is_occupied(&self, value: u8) -> bool {
        (1..=LADDER_SIZE as u8).contains(&value) && self.0[value as usize - 1]
    }

    /// Value a token of `value` would land on, or `None` if it would be
    /// lost. Never returns less than `floor`.
    #[must_use]
    pub fn devalued_value(&self, value: u8, floor: u8) -> Option<u8> {
        let top = value.min(LADDER_SIZE as u8);
        (floor.max(1)..=top).rev().find(|&v| !self.is_occupied(v))
    }

    /// Place a token, devaluing as needed. Returns the value it landed on.
    pub fn place(&mut self, value: u8, floor: u8) -> Option<u8> {
        let landed = self.devalued_value(value, floor)?;
        self.0[landed as usize - 1] = true;
        Some(landed)
    }

    /// Remove the token on a value. Returns false if it was empty.
    pub fn remove(&mut self, value: u8) -> bool {
        if !self.is_occupied(value) {
            return false;
        }
        self.0[value as usize - 1] = false;
        true
    }

    /// The ladder after one year of aging.
    #[must_use]
    pub fn aged(&self) -> Self {
        let mut out = [false; LADDER_SIZE];
        for i in (0..LADDER_SIZE).rev() {
            if !self.0[i] {
                continue;
            }
            if i == LADDER_SIZE - 1 || out[i + 1] {
                out[i] = true;
            } else {
                out[i + 1] = true;
            }
        }
        Self(out)
    }

    /// Occupied values, ascending.
    pub fn values(&self) -> impl Iterator<Item = u8> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, occupied)| **occupied)
            .map(|(i, _)| i as u8 + 1)
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.0.iter().filter(|&&occupied| occupied).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Highest occupied value.
    #[must_use]
    pub fn max_value(&self) -> Option<u8> {
        self.values().last()
    }
}

/// Grape color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GrapeColor {
    Red,
    White,
}

/// Wine color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WineColor {
    Red,
    White,
    Blush,
    Sparkling,
}

impl WineColor {
    pub const ALL: [WineColor; 4] = [
        WineColor::Red,
        WineColor::White,
        WineColor::Blush,
        WineColor::Sparkling,
    ];

    /// Lowest value this wine can sit on.
    #[must_use]
    pub const fn floor(self) -> u8 {
        match self {
            WineColor::Red | WineColor::White => 1,
            WineColor::Blush => 4,
            WineColor::Sparkling => 7,
        }
    }
}

/// A grape token on the crush pad.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GrapeSpec {
    pub color: GrapeColor,
    pub value: u8,
}

impl GrapeSpec {
    #[must_use]
    pub const fn new(color: GrapeColor, value: u8) -> Self {
        Self { color, value }
    }

    #[must_use]
    pub const fn red(value: u8) -> Self {
        Self::new(GrapeColor::Red, value)
    }

    #[must_use]
    pub const fn white(value: u8) -> Self {
        Self::new(GrapeColor::White, value)
    }
}

/// A wine token in the cellar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WineSpec {
    pub color: WineColor,
    pub value: u8,
}

impl WineSpec {
    #[must_use]
    pub const fn new(color: WineColor, value: u8) -> Self {
        Self { color, value }
    }
}

/// Red and white grape ladders.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrushPad {
    pub red: TokenLadder,
    pub white: TokenLadder,
}

impl CrushPad {
    #[must_use]
    pub fn ladder(&self, color: GrapeColor) -> &TokenLadder {
        match color {
            GrapeColor::Red => &self.red,
            GrapeColor::White => &self.white,
        }
    }

    pub fn ladder_mut(&mut self, color: GrapeColor) -> &mut TokenLadder {
        match color {
            GrapeColor::Red => &mut self.red,
            GrapeColor::White => &mut self.white,
        }
    }

    #[must_use]
    pub fn contains(&self, grape: GrapeSpec) -> bool {
        self.ladder(grape.color).is_occupied(grape.value)
    }

    /// All grapes, red first, ascending value.
    #[must_use]
    pub fn grapes(&self) -> Vec<GrapeSpec> {
        self.red
            .values()
            .map(GrapeSpec::red)
            .chain(self.white.values().map(GrapeSpec::white))
            .collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.red.is_empty() && self.white.is_empty()
    }

    #[must_use]
    pub fn aged(&self) -> Self {
        Self {
            red: self.red.aged(),
            white: self.white.aged(),
        }
    }
}

/// Wine ladders.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cellar {
    pub red: TokenLadder,
    pub white: TokenLadder,
    pub blush: TokenLadder,
    pub sparkling: TokenLadder,
}

impl Cellar {
    #[must_use]
    pub fn ladder(&self, color: WineColor) -> &TokenLadder {
        match color {
            WineColor::Red => &self.red,
            WineColor::White => &self.white,
            WineColor::Blush => &self.blush,
            WineColor::Sparkling => &self.sparkling,
        }
    }

    pub fn ladder_mut(&mut self, color: WineColor) -> &mut TokenLadder {
        match color {
            WineColor::Red => &mut self.red,
            WineColor::White => &mut self.white,
            WineColor::Blush => &mut self.blush,
            WineColor::Sparkling => &mut self.sparkling,
        }
    }

    #[must_use]
    pub fn contains(&self, wine: WineSpec) -> bool {
        self.ladder(wine.color).is_occupied(wine.value)
    }

    /// All wines, grouped by color in `WineColor::ALL` order.
    #[must_use]
    pub fn wines(&self) -> Vec<WineSpec> {
        WineColor::ALL
            .iter()
            .flat_map(|&color| self.ladder(color).values().map(move |v| WineSpec::new(color, v)))
            .collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        WineColor::ALL.iter().all(|&c| self.ladder(c).is_empty())
    }

    #[must_use]
    pub fn aged(&self) -> Self {
        Self {
            red: self.red.aged(),
            white: self.white.aged(),
            blush: self.blush.aged(),
            sparkling: self.sparkling.aged(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: bool = true;
    const F: bool = false;

    #[test]
    fn test_place_on_free_slot() {
        let mut ladder = TokenLadder::new();
        assert_eq!(ladder.place(4, 1), Some(4));
        assert!(ladder.is_occupied(4));
        assert_eq!(ladder.count(), 1);
    }

    #[test]
    fn test_place_devalues_downward() {
        let mut ladder = TokenLadder::from_slots([F, F, T, T, F, F, F, F, F]);
        assert_eq!(ladder.place(4, 1), Some(2));
        assert_eq!(ladder.slots(), &[F, T, T, T, F, F, F, F, F]);
    }

    #[test]
    fn test_place_lost_when_everything_below_is_taken() {
        let mut ladder = TokenLadder::from_slots([T, T, T, F, F, F, F, F, F]);
        assert_eq!(ladder.place(3, 1), None);
        assert_eq!(ladder.count(), 3);
    }

    #[test]
    fn test_place_respects_floor() {
        let mut blush = TokenLadder::from_slots([F, F, F, T, F, F, F, F, F]);
        assert_eq!(blush.devalued_value(4, WineColor::Blush.floor()), None);
        assert_eq!(blush.place(5, WineColor::Blush.floor()), Some(5));
        assert_eq!(blush.devalued_value(3, WineColor::Blush.floor()), None);
    }

    #[test]
    fn test_place_caps_at_nine() {
        let mut ladder = TokenLadder::new();
        assert_eq!(ladder.place(12, 1), Some(9));
    }

    #[test]
    fn test_remove() {
        let mut ladder = TokenLadder::from_slots([T, F, F, F, F, F, F, F, F]);
        assert!(ladder.remove(1));
        assert!(!ladder.remove(1));
        assert!(!ladder.remove(0));
        assert!(ladder.is_empty());
    }

    #[test]
    fn test_aging_moves_each_token_up() {
        let ladder = TokenLadder::from_slots([T, F, T, F, F, F, F, F, F]);
        assert_eq!(ladder.aged().slots(), &[F, T, F, T, F, F, F, F, F]);
    }

    #[test]
    fn test_aging_adjacent_tokens() {
        let ladder = TokenLadder::from_slots([T, T, F, F, F, F, F, F, F]);
        assert_eq!(ladder.aged().slots(), &[F, T, T, F, F, F, F, F, F]);
    }

    #[test]
    fn test_aging_stalls_at_the_top() {
        let ladder = TokenLadder::from_slots([F, F, F, F, F, F, F, T, T]);
        assert_eq!(ladder.aged().slots(), &[F, F, F, F, F, F, F, T, T]);
    }

    #[test]
    fn test_crush_pad_and_cellar_listing() {
        let mut pad = CrushPad::default();
        pad.red.place(3, 1);
        pad.white.place(1, 1);
        assert_eq!(pad.grapes(), vec![GrapeSpec::red(3), GrapeSpec::white(1)]);

        let mut cellar = Cellar::default();
        cellar.blush.place(5, 4);
        cellar.red.place(2, 1);
        assert_eq!(
            cellar.wines(),
            vec![WineSpec::new(WineColor::Red, 2), WineSpec::new(WineColor::Blush, 5)]
        );
        assert!(cellar.contains(WineSpec::new(WineColor::Blush, 5)));
    }
}
