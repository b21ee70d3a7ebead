//! crates/jobprep_core/src/review.rs
//!
//! Client-side flashcard review: a cursor over a fixed deck with per-card
//! confidence marks. Nothing here is persisted.

use std::fmt;
use std::str::FromStr;

use crate::domain::{Flashcard, FlashcardSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl FromStr for Confidence {
    type Err = ReviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" | "l" => Ok(Self::Low),
            "medium" | "m" => Ok(Self::Medium),
            "high" | "h" => Ok(Self::High),
            other => Err(ReviewError::UnknownConfidence(other.to_string())),
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        };
        f.write_str(label)
    }
}

/// What the user can currently see of a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardState {
    Unseen,
    Flipped,
    Marked(Confidence),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReviewError {
    #[error("This flashcard set has no cards")]
    EmptySet,
    #[error("Flip the card before rating your confidence")]
    NotFlipped,
    #[error("The review is finished; restart to study again")]
    Finished,
    #[error("Unknown confidence level '{0}', use low, medium or high")]
    UnknownConfidence(String),
}

/// End-of-deck counts. `high + medium + low + skipped == total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfidenceTally {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub skipped: usize,
    pub total: usize,
}

#[derive(Debug, Clone)]
pub struct FlashcardReview {
    title: String,
    cards: Vec<Flashcard>,
    marks: Vec<Option<Confidence>>,
    cursor: usize,
    flipped: bool,
    finished: bool,
}

impl FlashcardReview {
    pub fn new(set: &FlashcardSet) -> Result<Self, ReviewError> {
        if set.cards.is_empty() {
            return Err(ReviewError::EmptySet);
        }
        Ok(Self {
            title: set.title.clone(),
            cards: set.cards.clone(),
            marks: vec![None; set.cards.len()],
            cursor: 0,
            flipped: false,
            finished: false,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn position(&self) -> (usize, usize) {
        (self.cursor + 1, self.cards.len())
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    /// The card under the cursor, or `None` once the deck is finished.
    pub fn current(&self) -> Option<&Flashcard> {
        if self.finished {
            None
        } else {
            self.cards.get(self.cursor)
        }
    }

    pub fn card_state(&self, index: usize) -> Option<CardState> {
        let mark = *self.marks.get(index)?;
        Some(match mark {
            Some(level) => CardState::Marked(level),
            None if index == self.cursor && self.flipped && !self.finished => CardState::Flipped,
            None => CardState::Unseen,
        })
    }

    pub fn flip(&mut self) -> Result<(), ReviewError> {
        if self.finished {
            return Err(ReviewError::Finished);
        }
        self.flipped = !self.flipped;
        Ok(())
    }

    /// Rates the current card and moves on.
    pub fn mark(&mut self, level: Confidence) -> Result<(), ReviewError> {
        if self.finished {
            return Err(ReviewError::Finished);
        }
        if !self.flipped {
            return Err(ReviewError::NotFlipped);
        }
        self.marks[self.cursor] = Some(level);
        self.advance();
        Ok(())
    }

    /// Moves on without rating; the card counts as skipped unless marked earlier.
    pub fn next(&mut self) -> Result<(), ReviewError> {
        if self.finished {
            return Err(ReviewError::Finished);
        }
        self.advance();
        Ok(())
    }

    pub fn previous(&mut self) -> Result<(), ReviewError> {
        if self.finished {
            return Err(ReviewError::Finished);
        }
        if self.cursor > 0 {
            self.cursor -= 1;
            self.flipped = false;
        }
        Ok(())
    }

    pub fn restart(&mut self) {
        self.cursor = 0;
        self.flipped = false;
        self.finished = false;
        self.marks.iter_mut().for_each(|mark| *mark = None);
    }

    pub fn tally(&self) -> ConfidenceTally {
        let count = |level: Confidence| {
            self.marks
                .iter()
                .filter(|mark| **mark == Some(level))
                .count()
        };
        let (high, medium, low) = (
            count(Confidence::High),
            count(Confidence::Medium),
            count(Confidence::Low),
        );
        let total = self.cards.len();
        ConfidenceTally {
            high,
            medium,
            low,
            skipped: total - (high + medium + low),
            total,
        }
    }

    fn advance(&mut self) {
        if self.cursor + 1 < self.cards.len() {
            self.cursor += 1;
            self.flipped = false;
        } else {
            self.finished = true;
        }
    }
}
