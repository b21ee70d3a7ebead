//! crates/jobprep_core/src/summary.rs
//!
//! Presentation rules for a finished interview and the summary/flashcards view
//! toggle, including the one-time flashcard fetch.

use uuid::Uuid;

use crate::domain::{FlashcardRequest, FlashcardSet, InterviewSummary};

/// Colour band of the rating bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingBand {
    PassedHigh,
    Passed,
    Borderline,
    Weak,
    Failing,
}

impl RatingBand {
    pub fn from_rating(rating: u8) -> Self {
        match rating {
            80.. => Self::PassedHigh,
            60..=79 => Self::Passed,
            40..=59 => Self::Borderline,
            20..=39 => Self::Weak,
            _ => Self::Failing,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::PassedHigh => "passed-high",
            Self::Passed => "passed",
            Self::Borderline => "borderline",
            Self::Weak => "weak",
            Self::Failing => "failing",
        }
    }
}

pub fn badge(passed: bool) -> &'static str {
    if passed {
        "Passed"
    } else {
        "Needs Improvement"
    }
}

/// Filled cells of a rating bar `width` cells wide.
pub fn bar_fill(rating: u8, width: usize) -> usize {
    (usize::from(rating.min(100)) * width + 50) / 100
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Summary,
    Flashcards,
}

/// What the caller must do after asking to toggle the view.
#[derive(Debug, Clone, PartialEq)]
pub enum ToggleAction {
    /// Switched back to the summary.
    ShowSummary,
    /// Switched to flashcards using the set already attached.
    ShowCached,
    /// No set yet: fetch one with this request, then call `finish_fetch`.
    Fetch(FlashcardRequest),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ToggleRejected {
    #[error("Flashcards are already loading")]
    Loading,
}

/// Owns a summary and the view state around it.
#[derive(Debug, Clone)]
pub struct SummaryView {
    summary: InterviewSummary,
    mode: ViewMode,
    loading: bool,
    error: Option<String>,
}

impl SummaryView {
    pub fn new(summary: InterviewSummary) -> Self {
        Self {
            summary,
            mode: ViewMode::Summary,
            loading: false,
            error: None,
        }
    }

    pub fn summary(&self) -> &InterviewSummary {
        &self.summary
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn flashcards(&self) -> Option<&FlashcardSet> {
        self.summary.flashcard_set.as_ref()
    }

    pub fn toggle(&mut self, user_id: Option<Uuid>) -> Result<ToggleAction, ToggleRejected> {
        if self.loading {
            return Err(ToggleRejected::Loading);
        }
        if self.mode == ViewMode::Flashcards {
            self.mode = ViewMode::Summary;
            return Ok(ToggleAction::ShowSummary);
        }
        if self.summary.flashcard_set.is_some() {
            self.mode = ViewMode::Flashcards;
            return Ok(ToggleAction::ShowCached);
        }
        self.loading = true;
        self.error = None;
        Ok(ToggleAction::Fetch(FlashcardRequest::from_summary(
            &self.summary,
            user_id,
        )))
    }

    /// Applies the outcome of the fetch requested by `toggle`.
    pub fn finish_fetch(&mut self, result: Result<FlashcardSet, String>) {
        self.loading = false;
        match result {
            Ok(set) => {
                self.summary.flashcard_set = Some(set);
                self.mode = ViewMode::Flashcards;
            }
            Err(reason) => {
                self.error = Some(format!("Failed to load flashcards: {reason}"));
                self.mode = ViewMode::Summary;
            }
        }
    }

    pub fn into_summary(self) -> InterviewSummary {
        self.summary
    }
}
