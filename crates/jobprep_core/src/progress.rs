//! crates/jobprep_core/src/progress.rs
//!
//! Rating history across saved interviews.

use chrono::{DateTime, Utc};

use crate::domain::SavedInterview;

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressPoint {
    /// 1-based, oldest session first.
    pub session: usize,
    pub date: DateTime<Utc>,
    pub score: u8,
    /// Mean of all scores up to and including this session.
    pub average: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressReport {
    pub points: Vec<ProgressPoint>,
    pub passed: usize,
    pub best: Option<u8>,
    pub latest: Option<u8>,
}

impl ProgressReport {
    pub fn from_interviews(interviews: &[SavedInterview]) -> Self {
        let mut ordered: Vec<&SavedInterview> = interviews.iter().collect();
        ordered.sort_by_key(|interview| interview.date);

        let mut running_total = 0u32;
        let points: Vec<ProgressPoint> = ordered
            .iter()
            .enumerate()
            .map(|(i, interview)| {
                running_total += u32::from(interview.summary.rating);
                ProgressPoint {
                    session: i + 1,
                    date: interview.date,
                    score: interview.summary.rating,
                    average: f64::from(running_total) / (i + 1) as f64,
                }
            })
            .collect();

        Self {
            passed: ordered.iter().filter(|i| i.summary.passed).count(),
            best: points.iter().map(|p| p.score).max(),
            latest: points.last().map(|p| p.score),
            points,
        }
    }

    pub fn sessions(&self) -> usize {
        self.points.len()
    }

    /// Share of passed sessions in percent, `None` without sessions.
    pub fn pass_rate(&self) -> Option<f64> {
        if self.points.is_empty() {
            None
        } else {
            Some(self.passed as f64 * 100.0 / self.points.len() as f64)
        }
    }

    /// One trend per pair of consecutive sessions, following the running average.
    pub fn segments(&self) -> Vec<Trend> {
        self.points
            .windows(2)
            .map(|pair| {
                if pair[1].average >= pair[0].average {
                    Trend::Up
                } else {
                    Trend::Down
                }
            })
            .collect()
    }
}
