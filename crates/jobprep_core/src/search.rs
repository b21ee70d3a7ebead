//! crates/jobprep_core/src/search.rs
//!
//! Job search form validation and the local search history.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const SEARCH_HISTORY_LIMIT: usize = 10;

const PDF_SIGNATURE: &[u8] = b"%PDF";

/// A CV picked by the user.
#[derive(Debug, Clone)]
pub struct CvUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl CvUpload {
    pub fn is_pdf(&self) -> bool {
        self.file_name.to_lowercase().ends_with(".pdf") || self.bytes.starts_with(PDF_SIGNATURE)
    }
}

#[derive(Debug, Clone, Default)]
pub struct JobSearchForm {
    pub position: String,
    pub experience: String,
    pub cv: Option<CvUpload>,
}

/// Per-field messages; any `Some` blocks submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("{}", self.messages().join("; "))]
pub struct SearchFormErrors {
    pub position: Option<String>,
    pub experience: Option<String>,
    pub cv: Option<String>,
}

impl SearchFormErrors {
    pub fn is_empty(&self) -> bool {
        self.position.is_none() && self.experience.is_none() && self.cv.is_none()
    }

    pub fn messages(&self) -> Vec<&str> {
        [&self.position, &self.experience, &self.cv]
            .into_iter()
            .filter_map(|m| m.as_deref())
            .collect()
    }
}

/// A validated search, ready to be executed.
#[derive(Debug, Clone)]
pub enum SearchPlan {
    /// Match against the free-text experience.
    Profile {
        profile_text: String,
        job_keyword: String,
    },
    /// Extract a profile from the CV first, then match.
    Cv {
        upload: CvUpload,
        job_keyword: String,
    },
}

impl SearchPlan {
    pub fn job_keyword(&self) -> &str {
        match self {
            Self::Profile { job_keyword, .. } | Self::Cv { job_keyword, .. } => job_keyword,
        }
    }

    pub fn uses_cv(&self) -> bool {
        matches!(self, Self::Cv { .. })
    }
}

impl JobSearchForm {
    pub fn validate(self) -> Result<SearchPlan, SearchFormErrors> {
        let mut errors = SearchFormErrors::default();
        let position = self.position.trim().to_string();
        let experience = self.experience.trim().to_string();

        if let Some(upload) = &self.cv {
            if !upload.is_pdf() {
                errors.cv = Some("Please upload a PDF file only".to_string());
            }
        } else {
            if position.is_empty() {
                errors.position = Some("Position field cannot be empty".to_string());
            }
            if experience.is_empty() {
                errors.experience = Some("Experience field cannot be empty".to_string());
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(match self.cv {
            Some(upload) => SearchPlan::Cv {
                upload,
                job_keyword: position,
            },
            None => SearchPlan::Profile {
                profile_text: experience,
                job_keyword: position,
            },
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchEntry {
    pub position: String,
    pub used_cv: bool,
    pub result_count: usize,
    pub searched_at: DateTime<Utc>,
}

/// Most recent searches first, capped at `SEARCH_HISTORY_LIMIT`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchHistory {
    entries: VecDeque<SearchEntry>,
}

impl SearchHistory {
    pub fn add(&mut self, entry: SearchEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(SEARCH_HISTORY_LIMIT);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> impl Iterator<Item = &SearchEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
