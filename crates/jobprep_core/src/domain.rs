//! crates/jobprep_core/src/domain.rs
//!
//! Defines the core data structures for the application.
//! These are the validated shapes; raw backend payloads are parsed into them
//! by the adapters before they reach any state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A job posting returned by the matcher and cached in the `jobs` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub title: String,
    pub company: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub salary_range: String,
    #[serde(default)]
    pub employment_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required_skills: Vec<String>,
}

/// One entry of an interview transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    #[serde(rename = "message")]
    pub text: String,
    pub is_user: bool,
    /// Only the terminal message of a session carries a summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_summary: Option<InterviewSummary>,
}

impl Message {
    /// Creates a candidate turn with a fresh id.
    pub fn from_user(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
            is_user: true,
            end_summary: None,
        }
    }

    /// Creates an interviewer turn that does not end the session.
    pub fn from_assistant(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            is_user: false,
            end_summary: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.end_summary.is_some()
    }
}

/// The structured result of a finished interview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewSummary {
    pub passed: bool,
    /// Always within 0..=100.
    pub rating: u8,
    #[serde(default)]
    pub improvements: Vec<String>,
    #[serde(default)]
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learning_roadmap: Option<LearningRoadmap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flashcard_set: Option<FlashcardSet>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningRoadmap {
    #[serde(default)]
    pub key_areas: Vec<String>,
    #[serde(default)]
    pub resources: Vec<LearningResource>,
    #[serde(default)]
    pub suggested_timeline: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningResource {
    pub title: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub difficulty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlashcardSet {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub cards: Vec<Flashcard>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flashcard {
    pub id: String,
    pub front: String,
    pub back: String,
}

/// Payload sent to the flashcard generator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlashcardRequest {
    pub summary: String,
    pub improvements: Vec<String>,
    pub passed: bool,
    pub rating: u8,
    pub user_id: String,
}

impl FlashcardRequest {
    /// Builds the request from a summary; logged-out users are sent as `anonymous`.
    pub fn from_summary(summary: &InterviewSummary, user_id: Option<Uuid>) -> Self {
        Self {
            summary: summary.summary.clone(),
            improvements: summary.improvements.clone(),
            passed: summary.passed,
            rating: summary.rating,
            user_id: user_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "anonymous".to_string()),
        }
    }
}

/// A completed session, stored per user in the `interviews` table.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedInterview {
    pub id: String,
    pub user_id: Uuid,
    pub job_id: String,
    pub job_title: String,
    pub company: String,
    pub date: DateTime<Utc>,
    pub summary: InterviewSummary,
    pub messages: Vec<Message>,
}

impl SavedInterview {
    /// Assembles the record for a finished session. Ids follow `interview_<millis>`.
    pub fn new(
        user_id: Uuid,
        job: &Job,
        messages: Vec<Message>,
        summary: InterviewSummary,
        date: DateTime<Utc>,
    ) -> Self {
        let or_unknown = |value: &str, fallback: &str| {
            if value.trim().is_empty() {
                fallback.to_string()
            } else {
                value.to_string()
            }
        };
        Self {
            id: format!("interview_{}", date.timestamp_millis()),
            user_id,
            job_id: or_unknown(&job.id, "unknown"),
            job_title: or_unknown(&job.title, "Unknown Position"),
            company: or_unknown(&job.company, "Unknown Company"),
            date,
            summary,
            messages,
        }
    }
}

// Represents a user - used throughout app
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub user_id: Uuid,
    pub email: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

// Only used internally for login - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user_id: Uuid,
    pub email: String,
    pub hashed_password: String,
}

// Represents a login session persisted between CLI invocations
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub id: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

/// Profile text derived from an uploaded CV.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CvAnalysis {
    pub user_summary: Option<String>,
    pub text: String,
}

impl CvAnalysis {
    /// The text sent to the matcher: the AI summary when present, else the raw text.
    pub fn profile_text(&self) -> String {
        match &self.user_summary {
            Some(summary) if !summary.trim().is_empty() => summary.clone(),
            _ => self.text.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn job() -> Job {
        Job {
            id: "job-1".into(),
            title: "Backend Engineer".into(),
            company: "Acme".into(),
            location: "Remote".into(),
            salary_range: String::new(),
            employment_type: "Full-time".into(),
            description: String::new(),
            required_skills: vec!["Rust".into()],
        }
    }

    fn summary() -> InterviewSummary {
        InterviewSummary {
            passed: true,
            rating: 85,
            improvements: vec![],
            summary: "Solid".into(),
            learning_roadmap: None,
            flashcard_set: None,
        }
    }

    #[test]
    fn message_uses_backend_field_names() {
        let msg = Message::from_assistant("x", "Q2");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": "x", "message": "Q2", "isUser": false})
        );
    }

    #[test]
    fn saved_interview_id_is_derived_from_date() {
        let date = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let saved = SavedInterview::new(Uuid::new_v4(), &job(), vec![], summary(), date);
        assert_eq!(saved.id, format!("interview_{}", date.timestamp_millis()));
        assert_eq!(saved.job_title, "Backend Engineer");
    }

    #[test]
    fn saved_interview_fills_missing_job_fields() {
        let mut blank = job();
        blank.id.clear();
        blank.company = "  ".into();
        let saved = SavedInterview::new(Uuid::new_v4(), &blank, vec![], summary(), Utc::now());
        assert_eq!(saved.job_id, "unknown");
        assert_eq!(saved.company, "Unknown Company");
    }

    #[test]
    fn flashcard_request_defaults_to_anonymous() {
        let request = FlashcardRequest::from_summary(&summary(), None);
        assert_eq!(request.user_id, "anonymous");
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("userId").is_some());
    }

    #[test]
    fn cv_profile_prefers_summary() {
        let analysis = CvAnalysis {
            user_summary: Some("Senior dev".into()),
            text: "raw".into(),
        };
        assert_eq!(analysis.profile_text(), "Senior dev");
        let raw_only = CvAnalysis {
            user_summary: Some(" ".into()),
            text: "raw".into(),
        };
        assert_eq!(raw_only.profile_text(), "raw");
    }
}
