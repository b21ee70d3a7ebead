//! crates/jobprep_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, keeping the
//! state machines independent of the HTTP backend and the document store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    CvAnalysis, FlashcardRequest, FlashcardSet, Job, Message, SavedInterview, User,
    UserCredentials,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
    /// The write clashes with an existing record; the message is user-facing.
    #[error("{0}")]
    Conflict(String),
    #[error("Network error: {0}")]
    Transport(String),
    #[error("Invalid response from backend: {0}")]
    InvalidResponse(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- User Management ---
    async fn create_user_with_email(
        &self,
        email: &str,
        username: &str,
        hashed_password: &str,
    ) -> PortResult<User>;

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials>;

    async fn get_user(&self, user_id: Uuid) -> PortResult<User>;

    // --- Auth Methods ---
    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid>;

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()>;

    // --- Jobs ---
    async fn get_job_by_id(&self, job_id: &str) -> PortResult<Job>;

    async fn upsert_job(&self, job: &Job) -> PortResult<()>;

    // --- Interviews ---
    async fn save_interview(&self, interview: &SavedInterview) -> PortResult<String>;

    async fn get_interviews_for_user(&self, user_id: Uuid) -> PortResult<Vec<SavedInterview>>;

    async fn get_interview(&self, user_id: Uuid, interview_id: &str)
        -> PortResult<SavedInterview>;

    async fn attach_flashcard_set(
        &self,
        user_id: Uuid,
        interview_id: &str,
        flashcard_set: &FlashcardSet,
    ) -> PortResult<()>;
}

#[async_trait]
pub trait ConversationService: Send + Sync {
    /// Sends the whole transcript and returns the interviewer's next message.
    /// An empty transcript asks for the opening greeting.
    async fn next_message(&self, job: &Job, transcript: &[Message]) -> PortResult<Message>;
}

#[async_trait]
pub trait JobMatchingService: Send + Sync {
    async fn match_jobs(&self, profile_text: &str, job_keyword: &str) -> PortResult<Vec<Job>>;
}

#[async_trait]
pub trait CvAnalysisService: Send + Sync {
    /// Extracts profile text from a PDF CV.
    async fn analyze_cv(
        &self,
        file_name: &str,
        pdf: &[u8],
        job_keyword: &str,
    ) -> PortResult<CvAnalysis>;
}

#[async_trait]
pub trait FlashcardService: Send + Sync {
    async fn generate_flashcards(&self, request: &FlashcardRequest) -> PortResult<FlashcardSet>;
}
