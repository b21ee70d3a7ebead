//! services/cli/src/app/testing.rs
//!
//! In-memory fakes of the ports, shared by the task tests.

use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jobprep_core::domain::{
    CvAnalysis, Flashcard, FlashcardRequest, FlashcardSet, InterviewSummary, Job, Message,
    SavedInterview, User, UserCredentials,
};
use jobprep_core::ports::{
    ConversationService, CvAnalysisService, DatabaseService, FlashcardService,
    JobMatchingService, PortError, PortResult,
};
use tracing::Level;
use uuid::Uuid;

use crate::adapters::LocalStore;
use crate::app::state::AppState;
use crate::config::Config;

//=========================================================================================
// Fake Store
//=========================================================================================

#[derive(Default)]
pub struct FakeDb {
    users: Mutex<Vec<(User, String)>>,
    sessions: Mutex<HashMap<String, (Uuid, DateTime<Utc>)>>,
    jobs: Mutex<HashMap<String, Job>>,
    interviews: Mutex<Vec<SavedInterview>>,
    pub save_calls: AtomicUsize,
    pub attach_calls: AtomicUsize,
    pub fail_saves: AtomicBool,
}

impl FakeDb {
    pub fn with_job(job: Job) -> Self {
        let db = Self::default();
        db.jobs.lock().unwrap().insert(job.id.clone(), job);
        db
    }

    pub fn interviews(&self) -> Vec<SavedInterview> {
        self.interviews.lock().unwrap().clone()
    }

    pub fn insert_interview(&self, interview: SavedInterview) {
        self.interviews.lock().unwrap().push(interview);
    }

    pub fn job(&self, id: &str) -> Option<Job> {
        self.jobs.lock().unwrap().get(id).cloned()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }

    /// Registers a user with a live session and returns both.
    pub fn logged_in_user(&self) -> (Uuid, String) {
        let user_id = Uuid::new_v4();
        let token = Uuid::new_v4().to_string();
        self.users.lock().unwrap().push((
            User {
                user_id,
                email: format!("{user_id}@example.com"),
                username: "tester".into(),
                created_at: Utc::now(),
            },
            String::new(),
        ));
        self.sessions
            .lock()
            .unwrap()
            .insert(token.clone(), (user_id, Utc::now() + chrono::Duration::days(1)));
        (user_id, token)
    }
}

#[async_trait]
impl DatabaseService for FakeDb {
    async fn create_user_with_email(
        &self,
        email: &str,
        username: &str,
        hashed_password: &str,
    ) -> PortResult<User> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|(u, _)| u.email == email) {
            return Err(PortError::Conflict(
                "An account with this email already exists".into(),
            ));
        }
        let user = User {
            user_id: Uuid::new_v4(),
            email: email.to_string(),
            username: username.to_string(),
            created_at: Utc::now(),
        };
        users.push((user.clone(), hashed_password.to_string()));
        Ok(user)
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|(u, _)| u.email == email)
            .map(|(u, hash)| UserCredentials {
                user_id: u.user_id,
                email: u.email.clone(),
                hashed_password: hash.clone(),
            })
            .ok_or_else(|| PortError::NotFound(email.to_string()))
    }

    async fn get_user(&self, user_id: Uuid) -> PortResult<User> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|(u, _)| u.user_id == user_id)
            .map(|(u, _)| u.clone())
            .ok_or_else(|| PortError::NotFound(user_id.to_string()))
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        self.sessions
            .lock()
            .unwrap()
            .insert(session_id.to_string(), (user_id, expires_at));
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        match self.sessions.lock().unwrap().get(session_id) {
            Some((user_id, expires_at)) if *expires_at > Utc::now() => Ok(*user_id),
            _ => Err(PortError::Unauthorized),
        }
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        self.sessions.lock().unwrap().remove(session_id);
        Ok(())
    }

    async fn get_job_by_id(&self, job_id: &str) -> PortResult<Job> {
        self.job(job_id)
            .ok_or_else(|| PortError::NotFound(job_id.to_string()))
    }

    async fn upsert_job(&self, job: &Job) -> PortResult<()> {
        self.jobs.lock().unwrap().insert(job.id.clone(), job.clone());
        Ok(())
    }

    async fn save_interview(&self, interview: &SavedInterview) -> PortResult<String> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(PortError::Unexpected("store offline".into()));
        }
        self.interviews.lock().unwrap().push(interview.clone());
        Ok(interview.id.clone())
    }

    async fn get_interviews_for_user(&self, user_id: Uuid) -> PortResult<Vec<SavedInterview>> {
        let mut found: Vec<SavedInterview> = self
            .interviews()
            .into_iter()
            .filter(|i| i.user_id == user_id)
            .collect();
        found.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(found)
    }

    async fn get_interview(
        &self,
        user_id: Uuid,
        interview_id: &str,
    ) -> PortResult<SavedInterview> {
        self.interviews()
            .into_iter()
            .find(|i| i.user_id == user_id && i.id == interview_id)
            .ok_or_else(|| PortError::NotFound(interview_id.to_string()))
    }

    async fn attach_flashcard_set(
        &self,
        user_id: Uuid,
        interview_id: &str,
        flashcard_set: &FlashcardSet,
    ) -> PortResult<()> {
        self.attach_calls.fetch_add(1, Ordering::SeqCst);
        let mut interviews = self.interviews.lock().unwrap();
        let interview = interviews
            .iter_mut()
            .find(|i| i.user_id == user_id && i.id == interview_id)
            .ok_or_else(|| PortError::NotFound(interview_id.to_string()))?;
        interview.summary.flashcard_set = Some(flashcard_set.clone());
        Ok(())
    }
}

//=========================================================================================
// Fake Backend
//=========================================================================================

/// Scripted conversation replies; an `Err` entry simulates a failed call.
#[derive(Default)]
pub struct FakeBackend {
    replies: Mutex<VecDeque<Result<Message, String>>>,
    pub sent: Mutex<Vec<Vec<Message>>>,
    pub matches: Mutex<Vec<Job>>,
    pub match_calls: Mutex<Vec<(String, String)>>,
    pub cv: Mutex<Option<CvAnalysis>>,
    pub cv_calls: AtomicUsize,
    pub flashcard_set: Mutex<Option<FlashcardSet>>,
    pub flashcard_calls: AtomicUsize,
}

impl FakeBackend {
    pub fn scripted(replies: Vec<Result<Message, String>>) -> Self {
        let backend = Self::default();
        *backend.replies.lock().unwrap() = replies.into();
        backend
    }

    pub fn sent(&self) -> Vec<Vec<Message>> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ConversationService for FakeBackend {
    async fn next_message(&self, _job: &Job, transcript: &[Message]) -> PortResult<Message> {
        self.sent.lock().unwrap().push(transcript.to_vec());
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(message)) => Ok(message),
            Some(Err(e)) => Err(PortError::Transport(e)),
            None => Err(PortError::Transport("no scripted reply".into())),
        }
    }
}

#[async_trait]
impl JobMatchingService for FakeBackend {
    async fn match_jobs(&self, profile_text: &str, job_keyword: &str) -> PortResult<Vec<Job>> {
        self.match_calls
            .lock()
            .unwrap()
            .push((profile_text.to_string(), job_keyword.to_string()));
        Ok(self.matches.lock().unwrap().clone())
    }
}

#[async_trait]
impl CvAnalysisService for FakeBackend {
    async fn analyze_cv(
        &self,
        _file_name: &str,
        _pdf: &[u8],
        _job_keyword: &str,
    ) -> PortResult<CvAnalysis> {
        self.cv_calls.fetch_add(1, Ordering::SeqCst);
        self.cv
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| PortError::Unexpected("PDF extraction error".into()))
    }
}

#[async_trait]
impl FlashcardService for FakeBackend {
    async fn generate_flashcards(&self, _request: &FlashcardRequest) -> PortResult<FlashcardSet> {
        self.flashcard_calls.fetch_add(1, Ordering::SeqCst);
        self.flashcard_set
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| PortError::Transport("flashcards offline".into()))
    }
}

//=========================================================================================
// Builders
//=========================================================================================

pub fn app_state(home: &Path, db: Arc<FakeDb>, backend: Arc<FakeBackend>) -> AppState {
    let config = Config {
        database_url: "postgres://unused".into(),
        backend_url: "http://localhost:5000".into(),
        log_level: Level::WARN,
        http_timeout: Duration::from_secs(5),
        auto_save_delay: Duration::from_millis(20),
        home_dir: home.to_path_buf(),
    };
    AppState {
        db,
        config: Arc::new(config),
        conversation: backend.clone(),
        matcher: backend.clone(),
        cv_analyzer: backend.clone(),
        flashcards: backend,
        local: Arc::new(LocalStore::new(home)),
    }
}

pub fn job() -> Job {
    Job {
        id: "job-7".into(),
        title: "Backend Engineer".into(),
        company: "Acme".into(),
        location: "Remote".into(),
        salary_range: "$100k".into(),
        employment_type: "Full-time".into(),
        description: "Build services".into(),
        required_skills: vec!["Rust".into(), "SQL".into()],
    }
}

pub fn summary(rating: u8) -> InterviewSummary {
    InterviewSummary {
        passed: rating >= 60,
        rating,
        improvements: vec!["Use concrete examples".into()],
        summary: "Solid fundamentals".into(),
        learning_roadmap: None,
        flashcard_set: None,
    }
}

pub fn closing(rating: u8) -> Message {
    Message {
        id: "closing".into(),
        text: "Thanks, that's all.".into(),
        is_user: false,
        end_summary: Some(summary(rating)),
    }
}

pub fn flashcard_set() -> FlashcardSet {
    FlashcardSet {
        id: "set-1".into(),
        title: "Backend review".into(),
        description: "Key topics".into(),
        cards: vec![
            Flashcard {
                id: "1".into(),
                front: "What is a mutex?".into(),
                back: "A lock".into(),
            },
            Flashcard {
                id: "2".into(),
                front: "What is SQL?".into(),
                back: "A query language".into(),
            },
        ],
    }
}
