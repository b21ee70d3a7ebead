//! services/cli/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jobprep_core::domain::{
    FlashcardSet, InterviewSummary, Job, Message, SavedInterview, User, UserCredentials,
};
use jobprep_core::ports::{DatabaseService, PortError, PortResult};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tracing::debug;
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    user_id: Uuid,
    email: String,
    username: String,
    created_at: DateTime<Utc>,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            user_id: self.user_id,
            email: self.email,
            username: self.username,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct CredentialsRecord {
    user_id: Uuid,
    email: String,
    hashed_password: String,
}

#[derive(FromRow)]
struct JobRecord {
    id: String,
    title: String,
    company: String,
    location: String,
    salary_range: String,
    employment_type: String,
    description: String,
    required_skills: Json<Vec<String>>,
}
impl JobRecord {
    fn to_domain(self) -> Job {
        Job {
            id: self.id,
            title: self.title,
            company: self.company,
            location: self.location,
            salary_range: self.salary_range,
            employment_type: self.employment_type,
            description: self.description,
            required_skills: self.required_skills.0,
        }
    }
}

#[derive(FromRow)]
struct InterviewRecord {
    id: String,
    user_id: Uuid,
    job_id: String,
    job_title: String,
    company: String,
    date: DateTime<Utc>,
    summary: Json<InterviewSummary>,
    messages: Json<Vec<Message>>,
}
impl InterviewRecord {
    fn to_domain(self) -> SavedInterview {
        SavedInterview {
            id: self.id,
            user_id: self.user_id,
            job_id: self.job_id,
            job_title: self.job_title,
            company: self.company,
            date: self.date,
            summary: self.summary.0,
            messages: self.messages.0,
        }
    }
}

const INTERVIEW_COLUMNS: &str =
    "id, user_id, job_id, job_title, company, date, summary, messages";

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn create_user_with_email(
        &self,
        email: &str,
        username: &str,
        hashed_password: &str,
    ) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (user_id, email, username, hashed_password) VALUES ($1, $2, $3, $4) \
             RETURNING user_id, email, username, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(username)
        .bind(hashed_password)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                PortError::Conflict("An account with this email already exists".to_string())
            }
            _ => unexpected(e),
        })?;
        Ok(record.to_domain())
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let record = sqlx::query_as::<_, CredentialsRecord>(
            "SELECT user_id, email, hashed_password FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound(format!("User {} not found", email)),
            _ => unexpected(e),
        })?;
        Ok(UserCredentials {
            user_id: record.user_id,
            email: record.email,
            hashed_password: record.hashed_password,
        })
    }

    async fn get_user(&self, user_id: Uuid) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT user_id, email, username, created_at FROM users WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound(format!("User {} not found", user_id)),
            _ => unexpected(e),
        })?;
        Ok(record.to_domain())
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query("INSERT INTO auth_sessions (id, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(session_id)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        let (user_id,) = sqlx::query_as::<_, (Uuid,)>(
            "SELECT user_id FROM auth_sessions WHERE id = $1 AND expires_at > now()",
        )
        .bind(session_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::Unauthorized,
            _ => unexpected(e),
        })?;
        Ok(user_id)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn get_job_by_id(&self, job_id: &str) -> PortResult<Job> {
        let record = sqlx::query_as::<_, JobRecord>(
            "SELECT id, title, company, location, salary_range, employment_type, description, \
             required_skills FROM jobs WHERE id = $1",
        )
        .bind(job_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound(format!("Job {} not found", job_id)),
            _ => unexpected(e),
        })?;
        Ok(record.to_domain())
    }

    async fn upsert_job(&self, job: &Job) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO jobs (id, title, company, location, salary_range, employment_type, \
             description, required_skills) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             ON CONFLICT (id) DO UPDATE SET title = EXCLUDED.title, company = EXCLUDED.company, \
             location = EXCLUDED.location, salary_range = EXCLUDED.salary_range, \
             employment_type = EXCLUDED.employment_type, description = EXCLUDED.description, \
             required_skills = EXCLUDED.required_skills, updated_at = now()",
        )
        .bind(&job.id)
        .bind(&job.title)
        .bind(&job.company)
        .bind(&job.location)
        .bind(&job.salary_range)
        .bind(&job.employment_type)
        .bind(&job.description)
        .bind(Json(&job.required_skills))
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn save_interview(&self, interview: &SavedInterview) -> PortResult<String> {
        debug!("Saving interview {} for user {}", interview.id, interview.user_id);
        let (id,) = sqlx::query_as::<_, (String,)>(
            "INSERT INTO interviews (id, user_id, job_id, job_title, company, date, summary, messages) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING id",
        )
        .bind(&interview.id)
        .bind(interview.user_id)
        .bind(&interview.job_id)
        .bind(&interview.job_title)
        .bind(&interview.company)
        .bind(interview.date)
        .bind(Json(&interview.summary))
        .bind(Json(&interview.messages))
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(id)
    }

    async fn get_interviews_for_user(&self, user_id: Uuid) -> PortResult<Vec<SavedInterview>> {
        let records = sqlx::query_as::<_, InterviewRecord>(&format!(
            "SELECT {INTERVIEW_COLUMNS} FROM interviews WHERE user_id = $1 ORDER BY date DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        let interviews = records.into_iter().map(|r| r.to_domain()).collect();
        Ok(interviews)
    }

    async fn get_interview(
        &self,
        user_id: Uuid,
        interview_id: &str,
    ) -> PortResult<SavedInterview> {
        let record = sqlx::query_as::<_, InterviewRecord>(&format!(
            "SELECT {INTERVIEW_COLUMNS} FROM interviews WHERE user_id = $1 AND id = $2"
        ))
        .bind(user_id)
        .bind(interview_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => {
                PortError::NotFound(format!("Interview {} not found", interview_id))
            }
            _ => unexpected(e),
        })?;
        Ok(record.to_domain())
    }

    async fn attach_flashcard_set(
        &self,
        user_id: Uuid,
        interview_id: &str,
        flashcard_set: &FlashcardSet,
    ) -> PortResult<()> {
        let result = sqlx::query(
            "UPDATE interviews SET summary = jsonb_set(summary, '{flashcard_set}', $3) \
             WHERE user_id = $1 AND id = $2",
        )
        .bind(user_id)
        .bind(interview_id)
        .bind(Json(flashcard_set))
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!(
                "Interview {} not found",
                interview_id
            )));
        }
        Ok(())
    }
}
