//! services/cli/src/app/interview_task.rs
//!
//! Drives one interview: loads the job, fetches the greeting, then relays each
//! answer to the conversation backend until the interviewer ends the session.

use std::time::Instant;

use jobprep_core::domain::Message;
use jobprep_core::session::{InterviewSession, Phase, SessionError, TurnOutcome};
use tokio::io::AsyncRead;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::app::console::Console;
use crate::app::render;
use crate::app::state::AppState;
use crate::app::summary_task::{self, SummaryController};
use crate::error::ClientError;

const QUIT_COMMAND: &str = "/quit";

pub struct InterviewRunner {
    state: AppState,
    session: InterviewSession,
}

impl InterviewRunner {
    pub fn new(state: AppState, session: InterviewSession) -> Self {
        Self { state, session }
    }

    pub fn session(&self) -> &InterviewSession {
        &self.session
    }

    pub fn into_session(self) -> InterviewSession {
        self.session
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.session.transcript().last()
    }

    /// Resolves the job if needed and appends the opening message.
    pub async fn start(&mut self) -> Result<TurnOutcome, SessionError> {
        if let Phase::LoadingJob { job_id } = self.session.phase() {
            let job_id = job_id.clone();
            info!("Loading job {}", job_id);
            let result = self.state.db.get_job_by_id(&job_id).await;
            if let Err(e) = &result {
                error!("Failed to load job {}: {:?}", job_id, e);
            }
            self.session.apply_job(result)?;
        }

        let result = {
            let job = self.session.job().ok_or(SessionError::NotReady)?;
            self.state.conversation.next_message(job, &[]).await
        };
        if let Err(e) = &result {
            warn!("Greeting failed, using the local fallback: {}", e);
        }
        self.session.apply_greeting(result)
    }

    /// Submits one answer and applies the interviewer's reply.
    pub async fn answer(&mut self, input: &str) -> Result<TurnOutcome, SessionError> {
        let transcript = self.session.submit(input)?;

        let start_time = Instant::now();
        let result = {
            let job = self.session.job().ok_or(SessionError::NotReady)?;
            self.state.conversation.next_message(job, &transcript).await
        };
        match &result {
            Ok(_) => info!("Conversation turn took {:?}", start_time.elapsed()),
            Err(e) => warn!("Conversation turn failed: {}", e),
        }
        self.session.apply_reply(result)
    }
}

/// The interactive loop behind `jobprep interview`.
pub async fn run_interview<R: AsyncRead + Unpin>(
    state: AppState,
    session: InterviewSession,
    user_id: Option<Uuid>,
    console: &mut Console<R>,
) -> Result<(), ClientError> {
    let mut runner = InterviewRunner::new(state.clone(), session);

    let mut outcome = runner.start().await.map_err(|e| ClientError::Internal(e.to_string()))?;
    if let Some(job) = runner.session().job() {
        println!("Interview: {} at {}", job.title, job.company);
        println!("Type your answers; {QUIT_COMMAND} leaves the interview.\n");
    }
    if let Some(message) = runner.last_message() {
        println!("{}\n", render::message(message));
    }

    while outcome != TurnOutcome::Ended {
        let Some(line) = console.prompt("> ").await? else {
            break;
        };
        if line.trim() == QUIT_COMMAND {
            println!("Interview left before it finished; nothing was saved.");
            return Ok(());
        }
        match runner.answer(&line).await {
            Ok(next) => {
                outcome = next;
                if let Some(message) = runner.last_message() {
                    println!("\n{}\n", render::message(message));
                }
            }
            Err(SessionError::EmptyInput) => continue,
            Err(e) => {
                println!("{e}");
                break;
            }
        }
    }

    if !runner.session().is_ended() {
        return Ok(());
    }
    let controller = SummaryController::from_session(state, runner.into_session(), user_id)
        .map_err(|e| ClientError::Internal(e.to_string()))?;
    summary_task::run_summary(controller, console).await
}
