//! crates/jobprep_core/src/session.rs
//!
//! The interview session state machine. It owns the transcript and decides what
//! may be sent to the conversation backend; the caller performs the remote call
//! and feeds the result back in.

use crate::domain::{InterviewSummary, Job, Message};
use crate::ports::{PortError, PortResult};

/// Appended as the interviewer's turn when the backend cannot be reached.
pub const APOLOGY_MESSAGE: &str =
    "I'm sorry, I'm having trouble responding right now. Could you please repeat your answer or try again in a moment?";

/// The current phase of an interview session.
#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    /// Waiting for the job to be fetched from the store.
    LoadingJob { job_id: String },
    /// Job resolved, the opening message has not arrived yet.
    GreetingPending,
    AwaitingUserInput,
    AwaitingAssistantResponse,
    Ended { summary: InterviewSummary },
    /// The job could not be loaded; the session never started.
    JobUnavailable { reason: String },
}

/// Why a submission or transition was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("The interview has not started yet")]
    NotReady,
    #[error("Still waiting for the interviewer to respond")]
    Busy,
    #[error("The interview has ended")]
    Ended,
    #[error("Your answer is empty")]
    EmptyInput,
    #[error("The job for this interview is unavailable: {0}")]
    JobUnavailable(String),
}

/// What happened to a turn after the backend result was applied.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    /// A regular interviewer message; input is open again.
    Continued,
    /// The backend failed and the apology message was appended instead.
    Degraded,
    /// The interviewer closed the session with a summary.
    Ended,
}

#[derive(Debug, Clone)]
pub struct InterviewSession {
    job: Option<Job>,
    transcript: Vec<Message>,
    phase: Phase,
}

impl InterviewSession {
    /// Starts a session for a job the caller already has in hand.
    pub fn for_job(job: Job) -> Self {
        Self {
            job: Some(job),
            transcript: Vec::new(),
            phase: Phase::GreetingPending,
        }
    }

    /// Starts a session that must first fetch its job by id.
    pub fn loading(job_id: impl Into<String>) -> Self {
        Self {
            job: None,
            transcript: Vec::new(),
            phase: Phase::LoadingJob {
                job_id: job_id.into(),
            },
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn job(&self) -> Option<&Job> {
        self.job.as_ref()
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    pub fn can_submit(&self) -> bool {
        self.phase == Phase::AwaitingUserInput
    }

    pub fn is_ended(&self) -> bool {
        matches!(self.phase, Phase::Ended { .. })
    }

    pub fn summary(&self) -> Option<&InterviewSummary> {
        match &self.phase {
            Phase::Ended { summary } => Some(summary),
            _ => None,
        }
    }

    /// Consumes the session, returning the transcript and the summary if it ended.
    pub fn into_parts(self) -> (Option<Job>, Vec<Message>, Option<InterviewSummary>) {
        let summary = match self.phase {
            Phase::Ended { summary } => Some(summary),
            _ => None,
        };
        (self.job, self.transcript, summary)
    }

    /// Applies the result of the job lookup started in `LoadingJob`.
    pub fn apply_job(&mut self, result: PortResult<Job>) -> Result<(), SessionError> {
        if !matches!(self.phase, Phase::LoadingJob { .. }) {
            return Err(SessionError::NotReady);
        }
        match result {
            Ok(job) => {
                self.job = Some(job);
                self.phase = Phase::GreetingPending;
                Ok(())
            }
            Err(e) => {
                let reason = match e {
                    PortError::NotFound(_) => "Job not found".to_string(),
                    _ => "Failed to load job".to_string(),
                };
                self.phase = Phase::JobUnavailable {
                    reason: reason.clone(),
                };
                Err(SessionError::JobUnavailable(reason))
            }
        }
    }

    /// Applies the result of the opening call made with an empty transcript.
    /// A failed call falls back to a local greeting so the session can still start.
    pub fn apply_greeting(&mut self, result: PortResult<Message>) -> Result<TurnOutcome, SessionError> {
        if self.phase != Phase::GreetingPending {
            return Err(self.rejection());
        }
        match result {
            Ok(message) => Ok(self.accept_assistant(message)),
            Err(_) => {
                let greeting = self.fallback_greeting();
                self.transcript.push(greeting);
                self.phase = Phase::AwaitingUserInput;
                Ok(TurnOutcome::Degraded)
            }
        }
    }

    /// Appends the candidate's answer and returns the transcript to send.
    pub fn submit(&mut self, input: &str) -> Result<Vec<Message>, SessionError> {
        if self.phase != Phase::AwaitingUserInput {
            return Err(self.rejection());
        }
        let text = input.trim();
        if text.is_empty() {
            return Err(SessionError::EmptyInput);
        }
        self.transcript.push(Message::from_user(text));
        self.phase = Phase::AwaitingAssistantResponse;
        Ok(self.transcript.clone())
    }

    /// Applies the backend result for the outstanding turn.
    pub fn apply_reply(&mut self, result: PortResult<Message>) -> Result<TurnOutcome, SessionError> {
        if self.phase != Phase::AwaitingAssistantResponse {
            return Err(self.rejection());
        }
        match result {
            Ok(message) => Ok(self.accept_assistant(message)),
            Err(_) => {
                let id = format!("apology-{}", self.transcript.len());
                self.transcript
                    .push(Message::from_assistant(id, APOLOGY_MESSAGE));
                self.phase = Phase::AwaitingUserInput;
                Ok(TurnOutcome::Degraded)
            }
        }
    }

    fn accept_assistant(&mut self, mut message: Message) -> TurnOutcome {
        message.is_user = false;
        let summary = message.end_summary.clone();
        self.transcript.push(message);
        match summary {
            Some(summary) => {
                self.phase = Phase::Ended { summary };
                TurnOutcome::Ended
            }
            None => {
                self.phase = Phase::AwaitingUserInput;
                TurnOutcome::Continued
            }
        }
    }

    fn fallback_greeting(&self) -> Message {
        let (title, company) = self
            .job
            .as_ref()
            .map(|job| (job.title.as_str(), job.company.as_str()))
            .unwrap_or(("this", "our company"));
        Message::from_assistant(
            "fallback-greeting",
            format!(
                "Hello! Welcome to your interview for the {title} position at {company}. \
                 Could you start by telling me a little about yourself and your experience?"
            ),
        )
    }

    fn rejection(&self) -> SessionError {
        match &self.phase {
            Phase::LoadingJob { .. } | Phase::GreetingPending => SessionError::NotReady,
            Phase::AwaitingAssistantResponse => SessionError::Busy,
            Phase::Ended { .. } => SessionError::Ended,
            Phase::JobUnavailable { reason } => SessionError::JobUnavailable(reason.clone()),
            // Only reached when a reply arrives with no turn outstanding.
            Phase::AwaitingUserInput => SessionError::NotReady,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job() -> Job {
        Job {
            id: "j1".into(),
            title: "Frontend Developer".into(),
            company: "Google".into(),
            location: String::new(),
            salary_range: String::new(),
            employment_type: String::new(),
            description: String::new(),
            required_skills: vec!["React".into()],
        }
    }

    fn summary(rating: u8) -> InterviewSummary {
        InterviewSummary {
            passed: rating >= 60,
            rating,
            improvements: vec!["Give examples".into()],
            summary: "Done".into(),
            learning_roadmap: None,
            flashcard_set: None,
        }
    }

    fn started() -> InterviewSession {
        let mut session = InterviewSession::for_job(job());
        session
            .apply_greeting(Ok(Message::from_assistant("g", "Tell me about yourself")))
            .unwrap();
        session
    }

    #[test]
    fn greeting_opens_input() {
        let session = started();
        assert!(session.can_submit());
        assert_eq!(session.transcript().len(), 1);
    }

    #[test]
    fn failed_greeting_uses_local_fallback() {
        let mut session = InterviewSession::for_job(job());
        let outcome = session
            .apply_greeting(Err(PortError::Transport("down".into())))
            .unwrap();
        assert_eq!(outcome, TurnOutcome::Degraded);
        assert!(session.can_submit());
        let greeting = &session.transcript()[0];
        assert!(!greeting.is_user);
        assert!(greeting.text.contains("Frontend Developer"));
        assert!(greeting.text.contains("Google"));
    }

    #[test]
    fn each_turn_sends_prior_transcript_plus_one_user_message() {
        let mut session = started();
        for (i, answer) in ["first", "second", "third"].iter().enumerate() {
            let before = session.transcript().to_vec();
            let sent = session.submit(answer).unwrap();
            assert_eq!(sent.len(), before.len() + 1);
            assert_eq!(&sent[..before.len()], before.as_slice());
            let last = sent.last().unwrap();
            assert!(last.is_user);
            assert_eq!(last.text, *answer);
            session
                .apply_reply(Ok(Message::from_assistant(format!("q{i}"), "next?")))
                .unwrap();
        }
    }

    #[test]
    fn reply_without_summary_reenables_input() {
        let mut session = started();
        session.submit("hello").unwrap();
        assert!(!session.can_submit());
        let outcome = session
            .apply_reply(Ok(Message::from_assistant("x", "Q2")))
            .unwrap();
        assert_eq!(outcome, TurnOutcome::Continued);
        assert!(session.can_submit());
        assert_eq!(session.transcript().last().unwrap().text, "Q2");
    }

    #[test]
    fn transport_failure_appends_apology_and_continues() {
        let mut session = started();
        session.submit("my answer").unwrap();
        let outcome = session
            .apply_reply(Err(PortError::Transport("timeout".into())))
            .unwrap();
        assert_eq!(outcome, TurnOutcome::Degraded);
        assert_eq!(session.transcript().last().unwrap().text, APOLOGY_MESSAGE);
        assert!(session.can_submit());
    }

    #[test]
    fn terminal_message_disables_input() {
        let mut session = started();
        session.submit("answer").unwrap();
        let mut closing = Message::from_assistant("end", "Thanks, that's all.");
        closing.end_summary = Some(summary(85));
        let outcome = session.apply_reply(Ok(closing)).unwrap();
        assert_eq!(outcome, TurnOutcome::Ended);
        assert!(session.is_ended());
        assert_eq!(session.summary().unwrap().rating, 85);
        assert_eq!(session.submit("one more"), Err(SessionError::Ended));
        let terminal: Vec<_> = session
            .transcript()
            .iter()
            .filter(|m| m.is_terminal())
            .collect();
        assert_eq!(terminal.len(), 1);
    }

    #[test]
    fn second_submission_while_waiting_is_busy() {
        let mut session = started();
        session.submit("one").unwrap();
        assert_eq!(session.submit("two"), Err(SessionError::Busy));
        assert_eq!(session.transcript().len(), 2);
    }

    #[test]
    fn blank_input_is_rejected_without_appending() {
        let mut session = started();
        assert_eq!(session.submit("   \n"), Err(SessionError::EmptyInput));
        assert!(session.can_submit());
        assert_eq!(session.transcript().len(), 1);
    }

    #[test]
    fn assistant_messages_are_never_user_turns() {
        let mut session = started();
        session.submit("answer").unwrap();
        let mut odd = Message::from_assistant("y", "Next");
        odd.is_user = true;
        session.apply_reply(Ok(odd)).unwrap();
        assert!(!session.transcript().last().unwrap().is_user);
    }

    #[test]
    fn missing_job_ends_in_error_state() {
        let mut session = InterviewSession::loading("nope");
        let err = session
            .apply_job(Err(PortError::NotFound("nope".into())))
            .unwrap_err();
        assert_eq!(err, SessionError::JobUnavailable("Job not found".into()));
        assert!(matches!(session.phase(), Phase::JobUnavailable { .. }));
        assert!(session.submit("hi").is_err());
    }

    #[test]
    fn loaded_job_moves_to_greeting() {
        let mut session = InterviewSession::loading("j1");
        assert_eq!(session.submit("hi"), Err(SessionError::NotReady));
        session.apply_job(Ok(job())).unwrap();
        assert_eq!(session.phase(), &Phase::GreetingPending);
        assert_eq!(session.job().unwrap().id, "j1");
    }

    #[test]
    fn stray_reply_is_rejected() {
        let mut session = started();
        let result = session.apply_reply(Ok(Message::from_assistant("z", "?")));
        assert!(result.is_err());
        assert_eq!(session.transcript().len(), 1);
    }
}
