//! services/cli/src/app/summary_task.rs
//!
//! Everything that happens after the interviewer closes the session: the
//! one-time automatic save, the manual save, and the flashcard toggle.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use jobprep_core::domain::{FlashcardSet, Job, Message, SavedInterview};
use jobprep_core::save::{SaveGuard, SaveRejected, SaveStatus, SaveTrigger};
use jobprep_core::session::InterviewSession;
use jobprep_core::summary::{SummaryView, ToggleAction, ToggleRejected, ViewMode};
use tokio::io::AsyncRead;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::app::console::Console;
use crate::app::render;
use crate::app::review_task;
use crate::app::state::AppState;
use crate::error::ClientError;

/// What gets written when the interview is saved.
struct Draft {
    job: Job,
    messages: Vec<Message>,
}

/// State shared between the foreground commands and the auto-save task.
struct Shared {
    guard: Mutex<SaveGuard>,
    view: Mutex<SummaryView>,
}

pub struct SummaryController {
    state: AppState,
    user_id: Option<Uuid>,
    draft: Arc<Draft>,
    shared: Arc<Shared>,
    /// Cancels the auto-save while it is still waiting out its delay.
    auto_save_cancel: CancellationToken,
}

impl SummaryController {
    /// Takes over a session that has just ended.
    pub fn from_session(
        state: AppState,
        session: InterviewSession,
        user_id: Option<Uuid>,
    ) -> Result<Self, SaveRejected> {
        let (job, messages, summary) = session.into_parts();
        let summary = summary.ok_or(SaveRejected::NotEnded)?;
        let job = job.ok_or(SaveRejected::NotEnded)?;
        Ok(Self::build(
            state,
            user_id,
            Draft { job, messages },
            SaveGuard::new(),
            SummaryView::new(summary),
        ))
    }

    /// Reopens an interview that is already in the store.
    pub fn for_saved(state: AppState, interview: SavedInterview) -> Self {
        let job = Job {
            id: interview.job_id,
            title: interview.job_title,
            company: interview.company,
            location: String::new(),
            salary_range: String::new(),
            employment_type: String::new(),
            description: String::new(),
            required_skills: Vec::new(),
        };
        Self::build(
            state,
            Some(interview.user_id),
            Draft {
                job,
                messages: interview.messages,
            },
            SaveGuard::already_saved(interview.id),
            SummaryView::new(interview.summary),
        )
    }

    fn build(
        state: AppState,
        user_id: Option<Uuid>,
        draft: Draft,
        guard: SaveGuard,
        view: SummaryView,
    ) -> Self {
        Self {
            state,
            user_id,
            draft: Arc::new(draft),
            shared: Arc::new(Shared {
                guard: Mutex::new(guard),
                view: Mutex::new(view),
            }),
            auto_save_cancel: CancellationToken::new(),
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.draft.messages
    }

    pub async fn status(&self) -> SaveStatus {
        self.shared.guard.lock().await.status().clone()
    }

    pub async fn view(&self) -> SummaryView {
        self.shared.view.lock().await.clone()
    }

    /// Schedules the single automatic save after the configured delay.
    /// The handle resolves to the save outcome, or `None` if the save was
    /// cancelled or refused.
    pub fn schedule_auto_save(&self) -> JoinHandle<Option<SaveStatus>> {
        let state = self.state.clone();
        let shared = self.shared.clone();
        let draft = self.draft.clone();
        let user_id = self.user_id;
        let token = self.auto_save_cancel.clone();
        let delay: Duration = self.state.config.auto_save_delay;

        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    debug!("Auto-save cancelled before it ran");
                    None
                }
                _ = tokio::time::sleep(delay) => {
                    match save(&state, &shared, &draft, user_id, SaveTrigger::Automatic).await {
                        Ok(status) => Some(status),
                        Err(rejected) => {
                            debug!("Auto-save skipped: {}", rejected);
                            None
                        }
                    }
                }
            }
        })
    }

    /// Saves right away, cancelling a still-pending automatic save.
    pub async fn save_now(&self) -> Result<SaveStatus, SaveRejected> {
        self.auto_save_cancel.cancel();
        save(
            &self.state,
            &self.shared,
            &self.draft,
            self.user_id,
            SaveTrigger::Manual,
        )
        .await
    }

    /// Switches between summary and flashcards, fetching the set the first time.
    pub async fn toggle_flashcards(&self) -> Result<ViewMode, ToggleRejected> {
        let action = self.shared.view.lock().await.toggle(self.user_id)?;

        if let ToggleAction::Fetch(request) = action {
            info!("Requesting flashcards for the interview summary");
            let result = match self.state.flashcards.generate_flashcards(&request).await {
                Ok(set) => {
                    self.attach_to_saved(&set).await;
                    Ok(set)
                }
                Err(e) => {
                    error!("Failed to generate flashcards: {:?}", e);
                    Err(e.to_string())
                }
            };
            self.shared.view.lock().await.finish_fetch(result);
        }
        Ok(self.shared.view.lock().await.mode())
    }

    async fn attach_to_saved(&self, set: &FlashcardSet) {
        let saved_id = self.shared.guard.lock().await.saved_id().map(str::to_string);
        let (Some(user_id), Some(interview_id)) = (self.user_id, saved_id) else {
            return;
        };
        if let Err(e) = self
            .state
            .db
            .attach_flashcard_set(user_id, &interview_id, set)
            .await
        {
            warn!("Failed to attach flashcards to {}: {}", interview_id, e);
        }
    }

    /// Stops a pending automatic save. Used when the summary is left early.
    pub fn cancel_auto_save(&self) {
        self.auto_save_cancel.cancel();
    }
}

async fn save(
    state: &AppState,
    shared: &Shared,
    draft: &Draft,
    user_id: Option<Uuid>,
    trigger: SaveTrigger,
) -> Result<SaveStatus, SaveRejected> {
    let (ticket, user_id) = {
        let mut guard = shared.guard.lock().await;
        match (guard.begin(trigger, user_id.is_some(), true), user_id) {
            (Ok(ticket), Some(user_id)) => (ticket, user_id),
            (Ok(ticket), None) => {
                guard.finish(ticket, Err(SaveRejected::NotAuthenticated.to_string()));
                return Err(SaveRejected::NotAuthenticated);
            }
            (Err(rejected), _) => return Err(rejected),
        }
    };

    let summary = shared.view.lock().await.summary().clone();
    let interview = SavedInterview::new(
        user_id,
        &draft.job,
        draft.messages.clone(),
        summary,
        Utc::now(),
    );
    info!("Saving interview {} ({:?})", interview.id, trigger);
    let result = state
        .db
        .save_interview(&interview)
        .await
        .map_err(|e| {
            error!("Failed to save interview: {:?}", e);
            e.to_string()
        });

    let mut guard = shared.guard.lock().await;
    Ok(guard.finish(ticket, result).clone())
}

//=========================================================================================
// Interactive Loop
//=========================================================================================

const HELP: &str = "[s] save  [f] flashcards  [t] transcript  [q] done";

pub async fn run_summary<R: AsyncRead + Unpin>(
    controller: SummaryController,
    console: &mut Console<R>,
) -> Result<(), ClientError> {
    println!("{}", render::summary(controller.view().await.summary()));
    let auto_save = controller.schedule_auto_save();

    loop {
        let Some(line) = console.prompt(&format!("{HELP}\n> ")).await? else {
            break;
        };
        match line.trim() {
            "s" => match controller.save_now().await {
                Ok(status) => {
                    if let Some(text) = render::save_status(&status) {
                        println!("{text}");
                    }
                }
                Err(rejected) => println!("{rejected}"),
            },
            "f" => {
                show_flashcards(&controller, console).await?;
            }
            "t" => println!("{}\n", render::transcript(controller.messages())),
            "q" => break,
            "" => {}
            other => println!("Unknown command '{other}'"),
        }
    }

    // Leaving early still lets the single automatic attempt run.
    match auto_save.await {
        Ok(Some(status)) => {
            if let Some(text) = render::save_status(&status) {
                println!("{text}");
            }
        }
        Ok(None) => {}
        Err(e) => error!("Auto-save task failed: {}", e),
    }
    Ok(())
}

async fn show_flashcards<R: AsyncRead + Unpin>(
    controller: &SummaryController,
    console: &mut Console<R>,
) -> Result<(), ClientError> {
    match controller.toggle_flashcards().await {
        Ok(ViewMode::Flashcards) => {
            if let Some(set) = controller.view().await.flashcards() {
                review_task::run_review(set, console).await?;
            }
            // Back to the summary once the review is left.
            if let Err(rejected) = controller.toggle_flashcards().await {
                warn!("Could not return to the summary: {}", rejected);
            }
            println!("{}", render::summary(controller.view().await.summary()));
        }
        Ok(ViewMode::Summary) => {
            if let Some(error) = controller.view().await.error() {
                println!("{error}");
            }
        }
        Err(rejected) => println!("{rejected}"),
    }
    Ok(())
}
