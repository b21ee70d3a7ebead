//! services/cli/src/app/history_task.rs
//!
//! Saved interviews: listing, detail, flashcard review, progress and profile.

use jobprep_core::domain::{SavedInterview, User};
use jobprep_core::progress::ProgressReport;
use jobprep_core::summary::ViewMode;
use tokio::io::AsyncRead;
use tracing::info;
use uuid::Uuid;

use crate::app::console::Console;
use crate::app::render;
use crate::app::review_task;
use crate::app::state::AppState;
use crate::app::summary_task::{self, SummaryController};
use crate::error::ClientError;

/// Newest first.
pub async fn list_interviews(
    state: &AppState,
    user_id: Uuid,
) -> Result<Vec<SavedInterview>, ClientError> {
    let mut interviews = state.db.get_interviews_for_user(user_id).await?;
    interviews.sort_by(|a, b| b.date.cmp(&a.date));
    Ok(interviews)
}

pub async fn show_interview<R: AsyncRead + Unpin>(
    state: AppState,
    user_id: Uuid,
    interview_id: &str,
    console: &mut Console<R>,
) -> Result<(), ClientError> {
    let interview = state.db.get_interview(user_id, interview_id).await?;
    println!(
        "{} at {} on {}\n",
        interview.job_title,
        interview.company,
        interview.date.format("%Y-%m-%d %H:%M")
    );
    println!("{}\n", render::transcript(&interview.messages));
    summary_task::run_summary(SummaryController::for_saved(state, interview), console).await
}

/// Reviews the interview's flashcards, generating and storing them on first use.
pub async fn review_flashcards<R: AsyncRead + Unpin>(
    state: AppState,
    user_id: Uuid,
    interview_id: &str,
    console: &mut Console<R>,
) -> Result<(), ClientError> {
    let interview = state.db.get_interview(user_id, interview_id).await?;
    let controller = SummaryController::for_saved(state, interview);

    match controller.toggle_flashcards().await {
        Ok(ViewMode::Flashcards) => {
            if let Some(set) = controller.view().await.flashcards() {
                review_task::run_review(set, console).await?;
            }
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

pub async fn progress(state: &AppState, user_id: Uuid) -> Result<ProgressReport, ClientError> {
    let interviews = state.db.get_interviews_for_user(user_id).await?;
    info!("Building progress from {} interviews", interviews.len());
    Ok(ProgressReport::from_interviews(&interviews))
}

pub async fn profile(state: &AppState, user_id: Uuid) -> Result<(User, ProgressReport), ClientError> {
    let user = state.db.get_user(user_id).await?;
    let report = progress(state, user_id).await?;
    Ok((user, report))
}
