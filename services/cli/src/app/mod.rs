pub mod auth;
pub mod console;
pub mod guard;
pub mod history_task;
pub mod interview_task;
pub mod render;
pub mod review_task;
pub mod search_task;
pub mod state;
pub mod summary_task;

#[cfg(test)]
pub(crate) mod testing;

// Re-export the entry points the binary dispatches to.
pub use console::Console;
pub use guard::{current_user, require_auth};
pub use interview_task::run_interview;
pub use state::AppState;
