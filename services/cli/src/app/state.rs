//! services/cli/src/app/state.rs
//!
//! Defines the application's shared state.

use crate::adapters::LocalStore;
use crate::config::Config;
use jobprep_core::ports::{
    ConversationService, CvAnalysisService, DatabaseService, FlashcardService,
    JobMatchingService,
};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Commands)
//=========================================================================================

/// The shared application state, created once at startup and passed to every task.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub config: Arc<Config>,
    pub conversation: Arc<dyn ConversationService>,
    pub matcher: Arc<dyn JobMatchingService>,
    pub cv_analyzer: Arc<dyn CvAnalysisService>,
    pub flashcards: Arc<dyn FlashcardService>,
    pub local: Arc<LocalStore>,
}
