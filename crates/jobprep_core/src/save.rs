//! crates/jobprep_core/src/save.rs
//!
//! Guard shared by the automatic and the manual save of a finished interview.
//! At most one save can be in flight, nothing is saved twice, and the automatic
//! attempt happens at most once per session.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveTrigger {
    Automatic,
    Manual,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveStatus {
    Idle,
    InFlight(SaveTrigger),
    Saved { interview_id: String },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SaveRejected {
    #[error("Please log in to save your interview summary")]
    NotAuthenticated,
    #[error("The interview has not ended yet")]
    NotEnded,
    #[error("A save is already in progress")]
    InFlight,
    #[error("This interview is already saved")]
    AlreadySaved,
    #[error("The automatic save has already run")]
    AutoSaveUsed,
}

/// Proof that a save was admitted by the guard; hand it back with the result.
#[derive(Debug)]
#[must_use]
pub struct SaveTicket {
    trigger: SaveTrigger,
}

impl SaveTicket {
    pub fn trigger(&self) -> SaveTrigger {
        self.trigger
    }
}

#[derive(Debug, Clone)]
pub struct SaveGuard {
    status: SaveStatus,
    auto_attempted: bool,
}

impl Default for SaveGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl SaveGuard {
    pub fn new() -> Self {
        Self {
            status: SaveStatus::Idle,
            auto_attempted: false,
        }
    }

    /// A guard for an interview that was loaded from the store.
    pub fn already_saved(interview_id: impl Into<String>) -> Self {
        Self {
            status: SaveStatus::Saved {
                interview_id: interview_id.into(),
            },
            auto_attempted: true,
        }
    }

    pub fn status(&self) -> &SaveStatus {
        &self.status
    }

    pub fn saved_id(&self) -> Option<&str> {
        match &self.status {
            SaveStatus::Saved { interview_id } => Some(interview_id),
            _ => None,
        }
    }

    /// Admits a save attempt or explains why it may not run.
    pub fn begin(
        &mut self,
        trigger: SaveTrigger,
        authenticated: bool,
        ended: bool,
    ) -> Result<SaveTicket, SaveRejected> {
        match &self.status {
            SaveStatus::InFlight(_) => return Err(SaveRejected::InFlight),
            SaveStatus::Saved { .. } => return Err(SaveRejected::AlreadySaved),
            SaveStatus::Idle | SaveStatus::Failed { .. } => {}
        }
        if trigger == SaveTrigger::Automatic {
            if self.auto_attempted {
                return Err(SaveRejected::AutoSaveUsed);
            }
            // The automatic attempt is spent even when the checks below refuse it.
            self.auto_attempted = true;
        }
        if !authenticated {
            return Err(SaveRejected::NotAuthenticated);
        }
        if !ended {
            return Err(SaveRejected::NotEnded);
        }
        self.status = SaveStatus::InFlight(trigger);
        Ok(SaveTicket { trigger })
    }

    pub fn finish(&mut self, _ticket: SaveTicket, result: Result<String, String>) -> &SaveStatus {
        self.status = match result {
            Ok(interview_id) => SaveStatus::Saved { interview_id },
            Err(error) => SaveStatus::Failed { error },
        };
        &self.status
    }
}
