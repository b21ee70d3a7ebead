pub mod credentials;
pub mod domain;
pub mod ports;
pub mod progress;
pub mod review;
pub mod save;
pub mod search;
pub mod session;
pub mod summary;

pub use domain::{
    AuthSession, CvAnalysis, Flashcard, FlashcardRequest, FlashcardSet, InterviewSummary, Job,
    LearningResource, LearningRoadmap, Message, SavedInterview, User, UserCredentials,
};
pub use ports::{
    ConversationService, CvAnalysisService, DatabaseService, FlashcardService,
    JobMatchingService, PortError, PortResult,
};
