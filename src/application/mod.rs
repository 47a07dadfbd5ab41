//! Application layer - Handlers and the storage fallback chain.
//!
//! This layer orchestrates domain operations and coordinates between ports.

pub mod fallback;
pub mod handlers;

pub use fallback::{ChainOutcome, FallbackChain, StorageTier, TierAttempt};
pub use handlers::{
    AssignBookletResult, BookletAssigner, ConsentRecorder, FlowStep, PersistOutcome,
    PersistencePipeline, Progress, RecordConsentResult, SaveResponseRowsCommand,
    SaveResponseRowsHandler, SecondaryWrite, SurveyFlow, SurveyResultRecord, SurveyServices,
    PRIMARY_SAVE_FAILED,
};
