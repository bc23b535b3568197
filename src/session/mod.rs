//! Timed teaching sessions: mode selection, a fixed countdown with content
//! loading in the background, then a short graded quiz.

pub mod controller;
pub mod state;

pub use controller::{SessionController, SessionEvent};
pub use state::{
    AnswerOutcome, SessionOutcome, SessionPhase, SessionState, TickOutcome,
    SESSION_DURATION_SECS,
};
