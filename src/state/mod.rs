//! Application state management modules.

mod session;

pub use session::{
    PendingQuery, QueryOutcome, QueryStart, SessionState, validate_location,
};
