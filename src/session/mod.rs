//! Session state engine.
//!
//! # Architecture
//!
//! Uses the MVI pattern over an event-sourced store:
//! - `event.rs` - Protocol events (the intents), tagged by session id
//! - `state.rs` - Per-session state
//! - `reducer.rs` - Pure state transitions
//! - `reconcile.rs` - Candidate tree merge across round-trips
//! - `repository.rs` - Sequential fold over all sessions, published as snapshots
//! - `return_url.rs` - Client return URL parsing and feasibility check

mod event;
mod reconcile;
mod reducer;
mod repository;
mod return_url;
mod state;

pub use event::{SessionEvent, SessionEventKind, SessionId, SessionPointer};
pub use reconcile::{chosen_attributes, reconcile, select_indices, sort_by_obtainability};
pub use reducer::{FoldContext, SessionReducer};
pub use repository::{Collaborators, SessionFold, SessionRepository, SessionStates};
pub use return_url::{ClientReturnUrl, ReturnUrlValidator, SchemeValidator};
pub use state::{RequestorInfo, SessionError, SessionState, SessionStatus, SessionType};
