//! Reducer trait for MVI architecture.

use super::intent::Intent;
use super::state::State;

/// Reducer transforms state based on intents.
///
/// The reducer is the only place where state transitions happen.
/// It must be a pure function: (State, Intent, Context) -> State.
/// Anything that needs I/O is resolved by the caller into `Context`
/// before `reduce` is invoked.
pub trait Reducer {
    /// The state type this reducer operates on.
    type State: State;

    /// The intent type this reducer handles.
    type Intent: Intent;

    /// Read-only inputs gathered by the caller for one reduce step.
    type Context;

    /// Process an intent and return the new state.
    ///
    /// This should be a pure function with no side effects.
    fn reduce(state: Self::State, intent: Self::Intent, context: &Self::Context) -> Self::State;
}
