//! Client-side session state engine for attribute-based credential sessions.
//!
//! Protocol events from the native backend (and commands from the client)
//! are folded, in order, into per-session state that subscribers can watch.

pub mod attribute;
pub mod bridge;
pub mod config;
pub mod irma;
pub mod logging;
pub mod mvi;
pub mod session;
