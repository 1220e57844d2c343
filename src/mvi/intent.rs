//! Base trait for intents (protocol events) in MVI architecture.

/// Marker trait for intent objects.
///
/// Intents represent:
/// - Server-originated protocol events (permission requests, status updates)
/// - Client-originated commands (disclosure choices, permission responses)
///
/// Intents are processed by reducers to produce new states.
pub trait Intent: Send + 'static {}
