//! Event/command boundary between the native backend and the session store.
//!
//! Inbound backend events and client commands travel over the same ordered
//! queue, so the store folds them in exactly the order they were dispatched.
//! The backend observes client commands, as folded, through the repository's
//! event tap.

mod codec;
mod error;

pub use codec::{decode, decode_str, encode, NamedEvent};
pub use error::BridgeError;

use futures_core::Stream;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::config::SessionConfig;
use crate::irma::SnapshotError;
use crate::session::{
    Collaborators, SessionEvent, SessionEventKind, SessionFold, SessionId, SessionRepository,
    SessionState,
};

pub struct BridgeLayer;

impl BridgeLayer {
    pub fn new(config: &SessionConfig, collaborators: Collaborators) -> (SessionBridge, BridgeServer) {
        let (sender, receiver) = mpsc::channel(config.event_buffer);
        let (repository, fold) = SessionRepository::new(collaborators, config.event_tap_capacity);
        (
            SessionBridge { sender, repository },
            BridgeServer { fold, receiver },
        )
    }
}

/// Owns the fold; run it on its own task.
pub struct BridgeServer {
    fold: SessionFold,
    receiver: mpsc::Receiver<SessionEvent>,
}

impl BridgeServer {
    /// Fold until every [`SessionBridge`] clone has been dropped.
    pub async fn run(self) -> Result<(), SnapshotError> {
        self.fold.run(self.receiver).await
    }
}

/// Command handle: push events in, read session state out.
#[derive(Clone)]
pub struct SessionBridge {
    sender: mpsc::Sender<SessionEvent>,
    repository: SessionRepository,
}

impl SessionBridge {
    /// Append an event to the session event stream.
    pub async fn dispatch(&self, event: SessionEvent) -> Result<(), BridgeError> {
        self.sender
            .send(event)
            .await
            .map_err(|_| BridgeError::Disconnected)
    }

    /// Append an event received from the backend as a name and JSON payload.
    pub async fn dispatch_named(&self, name: &str, payload: Value) -> Result<(), BridgeError> {
        let event = decode(name, payload)?;
        self.dispatch(event).await
    }

    /// Select con `con_index` for discon `discon_index`.
    pub async fn choose_disclosure(
        &self,
        session_id: SessionId,
        discon_index: usize,
        con_index: usize,
    ) -> Result<(), BridgeError> {
        self.dispatch(SessionEvent::new(
            session_id,
            SessionEventKind::DisclosureChoiceUpdate {
                discon_index,
                con_index,
            },
        ))
        .await
    }

    /// Answer a permission request.
    ///
    /// An accepting answer gets the session's disclosure choices attached
    /// when it is folded, so choices dispatched earlier are always included.
    pub async fn respond_permission(
        &self,
        session_id: SessionId,
        proceed: bool,
    ) -> Result<(), BridgeError> {
        self.dispatch(SessionEvent::new(
            session_id,
            SessionEventKind::RespondPermission {
                proceed,
                disclosure_choices: None,
            },
        ))
        .await
    }

    pub async fn respond_pin(
        &self,
        session_id: SessionId,
        pin: Option<String>,
    ) -> Result<(), BridgeError> {
        let proceed = pin.is_some();
        self.dispatch(SessionEvent::new(
            session_id,
            SessionEventKind::RespondPin { proceed, pin },
        ))
        .await
    }

    pub async fn dismiss(&self, session_id: SessionId) -> Result<(), BridgeError> {
        self.dispatch(SessionEvent::new(session_id, SessionEventKind::Dismiss))
            .await
    }

    pub fn repository(&self) -> &SessionRepository {
        &self.repository
    }

    pub fn session_state_stream(
        &self,
        session_id: SessionId,
    ) -> impl Stream<Item = SessionState> + Send + Unpin + 'static {
        self.repository.session_state_stream(session_id)
    }

    pub fn has_active_sessions(&self) -> bool {
        self.repository.has_active_sessions()
    }
}
