//! Multi-session event-sourcing store.
//!
//! A single [`SessionFold`] folds the ordered event stream through the
//! [`SessionReducer`] and republishes the complete state map after every
//! event. Any number of [`SessionRepository`] handles read from it.
//!
//! The latest map lives in a `watch` channel for point reads. Every published
//! map also goes out on a `broadcast` channel, so streams see each state in
//! fold order instead of only the newest one.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures_core::Stream;
use serde::Serialize;
use tokio::sync::{broadcast, mpsc, watch};
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

use super::event::{SessionEvent, SessionEventKind, SessionId};
use super::reducer::{FoldContext, SessionReducer};
use super::return_url::{ClientReturnUrl, ReturnUrlValidator};
use super::state::SessionState;
use crate::irma::{Credentials, IrmaConfiguration, Snapshot, SnapshotError};
use crate::mvi::Reducer;

/// Immutable snapshot of every session seen so far.
///
/// Lookups of unknown ids read through to a fresh default state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SessionStates(BTreeMap<SessionId, SessionState>);

impl SessionStates {
    pub fn get(&self, session_id: SessionId) -> SessionState {
        self.0.get(&session_id).cloned().unwrap_or_default()
    }

    /// Copy-on-write update: a new map with one entry replaced.
    pub fn with(&self, session_id: SessionId, state: SessionState) -> Self {
        let mut states = self.0.clone();
        states.insert(session_id, state);
        Self(states)
    }

    pub fn session_ids(&self) -> impl Iterator<Item = SessionId> + '_ {
        self.0.keys().copied()
    }

    /// Some session is waiting for a disclosure decision.
    pub fn has_active_sessions(&self) -> bool {
        self.0.values().any(SessionState::is_active)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// External read-only inputs of the fold.
#[derive(Clone)]
pub struct Collaborators {
    pub configuration: Snapshot<IrmaConfiguration>,
    pub credentials: Snapshot<Credentials>,
    pub return_url_validator: Arc<dyn ReturnUrlValidator>,
}

/// Read handle on the session states.
#[derive(Clone)]
pub struct SessionRepository {
    states: watch::Receiver<Arc<SessionStates>>,
    updates: broadcast::Sender<Arc<SessionStates>>,
    event_tap: broadcast::Sender<SessionEvent>,
}

impl SessionRepository {
    /// Create the store: a read handle plus the single writer.
    ///
    /// `capacity` bounds both broadcasts: published maps and folded events.
    pub fn new(collaborators: Collaborators, capacity: usize) -> (Self, SessionFold) {
        let (states_tx, states_rx) = watch::channel(Arc::new(SessionStates::default()));
        let (updates, _) = broadcast::channel(capacity);
        let (event_tap, _) = broadcast::channel(capacity);

        let repository = Self {
            states: states_rx,
            updates: updates.clone(),
            event_tap: event_tap.clone(),
        };
        let fold = SessionFold {
            states: states_tx,
            updates,
            event_tap,
            collaborators,
        };
        (repository, fold)
    }

    /// The most recently published state map.
    pub fn snapshot(&self) -> Arc<SessionStates> {
        self.states.borrow().clone()
    }

    pub fn session_state(&self, session_id: SessionId) -> SessionState {
        self.states.borrow().get(session_id)
    }

    /// Current state of one session, then its state after every later event.
    pub fn session_state_stream(
        &self,
        session_id: SessionId,
    ) -> impl Stream<Item = SessionState> + Send + Unpin + 'static {
        self.state_maps().map(move |states| states.get(session_id))
    }

    pub fn has_active_sessions(&self) -> bool {
        self.states.borrow().has_active_sessions()
    }

    pub fn has_active_sessions_stream(&self) -> impl Stream<Item = bool> + Send + Unpin + 'static {
        self.state_maps().map(|states| states.has_active_sessions())
    }

    /// Every folded event, in fold order.
    pub fn event_tap(&self) -> broadcast::Receiver<SessionEvent> {
        self.event_tap.subscribe()
    }

    /// The current map, then every map published after it.
    fn state_maps(&self) -> impl Stream<Item = Arc<SessionStates>> + Send + Unpin + 'static {
        // The fold broadcasts while holding the watch write lock, so reading
        // the current map and subscribing under the read lock neither loses
        // nor repeats a map.
        let (current, receiver) = {
            let current = self.states.borrow();
            (current.clone(), self.updates.subscribe())
        };

        let updates = BroadcastStream::new(receiver).filter_map(|update| match update {
            Ok(states) => Some(states),
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Session state subscriber lagged behind");
                None
            }
        });
        tokio_stream::once(current).chain(updates)
    }
}

/// The single writer of the session state map.
pub struct SessionFold {
    states: watch::Sender<Arc<SessionStates>>,
    updates: broadcast::Sender<Arc<SessionStates>>,
    event_tap: broadcast::Sender<SessionEvent>,
    collaborators: Collaborators,
}

impl SessionFold {
    /// Fold one event and publish the resulting map.
    ///
    /// Fails only if a collaborator snapshot is gone; the event is then not
    /// applied.
    pub async fn apply(&mut self, mut event: SessionEvent) -> Result<(), SnapshotError> {
        let context = self.context_for(&event).await?;

        let current = self.states.borrow().clone();
        let previous = current.get(event.session_id);
        attach_choices(&mut event.kind, &previous);
        let previous_status = previous.status;
        let next = SessionReducer::reduce(previous, event.kind.clone(), &context);

        tracing::debug!(
            session_id = event.session_id,
            event = event.kind.name(),
            status = ?next.status,
            "Folded session event"
        );
        if next.status != previous_status && next.status.is_terminal() {
            tracing::info!(
                session_id = event.session_id,
                status = ?next.status,
                "Session finished"
            );
        }

        let published = Arc::new(current.with(event.session_id, next));
        let updates = &self.updates;
        self.states.send_modify(|states| {
            *states = published.clone();
            // No subscribers is fine: streams start from the watch value.
            let _ = updates.send(published);
        });

        if self.event_tap.send(event).is_err() {
            tracing::trace!("Event tap has no subscribers");
        }
        Ok(())
    }

    /// Fold events strictly one after another until the sender side closes.
    pub async fn run(
        mut self,
        mut receiver: mpsc::Receiver<SessionEvent>,
    ) -> Result<(), SnapshotError> {
        while let Some(event) = receiver.recv().await {
            if let Err(err) = self.apply(event).await {
                tracing::error!(error = %err, "Session fold stopped");
                return Err(err);
            }
        }
        tracing::debug!("Session event stream closed");
        Ok(())
    }

    async fn context_for(&self, event: &SessionEvent) -> Result<FoldContext, SnapshotError> {
        let configuration = self.collaborators.configuration.current().await?;
        let credentials = self.collaborators.credentials.current().await?;

        let validated_return_url = match event.kind.client_return_url() {
            Some(raw) => self.validate_return_url(event.session_id, raw).await,
            None => None,
        };

        Ok(FoldContext {
            configuration,
            credentials,
            validated_return_url,
        })
    }

    async fn validate_return_url(&self, session_id: SessionId, raw: &str) -> Option<ClientReturnUrl> {
        let Some(url) = ClientReturnUrl::parse(raw) else {
            tracing::warn!(session_id, url = %raw, "Dropping unparsable client return URL");
            return None;
        };
        if !self.collaborators.return_url_validator.can_open(&url).await {
            tracing::warn!(session_id, url = %raw, "Dropping client return URL that cannot be opened");
            return None;
        }
        Some(url)
    }
}

/// Fill an accepting permission response with the selection it answers.
///
/// Runs inside the fold, so every choice queued before the response counts.
fn attach_choices(kind: &mut SessionEventKind, state: &SessionState) {
    if let SessionEventKind::RespondPermission {
        proceed: true,
        disclosure_choices,
    } = kind
    {
        if disclosure_choices.is_none() {
            *disclosure_choices = state.disclosure_choices.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::{AttributeIdentifier, Con, ConCon};
    use crate::session::return_url::SchemeValidator;
    use crate::session::state::SessionStatus;

    fn collaborators() -> Collaborators {
        Collaborators {
            configuration: Snapshot::fixed(IrmaConfiguration::default()),
            credentials: Snapshot::fixed(Credentials::default()),
            return_url_validator: Arc::new(SchemeValidator::new(["https".to_string()])),
        }
    }

    #[test]
    fn unknown_session_reads_as_default() {
        let states = SessionStates::default();
        assert_eq!(states.get(42), SessionState::default());
        assert_eq!(states.get(42), states.get(42));
        assert!(states.is_empty());
    }

    #[test]
    fn with_leaves_original_untouched() {
        let states = SessionStates::default();
        let updated = states.with(
            1,
            SessionState {
                status: SessionStatus::Success,
                ..SessionState::default()
            },
        );
        assert!(states.is_empty());
        assert_eq!(updated.get(1).status, SessionStatus::Success);
        assert_eq!(updated.session_ids().collect::<Vec<_>>(), [1]);
    }

    #[tokio::test]
    async fn apply_publishes_new_map() {
        let (repository, mut fold) = SessionRepository::new(collaborators(), 8);
        let before = repository.snapshot();

        fold.apply(SessionEvent::new(5, SessionEventKind::Canceled))
            .await
            .unwrap();

        assert!(before.is_empty());
        assert_eq!(repository.session_state(5).status, SessionStatus::Canceled);
        assert_eq!(repository.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn apply_fails_when_snapshot_source_is_gone() {
        let store = crate::irma::SnapshotStore::<IrmaConfiguration>::empty();
        let mut collaborators = collaborators();
        collaborators.configuration = store.subscribe();
        drop(store);

        let (repository, mut fold) = SessionRepository::new(collaborators, 8);
        let result = fold
            .apply(SessionEvent::new(1, SessionEventKind::Success))
            .await;

        assert!(matches!(result, Err(SnapshotError::Closed)));
        assert!(repository.snapshot().is_empty());
    }

    fn choices(attribute_type: &str) -> ConCon<AttributeIdentifier> {
        vec![Con(vec![AttributeIdentifier {
            attribute_type: attribute_type.to_string(),
            credential_hash: "hash".to_string(),
        }])]
        .into()
    }

    #[test]
    fn accepting_response_carries_current_choices() {
        let state = SessionState {
            disclosure_choices: Some(choices("demo.card.name")),
            ..SessionState::default()
        };

        let mut accept = SessionEventKind::RespondPermission {
            proceed: true,
            disclosure_choices: None,
        };
        attach_choices(&mut accept, &state);
        assert_eq!(
            accept,
            SessionEventKind::RespondPermission {
                proceed: true,
                disclosure_choices: Some(choices("demo.card.name")),
            }
        );

        let mut decline = SessionEventKind::RespondPermission {
            proceed: false,
            disclosure_choices: None,
        };
        attach_choices(&mut decline, &state);
        assert_eq!(
            decline,
            SessionEventKind::RespondPermission {
                proceed: false,
                disclosure_choices: None,
            }
        );
    }

    #[test]
    fn explicit_choices_are_not_overwritten() {
        let state = SessionState {
            disclosure_choices: Some(choices("demo.card.name")),
            ..SessionState::default()
        };
        let mut explicit = SessionEventKind::RespondPermission {
            proceed: true,
            disclosure_choices: Some(choices("demo.card.age")),
        };
        attach_choices(&mut explicit, &state);
        assert!(matches!(
            explicit,
            SessionEventKind::RespondPermission { disclosure_choices: Some(c), .. }
                if c == choices("demo.card.age")
        ));
    }

    #[tokio::test]
    async fn stream_sees_back_to_back_states() {
        let (repository, mut fold) = SessionRepository::new(collaborators(), 8);
        let mut stream = repository.session_state_stream(2);

        fold.apply(SessionEvent::new(
            2,
            SessionEventKind::RequestPin {
                remaining_attempts: None,
            },
        ))
        .await
        .unwrap();
        fold.apply(SessionEvent::new(
            2,
            SessionEventKind::RespondPermission {
                proceed: true,
                disclosure_choices: None,
            },
        ))
        .await
        .unwrap();

        let mut statuses = Vec::new();
        for _ in 0..3 {
            statuses.push(stream.next().await.unwrap().status);
        }
        assert_eq!(
            statuses,
            [
                SessionStatus::Uninitialized,
                SessionStatus::RequestPin,
                SessionStatus::Communicating,
            ]
        );
    }
}
