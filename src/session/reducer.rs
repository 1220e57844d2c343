//! The session protocol state machine.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::event::SessionEventKind;
use super::reconcile::{chosen_attributes, reconcile, select_indices};
use super::return_url::ClientReturnUrl;
use super::state::{RequestorInfo, SessionState, SessionStatus};
use crate::attribute::{RawCandidates, TranslatedValue};
use crate::irma::{Credential, Credentials, IrmaConfiguration, RawCredential};
use crate::mvi::Reducer;

/// Inputs read before a reduce step.
///
/// The store gathers these (configuration, wallet, return URL check) so the
/// reducer itself stays pure.
#[derive(Debug, Clone, Default)]
pub struct FoldContext {
    pub configuration: Arc<IrmaConfiguration>,
    pub credentials: Arc<Credentials>,
    /// The event's return URL, present only if it passed validation.
    pub validated_return_url: Option<ClientReturnUrl>,
}

/// Reducer for per-session state transitions.
pub struct SessionReducer;

impl Reducer for SessionReducer {
    type State = SessionState;
    type Intent = SessionEventKind;
    type Context = FoldContext;

    fn reduce(state: Self::State, intent: Self::Intent, context: &Self::Context) -> Self::State {
        match intent {
            SessionEventKind::NewSession {
                request,
                continue_on_second_device,
                in_app_credential,
                ..
            } => SessionState {
                status: SessionStatus::Initialized,
                // Corrected later by the permission request's server name.
                server_name: RequestorInfo::from_session_url(&request.u),
                session_type: Some(request.irmaqr),
                client_return_url: context
                    .validated_return_url
                    .clone()
                    .or(state.client_return_url),
                continue_on_second_device,
                in_app_credential,
                ..state
            },

            SessionEventKind::Failure { error } => SessionState {
                status: SessionStatus::Error,
                error: Some(error),
                ..state
            },

            SessionEventKind::StatusUpdate { status, .. } => {
                match SessionStatus::from_backend_code(&status) {
                    Some(status) => SessionState { status, ..state },
                    None => {
                        tracing::warn!(code = %status, "Unknown backend status code");
                        state
                    }
                }
            }

            SessionEventKind::ClientReturnUrlSet { .. } => match &context.validated_return_url {
                Some(url) => SessionState {
                    client_return_url: Some(url.clone()),
                    ..state
                },
                None => state,
            },

            SessionEventKind::PairingRequired { pairing_code } => SessionState {
                status: SessionStatus::Pairing,
                pairing_code: Some(pairing_code),
                ..state
            },

            SessionEventKind::RequestIssuancePermission {
                server_name,
                satisfiable,
                issued_credentials,
                disclosures_labels,
                disclosures_candidates,
            } => {
                let status = if disclosures_candidates.is_empty() {
                    SessionStatus::RequestIssuancePermission
                } else {
                    SessionStatus::RequestDisclosurePermission
                };
                let issued = convert_credentials(&issued_credentials, &context.configuration);
                let state = with_candidates(state, &disclosures_candidates, context);
                SessionState {
                    status,
                    server_name: Some(server_name),
                    satisfiable: Some(satisfiable),
                    issued_credentials: Some(issued),
                    disclosures_labels: labels_by_index(disclosures_labels),
                    is_signature_session: Some(false),
                    ..state
                }
            }

            SessionEventKind::RequestVerificationPermission {
                server_name,
                satisfiable,
                is_signature_session,
                signed_message,
                disclosures_labels,
                disclosures_candidates,
            } => {
                let state = with_candidates(state, &disclosures_candidates, context);
                SessionState {
                    status: SessionStatus::RequestDisclosurePermission,
                    server_name: Some(server_name),
                    satisfiable: Some(satisfiable),
                    disclosures_labels: labels_by_index(disclosures_labels),
                    is_signature_session: Some(is_signature_session),
                    signed_message,
                    ..state
                }
            }

            SessionEventKind::ContinueToIssuance => SessionState {
                status: SessionStatus::RequestIssuancePermission,
                ..state
            },

            SessionEventKind::DisclosureChoiceUpdate {
                discon_index,
                con_index,
            } => with_choice(state, discon_index, con_index),

            SessionEventKind::Success => SessionState {
                status: SessionStatus::Success,
                ..state
            },

            SessionEventKind::Canceled => SessionState {
                status: SessionStatus::Canceled,
                ..state
            },

            SessionEventKind::RequestPin { .. } => SessionState {
                status: SessionStatus::RequestPin,
                ..state
            },

            SessionEventKind::RespondPermission { .. } => SessionState {
                status: SessionStatus::Communicating,
                ..state
            },

            // Addressed to the backend only.
            SessionEventKind::RespondPin { .. } | SessionEventKind::Dismiss => state,
        }
    }
}

/// Store a new candidate tree and the selection that goes with it.
fn with_candidates(
    state: SessionState,
    raw: &RawCandidates,
    context: &FoldContext,
) -> SessionState {
    let candidates = reconcile(raw, &state, &context.configuration, &context.credentials);
    let can_be_finished = candidates.is_finishable();

    let (disclosure_indices, disclosure_choices) = if can_be_finished {
        let indices = select_indices(state.disclosure_indices.as_deref(), &candidates);
        let choices = chosen_attributes(&candidates, &indices);
        (Some(indices), Some(choices))
    } else {
        (None, None)
    };

    SessionState {
        disclosures_candidates: Some(candidates),
        disclosure_indices,
        disclosure_choices,
        can_be_finished,
        ..state
    }
}

fn with_choice(state: SessionState, discon_index: usize, con_index: usize) -> SessionState {
    let (Some(candidates), Some(indices)) =
        (&state.disclosures_candidates, &state.disclosure_indices)
    else {
        tracing::warn!(discon_index, con_index, "Disclosure choice without candidates");
        return state;
    };

    let in_range = discon_index < indices.len()
        && candidates
            .get(discon_index)
            .is_some_and(|discon| con_index < discon.len());
    if !in_range {
        tracing::warn!(discon_index, con_index, "Disclosure choice out of range");
        return state;
    }

    let mut indices = indices.clone();
    indices[discon_index] = con_index;
    let choices = chosen_attributes(candidates, &indices);

    SessionState {
        disclosure_indices: Some(indices),
        disclosure_choices: Some(choices),
        ..state
    }
}

fn convert_credentials(raw: &[RawCredential], configuration: &IrmaConfiguration) -> Vec<Credential> {
    raw.iter()
        .map(|credential| Credential::from_raw(credential, configuration))
        .collect()
}

fn labels_by_index(labels: BTreeMap<String, TranslatedValue>) -> BTreeMap<usize, TranslatedValue> {
    labels
        .into_iter()
        .filter_map(|(key, label)| match key.parse() {
            Ok(index) => Some((index, label)),
            Err(_) => {
                tracing::warn!(key = %key, "Ignoring disclosure label with non-numeric key");
                None
            }
        })
        .collect()
}
