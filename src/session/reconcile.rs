//! Candidate reconciliation across protocol round-trips.
//!
//! The backend re-sends the complete candidate tree after every round-trip
//! (PIN prompt, issuance in the middle of a disclosure, ...). Options may be
//! reordered or added. Reconciliation keeps the options the holder has
//! already seen where they were and surfaces new ones next to the current
//! selection.

use super::state::SessionState;
use crate::attribute::{
    resolve_candidates, Attribute, AttributeIdentifier, Con, ConCon, ConDisCon, DisCon,
    RawCandidates,
};
use crate::irma::{Credentials, IrmaConfiguration};

/// Priority band of a con: lower sorts first.
fn priority_band(con: &Con<Attribute>) -> usize {
    if con.is_choosable() {
        0
    } else if con.is_obtainable() {
        1
    } else {
        2
    }
}

/// Stable sort of every discon: choosable, then obtainable, then the rest.
pub fn sort_by_obtainability(candidates: ConDisCon<Attribute>) -> ConDisCon<Attribute> {
    candidates
        .into_iter()
        .map(|discon| {
            // Key is `index + band * (len + 1)`: bands never overlap.
            let stride = discon.len() + 1;
            let mut keyed: Vec<(usize, Con<Attribute>)> = discon
                .into_iter()
                .enumerate()
                .map(|(index, con)| (index + priority_band(&con) * stride, con))
                .collect();
            keyed.sort_by_key(|(key, _)| *key);
            keyed.into_iter().map(|(_, con)| con).collect::<DisCon<_>>()
        })
        .collect()
}

/// Merge one freshly sorted discon into the previously shown one.
///
/// Surviving cons keep their old relative order (with fresh values), and
/// newly offered cons are inserted at the previously selected position.
fn merge_discon(
    previous: &DisCon<Attribute>,
    fresh: DisCon<Attribute>,
    selected: usize,
) -> DisCon<Attribute> {
    let mut remaining: Vec<Option<Con<Attribute>>> = fresh.into_iter().map(Some).collect();

    let mut kept: Vec<Con<Attribute>> = Vec::with_capacity(remaining.len());
    for old in previous.iter() {
        let slot = remaining
            .iter_mut()
            .find(|slot| slot.as_ref().is_some_and(|con| con.matches(old)));
        if let Some(slot) = slot {
            kept.extend(slot.take());
        }
    }

    let offered: Vec<Con<Attribute>> = remaining.into_iter().flatten().collect();
    let at = selected.min(kept.len());
    kept.splice(at..at, offered);
    kept.into()
}

/// Build the candidate tree to store for a permission request.
pub fn reconcile(
    raw: &RawCandidates,
    previous: &SessionState,
    configuration: &IrmaConfiguration,
    credentials: &Credentials,
) -> ConDisCon<Attribute> {
    let resolved = resolve_candidates(raw, configuration, credentials);
    // Issuance without any disclosure.
    if resolved.is_empty() {
        return resolved;
    }

    let sorted = sort_by_obtainability(resolved);

    let Some(old) = previous
        .disclosures_candidates
        .as_ref()
        .filter(|old| !old.is_empty())
    else {
        return sorted;
    };

    if old.len() != sorted.len() {
        tracing::warn!(
            previous = old.len(),
            received = sorted.len(),
            "Disjunction count changed between round-trips, discarding previous layout"
        );
        return sorted;
    }

    let selected = previous.disclosure_indices.as_deref().unwrap_or(&[]);
    sorted
        .into_iter()
        .zip(old.iter())
        .enumerate()
        .map(|(index, (fresh, old))| {
            merge_discon(old, fresh, selected.get(index).copied().unwrap_or(0))
        })
        .collect()
}

/// Carry over previous selections where they still fit, else pick the first con.
pub fn select_indices(previous: Option<&[usize]>, candidates: &ConDisCon<Attribute>) -> Vec<usize> {
    match previous {
        Some(previous) if previous.len() == candidates.len() => previous
            .iter()
            .zip(candidates.iter())
            .map(|(&index, discon)| if index < discon.len() { index } else { 0 })
            .collect(),
        _ => vec![0; candidates.len()],
    }
}

/// The attributes to disclose for the given selection, one con per discon.
pub fn chosen_attributes(
    candidates: &ConDisCon<Attribute>,
    indices: &[usize],
) -> ConCon<AttributeIdentifier> {
    candidates
        .iter()
        .zip(indices)
        .filter_map(|(discon, &index)| discon.get(index))
        .map(|con| con.iter().map(Attribute::identifier).collect::<Con<_>>())
        .collect()
}
