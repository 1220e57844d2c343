//! Base trait for state in MVI architecture.

/// Marker trait for state objects.
///
/// States should be:
/// - Immutable (Clone to create new states)
/// - Self-contained (all data a subscriber needs)
/// - Comparable (PartialEq for detecting changes)
/// - Defaultable (a never-touched key reads as the default)
pub trait State: Clone + PartialEq + Default + Send + Sync + 'static {}
