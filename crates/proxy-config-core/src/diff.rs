//! Change detection between snapshots
//!
//! Each fact family is compared on its own, as a whole ordered sequence.
//! There is no per-key diff: one changed element marks the entire family as
//! changed.

use crate::model::Snapshot;

/// Which families differ between two snapshots
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub services_changed: bool,
    pub endpoints_changed: bool,
}

impl ChangeSet {
    /// Both families changed
    pub fn all() -> Self {
        Self {
            services_changed: true,
            endpoints_changed: true,
        }
    }

    /// True if neither family changed
    pub fn is_empty(&self) -> bool {
        !self.services_changed && !self.endpoints_changed
    }
}

/// Compare a freshly parsed snapshot against the last accepted one
///
/// With no previous snapshot both families count as changed, even when the
/// new snapshot is empty, so consumers always receive an initial view.
pub fn detect(previous: Option<&Snapshot>, current: &Snapshot) -> ChangeSet {
    match previous {
        None => ChangeSet::all(),
        Some(previous) => ChangeSet {
            services_changed: previous.services() != current.services(),
            endpoints_changed: previous.endpoints() != current.endpoints(),
        },
    }
}
