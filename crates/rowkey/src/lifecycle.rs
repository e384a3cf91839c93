//! Insert/update routing state for records that carry a client-assigned id.
//!
//! A record whose id is assigned before its first write cannot tell a storage
//! collaborator whether it still needs an insert by looking at the id. It
//! carries a [`Lifecycle`] instead: new until the first successful write or a
//! load from storage, persisted forever after.

use crate::id::RecordId;

/// Tracks whether a record has been written to, or loaded from, storage.
///
/// The flag only moves one way. [`Lifecycle::mark_persisted`] is idempotent
/// and there is no way back to new.
///
/// # Example
///
/// ```
/// use rowkey::lifecycle::Lifecycle;
///
/// let mut state = Lifecycle::default();
/// assert!(state.is_new());
/// state.mark_persisted();
/// state.mark_persisted();
/// assert!(!state.is_new());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lifecycle {
    is_new: bool,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    /// A freshly constructed record: not yet persisted.
    pub const fn new() -> Self {
        Self { is_new: true }
    }

    /// `true` until the record has been written or loaded.
    pub const fn is_new(&self) -> bool {
        self.is_new
    }

    /// Records that the entity now exists in storage.
    pub const fn mark_persisted(&mut self) {
        self.is_new = false;
    }
}

/// A record a storage collaborator can route to insert or update.
pub trait Persistable {
    /// The record's primary key.
    fn id(&self) -> RecordId;

    /// `true` if the next save must be an insert.
    fn is_new(&self) -> bool;

    /// Called after a successful write and after a load.
    fn mark_persisted(&mut self);
}
