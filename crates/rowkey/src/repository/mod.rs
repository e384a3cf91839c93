//! Storage seam for [`Persistable`] records.
//!
//! A repository decides between insert and update from the record's
//! lifecycle, never from its id: every id is assigned before the first write.

mod memory;

pub use memory::*;

use crate::{
    context::PartitionKey, domain::PartitionScoped, error::Result, id::RecordId,
    lifecycle::Persistable,
};

/// How a successful [`Repository::save`] was carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SaveOutcome {
    /// The record was new and a row was created.
    Inserted,
    /// The record was persisted and its row was replaced.
    Updated,
}

/// Keyed storage for records whose ids are assigned before the first write.
///
/// Implementations route [`Repository::save`] by [`Persistable::is_new`] and
/// call [`Persistable::mark_persisted`] on every record they hand back.
///
/// # Example
///
/// ```
/// use rowkey::RecordId;
/// use rowkey::domain::{ColorInfo, ColorInfoVo};
/// use rowkey::lifecycle::Persistable;
/// use rowkey::repository::{MemoryRepository, Repository, SaveOutcome};
///
/// let repo = MemoryRepository::new();
/// let mut red: ColorInfo = ColorInfoVo::builder(RecordId::from(1, 7, 0))
///     .color_code("RED")
///     .build()
///     .into();
///
/// assert_eq!(repo.save(&mut red), Ok(SaveOutcome::Inserted));
/// assert_eq!(repo.save(&mut red), Ok(SaveOutcome::Updated));
/// assert!(!repo.get(red.id()).unwrap().unwrap().is_new());
/// ```
pub trait Repository<E: Persistable> {
    /// Loads a record. A returned record is already marked persisted.
    ///
    /// # Errors
    ///
    /// Backend failures only; a missing record is `Ok(None)`.
    fn get(&self, id: RecordId) -> Result<Option<E>>;

    /// Inserts a new record or updates a persisted one, then marks it
    /// persisted.
    ///
    /// # Errors
    ///
    /// - [`Error::DuplicateKey`] when inserting an id that already exists.
    /// - [`Error::NotFound`] when updating an id that does not exist.
    ///
    /// On error the record's lifecycle is unchanged.
    ///
    /// [`Error::DuplicateKey`]: crate::Error::DuplicateKey
    /// [`Error::NotFound`]: crate::Error::NotFound
    fn save(&self, entity: &mut E) -> Result<SaveOutcome>;

    /// Removes a record, returning it if it existed.
    ///
    /// # Errors
    ///
    /// Backend failures only.
    fn delete(&self, id: RecordId) -> Result<Option<E>>;
}

/// A [`Repository`] that can enumerate one dealer partition.
pub trait PartitionRepository<E>: Repository<E>
where
    E: Persistable + PartitionScoped,
{
    /// Every record stored under `key`, in id order.
    ///
    /// # Errors
    ///
    /// Backend failures only.
    fn list_partition(&self, key: &PartitionKey) -> Result<Vec<E>>;
}
