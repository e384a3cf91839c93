use std::collections::{BTreeMap, btree_map::Entry};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    context::PartitionKey,
    domain::PartitionScoped,
    error::{Error, Result},
    id::RecordId,
    lifecycle::Persistable,
    repository::{PartitionRepository, Repository, SaveOutcome},
    sync::{self, RwLock},
};

/// A [`Repository`] backed by an ordered in-process map.
///
/// Stored copies are always marked persisted. Readers share the lock; a save
/// or delete takes it exclusively.
#[derive(Debug)]
pub struct MemoryRepository<E> {
    rows: RwLock<BTreeMap<RecordId, E>>,
}

impl<E> Default for MemoryRepository<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> MemoryRepository<E> {
    /// An empty repository.
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(BTreeMap::new()),
        }
    }

    /// Number of stored records.
    ///
    /// # Errors
    ///
    /// Fails only if the lock is poisoned (std locks only).
    pub fn len(&self) -> Result<usize> {
        Ok(sync::read(&self.rows)?.len())
    }

    /// `true` if nothing is stored.
    ///
    /// # Errors
    ///
    /// Fails only if the lock is poisoned (std locks only).
    pub fn is_empty(&self) -> Result<bool> {
        Ok(sync::read(&self.rows)?.is_empty())
    }
}

impl<E> Repository<E> for MemoryRepository<E>
where
    E: Persistable + Clone,
{
    fn get(&self, id: RecordId) -> Result<Option<E>> {
        let rows = sync::read(&self.rows)?;
        Ok(rows.get(&id).cloned().map(|mut row| {
            row.mark_persisted();
            row
        }))
    }

    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all, fields(id = %entity.id())))]
    fn save(&self, entity: &mut E) -> Result<SaveOutcome> {
        let id = entity.id();
        let mut rows = sync::write(&self.rows)?;

        let outcome = if entity.is_new() {
            match rows.entry(id) {
                Entry::Occupied(_) => return Err(Error::DuplicateKey { id }),
                Entry::Vacant(slot) => {
                    let mut stored = entity.clone();
                    stored.mark_persisted();
                    slot.insert(stored);
                }
            }
            SaveOutcome::Inserted
        } else {
            let Some(slot) = rows.get_mut(&id) else {
                return Err(Error::NotFound { id });
            };
            *slot = entity.clone();
            SaveOutcome::Updated
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(?outcome, "saved record");

        entity.mark_persisted();
        Ok(outcome)
    }

    fn delete(&self, id: RecordId) -> Result<Option<E>> {
        Ok(sync::write(&self.rows)?.remove(&id))
    }
}

impl<E> PartitionRepository<E> for MemoryRepository<E>
where
    E: Persistable + PartitionScoped + Clone,
{
    fn list_partition(&self, key: &PartitionKey) -> Result<Vec<E>> {
        let rows = sync::read(&self.rows)?;
        Ok(rows
            .values()
            .filter(|row| row.partition_key() == key)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ColorInfo, ConsumerInfo};

    fn color(seq: u64) -> ColorInfo {
        ColorInfo::new(RecordId::from(42, 7, seq))
    }

    #[test]
    fn new_record_is_inserted_then_updated() {
        let repo = MemoryRepository::<ColorInfo>::new();
        let mut red = color(0);
        red.color_code = Some("RED".to_owned());

        assert_eq!(repo.save(&mut red), Ok(SaveOutcome::Inserted));
        assert!(!red.is_new());

        red.description = Some("Racing red".to_owned());
        assert_eq!(repo.save(&mut red), Ok(SaveOutcome::Updated));

        let loaded = repo.get(red.id()).unwrap().unwrap();
        assert!(!loaded.is_new());
        assert_eq!(loaded.description.as_deref(), Some("Racing red"));
        assert_eq!(repo.len(), Ok(1));
    }

    #[test]
    fn duplicate_insert_leaves_record_new() {
        let repo = MemoryRepository::<ColorInfo>::new();
        let mut first = color(1);
        repo.save(&mut first).unwrap();

        let mut clash = color(1);
        assert_eq!(
            repo.save(&mut clash),
            Err(Error::DuplicateKey { id: clash.id() })
        );
        assert!(clash.is_new());
    }

    #[test]
    fn update_of_missing_row_fails() {
        let repo = MemoryRepository::<ColorInfo>::new();
        let mut row = color(2);
        repo.save(&mut row).unwrap();
        assert_eq!(repo.delete(row.id()).unwrap().map(|r| r.id()), Some(row.id()));

        assert_eq!(repo.save(&mut row), Err(Error::NotFound { id: row.id() }));
        assert!(!row.is_new());
        assert!(repo.is_empty().unwrap());
    }

    #[test]
    fn get_missing_is_none() {
        let repo = MemoryRepository::<ColorInfo>::default();
        assert_eq!(repo.get(RecordId::from(1, 1, 1)), Ok(None));
        assert_eq!(repo.delete(RecordId::from(1, 1, 1)), Ok(None));
    }

    #[test]
    fn list_partition_filters_by_dealer() {
        let repo = MemoryRepository::<ConsumerInfo>::new();
        let d1 = PartitionKey::new("D1").unwrap();
        let d2 = PartitionKey::new("D2").unwrap();

        for (seq, key) in [(0, &d1), (1, &d2), (2, &d1)] {
            let mut row = ConsumerInfo::new(RecordId::from(42, 7, seq), "SITE", key.clone());
            repo.save(&mut row).unwrap();
        }

        let ids: Vec<_> = repo
            .list_partition(&d1)
            .unwrap()
            .iter()
            .map(|row| row.id().sequence())
            .collect();
        assert_eq!(ids, vec![0, 2]);
        assert_eq!(repo.list_partition(&d2).unwrap().len(), 1);
    }
}
