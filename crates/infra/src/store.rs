use std::collections::HashMap;
use std::sync::RwLock;

use thiserror::Error;

use tillpoint_core::Entity;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A unique field already holds this value on another record.
    #[error("duplicate value for unique field '{field}'")]
    Conflict { field: &'static str },

    #[error("record not found")]
    NotFound,

    /// A record with this id already exists.
    #[error("record already exists")]
    AlreadyExists,

    #[error("store lock poisoned")]
    Poisoned,
}

/// Keyed record storage. There is deliberately no delete operation.
pub trait RecordStore<V: Entity>: Send + Sync {
    fn get(&self, id: &V::Id) -> Option<V>;

    fn contains(&self, id: &V::Id) -> bool {
        self.get(id).is_some()
    }

    /// All records, in no particular order.
    fn list(&self) -> Result<Vec<V>, StoreError>;

    fn insert(&self, record: V) -> Result<(), StoreError>;

    /// Mutate one record in place, atomically with respect to other writers.
    ///
    /// The closure's error aborts the update and leaves the record untouched.
    fn update<E, F>(&self, id: &V::Id, apply: F) -> Result<V, E>
    where
        E: From<StoreError>,
        F: FnOnce(&mut V) -> Result<(), E>;
}

/// Extracts the value of a unique column from a record.
type UniqueKey<V> = fn(&V) -> String;

/// In-memory record store with an optional single unique column.
pub struct InMemoryRecordStore<V: Entity> {
    inner: RwLock<HashMap<V::Id, V>>,
    unique: Option<(&'static str, UniqueKey<V>)>,
}

impl<V: Entity> InMemoryRecordStore<V> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
            unique: None,
        }
    }

    /// Enforce uniqueness of `key(record)` under the name `field`.
    ///
    /// Keys are compared case-insensitively.
    pub fn with_unique(field: &'static str, key: UniqueKey<V>) -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
            unique: Some((field, key)),
        }
    }

    fn check_unique(&self, map: &HashMap<V::Id, V>, candidate: &V) -> Result<(), StoreError> {
        let Some((field, key)) = self.unique else {
            return Ok(());
        };
        let wanted = key(candidate).to_lowercase();
        let clash = map
            .values()
            .any(|existing| existing.id() != candidate.id() && key(existing).to_lowercase() == wanted);
        if clash {
            Err(StoreError::Conflict { field })
        } else {
            Ok(())
        }
    }
}

impl<V: Entity + Clone> InMemoryRecordStore<V> {
    /// Look a record up by its unique column (case-insensitive).
    pub fn find_unique(&self, value: &str) -> Option<V> {
        let (_, key) = self.unique?;
        let wanted = value.to_lowercase();
        let map = self.inner.read().ok()?;
        map.values().find(|v| key(v).to_lowercase() == wanted).cloned()
    }
}

impl<V: Entity> Default for InMemoryRecordStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> RecordStore<V> for InMemoryRecordStore<V>
where
    V: Entity + Clone + Send + Sync + 'static,
{
    fn get(&self, id: &V::Id) -> Option<V> {
        let map = self.inner.read().ok()?;
        map.get(id).cloned()
    }

    fn list(&self) -> Result<Vec<V>, StoreError> {
        let map = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(map.values().cloned().collect())
    }

    fn insert(&self, record: V) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        if map.contains_key(record.id()) {
            return Err(StoreError::AlreadyExists);
        }
        self.check_unique(&map, &record)?;
        map.insert(*record.id(), record);
        Ok(())
    }

    fn update<E, F>(&self, id: &V::Id, apply: F) -> Result<V, E>
    where
        E: From<StoreError>,
        F: FnOnce(&mut V) -> Result<(), E>,
    {
        let mut map = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        let mut draft = map.get(id).cloned().ok_or(StoreError::NotFound)?;
        apply(&mut draft)?;
        self.check_unique(&map, &draft)?;
        map.insert(*id, draft.clone());
        Ok(draft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use tillpoint_core::UnitId;

    #[derive(Debug, Clone, PartialEq)]
    struct Tag {
        id: UnitId,
        label: String,
        created_at: DateTime<Utc>,
    }

    impl Entity for Tag {
        type Id = UnitId;

        fn id(&self) -> &UnitId {
            &self.id
        }

        fn created_at(&self) -> DateTime<Utc> {
            self.created_at
        }

        fn is_active(&self) -> bool {
            true
        }
    }

    fn tag(label: &str) -> Tag {
        Tag {
            id: UnitId::new(),
            label: label.to_string(),
            created_at: Utc::now(),
        }
    }

    fn unique_store() -> InMemoryRecordStore<Tag> {
        InMemoryRecordStore::with_unique("label", |t: &Tag| t.label.clone())
    }

    #[test]
    fn insert_then_get() {
        let store = InMemoryRecordStore::new();
        let t = tag("kg");
        store.insert(t.clone()).unwrap();
        assert_eq!(store.get(&t.id), Some(t.clone()));
        assert!(store.contains(&t.id));
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn get_missing_is_none() {
        let store: InMemoryRecordStore<Tag> = InMemoryRecordStore::new();
        assert!(store.get(&UnitId::new()).is_none());
    }

    #[test]
    fn duplicate_id_rejected() {
        let store = InMemoryRecordStore::new();
        let t = tag("kg");
        store.insert(t.clone()).unwrap();
        assert_eq!(store.insert(t), Err(StoreError::AlreadyExists));
    }

    #[test]
    fn unique_column_enforced_case_insensitively() {
        let store = unique_store();
        store.insert(tag("Box")).unwrap();
        assert_eq!(
            store.insert(tag("box")),
            Err(StoreError::Conflict { field: "label" })
        );
        assert_eq!(store.list().unwrap().len(), 1);
        assert!(store.find_unique("BOX").is_some());
    }

    #[test]
    fn update_applies_atomically() {
        let store = InMemoryRecordStore::new();
        let t = tag("kg");
        store.insert(t.clone()).unwrap();

        let updated: Tag = store
            .update(&t.id, |rec: &mut Tag| -> Result<(), StoreError> {
                rec.label = "gram".to_string();
                Ok(())
            })
            .unwrap();
        assert_eq!(updated.label, "gram");
        assert_eq!(store.get(&t.id).unwrap().label, "gram");
    }

    #[test]
    fn failed_update_leaves_record_untouched() {
        let store = InMemoryRecordStore::new();
        let t = tag("kg");
        store.insert(t.clone()).unwrap();

        let result: Result<Tag, StoreError> = store.update(&t.id, |rec: &mut Tag| {
            rec.label = "changed".to_string();
            Err(StoreError::Poisoned)
        });
        assert!(result.is_err());
        assert_eq!(store.get(&t.id), Some(t));
    }

    #[test]
    fn update_cannot_steal_unique_value() {
        let store = unique_store();
        let a = tag("a");
        let b = tag("b");
        store.insert(a).unwrap();
        store.insert(b.clone()).unwrap();

        let result: Result<Tag, StoreError> = store.update(&b.id, |rec: &mut Tag| {
            rec.label = "A".to_string();
            Ok(())
        });
        assert_eq!(result, Err(StoreError::Conflict { field: "label" }));
        assert_eq!(store.get(&b.id).unwrap().label, "b");
    }

    #[test]
    fn poisoned_lock_is_an_error_not_an_empty_table() {
        let store = std::sync::Arc::new(InMemoryRecordStore::<Tag>::new());
        store.insert(tag("kg")).unwrap();

        let writer = store.clone();
        let _ = std::thread::spawn(move || {
            let _guard = writer.inner.write().unwrap();
            panic!("writer died holding the lock");
        })
        .join();

        assert_eq!(store.list(), Err(StoreError::Poisoned));
        assert_eq!(store.insert(tag("g")), Err(StoreError::Poisoned));
    }

    #[test]
    fn update_missing_is_not_found() {
        let store: InMemoryRecordStore<Tag> = InMemoryRecordStore::new();
        let result: Result<Tag, StoreError> = store.update(&UnitId::new(), |_| Ok(()));
        assert_eq!(result, Err(StoreError::NotFound));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Whatever order inserts arrive in, each key is held at most once.
            #[test]
            fn unique_column_holds_each_key_once(
                labels in prop::collection::vec("[a-dA-D]{1,2}", 0..40),
            ) {
                let store = unique_store();
                let mut accepted = std::collections::HashSet::new();
                for label in &labels {
                    let inserted = store.insert(tag(label)).is_ok();
                    prop_assert_eq!(inserted, accepted.insert(label.to_lowercase()));
                }
                prop_assert_eq!(store.list().unwrap().len(), accepted.len());
            }

            /// A failed update never changes the stored record.
            #[test]
            fn rejected_update_leaves_record_intact(label in "[a-z]{1,12}", next in "[a-z]{1,12}") {
                let store = InMemoryRecordStore::new();
                let t = tag(&label);
                store.insert(t.clone()).unwrap();

                let result: Result<Tag, StoreError> = store.update(&t.id, |rec: &mut Tag| {
                    rec.label = next.clone();
                    Err(StoreError::NotFound)
                });
                prop_assert!(result.is_err());
                prop_assert_eq!(store.get(&t.id), Some(t));
            }
        }
    }
}
