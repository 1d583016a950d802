//! Generic listing: filter predicate + ordering over any record store.

use std::cmp::Ordering;

use tillpoint_core::Entity;

use crate::store::{RecordStore, StoreError};

/// Records from `store` that satisfy `keep`, sorted by `order`.
///
/// The sort is stable, so records that compare equal keep their store order;
/// orderings should end with a unique tiebreaker for deterministic output.
pub fn list_records<V, S, F, O>(store: &S, keep: F, order: O) -> Result<Vec<V>, StoreError>
where
    V: Entity,
    S: RecordStore<V> + ?Sized,
    F: Fn(&V) -> bool,
    O: Fn(&V, &V) -> Ordering,
{
    let mut records: Vec<V> = store.list()?.into_iter().filter(|r| keep(r)).collect();
    records.sort_by(|a, b| order(a, b));
    Ok(records)
}

/// Ascending by name, then oldest first, then id.
pub fn by_name<V: Entity>(name: impl Fn(&V) -> &str) -> impl Fn(&V, &V) -> Ordering {
    move |a, b| {
        name(a)
            .cmp(name(b))
            .then_with(|| a.created_at().cmp(&b.created_at()))
            .then_with(|| a.id().to_string().cmp(&b.id().to_string()))
    }
}

/// Newest first, then id.
pub fn newest_first<V: Entity>(a: &V, b: &V) -> Ordering {
    b.created_at()
        .cmp(&a.created_at())
        .then_with(|| b.id().to_string().cmp(&a.id().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryRecordStore;
    use chrono::{DateTime, Duration, Utc};
    use tillpoint_core::CategoryId;

    #[derive(Debug, Clone)]
    struct Shelf {
        id: CategoryId,
        name: String,
        active: bool,
        created_at: DateTime<Utc>,
    }

    impl Entity for Shelf {
        type Id = CategoryId;

        fn id(&self) -> &CategoryId {
            &self.id
        }

        fn created_at(&self) -> DateTime<Utc> {
            self.created_at
        }

        fn is_active(&self) -> bool {
            self.active
        }
    }

    fn seeded() -> (InMemoryRecordStore<Shelf>, DateTime<Utc>) {
        let store = InMemoryRecordStore::new();
        let base = Utc::now();
        for (i, (name, active)) in [("Dairy", true), ("Bakery", false), ("Produce", true)]
            .into_iter()
            .enumerate()
        {
            store
                .insert(Shelf {
                    id: CategoryId::new(),
                    name: name.to_string(),
                    active,
                    created_at: base + Duration::seconds(i as i64),
                })
                .unwrap();
        }
        (store, base)
    }

    #[test]
    fn orders_by_name_ascending() {
        let (store, _) = seeded();
        let names: Vec<String> = list_records(&store, |_| true, by_name(|s: &Shelf| s.name.as_str()))
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["Bakery", "Dairy", "Produce"]);
    }

    #[test]
    fn newest_first_orders_by_creation_descending() {
        let (store, _) = seeded();
        let names: Vec<String> = list_records(&store, |_: &Shelf| true, newest_first)
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["Produce", "Bakery", "Dairy"]);
    }

    #[test]
    fn filter_applies_before_ordering() {
        let (store, _) = seeded();
        let active = list_records(&store, |s: &Shelf| s.is_active(), newest_first).unwrap();
        assert_eq!(active.len(), 2);
        assert!(active.iter().all(|s| s.active));
    }

    #[test]
    fn equal_names_fall_back_to_creation_time() {
        let store = InMemoryRecordStore::new();
        let base = Utc::now();
        let older = Shelf {
            id: CategoryId::new(),
            name: "Same".to_string(),
            active: true,
            created_at: base,
        };
        let newer = Shelf {
            id: CategoryId::new(),
            name: "Same".to_string(),
            active: true,
            created_at: base + Duration::seconds(1),
        };
        store.insert(newer.clone()).unwrap();
        store.insert(older.clone()).unwrap();

        let listed = list_records(&store, |_| true, by_name(|s: &Shelf| s.name.as_str())).unwrap();
        assert_eq!(listed[0].id, older.id);
        assert_eq!(listed[1].id, newer.id);
    }
}
