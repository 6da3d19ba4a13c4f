use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument};

use crate::event::{AddressId, Category, Coordinate};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("index {index} is out of range for {len} saved addresses")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("no saved address with id {0}")]
    NotFound(AddressId),
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct AddressRecord {
    pub id: AddressId,
    pub house_number: String,
    pub area: String,
    pub category: Category,
    pub is_favorite: bool,
    pub coordinate: Coordinate,
}

impl AddressRecord {
    /// `"<house>, <area>"`, the row title in the saved list.
    #[must_use]
    pub fn title(&self) -> String {
        format!("{}, {}", self.house_number, self.area)
    }
}

/// Ordered, in-memory list of saved addresses. Positions shift on delete;
/// ids never do.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AddressStore {
    records: Vec<AddressRecord>,
}

impl AddressStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AddressRecord> {
        self.records.iter()
    }

    pub fn records(&self) -> &[AddressRecord] {
        &self.records
    }

    pub fn favorites(&self) -> impl Iterator<Item = &AddressRecord> {
        self.records.iter().filter(|r| r.is_favorite)
    }

    pub fn position(&self, id: &AddressId) -> Option<usize> {
        self.records.iter().position(|r| &r.id == id)
    }

    pub fn get(&self, id: &AddressId) -> Option<&AddressRecord> {
        self.records.iter().find(|r| &r.id == id)
    }

    pub fn get_at(&self, index: usize) -> Option<&AddressRecord> {
        self.records.get(index)
    }

    #[instrument(skip(self, record), fields(id = %record.id))]
    pub fn append(&mut self, record: AddressRecord) {
        self.records.push(record);
        info!(len = self.records.len(), "Address appended");
    }

    /// Replaces the record at `index`. The stored record keeps the id of the
    /// one it replaces.
    #[instrument(skip(self, record))]
    pub fn replace_at(&mut self, index: usize, mut record: AddressRecord) -> Result<(), StoreError> {
        let len = self.records.len();
        let slot = self
            .records
            .get_mut(index)
            .ok_or(StoreError::IndexOutOfRange { index, len })?;
        record.id = slot.id.clone();
        *slot = record;
        info!("Address replaced");
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn delete_at(&mut self, index: usize) -> Result<AddressRecord, StoreError> {
        let len = self.records.len();
        if index >= len {
            return Err(StoreError::IndexOutOfRange { index, len });
        }
        let removed = self.records.remove(index);
        info!(id = %removed.id, "Address deleted");
        Ok(removed)
    }

    /// Flips `is_favorite` on one record and returns the new value.
    #[instrument(skip(self))]
    pub fn toggle_favorite_at(&mut self, index: usize) -> Result<bool, StoreError> {
        let len = self.records.len();
        let record = self
            .records
            .get_mut(index)
            .ok_or(StoreError::IndexOutOfRange { index, len })?;
        record.is_favorite = !record.is_favorite;
        Ok(record.is_favorite)
    }

    fn index_of(&self, id: &AddressId) -> Result<usize, StoreError> {
        self.position(id).ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    pub fn replace(&mut self, id: &AddressId, record: AddressRecord) -> Result<(), StoreError> {
        let index = self.index_of(id)?;
        self.replace_at(index, record)
    }

    pub fn delete(&mut self, id: &AddressId) -> Result<AddressRecord, StoreError> {
        let index = self.index_of(id)?;
        self.delete_at(index)
    }

    pub fn toggle_favorite(&mut self, id: &AddressId) -> Result<bool, StoreError> {
        let index = self.index_of(id)?;
        self.toggle_favorite_at(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use proptest::prelude::*;

    fn record(house: &str) -> AddressRecord {
        AddressRecord {
            id: AddressId::generate(),
            house_number: house.into(),
            area: "Elm St".into(),
            category: Category::Home,
            is_favorite: false,
            coordinate: Coordinate::new(28.6139, 77.2090).unwrap(),
        }
    }

    fn houses(store: &AddressStore) -> Vec<&str> {
        store.iter().map(|r| r.house_number.as_str()).collect()
    }

    #[test]
    fn test_append_preserves_insertion_order() {
        let mut store = AddressStore::new();
        store.append(record("1"));
        store.append(record("2"));
        store.append(record("3"));
        assert_eq!(houses(&store), ["1", "2", "3"]);
    }

    #[test]
    fn test_delete_shifts_later_records_down() {
        let mut store = AddressStore::new();
        store.append(record("1"));
        store.append(record("2"));
        store.append(record("3"));

        let removed = store.delete_at(1).unwrap();
        assert_eq!(removed.house_number, "2");
        assert_eq!(houses(&store), ["1", "3"]);
        assert_eq!(store.get_at(1).unwrap().house_number, "3");
    }

    #[test]
    fn test_delete_single_element_empties_store() {
        let mut store = AddressStore::new();
        store.append(record("12"));
        store.delete_at(0).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_out_of_range_operations_leave_store_untouched() {
        let mut store = AddressStore::new();
        store.append(record("1"));
        let before = store.clone();

        assert_matches!(
            store.delete_at(1),
            Err(StoreError::IndexOutOfRange { index: 1, len: 1 })
        );
        assert_matches!(
            store.replace_at(5, record("x")),
            Err(StoreError::IndexOutOfRange { index: 5, len: 1 })
        );
        assert_matches!(
            store.toggle_favorite_at(1),
            Err(StoreError::IndexOutOfRange { .. })
        );
        assert_eq!(store, before);
    }

    #[test]
    fn test_replace_keeps_slot_id_and_length() {
        let mut store = AddressStore::new();
        store.append(record("1"));
        store.append(record("2"));
        let original_id = store.get_at(0).unwrap().id.clone();

        let mut replacement = record("1A");
        replacement.category = Category::Office;
        store.replace_at(0, replacement).unwrap();

        assert_eq!(store.len(), 2);
        let replaced = store.get_at(0).unwrap();
        assert_eq!(replaced.id, original_id);
        assert_eq!(replaced.house_number, "1A");
        assert_eq!(replaced.category, Category::Office);
        assert_eq!(store.get_at(1).unwrap().house_number, "2");
    }

    #[test]
    fn test_toggle_favorite_flips_exactly_one() {
        let mut store = AddressStore::new();
        store.append(record("1"));
        store.append(record("2"));
        store.append(record("3"));

        assert!(store.toggle_favorite_at(1).unwrap());
        let flags: Vec<bool> = store.iter().map(|r| r.is_favorite).collect();
        assert_eq!(flags, [false, true, false]);
        assert_eq!(store.favorites().count(), 1);

        assert!(!store.toggle_favorite_at(1).unwrap());
        assert!(store.iter().all(|r| !r.is_favorite));
    }

    #[test]
    fn test_id_operations_follow_shifted_positions() {
        let mut store = AddressStore::new();
        store.append(record("1"));
        store.append(record("2"));
        store.append(record("3"));
        let third = store.get_at(2).unwrap().id.clone();

        store.delete_at(0).unwrap();
        assert_eq!(store.position(&third), Some(1));

        store.toggle_favorite(&third).unwrap();
        assert!(store.get(&third).unwrap().is_favorite);

        let gone = store.delete(&third).unwrap();
        assert_eq!(gone.house_number, "3");
        assert_matches!(store.toggle_favorite(&third), Err(StoreError::NotFound(_)));
        assert_matches!(store.replace(&third, record("x")), Err(StoreError::NotFound(_)));
    }

    #[test]
    fn test_record_title() {
        assert_eq!(record("12").title(), "12, Elm St");
    }

    #[derive(Debug, Clone)]
    enum Op {
        Append,
        Delete(usize),
        Replace(usize),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            Just(Op::Append),
            (0usize..12).prop_map(Op::Delete),
            (0usize..12).prop_map(Op::Replace),
        ]
    }

    proptest! {
        #[test]
        fn prop_length_and_order_track_a_reference_list(ops in prop::collection::vec(op_strategy(), 0..64)) {
            let mut store = AddressStore::new();
            let mut reference: Vec<String> = Vec::new();
            let mut appends = 0usize;
            let mut deletes = 0usize;

            for (step, op) in ops.into_iter().enumerate() {
                match op {
                    Op::Append => {
                        let label = format!("h{step}");
                        store.append(record(&label));
                        reference.push(label);
                        appends += 1;
                    }
                    Op::Delete(i) => {
                        let result = store.delete_at(i);
                        if i < reference.len() {
                            prop_assert!(result.is_ok());
                            reference.remove(i);
                            deletes += 1;
                        } else {
                            prop_assert!(result.is_err());
                        }
                    }
                    Op::Replace(i) => {
                        let label = format!("r{step}");
                        let result = store.replace_at(i, record(&label));
                        if i < reference.len() {
                            prop_assert!(result.is_ok());
                            reference[i] = label;
                        } else {
                            prop_assert!(result.is_err());
                        }
                    }
                }
            }

            prop_assert_eq!(store.len(), appends - deletes);
            prop_assert_eq!(houses(&store), reference.iter().map(String::as_str).collect::<Vec<_>>());
        }

        #[test]
        fn prop_double_toggle_is_identity(len in 1usize..10, pick in 0usize..10) {
            let mut store = AddressStore::new();
            for i in 0..len {
                store.append(record(&i.to_string()));
            }
            let index = pick % len;
            let before = store.clone();

            store.toggle_favorite_at(index).unwrap();
            let changed = store
                .iter()
                .zip(before.iter())
                .filter(|(a, b)| a.is_favorite != b.is_favorite)
                .count();
            prop_assert_eq!(changed, 1);

            store.toggle_favorite_at(index).unwrap();
            prop_assert_eq!(store, before);
        }
    }
}
