use crate::device::model::{Device, DeviceEdit};
use crate::prelude::{FleetError, FleetResult};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
struct Records {
    order: Vec<String>,
    by_id: HashMap<String, Device>,
}

impl Records {
    fn snapshot(&self) -> Vec<Device> {
        self.order
            .iter()
            .filter_map(|id| self.by_id.get(id).cloned())
            .collect()
    }
}

/// Canonical mapping of device id to device state, in insertion order.
///
/// Every mutation replaces whole records under the write lock, so a snapshot
/// taken by [`DeviceStore::all`] never contains a half-applied change.
#[derive(Default)]
pub struct DeviceStore {
    records: RwLock<Records>,
}

impl DeviceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_devices(devices: impl IntoIterator<Item = Device>) -> FleetResult<Self> {
        let store = Self::new();
        for device in devices {
            store.insert(device)?;
        }
        Ok(store)
    }

    fn read(&self) -> RwLockReadGuard<'_, Records> {
        self.records.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Records> {
        self.records.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Inserts a new record or replaces the existing one with the same id.
    pub fn upsert(&self, device: Device) -> FleetResult<()> {
        device.validate()?;
        let mut records = self.write();
        match records.by_id.get(&device.id) {
            Some(previous) => check_transition(previous, &device)?,
            None => records.order.push(device.id.clone()),
        }
        records.by_id.insert(device.id.clone(), device);
        Ok(())
    }

    /// Inserts a record whose id must not be tracked yet.
    pub fn insert(&self, device: Device) -> FleetResult<()> {
        device.validate()?;
        let mut records = self.write();
        if records.by_id.contains_key(&device.id) {
            return Err(FleetError::DuplicateDevice(device.id));
        }
        records.order.push(device.id.clone());
        records.by_id.insert(device.id.clone(), device);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<Device> {
        self.read().by_id.get(id).cloned()
    }

    /// Consistent snapshot of every record, in insertion order.
    pub fn all(&self) -> Vec<Device> {
        self.read().snapshot()
    }

    pub fn remove(&self, id: &str) -> Option<Device> {
        let mut records = self.write();
        let removed = records.by_id.remove(id)?;
        records.order.retain(|existing| existing != id);
        Some(removed)
    }

    /// Applies a manual edit and returns the replacement record.
    pub fn edit(&self, id: &str, edit: &DeviceEdit) -> FleetResult<Device> {
        let mut records = self.write();
        let current = records
            .by_id
            .get(id)
            .ok_or_else(|| FleetError::UnknownDevice(id.to_string()))?;
        let next = edit.apply(current);
        next.validate()?;
        records.by_id.insert(id.to_string(), next.clone());
        Ok(next)
    }

    /// Replaces every record with `step(record)` as a single atomic write.
    ///
    /// If any replacement breaks a record invariant nothing is written.
    pub fn update_all<F>(&self, mut step: F) -> FleetResult<usize>
    where
        F: FnMut(&Device) -> Device,
    {
        let mut records = self.write();
        let mut replacements = Vec::with_capacity(records.order.len());
        for id in &records.order {
            let Some(current) = records.by_id.get(id) else {
                continue;
            };
            let next = step(current);
            next.validate()?;
            check_transition(current, &next)?;
            replacements.push(next);
        }
        let count = replacements.len();
        for device in replacements {
            records.by_id.insert(device.id.clone(), device);
        }
        Ok(count)
    }

    pub fn len(&self) -> usize {
        self.read().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn check_transition(previous: &Device, next: &Device) -> FleetResult<()> {
    if previous.id != next.id {
        return Err(FleetError::InvariantViolation(format!(
            "device id changed from {} to {}",
            previous.id, next.id
        )));
    }
    if previous.first_seen != next.first_seen {
        return Err(FleetError::InvariantViolation(format!(
            "device {}: firstSeen is immutable",
            next.id
        )));
    }
    if next.last_seen < previous.last_seen {
        return Err(FleetError::InvariantViolation(format!(
            "device {}: lastSeen moved backwards ({} -> {})",
            next.id, previous.last_seen, next.last_seen
        )));
    }
    if next.last_seen > previous.last_seen && !previous.is_online() {
        return Err(FleetError::InvariantViolation(format!(
            "device {}: lastSeen cannot advance while {}",
            next.id, previous.status
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::model::fixtures::device;
    use crate::device::model::DeviceStatus;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn all_preserves_insertion_order() {
        let store = DeviceStore::new();
        for id in ["c", "a", "b"] {
            store.upsert(device(id)).unwrap();
        }
        let ids: Vec<_> = store.all().into_iter().map(|d| d.id).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn upsert_replaces_in_place_without_reordering() {
        let store = DeviceStore::with_devices([device("1"), device("2")]).unwrap();
        let mut renamed = device("1");
        renamed.name = "Renamed".into();
        store.upsert(renamed).unwrap();
        let all = store.all();
        assert_eq!(all[0].name, "Renamed");
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn upsert_rejects_invariant_violations() {
        let store = DeviceStore::new();
        let mut broken = device("1");
        broken.last_seen = broken.first_seen - 1;
        assert!(store.upsert(broken).is_err());
        assert!(store.is_empty());

        store.upsert(device("1")).unwrap();
        let mut rewound = device("1");
        rewound.last_seen -= 10;
        assert!(store.upsert(rewound).is_err());

        let mut reborn = device("1");
        reborn.first_seen += 1;
        assert!(store.upsert(reborn).is_err());
        assert_eq!(store.get("1").unwrap(), device("1"));
    }

    #[test]
    fn last_seen_is_frozen_while_not_online() {
        let store = DeviceStore::new();
        let mut offline = device("1");
        offline.status = DeviceStatus::Offline;
        store.upsert(offline.clone()).unwrap();

        let mut advanced = offline.clone();
        advanced.last_seen += 60_000;
        assert!(matches!(
            store.upsert(advanced),
            Err(FleetError::InvariantViolation(_))
        ));
        assert_eq!(store.get("1").unwrap().last_seen, offline.last_seen);

        let mut online = device("2");
        store.upsert(online.clone()).unwrap();
        online.last_seen += 60_000;
        assert!(store.upsert(online).is_ok());
    }

    #[test]
    fn insert_refuses_duplicates() {
        let store = DeviceStore::new();
        store.insert(device("1")).unwrap();
        assert_eq!(
            store.insert(device("1")),
            Err(FleetError::DuplicateDevice("1".into()))
        );
    }

    #[test]
    fn remove_drops_record_and_order_entry() {
        let store = DeviceStore::with_devices([device("1"), device("2")]).unwrap();
        assert!(store.remove("1").is_some());
        assert!(store.remove("1").is_none());
        assert_eq!(store.all().len(), 1);
        assert!(store.get("1").is_none());
    }

    #[test]
    fn edit_unknown_device_fails() {
        let store = DeviceStore::new();
        let result = store.edit("missing", &DeviceEdit::default());
        assert_eq!(result, Err(FleetError::UnknownDevice("missing".into())));
    }

    #[test]
    fn update_all_is_all_or_nothing() {
        let store = DeviceStore::with_devices([device("1"), device("2")]).unwrap();
        let result = store.update_all(|current| {
            let mut next = current.clone();
            next.signal_strength = -40;
            if next.id == "2" {
                next.last_seen = 0;
            }
            next
        });
        assert!(result.is_err());
        assert!(store.all().iter().all(|d| d.signal_strength == -45));
    }

    #[test]
    fn snapshots_never_observe_partial_updates() {
        let ids: Vec<String> = (0..32).map(|i| i.to_string()).collect();
        let store = Arc::new(
            DeviceStore::with_devices(ids.iter().map(|id| device(id))).unwrap(),
        );

        let writer = {
            let store = store.clone();
            thread::spawn(move || {
                for round in 0..200 {
                    store
                        .update_all(|current| {
                            let mut next = current.clone();
                            next.signal_strength = if round % 2 == 0 { -40 } else { -50 };
                            next.status = DeviceStatus::Online;
                            next
                        })
                        .unwrap();
                }
            })
        };

        for _ in 0..200 {
            let snapshot = store.all();
            let first = snapshot[0].signal_strength;
            assert!(snapshot.iter().all(|d| d.signal_strength == first));
        }
        writer.join().unwrap();
    }
}
