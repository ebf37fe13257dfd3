use crate::config::CorruptStatePolicy;
use crate::errors::{TrackerError, TrackerResult};
use std::path::PathBuf;
use tracing::{debug, info, warn};

mod json_file;
pub mod model;

use json_file::JsonFileGateway;
use model::{RawRecord, Record, RecordId};

/// The read/write boundary for persisted transactions.
pub trait Gateway {
    /// Returns `None` when nothing has been persisted yet.
    fn read(&self) -> TrackerResult<Option<Vec<RawRecord>>>;
    fn write(&self, records: &[RawRecord]) -> TrackerResult<()>;
    fn location(&self) -> String;
    /// Moves unreadable persisted state aside, returning where it went.
    fn quarantine(&self) -> TrackerResult<Option<String>>;
}

pub fn open_store(data_file: PathBuf, policy: CorruptStatePolicy) -> TrackerResult<TransactionStore> {
    TransactionStore::load(Box::new(JsonFileGateway::new(data_file)), policy)
}

#[cfg(test)]
pub fn open_testing_store() -> TransactionStore {
    open_testing_store_with(&testing::MemoryGateway::default())
}

#[cfg(test)]
pub fn open_testing_store_with(gateway: &testing::MemoryGateway) -> TransactionStore {
    TransactionStore::load(Box::new(gateway.clone()), CorruptStatePolicy::Abort)
        .expect("in-memory gateway should load")
}

/// Every record of the session, in insertion order. Each mutation is written back
/// through the gateway before it returns.
pub struct TransactionStore {
    gateway: Box<dyn Gateway>,
    records: Vec<Record>,
    next_id: u64,
}

impl TransactionStore {
    pub fn load(gateway: Box<dyn Gateway>, policy: CorruptStatePolicy) -> TrackerResult<Self> {
        let location = gateway.location();
        let raw_records = match read_records(gateway.as_ref()) {
            Ok(records) => records,
            Err(TrackerError::PersistedStateCorrupt { reason, .. })
                if policy == CorruptStatePolicy::StartEmpty =>
            {
                let moved_to = gateway.quarantine()?;
                warn!(
                    %location,
                    ?moved_to,
                    "persisted transactions are unreadable ({reason}), starting empty"
                );
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        let mut store = TransactionStore {
            gateway,
            records: Vec::with_capacity(raw_records.len()),
            next_id: 0,
        };
        for mut record in raw_records {
            record.id = Some(store.allocate_id());
            store.records.push(record);
        }
        info!(%location, count = store.records.len(), "loaded transactions");
        Ok(store)
    }

    pub fn location(&self) -> String {
        self.gateway.location()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Insertion order.
    pub fn all(&self) -> &[Record] {
        &self.records
    }

    pub fn get(&self, id: RecordId) -> Option<&Record> {
        self.records.iter().find(|r| r.id == Some(id))
    }

    /// The canonical listing: newest date first, ties kept in insertion order.
    /// Positions passed to `delete_at` index into this ordering.
    pub fn list_sorted_by_date_desc(&self) -> Vec<&Record> {
        let mut sorted: Vec<&Record> = self.records.iter().collect();
        sorted.sort_by(|a, b| b.date.cmp(&a.date));
        sorted
    }

    pub fn add(&mut self, mut record: Record) -> TrackerResult<RecordId> {
        let id = self.allocate_id();
        record.id = Some(id);
        self.records.push(record);
        if let Err(e) = self.save() {
            warn!(%id, "rolling back add: {e}");
            self.records.pop();
            return Err(e);
        }
        debug!(%id, count = self.records.len(), "added transaction");
        Ok(id)
    }

    pub fn delete(&mut self, id: RecordId) -> TrackerResult<Record> {
        let index = self
            .records
            .iter()
            .position(|r| r.id == Some(id))
            .ok_or(TrackerError::UnknownRecord(id))?;
        let removed = self.records.remove(index);
        if let Err(e) = self.save() {
            warn!(%id, "rolling back delete: {e}");
            self.records.insert(index, removed);
            return Err(e);
        }
        debug!(%id, count = self.records.len(), "deleted transaction");
        Ok(removed)
    }

    pub fn delete_at(&mut self, position: usize) -> TrackerResult<Record> {
        let id = self
            .list_sorted_by_date_desc()
            .get(position)
            .and_then(|r| r.id)
            .ok_or(TrackerError::PositionOutOfRange {
                position,
                len: self.records.len(),
            })?;
        self.delete(id)
    }

    fn allocate_id(&mut self) -> RecordId {
        self.next_id += 1;
        RecordId(self.next_id)
    }

    fn save(&self) -> TrackerResult<()> {
        let raw: Vec<RawRecord> = self.records.iter().map(RawRecord::from).collect();
        self.gateway.write(&raw)
    }
}

fn read_records(gateway: &dyn Gateway) -> TrackerResult<Vec<Record>> {
    let Some(raw_records) = gateway.read()? else {
        return Ok(Vec::new());
    };
    raw_records
        .into_iter()
        .enumerate()
        .map(|(i, raw)| {
            Record::try_from(raw).map_err(|reason| TrackerError::PersistedStateCorrupt {
                location: gateway.location(),
                reason: format!("entry {i}: {reason}"),
            })
        })
        .collect()
}
