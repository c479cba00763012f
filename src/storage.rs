use crate::error::Result;
use crate::types::{CompanyRecord, RawRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use tracing::debug;
use uuid::Uuid;

/// A batch of raw records as fetched from one collector run.
#[derive(Debug, Clone)]
pub struct RawBatch {
    pub id: Option<Uuid>,
    pub source_name: String,
    pub records: Vec<RawRecord>,
    pub collected_at: DateTime<Utc>,
}

/// The canonical roster produced by one pipeline run.
#[derive(Debug, Clone)]
pub struct RosterSnapshot {
    pub id: Option<Uuid>,
    pub run_id: Uuid,
    pub companies: Vec<CompanyRecord>,
    pub saved_at: DateTime<Utc>,
}

/// Storage trait for persisting collected and processed roster data.
/// Downstream exporters (CSV, spreadsheets) consume from here; the core
/// pipeline only requires that records round-trip as flat mappings.
#[async_trait]
pub trait Storage: Send + Sync {
    // Raw batch operations
    async fn save_raw_batch(&self, batch: &mut RawBatch) -> Result<()>;
    async fn raw_batches_for_source(&self, source_name: &str) -> Result<Vec<RawBatch>>;
    async fn all_raw_records(&self) -> Result<Vec<RawRecord>>;

    // Roster operations
    async fn save_roster(&self, snapshot: &mut RosterSnapshot) -> Result<()>;
    async fn latest_roster(&self) -> Result<Option<RosterSnapshot>>;
}

/// In-memory storage implementation for development/testing
pub struct InMemoryStorage {
    batches: Arc<Mutex<Vec<RawBatch>>>,
    rosters: Arc<Mutex<Vec<RosterSnapshot>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self {
            batches: Arc::new(Mutex::new(Vec::new())),
            rosters: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn save_raw_batch(&self, batch: &mut RawBatch) -> Result<()> {
        let id = Uuid::new_v4();
        batch.id = Some(id);

        let mut batches = self.batches.lock().unwrap();
        batches.push(batch.clone());

        debug!(
            "Stored raw batch from {} with {} records as {}",
            batch.source_name,
            batch.records.len(),
            id
        );
        Ok(())
    }

    async fn raw_batches_for_source(&self, source_name: &str) -> Result<Vec<RawBatch>> {
        let batches = self.batches.lock().unwrap();
        Ok(batches
            .iter()
            .filter(|batch| batch.source_name == source_name)
            .cloned()
            .collect())
    }

    async fn all_raw_records(&self) -> Result<Vec<RawRecord>> {
        let batches = self.batches.lock().unwrap();
        // Batch insertion order, then record order within each batch
        Ok(batches
            .iter()
            .flat_map(|batch| batch.records.iter().cloned())
            .collect())
    }

    async fn save_roster(&self, snapshot: &mut RosterSnapshot) -> Result<()> {
        let id = Uuid::new_v4();
        snapshot.id = Some(id);

        let mut rosters = self.rosters.lock().unwrap();
        rosters.push(snapshot.clone());

        debug!(
            "Stored roster snapshot for run {} with {} companies",
            snapshot.run_id,
            snapshot.companies.len()
        );
        Ok(())
    }

    async fn latest_roster(&self) -> Result<Option<RosterSnapshot>> {
        let rosters = self.rosters.lock().unwrap();
        Ok(rosters.last().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_raw_batches_round_trip_in_order() {
        let storage = InMemoryStorage::new();

        let mut first = RawBatch {
            id: None,
            source_name: "demo".to_string(),
            records: vec![json!({"name": "LBL"})],
            collected_at: Utc::now(),
        };
        let mut second = RawBatch {
            id: None,
            source_name: "demo".to_string(),
            records: vec![json!({"name": "Креон"})],
            collected_at: Utc::now(),
        };

        storage.save_raw_batch(&mut first).await.unwrap();
        storage.save_raw_batch(&mut second).await.unwrap();
        assert!(first.id.is_some());

        let records = storage.all_raw_records().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["name"], "LBL");
        assert_eq!(records[1]["name"], "Креон");

        let demo_batches = storage.raw_batches_for_source("demo").await.unwrap();
        assert_eq!(demo_batches.len(), 2);
        assert!(storage
            .raw_batches_for_source("other")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_latest_roster() {
        let storage = InMemoryStorage::new();
        assert!(storage.latest_roster().await.unwrap().is_none());

        let mut snapshot = RosterSnapshot {
            id: None,
            run_id: Uuid::new_v4(),
            companies: Vec::new(),
            saved_at: Utc::now(),
        };
        storage.save_roster(&mut snapshot).await.unwrap();

        let latest = storage.latest_roster().await.unwrap().unwrap();
        assert_eq!(latest.run_id, snapshot.run_id);
    }
}
