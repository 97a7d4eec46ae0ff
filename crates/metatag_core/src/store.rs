use std::collections::BTreeMap;

use thiserror::Error;

use crate::model::DefaultsRecord;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("invalid record {id}: {message}")]
    InvalidRecord { id: String, message: String },
}

impl StoreError {
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        StoreError::Backend(Box::new(err))
    }
}

/// Key-value persistence for defaults records. Loads must be repeatable within a request.
pub trait DefaultsStore {
    fn get(&self, id: &str) -> Result<Option<DefaultsRecord>, StoreError>;
    fn list(&self) -> Result<Vec<DefaultsRecord>, StoreError>;
    fn save(&mut self, record: DefaultsRecord) -> Result<(), StoreError>;
    fn delete(&mut self, id: &str) -> Result<bool, StoreError>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryDefaultsStore {
    records: BTreeMap<String, DefaultsRecord>,
}

impl MemoryDefaultsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: impl IntoIterator<Item = DefaultsRecord>) -> Self {
        Self {
            records: records
                .into_iter()
                .map(|record| (record.id.clone(), record))
                .collect(),
        }
    }
}

impl DefaultsStore for MemoryDefaultsStore {
    fn get(&self, id: &str) -> Result<Option<DefaultsRecord>, StoreError> {
        Ok(self.records.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<DefaultsRecord>, StoreError> {
        Ok(self.records.values().cloned().collect())
    }

    fn save(&mut self, record: DefaultsRecord) -> Result<(), StoreError> {
        validate_record(&record)?;
        self.records.insert(record.id.clone(), record);
        Ok(())
    }

    fn delete(&mut self, id: &str) -> Result<bool, StoreError> {
        Ok(self.records.remove(id).is_some())
    }
}

pub fn validate_record(record: &DefaultsRecord) -> Result<(), StoreError> {
    let invalid = |message: &str| StoreError::InvalidRecord {
        id: record.id.clone(),
        message: message.to_string(),
    };
    if record.id.trim().is_empty() {
        return Err(invalid("id must not be empty"));
    }
    if record.id.chars().any(char::is_whitespace) {
        return Err(invalid("id must not contain whitespace"));
    }
    if record.id.starts_with("__") || record.id.ends_with("__") {
        return Err(invalid("bundle ids need both an entity type and a bundle"));
    }
    Ok(())
}
