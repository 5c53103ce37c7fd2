//! Shared city catalog: ordered city names plus the latest record per city.
//!
//! Cloning a [`CityCatalog`] hands out another handle to the same state. All
//! writes replace a whole record under one short write lock, so readers never
//! see a half-updated record.

use std::{collections::HashMap, sync::Arc};

use parking_lot::RwLock;

use crate::model::WeatherRecord;

#[derive(Debug, Default)]
struct CatalogState {
    names: Vec<String>,
    records: HashMap<String, WeatherRecord>,
}

#[derive(Debug, Clone, Default)]
pub struct CityCatalog {
    state: Arc<RwLock<CatalogState>>,
}

impl CityCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog seeded with a city list and no records yet.
    pub fn with_names(names: Vec<String>) -> Self {
        Self {
            state: Arc::new(RwLock::new(CatalogState { names, records: HashMap::new() })),
        }
    }

    /// City names in display order.
    pub fn names(&self) -> Vec<String> {
        self.state.read().names.clone()
    }

    /// Append a name. Duplicates are kept.
    pub fn push_name(&self, name: impl Into<String>) {
        self.state.write().names.push(name.into());
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.state.read().names.iter().any(|n| n == name)
    }

    /// Replace the record stored under `record.city_name`.
    pub fn upsert(&self, record: WeatherRecord) {
        self.state.write().records.insert(record.city_name.clone(), record);
    }

    /// Replace every record in `records`, keyed by each record's own name.
    pub fn merge(&self, records: impl IntoIterator<Item = WeatherRecord>) {
        let mut state = self.state.write();
        for record in records {
            state.records.insert(record.city_name.clone(), record);
        }
    }

    pub fn get(&self, city: &str) -> Option<WeatherRecord> {
        self.state.read().records.get(city).cloned()
    }

    /// Snapshot of all records.
    pub fn records(&self) -> HashMap<String, WeatherRecord> {
        self.state.read().records.clone()
    }

    /// Number of city names (not records).
    pub fn len(&self) -> usize {
        self.state.read().names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().names.is_empty()
    }
}
