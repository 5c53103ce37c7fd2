//! The narrow interface the display layer drives: refresh now, add a city,
//! save, and start the background refresher.

use std::{sync::Arc, time::Duration};

use crate::{
    catalog::CityCatalog,
    city_list::CityListFile,
    error::CityListError,
    model::WeatherRecord,
    provider::WeatherProvider,
    refresher::{Refresher, RefresherHandle, Selection},
    scheduler::{fetch_with_timeout, refresh_all},
};

/// Result of [`Session::add_city`].
#[derive(Debug, Clone, PartialEq)]
pub enum AddCity {
    /// The lookup succeeded; the city was appended, stored and persisted.
    Added(WeatherRecord),
    /// The lookup failed (unknown city or API down); nothing changed.
    Rejected(WeatherRecord),
}

#[derive(Debug, Clone)]
pub struct Session {
    provider: Arc<dyn WeatherProvider>,
    catalog: CityCatalog,
    city_file: CityListFile,
    timeout: Duration,
}

impl Session {
    /// Load the city list and build an empty-record catalog from it. Fails if
    /// the list cannot be read.
    pub fn open(
        provider: Arc<dyn WeatherProvider>,
        city_file: CityListFile,
        timeout: Duration,
    ) -> Result<Self, CityListError> {
        let names = city_file.load()?;
        tracing::info!(path = %city_file.path().display(), cities = names.len(), "loaded city list");

        Ok(Self { provider, catalog: CityCatalog::with_names(names), city_file, timeout })
    }

    /// Read handle to the shared catalog.
    pub fn catalog(&self) -> &CityCatalog {
        &self.catalog
    }

    pub fn city_file(&self) -> &CityListFile {
        &self.city_file
    }

    /// Fetch every city in the catalog concurrently and store the results.
    /// Returns how many came back valid.
    pub async fn refresh_now(&self) -> usize {
        let names = self.catalog.names();
        let results = refresh_all(Arc::clone(&self.provider), &names, self.timeout).await;
        let valid = results.values().filter(|r| r.is_valid).count();
        self.catalog.merge(results.into_values());
        valid
    }

    /// Fetch a single city; on success append it, store its record and persist
    /// the list. A failed lookup leaves catalog and file untouched.
    pub async fn add_city(&self, name: &str) -> Result<AddCity, CityListError> {
        let name = name.trim();
        if name.is_empty() {
            tracing::warn!("refusing to add an empty city name");
            return Ok(AddCity::Rejected(WeatherRecord::invalid(name)));
        }

        let record = fetch_with_timeout(self.provider.as_ref(), name, self.timeout).await;
        if !record.is_valid {
            tracing::warn!(city = name, "city not added: lookup failed");
            return Ok(AddCity::Rejected(record));
        }

        self.catalog.push_name(name);
        self.catalog.upsert(record.clone());
        self.save()?;

        tracing::info!(city = name, "city added");
        Ok(AddCity::Added(record))
    }

    /// Write the current city list back to disk.
    pub fn save(&self) -> Result<(), CityListError> {
        self.city_file.save(&self.catalog.names())
    }

    /// Start refreshing whatever `selection` names every `interval`.
    pub fn spawn_refresher(&self, selection: Selection, interval: Duration) -> RefresherHandle {
        Refresher::new(
            Arc::clone(&self.provider),
            self.catalog.clone(),
            selection,
            interval,
            self.timeout,
        )
        .spawn()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::fs;

    /// Knows a fixed set of cities; everything else is invalid.
    #[derive(Debug)]
    struct KnownCities(Vec<&'static str>);

    #[async_trait]
    impl WeatherProvider for KnownCities {
        async fn fetch(&self, city: &str) -> WeatherRecord {
            let mut record = WeatherRecord::invalid(city);
            record.is_valid = self.0.iter().any(|known| *known == city);
            record
        }
    }

    fn session_with(contents: &str, known: Vec<&'static str>) -> (tempfile::TempDir, Session) {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("cities.txt");
        fs::write(&path, contents).expect("seed file");

        let session = Session::open(
            Arc::new(KnownCities(known)),
            CityListFile::new(path),
            Duration::from_secs(5),
        )
        .expect("open session");
        (dir, session)
    }

    #[test]
    fn open_fails_without_city_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let result = Session::open(
            Arc::new(KnownCities(vec![])),
            CityListFile::new(dir.path().join("missing.txt")),
            Duration::from_secs(5),
        );

        assert!(matches!(result, Err(CityListError::Read { .. })));
    }

    #[tokio::test]
    async fn refresh_now_fills_every_city() {
        let (_dir, session) = session_with("Tucson\nKochi\nAtlantis", vec!["Tucson", "Kochi"]);

        let valid = session.refresh_now().await;

        assert_eq!(valid, 2);
        let records = session.catalog().records();
        assert_eq!(records.len(), 3);
        assert!(!records["Atlantis"].is_valid);
    }

    #[tokio::test]
    async fn add_city_persists_on_success() {
        let (_dir, session) = session_with("Tucson", vec!["Tucson", "Kochi"]);

        let outcome = session.add_city(" Kochi ").await.expect("add");

        assert!(matches!(outcome, AddCity::Added(ref r) if r.city_name == "Kochi"));
        assert_eq!(session.catalog().names(), vec!["Tucson", "Kochi"]);
        assert!(session.catalog().get("Kochi").is_some());
        let on_disk = fs::read_to_string(session.city_file().path()).expect("read back");
        assert_eq!(on_disk, "Tucson\nKochi");
    }

    #[tokio::test]
    async fn add_city_leaves_everything_alone_on_failed_lookup() {
        let (_dir, session) = session_with("Tucson", vec!["Tucson"]);

        let outcome = session.add_city("Atlantis").await.expect("add");

        assert!(matches!(outcome, AddCity::Rejected(ref r) if !r.is_valid));
        assert_eq!(session.catalog().names(), vec!["Tucson"]);
        assert!(session.catalog().get("Atlantis").is_none());
        let on_disk = fs::read_to_string(session.city_file().path()).expect("read back");
        assert_eq!(on_disk, "Tucson");
    }

    #[tokio::test]
    async fn add_city_rejects_blank_names_without_fetching() {
        let (_dir, session) = session_with("Tucson", vec![""]);

        let outcome = session.add_city("   ").await.expect("add");

        assert!(matches!(outcome, AddCity::Rejected(_)));
        assert_eq!(session.catalog().len(), 1);
    }
}
