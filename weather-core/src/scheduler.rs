//! Fan-out/fan-in refresh of a whole city list.

use std::{collections::HashMap, sync::Arc, time::Duration};

use tokio::sync::mpsc;

use crate::{model::WeatherRecord, provider::WeatherProvider};

/// Fetch one city, giving up after `timeout`. A timed-out lookup yields an
/// invalid record for `city`.
pub async fn fetch_with_timeout(
    provider: &dyn WeatherProvider,
    city: &str,
    timeout: Duration,
) -> WeatherRecord {
    match tokio::time::timeout(timeout, provider.fetch(city)).await {
        Ok(record) => record,
        Err(_) => {
            tracing::warn!(city, timeout_secs = timeout.as_secs_f64(), "weather lookup timed out");
            WeatherRecord::invalid(city)
        }
    }
}

/// Fetch every city concurrently, one task per name, and collect the results.
///
/// Results arrive through a channel sized to the number of cities and are
/// keyed by each record's own `city_name`; duplicate names resolve to
/// whichever result arrived last. Every task is bounded by `timeout`, so the
/// call returns once each city has produced a record or timed out.
pub async fn refresh_all(
    provider: Arc<dyn WeatherProvider>,
    cities: &[String],
    timeout: Duration,
) -> HashMap<String, WeatherRecord> {
    let mut results = HashMap::with_capacity(cities.len());
    if cities.is_empty() {
        return results;
    }

    let (tx, mut rx) = mpsc::channel(cities.len());

    for city in cities {
        let tx = tx.clone();
        let provider = Arc::clone(&provider);
        let city = city.clone();

        tokio::spawn(async move {
            let record = fetch_with_timeout(provider.as_ref(), &city, timeout).await;
            // The receiver only disappears if the caller was dropped.
            let _ = tx.send(record).await;
        });
    }
    drop(tx);

    for _ in 0..cities.len() {
        match rx.recv().await {
            Some(record) => {
                results.insert(record.city_name.clone(), record);
            }
            None => {
                tracing::warn!(
                    expected = cities.len(),
                    received = results.len(),
                    "refresh task ended without a result"
                );
                break;
            }
        }
    }

    let valid = results.values().filter(|r| r.is_valid).count();
    tracing::info!(cities = cities.len(), valid, "refresh complete");

    results
}
