use crate::{Config, WeatherRecord, provider::weatherapi::WeatherApiProvider};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod weatherapi;

/// A source of weather records.
///
/// `fetch` is a best-effort lookup: failures are logged by the implementation
/// and reported as a record with `is_valid == false`, never as an error.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch(&self, city: &str) -> WeatherRecord;
}

/// Construct the weatherapi.com client from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    provider_with_key(config, config.resolve_api_key())
}

fn provider_with_key(
    config: &Config,
    api_key: Option<String>,
) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    let api_key = api_key.ok_or_else(|| {
        anyhow::anyhow!(
            "No weatherapi.com API key configured.\n\
                 Hint: run `cityweather configure` or set CITYWEATHER_API_KEY."
        )
    })?;

    let provider = WeatherApiProvider::new(api_key).with_base_url(config.base_url());

    Ok(Arc::new(provider))
}
