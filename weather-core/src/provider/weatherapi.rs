use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    error::FetchError,
    model::{CurrentConditions, FORECAST_DAYS, ForecastDay, WeatherRecord},
};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "http://api.weatherapi.com/v1";

/// Client for weatherapi.com: one `current.json` call followed by one
/// `forecast.json` call per lookup.
#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl WeatherApiProvider {
    pub fn new(api_key: String) -> Self {
        Self { api_key, base_url: DEFAULT_BASE_URL.to_string(), http: Client::new() }
    }

    /// Point the client at another host, e.g. a local mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn get_body(&self, endpoint: &str, city: &str, extra: &[(&str, &str)]) -> Result<String, FetchError> {
        let url = format!("{}/{}", self.base_url, endpoint);

        tracing::debug!(%url, city, "requesting weatherapi");

        let res = self
            .http
            .get(&url)
            .query(&[("key", self.api_key.as_str()), ("q", city)])
            .query(extra)
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(FetchError::Status { status, body: truncate_body(&body) });
        }

        Ok(body)
    }

    async fn fetch_current(&self, city: &str) -> Result<CurrentConditions, FetchError> {
        let body = self.get_body("current.json", city, &[]).await?;
        let parsed: WaCurrentResponse = serde_json::from_str(&body)?;
        let current = parsed.current;

        Ok(CurrentConditions {
            temp_c: current.temp_c,
            temp_f: current.temp_f,
            humidity_pct: current.humidity,
            wind_mph: current.wind_mph,
            wind_kph: current.wind_kph,
            wind_dir: current.wind_dir,
            precip_in: current.precip_in,
            precip_mm: current.precip_mm,
            pressure_hpa: current.pressure_mb,
            uv: current.uv,
            condition: current.condition.text,
            icon: icon_id(&current.condition.icon),
        })
    }

    async fn fetch_forecast(&self, city: &str) -> Result<[ForecastDay; FORECAST_DAYS], FetchError> {
        let days = FORECAST_DAYS.to_string();
        let body = self.get_body("forecast.json", city, &[("days", days.as_str())]).await?;
        let parsed: WaForecastResponse = serde_json::from_str(&body)?;

        let mut forecast: [ForecastDay; FORECAST_DAYS] = Default::default();
        for (i, slot) in forecast.iter_mut().enumerate() {
            let entry = parsed
                .forecast
                .forecastday
                .get(i)
                .ok_or(FetchError::MissingForecastDay(i + 1))?;

            *slot = ForecastDay {
                day: (i + 1) as u8,
                avg_temp_c: entry.day.avgtemp_c,
                avg_temp_f: entry.day.avgtemp_f,
                condition: entry.day.condition.text.clone(),
                icon: icon_id(&entry.day.condition.icon),
            };
        }

        Ok(forecast)
    }

    async fn try_fetch(&self, city: &str) -> Result<WeatherRecord, FetchError> {
        let current = self.fetch_current(city).await?;
        let forecast = self.fetch_forecast(city).await?;
        Ok(WeatherRecord::complete(city, current, forecast))
    }
}

#[async_trait]
impl WeatherProvider for WeatherApiProvider {
    async fn fetch(&self, city: &str) -> WeatherRecord {
        match self.try_fetch(city).await {
            Ok(record) => record,
            Err(err) => {
                tracing::warn!(city, error = %err, "weather lookup failed");
                WeatherRecord::invalid(city)
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct WaCondition {
    text: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    temp_c: f64,
    temp_f: f64,
    humidity: f64,
    wind_mph: f64,
    wind_kph: f64,
    wind_dir: String,
    precip_in: f64,
    precip_mm: f64,
    pressure_mb: f64,
    uv: f64,
    condition: WaCondition,
}

#[derive(Debug, Deserialize)]
struct WaCurrentResponse {
    current: WaCurrent,
}

#[derive(Debug, Deserialize)]
struct WaDay {
    avgtemp_c: f64,
    avgtemp_f: f64,
    condition: WaCondition,
}

#[derive(Debug, Deserialize)]
struct WaForecastDay {
    day: WaDay,
}

#[derive(Debug, Deserialize)]
struct WaForecast {
    forecastday: Vec<WaForecastDay>,
}

#[derive(Debug, Deserialize)]
struct WaForecastResponse {
    forecast: WaForecast,
}

/// Keep the last two segments of an icon URL: `//cdn/…/64x64/day/113.png`
/// becomes `day/113.png`.
pub fn icon_id(path: &str) -> String {
    let mut parts = path.rsplitn(3, '/');
    match (parts.next(), parts.next()) {
        (Some(file), Some(dir)) => format!("{dir}/{file}"),
        _ => path.to_string(),
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn icon_id_keeps_last_two_segments() {
        assert_eq!(icon_id("//cdn.example.com/weather/64x64/day/113.png"), "day/113.png");
        assert_eq!(icon_id("night/116.png"), "night/116.png");
    }

    #[test]
    fn icon_id_leaves_short_paths_alone() {
        assert_eq!(icon_id("113.png"), "113.png");
        assert_eq!(icon_id(""), "");
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "é".repeat(300);
        let out = truncate_body(&long);
        assert!(out.ends_with("..."));
        assert_eq!(out.chars().count(), 203);
        assert_eq!(truncate_body("short"), "short");
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let provider = WeatherApiProvider::new("KEY".into()).with_base_url("http://localhost:1234/");
        assert_eq!(provider.base_url, "http://localhost:1234");
    }
}
