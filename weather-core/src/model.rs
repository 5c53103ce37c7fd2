use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of forecast days requested and stored per city.
pub const FORECAST_DAYS: usize = 3;

/// Current conditions for one city, both unit systems as reported by the API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temp_c: f64,
    pub temp_f: f64,
    pub humidity_pct: f64,
    pub wind_mph: f64,
    pub wind_kph: f64,
    pub wind_dir: String,
    pub precip_in: f64,
    pub precip_mm: f64,
    pub pressure_hpa: f64,
    pub uv: f64,
    pub condition: String,
    /// Icon reference, normalized to the last two path segments (`day/113.png`).
    pub icon: String,
}

/// Average conditions for one forecast day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    /// 1-based day number; 0 only in the zeroed entries of an invalid record.
    pub day: u8,
    pub avg_temp_c: f64,
    pub avg_temp_f: f64,
    pub condition: String,
    pub icon: String,
}

/// One snapshot of the weather for one city.
///
/// A record is either complete (`is_valid == true`, every field populated) or
/// invalid, in which case everything except `city_name` is at its zero value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    /// Name as requested by the user; this is the catalog key.
    pub city_name: String,
    pub is_valid: bool,
    pub current: CurrentConditions,
    pub forecast: [ForecastDay; FORECAST_DAYS],
    pub fetched_at: Option<DateTime<Utc>>,
}

impl WeatherRecord {
    /// A record signalling that the lookup for `city_name` failed.
    pub fn invalid(city_name: impl Into<String>) -> Self {
        Self {
            city_name: city_name.into(),
            ..Self::default()
        }
    }

    /// A complete record stamped with the current time.
    pub fn complete(
        city_name: impl Into<String>,
        current: CurrentConditions,
        forecast: [ForecastDay; FORECAST_DAYS],
    ) -> Self {
        Self {
            city_name: city_name.into(),
            is_valid: true,
            current,
            forecast,
            fetched_at: Some(Utc::now()),
        }
    }

    /// Forecast for day `day` (1..=3). Day 0 is today's current conditions and
    /// has no forecast entry.
    pub fn forecast_day(&self, day: usize) -> Option<&ForecastDay> {
        if day == 0 {
            return None;
        }
        self.forecast.get(day - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_record_keeps_only_the_name() {
        let record = WeatherRecord::invalid("Kochi");

        assert_eq!(record.city_name, "Kochi");
        assert!(!record.is_valid);
        assert_eq!(record.current, CurrentConditions::default());
        assert!(record.forecast.iter().all(|d| *d == ForecastDay::default()));
        assert!(record.fetched_at.is_none());
    }

    #[test]
    fn forecast_days_are_one_based() {
        let forecast = [1u8, 2, 3].map(|day| ForecastDay {
            day,
            avg_temp_c: f64::from(day),
            ..ForecastDay::default()
        });
        let record = WeatherRecord::complete("Tucson", CurrentConditions::default(), forecast);

        assert!(record.forecast_day(0).is_none());
        assert_eq!(record.forecast_day(1).map(|d| d.day), Some(1));
        assert_eq!(record.forecast_day(3).map(|d| d.avg_temp_c), Some(3.0));
        assert!(record.forecast_day(4).is_none());
        assert!(record.fetched_at.is_some());
    }
}
