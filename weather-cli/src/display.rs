//! Text rendering of weather records.

use std::collections::HashMap;

use chrono::Local;
use cityweather_core::WeatherRecord;

/// Keeps the last valid record per city so a failed refresh does not blank
/// what is already on screen.
#[derive(Debug, Default)]
pub struct LastGood {
    records: HashMap<String, WeatherRecord>,
}

impl LastGood {
    /// Record `latest` and return what should be shown for its city, plus
    /// whether that is older data kept over a failed refresh.
    pub fn update(&mut self, latest: WeatherRecord) -> (WeatherRecord, bool) {
        if latest.is_valid {
            self.records.insert(latest.city_name.clone(), latest.clone());
            return (latest, false);
        }

        match self.records.get(&latest.city_name) {
            Some(previous) => (previous.clone(), true),
            None => (latest, false),
        }
    }
}

pub fn render(record: &WeatherRecord, metric: bool, stale: bool) -> String {
    if !record.is_valid {
        return format!(
            "{}: no data (invalid city name or the weather API may be down)\n",
            record.city_name
        );
    }

    let current = &record.current;
    let (temp, wind, precip) = if metric {
        (
            current.temp_c,
            format!("{:.0}kph", current.wind_kph),
            format!("{:.0}mm", current.precip_mm),
        )
    } else {
        (
            current.temp_f,
            format!("{:.0}mph", current.wind_mph),
            format!("{:.0}in", current.precip_in),
        )
    };

    let mut out = String::new();
    out.push_str(&format!("== {} ==\n", record.city_name));
    out.push_str(&format!("  {temp:.0}°  {}  [{}]\n", current.condition, current.icon));

    let days: Vec<String> = record
        .forecast
        .iter()
        .map(|day| {
            let avg = if metric { day.avg_temp_c } else { day.avg_temp_f };
            format!("day {}: {avg:.0}° {}", day.day, day.condition)
        })
        .collect();
    out.push_str(&format!("  Next 3 days: {}\n", days.join(" | ")));

    out.push_str(&format!(
        "  Wind: {wind} {}  Humidity: {:.0}%  Pressure: {:.0}hPa  Precipitation: {precip}  UV: {:.0}\n",
        current.wind_dir, current.humidity_pct, current.pressure_hpa, current.uv
    ));

    if let Some(at) = record.fetched_at {
        let note = if stale { " (latest refresh failed)" } else { "" };
        out.push_str(&format!(
            "  Last updated: {}{note}\n",
            at.with_timezone(&Local).format("%H:%M:%S")
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use cityweather_core::{CurrentConditions, ForecastDay};

    fn tucson() -> WeatherRecord {
        let current = CurrentConditions {
            temp_c: 31.0,
            temp_f: 88.0,
            wind_kph: 11.0,
            wind_mph: 7.0,
            wind_dir: "WSW".into(),
            condition: "Sunny".into(),
            icon: "day/113.png".into(),
            ..CurrentConditions::default()
        };
        let forecast = [1u8, 2, 3].map(|day| ForecastDay {
            day,
            avg_temp_c: 20.0 + f64::from(day),
            avg_temp_f: 70.0 + f64::from(day),
            ..ForecastDay::default()
        });
        WeatherRecord::complete("Tucson", current, forecast)
    }

    #[test]
    fn renders_selected_units() {
        let imperial = render(&tucson(), false, false);
        assert!(imperial.contains("88°"));
        assert!(imperial.contains("7mph"));
        assert!(imperial.contains("day 1: 71°"));

        let metric = render(&tucson(), true, false);
        assert!(metric.contains("31°"));
        assert!(metric.contains("11kph"));
        assert!(metric.contains("day 3: 23°"));
    }

    #[test]
    fn invalid_record_renders_a_notice() {
        let out = render(&WeatherRecord::invalid("Atlantis"), true, false);
        assert!(out.starts_with("Atlantis: no data"));
    }

    #[test]
    fn failed_refresh_keeps_last_good_record() {
        let mut last_good = LastGood::default();

        let (shown, stale) = last_good.update(tucson());
        assert!(shown.is_valid && !stale);

        let (shown, stale) = last_good.update(WeatherRecord::invalid("Tucson"));
        assert!(shown.is_valid);
        assert!(stale);
        assert!(render(&shown, false, stale).contains("latest refresh failed"));

        let (shown, stale) = last_good.update(WeatherRecord::invalid("Kochi"));
        assert!(!shown.is_valid && !stale);
    }
}
