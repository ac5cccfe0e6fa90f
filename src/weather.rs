/*
 *  weather.rs
 *
 *  weatherboard - e-paper weather dashboard
 *
 *  OpenWeatherMap One Call client plus display-ready projections of the
 *  fetched snapshot (hourly/daily summaries, alerts, icon selection).
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use log::info;
use reqwest::{header, Client};
use serde::Deserialize;
use std::time::Duration;

use crate::error::{Error, Result};

const ONECALL_URL: &str = "https://api.openweathermap.org/data/2.5/onecall";

/// One fetched weather payload, immutable for the lifetime of one render.
#[derive(Debug, Clone, Deserialize)]
pub struct WeatherSnapshot {
    pub current: CurrentConditions,
    pub hourly: Vec<HourlyRecord>,
    pub daily: Vec<DailyRecord>,
    #[serde(default)]
    pub alerts: Vec<WeatherAlert>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CurrentConditions {
    pub dt: i64,
    pub temp: f64,
    pub uvi: f64,
    pub pressure: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub sunrise: i64,
    pub sunset: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HourlyRecord {
    pub dt: i64,
    pub temp: f64,
    pub uvi: f64,
    pub clouds: f64,
    pub wind_speed: f64,
    pub wind_deg: f64,
    pub weather: Vec<ConditionCode>,
    #[serde(default)]
    pub rain: Precipitation,
    #[serde(default)]
    pub snow: Precipitation,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DailyRecord {
    pub dt: i64,
    pub temp: DailyTemp,
    pub wind_speed: f64,
    pub weather: Vec<ConditionCode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DailyTemp {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConditionCode {
    pub id: i64,
    pub main: String,
}

/// Rain/snow volume for the last hour, `{"1h": mm}` in the payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Precipitation {
    #[serde(rename = "1h", default)]
    pub one_hour: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeatherAlert {
    pub event: String,
    pub end: i64,
}

/// Display-ready projection of one hourly record.
#[derive(Debug, Clone)]
pub struct HourlySummary {
    pub time: DateTime<Utc>,
    /// Hour-of-day label in the client timezone, leading zeros stripped
    /// ("4", not "04"; midnight is "0").
    pub hour: String,
    /// Day-of-month label, leading zero stripped.
    pub day: String,
    pub icon: &'static str,
    pub description: String,
    pub temperature: f64,
    /// Wind speed in m/s.
    pub wind: f64,
    pub wind_icon: &'static str,
    /// Rain volume in mm/h.
    pub rain: f64,
    /// Snow volume in mm/h.
    pub snow: f64,
    pub clouds: f64,
    pub uv: f64,
}

/// Display-ready projection of one daily record. Daily records carry no
/// wind icon or rain/snow granularity, hence the separate type.
#[derive(Debug, Clone)]
pub struct DailySummary {
    pub date: DateTime<Utc>,
    pub icon: &'static str,
    pub description: String,
    pub temp_min: f64,
    pub temp_max: f64,
    pub wind: f64,
}

/// One active weather alert with a human-readable remaining duration.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertSummary {
    pub text: String,
    pub subtext: String,
}

/// Weather client for one coordinate. `load()` performs the single
/// network fetch of a render pass; every accessor afterwards reads the
/// cached snapshot.
#[derive(Debug)]
pub struct WeatherClient {
    latitude: f64,
    longitude: f64,
    timezone: Tz,
    client: Client,
    snapshot: Option<WeatherSnapshot>,
}

impl WeatherClient {
    pub fn new(latitude: f64, longitude: f64, timezone: Tz) -> Result<Self> {
        const VERSION: &str = concat!(env!("CARGO_PKG_NAME"), " v", env!("CARGO_PKG_VERSION"));

        let mut headers = header::HeaderMap::new();
        headers.insert("User-Agent", header::HeaderValue::from_static(VERSION));
        headers.insert("Accept", header::HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(15))
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Config(e.to_string()))?;

        Ok(WeatherClient {
            latitude,
            longitude,
            timezone,
            client,
            snapshot: None,
        })
    }

    /// Stub constructor used for offline rendering and tests.
    pub fn with_snapshot(
        latitude: f64,
        longitude: f64,
        timezone: Tz,
        snapshot: WeatherSnapshot,
    ) -> Result<Self> {
        let mut wc = WeatherClient::new(latitude, longitude, timezone)?;
        wc.snapshot = Some(snapshot);
        Ok(wc)
    }

    /// Fetches and parses the One Call payload for the configured
    /// coordinate. No retry; any failure propagates to the caller.
    pub async fn load(&mut self, api_key: &str) -> Result<()> {
        info!(
            "Fetching weather for {:.4}, {:.4}...",
            self.latitude, self.longitude
        );
        let url = format!(
            "{}?lat={}&lon={}&exclude=minutely&units=metric&appid={}",
            ONECALL_URL, self.latitude, self.longitude, api_key
        );
        let response = self.client.get(&url).send().await?.error_for_status()?;
        let body = response.text().await?;
        let snapshot: WeatherSnapshot = serde_json::from_str(&body)?;
        info!(
            "Weather fetched: {} hourly, {} daily, {} alerts",
            snapshot.hourly.len(),
            snapshot.daily.len(),
            snapshot.alerts.len()
        );
        self.snapshot = Some(snapshot);
        Ok(())
    }

    fn snapshot(&self) -> Result<&WeatherSnapshot> {
        self.snapshot.as_ref().ok_or(Error::State)
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn temp_current(&self) -> Result<f64> {
        Ok(self.snapshot()?.current.temp)
    }

    pub fn uvi_current(&self) -> Result<f64> {
        Ok(self.snapshot()?.current.uvi)
    }

    pub fn pressure_current(&self) -> Result<f64> {
        Ok(self.snapshot()?.current.pressure)
    }

    pub fn humidity_current(&self) -> Result<f64> {
        Ok(self.snapshot()?.current.humidity)
    }

    pub fn wind_speed_current(&self) -> Result<f64> {
        Ok(self.snapshot()?.current.wind_speed)
    }

    /// Maximum UV index over the 24 hours following the fetch time.
    pub fn uvi_max_today(&self) -> Result<f64> {
        let snap = self.snapshot()?;
        Ok(snap
            .hourly
            .iter()
            .filter(|h| h.dt - snap.current.dt < 86_400)
            .fold(0.0f64, |acc, h| acc.max(h.uvi)))
    }

    /// Min/max temperature over the 24 hours following the fetch time.
    pub fn temp_range_24hr(&self) -> Result<(f64, f64)> {
        let snap = self.snapshot()?;
        let mut range: Option<(f64, f64)> = None;
        for h in snap.hourly.iter().filter(|h| h.dt - snap.current.dt < 86_400) {
            range = Some(match range {
                Some((lo, hi)) => (lo.min(h.temp), hi.max(h.temp)),
                None => (h.temp, h.temp),
            });
        }
        range.ok_or_else(|| Error::Range("no hourly records within 24h".to_string()))
    }

    pub fn sunrise(&self) -> Result<DateTime<Utc>> {
        let ts = self.snapshot()?.current.sunrise;
        DateTime::from_timestamp(ts, 0).ok_or_else(|| Error::Range(format!("bad sunrise {ts}")))
    }

    pub fn sunset(&self) -> Result<DateTime<Utc>> {
        let ts = self.snapshot()?.current.sunset;
        DateTime::from_timestamp(ts, 0).ok_or_else(|| Error::Range(format!("bad sunset {ts}")))
    }

    /// Summary of the hourly record bracketing `now + offset_secs`.
    pub fn hourly_summary(&self, offset_secs: i64) -> Result<HourlySummary> {
        self.hourly_summary_at(Utc::now().timestamp() + offset_secs)
    }

    /// Locates the pair of hourly records straddling `target` and
    /// summarises the earlier one. A target outside the fetched window
    /// clamps to the final bracketing pair.
    pub fn hourly_summary_at(&self, target: i64) -> Result<HourlySummary> {
        let snap = self.snapshot()?;
        if snap.hourly.len() < 2 {
            return Err(Error::Range("fewer than two hourly records".to_string()));
        }
        let mut record = &snap.hourly[snap.hourly.len() - 2];
        for pair in snap.hourly.windows(2) {
            if pair[0].dt < target && target < pair[1].dt {
                record = &pair[0];
                break;
            }
        }
        let time = DateTime::from_timestamp(record.dt, 0)
            .ok_or_else(|| Error::Range(format!("bad hourly timestamp {}", record.dt)))?;
        let local = time.with_timezone(&self.timezone);
        let condition = record
            .weather
            .first()
            .ok_or_else(|| Error::Range("hourly record without condition".to_string()))?;
        Ok(HourlySummary {
            time,
            hour: strip_leading_zeros(&local.format("%H").to_string()),
            day: strip_leading_zeros(&local.format("%d").to_string()),
            icon: code_to_icon(condition.id, record.uvi == 0.0),
            description: title_case(&condition.main),
            temperature: record.temp,
            wind: record.wind_speed,
            wind_icon: wind_deg_to_icon(record.wind_deg),
            rain: record.rain.one_hour,
            snow: record.snow.one_hour,
            clouds: record.clouds,
            uv: record.uvi,
        })
    }

    /// Summary of the daily record `day_offset` days from today (0 = today).
    pub fn daily_summary(&self, day_offset: usize) -> Result<DailySummary> {
        let snap = self.snapshot()?;
        let record = snap
            .daily
            .get(day_offset)
            .ok_or_else(|| Error::Range(format!("no daily record at offset {day_offset}")))?;
        let date = DateTime::from_timestamp(record.dt, 0)
            .ok_or_else(|| Error::Range(format!("bad daily timestamp {}", record.dt)))?;
        let condition = record
            .weather
            .first()
            .ok_or_else(|| Error::Range("daily record without condition".to_string()))?;
        Ok(DailySummary {
            date,
            icon: code_to_icon(condition.id, false),
            description: title_case(&condition.main),
            temp_min: record.temp.min,
            temp_max: record.temp.max,
            wind: record.wind_speed,
        })
    }

    /// Alerts still active at the current time, with a remaining-duration
    /// subtext rounded up to whole hours.
    pub fn active_alerts(&self) -> Result<Vec<AlertSummary>> {
        self.active_alerts_at(Utc::now().timestamp())
    }

    pub fn active_alerts_at(&self, now: i64) -> Result<Vec<AlertSummary>> {
        let snap = self.snapshot()?;
        Ok(snap
            .alerts
            .iter()
            .filter(|a| a.end > now)
            .map(|a| {
                let hours_left = (a.end - now + 3599) / 3600;
                AlertSummary {
                    text: a.event.clone(),
                    subtext: if hours_left == 1 {
                        "for an hour".to_string()
                    } else {
                        format!("for {hours_left} hours")
                    },
                }
            })
            .collect())
    }
}

/// Strips leading zeros from a formatted number label; "00" becomes "0".
fn strip_leading_zeros(label: &str) -> String {
    let stripped = label.trim_start_matches('0');
    if stripped.is_empty() {
        "0".to_string()
    } else {
        stripped.to_string()
    }
}

/// Uppercases the first letter of each word, for headings and
/// condition descriptions.
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Maps an OpenWeatherMap condition code to a named icon asset.
/// Unmapped codes fall back to the generic scattered-clouds icon; the
/// night flag only affects the clear/few-clouds codes (800-803).
/// See <https://openweathermap.org/weather-conditions>.
pub fn code_to_icon(code: i64, night: bool) -> &'static str {
    match code {
        511 => "sleet",
        771 => "thunderstorm",
        200..=299 => "thunderstorm",
        300..=399 => "showers",
        500..=504 => "rain",
        520..=599 => "showers",
        611..=619 => "sleet",
        600..=699 => "snow",
        700..=799 => "fog",
        800 => {
            if night {
                "clear-night"
            } else {
                "clear-day"
            }
        }
        801..=803 => {
            if night {
                "clouds-few-night"
            } else {
                "clouds-few-day"
            }
        }
        _ => "clouds-scattered",
    }
}

/// Maps a wind direction in degrees to one of eight arrow icons. The
/// compass is split into 45-degree sectors with the first boundary at
/// 22.5 so the sector centred on north wraps across 0/360.
pub fn wind_deg_to_icon(deg: f64) -> &'static str {
    if !(22.5..337.5).contains(&deg) {
        "arrow-down"
    } else if deg < 67.5 {
        "arrow-down-left"
    } else if deg < 112.5 {
        "arrow-left"
    } else if deg < 157.5 {
        "arrow-up-left"
    } else if deg < 202.5 {
        "arrow-up"
    } else if deg < 247.5 {
        "arrow-up-right"
    } else if deg < 292.5 {
        "arrow-right"
    } else {
        "arrow-down-right"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Europe::Copenhagen;

    /// Builds a snapshot with hourly records every hour starting half an
    /// hour before `base`, so `base` falls inside the first bracketing pair.
    fn fixture_snapshot(base: i64) -> WeatherSnapshot {
        let start = base - 1800;
        let hourly: Vec<serde_json::Value> = (0..48)
            .map(|i| {
                serde_json::json!({
                    "dt": start + i * 3600,
                    "temp": 10.0 + (i % 12) as f64,
                    "uvi": if (6..18).contains(&(i % 24)) { 2.5 } else { 0.0 },
                    "clouds": 40.0,
                    "wind_speed": 5.0 + (i % 3) as f64,
                    "wind_deg": (i * 30 % 360) as f64,
                    "weather": [{"id": 800, "main": "clear sky"}],
                    "rain": {"1h": if i < 4 { 1.5 } else { 0.0 }},
                })
            })
            .collect();
        let daily: Vec<serde_json::Value> = (0..8)
            .map(|i| {
                serde_json::json!({
                    "dt": start + i * 86_400,
                    "temp": {"min": 8.0, "max": 17.0},
                    "wind_speed": 6.0,
                    "weather": [{"id": 500, "main": "rain"}],
                })
            })
            .collect();
        serde_json::from_value(serde_json::json!({
            "current": {
                "dt": base,
                "temp": 12.3,
                "uvi": 1.0,
                "pressure": 1013.0,
                "humidity": 80.0,
                "wind_speed": 4.2,
                "sunrise": base - 7200,
                "sunset": base + 28_800,
            },
            "hourly": hourly,
            "daily": daily,
            "alerts": [
                {"event": "Gale warning", "end": base + 3600},
                {"event": "Flood warning", "end": base + 7800},
                {"event": "Expired warning", "end": base - 60},
            ],
        }))
        .expect("fixture must deserialize")
    }

    fn fixture_client() -> WeatherClient {
        let now = Utc::now().timestamp();
        WeatherClient::with_snapshot(55.676, 12.568, Copenhagen, fixture_snapshot(now)).unwrap()
    }

    #[test]
    fn accessor_before_load_is_state_error() {
        let wc = WeatherClient::new(55.676, 12.568, Copenhagen).unwrap();
        assert!(matches!(wc.temp_current(), Err(Error::State)));
        assert!(matches!(wc.hourly_summary(0), Err(Error::State)));
    }

    #[test]
    fn hourly_summary_picks_earlier_bracket() {
        let wc = fixture_client();
        let summary = wc.hourly_summary(0).unwrap();
        // First pair brackets "now": the earlier record's fields come
        // through unmodified.
        assert_eq!(summary.temperature, 10.0);
        assert_eq!(summary.rain, 1.5);
        assert_eq!(summary.snow, 0.0);
        assert_eq!(summary.description, "Clear Sky");
    }

    #[test]
    fn hourly_summary_clamps_past_window() {
        let wc = fixture_client();
        // Ten days out is far beyond the 48 fetched hours.
        let clamped = wc.hourly_summary(10 * 86_400).unwrap();
        let last = wc.hourly_summary(46 * 3600).unwrap();
        assert_eq!(clamped.time, last.time);
    }

    #[test]
    fn hour_label_strips_leading_zeros() {
        assert_eq!(strip_leading_zeros("04"), "4");
        assert_eq!(strip_leading_zeros("00"), "0");
        assert_eq!(strip_leading_zeros("12"), "12");
    }

    #[test]
    fn daily_summary_out_of_range() {
        let wc = fixture_client();
        assert!(wc.daily_summary(1).is_ok());
        assert!(matches!(wc.daily_summary(9), Err(Error::Range(_))));
    }

    #[test]
    fn current_conditions_pass_through() {
        let wc = fixture_client();
        assert_eq!(wc.temp_current().unwrap(), 12.3);
        assert_eq!(wc.pressure_current().unwrap(), 1013.0);
        assert_eq!(wc.humidity_current().unwrap(), 80.0);
        assert_eq!(wc.wind_speed_current().unwrap(), 4.2);
        assert!(wc.sunrise().unwrap() < wc.sunset().unwrap());
    }

    #[test]
    fn uvi_and_temp_window() {
        let wc = fixture_client();
        assert_eq!(wc.uvi_max_today().unwrap(), 2.5);
        let (lo, hi) = wc.temp_range_24hr().unwrap();
        assert_eq!(lo, 10.0);
        assert_eq!(hi, 21.0);
    }

    #[test]
    fn alerts_filter_and_subtext() {
        let now = Utc::now().timestamp();
        let wc =
            WeatherClient::with_snapshot(55.676, 12.568, Copenhagen, fixture_snapshot(now)).unwrap();
        let alerts = wc.active_alerts_at(now).unwrap();
        // The expired alert is dropped.
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].text, "Gale warning");
        assert_eq!(alerts[0].subtext, "for an hour");
        // 7800s rounds up to 3 hours.
        assert_eq!(alerts[1].subtext, "for 3 hours");
    }

    #[test]
    fn condition_codes_map_to_icons() {
        assert_eq!(code_to_icon(511, false), "sleet");
        assert_eq!(code_to_icon(771, false), "thunderstorm");
        assert_eq!(code_to_icon(212, false), "thunderstorm");
        assert_eq!(code_to_icon(301, false), "showers");
        assert_eq!(code_to_icon(502, false), "rain");
        assert_eq!(code_to_icon(504, false), "rain");
        assert_eq!(code_to_icon(520, false), "showers");
        assert_eq!(code_to_icon(616, false), "sleet");
        assert_eq!(code_to_icon(601, false), "snow");
        assert_eq!(code_to_icon(741, false), "fog");
        assert_eq!(code_to_icon(800, false), "clear-day");
        assert_eq!(code_to_icon(800, true), "clear-night");
        assert_eq!(code_to_icon(802, false), "clouds-few-day");
        assert_eq!(code_to_icon(802, true), "clouds-few-night");
        // Unmapped codes fall back; the night flag has no effect there.
        assert_eq!(code_to_icon(804, false), "clouds-scattered");
        assert_eq!(code_to_icon(804, true), "clouds-scattered");
        assert_eq!(code_to_icon(42, true), "clouds-scattered");
    }

    #[test]
    fn wind_sectors_wrap_at_north() {
        assert_eq!(wind_deg_to_icon(0.0), "arrow-down");
        assert_eq!(wind_deg_to_icon(22.4), "arrow-down");
        assert_eq!(wind_deg_to_icon(337.5), "arrow-down");
        assert_eq!(wind_deg_to_icon(359.9), "arrow-down");
        assert_eq!(wind_deg_to_icon(22.5), "arrow-down-left");
        assert_eq!(wind_deg_to_icon(90.0), "arrow-left");
        assert_eq!(wind_deg_to_icon(135.0), "arrow-up-left");
        assert_eq!(wind_deg_to_icon(180.0), "arrow-up");
        assert_eq!(wind_deg_to_icon(225.0), "arrow-up-right");
        assert_eq!(wind_deg_to_icon(270.0), "arrow-right");
        assert_eq!(wind_deg_to_icon(300.0), "arrow-down-right");
    }
}
