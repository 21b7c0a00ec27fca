//! # NOAA Tide Prediction Client
//!
//! This module handles all network operations against the NOAA CO-OPS
//! "datagetter" API and decodes its JSON payloads into typed records.
//!
//! ## Data Source
//!
//! ### NOAA Tides and Currents
//! - **URL**: https://api.tidesandcurrents.noaa.gov/api/prod/datagetter
//! - **Product**: `predictions` (astronomical tide predictions)
//! - **Datum**: MLLW, **units**: english (feet), **time zone**: `lst_ldt`
//!   (local standard/daylight time of the station)
//!
//! ### Requests
//! Every forecast issues two requests for the same station:
//! 1. **High/low events** (`interval=hilo`) from today through today + 7 days
//! 2. **Hourly series** (`interval=h`) covering 24 hours from midnight today
//!
//! Both answer with `{"predictions": [{"t": "YYYY-MM-DD HH:MM", "v": "1.234", ...}]}`.
//! When NOAA rejects a query it still answers 200 with `{"error": {"message": ...}}`;
//! that payload is logged and treated as an empty prediction list.
//!
//! ## Error Handling
//!
//! Failures are classified by [`TideError`]:
//! - **Transport**: connection refused, DNS, TLS, timeouts
//! - **Status**: a non-2xx answer to the high/low request
//! - **Decode**: a body that is not the expected JSON
//! - **Value**: a water level that is not a finite number
//!
//! The hourly request's status code is not checked; only its body matters.

use chrono::{Duration, NaiveDate};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::TideKind;

/// Production endpoint of the NOAA CO-OPS data API.
pub const NOAA_BASE_URL: &str = "https://api.tidesandcurrents.noaa.gov/api/prod/datagetter";

/// Vertical reference: Mean Lower Low Water
const DATUM: &str = "MLLW";
/// Station local time with daylight saving adjustment
const TIME_ZONE: &str = "lst_ldt";
const UNITS: &str = "english";
const PRODUCT: &str = "predictions";

/// Days after today covered by the high/low request (inclusive range).
pub const HILO_SPAN_DAYS: i64 = 7;

/// Hours covered by the hourly request.
pub const HOURLY_RANGE_HOURS: u32 = 24;

/// Errors that can occur while fetching and decoding tide predictions.
///
/// The HTTP boundary collapses all of these into one "tide data unavailable"
/// response; the variants exist so logs say what actually went wrong.
#[derive(Error, Debug)]
pub enum TideError {
    /// HTTP request failed (network, TLS, timeout or protocol error)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// NOAA answered the high/low request with a non-success status
    #[error("NOAA API error: {0}")]
    Status(StatusCode),

    /// Response body was not the expected JSON document
    #[error("malformed NOAA payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// A water level that does not parse as a finite number
    #[error("invalid water level {0:?}")]
    InvalidValue(String),
}

/// A discrete high or low tide prediction.
#[derive(Clone, Debug, PartialEq)]
pub struct Prediction {
    /// Raw NOAA timestamp, `"YYYY-MM-DD HH:MM"`
    pub timestamp: String,
    /// Height in feet above MLLW
    pub value: f64,
    pub kind: TideKind,
}

/// One sample of the hourly prediction series.
#[derive(Clone, Debug, PartialEq)]
pub struct HourlySample {
    /// Raw NOAA timestamp, `"YYYY-MM-DD HH:MM"`
    pub timestamp: String,
    /// Height in feet above MLLW
    pub value: f64,
}

impl Prediction {
    /// Calendar date part of the timestamp (`YYYY-MM-DD`).
    pub fn date(&self) -> &str {
        split_timestamp(&self.timestamp).0
    }

    /// Time of day part of the timestamp (`HH:MM`).
    pub fn time_of_day(&self) -> &str {
        split_timestamp(&self.timestamp).1
    }
}

impl HourlySample {
    /// Time of day part of the timestamp (`HH:MM`).
    pub fn time_of_day(&self) -> &str {
        split_timestamp(&self.timestamp).1
    }
}

/// Split `"YYYY-MM-DD HH:MM"` into its date and `HH:MM` parts.
///
/// Anything trailing the minutes is dropped, so `"2025-10-31 06:15post"`
/// yields `("2025-10-31", "06:15")`. A timestamp without a space has an empty
/// time part.
pub fn split_timestamp(timestamp: &str) -> (&str, &str) {
    match timestamp.split_once(' ') {
        Some((date, time)) => (date, time.get(..5).unwrap_or(time)),
        None => (timestamp, ""),
    }
}

// -- Wire format --

#[derive(Debug, Deserialize)]
struct RawResponse {
    #[serde(default)]
    predictions: Option<Vec<RawPrediction>>,
    #[serde(default)]
    error: Option<RawApiError>,
}

#[derive(Debug, Deserialize)]
struct RawPrediction {
    t: String,
    v: String,
    #[serde(rename = "type", default)]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct RawApiError {
    #[serde(default)]
    message: String,
}

fn parse_value(raw: &str) -> Result<f64, TideError> {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(TideError::InvalidValue(raw.to_string())),
    }
}

/// Decode a high/low payload.
pub fn decode_hilo(body: &[u8]) -> Result<Vec<Prediction>, TideError> {
    decode_raw(body)?
        .into_iter()
        .map(|raw| {
            Ok(Prediction {
                value: parse_value(&raw.v)?,
                kind: TideKind::from_noaa_code(&raw.kind),
                timestamp: raw.t,
            })
        })
        .collect()
}

/// Decode an hourly payload. A missing `predictions` field yields an empty
/// series.
pub fn decode_hourly(body: &[u8]) -> Result<Vec<HourlySample>, TideError> {
    decode_raw(body)?
        .into_iter()
        .map(|raw| {
            Ok(HourlySample {
                value: parse_value(&raw.v)?,
                timestamp: raw.t,
            })
        })
        .collect()
}

fn decode_raw(body: &[u8]) -> Result<Vec<RawPrediction>, TideError> {
    let payload: RawResponse = serde_json::from_slice(body)?;
    if let Some(err) = payload.error {
        warn!("NOAA rejected query: {}", err.message);
    }
    Ok(payload.predictions.unwrap_or_default())
}

/// Compact `YYYYMMDD` form used by the `begin_date`/`end_date` parameters.
fn compact_date(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// Query parameters for the high/low request starting at `today`.
pub fn hilo_query(station: &str, today: NaiveDate) -> Vec<(&'static str, String)> {
    let end = today + Duration::days(HILO_SPAN_DAYS);
    vec![
        ("begin_date", compact_date(today)),
        ("end_date", compact_date(end)),
        ("station", station.to_string()),
        ("product", PRODUCT.to_string()),
        ("datum", DATUM.to_string()),
        ("time_zone", TIME_ZONE.to_string()),
        ("units", UNITS.to_string()),
        ("interval", "hilo".to_string()),
        ("format", "json".to_string()),
    ]
}

/// Query parameters for the hourly request starting at `today`.
pub fn hourly_query(station: &str, today: NaiveDate) -> Vec<(&'static str, String)> {
    vec![
        ("begin_date", compact_date(today)),
        ("range", HOURLY_RANGE_HOURS.to_string()),
        ("station", station.to_string()),
        ("product", PRODUCT.to_string()),
        ("datum", DATUM.to_string()),
        ("time_zone", TIME_ZONE.to_string()),
        ("units", UNITS.to_string()),
        ("interval", "h".to_string()),
        ("format", "json".to_string()),
    ]
}

/// Thin async client for the NOAA datagetter endpoint.
///
/// Cloning is cheap; the underlying `reqwest::Client` shares its connection
/// pool between clones.
#[derive(Clone, Debug)]
pub struct NoaaClient {
    http: Client,
    base_url: String,
}

impl NoaaClient {
    /// Create a client for `base_url`. Without a timeout the transport
    /// defaults apply.
    pub fn new(
        base_url: impl Into<String>,
        timeout: Option<std::time::Duration>,
    ) -> Result<Self, TideError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(NoaaClient {
            http: builder.build()?,
            base_url: base_url.into(),
        })
    }

    /// Fetch high/low predictions for `today` through `today + 7 days`.
    ///
    /// Fails with [`TideError::Status`] on a non-2xx answer.
    pub async fn fetch_hilo(
        &self,
        station: &str,
        today: NaiveDate,
    ) -> Result<Vec<Prediction>, TideError> {
        let response = self
            .http
            .get(&self.base_url)
            .query(&hilo_query(station, today))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TideError::Status(status));
        }

        let body = response.bytes().await?;
        let predictions = decode_hilo(&body)?;
        debug!(station, count = predictions.len(), "fetched high/low predictions");
        Ok(predictions)
    }

    /// Fetch the 24 hour hourly series starting at midnight `today`.
    pub async fn fetch_hourly(
        &self,
        station: &str,
        today: NaiveDate,
    ) -> Result<Vec<HourlySample>, TideError> {
        let response = self
            .http
            .get(&self.base_url)
            .query(&hourly_query(station, today))
            .send()
            .await?;

        let body = response.bytes().await?;
        let samples = decode_hourly(&body)?;
        debug!(station, count = samples.len(), "fetched hourly predictions");
        Ok(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn param<'a>(query: &'a [(&'static str, String)], key: &str) -> &'a str {
        query
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
            .unwrap_or_else(|| panic!("missing query parameter {key}"))
    }

    #[test]
    fn test_hilo_query_spans_eight_days() {
        let query = hilo_query("9414290", date(2025, 10, 31));
        assert_eq!(param(&query, "begin_date"), "20251031");
        assert_eq!(param(&query, "end_date"), "20251107");
        assert_eq!(param(&query, "station"), "9414290");
        assert_eq!(param(&query, "interval"), "hilo");
        assert_eq!(param(&query, "datum"), "MLLW");
        assert_eq!(param(&query, "time_zone"), "lst_ldt");
        assert_eq!(param(&query, "units"), "english");
        assert_eq!(param(&query, "product"), "predictions");
        assert_eq!(param(&query, "format"), "json");
    }

    #[test]
    fn test_hourly_query_uses_range() {
        let query = hourly_query("8443970", date(2025, 12, 31));
        assert_eq!(param(&query, "begin_date"), "20251231");
        assert_eq!(param(&query, "range"), "24");
        assert_eq!(param(&query, "interval"), "h");
        assert!(query.iter().all(|(k, _)| *k != "end_date"));
    }

    #[test]
    fn test_split_timestamp() {
        assert_eq!(
            split_timestamp("2025-10-31 06:15"),
            ("2025-10-31", "06:15")
        );
        assert_eq!(
            split_timestamp("2025-10-31 06:15post"),
            ("2025-10-31", "06:15")
        );
        assert_eq!(split_timestamp("2025-10-31 6:1"), ("2025-10-31", "6:1"));
        assert_eq!(split_timestamp("2025-10-31"), ("2025-10-31", ""));
    }

    #[test]
    fn test_decode_hilo() {
        let body = br#"{"predictions":[
            {"t":"2025-10-31 06:15","v":"5.312","type":"H"},
            {"t":"2025-10-31 12:40","v":"-0.8","type":"L"}
        ]}"#;
        let predictions = decode_hilo(body).unwrap();
        assert_eq!(predictions.len(), 2);
        assert_eq!(predictions[0].kind, TideKind::High);
        assert_eq!(predictions[0].value, 5.312);
        assert_eq!(predictions[0].date(), "2025-10-31");
        assert_eq!(predictions[1].kind, TideKind::Low);
        assert_eq!(predictions[1].time_of_day(), "12:40");
    }

    #[test]
    fn test_decode_hilo_treats_unknown_type_as_low() {
        let body = br#"{"predictions":[{"t":"2025-10-31 06:15","v":"1.0","type":"X"},
                                       {"t":"2025-10-31 07:15","v":"1.0"}]}"#;
        let predictions = decode_hilo(body).unwrap();
        assert!(predictions.iter().all(|p| p.kind == TideKind::Low));
    }

    #[test]
    fn test_decode_missing_predictions_is_empty() {
        assert!(decode_hourly(b"{}").unwrap().is_empty());
        let rejected = br#"{"error":{"message":"No Predictions data was found."}}"#;
        assert!(decode_hilo(rejected).unwrap().is_empty());
    }

    #[test]
    fn test_decode_malformed_json() {
        assert!(matches!(decode_hilo(b"<html>"), Err(TideError::Decode(_))));
        assert!(matches!(
            decode_hourly(br#"{"predictions":"nope"}"#),
            Err(TideError::Decode(_))
        ));
    }

    #[test]
    fn test_decode_rejects_non_numeric_values() {
        for v in ["", "abc", "NaN", "inf"] {
            let body = format!(r#"{{"predictions":[{{"t":"2025-10-31 00:00","v":"{v}"}}]}}"#);
            match decode_hourly(body.as_bytes()) {
                Err(TideError::InvalidValue(raw)) => assert_eq!(raw, v),
                other => panic!("expected InvalidValue for {v:?}, got {other:?}"),
            }
        }
    }
}
