//! # Tide Forecast Core Library
//!
//! This library provides the data structures and building blocks for the tide
//! forecast service. It turns two NOAA CO-OPS prediction payloads into the
//! view model consumed by a web front end: today's and tomorrow's tide events,
//! an hourly water-level series for charting and a seven day summary table.
//!
//! ## Data Flow
//!
//! 1. **Resolve**: location name → NOAA station id ([`stations`])
//! 2. **Fetch**: discrete high/low events for 8 days plus a 24 hour hourly
//!    series ([`noaa`])
//! 3. **Reshape**: build a [`TideData`] view model from both payloads and an
//!    injected "now" ([`forecast`])
//! 4. **Serve**: JSON over HTTP with a 30 minute freshness window
//!    ([`server`], [`cache`])
//!
//! ## Core Types
//!
//! - [`TideEvent`]: one high or low tide, formatted for a table row
//! - [`TidePoint`]: one hourly sample, raw height for a chart
//! - [`WeeklyTide`]: one row of the seven day summary
//! - [`TideData`]: the complete view model
//!
//! All output types serialize with camelCase keys so the JSON matches what the
//! front end components read.

use serde::{Deserialize, Serialize};

// Module declarations
pub mod cache;
pub mod config;
pub mod forecast;
pub mod noaa;
pub mod server;
pub mod stations;

/// Category of a discrete tide event.
///
/// NOAA reports `"H"` for high and `"L"` for low water; the JSON output uses
/// the lowercase words.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TideKind {
    High,
    Low,
}

impl TideKind {
    /// Map a NOAA `type` code. Anything other than `"H"` counts as low water.
    pub fn from_noaa_code(code: &str) -> Self {
        if code == "H" {
            TideKind::High
        } else {
            TideKind::Low
        }
    }
}

/// A single high or low tide, ready for display in a tide table.
///
/// # Example
/// ```
/// use tide_forecast_lib::{TideEvent, TideKind};
///
/// let event = TideEvent {
///     time: "06:15".to_string(),
///     height: "5.3 ft".to_string(),
///     kind: TideKind::High,
/// };
///
/// let json = serde_json::to_string(&event).unwrap();
/// assert_eq!(json, r#"{"time":"06:15","height":"5.3 ft","type":"high"}"#);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TideEvent {
    /// Local time of day, zero padded `HH:MM`
    pub time: String,
    /// Height with one decimal and unit suffix, e.g. `"-0.8 ft"`
    pub height: String,
    /// High or low water
    #[serde(rename = "type")]
    pub kind: TideKind,
}

/// One hourly water-level sample for the tide chart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TidePoint {
    /// Local time of day, `HH:MM`
    pub time: String,
    /// Predicted height in feet above MLLW
    pub height: f64,
}

/// One day of the seven day summary table.
///
/// `sunrise` and `sunset` are fixed placeholders; NOAA tide predictions do not
/// carry sun data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyTide {
    /// Short date label, e.g. `"Oct 31"`
    pub date: String,
    /// Short weekday label, e.g. `"Fri"`
    pub day: String,
    /// Highest high tide of the day, formatted
    pub high_tide: String,
    /// Lowest low tide of the day, formatted
    pub low_tide: String,
    pub sunrise: String,
    pub sunset: String,
}

/// Complete tide view model for one location.
///
/// Produced by [`forecast::build_tide_data`] and served verbatim as JSON by
/// `GET /api/tides`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TideData {
    /// Location name exactly as requested (not the resolved station)
    pub location: String,
    /// Height at the current hour, or a fixed fallback when unavailable
    pub current_tide: f64,
    /// `HH:MM` of the next high tide, or `"N/A"`
    pub next_high_tide: String,
    /// `HH:MM` of the next low tide, or `"N/A"`
    pub next_low_tide: String,
    /// Hourly series in upstream order
    pub chart_data: Vec<TidePoint>,
    pub today_tides: Vec<TideEvent>,
    pub tomorrow_tides: Vec<TideEvent>,
    /// Exactly seven entries starting today
    pub weekly_tides: Vec<WeeklyTide>,
}
