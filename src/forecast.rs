//! # Tide View-Model Builder
//!
//! Turns the decoded NOAA payloads into the [`TideData`] view model.
//!
//! The reshaping lives in [`build_tide_data`], a pure function of its inputs:
//! the reference "now" is passed in rather than read from the clock, so the
//! same payloads and the same instant always produce the same view model.
//! [`fetch_tide_data`] wires it to the network.
//!
//! ## Rules
//!
//! - **Today/tomorrow**: events are bucketed by exact `YYYY-MM-DD` match
//!   against "now" and the following day; other days are left out of both
//!   lists but still feed the weekly summary
//! - **Next high/low**: first event of the category, scanning today then
//!   tomorrow, whose `HH:MM` sorts strictly after the current `HH:MM`
//! - **Current tide**: hourly sample at the index of the current hour
//! - **Weekly summary**: seven days, highest high and lowest low per day,
//!   `0.0 ft` when a day has no event of that kind

use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};
use tracing::debug;

use crate::noaa::{HourlySample, NoaaClient, Prediction, TideError};
use crate::{stations, TideData, TideEvent, TideKind, TidePoint, WeeklyTide};

/// Current tide reported when the hourly series has no sample for this hour.
pub const FALLBACK_TIDE_FT: f64 = 7.0;

/// Shown instead of a time when no upcoming event is found.
pub const NOT_AVAILABLE: &str = "N/A";

/// Unit suffix for formatted heights.
pub const HEIGHT_UNIT: &str = "ft";

/// Number of rows in the weekly summary.
pub const WEEK_DAYS: i64 = 7;

// Sun data is not part of the tide predictions product.
const SUNRISE_PLACEHOLDER: &str = "6:30";
const SUNSET_PLACEHOLDER: &str = "18:45";

/// Format a height with one decimal and the unit suffix.
///
/// Values exactly halfway between two tenths round away from zero. Only
/// multiples of 0.25 can be exact halves in binary; anything else already
/// sits on one side of the tie.
///
/// ```
/// use tide_forecast_lib::forecast::format_height;
///
/// assert_eq!(format_height(5.312), "5.3 ft");
/// assert_eq!(format_height(-1.23), "-1.2 ft");
/// assert_eq!(format_height(1.25), "1.3 ft");
/// assert_eq!(format_height(0.0), "0.0 ft");
/// ```
pub fn format_height(value: f64) -> String {
    let quarters = value * 4.0;
    let value = if quarters.fract() == 0.0 && quarters % 2.0 != 0.0 {
        (value * 10.0).round() / 10.0
    } else {
        value
    };
    format!("{value:.1} {HEIGHT_UNIT}")
}

fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Fetch both NOAA payloads for `location` and build its view model.
///
/// The high/low request is issued first and the hourly request only after it
/// succeeded. Any failure aborts the whole build.
pub async fn fetch_tide_data(
    client: &NoaaClient,
    location: &str,
    now: NaiveDateTime,
) -> Result<TideData, TideError> {
    let station = stations::station_id(location);
    let today = now.date();
    debug!(location, station, %today, "fetching tide predictions");

    let hilo = client.fetch_hilo(station, today).await?;
    let hourly = client.fetch_hourly(station, today).await?;

    Ok(build_tide_data(location, now, &hilo, &hourly))
}

/// Build the view model from decoded payloads and a reference time.
pub fn build_tide_data(
    location: &str,
    now: NaiveDateTime,
    hilo: &[Prediction],
    hourly: &[HourlySample],
) -> TideData {
    let today = now.date();
    let (today_tides, tomorrow_tides) = split_days(hilo, today);
    let chart_data = chart_points(hourly);

    let now_hm = now.format("%H:%M").to_string();
    let next_time = |kind: TideKind| {
        next_event(&today_tides, &tomorrow_tides, kind, &now_hm)
            .map_or_else(|| NOT_AVAILABLE.to_string(), |event| event.time.clone())
    };

    TideData {
        location: location.to_string(),
        current_tide: current_tide(&chart_data, now.hour()),
        next_high_tide: next_time(TideKind::High),
        next_low_tide: next_time(TideKind::Low),
        weekly_tides: weekly_summary(hilo, today),
        chart_data,
        today_tides,
        tomorrow_tides,
    }
}

/// Bucket high/low predictions into today's and tomorrow's events, keeping
/// upstream order.
pub fn split_days(hilo: &[Prediction], today: NaiveDate) -> (Vec<TideEvent>, Vec<TideEvent>) {
    let today_key = date_key(today);
    let tomorrow_key = date_key(today + Duration::days(1));

    let mut today_tides = Vec::new();
    let mut tomorrow_tides = Vec::new();
    for prediction in hilo {
        let bucket = match prediction.date() {
            d if d == today_key => &mut today_tides,
            d if d == tomorrow_key => &mut tomorrow_tides,
            _ => continue,
        };
        bucket.push(TideEvent {
            time: prediction.time_of_day().to_string(),
            height: format_height(prediction.value),
            kind: prediction.kind,
        });
    }
    (today_tides, tomorrow_tides)
}

/// Hourly samples as chart points, in upstream order.
pub fn chart_points(hourly: &[HourlySample]) -> Vec<TidePoint> {
    hourly
        .iter()
        .map(|sample| TidePoint {
            time: sample.time_of_day().to_string(),
            height: sample.value,
        })
        .collect()
}

/// First event of `kind` strictly after `now_hm`, scanning `today` then
/// `tomorrow`.
///
/// Times are compared as zero padded `HH:MM` strings, so a tomorrow event is
/// only picked when its clock time is later than the current one.
pub fn next_event<'a>(
    today: &'a [TideEvent],
    tomorrow: &'a [TideEvent],
    kind: TideKind,
    now_hm: &str,
) -> Option<&'a TideEvent> {
    today
        .iter()
        .chain(tomorrow)
        .find(|event| event.kind == kind && event.time.as_str() > now_hm)
}

/// Height of the chart point at `hour`, or [`FALLBACK_TIDE_FT`].
pub fn current_tide(chart: &[TidePoint], hour: u32) -> f64 {
    chart
        .get(hour as usize)
        .map_or(FALLBACK_TIDE_FT, |point| point.height)
}

/// Seven day summary starting at `today`.
pub fn weekly_summary(hilo: &[Prediction], today: NaiveDate) -> Vec<WeeklyTide> {
    (0..WEEK_DAYS)
        .map(|offset| {
            let date = today + Duration::days(offset);
            let key = date_key(date);
            let day: Vec<&Prediction> = hilo
                .iter()
                .filter(|p| p.timestamp.starts_with(&key))
                .collect();

            let max_high = day
                .iter()
                .filter(|p| p.kind == TideKind::High)
                .map(|p| p.value)
                .reduce(f64::max)
                .unwrap_or(0.0);
            let min_low = day
                .iter()
                .filter(|p| p.kind == TideKind::Low)
                .map(|p| p.value)
                .reduce(f64::min)
                .unwrap_or(0.0);

            WeeklyTide {
                date: date.format("%b %-d").to_string(),
                day: date.format("%a").to_string(),
                high_tide: format_height(max_high),
                low_tide: format_height(min_low),
                sunrise: SUNRISE_PLACEHOLDER.to_string(),
                sunset: SUNSET_PLACEHOLDER.to_string(),
            }
        })
        .collect()
}
