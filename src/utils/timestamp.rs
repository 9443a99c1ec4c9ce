// src/utils/timestamp.rs

//! ISO-8601 rendering of database timestamps.
//!
//! Output follows the shape already present in the exported history:
//! `YYYY-MM-DDTHH:MM:SS`, a `.ffffff` fraction only when the microseconds are
//! non-zero, and a `+HH:MM` suffix only for zone-aware values.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Timelike};
use thiserror::Error;

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"];

#[derive(Error, Debug, PartialEq)]
#[error("Unrecognised timestamp {0:?}")]
pub struct TimestampParseError(pub String);

pub fn isoformat(dt: &NaiveDateTime) -> String {
	let base = dt.format("%Y-%m-%dT%H:%M:%S").to_string();
	let micros = dt.nanosecond() % 1_000_000_000 / 1_000;
	if micros == 0 {
		base
	} else {
		format!("{}.{:06}", base, micros)
	}
}

pub fn isoformat_offset(dt: &DateTime<FixedOffset>) -> String {
	format!("{}{}", isoformat(&dt.naive_local()), dt.format("%:z"))
}

pub fn isoformat_date(date: &NaiveDate) -> String {
	date.format("%Y-%m-%d").to_string()
}

/// Normalizes a timestamp stored as text (SQLite mirror) into the export shape.
pub fn normalize_text(raw: &str) -> Result<String, TimestampParseError> {
	let trimmed = raw.trim();

	if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
		return Ok(isoformat_offset(&dt));
	}
	for format in OFFSET_FORMATS {
		if let Ok(dt) = DateTime::parse_from_str(trimmed, format) {
			return Ok(isoformat_offset(&dt));
		}
	}
	for format in NAIVE_FORMATS {
		if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
			return Ok(isoformat(&dt));
		}
	}
	if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
		return Ok(isoformat_date(&date));
	}

	Err(TimestampParseError(raw.to_string()))
}

/// Renders a unix epoch (seconds) as a naive UTC timestamp.
pub fn from_epoch_seconds(secs: i64) -> Result<String, TimestampParseError> {
	DateTime::from_timestamp(secs, 0)
		.map(|dt| isoformat(&dt.naive_utc()))
		.ok_or_else(|| TimestampParseError(secs.to_string()))
}
