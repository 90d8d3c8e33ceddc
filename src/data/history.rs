// Copyright (C) 2026 The ibcp Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::ops::RangeInclusive;

use chrono::DateTime;
use chrono::Utc;

use serde::Deserialize;
use serde::Serialize;
use serde::Serializer;
use serde_urlencoded::to_string as to_query;

use crate::endpoint::ConversionError;
use crate::util::default_from_null;
use crate::util::f64_from_any;
use crate::util::vec_from_str;
use crate::Str;


/// A unit of time, as used for describing periods and bar sizes.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Unit {
  /// Minutes.
  Minute,
  /// Hours.
  Hour,
  /// Days.
  Day,
  /// Weeks.
  Week,
  /// Months.
  Month,
  /// Years.
  Year,
}

impl Unit {
  /// The range of magnitudes the gateway accepts for the unit.
  ///
  /// Magnitudes are not checked against it locally; the gateway
  /// rejects requests exceeding it.
  pub fn range(&self) -> RangeInclusive<u32> {
    match self {
      Self::Minute => 1..=30,
      Self::Hour => 1..=8,
      Self::Day => 1..=1000,
      Self::Week => 1..=792,
      Self::Month => 1..=182,
      Self::Year => 1..=15,
    }
  }
}

impl AsRef<str> for Unit {
  fn as_ref(&self) -> &str {
    match self {
      Self::Minute => "min",
      Self::Hour => "h",
      Self::Day => "d",
      Self::Week => "w",
      Self::Month => "m",
      Self::Year => "y",
    }
  }
}


/// A duration, expressed as a magnitude of a time unit.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Period {
  /// The number of units.
  pub count: u32,
  /// The unit.
  pub unit: Unit,
}

impl Period {
  /// Create a new `Period` of `count` times `unit`.
  #[inline]
  pub const fn new(count: u32, unit: Unit) -> Self {
    Self { count, unit }
  }
}

impl Display for Period {
  fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
    write!(fmt, "{}{}", self.count, self.unit.as_ref())
  }
}

impl Serialize for Period {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    serializer.collect_str(self)
  }
}


/// A GET request to be made to the /api/iserver/marketdata/history
/// endpoint.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct GetReq {
  /// The contract ID of the security.
  #[serde(rename = "conid")]
  pub conid: u64,
  /// The overall period to retrieve data for.
  #[serde(rename = "period")]
  pub period: Period,
  /// The size of each bar.
  #[serde(rename = "bar")]
  pub bar: Period,
  /// Whether to include data from outside regular trading hours.
  #[serde(rename = "outsideRth", skip_serializing_if = "Option::is_none")]
  pub outside_rth: Option<bool>,
}


/// A market data bar.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq)]
pub struct Bar {
  /// The open price.
  #[serde(rename = "o")]
  pub open: f64,
  /// The close price.
  #[serde(rename = "c")]
  pub close: f64,
  /// The highest price.
  #[serde(rename = "h")]
  pub high: f64,
  /// The lowest price.
  #[serde(rename = "l")]
  pub low: f64,
  /// The trading volume.
  #[serde(rename = "v", default, deserialize_with = "f64_from_any")]
  pub volume: f64,
  /// The beginning time of this bar, in milliseconds since the epoch.
  #[serde(rename = "t")]
  pub timestamp: i64,
}

impl Bar {
  /// Retrieve the beginning time of the bar.
  ///
  /// `None` is returned if the timestamp is out of range.
  #[inline]
  pub fn time(&self) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(self.timestamp)
  }
}


/// Historical market data as returned by the
/// /api/iserver/marketdata/history endpoint.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Historical {
  /// The symbol of the security.
  #[serde(rename = "symbol", deserialize_with = "default_from_null")]
  pub symbol: String,
  /// A description of the security.
  #[serde(rename = "text", deserialize_with = "default_from_null")]
  pub text: String,
  /// The factor prices are multiplied with.
  #[serde(rename = "priceFactor", deserialize_with = "default_from_null")]
  pub price_factor: i64,
  /// The time of the first bar, formatted as `YYYYMMDD-HH:MM:SS`.
  #[serde(rename = "startTime", deserialize_with = "default_from_null")]
  pub start_time: String,
  /// The high over the period, formatted.
  #[serde(rename = "high", deserialize_with = "default_from_null")]
  pub high: String,
  /// The low over the period, formatted.
  #[serde(rename = "low", deserialize_with = "default_from_null")]
  pub low: String,
  /// The period covered, e.g., "1d".
  #[serde(rename = "timePeriod", deserialize_with = "default_from_null")]
  pub time_period: String,
  /// The length of a bar, in seconds.
  #[serde(rename = "barLength", deserialize_with = "default_from_null")]
  pub bar_length: i64,
  /// The market data availability.
  #[serde(rename = "mdAvailability", deserialize_with = "default_from_null")]
  pub md_availability: String,
  /// The market data delay, in milliseconds.
  #[serde(rename = "mktDataDelay", deserialize_with = "default_from_null")]
  pub market_data_delay: i64,
  /// Whether data outside regular trading hours is included.
  #[serde(rename = "outsideRth", deserialize_with = "default_from_null")]
  pub outside_rth: bool,
  /// The factor volumes are multiplied with.
  #[serde(rename = "volumeFactor", deserialize_with = "default_from_null")]
  pub volume_factor: i64,
  /// The price display rule.
  #[serde(rename = "priceDisplayRule", deserialize_with = "default_from_null")]
  pub price_display_rule: i64,
  /// The price display value.
  #[serde(rename = "priceDisplayValue", deserialize_with = "default_from_null")]
  pub price_display_value: String,
  /// Whether prices can be negative.
  #[serde(rename = "negativeCapable", deserialize_with = "default_from_null")]
  pub negative_capable: bool,
  /// The version of the message format.
  #[serde(rename = "messageVersion", deserialize_with = "default_from_null")]
  pub message_version: i64,
  /// The bars, in chronological order.
  #[serde(rename = "data", deserialize_with = "vec_from_str")]
  pub bars: Vec<Bar>,
  /// The number of data points.
  #[serde(rename = "points", deserialize_with = "default_from_null")]
  pub points: i64,
  /// The time the gateway took to serve the request, in milliseconds.
  #[serde(rename = "travelTime", deserialize_with = "default_from_null")]
  pub travel_time: i64,
}

impl Historical {
  /// Project the bars into columns.
  pub fn to_columns(&self) -> Columns {
    self.bars.iter().collect()
  }
}


/// A columnar representation of bars, for use in time series analysis.
///
/// All columns have the same length and element `i` of each column
/// belongs to the same bar.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Columns {
  /// The beginning times of the bars, in milliseconds since the epoch.
  pub time: Vec<i64>,
  /// The open prices.
  pub open: Vec<f64>,
  /// The close prices.
  pub close: Vec<f64>,
  /// The highest prices.
  pub high: Vec<f64>,
  /// The lowest prices.
  pub low: Vec<f64>,
  /// The trading volumes.
  pub volume: Vec<f64>,
}

impl Columns {
  /// Retrieve the number of bars.
  #[inline]
  pub fn len(&self) -> usize {
    self.time.len()
  }

  /// Check whether there are no bars.
  #[inline]
  pub fn is_empty(&self) -> bool {
    self.time.is_empty()
  }

  fn push(&mut self, bar: &Bar) {
    self.time.push(bar.timestamp);
    self.open.push(bar.open);
    self.close.push(bar.close);
    self.high.push(bar.high);
    self.low.push(bar.low);
    self.volume.push(bar.volume);
  }
}

impl<'b> FromIterator<&'b Bar> for Columns {
  fn from_iter<I>(iter: I) -> Self
  where
    I: IntoIterator<Item = &'b Bar>,
  {
    iter.into_iter().fold(Columns::default(), |mut columns, bar| {
      columns.push(bar);
      columns
    })
  }
}


Endpoint! {
  /// The representation of a GET request to the
  /// /api/iserver/marketdata/history endpoint.
  pub Get(GetReq),
  Ok => Historical, [
    /// The market data was retrieved successfully.
    /* 200 */ OK,
  ],
  Err => GetError, [
    /// A query parameter was invalid, e.g., a magnitude exceeded the
    /// unit's range.
    /* 400 */ BAD_REQUEST => InvalidInput,
  ]

  #[inline]
  fn path(_input: &Self::Input) -> Str {
    "/api/iserver/marketdata/history".into()
  }

  fn query(input: &Self::Input) -> Result<Option<Str>, ConversionError> {
    Ok(Some(to_query(input)?.into()))
  }
}
