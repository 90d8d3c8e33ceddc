// Copyright (C) 2026 The ibcp Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use std::collections::HashMap;
use std::str::FromStr;

use serde::Deserialize;
use serde_json::Value;

use crate::endpoint::ConversionError;
use crate::Str;


/// Generate the `Field` enumeration along with the mapping to and from
/// the numeric codes the gateway uses in place of field names.
macro_rules! fields {
  ( $( $(#[$docs:meta])* $variant:ident => $code:literal, )* ) => {
    /// A market data field that can be requested as part of a
    /// snapshot.
    #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
    #[non_exhaustive]
    pub enum Field {
      $(
        $(#[$docs])*
        $variant,
      )*
    }

    impl Field {
      /// All known fields.
      pub const ALL: &'static [Field] = &[$(Field::$variant,)*];

      /// Retrieve the numeric code the gateway uses for the field.
      pub fn code(&self) -> &'static str {
        match self {
          $(Field::$variant => $code,)*
        }
      }
    }

    impl FromStr for Field {
      type Err = ();

      fn from_str(code: &str) -> Result<Self, Self::Err> {
        match code {
          $($code => Ok(Field::$variant),)*
          _ => Err(()),
        }
      }
    }
  };
}

fields! {
  /// The last traded price. Prefixed with "C" when it is the previous
  /// close and "H" when trading is halted.
  LastPrice => "31",
  /// The symbol.
  Symbol => "55",
  /// A textual description.
  Text => "58",
  /// The current day's high price.
  High => "70",
  /// The current day's low price.
  Low => "71",
  /// The quantity held in the selected account.
  Position => "72",
  /// The market value of the position.
  MarketValue => "73",
  /// The average price of the position.
  AveragePrice => "74",
  /// The unrealized profit/loss of the position.
  UnrealizedPnl => "75",
  /// The position, formatted.
  FormattedPosition => "76",
  /// The unrealized profit/loss, formatted.
  FormattedUnrealizedPnl => "77",
  /// The profit/loss for the day.
  DailyPnl => "78",
  /// The difference between last price and previous close.
  ChangePrice => "82",
  /// The change in percent.
  ChangePercent => "83",
  /// The highest bid price.
  BidPrice => "84",
  /// The number of contracts or shares offered at the ask.
  AskSize => "85",
  /// The lowest ask price.
  AskPrice => "86",
  /// The day's volume.
  Volume => "87",
  /// The number of contracts or shares bid for.
  BidSize => "88",
  /// The exchange.
  Exchange => "6004",
  /// The contract ID.
  Conid => "6008",
  /// The security type.
  SecurityType => "6070",
  /// The months.
  Months => "6072",
  /// The regular expiry.
  RegularExpiry => "6073",
  /// The market data delivery method marker.
  MarketDataDeliveryMethodMarker => "6119",
  /// The contract ID of the underlying.
  UnderlyingConid => "6457",
  /// The market data availability.
  MarketDataAvailability => "6509",
  /// The company name.
  CompanyName => "7051",
  /// The number of units traded at the last price.
  LastSize => "7059",
  /// The contract ID and exchange.
  ConidExchange => "7094",
  /// The contract description.
  ContractDescription => "7219",
  /// An alternative contract description.
  ContractDescriptionAlt => "7220",
  /// The listing exchange.
  ListingExchange => "7221",
  /// The industry.
  Industry => "7280",
  /// The category.
  Category => "7281",
  /// The average daily volume over 90 days.
  AverageDailyVolume => "7282",
  /// The historic volume over 30 days.
  HistoricVolume30d => "7284",
  /// The put/call ratio.
  PutCallRatio => "7285",
  /// The dividend amount.
  DividendAmount => "7286",
  /// The dividend yield in percent.
  DividendYieldPercentage => "7287",
  /// The dividend ex-date.
  DividendExDate => "7288",
  /// The market capitalization.
  MarketCap => "7289",
  /// The price/earnings ratio.
  Pe => "7290",
  /// The earnings per share.
  Eps => "7291",
  /// The cost basis of the position.
  CostBasis => "7292",
  /// The 52 week high.
  WeekHigh52 => "7293",
  /// The 52 week low.
  WeekLow52 => "7294",
  /// The day's opening price.
  OpenPrice => "7295",
  /// The day's closing price.
  ClosePrice => "7296",
  /// The option delta.
  Delta => "7308",
  /// The option gamma.
  Gamma => "7309",
  /// The option theta.
  Theta => "7310",
  /// The option vega.
  Vega => "7311",
  /// The implied volatility of the option.
  ImpliedVolatilityOption => "7633",
}


/// Parse a number the way the gateway formats it: possibly with a
/// single letter prefix marking its provenance, thousands separators,
/// and a trailing percent sign.
fn parse_number(s: &str) -> Option<f64> {
  let s = s.trim();
  let s = s.strip_prefix(['C', 'H']).unwrap_or(s);
  let s = s.strip_suffix('%').unwrap_or(s);
  s.replace(',', "").parse().ok()
}


/// A market data snapshot as returned by the
/// /api/iserver/marketdata/snapshot endpoint.
///
/// The gateway only reports the fields it has data for, keyed by their
/// numeric code. Some numeric fields are additionally reported in an
/// unformatted variant, keyed by `<code>_raw`.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Snapshot {
  /// The contract ID the snapshot is for.
  #[serde(rename = "conid")]
  pub conid: u64,
  /// The ID of the server-side subscription.
  #[serde(rename = "server_id", default)]
  pub server_id: Option<String>,
  /// The time of the last update, in milliseconds since the epoch.
  #[serde(rename = "_updated", default)]
  pub updated: Option<i64>,
  /// All remaining fields, keyed by their code.
  #[serde(flatten)]
  fields: HashMap<String, Value>,
}

impl Snapshot {
  /// Retrieve the value of a field as reported by the gateway.
  #[inline]
  pub fn raw(&self, field: Field) -> Option<&Value> {
    self.fields.get(field.code())
  }

  /// Retrieve the textual representation of a field.
  pub fn text(&self, field: Field) -> Option<String> {
    match self.raw(field)? {
      Value::String(string) => Some(string.clone()),
      Value::Number(number) => Some(number.to_string()),
      Value::Bool(bool) => Some(bool.to_string()),
      _ => None,
    }
  }

  /// Retrieve a field as a number.
  ///
  /// The unformatted variant of the field is preferred, if reported.
  /// `None` is returned if the field is absent or not numeric.
  pub fn number(&self, field: Field) -> Option<f64> {
    let raw = format!("{}_raw", field.code());
    let value = self.fields.get(&raw).or_else(|| self.raw(field))?;
    match value {
      Value::Number(number) => number.as_f64(),
      Value::String(string) => parse_number(string),
      _ => None,
    }
  }

  /// Check whether the snapshot carries any market data fields.
  ///
  /// The gateway answers the very first request for a contract with a
  /// snapshot lacking data.
  #[inline]
  pub fn is_empty(&self) -> bool {
    !self.fields.keys().any(|key| {
      let code = key.strip_suffix("_raw").unwrap_or(key);
      Field::from_str(code).is_ok()
    })
  }

  /// Iterate over all reported fields known to this crate.
  pub fn fields(&self) -> impl Iterator<Item = (Field, &Value)> + '_ {
    Field::ALL
      .iter()
      .filter_map(move |field| self.raw(*field).map(|value| (*field, value)))
  }

  /// Retrieve the last price.
  #[inline]
  pub fn last_price(&self) -> Option<f64> {
    self.number(Field::LastPrice)
  }

  /// Retrieve the bid price.
  #[inline]
  pub fn bid_price(&self) -> Option<f64> {
    self.number(Field::BidPrice)
  }

  /// Retrieve the ask price.
  #[inline]
  pub fn ask_price(&self) -> Option<f64> {
    self.number(Field::AskPrice)
  }

  /// Retrieve the symbol.
  #[inline]
  pub fn symbol(&self) -> Option<String> {
    self.text(Field::Symbol)
  }
}


/// A GET request to be made to the /api/iserver/marketdata/snapshot
/// endpoint.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GetReq {
  /// The contract IDs to retrieve snapshots for.
  pub conids: Vec<u64>,
  /// The fields to retrieve.
  pub fields: Vec<Field>,
}


Endpoint! {
  /// The representation of a GET request to the
  /// /api/iserver/marketdata/snapshot endpoint.
  pub Get(GetReq),
  Ok => Vec<Snapshot>, [
    /// The snapshots were retrieved successfully.
    /* 200 */ OK,
  ],
  Err => GetError, [
    /// A query parameter was invalid.
    /* 400 */ BAD_REQUEST => InvalidInput,
  ]

  #[inline]
  fn path(_input: &Self::Input) -> Str {
    "/api/iserver/marketdata/snapshot".into()
  }

  fn query(input: &Self::Input) -> Result<Option<Str>, ConversionError> {
    // The gateway expects plain comma separated lists, which is why we
    // do not URL encode here. Neither list contains anything needing
    // encoding.
    let conids = input
      .conids
      .iter()
      .map(u64::to_string)
      .collect::<Vec<_>>()
      .join(",");
    let fields = input
      .fields
      .iter()
      .map(Field::code)
      .collect::<Vec<_>>()
      .join(",");
    Ok(Some(format!("conids={conids}&fields={fields}").into()))
  }
}
