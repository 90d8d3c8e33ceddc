// Copyright (C) 2026 The ibcp Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::ops::Deref;

use serde::Deserialize;

use crate::util::default_from_null;
use crate::util::f64_from_any;
use crate::util::opt_string_from_any;
use crate::Str;


/// An enumeration of the asset classes (or security types) known to
/// the gateway.
#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq)]
#[serde(from = "String")]
pub enum AssetClass {
  /// Stocks represent a fractional ownership of a business.
  Stock,
  /// Futures are contracts for delivery and payment of an asset in the
  /// future, at a price agreed upon now.
  Future,
  /// Options.
  Option,
  /// Options on futures.
  FutureOption,
  /// Warrants.
  Warrant,
  /// Structured products.
  StructuredProduct,
  /// Contracts for difference.
  Cfd,
  /// Foreign exchange.
  Cash,
  /// Indices.
  Index,
  /// Bonds.
  Bond,
  /// Mutual funds.
  Fund,
  /// Commodities.
  Commodity,
  /// Physical metals.
  PhysicalMetal,
  /// An asset class unknown to this crate, carrying the gateway's code.
  Other(String),
  /// The gateway did not report an asset class.
  #[default]
  Unspecified,
}

impl AsRef<str> for AssetClass {
  fn as_ref(&self) -> &str {
    match self {
      Self::Stock => "STK",
      Self::Future => "FUT",
      Self::Option => "OPT",
      Self::FutureOption => "FOP",
      Self::Warrant => "WAR",
      Self::StructuredProduct => "IOPT",
      Self::Cfd => "CFD",
      Self::Cash => "CASH",
      Self::Index => "IND",
      Self::Bond => "BOND",
      Self::Fund => "FUND",
      Self::Commodity => "CMDTY",
      Self::PhysicalMetal => "PHYSS",
      Self::Other(code) => code,
      Self::Unspecified => "",
    }
  }
}

impl From<String> for AssetClass {
  fn from(code: String) -> Self {
    match code.as_str() {
      "STK" => Self::Stock,
      "FUT" => Self::Future,
      "OPT" => Self::Option,
      "FOP" => Self::FutureOption,
      "WAR" => Self::Warrant,
      "IOPT" => Self::StructuredProduct,
      "CFD" => Self::Cfd,
      "CASH" => Self::Cash,
      "IND" => Self::Index,
      "BOND" => Self::Bond,
      "FUND" => Self::Fund,
      "CMDTY" => Self::Commodity,
      "PHYSS" => Self::PhysicalMetal,
      "" => Self::Unspecified,
      _ => Self::Other(code),
    }
  }
}

impl Display for AssetClass {
  fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
    fmt.write_str(self.as_ref())
  }
}


/// A single position as returned by the
/// /api/portfolio/{accountId}/positions/{page} endpoint.
///
/// Amounts prefixed with `base_` are in the account's base currency,
/// the others are in the currency the position is denominated in.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Position {
  /// The ID of the account holding the position.
  #[serde(rename = "acctId", deserialize_with = "default_from_null")]
  pub account_id: String,
  /// The contract ID of the security.
  #[serde(rename = "conid", deserialize_with = "default_from_null")]
  pub conid: u64,
  /// A description of the contract.
  #[serde(rename = "contractDesc", deserialize_with = "default_from_null")]
  pub contract_description: String,
  /// The quantity held. Negative for short positions.
  #[serde(rename = "position", deserialize_with = "f64_from_any")]
  pub quantity: f64,
  /// The current market price.
  #[serde(rename = "mktPrice", deserialize_with = "f64_from_any")]
  pub market_price: f64,
  /// The current market value.
  #[serde(rename = "mktValue", deserialize_with = "f64_from_any")]
  pub market_value: f64,
  /// The currency the position is denominated in.
  #[serde(rename = "currency", deserialize_with = "default_from_null")]
  pub currency: String,
  /// The average cost of the position.
  #[serde(rename = "avgCost", deserialize_with = "f64_from_any")]
  pub average_cost: f64,
  /// The average price paid.
  #[serde(rename = "avgPrice", deserialize_with = "f64_from_any")]
  pub average_price: f64,
  /// The realized profit/loss.
  #[serde(rename = "realizedPnl", deserialize_with = "f64_from_any")]
  pub realized_pnl: f64,
  /// The unrealized profit/loss.
  #[serde(rename = "unrealizedPnl", deserialize_with = "f64_from_any")]
  pub unrealized_pnl: f64,
  /// The exchanges the security is traded at.
  #[serde(rename = "exchs", deserialize_with = "opt_string_from_any")]
  pub exchanges: Option<String>,
  /// The expiry of a derivative.
  #[serde(rename = "expiry", deserialize_with = "opt_string_from_any")]
  pub expiry: Option<String>,
  /// Whether an option is a put or a call.
  #[serde(rename = "putOrCall", deserialize_with = "opt_string_from_any")]
  pub put_or_call: Option<String>,
  /// The contract multiplier.
  #[serde(rename = "multiplier", deserialize_with = "opt_string_from_any")]
  pub multiplier: Option<String>,
  /// The strike price of an option.
  #[serde(rename = "strike", deserialize_with = "f64_from_any")]
  pub strike: f64,
  /// The exercise style of an option.
  #[serde(rename = "exerciseStyle", deserialize_with = "opt_string_from_any")]
  pub exercise_style: Option<String>,
  /// The asset class of the security.
  #[serde(rename = "assetClass", deserialize_with = "default_from_null")]
  pub asset_class: AssetClass,
  /// The contract ID of the underlying, if any.
  #[serde(rename = "undConid")]
  pub underlying_conid: Option<u64>,
  /// The model portfolio the position belongs to.
  #[serde(rename = "model", deserialize_with = "opt_string_from_any")]
  pub model: Option<String>,
  /// The market value in base currency.
  #[serde(rename = "baseMktValue", deserialize_with = "f64_from_any")]
  pub base_market_value: f64,
  /// The market price in base currency.
  #[serde(rename = "baseMktPrice", deserialize_with = "f64_from_any")]
  pub base_market_price: f64,
  /// The average cost in base currency.
  #[serde(rename = "baseAvgCost", deserialize_with = "f64_from_any")]
  pub base_average_cost: f64,
  /// The average price in base currency.
  #[serde(rename = "baseAvgPrice", deserialize_with = "f64_from_any")]
  pub base_average_price: f64,
  /// The realized profit/loss in base currency.
  #[serde(rename = "baseRealizedPnl", deserialize_with = "f64_from_any")]
  pub base_realized_pnl: f64,
  /// The unrealized profit/loss in base currency.
  #[serde(rename = "baseUnrealizedPnl", deserialize_with = "f64_from_any")]
  pub base_unrealized_pnl: f64,
  /// The time of the last update, in milliseconds since the epoch.
  #[serde(rename = "time")]
  pub time: Option<i64>,
  /// The name of the security.
  #[serde(rename = "name", deserialize_with = "opt_string_from_any")]
  pub name: Option<String>,
  /// The last trading day of a derivative.
  #[serde(rename = "lastTradingDay", deserialize_with = "opt_string_from_any")]
  pub last_trading_day: Option<String>,
  /// The industry group.
  #[serde(rename = "group", deserialize_with = "opt_string_from_any")]
  pub group: Option<String>,
  /// The sector.
  #[serde(rename = "sector", deserialize_with = "opt_string_from_any")]
  pub sector: Option<String>,
  /// The sector group.
  #[serde(rename = "sectorGroup", deserialize_with = "opt_string_from_any")]
  pub sector_group: Option<String>,
  /// The ticker symbol.
  #[serde(rename = "ticker", deserialize_with = "opt_string_from_any")]
  pub ticker: Option<String>,
  /// The type of the security, e.g., "COMMON".
  #[serde(rename = "type", deserialize_with = "opt_string_from_any")]
  pub kind: Option<String>,
  /// The company name of the underlying.
  #[serde(rename = "undComp", deserialize_with = "opt_string_from_any")]
  pub underlying_company: Option<String>,
  /// The symbol of the underlying.
  #[serde(rename = "undSym", deserialize_with = "opt_string_from_any")]
  pub underlying_symbol: Option<String>,
  /// The full name of the contract.
  #[serde(rename = "fullName", deserialize_with = "opt_string_from_any")]
  pub full_name: Option<String>,
  /// The number of positions per page.
  #[serde(rename = "pageSize")]
  pub page_size: Option<u32>,
  /// The name in Chinese, if available.
  #[serde(rename = "chineseName", deserialize_with = "opt_string_from_any")]
  pub chinese_name: Option<String>,
}


/// An ordered list of positions.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Positions(pub Vec<Position>);

impl Positions {
  /// Retrieve the positions of the given asset class, in their original
  /// order.
  pub fn filter_by_asset_class(&self, class: &AssetClass) -> Positions {
    let positions = self
      .0
      .iter()
      .filter(|position| &position.asset_class == class)
      .cloned()
      .collect();
    Positions(positions)
  }

  /// Convert the positions into a plain `Vec`.
  #[inline]
  pub fn into_inner(self) -> Vec<Position> {
    self.0
  }
}

impl Deref for Positions {
  type Target = [Position];

  fn deref(&self) -> &Self::Target {
    &self.0
  }
}

impl From<Vec<Position>> for Positions {
  fn from(positions: Vec<Position>) -> Self {
    Self(positions)
  }
}

impl IntoIterator for Positions {
  type Item = Position;
  type IntoIter = std::vec::IntoIter<Position>;

  fn into_iter(self) -> Self::IntoIter {
    self.0.into_iter()
  }
}

impl<'p> IntoIterator for &'p Positions {
  type Item = &'p Position;
  type IntoIter = std::slice::Iter<'p, Position>;

  fn into_iter(self) -> Self::IntoIter {
    self.0.iter()
  }
}


/// A GET request to be made to the
/// /api/portfolio/{accountId}/positions/{page} endpoint.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ListReq {
  /// The ID of the account to list positions of.
  pub account_id: String,
  /// The zero based page to retrieve.
  pub page: u32,
}


Endpoint! {
  /// The representation of a GET request to the
  /// /api/portfolio/{accountId}/positions/{page} endpoint.
  pub List(ListReq),
  Ok => Positions, [
    /// The positions were retrieved successfully.
    /* 200 */ OK,
  ],
  Err => ListError, []

  fn path(input: &Self::Input) -> Str {
    format!("/api/portfolio/{}/positions/{}", input.account_id, input.page).into()
  }
}
