// Copyright (C) 2026 The ibcp Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use std::collections::HashMap;

use serde::Deserialize;

use crate::api::position::AssetClass;
use crate::api::position::Position;
use crate::api::security::Security;
use crate::util::default_from_null;
use crate::Str;


/// Features the gateway enables for the logged in user.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct AllowFeatures {
  /// Whether GFIS content is shown.
  #[serde(rename = "showGFIS", deserialize_with = "default_from_null")]
  pub show_gfis: bool,
  /// Whether currency conversion is permitted.
  #[serde(rename = "allowFXConv", deserialize_with = "default_from_null")]
  pub allow_fx_conversion: bool,
  /// Whether type-ahead symbol search is available.
  #[serde(rename = "allowTypeAhead", deserialize_with = "default_from_null")]
  pub allow_type_ahead: bool,
  /// The refresh timeout for snapshots, in milliseconds.
  #[serde(rename = "snapshotRefreshTimeout", deserialize_with = "default_from_null")]
  pub snapshot_refresh_timeout: u64,
  /// Whether the user is on a "lite" plan.
  #[serde(rename = "liteUser", deserialize_with = "default_from_null")]
  pub lite_user: bool,
  /// Whether news are available.
  #[serde(rename = "showWebNews", deserialize_with = "default_from_null")]
  pub show_web_news: bool,
  /// Whether research content is available.
  #[serde(rename = "research", deserialize_with = "default_from_null")]
  pub research: bool,
  /// Whether PnL debugging is enabled.
  #[serde(rename = "debugPnl", deserialize_with = "default_from_null")]
  pub debug_pnl: bool,
  /// Whether tax optimization is offered.
  #[serde(rename = "showTaxOpt", deserialize_with = "default_from_null")]
  pub show_tax_opt: bool,
}


/// The brokerage accounts as returned by the /api/iserver/accounts
/// endpoint.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct BrokerAccounts {
  /// The IDs of all accounts accessible to the user.
  #[serde(rename = "accounts", default)]
  pub accounts: Vec<String>,
  /// The chart periods supported, keyed by asset class code (e.g.,
  /// "STK").
  #[serde(rename = "chartPeriods", default)]
  pub chart_periods: HashMap<String, Vec<String>>,
  /// The ID of the currently selected account.
  #[serde(rename = "selectedAccount")]
  pub selected_account: String,
  /// Features enabled for the user.
  #[serde(rename = "allowFeatures", default)]
  pub allow_features: AllowFeatures,
}

impl BrokerAccounts {
  /// Retrieve the currently selected brokerage account.
  pub fn selected(&self) -> BrokerAccount {
    BrokerAccount {
      id: self.selected_account.clone(),
    }
  }

  /// Retrieve the chart periods supported for the given asset class.
  pub fn chart_periods(&self, class: &AssetClass) -> &[String] {
    self
      .chart_periods
      .get(class.as_ref())
      .map(Vec::as_slice)
      .unwrap_or_default()
  }
}


/// A brokerage account.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct BrokerAccount {
  /// The account's ID.
  pub id: String,
}

impl BrokerAccount {
  /// Create a reference to the security underlying `position`, to be
  /// traded through this account.
  pub fn security(&self, position: &Position) -> Security {
    Security::new(self.clone(), position.conid)
  }
}


Endpoint! {
  /// The representation of a GET request to the /api/iserver/accounts
  /// endpoint.
  pub Get(()),
  Ok => BrokerAccounts, [
    /// The accounts were retrieved successfully.
    /* 200 */ OK,
  ],
  Err => GetError, []

  #[inline]
  fn path(_input: &Self::Input) -> Str {
    "/api/iserver/accounts".into()
  }
}
