// Copyright (C) 2026 The ibcp Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use serde::Deserialize;

use tracing::debug;
use tracing::instrument;

use crate::api::position;
use crate::api::position::Positions;
use crate::util::default_from_null;
use crate::util::opt_string_from_any;
use crate::Client;
use crate::RequestError;
use crate::Str;


/// A portfolio account as returned by the /api/portfolio/accounts
/// endpoint.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Portfolio {
  /// The portfolio's ID.
  #[serde(rename = "id", deserialize_with = "default_from_null")]
  pub id: String,
  /// The ID of the account positions are held in.
  #[serde(rename = "accountId", deserialize_with = "default_from_null")]
  pub account_id: String,
  /// The account's VAN.
  #[serde(rename = "accountVan", deserialize_with = "default_from_null")]
  pub account_van: String,
  /// The account's title.
  #[serde(rename = "accountTitle", deserialize_with = "default_from_null")]
  pub account_title: String,
  /// The name to display for the account.
  #[serde(rename = "displayName", deserialize_with = "default_from_null")]
  pub display_name: String,
  /// A user defined alias for the account.
  #[serde(rename = "accountAlias", deserialize_with = "opt_string_from_any")]
  pub account_alias: Option<String>,
  /// The account's status.
  #[serde(rename = "accountStatus", deserialize_with = "default_from_null")]
  pub account_status: i64,
  /// The account's base currency.
  #[serde(rename = "currency", deserialize_with = "default_from_null")]
  pub currency: String,
  /// The account type, e.g., "INDIVIDUAL".
  #[serde(rename = "type", deserialize_with = "default_from_null")]
  pub kind: String,
  /// The trading type, e.g., "STKNOPT".
  #[serde(rename = "tradingType", deserialize_with = "default_from_null")]
  pub trading_type: String,
  /// Whether the account belongs to a financial advisor client.
  #[serde(rename = "faclient", deserialize_with = "default_from_null")]
  pub fa_client: bool,
  /// The account's clearing status.
  #[serde(rename = "clearingStatus", deserialize_with = "default_from_null")]
  pub clearing_status: String,
  /// A description of the account.
  #[serde(rename = "desc", deserialize_with = "default_from_null")]
  pub description: String,
  /// Whether the account is a Covestor account.
  #[serde(rename = "covestor", deserialize_with = "default_from_null")]
  pub covestor: bool,
}

impl Portfolio {
  /// Retrieve the first page of positions held in this portfolio.
  ///
  /// Positions beyond the first page are not reported; use
  /// [`Portfolio::all_positions`] to retrieve those as well.
  pub async fn positions(
    &self,
    client: &Client,
  ) -> Result<Positions, RequestError<position::ListError>> {
    self.positions_page(client, 0).await
  }

  /// Retrieve the given page of positions held in this portfolio.
  pub async fn positions_page(
    &self,
    client: &Client,
    page: u32,
  ) -> Result<Positions, RequestError<position::ListError>> {
    let request = position::ListReq {
      account_id: self.account_id.clone(),
      page,
    };
    client.issue::<position::List>(&request).await
  }

  /// Retrieve all positions held in this portfolio, following pages
  /// until the gateway reports an empty page or one with fewer
  /// positions than its page size.
  #[instrument(level = "debug", skip_all, fields(account = %self.account_id))]
  pub async fn all_positions(
    &self,
    client: &Client,
  ) -> Result<Positions, RequestError<position::ListError>> {
    let mut positions = Vec::new();
    for page in 0..=u32::MAX {
      let batch = self.positions_page(client, page).await?;
      let count = batch.len();
      let page_size = batch.first().and_then(|position| position.page_size);
      positions.extend(batch);

      let last = match page_size {
        Some(page_size) => count < page_size as usize,
        None => count == 0,
      };
      if last {
        debug!(pages = u64::from(page) + 1, count = positions.len(), "retrieved all positions");
        break
      }
    }
    Ok(Positions::from(positions))
  }
}


Endpoint! {
  /// The representation of a GET request to the /api/portfolio/accounts
  /// endpoint.
  pub List(()),
  Ok => Vec<Portfolio>, [
    /// The portfolio accounts were retrieved successfully.
    /* 200 */ OK,
  ],
  Err => ListError, []

  #[inline]
  fn path(_input: &Self::Input) -> Str {
    "/api/portfolio/accounts".into()
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  use mockito::Server;

  use serde_json::from_str as from_json;

  use test_log::test;

  use crate::api::position::AssetClass;
  use crate::client::tests::mock_client;


  const PORTFOLIOS: &str = r#"[
  {
    "id": "U123",
    "accountId": "U123",
    "accountVan": "U123",
    "accountTitle": "Jane Doe",
    "displayName": "Jane Doe",
    "accountAlias": null,
    "accountStatus": 1644814800000,
    "currency": "USD",
    "type": "INDIVIDUAL",
    "tradingType": "STKNOPT",
    "faclient": false,
    "clearingStatus": "O",
    "covestor": false,
    "parent": {"mmc": [], "accountId": "", "isMParent": false},
    "desc": "U123"
  }
]"#;


  /// Check that we can decode the reference portfolio list.
  #[test]
  fn parse_reference_portfolios() {
    let portfolios = from_json::<Vec<Portfolio>>(PORTFOLIOS).unwrap();
    assert_eq!(portfolios.len(), 1);

    let portfolio = &portfolios[0];
    assert_eq!(portfolio.account_id, "U123");
    assert_eq!(portfolio.account_alias, None);
    assert_eq!(portfolio.currency, "USD");
    assert_eq!(portfolio.kind, "INDIVIDUAL");
    assert!(!portfolio.fa_client);
  }

  /// Check that `null` members decode into their defaults.
  #[test]
  fn parse_portfolio_with_nulls() {
    let json = r#"[{"accountId":"U123","accountTitle":null,"accountStatus":null,"faclient":null,"desc":null}]"#;
    let portfolios = from_json::<Vec<Portfolio>>(json).unwrap();
    let portfolio = &portfolios[0];
    assert_eq!(portfolio.account_id, "U123");
    assert_eq!(portfolio.account_title, "");
    assert_eq!(portfolio.account_status, 0);
    assert!(!portfolio.fa_client);
    assert_eq!(portfolio.description, "");
  }

  /// Check that we can list portfolios and their positions.
  #[test(tokio::test)]
  async fn list_portfolio_positions() {
    let mut server = Server::new_async().await;
    let portfolios = server
      .mock("GET", "/v1/api/portfolio/accounts")
      .with_status(200)
      .with_body(PORTFOLIOS)
      .create_async()
      .await;
    let positions = server
      .mock("GET", "/v1/api/portfolio/U123/positions/0")
      .with_status(200)
      .with_body(r#"[{"conid":1,"assetClass":"FUT"},{"conid":2,"assetClass":"STK"}]"#)
      .create_async()
      .await;

    let client = mock_client(&server);
    let list = client.issue::<List>(&()).await.unwrap();
    let result = list[0].positions(&client).await.unwrap();
    assert_eq!(result.len(), 2);

    let futures = result.filter_by_asset_class(&AssetClass::Future);
    assert_eq!(futures.len(), 1);
    assert_eq!(futures[0].conid, 1);

    portfolios.assert_async().await;
    positions.assert_async().await;
  }

  /// Check that a page holding fewer positions than the page size is
  /// treated as the last one.
  #[test(tokio::test)]
  async fn list_all_positions_short_page() {
    let mut server = Server::new_async().await;
    let page0 = server
      .mock("GET", "/v1/api/portfolio/U123/positions/0")
      .with_status(200)
      .with_body(r#"[{"conid":1,"pageSize":2},{"conid":2,"pageSize":2}]"#)
      .create_async()
      .await;
    let page1 = server
      .mock("GET", "/v1/api/portfolio/U123/positions/1")
      .with_status(200)
      .with_body(r#"[{"conid":3,"pageSize":2}]"#)
      .create_async()
      .await;
    let page2 = server
      .mock("GET", "/v1/api/portfolio/U123/positions/2")
      .with_status(200)
      .with_body("[]")
      .expect(0)
      .create_async()
      .await;

    let client = mock_client(&server);
    let portfolio = Portfolio {
      account_id: "U123".to_string(),
      ..Default::default()
    };
    let positions = portfolio.all_positions(&client).await.unwrap();
    let conids = positions.iter().map(|pos| pos.conid).collect::<Vec<_>>();
    assert_eq!(conids, vec![1, 2, 3]);

    page0.assert_async().await;
    page1.assert_async().await;
    page2.assert_async().await;
  }

  /// Check that all pages of positions are retrieved, in order.
  #[test(tokio::test)]
  async fn list_all_positions() {
    let mut server = Server::new_async().await;
    let page0 = server
      .mock("GET", "/v1/api/portfolio/U123/positions/0")
      .with_status(200)
      .with_body(r#"[{"conid":1},{"conid":2}]"#)
      .create_async()
      .await;
    let page1 = server
      .mock("GET", "/v1/api/portfolio/U123/positions/1")
      .with_status(200)
      .with_body(r#"[{"conid":3}]"#)
      .create_async()
      .await;
    let page2 = server
      .mock("GET", "/v1/api/portfolio/U123/positions/2")
      .with_status(200)
      .with_body("[]")
      .create_async()
      .await;

    let client = mock_client(&server);
    let portfolio = Portfolio {
      account_id: "U123".to_string(),
      ..Default::default()
    };
    let positions = portfolio.all_positions(&client).await.unwrap();
    let conids = positions.iter().map(|pos| pos.conid).collect::<Vec<_>>();
    assert_eq!(conids, vec![1, 2, 3]);

    page0.assert_async().await;
    page1.assert_async().await;
    page2.assert_async().await;
  }
}
