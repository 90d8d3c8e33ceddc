// Copyright (C) 2026 The ibcp Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use tracing::instrument;

use crate::api::account::BrokerAccount;
use crate::data::history;
use crate::data::history::Historical;
use crate::data::history::Period;
use crate::data::snapshot;
use crate::data::snapshot::Field;
use crate::data::snapshot::Snapshot;
use crate::Client;
use crate::RequestError;


/// A tradable security, as seen through a brokerage account.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Security {
  /// The account the security is accessed through.
  pub broker: BrokerAccount,
  /// The contract ID of the security.
  pub conid: u64,
}

impl Security {
  /// Create a new `Security` for the given contract ID.
  #[inline]
  pub fn new(broker: BrokerAccount, conid: u64) -> Self {
    Self { broker, conid }
  }

  /// Retrieve a market data snapshot with the given fields.
  ///
  /// The gateway only starts collecting market data for a contract once
  /// it has been asked for it, and the first response reports no data.
  /// Hence, we always issue the request twice and report the second
  /// response.
  #[instrument(level = "debug", skip(self, client), fields(conid = self.conid))]
  pub async fn snapshot(
    &self,
    client: &Client,
    fields: &[Field],
  ) -> Result<Vec<Snapshot>, RequestError<snapshot::GetError>> {
    let request = snapshot::GetReq {
      conids: vec![self.conid],
      fields: fields.to_vec(),
    };
    let _subscribed = client.issue::<snapshot::Get>(&request).await?;
    client.issue::<snapshot::Get>(&request).await
  }

  /// Retrieve historical market data covering `period`, aggregated into
  /// bars of size `bar`.
  #[instrument(level = "debug", skip(self, client), fields(conid = self.conid))]
  pub async fn historical(
    &self,
    client: &Client,
    period: Period,
    bar: Period,
  ) -> Result<Historical, RequestError<history::GetError>> {
    let request = history::GetReq {
      conid: self.conid,
      period,
      bar,
      outside_rth: None,
    };
    client.issue::<history::Get>(&request).await
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  use std::sync::atomic::AtomicUsize;
  use std::sync::atomic::Ordering;
  use std::sync::Arc;

  use mockito::Matcher;
  use mockito::Server;

  use test_log::test;

  use crate::client::tests::mock_client;
  use crate::data::history::Unit;


  fn security() -> Security {
    let broker = BrokerAccount {
      id: "U123".to_string(),
    };
    Security::new(broker, 265598)
  }


  /// Check that a snapshot is requested twice and that the second
  /// response is the one reported.
  #[test(tokio::test)]
  async fn snapshot_requested_twice() {
    let mut server = Server::new_async().await;
    let requests = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&requests);
    let mock = server
      .mock("GET", "/v1/api/iserver/marketdata/snapshot")
      .match_query(Matcher::AllOf(vec![
        Matcher::UrlEncoded("conids".into(), "265598".into()),
        Matcher::UrlEncoded("fields".into(), "31,84,86".into()),
      ]))
      .with_status(200)
      .with_body_from_request(move |_request| {
        let count = counter.fetch_add(1, Ordering::SeqCst);
        if count == 0 {
          br#"[{"conid":265598,"conidEx":"265598"}]"#.to_vec()
        } else {
          br#"[{"conid":265598,"server_id":"q0","31":"172.50","84":"172.45","86":"172.55"}]"#
            .to_vec()
        }
      })
      .expect(2)
      .create_async()
      .await;

    let client = mock_client(&server);
    let fields = [Field::LastPrice, Field::BidPrice, Field::AskPrice];
    let snapshots = security().snapshot(&client, &fields).await.unwrap();

    mock.assert_async().await;
    assert_eq!(requests.load(Ordering::SeqCst), 2);
    assert_eq!(snapshots.len(), 1);
    assert_eq!(snapshots[0].conid, 265598);
    assert_eq!(snapshots[0].last_price(), Some(172.5));
    assert_eq!(snapshots[0].bid_price(), Some(172.45));
    assert_eq!(snapshots[0].ask_price(), Some(172.55));
  }

  /// Check that a failure of the initial snapshot request is reported.
  #[test(tokio::test)]
  async fn snapshot_unauthenticated() {
    let mut server = Server::new_async().await;
    let mock = server
      .mock("GET", "/v1/api/iserver/marketdata/snapshot")
      .match_query(Matcher::Any)
      .with_status(401)
      .with_body(r#"{"error":"not authenticated","statusCode":401}"#)
      .expect(1)
      .create_async()
      .await;

    let client = mock_client(&server);
    let err = security()
      .snapshot(&client, &[Field::LastPrice])
      .await
      .unwrap_err();

    match err {
      RequestError::Endpoint(snapshot::GetError::AuthenticationFailed(Ok(message))) => {
        assert_eq!(message.message, "not authenticated")
      },
      _ => panic!("Received unexpected error: {err:?}"),
    }
    mock.assert_async().await;
  }

  /// Check that we can retrieve historical data for a security.
  #[test(tokio::test)]
  async fn request_historical() {
    let mut server = Server::new_async().await;
    let mock = server
      .mock("GET", "/v1/api/iserver/marketdata/history")
      .match_query(Matcher::AllOf(vec![
        Matcher::UrlEncoded("conid".into(), "265598".into()),
        Matcher::UrlEncoded("period".into(), "1w".into()),
        Matcher::UrlEncoded("bar".into(), "1d".into()),
      ]))
      .with_status(200)
      .with_body(
        r#"{"symbol":"AAPL","timePeriod":"1w","barLength":86400,"data":[
          {"o":1.0,"c":2.0,"h":3.0,"l":0.5,"v":100,"t":1699833600000},
          {"o":2.0,"c":1.5,"h":2.5,"l":1.0,"v":200,"t":1699920000000}
        ]}"#,
      )
      .create_async()
      .await;

    let client = mock_client(&server);
    let historical = security()
      .historical(&client, Period::new(1, Unit::Week), Period::new(1, Unit::Day))
      .await
      .unwrap();

    assert_eq!(historical.symbol, "AAPL");
    assert_eq!(historical.bars.len(), 2);
    let columns = historical.to_columns();
    assert_eq!(columns.close, vec![2.0, 1.5]);
    assert_eq!(columns.volume, vec![100.0, 200.0]);
    mock.assert_async().await;
  }

  /// Check that the gateway rejecting a magnitude is reported.
  #[test(tokio::test)]
  async fn historical_out_of_range() {
    let mut server = Server::new_async().await;
    let _mock = server
      .mock("GET", "/v1/api/iserver/marketdata/history")
      .match_query(Matcher::Any)
      .with_status(400)
      .with_body(r#"{"error":"Bar size is not valid"}"#)
      .create_async()
      .await;

    let client = mock_client(&server);
    let err = security()
      .historical(&client, Period::new(1, Unit::Day), Period::new(90, Unit::Minute))
      .await
      .unwrap_err();

    match err {
      RequestError::Endpoint(history::GetError::InvalidInput(Ok(message))) => {
        assert_eq!(message.message, "Bar size is not valid")
      },
      _ => panic!("Received unexpected error: {err:?}"),
    }
  }
}
