// Copyright (C) 2026 The ibcp Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use std::sync::Arc;
use std::time::Duration;

use serde_json::Error as JsonError;

use tracing::warn;

use crate::schedule::schedule;
use crate::schedule::Schedule;
use crate::Client;
use crate::RequestError;
use crate::Str;


Endpoint! {
  /// The representation of a POST request to the
  /// /api/iserver/reauthenticate endpoint.
  pub Reauthenticate(()),
  Ok => (), [
    /// The reauthentication was triggered.
    /* 200 */ OK,
  ],
  Err => ReauthenticateError, []

  #[inline]
  fn method() -> ::http::Method {
    ::http::Method::POST
  }

  #[inline]
  fn path(_input: &Self::Input) -> Str {
    "/api/iserver/reauthenticate".into()
  }

  fn parse(_body: &[u8]) -> Result<Self::Output, JsonError> {
    Ok(())
  }
}


Endpoint! {
  /// The representation of a POST request to the /tickle endpoint.
  pub Tickle(()),
  Ok => (), [
    /// The session was pinged successfully.
    /* 200 */ OK,
  ],
  Err => TickleError, []

  #[inline]
  fn method() -> ::http::Method {
    ::http::Method::POST
  }

  #[inline]
  fn path(_input: &Self::Input) -> Str {
    "/tickle".into()
  }

  fn parse(_body: &[u8]) -> Result<Self::Output, JsonError> {
    Ok(())
  }
}


impl Client {
  /// (Re)authenticate the brokerage session.
  ///
  /// The gateway answers with a status report we do not interpret.
  pub async fn authenticate(&self) -> Result<(), RequestError<ReauthenticateError>> {
    self.issue::<Reauthenticate>(&()).await
  }

  /// Ping the gateway to keep the authenticated session active.
  ///
  /// Inactive sessions are timed out within a few minutes; see
  /// [`keep_alive`] for running this periodically.
  pub async fn keep_alive(&self) -> Result<(), RequestError<TickleError>> {
    self.issue::<Tickle>(&()).await
  }
}


/// Keep the session of `client` alive by pinging the gateway every
/// `interval`.
///
/// Failures are logged and otherwise ignored; the next tick simply
/// tries again. The returned [`Schedule`] stops the pings once
/// cancelled.
pub fn keep_alive(client: Arc<Client>, interval: Duration) -> Schedule {
  schedule(interval, move || {
    let client = Arc::clone(&client);
    async move {
      if let Err(err) = client.keep_alive().await {
        warn!(error = %err, "failed to keep session alive");
      }
    }
  })
}


#[cfg(test)]
mod tests {
  use super::*;

  use mockito::Server;

  use test_log::test;
  use tokio::time::sleep;

  use crate::client::tests::mock_client;


  /// Check that authentication POSTs to the expected endpoint and
  /// ignores the response body.
  #[test(tokio::test)]
  async fn authenticate() {
    let mut server = Server::new_async().await;
    let mock = server
      .mock("POST", "/v1/api/iserver/reauthenticate")
      .with_status(200)
      .with_body(r#"{"message":"triggered"}"#)
      .create_async()
      .await;

    let client = mock_client(&server);
    let () = client.authenticate().await.unwrap();
    mock.assert_async().await;
  }

  /// Check that an expired session is reported as an authentication
  /// failure.
  #[test(tokio::test)]
  async fn keep_alive_unauthenticated() {
    let mut server = Server::new_async().await;
    let _mock = server
      .mock("POST", "/v1/tickle")
      .with_status(401)
      .create_async()
      .await;

    let client = mock_client(&server);
    let err = client.keep_alive().await.unwrap_err();
    match err {
      RequestError::Endpoint(TickleError::AuthenticationFailed(..)) => (),
      _ => panic!("Received unexpected error: {err:?}"),
    }
  }

  /// Check that the periodic keep-alive pings the gateway until
  /// cancelled.
  #[test(tokio::test)]
  async fn periodic_keep_alive() {
    let mut server = Server::new_async().await;
    let mock = server
      .mock("POST", "/v1/tickle")
      .with_status(200)
      .with_body(r#"{"session":"abc","iserver":{}}"#)
      .expect_at_least(2)
      .create_async()
      .await;

    let client = Arc::new(mock_client(&server));
    let schedule = keep_alive(client, Duration::from_millis(20));
    sleep(Duration::from_millis(150)).await;
    schedule.cancel().await;

    mock.assert_async().await;
  }
}
