// Copyright (C) 2026 The ibcp Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use std::sync::Arc;
use std::time::Duration;

use ibcp::api::account;
use ibcp::api::portfolio;
use ibcp::api::position::AssetClass;
use ibcp::api::session::keep_alive;
use ibcp::data::history::Period;
use ibcp::data::history::Unit;
use ibcp::ApiInfo;
use ibcp::Client;

#[tokio::main]
async fn main() {
  // Requires a gateway running on the local host with a logged in
  // session.
  let api_info = ApiInfo::local().unwrap();
  let client = Arc::new(Client::new(api_info).unwrap());
  client.authenticate().await.unwrap();

  // The gateway times out inactive sessions, so ping it every minute
  // in the background.
  let pings = keep_alive(Arc::clone(&client), Duration::from_secs(60));

  let broker = client.issue::<account::Get>(&()).await.unwrap().selected();
  let portfolios = client.issue::<portfolio::List>(&()).await.unwrap();
  let positions = portfolios[0].positions(&client).await.unwrap();

  for position in &positions.filter_by_asset_class(&AssetClass::Future) {
    let security = broker.security(position);
    let historical = security
      .historical(&client, Period::new(1, Unit::Day), Period::new(1, Unit::Hour))
      .await
      .unwrap();
    let columns = historical.to_columns();
    println!("{}: {:?}", historical.symbol, columns.close);
  }

  pings.cancel().await;
}
