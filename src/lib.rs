// Copyright (C) 2026 The ibcp Developers
// SPDX-License-Identifier: GPL-3.0-or-later

#![allow(clippy::unreadable_literal)]
#![warn(
  bad_style,
  dead_code,
  future_incompatible,
  improper_ctypes,
  missing_copy_implementations,
  missing_debug_implementations,
  missing_docs,
  no_mangle_generic_items,
  non_shorthand_field_patterns,
  nonstandard_style,
  overflowing_literals,
  path_statements,
  patterns_in_fns_without_body,
  proc_macro_derive_resolution_fallback,
  renamed_and_removed_lints,
  rust_2018_compatibility,
  rust_2018_idioms,
  stable_features,
  trivial_bounds,
  trivial_numeric_casts,
  type_alias_bounds,
  tyvar_behind_raw_pointer,
  unconditional_recursion,
  unreachable_code,
  unreachable_patterns,
  unstable_features,
  unstable_name_collisions,
  unused,
  unused_comparisons,
  unused_import_braces,
  unused_lifetimes,
  unused_qualifications,
  unused_results,
  while_true,
  rustdoc::broken_intra_doc_links
)]

//! A crate for interacting with the Client Portal web API of a
//! brokerage gateway.
//!
//! A typical session looks as follows:
//! ```no_run
//! # async fn session() -> Result<(), ibcp::Error> {
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use ibcp::api::account;
//! use ibcp::api::portfolio;
//! use ibcp::api::position::AssetClass;
//! use ibcp::api::session::keep_alive;
//! use ibcp::data::history::Period;
//! use ibcp::data::history::Unit;
//! use ibcp::ApiInfo;
//! use ibcp::Client;
//!
//! let client = Arc::new(Client::new(ApiInfo::local()?)?);
//! client.authenticate().await?;
//! // The gateway times out idle sessions after a few minutes.
//! let pings = keep_alive(Arc::clone(&client), Duration::from_secs(60));
//!
//! let broker = client.issue::<account::Get>(&()).await?.selected();
//! let portfolios = client.issue::<portfolio::List>(&()).await?;
//! let positions = portfolios[0].positions(&client).await?;
//!
//! for position in positions.filter_by_asset_class(&AssetClass::Future).iter() {
//!   let security = broker.security(position);
//!   let history = security
//!     .historical(&client, Period::new(1, Unit::Day), Period::new(5, Unit::Minute))
//!     .await?;
//!   println!("{}: {} bars", history.symbol, history.bars.len());
//! }
//!
//! pings.cancel().await;
//! # Ok(())
//! # }
//! ```

#[macro_use]
mod endpoint;

/// A module comprising the functionality backing interactions with the
/// API.
pub mod api;

/// A module for retrieving market data.
pub mod data;

mod api_info;
mod client;
mod error;
mod schedule;
mod util;

use std::borrow::Cow;

pub use crate::api_info::ApiInfo;
pub use crate::client::Builder;
pub use crate::client::Client;
pub use crate::endpoint::ApiError;
pub use crate::endpoint::Endpoint;
pub use crate::error::Error;
pub use crate::error::HttpBody;
pub use crate::error::RequestError;
pub use crate::schedule::schedule;
pub use crate::schedule::Schedule;

type Str = Cow<'static, str>;
