// Copyright (C) 2026 The ibcp Developers
// SPDX-License-Identifier: GPL-3.0-or-later

/// Definitions pertaining the user's brokerage accounts.
pub mod account;
/// Definitions pertaining portfolio accounts.
pub mod portfolio;
/// Definitions surrounding positions held in a portfolio.
pub mod position;
/// Definitions surrounding tradable securities.
pub mod security;
/// Functionality for authenticating and keeping the session alive.
pub mod session;

/// The API base URL of a gateway running locally with default
/// settings.
pub(crate) const API_BASE_URL: &str = "https://localhost:5000/v1";
