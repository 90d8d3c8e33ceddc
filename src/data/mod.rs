// Copyright (C) 2026 The ibcp Developers
// SPDX-License-Identifier: GPL-3.0-or-later

/// Definitions for retrieval of historical market data bars.
pub mod history;
/// Definitions for retrieval of market data snapshots.
pub mod snapshot;
