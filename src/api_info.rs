// Copyright (C) 2026 The ibcp Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use url::Url;

use crate::api::API_BASE_URL;
use crate::Error;


/// An object encapsulating the information used for working with the
/// Client Portal API.
///
/// An `ApiInfo` is fixed once created. Every [`Client`][crate::Client]
/// carries its own copy, so there is no global state to coordinate.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiInfo {
  /// The base URL for the API, including any path prefix (e.g., `/v1`).
  pub(crate) base_url: Url,
}

impl ApiInfo {
  /// Create an `ApiInfo` from the required data.
  ///
  /// # Errors
  /// - [`Error::Url`](crate::Error::Url) If `base_url` cannot be parsed
  ///   into a [`url::Url`](url::Url).
  /// - [`Error::Str`](crate::Error::Str) If `base_url` cannot act as a
  ///   base, e.g., because it is a `data:` URL.
  pub fn from_parts(base_url: impl AsRef<str>) -> Result<Self, Error> {
    let base_url = Url::parse(base_url.as_ref())?;
    if base_url.cannot_be_a_base() {
      return Err(Error::Str(
        format!("{base_url} cannot be used as a base URL").into(),
      ))
    }

    Ok(Self { base_url })
  }

  /// Create an `ApiInfo` referring to a gateway running on the local
  /// host with its default settings.
  pub fn local() -> Result<Self, Error> {
    Self::from_parts(API_BASE_URL)
  }

  /// Retrieve the base URL requests are issued against.
  #[inline]
  pub fn base_url(&self) -> &Url {
    &self.base_url
  }
}
