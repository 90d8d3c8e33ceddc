// Copyright (C) 2026 The ibcp Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use std::error::Error as StdError;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::str::from_utf8;

use http::Error as HttpError;
use http::StatusCode as HttpStatusCode;
use hyper::Error as HyperError;
use hyper_util::client::legacy::Error as TransportError;
use native_tls::Error as TlsError;
use serde_json::Error as JsonError;
use serde_urlencoded::ser::Error as ConversionError;
use thiserror::Error;
use url::ParseError;

use crate::endpoint::ApiError;
use crate::Str;


/// An error encountered while issuing a request.
#[derive(Debug, Error)]
pub enum RequestError<E> {
  /// An endpoint reported error.
  ///
  /// This variant covers HTTP status failures as well as failures to
  /// decode the response body.
  #[error("the endpoint reported an error")]
  Endpoint(#[source] E),
  /// The request could not be delivered or the connection failed.
  #[error("failed to transfer the request")]
  Transport(
    #[from]
    #[source]
    TransportError,
  ),
  /// An error reported by the `hyper` crate while reading the body.
  #[error("the hyper crate reported an error")]
  Hyper(
    #[from]
    #[source]
    HyperError,
  ),
  /// The HTTP request could not be constructed.
  #[error("failed to create the HTTP request")]
  Http(
    #[from]
    #[source]
    HttpError,
  ),
  /// The request's query could not be encoded.
  #[error("failed to encode the request query")]
  Conversion(
    #[from]
    #[source]
    ConversionError,
  ),
  /// An I/O error while decompressing the body.
  #[error("failed to decompress the response body")]
  Io(
    #[from]
    #[source]
    std::io::Error,
  ),
}


/// The raw body of an HTTP response.
#[derive(Clone, Debug, PartialEq)]
pub struct HttpBody(Vec<u8>);

impl HttpBody {
  /// Create an `HttpBody` from the message an endpoint extracted from
  /// an unsuccessful response.
  pub(crate) fn from_message(message: Result<ApiError, Vec<u8>>) -> Self {
    match message {
      Ok(ApiError { message }) => Self(message.into_bytes()),
      Err(body) => Self(body),
    }
  }
}

impl Display for HttpBody {
  fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
    match from_utf8(&self.0) {
      Ok(s) => fmt.write_str(s)?,
      Err(b) => write!(fmt, "{:?}", b)?,
    }
    Ok(())
  }
}

impl StdError for HttpBody {}


/// The error type as used by this crate.
#[derive(Debug, Error)]
pub enum Error {
  /// An HTTP related error.
  #[error("encountered an HTTP related error")]
  Http(
    #[from]
    #[source]
    HttpError,
  ),
  /// We encountered an HTTP status code that either represents a
  /// failure or is not supported.
  #[error("encountered an unexpected HTTP status: {0}")]
  HttpStatus(HttpStatusCode, #[source] HttpBody),
  /// A request could not be delivered to the gateway.
  #[error("failed to transfer the request")]
  Transport(
    #[from]
    #[source]
    TransportError,
  ),
  /// An error reported by the `hyper` crate.
  #[error("the hyper crate reported an error")]
  Hyper(
    #[from]
    #[source]
    HyperError,
  ),
  /// A JSON conversion error.
  #[error("a JSON conversion failed")]
  Json(
    #[from]
    #[source]
    JsonError,
  ),
  /// A query could not be encoded.
  #[error("failed to encode a query")]
  Conversion(
    #[from]
    #[source]
    ConversionError,
  ),
  /// An I/O error.
  #[error("encountered an I/O error")]
  Io(
    #[from]
    #[source]
    std::io::Error,
  ),
  /// The TLS connector could not be set up.
  #[error("failed to set up TLS")]
  Tls(
    #[from]
    #[source]
    TlsError,
  ),
  /// An error directly originating in this crate.
  #[error("{0}")]
  Str(Str),
  /// An URL parsing error.
  #[error("failed to parse the URL")]
  Url(
    #[from]
    #[source]
    ParseError,
  ),
}

impl<E> From<RequestError<E>> for Error
where
  E: Into<Error>,
{
  fn from(src: RequestError<E>) -> Self {
    match src {
      RequestError::Endpoint(err) => err.into(),
      RequestError::Transport(err) => Error::Transport(err),
      RequestError::Hyper(err) => Error::Hyper(err),
      RequestError::Http(err) => Error::Http(err),
      RequestError::Conversion(err) => Error::Conversion(err),
      RequestError::Io(err) => Error::Io(err),
    }
  }
}
