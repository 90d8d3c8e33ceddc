// Copyright (C) 2026 The ibcp Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use http::Method;
use http::StatusCode;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::from_slice;
use serde_json::Error as JsonError;

use crate::Str;


/// The error type used when converting an endpoint's input into a
/// query.
pub type ConversionError = serde_urlencoded::ser::Error;


/// An error message as reported by the gateway.
///
/// The gateway reports failures in the form of `{"error": "..."}`,
/// sometimes accompanied by additional fields we do not care about.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ApiError {
  /// The message as provided by the gateway.
  #[serde(rename = "error")]
  pub message: String,
}


/// A trait describing an HTTP endpoint.
///
/// An endpoint for our intents and purposes is basically a path and an
/// HTTP request method (e.g., GET or POST). The path will be appended
/// to the base URL the client was configured with. Query parameters are
/// supported as well.
pub trait Endpoint {
  /// The type of data being passed in as part of a request to this
  /// endpoint.
  type Input;
  /// The type of data being returned in the response from this
  /// endpoint.
  type Output: DeserializeOwned;
  /// The type of error this endpoint can report.
  type Error;

  /// Retrieve the HTTP method to use.
  ///
  /// The default method being used is GET.
  fn method() -> Method {
    Method::GET
  }

  /// Inquire the path the request should go to, relative to the base
  /// URL.
  fn path(input: &Self::Input) -> Str;

  /// Inquire the query the request should use.
  ///
  /// By default no query is emitted.
  #[allow(unused)]
  fn query(input: &Self::Input) -> Result<Option<Str>, ConversionError> {
    Ok(None)
  }

  /// Parse the body into the final result.
  ///
  /// By default this method directly parses the body as JSON.
  fn parse(body: &[u8]) -> Result<Self::Output, JsonError> {
    from_slice::<Self::Output>(body)
  }

  /// Evaluate an HTTP status and body, converting them into an output
  /// object or an error.
  fn evaluate(status: StatusCode, body: &[u8]) -> Result<Self::Output, Self::Error>;
}


/// A macro used for defining the properties for a request to a
/// particular HTTP endpoint.
///
/// Besides the endpoint type itself it defines the endpoint's error
/// type and the mapping from HTTP status codes to it.
macro_rules! Endpoint {
  ( $(#[$docs:meta])* $pub:vis $name:ident($in:ty),
    // We just ignore any documentation for success cases: there is
    // nowhere we can put it.
    Ok => $out:ty, [$($(#[$ok_docs:meta])* $ok_status:ident,)*],
    Err => $err:ident, [$($(#[$err_docs:meta])* $err_status:ident => $variant:ident,)*]
    $($defs:tt)* ) => {

    EndpointImpl! {
      $(#[$docs])* $pub $name($in),
      Ok => $out, [$($ok_status,)*],
      Err => $err, [
        // Every request can hit an expired session or fall prey to the
        // rate limit and so we include these variants into all our
        // error definitions.
        /// Authentication failed for the request, e.g., because the
        /// session expired.
        /* 401 */ UNAUTHORIZED => AuthenticationFailed,
        /// The rate limit was exceeded, causing the request to be
        /// denied.
        /* 429 */ TOO_MANY_REQUESTS => RateLimitExceeded,
        $($(#[$err_docs])* $err_status => $variant,)*
      ]
      $($defs)*
    }
  };
}

macro_rules! EndpointImpl {
  ( $(#[$docs:meta])* $pub:vis $name:ident($in:ty),
    Ok => $out:ty, [$($ok_status:ident,)*],
    Err => $err:ident, [$($(#[$err_docs:meta])* $err_status:ident => $variant:ident,)*]
    $($defs:tt)* ) => {

    $(#[$docs])*
    #[derive(Clone, Copy, Debug)]
    $pub struct $name;

    /// An enum representing the various errors this endpoint may
    /// encounter.
    #[allow(unused_qualifications)]
    #[derive(Debug)]
    $pub enum $err {
      $(
        $(#[$err_docs])*
        $variant(::std::result::Result<crate::endpoint::ApiError, ::std::vec::Vec<u8>>),
      )*
      /// An HTTP status not present in the endpoint's definition was
      /// encountered.
      UnexpectedStatus(
        ::http::StatusCode,
        ::std::result::Result<crate::endpoint::ApiError, ::std::vec::Vec<u8>>,
      ),
      /// The response body could not be decoded.
      Json(::serde_json::Error),
    }

    #[allow(unused_qualifications)]
    impl ::std::fmt::Display for $err {
      fn fmt(&self, fmt: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
        fn format_message(
          message: &::std::result::Result<crate::endpoint::ApiError, ::std::vec::Vec<u8>>,
        ) -> ::std::string::String {
          match message {
            Ok(crate::endpoint::ApiError { message }) => message.clone(),
            Err(body) => match ::std::str::from_utf8(body) {
              Ok(body) => body.to_string(),
              Err(err) => err.to_string(),
            },
          }
        }

        match self {
          $(
            $err::$variant(message) => {
              let status = ::http::StatusCode::$err_status;
              let message = format_message(message);
              write!(fmt, "HTTP status {}: {}", status, message)
            },
          )*
          $err::UnexpectedStatus(status, message) => {
            let message = format_message(message);
            write!(fmt, "Unexpected HTTP status {}: {}", status, message)
          },
          $err::Json(..) => fmt.write_str("failed to decode the response body"),
        }
      }
    }

    #[allow(unused_qualifications)]
    impl ::std::error::Error for $err {
      fn source(&self) -> ::std::option::Option<&(dyn ::std::error::Error + 'static)> {
        match self {
          $err::Json(err) => Some(err),
          _ => None,
        }
      }
    }

    #[allow(unused_qualifications)]
    impl ::std::convert::From<::serde_json::Error> for $err {
      fn from(src: ::serde_json::Error) -> Self {
        $err::Json(src)
      }
    }

    #[allow(unused_qualifications)]
    impl ::std::convert::From<$err> for crate::Error {
      fn from(src: $err) -> Self {
        match src {
          $(
            $err::$variant(message) => crate::Error::HttpStatus(
              ::http::StatusCode::$err_status,
              crate::error::HttpBody::from_message(message),
            ),
          )*
          $err::UnexpectedStatus(status, message) => {
            crate::Error::HttpStatus(status, crate::error::HttpBody::from_message(message))
          },
          $err::Json(err) => crate::Error::Json(err),
        }
      }
    }

    #[allow(unused_qualifications)]
    impl crate::endpoint::Endpoint for $name {
      type Input = $in;
      type Output = $out;
      type Error = $err;

      $($defs)*

      fn evaluate(
        status: ::http::StatusCode,
        body: &[u8],
      ) -> ::std::result::Result<Self::Output, Self::Error> {
        match status {
          $(
            ::http::StatusCode::$ok_status => {
              <Self as crate::endpoint::Endpoint>::parse(body).map_err($err::from)
            },
          )*
          status => {
            let message = ::serde_json::from_slice::<crate::endpoint::ApiError>(body)
              .map_err(|_| body.to_vec());

            match status {
              $(
                ::http::StatusCode::$err_status => Err($err::$variant(message)),
              )*
              _ => Err($err::UnexpectedStatus(status, message)),
            }
          },
        }
      }
    }
  };
}


#[cfg(test)]
mod tests {
  use super::*;

  use test_log::test;


  Endpoint! {
    GetNothing(()),
    Ok => Vec<u64>, [
      /* 200 */ OK,
    ],
    Err => GetNothingError, [
      /// Nothing was found.
      /* 404 */ NOT_FOUND => NotFound,
    ]

    fn path(_input: &Self::Input) -> Str {
      "/nothing".into()
    }
  }


  /// Check that a successful status leads to the body being decoded.
  #[test]
  fn evaluate_success() {
    let output = GetNothing::evaluate(StatusCode::OK, b"[1,2,3]").unwrap();
    assert_eq!(output, vec![1, 2, 3]);
  }

  /// Check that an undecodable body on success is reported as such.
  #[test]
  fn evaluate_invalid_body() {
    let err = GetNothing::evaluate(StatusCode::OK, b"{").unwrap_err();
    assert!(matches!(err, GetNothingError::Json(..)), "{err:?}");
  }

  /// Check that the implicitly added status codes are mapped.
  #[test]
  fn evaluate_authentication_failure() {
    let body = br#"{"error":"not authenticated","statusCode":401}"#;
    let err = GetNothing::evaluate(StatusCode::UNAUTHORIZED, body).unwrap_err();
    match err {
      GetNothingError::AuthenticationFailed(Ok(ApiError { message })) => {
        assert_eq!(message, "not authenticated")
      },
      _ => panic!("Received unexpected error: {err:?}"),
    }
  }

  /// Check that endpoint specific status codes are mapped and that a
  /// body not conforming to the error format is retained.
  #[test]
  fn evaluate_declared_and_unexpected_status() {
    let err = GetNothing::evaluate(StatusCode::NOT_FOUND, b"gone").unwrap_err();
    match err {
      GetNothingError::NotFound(Err(body)) => assert_eq!(body, b"gone"),
      _ => panic!("Received unexpected error: {err:?}"),
    }

    let err = GetNothing::evaluate(StatusCode::SERVICE_UNAVAILABLE, b"").unwrap_err();
    match &err {
      GetNothingError::UnexpectedStatus(status, Err(_)) => {
        assert_eq!(*status, StatusCode::SERVICE_UNAVAILABLE)
      },
      _ => panic!("Received unexpected error: {err:?}"),
    }
    assert_eq!(err.to_string(), "Unexpected HTTP status 503 Service Unavailable: ");
  }
}
