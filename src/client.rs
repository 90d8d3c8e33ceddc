// Copyright (C) 2026 The ibcp Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use std::future::Future;
use std::str::from_utf8;

use http::header::USER_AGENT;
use http::request::Builder as HttpRequestBuilder;
use http::HeaderValue;
use http::Request;
use http::Response;
use http_body_util::BodyExt;
use http_body_util::Full;

use hyper::body::Bytes;
use hyper::body::Incoming;
use hyper_tls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Builder as HttpClientBuilder;
use hyper_util::client::legacy::Client as HttpClient;
use hyper_util::rt::TokioExecutor;

use native_tls::TlsConnector;

use tracing::debug;
use tracing::span;
use tracing::trace;
use tracing::Level;
use tracing_futures::Instrument;

use crate::api_info::ApiInfo;
use crate::endpoint::Endpoint;
use crate::error::RequestError;
use crate::Error;


/// The user agent we identify ourselves with. The gateway rejects
/// requests without one.
const USER_AGENT_VALUE: &str = concat!("ibcp/", env!("CARGO_PKG_VERSION"));


/// A builder for creating customized `Client` objects.
#[derive(Debug)]
pub struct Builder {
  builder: HttpClientBuilder,
  accept_invalid_certs: bool,
}

impl Builder {
  /// Adjust the maximum number of idle connections per host.
  #[inline]
  pub fn max_idle_per_host(&mut self, max_idle: usize) -> &mut Self {
    let _ = self.builder.pool_max_idle_per_host(max_idle);
    self
  }

  /// Set whether to accept certificates the TLS layer cannot verify.
  ///
  /// The gateway serves a self-signed certificate out of the box, which
  /// is why such certificates are accepted by default.
  #[inline]
  pub fn accept_invalid_certs(&mut self, accept: bool) -> &mut Self {
    self.accept_invalid_certs = accept;
    self
  }

  /// Build the final `Client` object.
  ///
  /// # Errors
  /// - [`Error::Tls`](crate::Error::Tls) If the TLS connector could not
  ///   be created.
  pub fn build(&self, api_info: ApiInfo) -> Result<Client, Error> {
    let mut http = HttpConnector::new();
    // The connector is wrapped in a TLS layer and has to let `https`
    // URLs pass.
    http.enforce_http(false);

    let tls = TlsConnector::builder()
      .danger_accept_invalid_certs(self.accept_invalid_certs)
      .danger_accept_invalid_hostnames(self.accept_invalid_certs)
      .build()?;
    let https = HttpsConnector::from((http, tls.into()));
    let client = self.builder.build(https);

    Ok(Client { api_info, client })
  }
}

impl Default for Builder {
  #[cfg(test)]
  fn default() -> Self {
    // Tests spin up a fresh runtime (and mock server) each, so pooled
    // connections would only ever point to dead servers.
    let mut builder = HttpClient::builder(TokioExecutor::new());
    let _ = builder.pool_max_idle_per_host(0);

    Self {
      builder,
      accept_invalid_certs: true,
    }
  }

  #[cfg(not(test))]
  #[inline]
  fn default() -> Self {
    Self {
      builder: HttpClient::builder(TokioExecutor::new()),
      accept_invalid_certs: true,
    }
  }
}


/// A `Client` is the entity used by clients of this module for
/// interacting with the Client Portal API.
///
/// A `Client` is cheap to clone: clones share the underlying connection
/// pool.
#[derive(Clone, Debug)]
pub struct Client {
  api_info: ApiInfo,
  client: HttpClient<HttpsConnector<HttpConnector>, Full<Bytes>>,
}

impl Client {
  /// Instantiate a new `Builder` which allows for creating a customized `Client`.
  #[inline]
  pub fn builder() -> Builder {
    Builder::default()
  }

  /// Create a new `Client` for the API described by `api_info`.
  #[inline]
  pub fn new(api_info: ApiInfo) -> Result<Self, Error> {
    Builder::default().build(api_info)
  }

  /// Add "gzip" as an accepted encoding to the request.
  #[cfg(feature = "gzip")]
  fn maybe_add_gzip_header(request: &mut Request<Full<Bytes>>) {
    use http::header::ACCEPT_ENCODING;

    let _ = request
      .headers_mut()
      .insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip"));
  }

  /// An implementation stub not actually doing anything.
  #[cfg(not(feature = "gzip"))]
  fn maybe_add_gzip_header(_request: &mut Request<Full<Bytes>>) {}

  /// Create a `Request` to the endpoint.
  fn request<R>(&self, input: &R::Input) -> Result<Request<Full<Bytes>>, RequestError<R::Error>>
  where
    R: Endpoint,
  {
    let mut url = self.api_info.base_url.clone();
    // The endpoint path is relative to whatever path prefix the base
    // URL carries (typically `/v1`).
    let path = format!("{}{}", url.path().trim_end_matches('/'), R::path(input));
    url.set_path(&path);
    url.set_query(R::query(input)?.as_deref());

    let mut request = HttpRequestBuilder::new()
      .method(R::method())
      .uri(url.as_str())
      .header(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE))
      .body(Full::new(Bytes::new()))?;

    Self::maybe_add_gzip_header(&mut request);
    Ok(request)
  }

  /// Retrieve the HTTP body, possible uncompressing it if it was gzip
  /// encoded.
  #[cfg(feature = "gzip")]
  async fn retrieve_body<E>(response: Response<Incoming>) -> Result<Bytes, RequestError<E>> {
    use async_compression::futures::bufread::GzipDecoder;
    use futures::AsyncReadExt as _;
    use http::header::CONTENT_ENCODING;

    let (parts, body) = response.into_parts();
    let encoding = parts.headers.get(CONTENT_ENCODING);

    let bytes = BodyExt::collect(body).await?.to_bytes();
    let bytes = match encoding {
      Some(value) if value == HeaderValue::from_static("gzip") => {
        let mut buffer = Vec::new();
        let _count = GzipDecoder::new(&*bytes).read_to_end(&mut buffer).await?;
        buffer.into()
      },
      _ => bytes,
    };

    Ok(bytes)
  }

  /// Retrieve the HTTP body.
  #[cfg(not(feature = "gzip"))]
  async fn retrieve_body<E>(response: Response<Incoming>) -> Result<Bytes, RequestError<E>> {
    let bytes = BodyExt::collect(response.into_body()).await?.to_bytes();
    Ok(bytes)
  }

  /// Create and issue a request and decode the response.
  pub fn issue<'slf, R>(
    &'slf self,
    input: &R::Input,
  ) -> impl Future<Output = Result<R::Output, RequestError<R::Error>>> + 'slf
  where
    R: Endpoint,
    R::Output: 'slf,
    R::Error: 'slf,
  {
    let result = self.request::<R>(input);
    async move {
      let request = result?;
      let span = span!(
        Level::INFO,
        "issue",
        method = %request.method(),
        uri = %request.uri()
      );
      self.issue_::<R>(request).instrument(span).await
    }
  }

  /// Issue a request.
  async fn issue_<R>(
    &self,
    request: Request<Full<Bytes>>,
  ) -> Result<R::Output, RequestError<R::Error>>
  where
    R: Endpoint,
  {
    debug!("requesting");
    trace!(request = ?request);

    let response = self.client.request(request).await?;
    let status = response.status();
    debug!(status = ?status);
    trace!(response = ?response);

    let bytes = Self::retrieve_body::<R::Error>(response).await?;
    let body = bytes.as_ref();
    match from_utf8(body) {
      Ok(s) => trace!(body = %s),
      Err(b) => trace!(body = %b),
    }

    R::evaluate(status, body).map_err(RequestError::Endpoint)
  }

  /// Retrieve the `ApiInfo` object used by this `Client` instance.
  #[inline]
  pub fn api_info(&self) -> &ApiInfo {
    &self.api_info
  }
}


#[cfg(test)]
pub(crate) mod tests {
  use super::*;

  use http::StatusCode;

  use mockito::Server;

  use test_log::test;

  use crate::endpoint::ApiError;
  use crate::Str;


  /// Create a `Client` talking to the given mock server, mimicking the
  /// gateway's `/v1` path prefix.
  pub(crate) fn mock_client(server: &Server) -> Client {
    let api_info = ApiInfo::from_parts(format!("{}/v1", server.url())).unwrap();
    Client::new(api_info).unwrap()
  }


  Endpoint! {
    GetNotFound(()),
    Ok => (), [],
    Err => GetNotFoundError, []

    fn path(_input: &Self::Input) -> Str {
      "/api/foobarbaz".into()
    }
  }


  /// Check that we can retrieve the `ApiInfo` object used by a client.
  #[test]
  fn client_api_info() {
    let api_info = ApiInfo::local().unwrap();
    let client = Client::builder().build(api_info.clone()).unwrap();
    assert_eq!(&api_info, client.api_info());
  }

  /// Check that the endpoint path is appended to the base URL's path.
  #[test]
  fn request_url() {
    let api_info = ApiInfo::from_parts("https://localhost:5000/v1/").unwrap();
    let client = Client::new(api_info).unwrap();

    let request = client.request::<GetNotFound>(&()).unwrap();
    assert_eq!(request.uri(), "https://localhost:5000/v1/api/foobarbaz");
    assert!(request.headers().contains_key(USER_AGENT));
  }

  /// Check basic workings of the HTTP status evaluation logic.
  #[test(tokio::test)]
  async fn unexpected_status_code_return() {
    let mut server = Server::new_async().await;
    let mock = server
      .mock("GET", "/v1/api/foobarbaz")
      .with_status(404)
      .with_body(r#"{"error":"endpoint not found"}"#)
      .create_async()
      .await;

    let client = mock_client(&server);
    let result = client.issue::<GetNotFound>(&()).await;
    let err = result.unwrap_err();

    match err {
      RequestError::Endpoint(GetNotFoundError::UnexpectedStatus(status, message)) => {
        let expected = ApiError {
          message: "endpoint not found".to_string(),
        };
        assert_eq!(message.unwrap(), expected);
        assert_eq!(status, StatusCode::NOT_FOUND);
      },
      _ => panic!("Received unexpected error: {err:?}"),
    };
    mock.assert_async().await;
  }

  /// Check that an unreachable gateway is reported as a transport
  /// error.
  #[test(tokio::test)]
  async fn transport_error() {
    // Port 9 ("discard") is not expected to have anybody listening.
    let api_info = ApiInfo::from_parts("http://127.0.0.1:9/v1").unwrap();
    let client = Client::new(api_info).unwrap();
    let err = client.issue::<GetNotFound>(&()).await.unwrap_err();
    assert!(matches!(err, RequestError::Transport(..)), "{err:?}");
  }
}
