//! Transport primitives for the request pipeline.
//!
//! The client's only dependency on an HTTP stack is [`HttpTransport`], whose handles implement
//! [`oauth2::AsyncHttpClient`]. A handle returns every HTTP response it receives, successful or
//! not; status classification happens in the dispatcher. Only failures that produce no response
//! (DNS, TCP, TLS, body streaming) surface as transport errors, which a
//! [`TransportErrorMapper`] turns into [`RequestError`]s.

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// crates.io
use oauth2::{
	AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse,
	http::{HeaderMap, header::RETRY_AFTER},
};
use time::format_description::well_known::Rfc2822;
// self
use crate::{_prelude::*, error::RequestError, request::Verb};

/// Abstraction over HTTP transports capable of executing platform requests.
///
/// Implementations must be `Send + Sync + 'static` so one transport can back many clients, and
/// the handles they return must own whatever state their request futures need so those futures
/// stay `Send` while in flight.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// [`AsyncHttpClient`] handle used for a single request.
	type Handle: for<'c> AsyncHttpClient<
			'c,
			Error = HttpClientError<Self::TransportError>,
			Future: 'c + Send,
		>
		+ 'static
		+ Send
		+ Sync;

	/// Returns a handle for one request.
	fn handle(&self) -> Self::Handle;
}

/// Maps transport failures into normalized [`RequestError`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport for `verb url`.
	fn map_transport_error(&self, verb: Verb, url: &Url, error: HttpClientError<E>)
	-> RequestError;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// The default client does not follow redirects; configure any custom client the same way so
/// that a redirected token request never leaks credentials to another origin.
#[cfg(feature = "reqwest")]
#[derive(Clone)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds the default client with redirects disabled.
	pub fn try_new() -> Result<Self, crate::error::ConfigError> {
		let client =
			ReqwestClient::builder().redirect(reqwest::redirect::Policy::none()).build()?;

		Ok(Self(client))
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestHttpClient {
	type Handle = ReqwestHandle;
	type TransportError = ReqwestError;

	fn handle(&self) -> Self::Handle {
		ReqwestHandle(self.0.clone())
	}
}

/// Handle returned by [`ReqwestHttpClient`] that satisfies [`HttpTransport`].
#[cfg(feature = "reqwest")]
#[derive(Clone)]
pub struct ReqwestHandle(ReqwestClient);
#[cfg(feature = "reqwest")]
impl<'c> AsyncHttpClient<'c> for ReqwestHandle {
	type Error = HttpClientError<ReqwestError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		let client = self.0.clone();

		Box::pin(async move {
			let response =
				client.execute(request.try_into().map_err(Box::new)?).await.map_err(Box::new)?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let mut response_new =
				HttpResponse::new(response.bytes().await.map_err(Box::new)?.to_vec());

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}

/// Default mapper for reqwest-backed transports.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		verb: Verb,
		url: &Url,
		err: HttpClientError<ReqwestError>,
	) -> RequestError {
		match err {
			HttpClientError::Reqwest(inner) => {
				let name = if inner.is_timeout() { "TimeoutError" } else { "RequestError" };
				let error = RequestError::new(name, format!("{verb} {url} failed: {inner}."), None);

				match inner.status() {
					Some(status) => error.with_status(status.as_u16()),
					None => error,
				}
			},
			other => map_generic_transport_error(verb, url, other),
		}
	}
}

/// Fallback mapping shared by transports without special cases.
pub fn map_generic_transport_error<E>(verb: Verb, url: &Url, err: HttpClientError<E>) -> RequestError
where
	E: 'static + Send + Sync + StdError,
{
	let message = match err {
		HttpClientError::Reqwest(inner) => inner.to_string(),
		HttpClientError::Http(inner) => inner.to_string(),
		HttpClientError::Io(inner) => inner.to_string(),
		HttpClientError::Other(message) => message,
		_ => "unknown transport failure".into(),
	};

	RequestError::new("RequestError", format!("{verb} {url} failed: {message}."), None)
}

/// Reads the `Retry-After` hint as a relative duration.
pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u64>() {
		return Some(Duration::seconds(secs as i64));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}

#[cfg(test)]
mod tests {
	// crates.io
	use oauth2::http::HeaderValue;
	// self
	use super::*;

	#[test]
	fn retry_after_accepts_seconds_and_dates() {
		let mut headers = HeaderMap::new();

		assert_eq!(parse_retry_after(&headers), None);

		headers.insert(RETRY_AFTER, HeaderValue::from_static("120"));

		assert_eq!(parse_retry_after(&headers), Some(Duration::seconds(120)));

		headers.insert(RETRY_AFTER, HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"));

		assert_eq!(parse_retry_after(&headers), None, "Past dates carry no wait.");

		headers.insert(RETRY_AFTER, HeaderValue::from_static("soon"));

		assert_eq!(parse_retry_after(&headers), None);
	}

	#[test]
	fn generic_mapping_keeps_message() {
		let url = Url::parse("https://example.com/x").expect("URL parses.");
		let err = map_generic_transport_error::<std::io::Error>(
			Verb::Get,
			&url,
			HttpClientError::Other("connection reset".into()),
		);

		assert_eq!(err.name, "RequestError");
		assert_eq!(err.exception_id, RequestError::UNKNOWN);
		assert_eq!(err.message, "GET https://example.com/x failed: connection reset.");
		assert!(err.status.is_none());
	}
}
