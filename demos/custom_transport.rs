//! Demonstrates plugging a custom HTTP transport and error mapper into the client.
//!
//! 1. Implement [`HttpTransport`] with a handle that satisfies [`AsyncHttpClient`].
//! 2. Provide a [`TransportErrorMapper`] for the transport's error type.
//! 3. Pass both to [`Client::with_http_client`].

// std
use std::{
	error::Error as StdError,
	fmt::{Display, Formatter, Result as FmtResult},
	future::Future,
	pin::Pin,
};
// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use color_eyre::Result;
use serde_json::json;
use time::{Duration, OffsetDateTime};
use url::Url;
// self
use cpaas_client::{
	client::{Client, TOKEN_PATH},
	config::ClientConfig,
	error::RequestError,
	http::{HttpTransport, TransportErrorMapper},
	oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse, http::StatusCode},
	request::Verb,
};

/// Transport that answers from memory instead of the network.
#[derive(Clone, Debug, Default)]
struct CannedTransport;
impl HttpTransport for CannedTransport {
	type Handle = CannedHandle;
	type TransportError = CannedError;

	fn handle(&self) -> Self::Handle {
		CannedHandle
	}
}

#[derive(Clone, Debug)]
struct CannedHandle;
impl<'c> AsyncHttpClient<'c> for CannedHandle {
	type Error = HttpClientError<CannedError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		Box::pin(async move {
			let body = match request.uri().path() {
				TOKEN_PATH => {
					let token = canned_token();

					json!({ "access_token": token, "id_token": token })
				},
				"/cpaas/notificationchannel/v1/canned-user/channels" =>
					json!({ "notificationChannelList": { "notificationChannel": [] } }),
				path => return Err(HttpClientError::Reqwest(Box::new(CannedError(path.into())))),
			};
			let mut response = HttpResponse::new(body.to_string().into_bytes());

			*response.status_mut() = StatusCode::OK;

			Ok(response)
		})
	}
}

#[derive(Debug)]
struct CannedError(String);
impl Display for CannedError {
	fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
		write!(f, "no canned answer for {}", self.0)
	}
}
impl StdError for CannedError {}

#[derive(Debug, Default)]
struct CannedErrorMapper;
impl TransportErrorMapper<CannedError> for CannedErrorMapper {
	fn map_transport_error(
		&self,
		verb: Verb,
		url: &Url,
		error: HttpClientError<CannedError>,
	) -> RequestError {
		RequestError::new("CannedError", format!("{verb} {url}: {error}."), None)
	}
}

fn canned_token() -> String {
	let now = OffsetDateTime::now_utc();
	let claims = json!({
		"iat": now.unix_timestamp(),
		"exp": (now + Duration::hours(1)).unix_timestamp(),
		"preferred_username": "canned-user"
	});

	format!(
		"{}.{}.canned",
		URL_SAFE_NO_PAD.encode(br#"{"alg":"none"}"#),
		URL_SAFE_NO_PAD.encode(claims.to_string())
	)
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let config = ClientConfig::new("PRIV-canned").with_client_secret("canned-secret");
	let client: Client<CannedTransport, CannedErrorMapper> =
		Client::with_http_client(&config, CannedTransport, CannedErrorMapper)?;
	let channels = client.notification_channel().channels().await?;

	println!("Channels: {channels}.");

	match client.twofactor().delete_code("c-1").await {
		Ok(deleted) => println!("Deleted: {deleted}."),
		Err(err) => println!("Mapped failure: {err}."),
	}

	Ok(())
}
