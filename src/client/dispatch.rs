// crates.io
use oauth2::AsyncHttpClient;
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	client::Client,
	error::RequestError,
	http::{self, HttpTransport, TransportErrorMapper},
	request::{self, RequestOptions, Verb},
};

impl<C, M> Client<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Performs one HTTP call against `path` (relative to the base address) and returns the
	/// parsed body with its envelope intact.
	///
	/// Headers are composed from the token held when the call is dispatched. Non-2xx answers,
	/// network failures, and 2xx bodies that are not JSON all surface as [`RequestError`]; an
	/// empty 2xx body yields [`Value::Null`]. Nothing is retried here.
	pub async fn send_request(
		&self,
		path: &str,
		options: &RequestOptions,
		verb: Verb,
	) -> Result<Value> {
		let state = self.token_state();

		self.dispatch(path, options, verb, state.access_token()).await
	}

	pub(crate) async fn dispatch(
		&self,
		path: &str,
		options: &RequestOptions,
		verb: Verb,
		access_token: Option<&TokenSecret>,
	) -> Result<Value> {
		let url = request::build_url(&self.base_url, path, &options.query)?;
		let headers = request::compose_headers(access_token, options)?;
		let payload = request::encode_payload(options)?;
		let http_request = request::build_request(verb, &url, headers, payload)?;
		let handle = self.http_client.handle();
		let response = handle
			.call(http_request)
			.await
			.map_err(|err| self.transport_mapper.map_transport_error(verb, &url, err))?;
		let status = response.status();

		if !status.is_success() {
			let err = RequestError::from_status(status.as_u16(), response.body())
				.with_retry_after(http::parse_retry_after(response.headers()));

			return Err(err.into());
		}

		Ok(decode_body(status.as_u16(), response.body())?)
	}
}

fn decode_body(status: u16, body: &[u8]) -> Result<Value, RequestError> {
	if body.iter().all(u8::is_ascii_whitespace) {
		return Ok(Value::Null);
	}

	serde_json::from_slice(body).map_err(|err| {
		RequestError::new("ParseError", format!("Response body is not valid JSON: {err}."), None)
			.with_status(status)
	})
}
