//! Two-factor authentication codes delivered by SMS or email.

// self
use crate::{
	_prelude::*,
	client::Client,
	http::{HttpTransport, TransportErrorMapper},
	request::{self, RequestOptions, Verb},
	resources::Addresses,
	response::{self, ResourceResponse},
};

const BASE_PATH: &str = "/cpaas/auth/v1";

/// Message returned when a verification code is rejected.
pub const CODE_REJECTED: &str = "Code invalid or expired";

/// Channel the code is delivered through.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMethod {
	/// Text message to an E.164 number.
	#[default]
	Sms,
	/// Email to an address.
	Email,
}

/// Alphabet the platform draws the code from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeFormat {
	/// Digits only.
	#[default]
	Numeric,
	/// Letters and digits.
	Alphanumeric,
	/// Letters only.
	Alphabetic,
}

/// Parameters for sending or resending a code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodeRequest {
	/// Destination addresses; phone numbers for SMS, email addresses for email.
	pub destination_address: Vec<String>,
	/// Message text; must contain the `{code}` placeholder.
	pub message: String,
	/// Delivery channel.
	pub method: DeliveryMethod,
	/// Code lifetime in seconds (30 to 3600).
	pub expiry: u32,
	/// Code length (4 to 10).
	pub length: u32,
	/// Code alphabet.
	pub format: CodeFormat,
}
impl CodeRequest {
	/// Default code lifetime in seconds.
	pub const DEFAULT_EXPIRY: u32 = 120;
	/// Default code length.
	pub const DEFAULT_LENGTH: u32 = 6;

	/// Creates a request with the default method, lifetime, length, and alphabet.
	pub fn new(destination: impl Into<Addresses>, message: impl Into<String>) -> Self {
		Self {
			destination_address: destination.into().0,
			message: message.into(),
			method: DeliveryMethod::default(),
			expiry: Self::DEFAULT_EXPIRY,
			length: Self::DEFAULT_LENGTH,
			format: CodeFormat::default(),
		}
	}

	/// Sets the delivery channel.
	pub fn method(mut self, method: DeliveryMethod) -> Self {
		self.method = method;

		self
	}

	/// Sets the code lifetime in seconds.
	pub fn expiry(mut self, expiry: u32) -> Self {
		self.expiry = expiry;

		self
	}

	/// Sets the code length.
	pub fn length(mut self, length: u32) -> Self {
		self.length = length;

		self
	}

	/// Sets the code alphabet.
	pub fn format(mut self, format: CodeFormat) -> Self {
		self.format = format;

		self
	}

	fn body(&self) -> Value {
		json!({
			"code": {
				"address": self.destination_address,
				"method": self.method,
				"format": { "length": self.length, "type": self.format },
				"expiry": self.expiry,
				"message": self.message,
			}
		})
	}
}

/// Two-factor authentication resource.
#[derive(Debug)]
pub struct Twofactor<'a, C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	client: &'a Client<C, M>,
}
impl<C, M> Twofactor<'_, C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Sends a new code; resolves to `{ codeId }`.
	pub async fn send_code(&self, request: &CodeRequest) -> Result<Value> {
		self.client
			.send_authenticated_request(|| async move {
				let path = format!("{}/codes", self.client.user_path(BASE_PATH)?);
				let options = RequestOptions::default().body(request.body());
				let raw = self.client.send_request(&path, &options, Verb::Post).await?;

				Ok(ResourceResponse::shape(raw, code_id_view)?)
			})
			.await
	}

	/// Verifies a code; resolves to `{ verified, message }`.
	///
	/// A rejection by the platform (any 4xx) is a negative outcome, not an error, and resolves
	/// to `{ verified: false, message: "Code invalid or expired" }`. Network failures and
	/// server faults are still returned as errors.
	pub async fn verify_code(&self, code_id: &str, verification_code: &str) -> Result<Value> {
		self.client
			.send_authenticated_request(|| async move {
				let path = format!(
					"{}/codes/{}/verify",
					self.client.user_path(BASE_PATH)?,
					request::path_segment(code_id)?
				);
				let options = RequestOptions::default()
					.body(json!({ "code": { "verify": verification_code } }));

				match self.client.send_request(&path, &options, Verb::Put).await {
					Ok(raw) => Ok(ResourceResponse::compose(
						raw,
						json!({ "verified": true, "message": "Success" }),
					)),
					Err(Error::Request(err)) if err.is_rejection() => Ok(ResourceResponse::compose(
						err.body.unwrap_or_default(),
						json!({ "verified": false, "message": CODE_REJECTED }),
					)),
					Err(err) => Err(err),
				}
			})
			.await
	}

	/// Resends an existing code, invalidating the one sent before; resolves to `{ codeId }`.
	pub async fn resend_code(&self, code_id: &str, request: &CodeRequest) -> Result<Value> {
		self.client
			.send_authenticated_request(|| async move {
				let path = format!(
					"{}/codes/{}",
					self.client.user_path(BASE_PATH)?,
					request::path_segment(code_id)?
				);
				let options = RequestOptions::default().body(request.body());
				let raw = self.client.send_request(&path, &options, Verb::Put).await?;

				Ok(ResourceResponse::shape(raw, code_id_view)?)
			})
			.await
	}

	/// Deletes a code; resolves to `{ codeId, success: true }`.
	pub async fn delete_code(&self, code_id: &str) -> Result<Value> {
		self.client
			.send_authenticated_request(|| async move {
				let path = format!(
					"{}/codes/{}",
					self.client.user_path(BASE_PATH)?,
					request::path_segment(code_id)?
				);
				let raw =
					self.client.send_request(&path, &RequestOptions::default(), Verb::Delete).await?;

				Ok(ResourceResponse::compose(raw, json!({ "codeId": code_id, "success": true })))
			})
			.await
	}
}

impl<C, M> Client<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Two-factor authentication resource.
	pub fn twofactor(&self) -> Twofactor<'_, C, M> {
		Twofactor { client: self }
	}
}

fn code_id_view(raw: &Value) -> Result<Value, crate::error::EnvelopeError> {
	let resource_url = response::str_field(raw, "/code/resourceURL")?;

	Ok(json!({ "codeId": response::id_from(resource_url) }))
}
