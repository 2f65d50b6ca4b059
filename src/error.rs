//! Client-level error types shared across the request pipeline and resource mappings.

// self
use crate::{_prelude::*, auth::TokenKind};

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem raised before any I/O.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Token exchange succeeded but returned material that cannot be decoded.
	#[error(transparent)]
	Decode(#[from] DecodeError),
	/// Transport-level failure on the token exchange or a resource call.
	#[error(transparent)]
	Request(#[from] RequestError),
	/// Vendor body does not match the envelope convention.
	#[error(transparent)]
	Envelope(#[from] EnvelopeError),
}
impl Error {
	/// Returns the normalized request error, if this is one.
	pub fn as_request(&self) -> Option<&RequestError> {
		match self {
			Self::Request(e) => Some(e),
			_ => None,
		}
	}
}

/// Configuration and validation failures raised by the client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Client identifier is absent or blank.
	#[error("Client identifier is mandatory.")]
	MissingClientId,
	/// Neither a client secret nor an email/password pair was supplied.
	#[error("Either a client secret or an email/password pair is mandatory.")]
	MissingCredentials,
	/// Base address cannot be parsed.
	#[error("Base URL `{url}` is invalid.")]
	InvalidBaseUrl {
		/// Rejected input.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Request path does not produce a valid URL when joined to the base address.
	#[error("Request path `{path}` is invalid.")]
	InvalidPath {
		/// Rejected path.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Caller-supplied identifier cannot stand as a single path segment.
	#[error("Path segment `{segment}` is invalid.")]
	InvalidPathSegment {
		/// Rejected value.
		segment: String,
	},
	/// HTTP verb is not one of GET, POST, PUT, PATCH, or DELETE.
	#[error("HTTP verb `{verb}` is not supported.")]
	UnsupportedVerb {
		/// Rejected verb.
		verb: String,
	},
	/// Caller-supplied header name or value is not valid HTTP.
	#[error("Header `{name}` is invalid.")]
	InvalidHeader {
		/// Offending header name.
		name: String,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Failures decoding the claims carried by an issued token.
#[derive(Debug, ThisError)]
pub enum DecodeError {
	/// Token does not have the compact `header.claims.signature` shape.
	#[error("The {token} is not a compact signed token.")]
	Malformed {
		/// Which token failed.
		token: TokenKind,
	},
	/// Claims segment is not valid base64url.
	#[error("The {token} claims segment is not valid base64url.")]
	Base64 {
		/// Which token failed.
		token: TokenKind,
		/// Underlying decoding failure.
		#[source]
		source: base64::DecodeError,
	},
	/// Claims segment is not the expected JSON object.
	#[error("The {token} claims are malformed.")]
	Claims {
		/// Which token failed.
		token: TokenKind,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Per-user resource was called while no identity token names a user.
	#[error("No user identifier is available; the identity token lacks `preferred_username`.")]
	MissingUserId,
	/// Token endpoint answered with a body that is not a token response.
	#[error("Token endpoint returned a malformed token response.")]
	TokenResponse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}

/// Vendor bodies that break the single-key envelope convention.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum EnvelopeError {
	/// Body was expected to be a JSON object.
	#[error("Response body is not a JSON object.")]
	NotAnObject,
	/// Body carried more than one top-level key, so the payload is ambiguous.
	#[error("Response envelope has {} top-level keys: {}.", keys.len(), keys.join(", "))]
	Ambiguous {
		/// Keys found at the top level.
		keys: Vec<String>,
	},
	/// A field required to shape the response is absent.
	#[error("Response is missing `{pointer}`.")]
	MissingField {
		/// JSON pointer of the missing field.
		pointer: String,
	},
}

/// Normalized transport failure surfaced to callers.
///
/// `exception_id` is the vendor's `messageId` when the error envelope carries one, otherwise
/// [`RequestError::UNKNOWN`]. Branch on it for programmatic handling and show `message` to
/// humans.
#[derive(Clone, Debug, PartialEq, ThisError)]
#[error("{message}")]
pub struct RequestError {
	/// Short failure category, e.g. `StatusCodeError` or `TransportError`.
	pub name: String,
	/// Human-readable message, with vendor template placeholders substituted.
	pub message: String,
	/// Vendor exception identifier or [`RequestError::UNKNOWN`].
	pub exception_id: String,
	/// HTTP status code, when a response was received.
	pub status: Option<u16>,
	/// Retry-After hint from upstream, if supplied.
	pub retry_after: Option<Duration>,
	/// Parsed error body, when the server sent JSON.
	pub body: Option<Value>,
}
impl RequestError {
	/// Exception identifier used when the envelope carries no `messageId`.
	pub const UNKNOWN: &'static str = "Unknown";

	/// Builds an error from its name and top-level message, then refines it with the first
	/// vendor exception found in `envelope`.
	pub fn new(name: impl Into<String>, message: impl Into<String>, envelope: Option<&Value>) -> Self {
		let mut err = Self {
			name: name.into(),
			message: message.into(),
			exception_id: Self::UNKNOWN.into(),
			status: None,
			retry_after: None,
			body: envelope.cloned(),
		};

		if let Some(exception) = envelope.and_then(|value| find_exception(value, "messageId")) {
			if let Some(id) = exception.get("messageId") {
				err.exception_id = scalar_text(id);
			}

			if let Some(text) = exception.get("text").map(scalar_text) {
				let variables = exception
					.get("variables")
					.and_then(Value::as_array)
					.map(Vec::as_slice)
					.unwrap_or(&[]);

				err.message = substitute_placeholders(&text, variables);
			}
		}

		err
	}

	/// Builds the error for a non-2xx HTTP response.
	pub fn from_status(status: u16, body: &[u8]) -> Self {
		let raw = String::from_utf8_lossy(body);
		let envelope = serde_json::from_slice::<Value>(body).ok();
		let message = if raw.trim().is_empty() {
			format!("{status} - empty response body")
		} else {
			format!("{status} - {}", raw.trim())
		};

		Self::new("StatusCodeError", message, envelope.as_ref()).with_status(status)
	}

	/// Attaches an HTTP status code.
	pub fn with_status(mut self, status: u16) -> Self {
		self.status = Some(status);

		self
	}

	/// Attaches a Retry-After hint.
	pub fn with_retry_after(mut self, retry_after: Option<Duration>) -> Self {
		self.retry_after = retry_after;

		self
	}

	/// Returns `true` when the server answered with a well-formed 4xx rejection, as opposed to
	/// a network failure or a server-side fault.
	pub fn is_rejection(&self) -> bool {
		self.status.is_some_and(|status| (400..500).contains(&status))
	}
}

/// Drills down the first key of each nested object until it finds a child carrying `key`.
fn find_exception<'a>(parent: &'a Value, key: &str) -> Option<&'a Map<String, Value>> {
	let child = parent.as_object()?.values().next()?;
	let object = child.as_object()?;

	if object.get(key).is_some_and(is_truthy) { Some(object) } else { find_exception(child, key) }
}

fn is_truthy(value: &Value) -> bool {
	match value {
		Value::Null => false,
		Value::Bool(b) => *b,
		Value::String(s) => !s.is_empty(),
		Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.),
		Value::Array(_) | Value::Object(_) => true,
	}
}

fn scalar_text(value: &Value) -> String {
	match value {
		Value::String(s) => s.clone(),
		other => other.to_string(),
	}
}

/// Replaces `%1`, `%2`, ... with the matching entry of `variables`, first occurrence only.
fn substitute_placeholders(text: &str, variables: &[Value]) -> String {
	variables.iter().enumerate().fold(text.to_owned(), |acc, (idx, variable)| {
		acc.replacen(&format!("%{}", idx + 1), &scalar_text(variable), 1)
	})
}
