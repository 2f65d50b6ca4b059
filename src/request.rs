//! Request descriptors: verbs, per-call options, and header composition.

// crates.io
use oauth2::{
	HttpRequest,
	http::{
		HeaderMap, HeaderName, HeaderValue, Method, Request,
		header::{AUTHORIZATION, CONTENT_TYPE},
	},
};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	error::{ConfigError, RequestError},
};

/// Client identification header sent with every request.
pub const AGENT_HEADER: &str = "x-cpaas-agent";
/// Value of [`AGENT_HEADER`].
pub const AGENT: &str = concat!("rust-sdk/", env!("CARGO_PKG_VERSION"));
/// Content type of JSON bodies.
pub const JSON_CONTENT_TYPE: &str = "application/json";
/// Content type of form bodies.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Bytes left verbatim in a path segment: the unreserved set plus the `+`, `:` and `@` that
/// phone and SIP addresses carry.
const SEGMENT_SET: &AsciiSet = &NON_ALPHANUMERIC
	.remove(b'-')
	.remove(b'.')
	.remove(b'_')
	.remove(b'~')
	.remove(b'+')
	.remove(b':')
	.remove(b'@');

/// HTTP verbs accepted by the dispatcher.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Verb {
	/// `GET`.
	#[default]
	Get,
	/// `POST`.
	Post,
	/// `PUT`.
	Put,
	/// `PATCH`.
	Patch,
	/// `DELETE`.
	Delete,
}
impl Verb {
	/// Returns the upper-case method name.
	pub const fn as_str(self) -> &'static str {
		match self {
			Verb::Get => "GET",
			Verb::Post => "POST",
			Verb::Put => "PUT",
			Verb::Patch => "PATCH",
			Verb::Delete => "DELETE",
		}
	}

	fn method(self) -> Method {
		match self {
			Verb::Get => Method::GET,
			Verb::Post => Method::POST,
			Verb::Put => Method::PUT,
			Verb::Patch => Method::PATCH,
			Verb::Delete => Method::DELETE,
		}
	}
}
impl Display for Verb {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for Verb {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"get" => Ok(Verb::Get),
			"post" => Ok(Verb::Post),
			"put" => Ok(Verb::Put),
			"patch" => Ok(Verb::Patch),
			"delete" => Ok(Verb::Delete),
			_ => Err(ConfigError::UnsupportedVerb { verb: s.into() }),
		}
	}
}

/// Optional parts of a request; all empty by default.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RequestOptions {
	/// Query parameters; ordering is irrelevant.
	pub query: BTreeMap<String, String>,
	/// JSON body mirroring the target resource's schema.
	pub body: Option<Value>,
	/// Form fields; takes precedence over `body` and forces the form content type.
	pub form: Option<BTreeMap<String, String>>,
	/// Header overrides; they win over the composed defaults.
	pub headers: BTreeMap<String, String>,
}
impl RequestOptions {
	/// Adds one query parameter.
	pub fn query(mut self, key: impl Into<String>, value: impl Display) -> Self {
		self.query.insert(key.into(), value.to_string());

		self
	}

	/// Merges query parameters.
	pub fn queries<I, K, V>(mut self, pairs: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Display,
	{
		for (key, value) in pairs {
			self.query.insert(key.into(), value.to_string());
		}

		self
	}

	/// Sets the JSON body.
	pub fn body(mut self, body: Value) -> Self {
		self.body = Some(body);

		self
	}

	/// Sets the form fields.
	pub fn form(mut self, form: BTreeMap<String, String>) -> Self {
		self.form = Some(form);

		self
	}

	/// Adds a header override.
	pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.insert(name.into(), value.into());

		self
	}
}

/// Composes the headers for one request.
///
/// Defaults are the bearer token (omitted when none is held), the agent header, and the JSON
/// content type. Caller headers replace defaults with the same name. Form requests always carry
/// the form content type.
pub fn compose_headers(
	access_token: Option<&TokenSecret>,
	options: &RequestOptions,
) -> Result<HeaderMap, ConfigError> {
	let mut headers = HeaderMap::new();

	if let Some(token) = access_token {
		let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose()))
			.map_err(|_| ConfigError::InvalidHeader { name: AUTHORIZATION.as_str().into() })?;

		value.set_sensitive(true);
		headers.insert(AUTHORIZATION, value);
	}

	headers.insert(HeaderName::from_static(AGENT_HEADER), HeaderValue::from_static(AGENT));
	headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));

	for (name, value) in &options.headers {
		let invalid = || ConfigError::InvalidHeader { name: name.clone() };
		let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
		let header_value = HeaderValue::from_str(value).map_err(|_| invalid())?;

		headers.insert(header_name, header_value);
	}

	if options.form.is_some() {
		headers.insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
	}

	Ok(headers)
}

/// Percent-encodes a caller-supplied identifier so it stays one segment of the request path.
///
/// Empty values and the dot segments `.` and `..` are rejected since they would address a
/// different resource.
pub fn path_segment(value: &str) -> Result<String, ConfigError> {
	if matches!(value, "" | "." | "..") {
		return Err(ConfigError::InvalidPathSegment { segment: value.into() });
	}

	Ok(utf8_percent_encode(value, SEGMENT_SET).to_string())
}

/// Joins `path` onto `base` (keeping any base path prefix) and appends the query.
pub(crate) fn build_url(
	base: &Url,
	path: &str,
	query: &BTreeMap<String, String>,
) -> Result<Url, ConfigError> {
	let joined = format!("{}/{}", base.as_str().trim_end_matches('/'), path.trim_start_matches('/'));
	let mut url = Url::parse(&joined)
		.map_err(|source| ConfigError::InvalidPath { path: path.into(), source })?;

	if !query.is_empty() {
		url.query_pairs_mut().extend_pairs(query.iter());
	}

	Ok(url)
}

/// Encodes the request payload: form fields, a JSON body, or nothing.
pub(crate) fn encode_payload(options: &RequestOptions) -> Result<Vec<u8>, RequestError> {
	if let Some(form) = &options.form {
		let encoded = form_urlencoded::Serializer::new(String::new()).extend_pairs(form.iter()).finish();

		return Ok(encoded.into_bytes());
	}

	match &options.body {
		Some(body) => serde_json::to_vec(body)
			.map_err(|e| RequestError::new("SerializationError", e.to_string(), None)),
		None => Ok(Vec::new()),
	}
}

/// Assembles the transport request.
pub(crate) fn build_request(
	verb: Verb,
	url: &Url,
	headers: HeaderMap,
	payload: Vec<u8>,
) -> Result<HttpRequest, ConfigError> {
	let mut request = Request::builder().method(verb.method()).uri(url.as_str()).body(payload)?;

	*request.headers_mut() = headers;

	Ok(request)
}
