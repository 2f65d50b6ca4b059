//! Normalization of resource results into the payload handed back to callers.
//!
//! Vendor bodies wrap every payload in one top-level key naming the resource. Resource
//! mappings either return that body untouched ([`ResourceResponse::Raw`]) or pair it with a
//! reshaped view ([`ResourceResponse::Paired`]); [`ResourceResponse::normalize`] collapses both
//! into one [`Value`].

// self
use crate::{_prelude::*, error::EnvelopeError};

/// Key a mock backend sets inside the `response` object to echo request construction back.
pub const DIAGNOSTIC_MARKER: &str = "__FOR_TEST__";

/// Result of one resource call before normalization.
#[derive(Clone, Debug, PartialEq)]
pub enum ResourceResponse {
	/// Vendor body exactly as dispatched; exactly one top-level key is expected.
	Raw(Value),
	/// Vendor body paired with the reshaped view the resource mapping computed from it.
	Paired {
		/// Vendor body exactly as dispatched.
		raw: Value,
		/// Reshaped view; `null` defers to the raw body.
		shaped: Value,
	},
}
impl ResourceResponse {
	/// Pairs a raw body with its reshaped view.
	pub fn compose(raw: Value, shaped: Value) -> Self {
		Self::Paired { raw, shaped }
	}

	/// Pairs a raw body with the view `shape` computes from it.
	///
	/// Diagnostic echoes are paired with `null` instead, since they carry no vendor fields to
	/// shape.
	pub fn shape<F>(raw: Value, shape: F) -> Result<Self, EnvelopeError>
	where
		F: FnOnce(&Value) -> Result<Value, EnvelopeError>,
	{
		if diagnostic_echo(&raw).is_some() {
			return Ok(Self::compose(raw, Value::Null));
		}

		let shaped = shape(&raw)?;

		Ok(Self::compose(raw, shaped))
	}

	/// Collapses the response into the caller-facing payload.
	///
	/// In priority order:
	/// 1. a paired raw body whose `response` object carries [`DIAGNOSTIC_MARKER`] yields that
	///    object verbatim;
	/// 2. a non-null shaped view yields the view;
	/// 3. otherwise the raw body is unwrapped: `null` and `{}` yield `{}`, a single key yields
	///    its value, and anything else is an [`EnvelopeError`].
	pub fn normalize(self) -> Result<Value, EnvelopeError> {
		match self {
			Self::Paired { raw, shaped } => {
				if let Some(diagnostic) = diagnostic_echo(&raw) {
					return Ok(diagnostic.clone());
				}
				if !shaped.is_null() {
					return Ok(shaped);
				}

				unwrap_envelope(raw)
			},
			Self::Raw(raw) => unwrap_envelope(raw),
		}
	}
}
impl From<Value> for ResourceResponse {
	fn from(value: Value) -> Self {
		Self::Raw(value)
	}
}

/// Returns `true` when a normalized payload is a diagnostic echo rather than a vendor body.
pub fn is_diagnostic(payload: &Value) -> bool {
	payload.get(DIAGNOSTIC_MARKER).is_some_and(|marker| !marker.is_null())
}

/// Resolves a required field of a vendor body by JSON pointer.
pub fn field<'a>(body: &'a Value, pointer: &str) -> Result<&'a Value, EnvelopeError> {
	body.pointer(pointer).ok_or_else(|| EnvelopeError::MissingField { pointer: pointer.into() })
}

/// Resolves a required string field of a vendor body by JSON pointer.
pub fn str_field<'a>(body: &'a Value, pointer: &str) -> Result<&'a str, EnvelopeError> {
	field(body, pointer)?
		.as_str()
		.ok_or_else(|| EnvelopeError::MissingField { pointer: pointer.into() })
}

/// Last path segment of a resource URL, which the platform uses as the resource identifier.
pub fn id_from(resource_url: &str) -> &str {
	resource_url.rsplit('/').next().unwrap_or(resource_url)
}

fn diagnostic_echo(raw: &Value) -> Option<&Value> {
	let response = raw.get("response")?;

	is_diagnostic(response).then_some(response)
}

fn unwrap_envelope(raw: Value) -> Result<Value, EnvelopeError> {
	let object = match raw {
		Value::Null => return Ok(Value::Object(Map::new())),
		Value::Object(object) => object,
		_ => return Err(EnvelopeError::NotAnObject),
	};

	if object.len() > 1 {
		return Err(EnvelopeError::Ambiguous { keys: object.keys().cloned().collect() });
	}

	Ok(object.into_iter().next().map(|(_, value)| value).unwrap_or_else(|| json!({})))
}
