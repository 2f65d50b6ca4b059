//! Claims decoding for the compact signed tokens issued by the token endpoint.
//!
//! Signatures are not verified: the client only reads `iat`/`exp` to schedule refreshes and
//! the identity token's `preferred_username` to address per-user resources.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
// self
use crate::{_prelude::*, error::DecodeError};

/// Which of the two issued tokens a value refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
	/// Bearer token presented on every request.
	Access,
	/// OpenID identity token describing the authenticated user.
	Identity,
}
impl TokenKind {
	/// Returns a stable label suitable for messages.
	pub const fn as_str(self) -> &'static str {
		match self {
			TokenKind::Access => "access token",
			TokenKind::Identity => "identity token",
		}
	}
}
impl Display for TokenKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Decoded claims set of an issued token.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
	/// Issued-at, seconds since the Unix epoch.
	pub iat: i64,
	/// Expiry, seconds since the Unix epoch.
	pub exp: i64,
	/// Subject identifier.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub sub: Option<String>,
	/// Username the platform addresses per-user resources with.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub preferred_username: Option<String>,
	/// Remaining claims, untouched.
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}
impl TokenClaims {
	/// Half of the nominal lifetime.
	pub fn refresh_buffer(&self) -> Duration {
		Duration::seconds(self.exp.saturating_sub(self.iat)) / 2
	}
}

/// Decodes the claims segment of a compact `header.claims.signature` token.
pub fn decode_claims(kind: TokenKind, token: &str) -> Result<TokenClaims, DecodeError> {
	let mut parts = token.split('.');
	let segment = match (parts.next(), parts.next()) {
		(Some(_), Some(claims)) if !claims.is_empty() => claims,
		_ => return Err(DecodeError::Malformed { token: kind }),
	};
	let bytes = URL_SAFE_NO_PAD
		.decode(segment.trim_end_matches('='))
		.map_err(|source| DecodeError::Base64 { token: kind, source })?;
	let mut de = serde_json::Deserializer::from_slice(&bytes);

	serde_path_to_error::deserialize(&mut de)
		.map_err(|source| DecodeError::Claims { token: kind, source })
}
