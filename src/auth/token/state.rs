//! Immutable token state and the token endpoint response it is derived from.
//!
//! A [`TokenState`] is either empty or holds all five facts of the last successful exchange
//! (both raw tokens, both claims sets, and the derived user identifier). It is never patched:
//! [`TokenState::apply`] computes a replacement value that the client swaps in whole.

// self
use crate::{
	_prelude::*,
	auth::{
		claims::{self, TokenClaims, TokenKind},
		token::secret::TokenSecret,
	},
	error::DecodeError,
};

/// Body returned by the token endpoint.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TokenResponse {
	/// Bearer token for resource calls.
	#[serde(default)]
	pub access_token: Option<TokenSecret>,
	/// OpenID identity token.
	#[serde(default)]
	pub id_token: Option<TokenSecret>,
	/// Remaining fields (`expires_in`, `token_type`, ...), untouched.
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}
impl TokenResponse {
	/// Parses a token endpoint body; `null` (an empty body) yields an empty response.
	pub fn from_value(value: Value) -> Result<Self, DecodeError> {
		if value.is_null() {
			return Ok(Self::default());
		}

		serde_path_to_error::deserialize(value)
			.map_err(|source| DecodeError::TokenResponse { source })
	}

	fn tokens(&self) -> Option<(&TokenSecret, &TokenSecret)> {
		let access = self.access_token.as_ref().filter(|token| !token.is_empty())?;
		let id = self.id_token.as_ref().filter(|token| !token.is_empty())?;

		Some((access, id))
	}
}

#[derive(Clone, Debug)]
struct Session {
	access_token: TokenSecret,
	token_parsed: TokenClaims,
	id_token: TokenSecret,
	id_token_parsed: TokenClaims,
	user_id: Option<String>,
}

/// Token material held by a client; empty until the first successful exchange.
#[derive(Clone, Debug, Default)]
pub struct TokenState {
	session: Option<Session>,
}
impl TokenState {
	/// Returns the empty state.
	pub fn empty() -> Self {
		Self::default()
	}

	/// Computes the state that replaces the current one after an exchange.
	///
	/// A missing response, or one lacking either token, yields the empty state. Both tokens are
	/// decoded otherwise; a token that cannot be decoded fails the whole call.
	pub fn apply(response: Option<&TokenResponse>) -> Result<Self, DecodeError> {
		let Some((access, id)) = response.and_then(TokenResponse::tokens) else {
			return Ok(Self::empty());
		};
		let token_parsed = claims::decode_claims(TokenKind::Access, access.expose())?;
		let id_token_parsed = claims::decode_claims(TokenKind::Identity, id.expose())?;
		let user_id = id_token_parsed.preferred_username.clone();

		Ok(Self {
			session: Some(Session {
				access_token: access.clone(),
				token_parsed,
				id_token: id.clone(),
				id_token_parsed,
				user_id,
			}),
		})
	}

	/// Returns `true` when no token is held.
	pub fn is_empty(&self) -> bool {
		self.session.is_none()
	}

	/// Bearer token, if held.
	pub fn access_token(&self) -> Option<&TokenSecret> {
		self.session.as_ref().map(|s| &s.access_token)
	}

	/// Identity token, if held.
	pub fn id_token(&self) -> Option<&TokenSecret> {
		self.session.as_ref().map(|s| &s.id_token)
	}

	/// Decoded access token claims, if held.
	pub fn token_parsed(&self) -> Option<&TokenClaims> {
		self.session.as_ref().map(|s| &s.token_parsed)
	}

	/// Decoded identity token claims, if held.
	pub fn id_token_parsed(&self) -> Option<&TokenClaims> {
		self.session.as_ref().map(|s| &s.id_token_parsed)
	}

	/// User identifier derived from the identity token's `preferred_username`.
	pub fn user_id(&self) -> Option<&str> {
		self.session.as_ref().and_then(|s| s.user_id.as_deref())
	}

	/// Checks freshness against the current UTC clock.
	pub fn is_expired(&self) -> bool {
		self.is_expired_at(OffsetDateTime::now_utc())
	}

	/// Returns `true` when no claims are held or `now` has reached the midpoint between
	/// issued-at and expiry.
	pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
		match self.refresh_due_at() {
			Some(due) => now >= due,
			None => true,
		}
	}

	/// Literal expiry of the access token.
	pub fn expires_at(&self) -> Option<OffsetDateTime> {
		OffsetDateTime::from_unix_timestamp(self.token_parsed()?.exp).ok()
	}

	/// Instant at which the access token is treated as expired.
	pub fn refresh_due_at(&self) -> Option<OffsetDateTime> {
		let buffer = self.token_parsed()?.refresh_buffer();

		self.expires_at()?.checked_sub(buffer)
	}
}
