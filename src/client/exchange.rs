// self
use crate::{
	_prelude::*,
	auth::{Grant, IdentityOverrides, TokenResponse},
	client::Client,
	http::{HttpTransport, TransportErrorMapper},
	obs::{RequestKind, RequestSpan},
	request::{RequestOptions, Verb},
};

/// Token endpoint path, relative to the base address.
pub const TOKEN_PATH: &str = "/cpaas/auth/v1/token";

impl<C, M> Client<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Exchanges credentials for an access token and an identity token.
	///
	/// Fields set in `overrides` win over the stored identity. The request carries no bearer
	/// token and is not itself subject to the freshness check, and the held token state is left
	/// untouched; use [`Client::apply_token_response`] to adopt the result.
	pub async fn token(&self, overrides: &IdentityOverrides) -> Result<TokenResponse> {
		RequestSpan::new(RequestKind::TokenExchange, "token")
			.observe(async move {
				let grant = Grant::resolve(&self.identity, overrides)?;
				let options = RequestOptions::default().form(grant.form());
				let body = self.dispatch(TOKEN_PATH, &options, Verb::Post, None).await?;

				Ok(TokenResponse::from_value(body)?)
			})
			.await
	}
}
