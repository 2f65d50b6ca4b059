//! The client: identity, token state cell, and the request pipeline built on them.
//!
//! [`Client::send_request`] performs one HTTP call, [`Client::token`] exchanges credentials for
//! tokens, and [`Client::send_authenticated_request`] funnels resource calls through a token
//! freshness check. Resource mappings live in [`crate::resources`] and only ever reach the token
//! state through these entry points.

mod authenticated;
mod dispatch;
mod exchange;

pub use exchange::TOKEN_PATH;

// self
use crate::{
	_prelude::*,
	auth::{ClientIdentity, TokenResponse, TokenState},
	config::ClientConfig,
	error::{ConfigError, DecodeError},
	http::{HttpTransport, TransportErrorMapper},
	obs::RefreshMetrics,
	request,
};
#[cfg(feature = "reqwest")]
use crate::http::{ReqwestHttpClient, ReqwestTransportErrorMapper};

/// Client specialized for the crate's default reqwest transport stack.
#[cfg(feature = "reqwest")]
pub type CpaasClient = Client<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Authenticated client for one platform identity.
///
/// Clones share the transport, the token state, and the refresh guard, so a token obtained
/// through one clone is visible to all of them.
pub struct Client<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// HTTP transport used for every outbound request.
	pub http_client: Arc<C>,
	/// Mapper applied to transport-layer errors before surfacing them to callers.
	pub transport_mapper: Arc<M>,
	/// Shared counters for token refreshes.
	pub refresh_metrics: Arc<RefreshMetrics>,
	base_url: Url,
	identity: ClientIdentity,
	token_state: Arc<RwLock<Arc<TokenState>>>,
	refresh_guard: Arc<AsyncMutex<()>>,
}
impl<C, M> Client<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Validates `config` and creates a client on the caller-provided transport + mapper pair.
	pub fn with_http_client(
		config: &ClientConfig,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Result<Self, ConfigError> {
		let identity = config.validate()?;
		let base_url = config.base_url()?;

		Ok(Self {
			http_client: http_client.into(),
			transport_mapper: mapper.into(),
			refresh_metrics: Default::default(),
			base_url,
			identity,
			token_state: Default::default(),
			refresh_guard: Default::default(),
		})
	}

	/// Base address every request path is joined onto.
	pub fn base_url(&self) -> &Url {
		&self.base_url
	}

	/// Identity the client authenticates with.
	pub fn identity(&self) -> &ClientIdentity {
		&self.identity
	}

	/// Tag attached to outgoing bodies so the platform can correlate requests to this client.
	pub fn correlation_tag(&self) -> String {
		self.identity.correlation_tag()
	}

	/// Snapshot of the token state current at this instant.
	pub fn token_state(&self) -> Arc<TokenState> {
		self.token_state.read().clone()
	}

	/// User identifier derived from the last exchange, if any.
	pub fn current_user_id(&self) -> Option<String> {
		self.token_state().user_id().map(Into::into)
	}

	/// Replaces the token state with the one derived from `response`.
	///
	/// `None`, or a response lacking either token, clears the state.
	pub fn apply_token_response(
		&self,
		response: Option<&TokenResponse>,
	) -> Result<Arc<TokenState>, DecodeError> {
		let next = Arc::new(TokenState::apply(response)?);

		*self.token_state.write() = next.clone();

		Ok(next)
	}

	/// `base` followed by the encoded user identifier, the prefix of every per-user resource.
	pub(crate) fn user_path(&self, base: &str) -> Result<String> {
		let user_id = self.current_user_id().ok_or(DecodeError::MissingUserId)?;

		Ok(format!("{base}/{}", request::path_segment(&user_id)?))
	}
}
#[cfg(feature = "reqwest")]
impl Client<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Validates `config` and creates a client on its own reqwest transport.
	///
	/// The transport does not follow redirects. Use [`Client::with_http_client`] to share a
	/// transport between clients or to plug in a different HTTP stack.
	pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
		Self::with_http_client(config, ReqwestHttpClient::try_new()?, ReqwestTransportErrorMapper)
	}
}
impl<C, M> Clone for Client<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn clone(&self) -> Self {
		Self {
			http_client: self.http_client.clone(),
			transport_mapper: self.transport_mapper.clone(),
			refresh_metrics: self.refresh_metrics.clone(),
			base_url: self.base_url.clone(),
			identity: self.identity.clone(),
			token_state: self.token_state.clone(),
			refresh_guard: self.refresh_guard.clone(),
		}
	}
}
impl<C, M> Debug for Client<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let state = self.token_state();

		f.debug_struct("Client")
			.field("base_url", &self.base_url.as_str())
			.field("client_id", &self.identity.client_id.as_str())
			.field("authenticated", &!state.is_empty())
			.field("user_id", &state.user_id())
			.finish()
	}
}
