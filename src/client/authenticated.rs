// self
use crate::{
	_prelude::*,
	auth::{IdentityOverrides, TokenState},
	client::Client,
	http::{HttpTransport, TransportErrorMapper},
	obs::{RequestKind, RequestSpan},
	response::ResourceResponse,
};

impl<C, M> Client<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Runs one authenticated resource call and returns its normalized payload.
	///
	/// When the held token has passed the midpoint of its lifetime, the stored identity is
	/// exchanged for a new one first and `callback` only runs once that exchange has been
	/// applied. A failed exchange is returned as-is and `callback` never runs. Failures inside
	/// `callback` are returned as-is and never retried.
	///
	/// Concurrent callers that find the token expired share one exchange: the first performs it
	/// while the others wait on a guard and reuse its result.
	pub async fn send_authenticated_request<F, Fut>(&self, callback: F) -> Result<Value>
	where
		F: FnOnce() -> Fut,
		Fut: Future<Output = Result<ResourceResponse>>,
	{
		RequestSpan::new(RequestKind::Resource, "send_authenticated_request")
			.observe(async move {
				self.ensure_fresh_token().await?;

				let response = callback().await?;

				Ok(response.normalize()?)
			})
			.await
	}

	async fn ensure_fresh_token(&self) -> Result<()> {
		if !self.token_state().is_expired() {
			return Ok(());
		}

		let _singleflight = self.refresh_guard.lock().await;

		if !self.token_state().is_expired() {
			self.refresh_metrics.record_coalesced();

			return Ok(());
		}

		self.refresh_token_state().await.map(|_| ())
	}

	async fn refresh_token_state(&self) -> Result<Arc<TokenState>> {
		self.refresh_metrics.record_attempt();

		let result = RequestSpan::new(RequestKind::Refresh, "refresh_token_state")
			.observe(async move {
				let response = self.token(&IdentityOverrides::default()).await?;

				Ok(self.apply_token_response(Some(&response))?)
			})
			.await;

		match &result {
			Ok(_) => self.refresh_metrics.record_success(),
			Err(_) => self.refresh_metrics.record_failure(),
		}

		result
	}
}
