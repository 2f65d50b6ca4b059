// self
use crate::{
	_prelude::*,
	obs::{self, RequestKind, RequestOutcome},
};

/// Future returned by [`RequestSpan::instrument`]; the bare future when `tracing` is off.
#[cfg(feature = "tracing")]
pub type InstrumentedRequest<F> = tracing::instrument::Instrumented<F>;
/// Future returned by [`RequestSpan::instrument`]; the bare future when `tracing` is off.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedRequest<F> = F;

/// One pipeline stage: its span plus the counters reported when it starts and ends.
#[derive(Clone, Debug)]
pub struct RequestSpan {
	kind: RequestKind,
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl RequestSpan {
	/// Opens the span for `kind`, naming the client method in `stage`.
	pub fn new(kind: RequestKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("cpaas_client.request", kind = kind.as_str(), stage);

			Self { kind, span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = stage;

			Self { kind }
		}
	}

	/// Stage this span reports under.
	pub fn kind(&self) -> RequestKind {
		self.kind
	}

	/// Runs `fut` inside the span, counting one attempt up front and its outcome at the end.
	pub async fn observe<T, E, Fut>(&self, fut: Fut) -> Result<T, E>
	where
		Fut: Future<Output = Result<T, E>>,
	{
		obs::record_request_outcome(self.kind, RequestOutcome::Attempt);

		let result = self.instrument(fut).await;

		obs::record_request_outcome(self.kind, RequestOutcome::of(&result));

		result
	}

	/// Attaches the span to `fut`; no guard is held across its `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedRequest<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}
