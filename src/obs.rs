//! Hooks that let an application watch the client's request pipeline.
//!
//! Every pipeline stage runs inside a [`RequestSpan`]. With both optional features off the hooks
//! compile away and the client stays silent.
//!
//! # Feature Flags
//!
//! - `tracing`: every stage opens a `cpaas_client.request` span carrying `kind` (which stage)
//!   and `stage` (the client method that opened it).
//! - `metrics`: `cpaas_client_request_total` counts stage entries and their results under the
//!   `kind` and `outcome` labels.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Stage of the request pipeline a span or counter belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequestKind {
	/// Credential exchange against the token endpoint.
	TokenExchange,
	/// Token refresh performed ahead of an authenticated call.
	Refresh,
	/// Authenticated resource call.
	Resource,
}
impl RequestKind {
	/// Label used for the `kind` span field and metric label.
	pub const fn as_str(self) -> &'static str {
		match self {
			RequestKind::TokenExchange => "token_exchange",
			RequestKind::Refresh => "refresh",
			RequestKind::Resource => "resource",
		}
	}
}
impl Display for RequestKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// What happened to a stage: entered, then either completed or failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequestOutcome {
	/// The stage started.
	Attempt,
	/// The stage returned `Ok`.
	Success,
	/// The stage returned `Err` to its caller.
	Failure,
}
impl RequestOutcome {
	/// Final outcome of a finished stage.
	pub fn of<T, E>(result: &Result<T, E>) -> Self {
		if result.is_ok() { Self::Success } else { Self::Failure }
	}

	/// Label used for the `outcome` metric label.
	pub const fn as_str(self) -> &'static str {
		match self {
			RequestOutcome::Attempt => "attempt",
			RequestOutcome::Success => "success",
			RequestOutcome::Failure => "failure",
		}
	}
}
impl Display for RequestOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
