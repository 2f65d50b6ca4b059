//! Resource mappings: thin translations of platform API surfaces into authenticated calls.
//!
//! Every method funnels through [`Client::send_authenticated_request`], reads the user
//! identifier only after the token check, and returns the normalized payload.
//!
//! [`Client::send_authenticated_request`]: crate::client::Client::send_authenticated_request

pub mod conversation;
pub mod notification;
pub mod notification_channel;
pub mod twofactor;

pub use conversation::*;
pub use notification::*;
pub use notification_channel::*;
pub use twofactor::*;

/// Accepts one destination address or several.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Addresses(pub Vec<String>);
impl From<&str> for Addresses {
	fn from(value: &str) -> Self {
		Self(vec![value.into()])
	}
}
impl From<String> for Addresses {
	fn from(value: String) -> Self {
		Self(vec![value])
	}
}
impl<S> From<Vec<S>> for Addresses
where
	S: Into<String>,
{
	fn from(value: Vec<S>) -> Self {
		Self(value.into_iter().map(Into::into).collect())
	}
}
impl<S, const N: usize> From<[S; N]> for Addresses
where
	S: Into<String>,
{
	fn from(value: [S; N]) -> Self {
		Self(value.into_iter().map(Into::into).collect())
	}
}
