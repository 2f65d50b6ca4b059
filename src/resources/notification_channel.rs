//! Notification channels: webhook endpoints the platform delivers events to.

// self
use crate::{
	_prelude::*,
	client::Client,
	error::EnvelopeError,
	http::{HttpTransport, TransportErrorMapper},
	request::{self, RequestOptions, Verb},
	response::{self, ResourceResponse},
};

const BASE_PATH: &str = "/cpaas/notificationchannel/v1";

/// Channel type created by [`NotificationChannel::create_channel`].
pub const WEBHOOK_CHANNEL_TYPE: &str = "webhooks";

/// Notification channel resource.
#[derive(Debug)]
pub struct NotificationChannel<'a, C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	client: &'a Client<C, M>,
}
impl<C, M> NotificationChannel<'_, C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Lists the user's channels.
	pub async fn channels(&self) -> Result<Value> {
		self.client
			.send_authenticated_request(|| async move {
				let path = format!("{}/channels", self.client.user_path(BASE_PATH)?);

				Ok(self.client.send_request(&path, &RequestOptions::default(), Verb::Get).await?.into())
			})
			.await
	}

	/// Reads one channel.
	pub async fn channel(&self, channel_id: &str) -> Result<Value> {
		self.client
			.send_authenticated_request(|| async move {
				let path = format!(
					"{}/channels/{}",
					self.client.user_path(BASE_PATH)?,
					request::path_segment(channel_id)?
				);

				Ok(self.client.send_request(&path, &RequestOptions::default(), Verb::Get).await?.into())
			})
			.await
	}

	/// Creates a webhook channel; resolves to `{ channelId, webhookURL, channelType }`.
	pub async fn create_channel(&self, webhook_url: &str) -> Result<Value> {
		self.client
			.send_authenticated_request(|| async move {
				let path = format!("{}/channels", self.client.user_path(BASE_PATH)?);
				let options = RequestOptions::default().body(json!({
					"notificationChannel": {
						"channelData": { "x-webhookURL": webhook_url },
						"channelType": WEBHOOK_CHANNEL_TYPE,
						"clientCorrelator": self.client.correlation_tag(),
					}
				}));
				let raw = self.client.send_request(&path, &options, Verb::Post).await?;

				Ok(ResourceResponse::shape(raw, channel_view)?)
			})
			.await
	}

	/// Deletes a channel.
	pub async fn remove_channel(&self, channel_id: &str) -> Result<Value> {
		self.client
			.send_authenticated_request(|| async move {
				let path = format!(
					"{}/channels/{}",
					self.client.user_path(BASE_PATH)?,
					request::path_segment(channel_id)?
				);

				Ok(self
					.client
					.send_request(&path, &RequestOptions::default(), Verb::Delete)
					.await?
					.into())
			})
			.await
	}

	/// Extends a channel's lifetime, in seconds.
	pub async fn refresh_channel(&self, channel_id: &str, channel_lifetime: u64) -> Result<Value> {
		self.client
			.send_authenticated_request(|| async move {
				let path = format!(
					"{}/channels/{}",
					self.client.user_path(BASE_PATH)?,
					request::path_segment(channel_id)?
				);
				let options = RequestOptions::default().body(json!({
					"notificationChannelLifetime": { "channelLifetime": channel_lifetime }
				}));

				Ok(self.client.send_request(&path, &options, Verb::Put).await?.into())
			})
			.await
	}
}

impl<C, M> Client<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Notification channel resource.
	pub fn notification_channel(&self) -> NotificationChannel<'_, C, M> {
		NotificationChannel { client: self }
	}
}

fn channel_view(raw: &Value) -> Result<Value, EnvelopeError> {
	Ok(json!({
		"channelId": response::field(raw, "/notificationChannel/callbackURL")?,
		"webhookURL": response::field(raw, "/notificationChannel/channelData/x-webhookURL")?,
		"channelType": response::field(raw, "/notificationChannel/channelType")?,
	}))
}
