//! SMS conversations: outbound messages, message history, and inbound subscriptions.

// self
use crate::{
	_prelude::*,
	client::Client,
	error::{ConfigError, EnvelopeError},
	http::{HttpTransport, TransportErrorMapper},
	request::{self, RequestOptions, Verb},
	resources::Addresses,
	response::{self, ResourceResponse},
};

const BASE_PATH: &str = "/cpaas/smsmessaging/v1";

/// Outbound SMS.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutboundMessage {
	/// Number the message is sent from; must be a number assigned to the account.
	pub sender_address: String,
	/// Destination numbers.
	pub destination_address: Vec<String>,
	/// Message text.
	pub message: String,
}
impl OutboundMessage {
	/// Creates a message from `sender_address` to one or more destinations.
	pub fn new(
		sender_address: impl Into<String>,
		destination: impl Into<Addresses>,
		message: impl Into<String>,
	) -> Self {
		Self {
			sender_address: sender_address.into(),
			destination_address: destination.into().0,
			message: message.into(),
		}
	}
}

/// Narrows a message history listing to one conversation partner and local number.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MessageFilter {
	/// Conversation partner.
	pub remote_address: Option<String>,
	/// Local number; only honored together with `remote_address`.
	pub local_address: Option<String>,
	/// Extra query parameters such as `max` or `next`.
	pub query: BTreeMap<String, String>,
}
impl MessageFilter {
	/// Restricts the listing to one conversation partner.
	pub fn remote_address(mut self, remote_address: impl Into<String>) -> Self {
		self.remote_address = Some(remote_address.into());

		self
	}

	/// Restricts the listing to one local number.
	pub fn local_address(mut self, local_address: impl Into<String>) -> Self {
		self.local_address = Some(local_address.into());

		self
	}

	/// Adds a query parameter.
	pub fn query(mut self, key: impl Into<String>, value: impl Display) -> Self {
		self.query.insert(key.into(), value.to_string());

		self
	}

	fn path(&self, user_path: &str) -> Result<String, ConfigError> {
		let mut path = format!("{user_path}/remoteAddresses");

		if let Some(remote) = &self.remote_address {
			path.push('/');
			path.push_str(&request::path_segment(remote)?);

			if let Some(local) = &self.local_address {
				path.push_str("/localAddresses/");
				path.push_str(&request::path_segment(local)?);
			}
		}

		Ok(path)
	}
}

/// Conversation resource.
#[derive(Debug)]
pub struct Conversation<'a, C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	client: &'a Client<C, M>,
}
impl<C, M> Conversation<'_, C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Sends an SMS; resolves to `{ message, senderAddress, deliveryInfo }`.
	pub async fn create_message(&self, message: &OutboundMessage) -> Result<Value> {
		self.client
			.send_authenticated_request(|| async move {
				let path = format!(
					"{}/outbound/{}/requests",
					self.client.user_path(BASE_PATH)?,
					request::path_segment(&message.sender_address)?
				);
				let options = RequestOptions::default().body(json!({
					"outboundSMSMessageRequest": {
						"address": message.destination_address,
						"clientCorrelator": self.client.correlation_tag(),
						"outboundSMSTextMessage": { "message": message.message },
					}
				}));
				let raw = self.client.send_request(&path, &options, Verb::Post).await?;

				Ok(ResourceResponse::shape(raw, sent_message_view)?)
			})
			.await
	}

	/// Lists conversations, or the messages exchanged with one partner when filtered.
	pub async fn get_messages(&self, filter: &MessageFilter) -> Result<Value> {
		self.client
			.send_authenticated_request(|| async move {
				let path = filter.path(&self.client.user_path(BASE_PATH)?)?;
				let options = RequestOptions::default().queries(filter.query.clone());

				Ok(self.client.send_request(&path, &options, Verb::Get).await?.into())
			})
			.await
	}

	/// Reads the delivery status of one message.
	pub async fn get_status(
		&self,
		remote_address: &str,
		local_address: &str,
		message_id: &str,
	) -> Result<Value> {
		self.client
			.send_authenticated_request(|| async move {
				let path = format!(
					"{}/messages/{}/status",
					thread_path(&self.client.user_path(BASE_PATH)?, remote_address, local_address)?,
					request::path_segment(message_id)?
				);

				Ok(self.client.send_request(&path, &RequestOptions::default(), Verb::Get).await?.into())
			})
			.await
	}

	/// Lists the messages of one thread.
	pub async fn get_messages_in_thread(
		&self,
		remote_address: &str,
		local_address: &str,
		query: &BTreeMap<String, String>,
	) -> Result<Value> {
		self.client
			.send_authenticated_request(|| async move {
				let path = format!(
					"{}/messages",
					thread_path(&self.client.user_path(BASE_PATH)?, remote_address, local_address)?
				);
				let options = RequestOptions::default().queries(query.clone());

				Ok(self.client.send_request(&path, &options, Verb::Get).await?.into())
			})
			.await
	}

	/// Deletes one message, or the whole thread when `message_id` is `None`.
	pub async fn delete_message(
		&self,
		remote_address: &str,
		local_address: &str,
		message_id: Option<&str>,
	) -> Result<Value> {
		self.client
			.send_authenticated_request(|| async move {
				let mut path =
					thread_path(&self.client.user_path(BASE_PATH)?, remote_address, local_address)?;

				if let Some(message_id) = message_id {
					path.push_str("/messages/");
					path.push_str(&request::path_segment(message_id)?);
				}

				Ok(self
					.client
					.send_request(&path, &RequestOptions::default(), Verb::Delete)
					.await?
					.into())
			})
			.await
	}

	/// Lists inbound subscriptions; resolves to an array of
	/// `{ notifyURL, destinationAddress, subscriptionId }`.
	pub async fn get_subscriptions(&self) -> Result<Value> {
		self.client
			.send_authenticated_request(|| async move {
				let path = format!("{}/inbound/subscriptions", self.client.user_path(BASE_PATH)?);
				let raw =
					self.client.send_request(&path, &RequestOptions::default(), Verb::Get).await?;

				Ok(ResourceResponse::shape(raw, subscriptions_view)?)
			})
			.await
	}

	/// Reads one inbound subscription; resolves to
	/// `{ notifyURL, destinationAddress, subscriptionId }`.
	pub async fn get_subscription(&self, subscription_id: &str) -> Result<Value> {
		self.client
			.send_authenticated_request(|| async move {
				let path = format!(
					"{}/inbound/subscriptions/{}",
					self.client.user_path(BASE_PATH)?,
					request::path_segment(subscription_id)?
				);
				let raw =
					self.client.send_request(&path, &RequestOptions::default(), Verb::Get).await?;

				Ok(ResourceResponse::shape(raw, |raw| {
					subscription_view(response::field(raw, "/subscription")?)
				})?)
			})
			.await
	}

	/// Subscribes `webhook_url` to SMS received on `destination_address`; resolves to
	/// `{ webhookURL, destinationAddress, subscriptionId }`.
	///
	/// A webhook notification channel is created first and the subscription delivers to it.
	pub async fn subscribe(&self, destination_address: &str, webhook_url: &str) -> Result<Value> {
		self.client
			.send_authenticated_request(|| async move {
				let channel = self.client.notification_channel().create_channel(webhook_url).await?;
				let mut callback_reference = Map::new();

				if !response::is_diagnostic(&channel) {
					callback_reference
						.insert("notifyURL".into(), response::field(&channel, "/channelId")?.clone());
				}

				let path = format!("{}/inbound/subscriptions", self.client.user_path(BASE_PATH)?);
				let options = RequestOptions::default().body(json!({
					"subscription": {
						"callbackReference": callback_reference,
						"clientCorrelator": self.client.correlation_tag(),
						"destinationAddress": destination_address,
					}
				}));
				let raw = self.client.send_request(&path, &options, Verb::Post).await?;

				Ok(ResourceResponse::shape(raw, |raw| {
					Ok(json!({
						"webhookURL": webhook_url,
						"destinationAddress": response::field(raw, "/subscription/destinationAddress")?,
						"subscriptionId": response::id_from(response::str_field(
							raw,
							"/subscription/resourceURL"
						)?),
					}))
				})?)
			})
			.await
	}

	/// Removes an inbound subscription; resolves to `{ subscriptionId, success, message }`.
	pub async fn unsubscribe(&self, subscription_id: &str) -> Result<Value> {
		self.client
			.send_authenticated_request(|| async move {
				let path = format!(
					"{}/inbound/subscriptions/{}",
					self.client.user_path(BASE_PATH)?,
					request::path_segment(subscription_id)?
				);
				let raw =
					self.client.send_request(&path, &RequestOptions::default(), Verb::Delete).await?;

				Ok(ResourceResponse::compose(
					raw,
					json!({
						"subscriptionId": subscription_id,
						"success": true,
						"message": "Unsubscribed from sms conversation notification",
					}),
				))
			})
			.await
	}
}

impl<C, M> Client<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// SMS conversation resource.
	pub fn conversation(&self) -> Conversation<'_, C, M> {
		Conversation { client: self }
	}
}

fn thread_path(
	user_path: &str,
	remote_address: &str,
	local_address: &str,
) -> Result<String, ConfigError> {
	Ok(format!(
		"{user_path}/remoteAddresses/{}/localAddresses/{}",
		request::path_segment(remote_address)?,
		request::path_segment(local_address)?
	))
}

fn sent_message_view(raw: &Value) -> Result<Value, EnvelopeError> {
	let request = response::field(raw, "/outboundSMSMessageRequest")?;

	Ok(json!({
		"message": response::field(request, "/outboundSMSTextMessage/message")?,
		"senderAddress": response::field(request, "/senderAddress")?,
		"deliveryInfo": response::field(request, "/deliveryInfoList/deliveryInfo")?,
	}))
}

fn subscription_view(subscription: &Value) -> Result<Value, EnvelopeError> {
	Ok(json!({
		"notifyURL": response::field(subscription, "/callbackReference/notifyURL")?,
		"destinationAddress": response::field(subscription, "/destinationAddress")?,
		"subscriptionId": response::id_from(response::str_field(subscription, "/resourceURL")?),
	}))
}

fn subscriptions_view(raw: &Value) -> Result<Value, EnvelopeError> {
	let pointer = "/subscriptionList/subscription";
	let subscriptions = response::field(raw, pointer)?
		.as_array()
		.ok_or_else(|| EnvelopeError::MissingField { pointer: pointer.into() })?;

	subscriptions.iter().map(subscription_view).collect::<Result<Vec<_>, _>>().map(Value::Array)
}
