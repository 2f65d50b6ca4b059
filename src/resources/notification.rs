//! Parsing of webhook notifications pushed by the platform.

// self
use crate::{
	_prelude::*,
	error::EnvelopeError,
	response::{self, field},
};

/// Notification families delivered to SMS webhooks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NotificationKind {
	/// Delivery report for a message sent by the user.
	Outbound,
	/// Message received by the user.
	Inbound,
	/// Inbound subscription was cancelled by the platform.
	SubscriptionCancel,
	/// Message lifecycle event, such as a deletion.
	Event,
}
impl NotificationKind {
	/// Returns the `type` tag used in parsed notifications.
	pub const fn as_str(self) -> &'static str {
		match self {
			NotificationKind::Outbound => "outbound",
			NotificationKind::Inbound => "inbound",
			NotificationKind::SubscriptionCancel => "subscriptionCancel",
			NotificationKind::Event => "event",
		}
	}

	/// Returns the envelope key the platform wraps this family in.
	pub const fn envelope_key(self) -> &'static str {
		match self {
			NotificationKind::Outbound => "outboundSMSMessageNotification",
			NotificationKind::Inbound => "inboundSMSMessageNotification",
			NotificationKind::SubscriptionCancel => "smsSubscriptionCancellationNotification",
			NotificationKind::Event => "smsEventNotification",
		}
	}

	/// Resolves the family from an envelope key.
	pub fn from_envelope_key(key: &str) -> Option<Self> {
		[Self::Outbound, Self::Inbound, Self::SubscriptionCancel, Self::Event]
			.into_iter()
			.find(|kind| kind.envelope_key() == key)
	}
}
impl Display for NotificationKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Flattens a webhook notification into one object tagged by `type`.
///
/// Message notifications merge the message fields with `notificationId`,
/// `notificationDateTime`, and `type`. Cancellations and events resolve the subscription or
/// message identifier from their first link. Unknown families are unwrapped unchanged.
pub fn parse_notification(notification: &Value) -> Result<Value, EnvelopeError> {
	let envelope = notification.as_object().ok_or(EnvelopeError::NotAnObject)?;

	if envelope.len() > 1 {
		return Err(EnvelopeError::Ambiguous { keys: envelope.keys().cloned().collect() });
	}

	let Some((key, body)) = envelope.iter().next() else {
		return Ok(json!({}));
	};
	let Some(kind) = NotificationKind::from_envelope_key(key) else {
		return Ok(body.clone());
	};
	let mut parsed = Map::new();

	match kind {
		NotificationKind::Outbound | NotificationKind::Inbound => {
			for message_key in ["outboundSMSMessage", "inboundSMSMessage"] {
				if let Some(message) = body.get(message_key).and_then(Value::as_object) {
					parsed.extend(message.iter().map(|(k, v)| (k.clone(), v.clone())));
				}
			}
		},
		NotificationKind::SubscriptionCancel => {
			parsed.insert("subscriptionId".into(), first_link_id(body)?);
		},
		NotificationKind::Event => {
			parsed.insert("messageId".into(), first_link_id(body)?);
			parsed.insert(
				"eventDetails".into(),
				json!({
					"description": body.get("eventDescription"),
					"type": body.get("eventType"),
				}),
			);
		},
	}

	if let Some(id) = body.get("id") {
		parsed.insert("notificationId".into(), id.clone());
	}
	if let Some(date_time) = body.get("dateTime") {
		parsed.insert("notificationDateTime".into(), date_time.clone());
	}

	parsed.insert("type".into(), kind.as_str().into());

	Ok(Value::Object(parsed))
}

fn first_link_id(body: &Value) -> Result<Value, EnvelopeError> {
	let href = field(body, "/link/0/href")?
		.as_str()
		.ok_or_else(|| EnvelopeError::MissingField { pointer: "/link/0/href".into() })?;

	Ok(response::id_from(href).into())
}
