#![cfg(feature = "reqwest")]

mod common;

// std
use std::collections::BTreeMap;
// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use common::*;
use cpaas_client::{
	error::{ConfigError, Error},
	resources::{CodeRequest, DeliveryMethod, MessageFilter, OutboundMessage},
};

#[tokio::test]
async fn send_code_posts_defaults_and_returns_code_id() {
	let server = MockServer::start_async().await;
	let client = authenticated_client(&server, &fresh_token_body());
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/cpaas/auth/v1/user-1/codes").json_body(json!({
				"code": {
					"address": ["+15551234567"],
					"method": "sms",
					"format": { "length": 6, "type": "numeric" },
					"expiry": 120,
					"message": "Your code is {code}"
				}
			}));
			then.status(201).json_body(json!({
				"code": { "resourceURL": "/cpaas/auth/v1/user-1/codes/51b545e7-729f" }
			}));
		})
		.await;
	let value = client
		.twofactor()
		.send_code(&CodeRequest::new("+15551234567", "Your code is {code}"))
		.await
		.expect("Code should be sent.");

	assert_eq!(value, json!({ "codeId": "51b545e7-729f" }));

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn resend_code_puts_to_code_resource() {
	let server = MockServer::start_async().await;
	let client = authenticated_client(&server, &fresh_token_body());
	let mock = server
		.mock_async(|when, then| {
			when.method(PUT).path("/cpaas/auth/v1/user-1/codes/c1").json_body(json!({
				"code": {
					"address": ["jane@example.com"],
					"method": "email",
					"format": { "length": 6, "type": "numeric" },
					"expiry": 120,
					"message": "{code}"
				}
			}));
			then.status(200)
				.json_body(json!({ "code": { "resourceURL": "/cpaas/auth/v1/user-1/codes/c1" } }));
		})
		.await;
	let request = CodeRequest::new("jane@example.com", "{code}").method(DeliveryMethod::Email);
	let value =
		client.twofactor().resend_code("c1", &request).await.expect("Code should be resent.");

	assert_eq!(value, json!({ "codeId": "c1" }));

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn verify_code_distinguishes_rejection_from_failure() {
	let server = MockServer::start_async().await;
	let client = authenticated_client(&server, &fresh_token_body());
	let _accepted = server
		.mock_async(|when, then| {
			when.method(PUT)
				.path("/cpaas/auth/v1/user-1/codes/good/verify")
				.json_body(json!({ "code": { "verify": "1234" } }));
			then.status(204);
		})
		.await;
	let _rejected = server
		.mock_async(|when, then| {
			when.method(PUT).path("/cpaas/auth/v1/user-1/codes/bad/verify");
			then.status(404).json_body(json!({
				"requestError": {
					"serviceException": { "messageId": "SVC0004", "text": "No code", "variables": [] }
				}
			}));
		})
		.await;
	let _broken = server
		.mock_async(|when, then| {
			when.method(PUT).path("/cpaas/auth/v1/user-1/codes/broken/verify");
			then.status(503).body("Service Unavailable");
		})
		.await;
	let twofactor = client.twofactor();

	assert_eq!(
		twofactor.verify_code("good", "1234").await.expect("Verification should resolve."),
		json!({ "verified": true, "message": "Success" })
	);
	assert_eq!(
		twofactor.verify_code("bad", "0000").await.expect("Rejection should resolve."),
		json!({ "verified": false, "message": "Code invalid or expired" })
	);

	let err = twofactor.verify_code("broken", "1234").await.expect_err("503 should propagate.");

	assert!(matches!(err, Error::Request(ref e) if e.status == Some(503)));
}

#[tokio::test]
async fn delete_code_reports_success() {
	let server = MockServer::start_async().await;
	let client = authenticated_client(&server, &fresh_token_body());
	let mock = server
		.mock_async(|when, then| {
			when.method(DELETE).path("/cpaas/auth/v1/user-1/codes/c1");
			then.status(204);
		})
		.await;
	let value = client.twofactor().delete_code("c1").await.expect("Code should be deleted.");

	assert_eq!(value, json!({ "codeId": "c1", "success": true }));

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn code_identifiers_stay_in_one_path_segment() {
	let server = MockServer::start_async().await;
	let client = authenticated_client(&server, &fresh_token_body());
	let escaped = server
		.mock_async(|when, then| {
			when.method(DELETE).path("/cpaas/auth/v1/user-1/codes/..%2F..%2Fnotificationchannel");
			then.status(204);
		})
		.await;
	let queried = server
		.mock_async(|when, then| {
			when.method(DELETE).path("/cpaas/auth/v1/user-1/codes/a%3Fx%3D1");
			then.status(204);
		})
		.await;
	let traversed = server
		.mock_async(|when, then| {
			when.method(DELETE).path("/cpaas/auth/v1/notificationchannel");
			then.status(204);
		})
		.await;
	let with_query = server
		.mock_async(|when, then| {
			when.method(DELETE).query_param_exists("x");
			then.status(204);
		})
		.await;
	let value = client
		.twofactor()
		.delete_code("../../notificationchannel")
		.await
		.expect("Encoded identifier should be deleted.");

	assert_eq!(value, json!({ "codeId": "../../notificationchannel", "success": true }));

	client.twofactor().delete_code("a?x=1").await.expect("Encoded identifier should be deleted.");

	let err = client.twofactor().delete_code("..").await.expect_err("Dot segment must be rejected.");

	assert!(matches!(err, Error::Config(ConfigError::InvalidPathSegment { segment }) if segment == ".."));

	escaped.assert_calls_async(1).await;
	queried.assert_calls_async(1).await;
	traversed.assert_calls_async(0).await;
	with_query.assert_calls_async(0).await;
}

#[tokio::test]
async fn resources_refresh_before_reading_user_id() {
	let server = MockServer::start_async().await;
	let client = client_for(&server);
	let token_mock = mock_token(&server, &fresh_token_body()).await;
	let mock = server
		.mock_async(|when, then| {
			when.method(DELETE).path("/cpaas/auth/v1/user-1/codes/c1");
			then.status(204);
		})
		.await;

	client.twofactor().delete_code("c1").await.expect("Code should be deleted.");

	token_mock.assert_calls_async(1).await;
	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn create_message_carries_correlation_tag() {
	let server = MockServer::start_async().await;
	let client = authenticated_client(&server, &fresh_token_body());
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/cpaas/smsmessaging/v1/user-1/outbound/+16135551111/requests")
				.json_body(json!({
					"outboundSMSMessageRequest": {
						"address": ["+16135552222", "+16135553333"],
						"clientCorrelator": "PRIV-project-rust",
						"outboundSMSTextMessage": { "message": "hi" }
					}
				}));
			then.status(201).json_body(json!({
				"outboundSMSMessageRequest": {
					"address": ["+16135552222", "+16135553333"],
					"deliveryInfoList": {
						"deliveryInfo": [
							{ "address": "+16135552222", "deliveryStatus": "DeliveredToNetwork" },
							{ "address": "+16135553333", "deliveryStatus": "DeliveredToNetwork" }
						]
					},
					"outboundSMSTextMessage": { "message": "hi" },
					"senderAddress": "+16135551111",
					"resourceURL": "/cpaas/smsmessaging/v1/user-1/outbound/+16135551111/requests/r1"
				}
			}));
		})
		.await;
	let message = OutboundMessage::new("+16135551111", ["+16135552222", "+16135553333"], "hi");
	let value =
		client.conversation().create_message(&message).await.expect("Message should be sent.");

	assert_eq!(value["message"], "hi");
	assert_eq!(value["senderAddress"], "+16135551111");
	assert_eq!(value["deliveryInfo"].as_array().map(Vec::len), Some(2));

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn message_listings_are_unwrapped() {
	let server = MockServer::start_async().await;
	let client = authenticated_client(&server, &fresh_token_body());
	let _thread = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/cpaas/smsmessaging/v1/user-1/remoteAddresses/+1222/localAddresses/+1333")
				.query_param("max", "5");
			then.status(200).json_body(json!({ "conversation": { "lastMessage": "hi" } }));
		})
		.await;
	let _messages = server
		.mock_async(|when, then| {
			when.method(GET).path(
				"/cpaas/smsmessaging/v1/user-1/remoteAddresses/+1222/localAddresses/+1333/messages",
			);
			then.status(200).json_body(json!({ "smsThreadList": { "smsThread": [] } }));
		})
		.await;
	let _status = server
		.mock_async(|when, then| {
			when.method(GET).path(
				"/cpaas/smsmessaging/v1/user-1/remoteAddresses/+1222/localAddresses/+1333/messages/m1/status",
			);
			then.status(200).json_body(json!({ "status": "DeliveredToTerminal" }));
		})
		.await;
	let _delete = server
		.mock_async(|when, then| {
			when.method(DELETE).path(
				"/cpaas/smsmessaging/v1/user-1/remoteAddresses/+1222/localAddresses/+1333/messages/m1",
			);
			then.status(204);
		})
		.await;
	let conversation = client.conversation();
	let filter = MessageFilter::default().remote_address("+1222").local_address("+1333").query("max", 5);

	assert_eq!(
		conversation.get_messages(&filter).await.expect("Listing should succeed."),
		json!({ "lastMessage": "hi" })
	);
	assert_eq!(
		conversation
			.get_messages_in_thread("+1222", "+1333", &BTreeMap::new())
			.await
			.expect("Thread should load."),
		json!({ "smsThread": [] })
	);
	assert_eq!(
		conversation.get_status("+1222", "+1333", "m1").await.expect("Status should load."),
		json!("DeliveredToTerminal")
	);
	assert_eq!(
		conversation.delete_message("+1222", "+1333", Some("m1")).await.expect("Delete succeeds."),
		json!({})
	);
}

#[tokio::test]
async fn subscribe_creates_channel_first() {
	let server = MockServer::start_async().await;
	let client = authenticated_client(&server, &fresh_token_body());
	let channel_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/cpaas/notificationchannel/v1/user-1/channels").json_body(
				json!({
					"notificationChannel": {
						"channelData": { "x-webhookURL": "https://example.com/hook" },
						"channelType": "webhooks",
						"clientCorrelator": "PRIV-project-rust"
					}
				}),
			);
			then.status(201).json_body(json!({
				"notificationChannel": {
					"callbackURL": "gw-42",
					"channelData": { "x-webhookURL": "https://example.com/hook" },
					"channelType": "Webhooks"
				}
			}));
		})
		.await;
	let subscription_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/cpaas/smsmessaging/v1/user-1/inbound/subscriptions").json_body(
				json!({
					"subscription": {
						"callbackReference": { "notifyURL": "gw-42" },
						"clientCorrelator": "PRIV-project-rust",
						"destinationAddress": "+16135551111"
					}
				}),
			);
			then.status(201).json_body(json!({
				"subscription": {
					"callbackReference": { "notifyURL": "gw-42" },
					"destinationAddress": "+16135551111",
					"resourceURL": "/cpaas/smsmessaging/v1/user-1/inbound/subscriptions/s-9"
				}
			}));
		})
		.await;
	let value = client
		.conversation()
		.subscribe("+16135551111", "https://example.com/hook")
		.await
		.expect("Subscription should be created.");

	assert_eq!(
		value,
		json!({
			"webhookURL": "https://example.com/hook",
			"destinationAddress": "+16135551111",
			"subscriptionId": "s-9"
		})
	);

	channel_mock.assert_calls_async(1).await;
	subscription_mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn subscriptions_are_listed_and_removed() {
	let server = MockServer::start_async().await;
	let client = authenticated_client(&server, &fresh_token_body());
	let _list = server
		.mock_async(|when, then| {
			when.method(GET).path("/cpaas/smsmessaging/v1/user-1/inbound/subscriptions");
			then.status(200).json_body(json!({
				"subscriptionList": {
					"subscription": [{
						"callbackReference": { "notifyURL": "gw-42" },
						"destinationAddress": "+16135551111",
						"resourceURL": "/cpaas/smsmessaging/v1/user-1/inbound/subscriptions/s-9"
					}]
				}
			}));
		})
		.await;
	let _one = server
		.mock_async(|when, then| {
			when.method(GET).path("/cpaas/smsmessaging/v1/user-1/inbound/subscriptions/s-9");
			then.status(200).json_body(json!({
				"subscription": {
					"callbackReference": { "notifyURL": "gw-42" },
					"destinationAddress": "+16135551111",
					"resourceURL": "/cpaas/smsmessaging/v1/user-1/inbound/subscriptions/s-9"
				}
			}));
		})
		.await;
	let _remove = server
		.mock_async(|when, then| {
			when.method(DELETE).path("/cpaas/smsmessaging/v1/user-1/inbound/subscriptions/s-9");
			then.status(204);
		})
		.await;
	let conversation = client.conversation();
	let expected =
		json!({ "notifyURL": "gw-42", "destinationAddress": "+16135551111", "subscriptionId": "s-9" });

	assert_eq!(
		conversation.get_subscriptions().await.expect("Listing should succeed."),
		json!([expected.clone()])
	);
	assert_eq!(
		conversation.get_subscription("s-9").await.expect("Subscription should load."),
		expected
	);
	assert_eq!(
		conversation.unsubscribe("s-9").await.expect("Unsubscribe should succeed."),
		json!({
			"subscriptionId": "s-9",
			"success": true,
			"message": "Unsubscribed from sms conversation notification"
		})
	);
}

#[tokio::test]
async fn notification_channels_round_trip() {
	let server = MockServer::start_async().await;
	let client = authenticated_client(&server, &fresh_token_body());
	let _list = server
		.mock_async(|when, then| {
			when.method(GET).path("/cpaas/notificationchannel/v1/user-1/channels");
			then.status(200)
				.json_body(json!({ "notificationChannelList": { "notificationChannel": [] } }));
		})
		.await;
	let _one = server
		.mock_async(|when, then| {
			when.method(GET).path("/cpaas/notificationchannel/v1/user-1/channels/gw-42");
			then.status(200).json_body(json!({ "notificationChannel": { "callbackURL": "gw-42" } }));
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(PUT)
				.path("/cpaas/notificationchannel/v1/user-1/channels/gw-42")
				.json_body(json!({ "notificationChannelLifetime": { "channelLifetime": 3600 } }));
			then.status(200)
				.json_body(json!({ "notificationChannelLifetime": { "channelLifetime": 3600 } }));
		})
		.await;
	let _remove = server
		.mock_async(|when, then| {
			when.method(DELETE).path("/cpaas/notificationchannel/v1/user-1/channels/gw-42");
			then.status(204);
		})
		.await;
	let channels = client.notification_channel();

	assert_eq!(
		channels.channels().await.expect("Listing should succeed."),
		json!({ "notificationChannel": [] })
	);
	assert_eq!(
		channels.channel("gw-42").await.expect("Channel should load."),
		json!({ "callbackURL": "gw-42" })
	);
	assert_eq!(
		channels.refresh_channel("gw-42", 3600).await.expect("Refresh should succeed."),
		json!({ "channelLifetime": 3600 })
	);
	assert_eq!(channels.remove_channel("gw-42").await.expect("Removal should succeed."), json!({}));

	refresh.assert_calls_async(1).await;
}

#[tokio::test]
async fn diagnostic_echo_passes_through_shaping() {
	let server = MockServer::start_async().await;
	let client = authenticated_client(&server, &fresh_token_body());
	let echo = json!({
		"success": "200",
		"__FOR_TEST__": { "method": "POST", "url": "/cpaas/auth/v1/user-1/codes" }
	});
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/cpaas/auth/v1/user-1/codes");
			then.status(200).json_body(json!({ "response": echo.clone() }));
		})
		.await;
	let value = client
		.twofactor()
		.send_code(&CodeRequest::new("+15551234567", "{code}"))
		.await
		.expect("Echo should normalize.");

	assert_eq!(value, echo);
}

#[tokio::test]
async fn subscribe_passes_diagnostic_echo_through() {
	let server = MockServer::start_async().await;
	let client = authenticated_client(&server, &fresh_token_body());
	let channel_echo = json!({
		"__FOR_TEST__": { "method": "POST", "url": "/cpaas/notificationchannel/v1/user-1/channels" }
	});
	let subscription_echo = json!({
		"__FOR_TEST__": {
			"method": "POST",
			"url": "/cpaas/smsmessaging/v1/user-1/inbound/subscriptions"
		}
	});
	let channel_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/cpaas/notificationchannel/v1/user-1/channels");
			then.status(200).json_body(json!({ "response": channel_echo.clone() }));
		})
		.await;
	let subscription_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/cpaas/smsmessaging/v1/user-1/inbound/subscriptions").json_body(
				json!({
					"subscription": {
						"callbackReference": {},
						"clientCorrelator": "PRIV-project-rust",
						"destinationAddress": "+16135551111"
					}
				}),
			);
			then.status(200).json_body(json!({ "response": subscription_echo.clone() }));
		})
		.await;
	let value = client
		.conversation()
		.subscribe("+16135551111", "https://example.com/hook")
		.await
		.expect("Echoes should pass through.");

	assert_eq!(value, subscription_echo);

	channel_mock.assert_calls_async(1).await;
	subscription_mock.assert_calls_async(1).await;
}
