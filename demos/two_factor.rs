//! Demonstrates a two-factor round trip against a mock platform: the first call exchanges the
//! project credentials for tokens, then a code is sent and verified twice.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::json;
use time::{Duration, OffsetDateTime};
// self
use cpaas_client::{
	client::{CpaasClient, TOKEN_PATH},
	config::ClientConfig,
	resources::CodeRequest,
};

fn demo_token() -> String {
	let now = OffsetDateTime::now_utc();
	let claims = json!({
		"iat": now.unix_timestamp(),
		"exp": (now + Duration::hours(1)).unix_timestamp(),
		"preferred_username": "demo-user"
	});

	format!(
		"{}.{}.demo",
		URL_SAFE_NO_PAD.encode(br#"{"alg":"none"}"#),
		URL_SAFE_NO_PAD.encode(claims.to_string())
	)
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token = demo_token();
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200).json_body(json!({ "access_token": token, "id_token": token }));
		})
		.await;
	let _send = server
		.mock_async(|when, then| {
			when.method(POST).path("/cpaas/auth/v1/demo-user/codes");
			then.status(201)
				.json_body(json!({ "code": { "resourceURL": "/cpaas/auth/v1/demo-user/codes/c-1" } }));
		})
		.await;
	let _accept = server
		.mock_async(|when, then| {
			when.method(PUT)
				.path("/cpaas/auth/v1/demo-user/codes/c-1/verify")
				.json_body(json!({ "code": { "verify": "123456" } }));
			then.status(204);
		})
		.await;
	let _reject = server
		.mock_async(|when, then| {
			when.method(PUT)
				.path("/cpaas/auth/v1/demo-user/codes/c-1/verify")
				.json_body(json!({ "code": { "verify": "000000" } }));
			then.status(404).json_body(json!({
				"requestError": {
					"serviceException": { "messageId": "SVC0004", "text": "No code", "variables": [] }
				}
			}));
		})
		.await;
	let config = ClientConfig::new("PRIV-demo")
		.with_client_secret("demo-secret")
		.with_base_url(server.base_url());
	let client = CpaasClient::new(&config)?;
	let twofactor = client.twofactor();
	let sent = twofactor
		.send_code(&CodeRequest::new("+15551234567", "Your code is {code}"))
		.await?;
	let code_id = sent["codeId"].as_str().unwrap_or_default();

	println!("Sent code {code_id} to user {:?}.", client.current_user_id());
	println!("Correct code: {}.", twofactor.verify_code(code_id, "123456").await?);
	println!("Wrong code: {}.", twofactor.verify_code(code_id, "000000").await?);

	token_mock.assert_async().await;

	Ok(())
}
