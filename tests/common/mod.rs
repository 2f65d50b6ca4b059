#![allow(dead_code)]

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use httpmock::{Mock, prelude::*};
use serde_json::{Value, json};
use time::{Duration, OffsetDateTime};
// self
use cpaas_client::{
	auth::TokenResponse,
	client::{CpaasClient, TOKEN_PATH},
	config::ClientConfig,
};

pub const CLIENT_ID: &str = "PRIV-project";
pub const CLIENT_SECRET: &str = "project-secret";
pub const USER_ID: &str = "user-1";

/// Builds a compact token whose claims segment decodes to the given lifetime.
pub fn forge(iat: i64, exp: i64, username: &str) -> String {
	let claims = json!({ "iat": iat, "exp": exp, "preferred_username": username });

	format!(
		"{}.{}.signature",
		URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#),
		URL_SAFE_NO_PAD.encode(claims.to_string())
	)
}

/// Token endpoint body for a token issued `age` ago that expires in `remaining`.
pub fn token_body(age: Duration, remaining: Duration, username: &str) -> Value {
	let now = OffsetDateTime::now_utc();
	let token = forge((now - age).unix_timestamp(), (now + remaining).unix_timestamp(), username);

	json!({
		"access_token": token,
		"id_token": token,
		"token_type": "bearer",
		"expires_in": remaining.whole_seconds()
	})
}

/// Token endpoint body that is still fresh.
pub fn fresh_token_body() -> Value {
	token_body(Duration::ZERO, Duration::hours(1), USER_ID)
}

/// Token endpoint body already past the midpoint of its lifetime.
pub fn stale_token_body() -> Value {
	token_body(Duration::hours(2), Duration::hours(1), USER_ID)
}

/// Bearer token carried by `body`.
pub fn access_token_of(body: &Value) -> String {
	body["access_token"].as_str().expect("Token body should carry an access token.").to_owned()
}

pub fn config_for(server: &MockServer) -> ClientConfig {
	ClientConfig::new(CLIENT_ID).with_client_secret(CLIENT_SECRET).with_base_url(server.base_url())
}

pub fn client_for(server: &MockServer) -> CpaasClient {
	CpaasClient::new(&config_for(server)).expect("Client should build for the mock server.")
}

/// Client whose token state already holds `body`.
pub fn authenticated_client(server: &MockServer, body: &Value) -> CpaasClient {
	let client = client_for(server);
	let response =
		TokenResponse::from_value(body.clone()).expect("Forged token body should deserialize.");

	client.apply_token_response(Some(&response)).expect("Forged tokens should decode.");

	client
}

pub async fn mock_token<'a>(server: &'a MockServer, body: &Value) -> Mock<'a> {
	server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200).header("content-type", "application/json").json_body(body.clone());
		})
		.await
}

pub fn bearer(token: &str) -> String {
	format!("Bearer {token}")
}
