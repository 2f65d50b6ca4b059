//! Client settings and their validation into a [`ClientIdentity`].

// self
use crate::{_prelude::*, auth::ClientIdentity, error::ConfigError};

/// Production base address of the platform.
pub const DEFAULT_BASE_URL: &str = "https://oauth-cpaas.kandy.com";

/// Raw client settings, as written by hand or loaded from a config file.
///
/// Supply `client_id` with either `client_secret` (private project key) or `email` and
/// `password` (account login). When both forms are present the account login is used.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientConfig {
	/// Base address of the platform; [`DEFAULT_BASE_URL`] when unset.
	pub base_url: Option<String>,
	/// Project key or account client identifier.
	pub client_id: Option<String>,
	/// Private project secret.
	pub client_secret: Option<String>,
	/// Account login email.
	pub email: Option<String>,
	/// Account login password.
	pub password: Option<String>,
}
impl ClientConfig {
	/// Starts settings for the provided client identifier.
	pub fn new(client_id: impl Into<String>) -> Self {
		Self { client_id: Some(client_id.into()), ..Self::default() }
	}

	/// Sets the private project secret.
	pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
		self.client_secret = Some(secret.into());

		self
	}

	/// Sets the account email and password.
	pub fn with_password_credentials(
		mut self,
		email: impl Into<String>,
		password: impl Into<String>,
	) -> Self {
		self.email = Some(email.into());
		self.password = Some(password.into());

		self
	}

	/// Overrides the base address.
	pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
		self.base_url = Some(base_url.into());

		self
	}

	/// Parses the base address, falling back to [`DEFAULT_BASE_URL`].
	pub fn base_url(&self) -> Result<Url, ConfigError> {
		let raw = self.base_url.as_deref().filter(|v| !v.trim().is_empty()).unwrap_or(DEFAULT_BASE_URL);

		Url::parse(raw).map_err(|source| ConfigError::InvalidBaseUrl { url: raw.into(), source })
	}

	/// Validates the settings into an immutable identity.
	pub fn validate(&self) -> Result<ClientIdentity, ConfigError> {
		let client_id = self
			.client_id
			.clone()
			.filter(|v| !is_blank(v))
			.ok_or(ConfigError::MissingClientId)?;

		match (&self.email, &self.password, &self.client_secret) {
			(Some(email), Some(password), _) if !is_blank(email) && !is_blank(password) =>
				ClientIdentity::with_password(client_id, email, password),
			(_, _, Some(secret)) => ClientIdentity::with_secret(client_id, secret),
			_ => Err(ConfigError::MissingCredentials),
		}
	}
}
impl Debug for ClientConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ClientConfig")
			.field("base_url", &self.base_url)
			.field("client_id", &self.client_id)
			.field("client_secret_set", &self.client_secret.is_some())
			.field("email", &self.email)
			.field("password_set", &self.password.is_some())
			.finish()
	}
}

fn is_blank(value: &str) -> bool {
	value.trim().is_empty()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::auth::Credentials;

	#[test]
	fn missing_client_id_is_rejected() {
		let config = ClientConfig { client_secret: Some("secret".into()), ..Default::default() };

		assert!(matches!(config.validate(), Err(ConfigError::MissingClientId)));
	}

	#[test]
	fn missing_credentials_are_rejected() {
		assert!(matches!(
			ClientConfig::new("client").validate(),
			Err(ConfigError::MissingCredentials)
		));
		assert!(matches!(
			ClientConfig { email: Some("jane@example.com".into()), ..ClientConfig::new("client") }
				.validate(),
			Err(ConfigError::MissingCredentials)
		));
	}

	#[test]
	fn account_login_wins_over_secret() {
		let identity = ClientConfig::new("client")
			.with_client_secret("secret")
			.with_password_credentials("jane@example.com", "pw")
			.validate()
			.expect("Identity should validate.");

		assert!(matches!(identity.credentials, Credentials::Password { .. }));
	}

	#[test]
	fn blank_login_falls_back_to_secret() {
		let identity = ClientConfig::new("client")
			.with_client_secret("secret")
			.with_password_credentials("x", "   ")
			.validate()
			.expect("Secret should be used.");

		assert!(matches!(identity.credentials, Credentials::Secret(_)));
	}

	#[test]
	fn base_url_defaults_and_validates() {
		let config = ClientConfig::new("client").with_client_secret("secret");

		assert_eq!(
			config.base_url().expect("Default should parse.").as_str(),
			"https://oauth-cpaas.kandy.com/"
		);
		assert!(matches!(
			config.with_base_url("not a url").base_url(),
			Err(ConfigError::InvalidBaseUrl { .. })
		));
	}

	#[test]
	fn deserializes_camel_case_settings() {
		let config: ClientConfig = serde_json::from_value(json!({
			"clientId": "client",
			"clientSecret": "secret",
			"baseUrl": "https://example.com"
		}))
		.expect("Settings should deserialize.");

		assert_eq!(config.client_id.as_deref(), Some("client"));
		assert!(config.validate().is_ok());
	}
}
