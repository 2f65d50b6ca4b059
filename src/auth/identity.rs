//! Client identity and grant resolution for the token endpoint.

// crates.io
use oauth2::{ClientId, ClientSecret, ResourceOwnerPassword, ResourceOwnerUsername};
// self
use crate::{_prelude::*, error::ConfigError};

/// Scope requested on every exchange.
pub const OPENID_SCOPE: &str = "openid";

/// OAuth 2.0 grant types the client can perform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
	/// Project key + secret, for server-side applications.
	ClientCredentials,
	/// Account email + password.
	Password,
}
impl GrantType {
	/// Returns the RFC 6749 identifier for the grant type.
	pub fn as_str(self) -> &'static str {
		match self {
			GrantType::ClientCredentials => "client_credentials",
			GrantType::Password => "password",
		}
	}
}
impl Display for GrantType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Secret half of a client identity.
#[derive(Clone, Debug)]
pub enum Credentials {
	/// Private project secret.
	Secret(ClientSecret),
	/// Account login.
	Password {
		/// Account email, sent as the grant's `username`.
		email: ResourceOwnerUsername,
		/// Account password.
		password: ResourceOwnerPassword,
	},
}

/// Validated, immutable identity a client authenticates with.
#[derive(Clone, Debug)]
pub struct ClientIdentity {
	/// Project key or account client identifier.
	pub client_id: ClientId,
	/// Secret or email/password pair.
	pub credentials: Credentials,
}
impl ClientIdentity {
	/// Builds a client-credentials identity.
	pub fn with_secret(
		client_id: impl Into<String>,
		secret: impl Into<String>,
	) -> Result<Self, ConfigError> {
		let secret = non_blank(Some(secret.into())).ok_or(ConfigError::MissingCredentials)?;

		Ok(Self {
			client_id: client_id_from(client_id.into())?,
			credentials: Credentials::Secret(ClientSecret::new(secret)),
		})
	}

	/// Builds an account (password grant) identity.
	pub fn with_password(
		client_id: impl Into<String>,
		email: impl Into<String>,
		password: impl Into<String>,
	) -> Result<Self, ConfigError> {
		let email = non_blank(Some(email.into())).ok_or(ConfigError::MissingCredentials)?;
		let password = non_blank(Some(password.into())).ok_or(ConfigError::MissingCredentials)?;

		Ok(Self {
			client_id: client_id_from(client_id.into())?,
			credentials: Credentials::Password {
				email: ResourceOwnerUsername::new(email),
				password: ResourceOwnerPassword::new(password),
			},
		})
	}

	/// Tag attached to outgoing bodies so the vendor can trace requests back to this client.
	pub fn correlation_tag(&self) -> String {
		format!("{}-rust", self.client_id.as_str())
	}

	fn secret(&self) -> Option<&str> {
		match &self.credentials {
			Credentials::Secret(secret) => Some(secret.secret()),
			Credentials::Password { .. } => None,
		}
	}

	fn login(&self) -> (Option<&str>, Option<&str>) {
		match &self.credentials {
			Credentials::Password { email, password } =>
				(Some(email.as_str()), Some(password.secret().as_str())),
			Credentials::Secret(_) => (None, None),
		}
	}
}

/// Per-call replacements for stored identity fields; each set field wins over the stored one.
#[derive(Clone, Default)]
pub struct IdentityOverrides {
	/// Replacement client identifier.
	pub client_id: Option<String>,
	/// Replacement client secret.
	pub client_secret: Option<String>,
	/// Replacement account email.
	pub email: Option<String>,
	/// Replacement account password.
	pub password: Option<String>,
}
impl IdentityOverrides {
	/// Overrides the client identifier.
	pub fn client_id(mut self, value: impl Into<String>) -> Self {
		self.client_id = Some(value.into());

		self
	}

	/// Overrides the client secret.
	pub fn client_secret(mut self, value: impl Into<String>) -> Self {
		self.client_secret = Some(value.into());

		self
	}

	/// Overrides the account email and password.
	pub fn login(mut self, email: impl Into<String>, password: impl Into<String>) -> Self {
		self.email = Some(email.into());
		self.password = Some(password.into());

		self
	}
}
impl Debug for IdentityOverrides {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("IdentityOverrides")
			.field("client_id", &self.client_id)
			.field("client_secret_set", &self.client_secret.is_some())
			.field("email", &self.email)
			.field("password_set", &self.password.is_some())
			.finish()
	}
}

/// Fully resolved grant, ready to be form-encoded.
#[derive(Clone, Debug)]
pub enum Grant {
	/// `grant_type=client_credentials`.
	ClientCredentials {
		/// Client identifier.
		client_id: ClientId,
		/// Client secret.
		client_secret: ClientSecret,
	},
	/// `grant_type=password`.
	Password {
		/// Client identifier.
		client_id: ClientId,
		/// Account email.
		username: ResourceOwnerUsername,
		/// Account password.
		password: ResourceOwnerPassword,
	},
}
impl Grant {
	/// Resolves the grant for `identity`, letting every field set in `overrides` win.
	///
	/// An email with a password selects the password grant; otherwise a secret selects the
	/// client-credentials grant.
	pub fn resolve(
		identity: &ClientIdentity,
		overrides: &IdentityOverrides,
	) -> Result<Self, ConfigError> {
		let client_id = non_blank(overrides.client_id.clone())
			.map(ClientId::new)
			.unwrap_or_else(|| identity.client_id.clone());
		let (stored_email, stored_password) = identity.login();
		let email = non_blank(overrides.email.clone()).or_else(|| stored_email.map(Into::into));
		let password =
			non_blank(overrides.password.clone()).or_else(|| stored_password.map(Into::into));
		let secret =
			non_blank(overrides.client_secret.clone()).or_else(|| identity.secret().map(Into::into));

		match (email, password, secret) {
			(Some(email), Some(password), _) => Ok(Self::Password {
				client_id,
				username: ResourceOwnerUsername::new(email),
				password: ResourceOwnerPassword::new(password),
			}),
			(_, _, Some(secret)) =>
				Ok(Self::ClientCredentials { client_id, client_secret: ClientSecret::new(secret) }),
			_ => Err(ConfigError::MissingCredentials),
		}
	}

	/// Grant type label.
	pub fn grant_type(&self) -> GrantType {
		match self {
			Self::ClientCredentials { .. } => GrantType::ClientCredentials,
			Self::Password { .. } => GrantType::Password,
		}
	}

	/// Form fields posted to the token endpoint.
	pub fn form(&self) -> BTreeMap<String, String> {
		let mut form = BTreeMap::new();

		form.insert("grant_type".into(), self.grant_type().as_str().into());
		form.insert("scope".into(), OPENID_SCOPE.into());

		match self {
			Self::ClientCredentials { client_id, client_secret } => {
				form.insert("client_id".into(), client_id.as_str().into());
				form.insert("client_secret".into(), client_secret.secret().clone());
			},
			Self::Password { client_id, username, password } => {
				form.insert("client_id".into(), client_id.as_str().into());
				form.insert("username".into(), username.as_str().into());
				form.insert("password".into(), password.secret().clone());
			},
		}

		form
	}
}

fn client_id_from(value: String) -> Result<ClientId, ConfigError> {
	non_blank(Some(value)).map(ClientId::new).ok_or(ConfigError::MissingClientId)
}

fn non_blank(value: Option<String>) -> Option<String> {
	value.filter(|v| !v.trim().is_empty())
}
