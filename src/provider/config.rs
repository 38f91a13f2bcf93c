//! Validated provider and reputation-lookup configuration.
//!
//! Configuration is assembled through builders so a misconfigured endpoint fails at
//! construction instead of mid-flow. Endpoints owned by a remote party must be HTTPS.

// self
use crate::{_prelude::*, provider::ProviderKind, session::TokenSecret};

/// Validation failures raised while assembling provider or reputation configuration.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ProviderConfigError {
	/// A required endpoint URL was never supplied.
	#[error("The {endpoint} endpoint is required.")]
	MissingEndpoint {
		/// Endpoint label (authorization, token, profile, reputation).
		endpoint: &'static str,
	},
	/// A remote endpoint used a scheme other than HTTPS.
	#[error("The {endpoint} endpoint must use HTTPS: `{url}`.")]
	InsecureEndpoint {
		/// Endpoint label (authorization, token, profile, reputation).
		endpoint: &'static str,
		/// Offending URL.
		url: Url,
	},
	/// No client identifier was supplied.
	#[error("A client identifier is required.")]
	MissingClientId,
	/// No client secret was supplied.
	#[error("A client secret is required.")]
	MissingClientSecret,
	/// No redirect URI was supplied.
	#[error("A redirect URI is required.")]
	MissingRedirectUri,
}

/// Immutable configuration for one OAuth provider.
#[derive(Clone, Debug)]
pub struct ProviderConfig {
	/// Which provider this configuration describes.
	pub kind: ProviderKind,
	/// OAuth client identifier.
	pub client_id: String,
	/// OAuth client secret, redacted in logs.
	pub client_secret: TokenSecret,
	/// Authorize page end-users are sent to.
	pub authorization_endpoint: Url,
	/// Token endpoint used for the code exchange.
	pub token_endpoint: Url,
	/// Profile endpoint queried after a successful link.
	pub profile_endpoint: Url,
	/// Redirect URI; the exchange must send exactly the value authorization used.
	pub redirect_uri: Url,
	/// Scope string; the exchange must send exactly the value authorization used.
	pub scopes: String,
}
impl ProviderConfig {
	/// Creates a new builder for the given provider.
	pub fn builder(kind: ProviderKind) -> ProviderConfigBuilder {
		ProviderConfigBuilder::new(kind)
	}

	/// Builds the authorize URL end-users are redirected to, carrying the session's
	/// CSRF anchor as the `state` parameter.
	pub fn authorize_url(&self, state: &str) -> Url {
		let mut url = self.authorization_endpoint.clone();

		{
			let mut pairs = url.query_pairs_mut();

			pairs.append_pair("response_type", "code");
			pairs.append_pair("client_id", &self.client_id);
			pairs.append_pair("redirect_uri", self.redirect_uri.as_str());

			if !self.scopes.is_empty() {
				pairs.append_pair("scope", &self.scopes);
			}

			pairs.append_pair("state", state);
		}

		url
	}
}

/// Builder for [`ProviderConfig`].
#[derive(Clone, Debug)]
pub struct ProviderConfigBuilder {
	kind: ProviderKind,
	client_id: Option<String>,
	client_secret: Option<TokenSecret>,
	authorization_endpoint: Option<Url>,
	token_endpoint: Option<Url>,
	profile_endpoint: Option<Url>,
	redirect_uri: Option<Url>,
	scopes: String,
}
impl ProviderConfigBuilder {
	fn new(kind: ProviderKind) -> Self {
		Self {
			kind,
			client_id: None,
			client_secret: None,
			authorization_endpoint: None,
			token_endpoint: None,
			profile_endpoint: None,
			redirect_uri: None,
			scopes: String::new(),
		}
	}

	/// Sets the OAuth client identifier.
	pub fn client_id(mut self, value: impl Into<String>) -> Self {
		self.client_id = Some(value.into());

		self
	}

	/// Sets the OAuth client secret.
	pub fn client_secret(mut self, value: impl Into<String>) -> Self {
		self.client_secret = Some(TokenSecret::new(value));

		self
	}

	/// Sets the authorize-page endpoint.
	pub fn authorization_endpoint(mut self, url: Url) -> Self {
		self.authorization_endpoint = Some(url);

		self
	}

	/// Sets the token endpoint.
	pub fn token_endpoint(mut self, url: Url) -> Self {
		self.token_endpoint = Some(url);

		self
	}

	/// Sets the profile endpoint.
	pub fn profile_endpoint(mut self, url: Url) -> Self {
		self.profile_endpoint = Some(url);

		self
	}

	/// Sets the redirect URI used for both authorization and exchange.
	pub fn redirect_uri(mut self, url: Url) -> Self {
		self.redirect_uri = Some(url);

		self
	}

	/// Sets the scope string (may be empty; Twitch links request no scopes).
	pub fn scopes(mut self, value: impl Into<String>) -> Self {
		self.scopes = value.into();

		self
	}

	/// Validates and produces the configuration.
	pub fn build(self) -> Result<ProviderConfig, ProviderConfigError> {
		let authorization_endpoint = require_https(
			"authorization",
			self.authorization_endpoint
				.ok_or(ProviderConfigError::MissingEndpoint { endpoint: "authorization" })?,
		)?;
		let token_endpoint = require_https(
			"token",
			self.token_endpoint
				.ok_or(ProviderConfigError::MissingEndpoint { endpoint: "token" })?,
		)?;
		let profile_endpoint = require_https(
			"profile",
			self.profile_endpoint
				.ok_or(ProviderConfigError::MissingEndpoint { endpoint: "profile" })?,
		)?;

		Ok(ProviderConfig {
			kind: self.kind,
			client_id: self.client_id.ok_or(ProviderConfigError::MissingClientId)?,
			client_secret: self.client_secret.ok_or(ProviderConfigError::MissingClientSecret)?,
			authorization_endpoint,
			token_endpoint,
			profile_endpoint,
			redirect_uri: self.redirect_uri.ok_or(ProviderConfigError::MissingRedirectUri)?,
			scopes: self.scopes,
		})
	}
}

/// Configuration for the third-party reputation lookup.
#[derive(Clone, Debug)]
pub struct ReputationConfig {
	/// Lookup base endpoint; the login handle is appended as a path segment.
	pub endpoint: Url,
	/// User-Agent the lookup identifies itself with.
	pub user_agent: String,
}
impl ReputationConfig {
	const DEFAULT_USER_AGENT: &'static str =
		concat!("link-station/", env!("CARGO_PKG_VERSION"), " (Moderation Station)");

	/// Creates a reputation configuration for the given HTTPS endpoint.
	pub fn new(endpoint: Url) -> Result<Self, ProviderConfigError> {
		let endpoint = require_https("reputation", endpoint)?;

		Ok(Self { endpoint, user_agent: Self::DEFAULT_USER_AGENT.into() })
	}

	/// Overrides the User-Agent string.
	pub fn with_user_agent(mut self, value: impl Into<String>) -> Self {
		self.user_agent = value.into();

		self
	}
}

fn require_https(endpoint: &'static str, url: Url) -> Result<Url, ProviderConfigError> {
	if url.scheme() == "https" {
		Ok(url)
	} else {
		Err(ProviderConfigError::InsecureEndpoint { endpoint, url })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("Fixture URL should parse.")
	}

	fn builder() -> ProviderConfigBuilder {
		ProviderConfig::builder(ProviderKind::Discord)
			.client_id("client-1")
			.client_secret("secret-1")
			.authorization_endpoint(url("https://example.com/oauth2/authorize"))
			.token_endpoint(url("https://example.com/oauth2/token"))
			.profile_endpoint(url("https://example.com/users/@me"))
			.redirect_uri(url("https://link.example.com/oauth2/discord"))
			.scopes("identify guilds guilds.join")
	}

	#[test]
	fn builder_rejects_insecure_endpoints() {
		let err = builder()
			.token_endpoint(url("http://example.com/oauth2/token"))
			.build()
			.expect_err("Insecure token endpoint should be rejected.");

		assert!(matches!(err, ProviderConfigError::InsecureEndpoint { endpoint: "token", .. }));
	}

	#[test]
	fn builder_requires_credentials() {
		let err = ProviderConfig::builder(ProviderKind::Twitch)
			.client_secret("secret")
			.authorization_endpoint(url("https://example.com/a"))
			.token_endpoint(url("https://example.com/t"))
			.profile_endpoint(url("https://example.com/p"))
			.redirect_uri(url("https://link.example.com/cb"))
			.build()
			.expect_err("Missing client id should be rejected.");

		assert!(matches!(err, ProviderConfigError::MissingClientId));
	}

	#[test]
	fn authorize_url_carries_the_state_anchor() {
		let config = builder().build().expect("Builder fixture should succeed.");
		let authorize = config.authorize_url("anchor-123");
		let pairs: HashMap<_, _> = authorize.query_pairs().into_owned().collect();

		assert_eq!(pairs.get("response_type"), Some(&"code".into()));
		assert_eq!(pairs.get("client_id"), Some(&"client-1".into()));
		assert_eq!(pairs.get("redirect_uri"), Some(&config.redirect_uri.as_str().into()));
		assert_eq!(pairs.get("scope"), Some(&"identify guilds guilds.join".into()));
		assert_eq!(pairs.get("state"), Some(&"anchor-123".into()));
	}

	#[test]
	fn empty_scopes_are_omitted_from_authorize_urls() {
		let config = builder().scopes("").build().expect("Builder fixture should succeed.");
		let pairs: HashMap<_, _> =
			config.authorize_url("anchor").query_pairs().into_owned().collect();

		assert!(!pairs.contains_key("scope"));
	}

	#[test]
	fn reputation_config_enforces_https_and_defaults_the_user_agent() {
		assert!(matches!(
			ReputationConfig::new(url("http://modlookup.example.com/api/user-totals")),
			Err(ProviderConfigError::InsecureEndpoint { endpoint: "reputation", .. })
		));

		let config = ReputationConfig::new(url("https://modlookup.example.com/api/user-totals"))
			.expect("HTTPS reputation endpoint should be accepted.");

		assert!(config.user_agent.starts_with("link-station/"));
	}
}
