//! OAuth2 authorization-code exchange against a provider's token endpoint.

// self
use crate::{
	_prelude::*,
	error::UpstreamError,
	http::LinkHttpClient,
	provider::ProviderConfig,
	session::{OAuthTokenSet, TokenEndpointResponse},
};

const ENDPOINT: &str = "token exchange";

/// Performs authorization-code exchanges for any configured provider.
#[derive(Clone, Debug)]
pub struct TokenExchangeClient {
	http: LinkHttpClient,
}
impl TokenExchangeClient {
	/// Creates an exchange client over the shared transport.
	pub fn new(http: LinkHttpClient) -> Self {
		Self { http }
	}

	/// Exchanges `code` for a token set at the provider's token endpoint.
	///
	/// The form body carries exactly the redirect URI and scope string the
	/// authorization request was initiated with; any other value is rejected upstream.
	pub async fn exchange_code(
		&self,
		config: &ProviderConfig,
		code: &str,
	) -> Result<OAuthTokenSet, UpstreamError> {
		let redirect_uri = config.redirect_uri.to_string();
		let form = [
			("client_id", config.client_id.as_str()),
			("client_secret", config.client_secret.expose()),
			("grant_type", "authorization_code"),
			("code", code),
			("redirect_uri", redirect_uri.as_str()),
			("scope", config.scopes.as_str()),
		];
		let response: TokenEndpointResponse =
			self.http.post_form(ENDPOINT, &config.token_endpoint, &form).await?;

		Ok(OAuthTokenSet::from_response(response, OffsetDateTime::now_utc()))
	}
}
