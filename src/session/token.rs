//! OAuth token material obtained by a provider link, with redacted secrets.

// self
use crate::_prelude::*;

/// Redacted token secret wrapper keeping sensitive material out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Wire shape of a provider's token endpoint response.
#[derive(Clone, Debug, Deserialize)]
pub struct TokenEndpointResponse {
	/// Access token issued for the exchanged authorization code.
	pub access_token: String,
	/// Token type (`Bearer` for both supported providers).
	pub token_type: String,
	/// Relative expiry in seconds.
	pub expires_in: i64,
	/// Refresh token, when the provider issues one.
	#[serde(default)]
	pub refresh_token: Option<String>,
	/// Scope string granted by the provider.
	#[serde(default)]
	pub scope: Option<String>,
}

/// Token material obtained from one provider's code exchange.
///
/// Owned exclusively by the [`LinkingSession`](crate::session::LinkingSession) that
/// obtained it; never shared across sessions.
#[derive(Clone, Serialize, Deserialize)]
pub struct OAuthTokenSet {
	/// Access token secret.
	pub access_token: TokenSecret,
	/// Token type reported by the provider (used verbatim in the Authorization header).
	pub token_type: String,
	/// Refresh token secret, if the provider issued one.
	pub refresh_token: Option<TokenSecret>,
	/// Scope string granted alongside the tokens.
	pub scope: String,
	/// Instant the exchange completed.
	pub obtained_at: OffsetDateTime,
	/// Expiry instant derived from the provider's `expires_in`.
	pub expires_at: OffsetDateTime,
}
impl OAuthTokenSet {
	/// Builds a token set from the wire response, stamped at `obtained_at`.
	pub fn from_response(response: TokenEndpointResponse, obtained_at: OffsetDateTime) -> Self {
		let expires_at = obtained_at + Duration::seconds(response.expires_in.max(0));

		Self {
			access_token: TokenSecret::new(response.access_token),
			token_type: response.token_type,
			refresh_token: response.refresh_token.map(TokenSecret::new),
			scope: response.scope.unwrap_or_default(),
			obtained_at,
			expires_at,
		}
	}

	/// Formats the `token_type access_token` pair for an Authorization header.
	///
	/// Profile fetches must reuse the exact pair returned by the exchange for the same
	/// provider, so this is the only place the header is assembled.
	pub fn authorization_header(&self) -> String {
		format!("{} {}", self.token_type, self.access_token.expose())
	}

	/// Returns `true` if the access token has expired at the provided instant.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		instant >= self.expires_at
	}
}
impl Debug for OAuthTokenSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OAuthTokenSet")
			.field("access_token", &"<redacted>")
			.field("token_type", &self.token_type)
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("scope", &self.scope)
			.field("obtained_at", &self.obtained_at)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}
