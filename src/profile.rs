//! Authenticated profile fetches and the third-party reputation lookup.

// self
use crate::{
	_prelude::*,
	error::UpstreamError,
	http::LinkHttpClient,
	provider::{ProviderConfig, ReputationConfig},
	session::{MemberId, OAuthTokenSet},
};

const PROFILE_ENDPOINT: &str = "profile";
const IDENTITY_ENDPOINT: &str = "directory identity";
const REPUTATION_ENDPOINT: &str = "reputation";

/// Twitch-side profile snapshot driving the eligibility decision.
///
/// Immutable once fetched for a session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderProfile {
	/// Provider-assigned user identifier.
	pub id: String,
	/// Login handle used for the reputation lookup.
	pub login: String,
	/// Display name; becomes the desired directory nickname.
	pub display_name: String,
	/// Account-type flag (`"staff"` for Twitch staff accounts).
	#[serde(rename = "type", default)]
	pub user_type: String,
	/// Broadcaster-tier flag (`"partner"` for partnered channels).
	#[serde(default)]
	pub broadcaster_type: String,
}
impl ProviderProfile {
	/// Returns `true` when the account carries the staff tier flag.
	pub fn is_staff(&self) -> bool {
		self.user_type == "staff"
	}

	/// Returns `true` when the account carries the partner tier flag.
	pub fn is_partner(&self) -> bool {
		self.broadcaster_type == "partner"
	}

	/// Returns `true` when either tier flag grants eligibility unconditionally.
	pub fn has_tier_flag(&self) -> bool {
		self.is_staff() || self.is_partner()
	}
}

#[derive(Debug, Deserialize)]
struct ProfileListResponse {
	data: Vec<ProviderProfile>,
}

/// The linked Discord identity, resolved just before reconciliation.
#[derive(Clone, Debug, Deserialize)]
pub struct DirectoryIdentity {
	/// Directory member identifier for the authenticated user.
	pub id: MemberId,
	/// Account username, for audit context only.
	#[serde(default)]
	pub username: String,
}

/// Third-party reputation totals keyed by login handle.
///
/// Immutable snapshot; carried verbatim into ineligible outcomes so callers can
/// present the numbers that produced the decision.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReputationMetrics {
	/// Login handle the totals describe.
	#[serde(default)]
	pub user: String,
	/// Total channel views observed.
	#[serde(default)]
	pub views: u64,
	/// Total follower count across moderated channels.
	pub follows: u64,
	/// Total channel count observed.
	#[serde(default)]
	pub total: u64,
	/// Count of partnered channels the user moderates.
	pub partners: u64,
}

/// Fetches authenticated profiles and reputation totals.
#[derive(Clone, Debug)]
pub struct ProfileFetcher {
	http: LinkHttpClient,
}
impl ProfileFetcher {
	/// Creates a fetcher over the shared transport.
	pub fn new(http: LinkHttpClient) -> Self {
		Self { http }
	}

	/// Fetches the Twitch-side profile using the bearer pair from the Twitch link.
	///
	/// The endpoint returns a single-element list; an empty list is surfaced as an
	/// unusable payload rather than a panic.
	pub async fn twitch_profile(
		&self,
		config: &ProviderConfig,
		tokens: &OAuthTokenSet,
	) -> Result<ProviderProfile, UpstreamError> {
		let authorization = tokens.authorization_header();
		let headers =
			[("Authorization", authorization.as_str()), ("Client-Id", config.client_id.as_str())];
		let response: ProfileListResponse =
			self.http.get_json(PROFILE_ENDPOINT, &config.profile_endpoint, &headers).await?;

		response.data.into_iter().next().ok_or(UpstreamError::EmptyPayload {
			endpoint: PROFILE_ENDPOINT,
			message: "profile list was empty",
		})
	}

	/// Resolves the Discord identity using the token-type pair from the Discord link.
	pub async fn discord_identity(
		&self,
		config: &ProviderConfig,
		tokens: &OAuthTokenSet,
	) -> Result<DirectoryIdentity, UpstreamError> {
		let authorization = tokens.authorization_header();

		self.http
			.get_json(
				IDENTITY_ENDPOINT,
				&config.profile_endpoint,
				&[("Authorization", authorization.as_str())],
			)
			.await
	}

	/// Looks up reputation totals for a login handle.
	pub async fn reputation(
		&self,
		config: &ReputationConfig,
		login: &str,
	) -> Result<ReputationMetrics, UpstreamError> {
		let mut url = config.endpoint.clone();

		if let Ok(mut segments) = url.path_segments_mut() {
			segments.pop_if_empty().push(login);
		}

		self.http
			.get_json(REPUTATION_ENDPOINT, &url, &[("User-Agent", config.user_agent.as_str())])
			.await
	}
}
