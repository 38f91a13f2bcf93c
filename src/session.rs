//! Linking sessions: the per-user record tracking both provider OAuth links.

pub mod id;
pub mod stage;
pub mod token;

pub use id::*;
pub use stage::*;
pub use token::*;

// self
use crate::{
	_prelude::*,
	eligibility::EligibilityDecision,
	profile::ProviderProfile,
	provider::ProviderKind,
};

/// Server-side record tracking one user's progress through both provider OAuth flows.
///
/// The session identifier is the CSRF anchor: every provider callback must present it
/// via the OAuth `state` parameter before any token exchange runs. Token material is
/// keyed per provider and each link only ever writes its own key, so a Discord
/// exchange can never clobber Twitch tokens or vice versa.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LinkingSession {
	/// Opaque server-issued identifier, used as the CSRF anchor.
	pub id: SessionId,
	/// Current state-machine stage.
	pub stage: LinkStage,
	tokens: HashMap<ProviderKind, OAuthTokenSet>,
	/// Twitch-side profile snapshot, cached once fetched.
	pub profile: Option<ProviderProfile>,
	/// Eligibility decision, cached once evaluated.
	pub decision: Option<EligibilityDecision>,
}
impl LinkingSession {
	/// Creates a fresh session at the [`LinkStage::Start`] stage.
	pub fn new(id: SessionId) -> Self {
		Self { id, stage: LinkStage::Start, tokens: HashMap::new(), profile: None, decision: None }
	}

	/// Validates a callback's `state` parameter against the session anchor.
	///
	/// Runs before anything else in a callback; a mismatch is terminal and must never
	/// trigger a token exchange.
	pub fn validate_state(&self, provider: ProviderKind, presented: &str) -> Result<()> {
		if presented == self.id.as_ref() {
			Ok(())
		} else {
			Err(Error::CsrfMismatch { provider })
		}
	}

	/// Stores the token set obtained for `provider`, replacing any prior value for
	/// that provider only.
	pub fn attach_token(&mut self, provider: ProviderKind, tokens: OAuthTokenSet) {
		self.tokens.insert(provider, tokens);
	}

	/// Returns the token set obtained for `provider`, if the link completed.
	pub fn token(&self, provider: ProviderKind) -> Option<&OAuthTokenSet> {
		self.tokens.get(&provider)
	}

	/// Advances the state machine to `stage`.
	pub fn advance(&mut self, stage: LinkStage) {
		self.stage = stage;
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn token_set(access: &str) -> OAuthTokenSet {
		OAuthTokenSet::from_response(
			TokenEndpointResponse {
				access_token: access.into(),
				token_type: "Bearer".into(),
				expires_in: 600,
				refresh_token: None,
				scope: None,
			},
			OffsetDateTime::now_utc(),
		)
	}

	#[test]
	fn state_validation_matches_the_anchor_only() {
		let session = LinkingSession::new(SessionId::new("anchor-1").expect("Valid session id."));

		assert!(session.validate_state(ProviderKind::Discord, "anchor-1").is_ok());

		let err = session
			.validate_state(ProviderKind::Discord, "anchor-2")
			.expect_err("Mismatched state should fail.");

		assert!(matches!(err, Error::CsrfMismatch { provider: ProviderKind::Discord }));
	}

	#[test]
	fn each_provider_link_writes_only_its_own_key() {
		let mut session = LinkingSession::new(SessionId::generate());

		session.attach_token(ProviderKind::Discord, token_set("discord-access"));
		session.attach_token(ProviderKind::Twitch, token_set("twitch-access"));

		assert_eq!(
			session.token(ProviderKind::Discord).map(|set| set.access_token.expose()),
			Some("discord-access")
		);
		assert_eq!(
			session.token(ProviderKind::Twitch).map(|set| set.access_token.expose()),
			Some("twitch-access")
		);

		session.attach_token(ProviderKind::Twitch, token_set("twitch-refreshed"));

		assert_eq!(
			session.token(ProviderKind::Discord).map(|set| set.access_token.expose()),
			Some("discord-access"),
			"Replacing one provider's tokens must not disturb the other's."
		);
	}

	#[test]
	fn sessions_round_trip_through_serde() {
		let mut session = LinkingSession::new(SessionId::generate());

		session.attach_token(ProviderKind::Discord, token_set("discord-access"));
		session.advance(LinkStage::DiscordLinked);

		let payload = serde_json::to_string(&session).expect("Session should serialize.");
		let restored: LinkingSession =
			serde_json::from_str(&payload).expect("Session should deserialize.");

		assert_eq!(restored.id, session.id);
		assert_eq!(restored.stage, LinkStage::DiscordLinked);
		assert!(restored.token(ProviderKind::Discord).is_some());
	}
}
