// std
use std::sync::Arc;
// crates.io
use time::{Duration, macros};
// self
use link_station::{
	provider::ProviderKind,
	session::{
		LinkStage, LinkingSession, OAuthTokenSet, SessionId, TokenEndpointResponse,
	},
	store::{MemoryStore, SessionStore},
};

fn token_set(access: &str) -> OAuthTokenSet {
	OAuthTokenSet::from_response(
		TokenEndpointResponse {
			access_token: access.into(),
			token_type: "Bearer".into(),
			expires_in: 3600,
			refresh_token: Some("refresh-1".into()),
			scope: Some("identify".into()),
		},
		macros::datetime!(2026-08-29 12:00 UTC),
	)
}

fn populated_session() -> LinkingSession {
	let mut session = LinkingSession::new(SessionId::generate());

	session.attach_token(ProviderKind::Discord, token_set("discord-access"));
	session.attach_token(ProviderKind::Twitch, token_set("twitch-access"));
	session.advance(LinkStage::TwitchLinked);

	session
}

#[tokio::test]
async fn sessions_survive_the_store_with_their_token_material() {
	let store = MemoryStore::new();
	let session = populated_session();

	store.save(&session).await.expect("Save should succeed.");

	let restored = store
		.load(&session.id)
		.await
		.expect("Load should succeed.")
		.expect("Stored session should remain present.");

	assert_eq!(restored.stage, LinkStage::TwitchLinked);
	assert_eq!(
		restored.token(ProviderKind::Discord).map(|set| set.access_token.expose()),
		Some("discord-access")
	);
	assert_eq!(
		restored.token(ProviderKind::Twitch).map(|set| set.access_token.expose()),
		Some("twitch-access")
	);

	let expires_at = restored
		.token(ProviderKind::Twitch)
		.expect("Twitch tokens should be present.")
		.expires_at;

	assert_eq!(expires_at, macros::datetime!(2026-08-29 12:00 UTC) + Duration::seconds(3600));
}

#[tokio::test]
async fn the_store_is_usable_through_the_trait_object_seam() {
	let store: Arc<dyn SessionStore> = Arc::new(MemoryStore::new());
	let session = populated_session();

	store.save(&session).await.expect("Save should succeed.");

	assert!(
		store
			.load(&session.id)
			.await
			.expect("Load should succeed.")
			.is_some()
	);

	store.remove(&session.id).await.expect("Remove should succeed.");

	assert!(
		store
			.load(&session.id)
			.await
			.expect("Load should succeed.")
			.is_none()
	);
}

#[tokio::test]
async fn distinct_sessions_are_isolated() {
	let store = MemoryStore::new();
	let a = populated_session();
	let b = LinkingSession::new(SessionId::generate());

	store.save(&a).await.expect("Save should succeed.");
	store.save(&b).await.expect("Save should succeed.");

	assert_eq!(store.len(), 2);

	store.remove(&a.id).await.expect("Remove should succeed.");

	let survivor = store
		.load(&b.id)
		.await
		.expect("Load should succeed.")
		.expect("Unrelated session should survive.");

	assert_eq!(survivor.id, b.id);
	assert_eq!(survivor.stage, LinkStage::Start);
}
