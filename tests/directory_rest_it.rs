// std
use std::sync::Arc;
// crates.io
use httpmock::prelude::*;
// self
use link_station::{
	audit::NullAuditSink,
	directory::{GroupDirectory, RestDirectory, Role},
	http::LinkHttpClient,
	reconcile::{ReconcileRequest, Reconciler},
	reqwest::Client as ReqwestClient,
	session::{MemberId, TokenSecret},
	url::Url,
};

const GUILD_ID: &str = "352896412880470017";
const MEMBER_ID: &str = "190356249";

/// Accepts the self-signed certificates produced by `httpmock`.
fn insecure_http() -> LinkHttpClient {
	LinkHttpClient::with_client(
		ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure reqwest client for tests."),
	)
}

fn directory(server: &MockServer) -> RestDirectory {
	RestDirectory::new(
		insecure_http(),
		Url::parse(&server.url("/api")).expect("Mock base URL should parse successfully."),
		GUILD_ID,
		"bot-token",
	)
	.expect("Directory client should build successfully.")
}

fn member_id() -> MemberId {
	MemberId::new(MEMBER_ID).expect("Member fixture should be valid.")
}

fn member_path() -> String {
	format!("/api/guilds/{GUILD_ID}/members/{MEMBER_ID}")
}

#[tokio::test]
async fn fetch_member_maps_404_to_absent() {
	let server = MockServer::start_async().await;
	let directory = directory(&server);
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path(member_path()).header("Authorization", "Bot bot-token");
			then.status(404);
		})
		.await;
	let member = directory
		.fetch_member(&member_id())
		.await
		.expect("A 404 is an answer, not a failure.");

	mock.assert_async().await;

	assert!(member.is_none());
}

#[tokio::test]
async fn fetch_member_decodes_the_snapshot() {
	let server = MockServer::start_async().await;
	let directory = directory(&server);

	server
		.mock_async(|when, then| {
			when.method(GET).path(member_path());
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"nick":"Mod_A","roles":["Verified","Event Crew"]}"#);
		})
		.await;

	let member = directory
		.fetch_member(&member_id())
		.await
		.expect("Fetch should succeed.")
		.expect("Member should be present.");

	assert_eq!(member.nickname.as_deref(), Some("Mod_A"));
	assert_eq!(member.roles, vec!["Verified".to_owned(), "Event Crew".to_owned()]);
	assert_eq!(member.managed_roles(), vec![Role::Verified]);
}

#[tokio::test]
async fn join_carries_the_user_token_and_nickname() {
	let server = MockServer::start_async().await;
	let directory = directory(&server);
	let mock = server
		.mock_async(|when, then| {
			when.method(PUT)
				.path(member_path())
				.header("Authorization", "Bot bot-token")
				.header("content-type", "application/json")
				.body_includes(r#""access_token":"user-access""#)
				.body_includes(r#""nick":"Mod_A""#);
			then.status(201)
				.header("content-type", "application/json")
				.body(r#"{"nick":"Mod_A","roles":[]}"#);
		})
		.await;
	let member = directory
		.join(&member_id(), "user-access", "Mod_A")
		.await
		.expect("Join should succeed.");

	mock.assert_async().await;

	assert_eq!(member.nickname.as_deref(), Some("Mod_A"));
	assert!(member.roles.is_empty());
}

#[tokio::test]
async fn join_refetches_when_the_member_already_exists() {
	let server = MockServer::start_async().await;
	let directory = directory(&server);
	let join = server
		.mock_async(|when, then| {
			when.method(PUT).path(member_path());
			then.status(204);
		})
		.await;
	let fetch = server
		.mock_async(|when, then| {
			when.method(GET).path(member_path());
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"nick":"OldNick","roles":["Verified"]}"#);
		})
		.await;
	let member = directory
		.join(&member_id(), "user-access", "Mod_A")
		.await
		.expect("Join should succeed.");

	join.assert_async().await;
	fetch.assert_async().await;

	// The existing snapshot wins so the reconciler can diff against reality.
	assert_eq!(member.nickname.as_deref(), Some("OldNick"));
	assert_eq!(member.roles, vec!["Verified".to_owned()]);
}

#[tokio::test]
async fn role_writes_address_percent_encoded_subresources() {
	let server = MockServer::start_async().await;
	let directory = directory(&server);
	let add = server
		.mock_async(|when, then| {
			when.method(PUT).path(format!("{}/roles/Twitch%20Partner", member_path()));
			then.status(204);
		})
		.await;
	let remove = server
		.mock_async(|when, then| {
			when.method(DELETE).path(format!("{}/roles/Twitch%20Staff", member_path()));
			then.status(204);
		})
		.await;

	directory
		.add_roles(&member_id(), &[Role::Partner])
		.await
		.expect("Role addition should succeed.");
	directory
		.remove_roles(&member_id(), &[Role::Staff])
		.await
		.expect("Role removal should succeed.");

	add.assert_async().await;
	remove.assert_async().await;
}

#[tokio::test]
async fn rejected_writes_surface_the_status() {
	let server = MockServer::start_async().await;
	let directory = directory(&server);

	server
		.mock_async(|when, then| {
			when.method(PATCH).path(member_path());
			then.status(403);
		})
		.await;

	let err = directory
		.set_nickname(&member_id(), "Mod_A")
		.await
		.expect_err("A 403 nickname write should be rejected.");

	assert_eq!(err.to_string(), "Directory rejected the nickname write with HTTP 403.");
}

#[tokio::test]
async fn reconciler_drives_the_rest_directory_end_to_end() {
	let server = MockServer::start_async().await;
	let directory = Arc::new(directory(&server));

	server
		.mock_async(|when, then| {
			when.method(GET).path(member_path());
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"nick":"OldNick","roles":["Twitch Staff","Event Crew"]}"#);
		})
		.await;

	let nickname = server
		.mock_async(|when, then| {
			when.method(PATCH).path(member_path()).body_includes(r#""nick":"Mod_A""#);
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"nick":"Mod_A","roles":["Twitch Staff","Event Crew"]}"#);
		})
		.await;
	let add = server
		.mock_async(|when, then| {
			when.method(PUT).path(format!("{}/roles/Verified", member_path()));
			then.status(204);
		})
		.await;
	let remove = server
		.mock_async(|when, then| {
			when.method(DELETE).path(format!("{}/roles/Twitch%20Staff", member_path()));
			then.status(204);
		})
		.await;
	let reconciler = Reconciler::new(directory, Arc::new(NullAuditSink));
	let report = reconciler
		.reconcile(ReconcileRequest {
			member_id: member_id(),
			access_token: TokenSecret::new("user-access"),
			desired_roles: [Role::Verified].into_iter().collect(),
			nickname: "Mod_A".into(),
		})
		.await
		.expect("Reconcile should succeed.");

	nickname.assert_async().await;
	add.assert_async().await;
	remove.assert_async().await;

	assert!(!report.joined);
	assert!(report.nickname_updated);
	assert_eq!(report.roles_added, vec![Role::Verified]);
	assert_eq!(report.roles_removed, vec![Role::Staff]);
}
