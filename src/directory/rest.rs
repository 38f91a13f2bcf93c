//! REST-backed [`GroupDirectory`] implementation.
//!
//! Speaks a small guild-membership API: `PUT`/`GET` on the member resource, `PATCH`
//! for the nickname, and `PUT`/`DELETE` on per-role subresources addressed by role
//! name. Authenticated with a bot token; the join call alone also carries the user's
//! own access token, which is what authorizes adding them to the guild.

// crates.io
use reqwest::{Response, StatusCode};
// self
use crate::{
	_prelude::*,
	directory::{DirectoryError, DirectoryFuture, GroupDirectory, GroupMember, Role},
	http::{LinkHttpClient, decode_json},
	provider::ProviderConfigError,
	session::{MemberId, TokenSecret},
};

#[derive(Debug, Deserialize)]
struct MemberPayload {
	#[serde(default)]
	nick: Option<String>,
	#[serde(default)]
	roles: Vec<String>,
}

#[derive(Debug, Serialize)]
struct JoinPayload<'a> {
	access_token: &'a str,
	nick: &'a str,
}

#[derive(Debug, Serialize)]
struct NicknamePayload<'a> {
	nick: &'a str,
}

/// Long-lived directory client; construct once at process start and share it.
#[derive(Clone, Debug)]
pub struct RestDirectory {
	http: LinkHttpClient,
	base_url: Url,
	guild_id: String,
	bot_token: TokenSecret,
}
impl RestDirectory {
	/// Creates a directory client for the given HTTPS API base and guild.
	pub fn new(
		http: LinkHttpClient,
		base_url: Url,
		guild_id: impl Into<String>,
		bot_token: impl Into<String>,
	) -> Result<Self, ProviderConfigError> {
		if base_url.scheme() != "https" {
			return Err(ProviderConfigError::InsecureEndpoint {
				endpoint: "directory",
				url: base_url,
			});
		}

		Ok(Self {
			http,
			base_url,
			guild_id: guild_id.into(),
			bot_token: TokenSecret::new(bot_token),
		})
	}

	fn bot_authorization(&self) -> String {
		format!("Bot {}", self.bot_token.expose())
	}

	fn member_url(&self, member: &MemberId) -> Url {
		let mut url = self.base_url.clone();

		if let Ok(mut segments) = url.path_segments_mut() {
			segments
				.pop_if_empty()
				.push("guilds")
				.push(&self.guild_id)
				.push("members")
				.push(member.as_ref());
		}

		url
	}

	fn role_url(&self, member: &MemberId, role: Role) -> Url {
		let mut url = self.member_url(member);

		if let Ok(mut segments) = url.path_segments_mut() {
			segments.push("roles").push(role.name());
		}

		url
	}

	async fn read_member(
		member: &MemberId,
		response: Response,
	) -> Result<GroupMember, DirectoryError> {
		let body = response.bytes().await.map_err(DirectoryError::unavailable)?;
		let payload: MemberPayload =
			decode_json(&body).map_err(|source| DirectoryError::ResponseParse { source })?;

		Ok(GroupMember { id: member.clone(), nickname: payload.nick, roles: payload.roles })
	}

	async fn fetch_member_inner(
		&self,
		member: &MemberId,
	) -> Result<Option<GroupMember>, DirectoryError> {
		let response = self
			.http
			.get(self.member_url(member))
			.header("Authorization", self.bot_authorization())
			.send()
			.await
			.map_err(DirectoryError::unavailable)?;

		match response.status() {
			StatusCode::NOT_FOUND => Ok(None),
			status if status.is_success() =>
				Ok(Some(Self::read_member(member, response).await?)),
			status => Err(DirectoryError::WriteRejected {
				action: "member fetch",
				status: status.as_u16(),
			}),
		}
	}

	async fn join_inner(
		&self,
		member: &MemberId,
		access_token: &str,
		nickname: &str,
	) -> Result<GroupMember, DirectoryError> {
		let response = self
			.http
			.put(self.member_url(member))
			.header("Authorization", self.bot_authorization())
			.json(&JoinPayload { access_token, nick: nickname })
			.send()
			.await
			.map_err(DirectoryError::unavailable)?;
		let status = response.status();

		if !status.is_success() {
			return Err(DirectoryError::JoinFailed { status: status.as_u16() });
		}
		if status == StatusCode::NO_CONTENT {
			// Already a member; re-read the snapshot instead of guessing at it.
			return match self.fetch_member_inner(member).await? {
				Some(existing) => Ok(existing),
				None => Ok(GroupMember {
					id: member.clone(),
					nickname: Some(nickname.to_owned()),
					roles: Vec::new(),
				}),
			};
		}

		Self::read_member(member, response).await
	}

	async fn write(
		&self,
		action: &'static str,
		request: reqwest::RequestBuilder,
	) -> Result<(), DirectoryError> {
		let response = request
			.header("Authorization", self.bot_authorization())
			.send()
			.await
			.map_err(DirectoryError::unavailable)?;
		let status = response.status();

		if status.is_success() {
			Ok(())
		} else {
			Err(DirectoryError::WriteRejected { action, status: status.as_u16() })
		}
	}
}
impl GroupDirectory for RestDirectory {
	fn fetch_member<'a>(
		&'a self,
		member: &'a MemberId,
	) -> DirectoryFuture<'a, Option<GroupMember>> {
		Box::pin(self.fetch_member_inner(member))
	}

	fn join<'a>(
		&'a self,
		member: &'a MemberId,
		access_token: &'a str,
		nickname: &'a str,
	) -> DirectoryFuture<'a, GroupMember> {
		Box::pin(self.join_inner(member, access_token, nickname))
	}

	fn set_nickname<'a>(
		&'a self,
		member: &'a MemberId,
		nickname: &'a str,
	) -> DirectoryFuture<'a, ()> {
		Box::pin(async move {
			let request =
				self.http.patch(self.member_url(member)).json(&NicknamePayload { nick: nickname });

			self.write("nickname", request).await
		})
	}

	fn add_roles<'a>(
		&'a self,
		member: &'a MemberId,
		roles: &'a [Role],
	) -> DirectoryFuture<'a, ()> {
		Box::pin(async move {
			for role in roles {
				self.write("role add", self.http.put(self.role_url(member, *role))).await?;
			}

			Ok(())
		})
	}

	fn remove_roles<'a>(
		&'a self,
		member: &'a MemberId,
		roles: &'a [Role],
	) -> DirectoryFuture<'a, ()> {
		Box::pin(async move {
			for role in roles {
				self.write("role removal", self.http.delete(self.role_url(member, *role)))
					.await?;
			}

			Ok(())
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn directory() -> RestDirectory {
		RestDirectory::new(
			LinkHttpClient::default(),
			Url::parse("https://directory.example.com/api").expect("Base URL should parse."),
			"352896412880470017",
			"bot-token",
		)
		.expect("HTTPS directory base should be accepted.")
	}

	#[test]
	fn insecure_base_urls_are_rejected() {
		let err = RestDirectory::new(
			LinkHttpClient::default(),
			Url::parse("http://directory.example.com").expect("Base URL should parse."),
			"guild",
			"token",
		)
		.expect_err("Plain HTTP directory base should be rejected.");

		assert!(matches!(err, ProviderConfigError::InsecureEndpoint { endpoint: "directory", .. }));
	}

	#[test]
	fn member_and_role_urls_nest_under_the_guild() {
		let directory = directory();
		let member = MemberId::new("190356249").expect("Member fixture should be valid.");

		assert_eq!(
			directory.member_url(&member).as_str(),
			"https://directory.example.com/api/guilds/352896412880470017/members/190356249"
		);
		assert_eq!(
			directory.role_url(&member, Role::Partner).as_str(),
			"https://directory.example.com/api/guilds/352896412880470017/members/190356249/roles/Twitch%20Partner"
		);
	}
}
