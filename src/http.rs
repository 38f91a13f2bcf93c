//! Transport primitives shared by the upstream clients.
//!
//! All upstream calls (token exchange, profile, reputation) go through
//! [`LinkHttpClient`] so status handling, network-error mapping, and path-aware JSON
//! decoding live in one place. The directory client reuses the same underlying
//! [`ReqwestClient`] plus [`decode_json`] with its own error taxonomy.

// std
use std::ops::Deref;
// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{_prelude::*, error::UpstreamError};

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Each upstream call carries a static endpoint label (e.g. `"token exchange"`) so the
/// resulting [`UpstreamError`] names the failing collaborator without leaking URLs or
/// secrets into error text.
#[derive(Clone, Default)]
pub struct LinkHttpClient(pub ReqwestClient);
impl LinkHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// `POST`s a form-encoded body and decodes the JSON response.
	pub async fn post_form<T>(
		&self,
		endpoint: &'static str,
		url: &Url,
		form: &[(&str, &str)],
	) -> Result<T, UpstreamError>
	where
		T: DeserializeOwned,
	{
		let response = self
			.0
			.post(url.clone())
			.form(form)
			.send()
			.await
			.map_err(|err| UpstreamError::network(endpoint, err))?;

		Self::read_json(endpoint, response).await
	}

	/// `GET`s a resource with the provided headers and decodes the JSON response.
	pub async fn get_json<T>(
		&self,
		endpoint: &'static str,
		url: &Url,
		headers: &[(&'static str, &str)],
	) -> Result<T, UpstreamError>
	where
		T: DeserializeOwned,
	{
		let mut request = self.0.get(url.clone());

		for (name, value) in headers {
			request = request.header(*name, *value);
		}

		let response =
			request.send().await.map_err(|err| UpstreamError::network(endpoint, err))?;

		Self::read_json(endpoint, response).await
	}

	async fn read_json<T>(
		endpoint: &'static str,
		response: reqwest::Response,
	) -> Result<T, UpstreamError>
	where
		T: DeserializeOwned,
	{
		let status = response.status();

		if !status.is_success() {
			return Err(UpstreamError::Status { endpoint, status: status.as_u16() });
		}

		let body =
			response.bytes().await.map_err(|err| UpstreamError::network(endpoint, err))?;

		decode_json(&body).map_err(|source| UpstreamError::ResponseParse {
			endpoint,
			source,
			status: Some(status.as_u16()),
		})
	}
}
impl AsRef<ReqwestClient> for LinkHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
impl Deref for LinkHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl Debug for LinkHttpClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("LinkHttpClient(..)")
	}
}

/// Decodes a JSON body, preserving the failing path on error.
pub fn decode_json<T>(body: &[u8]) -> Result<T, serde_path_to_error::Error<serde_json::Error>>
where
	T: DeserializeOwned,
{
	let mut deserializer = serde_json::Deserializer::from_slice(body);

	serde_path_to_error::deserialize(&mut deserializer)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[derive(Debug, Deserialize)]
	struct Totals {
		follows: u64,
	}

	#[test]
	fn decode_json_reports_the_failing_path() {
		let err = decode_json::<Totals>(br#"{"follows": "not-a-number"}"#)
			.expect_err("Type mismatch should fail to decode.");

		assert_eq!(err.path().to_string(), "follows");
	}

	#[test]
	fn decode_json_accepts_well_formed_payloads() {
		let totals: Totals =
			decode_json(br#"{"follows": 20000}"#).expect("Payload should decode.");

		assert_eq!(totals.follows, 20000);
	}
}
