//! Crate-level error types shared across flows, upstream clients, and the directory.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
///
/// Every upstream or directory failure is converted into one of these variants at the
/// boundary of the component that made the call; nothing deeper than the orchestrator
/// ever surfaces a transport-specific error to callers.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Session-store failure.
	#[error(transparent)]
	Store(#[from] crate::store::StoreError),
	/// Local configuration problem (invalid provider or reputation config).
	#[error(transparent)]
	Config(#[from] crate::provider::ProviderConfigError),
	/// Upstream token/profile/reputation call failure.
	#[error(transparent)]
	Upstream(#[from] UpstreamError),
	/// Group-directory read or write failure.
	#[error(transparent)]
	Directory(#[from] crate::directory::DirectoryError),

	/// Callback `state` parameter did not match the session's CSRF anchor.
	#[error("Callback state does not match the session anchor for the {provider} link.")]
	CsrfMismatch {
		/// Provider whose callback carried the mismatched state.
		provider: crate::provider::ProviderKind,
	},
	/// Callback arrived for a session the store does not know about.
	#[error("No linking session exists for the presented identifier.")]
	UnknownSession,
}

/// Failures raised while calling an upstream token, profile, or reputation endpoint.
///
/// These are terminal for the linking run by design: no automatic retry is performed,
/// so a failed exchange never leaves an ambiguous partial-link state behind.
#[derive(Debug, ThisError)]
pub enum UpstreamError {
	/// Endpoint answered with a non-success HTTP status.
	#[error("The {endpoint} endpoint returned HTTP {status}.")]
	Status {
		/// Endpoint label (token exchange, profile, reputation).
		endpoint: &'static str,
		/// HTTP status code returned upstream.
		status: u16,
	},
	/// Endpoint responded with JSON that could not be decoded.
	#[error("The {endpoint} endpoint returned malformed JSON.")]
	ResponseParse {
		/// Endpoint label (token exchange, profile, reputation).
		endpoint: &'static str,
		/// Structured parsing failure carrying the failing JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Endpoint returned a well-formed but unusable payload (e.g., an empty profile list).
	#[error("The {endpoint} endpoint returned an unusable payload: {message}.")]
	EmptyPayload {
		/// Endpoint label (token exchange, profile, reputation).
		endpoint: &'static str,
		/// Short description of what was missing.
		message: &'static str,
	},
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the {endpoint} endpoint.")]
	Network {
		/// Endpoint label (token exchange, profile, reputation).
		endpoint: &'static str,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
}
impl UpstreamError {
	/// Wraps a transport-specific network error for the given endpoint label.
	pub fn network(
		endpoint: &'static str,
		src: impl 'static + Send + Sync + std::error::Error,
	) -> Self {
		Self::Network { endpoint, source: Box::new(src) }
	}
}
