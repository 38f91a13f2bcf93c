//! Provider identities and validated per-provider configuration.

pub mod config;

pub use config::*;

// self
use crate::_prelude::*;

/// The two identity providers a linking run chains together.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
	/// Discord, linked first; supplies the directory member identity.
	Discord,
	/// Twitch, linked second; supplies the profile driving eligibility.
	Twitch,
}
impl ProviderKind {
	/// Returns a stable lowercase label suitable for logs and routes.
	pub const fn as_str(self) -> &'static str {
		match self {
			ProviderKind::Discord => "discord",
			ProviderKind::Twitch => "twitch",
		}
	}
}
impl Display for ProviderKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
