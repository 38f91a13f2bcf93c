//! Linking state machine stages recorded on each session.

// self
use crate::_prelude::*;

/// Progress of one user's linking run.
///
/// Stages advance strictly forward; the failure stages are terminal and a session that
/// reaches one must be restarted from scratch by the user.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkStage {
	/// Session issued, no provider contacted yet.
	#[default]
	Start,
	/// User was sent to the Discord authorize page.
	DiscordPending,
	/// Discord code exchange completed.
	DiscordLinked,
	/// User was sent to the Twitch authorize page.
	TwitchPending,
	/// Twitch code exchange completed.
	TwitchLinked,
	/// Eligibility decision computed and cached.
	Evaluated,
	/// Directory reconciliation completed (terminal success).
	Reconciled,

	/// Callback state did not match the session anchor (terminal).
	StateMismatch,
	/// A provider's token exchange failed (terminal).
	ExchangeFailed,
	/// The Twitch profile fetch failed (terminal).
	ProfileFailed,
	/// The reputation lookup failed (terminal).
	ReputationFailed,
	/// Directory reconciliation failed (terminal).
	ReconcileFailed,
}
impl LinkStage {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			LinkStage::Start => "start",
			LinkStage::DiscordPending => "discord_pending",
			LinkStage::DiscordLinked => "discord_linked",
			LinkStage::TwitchPending => "twitch_pending",
			LinkStage::TwitchLinked => "twitch_linked",
			LinkStage::Evaluated => "evaluated",
			LinkStage::Reconciled => "reconciled",
			LinkStage::StateMismatch => "state_mismatch",
			LinkStage::ExchangeFailed => "exchange_failed",
			LinkStage::ProfileFailed => "profile_failed",
			LinkStage::ReputationFailed => "reputation_failed",
			LinkStage::ReconcileFailed => "reconcile_failed",
		}
	}

	/// Returns `true` when the stage ends the run (success or failure).
	pub const fn is_terminal(self) -> bool {
		matches!(
			self,
			LinkStage::Reconciled
				| LinkStage::StateMismatch
				| LinkStage::ExchangeFailed
				| LinkStage::ProfileFailed
				| LinkStage::ReputationFailed
				| LinkStage::ReconcileFailed
		)
	}
}
impl Display for LinkStage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn terminal_stages_are_flagged() {
		assert!(LinkStage::Reconciled.is_terminal());
		assert!(LinkStage::StateMismatch.is_terminal());
		assert!(LinkStage::ReputationFailed.is_terminal());
		assert!(!LinkStage::Start.is_terminal());
		assert!(!LinkStage::TwitchLinked.is_terminal());
		assert!(!LinkStage::Evaluated.is_terminal());
	}

	#[test]
	fn labels_are_stable() {
		assert_eq!(LinkStage::DiscordLinked.as_str(), "discord_linked");
		assert_eq!(LinkStage::ReconcileFailed.to_string(), "reconcile_failed");
	}
}
