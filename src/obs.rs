//! Optional observability helpers for linking flows.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `link_station.flow` with the `flow`
//!   (provider chain step) and `stage` (call site) fields.
//! - Enable `metrics` to increment the `link_station_flow_total` counter for every
//!   attempt/success/failure, labeled by `flow` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::{_prelude::*, audit::AuditError};

/// Linking flow steps observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Discord authorization callback handling.
	DiscordLink,
	/// Twitch authorization callback handling.
	TwitchLink,
	/// Role and nickname reconciliation.
	Reconcile,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::DiscordLink => "discord_link",
			FlowKind::TwitchLink => "twitch_link",
			FlowKind::Reconcile => "reconcile",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a flow step.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure reported back to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Logs a failed audit delivery (when tracing is enabled).
///
/// Audit notifications are best-effort, so the reconciler reports their failures here
/// instead of propagating them.
pub fn record_audit_failure(error: &AuditError) {
	#[cfg(feature = "tracing")]
	{
		::tracing::warn!(error = %error, "audit notification failed");
	}

	#[cfg(not(feature = "tracing"))]
	{
		let _ = error;
	}
}
