//! Twitch link step: exchange, profile, eligibility, and the final reconciliation.

// self
use crate::{
	_prelude::*,
	directory::DesiredRoleSet,
	eligibility,
	flows::{CallbackOutcome, CallbackQuery, LinkOutcome, Linker},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	provider::ProviderKind,
	reconcile::ReconcileRequest,
	session::{LinkStage, LinkingSession},
};

impl Linker {
	/// Handles the Twitch authorization callback and runs the chain to its end.
	///
	/// The order is fixed: state validation, code exchange, profile fetch, reputation
	/// lookup (skipped for tier-flagged accounts), evaluation, and only on a positive
	/// decision the Discord identity resolution and reconciliation. An ineligible
	/// decision short-circuits before any directory access.
	pub(crate) async fn handle_twitch_callback(
		&self,
		session: &mut LinkingSession,
		query: &CallbackQuery,
	) -> Result<CallbackOutcome> {
		const KIND: FlowKind = FlowKind::TwitchLink;

		let span = FlowSpan::new(KIND, "twitch_callback");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.twitch_chain(session, query)).await;

		match &result {
			Ok(outcome) if !outcome.is_failure() =>
				obs::record_flow_outcome(KIND, FlowOutcome::Success),
			_ => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	async fn twitch_chain(
		&self,
		session: &mut LinkingSession,
		query: &CallbackQuery,
	) -> Result<CallbackOutcome> {
		if session.validate_state(ProviderKind::Twitch, &query.state).is_err() {
			return self
				.finish(session, LinkStage::StateMismatch, LinkOutcome::CsrfMismatch)
				.await;
		}

		let tokens = match self.exchange.exchange_code(&self.twitch, &query.code).await {
			Ok(tokens) => tokens,
			Err(_) =>
				return self
					.finish(
						session,
						LinkStage::ExchangeFailed,
						LinkOutcome::ExchangeFailed(ProviderKind::Twitch),
					)
					.await,
		};

		session.attach_token(ProviderKind::Twitch, tokens.clone());
		session.advance(LinkStage::TwitchLinked);
		self.store.save(session).await?;

		let profile = match self.profiles.twitch_profile(&self.twitch, &tokens).await {
			Ok(profile) => profile,
			Err(_) =>
				return self
					.finish(session, LinkStage::ProfileFailed, LinkOutcome::ProfileFailed)
					.await,
		};

		session.profile = Some(profile.clone());

		// Tier-flagged accounts are eligible outright; the lookup is skipped entirely.
		let metrics = if profile.has_tier_flag() {
			None
		} else {
			match self.profiles.reputation(&self.reputation, &profile.login).await {
				Ok(metrics) => Some(metrics),
				Err(_) =>
					return self
						.finish(
							session,
							LinkStage::ReputationFailed,
							LinkOutcome::ReputationFailed,
						)
						.await,
			}
		};
		let decision = eligibility::evaluate(&profile, metrics.as_ref(), &self.thresholds);

		session.decision = Some(decision.clone());
		session.advance(LinkStage::Evaluated);
		self.store.save(session).await?;

		if !decision.eligible {
			return self
				.finish(
					session,
					LinkStage::Evaluated,
					LinkOutcome::NotEligible { metrics, thresholds: self.thresholds },
				)
				.await;
		}

		let Some(discord_tokens) = session.token(ProviderKind::Discord).cloned() else {
			return self
				.finish(session, LinkStage::ReconcileFailed, LinkOutcome::ReconcileFailed)
				.await;
		};
		let identity =
			match self.profiles.discord_identity(&self.discord, &discord_tokens).await {
				Ok(identity) => identity,
				Err(_) =>
					return self
						.finish(
							session,
							LinkStage::ReconcileFailed,
							LinkOutcome::ReconcileFailed,
						)
						.await,
			};
		let request = ReconcileRequest {
			member_id: identity.id,
			access_token: discord_tokens.access_token.clone(),
			desired_roles: DesiredRoleSet::for_decision(&decision),
			nickname: profile.display_name.clone(),
		};

		obs::record_flow_outcome(FlowKind::Reconcile, FlowOutcome::Attempt);

		match self.reconciler.reconcile(request).await {
			Ok(report) => {
				obs::record_flow_outcome(FlowKind::Reconcile, FlowOutcome::Success);

				self.finish(session, LinkStage::Reconciled, LinkOutcome::Linked(report)).await
			},
			Err(_) => {
				obs::record_flow_outcome(FlowKind::Reconcile, FlowOutcome::Failure);

				self.finish(session, LinkStage::ReconcileFailed, LinkOutcome::ReconcileFailed)
					.await
			},
		}
	}
}
