//! Discord link step: validate state, exchange the code, hand off to Twitch.

// self
use crate::{
	_prelude::*,
	flows::{CallbackOutcome, CallbackQuery, LinkOutcome, Linker},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	provider::ProviderKind,
	session::{LinkStage, LinkingSession},
};

impl Linker {
	/// Handles the Discord authorization callback.
	///
	/// State validation runs strictly before the token exchange, so a forged callback
	/// never spends its authorization code. Success parks the session awaiting the
	/// Twitch callback and returns the Twitch authorize URL to redirect the user to.
	pub(crate) async fn handle_discord_callback(
		&self,
		session: &mut LinkingSession,
		query: &CallbackQuery,
	) -> Result<CallbackOutcome> {
		const KIND: FlowKind = FlowKind::DiscordLink;

		let span = FlowSpan::new(KIND, "discord_callback");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				if session.validate_state(ProviderKind::Discord, &query.state).is_err() {
					return self
						.finish(session, LinkStage::StateMismatch, LinkOutcome::CsrfMismatch)
						.await;
				}

				let tokens = match self.exchange.exchange_code(&self.discord, &query.code).await {
					Ok(tokens) => tokens,
					Err(_) =>
						return self
							.finish(
								session,
								LinkStage::ExchangeFailed,
								LinkOutcome::ExchangeFailed(ProviderKind::Discord),
							)
							.await,
				};

				session.attach_token(ProviderKind::Discord, tokens);
				session.advance(LinkStage::DiscordLinked);
				self.store.save(session).await?;
				session.advance(LinkStage::TwitchPending);
				self.store.save(session).await?;

				Ok(CallbackOutcome::AwaitingTwitch(
					self.authorize_url(ProviderKind::Twitch, session),
				))
			})
			.await;

		match &result {
			Ok(outcome) if !outcome.is_failure() =>
				obs::record_flow_outcome(KIND, FlowOutcome::Success),
			_ => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}
}
