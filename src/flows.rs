//! End-to-end linking orchestration: Discord first, Twitch second, then reconcile.

pub mod discord;
pub mod twitch;

// self
use crate::{
	_prelude::*,
	eligibility::Thresholds,
	exchange::TokenExchangeClient,
	http::LinkHttpClient,
	profile::{ProfileFetcher, ReputationMetrics},
	provider::{ProviderConfig, ProviderKind, ReputationConfig},
	reconcile::{ReconcileReport, Reconciler},
	session::{LinkStage, LinkingSession, SessionId},
	store::SessionStore,
};

/// Query parameters a provider callback carries back to the redirect URI.
#[derive(Clone, Debug, Deserialize)]
pub struct CallbackQuery {
	/// One-time authorization code minted by the provider.
	pub code: String,
	/// Echoed CSRF anchor; must equal the session id.
	pub state: String,
}

/// Terminal outcome of a linking chain.
///
/// Every variant except [`LinkOutcome::Linked`] ends the chain without touching the
/// directory.
#[derive(Clone, Debug)]
pub enum LinkOutcome {
	/// The chain completed and the directory was reconciled.
	Linked(ReconcileReport),
	/// Eligibility evaluation rejected the account; the inputs are carried verbatim.
	NotEligible {
		/// Reputation totals consulted, when the lookup ran.
		metrics: Option<ReputationMetrics>,
		/// Thresholds the totals were held against.
		thresholds: Thresholds,
	},
	/// The callback's `state` did not match the session anchor.
	CsrfMismatch,
	/// The code exchange with the named provider failed.
	ExchangeFailed(ProviderKind),
	/// The Twitch profile fetch failed.
	ProfileFailed,
	/// The reputation lookup failed.
	ReputationFailed,
	/// Identity resolution or a directory write failed after a positive decision.
	ReconcileFailed,
}
impl LinkOutcome {
	/// Returns a stable machine-readable code for the outcome.
	pub const fn code(&self) -> &'static str {
		match self {
			LinkOutcome::Linked(_) => "linked-success",
			LinkOutcome::NotEligible { .. } => "not-eligible",
			LinkOutcome::CsrfMismatch => "csrf-mismatch",
			LinkOutcome::ExchangeFailed(_) => "exchange-error",
			LinkOutcome::ProfileFailed => "profile-error",
			LinkOutcome::ReputationFailed => "reputation-error",
			LinkOutcome::ReconcileFailed => "reconcile-error",
		}
	}

	/// Returns `true` for every variant other than a completed link.
	pub const fn is_failure(&self) -> bool {
		!matches!(self, LinkOutcome::Linked(_))
	}

	/// Human-readable description suitable for an end-user response page.
	pub fn describe(&self) -> String {
		match self {
			LinkOutcome::Linked(report) =>
				format!("Welcome aboard, {}. Your roles are up to date.", report.nickname),
			LinkOutcome::NotEligible { metrics, thresholds } => match metrics {
				Some(metrics) => format!(
					"Your accounts are linked, but {} follows across {} partnered channels does not meet the bar of {} follows and {} partnered channels yet.",
					metrics.follows, metrics.partners, thresholds.follows, thresholds.partners
				),
				None => "Your accounts are linked, but your moderation record could not be confirmed.".into(),
			},
			LinkOutcome::CsrfMismatch =>
				"This authorization response does not belong to your linking session. Please start over.".into(),
			LinkOutcome::ExchangeFailed(provider) =>
				format!("The {provider} authorization could not be completed. Please start over."),
			LinkOutcome::ProfileFailed =>
				"Your Twitch profile could not be retrieved. Please try again later.".into(),
			LinkOutcome::ReputationFailed =>
				"Your moderation record could not be retrieved. Please try again later.".into(),
			LinkOutcome::ReconcileFailed =>
				"Your eligibility was confirmed, but updating the server failed. Please try again later.".into(),
		}
	}
}

/// What a provider callback produced.
#[derive(Clone, Debug)]
pub enum CallbackOutcome {
	/// The Discord link completed; the user should be sent to this Twitch authorize URL.
	AwaitingTwitch(Url),
	/// The chain ended, successfully or not.
	Terminal(LinkOutcome),
}
impl CallbackOutcome {
	/// Returns `true` when the outcome ends the chain without a completed link.
	pub const fn is_failure(&self) -> bool {
		match self {
			CallbackOutcome::AwaitingTwitch(_) => false,
			CallbackOutcome::Terminal(outcome) => outcome.is_failure(),
		}
	}
}

/// Coordinates the two-provider linking chain against a session store.
///
/// The linker owns the shared transport, provider configurations, reputation lookup,
/// thresholds, and the reconciler, so the per-provider callback handlers can focus on
/// their own step of the chain. Sessions are saved after every stage transition, so a
/// crashed chain is observable from the store.
pub struct Linker {
	/// Session persistence backend.
	pub store: Arc<dyn SessionStore>,
	/// Discord provider configuration.
	pub discord: ProviderConfig,
	/// Twitch provider configuration.
	pub twitch: ProviderConfig,
	/// Reputation lookup configuration.
	pub reputation: ReputationConfig,
	/// Eligibility thresholds applied to reputation totals.
	pub thresholds: Thresholds,
	/// Reconciliation engine invoked after a positive decision.
	pub reconciler: Arc<Reconciler>,
	exchange: TokenExchangeClient,
	profiles: ProfileFetcher,
}
impl Linker {
	/// Creates a linker over the given collaborators and shared transport.
	pub fn new(
		http_client: LinkHttpClient,
		store: Arc<dyn SessionStore>,
		discord: ProviderConfig,
		twitch: ProviderConfig,
		reputation: ReputationConfig,
		thresholds: Thresholds,
		reconciler: Arc<Reconciler>,
	) -> Self {
		Self {
			store,
			discord,
			twitch,
			reputation,
			thresholds,
			reconciler,
			exchange: TokenExchangeClient::new(http_client.clone()),
			profiles: ProfileFetcher::new(http_client),
		}
	}

	/// Issues a fresh session awaiting the Discord callback and persists it.
	pub async fn start(&self) -> Result<LinkingSession> {
		let mut session = LinkingSession::new(SessionId::generate());

		session.advance(LinkStage::DiscordPending);
		self.store.save(&session).await?;

		Ok(session)
	}

	/// Builds the authorize URL for `kind`, anchored to the session's CSRF state.
	pub fn authorize_url(&self, kind: ProviderKind, session: &LinkingSession) -> Url {
		self.config(kind).authorize_url(session.id.as_ref())
	}

	/// Handles a provider callback for the identified session.
	///
	/// Errors are reserved for store failures and unknown sessions; every upstream or
	/// validation failure is reported as a [`CallbackOutcome`] so callers can render it.
	pub async fn handle_callback(
		&self,
		id: &SessionId,
		kind: ProviderKind,
		query: &CallbackQuery,
	) -> Result<CallbackOutcome> {
		let mut session = self.store.load(id).await?.ok_or(Error::UnknownSession)?;
		let outcome = match kind {
			ProviderKind::Discord => self.handle_discord_callback(&mut session, query).await,
			ProviderKind::Twitch => self.handle_twitch_callback(&mut session, query).await,
		}?;

		Ok(outcome)
	}

	fn config(&self, kind: ProviderKind) -> &ProviderConfig {
		match kind {
			ProviderKind::Discord => &self.discord,
			ProviderKind::Twitch => &self.twitch,
		}
	}

	// Persists a terminal stage and wraps the outcome; store failures still win.
	async fn finish(
		&self,
		session: &mut LinkingSession,
		stage: LinkStage,
		outcome: LinkOutcome,
	) -> Result<CallbackOutcome> {
		session.advance(stage);
		self.store.save(session).await?;

		Ok(CallbackOutcome::Terminal(outcome))
	}
}
impl Debug for Linker {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Linker")
			.field("discord", &self.discord.client_id)
			.field("twitch", &self.twitch.client_id)
			.field("thresholds", &self.thresholds)
			.finish()
	}
}
