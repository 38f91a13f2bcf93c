//! Fire-and-forget audit notifications for completed reconciliations.
//!
//! Delivery is best-effort by contract: a sink failure is logged by the reconciler and
//! never rolls back directory writes or fails the reconcile call.

// self
use crate::{_prelude::*, http::LinkHttpClient, reconcile::ReconcileReport};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Boxed future returned by [`AuditSink::notify`].
pub type AuditFuture<'a> = Pin<Box<dyn Future<Output = Result<(), AuditError>> + 'a + Send>>;

/// Error type produced by [`AuditSink`] implementations.
#[derive(Debug, ThisError)]
pub enum AuditError {
	/// The sink answered with a non-success status.
	#[error("Audit sink rejected the notification with HTTP {status}.")]
	Delivery {
		/// HTTP status returned by the sink.
		status: u16,
	},
	/// The sink could not be reached.
	#[error("Audit sink is unreachable.")]
	Network {
		/// Transport-specific failure.
		#[source]
		source: BoxError,
	},
}
impl AuditError {
	/// Wraps a transport-specific failure.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}

/// Destination for structured reconciliation notifications.
pub trait AuditSink
where
	Self: Send + Sync,
{
	/// Delivers one notification describing a completed reconciliation.
	fn notify<'a>(&'a self, report: &'a ReconcileReport) -> AuditFuture<'a>;
}

/// Webhook-backed sink that `POST`s each report as JSON.
#[derive(Clone, Debug)]
pub struct WebhookAuditSink {
	http: LinkHttpClient,
	url: Url,
}
impl WebhookAuditSink {
	/// Creates a sink delivering to the given webhook URL.
	pub fn new(http: LinkHttpClient, url: Url) -> Self {
		Self { http, url }
	}
}
impl AuditSink for WebhookAuditSink {
	fn notify<'a>(&'a self, report: &'a ReconcileReport) -> AuditFuture<'a> {
		Box::pin(async move {
			let response = self
				.http
				.post(self.url.clone())
				.json(report)
				.send()
				.await
				.map_err(AuditError::network)?;
			let status = response.status();

			if status.is_success() {
				Ok(())
			} else {
				Err(AuditError::Delivery { status: status.as_u16() })
			}
		})
	}
}

/// Sink that drops every notification; for local development and tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullAuditSink;
impl AuditSink for NullAuditSink {
	fn notify<'a>(&'a self, _report: &'a ReconcileReport) -> AuditFuture<'a> {
		Box::pin(async { Ok(()) })
	}
}
