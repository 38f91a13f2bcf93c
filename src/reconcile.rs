//! Idempotent reconciliation of a directory member's roles and nickname.
//!
//! [`Reconciler::reconcile`] brings one member to a desired target state using minimal
//! writes: join only when absent, rename only when the nickname differs, and add or
//! remove only the managed roles whose membership actually changed. Concurrent runs
//! for the same member id are serialized through a per-member guard, so overlapping
//! callbacks cannot interleave their read-then-write sequences.

// self
use crate::{
	_prelude::*,
	audit::AuditSink,
	directory::{DesiredRoleSet, DirectoryError, GroupDirectory, GroupMember, Role},
	obs,
	session::{MemberId, TokenSecret},
};

/// Inputs for one reconciliation run.
#[derive(Clone, Debug)]
pub struct ReconcileRequest {
	/// Directory member to reconcile.
	pub member_id: MemberId,
	/// The member's own access token, required only if a join is needed.
	pub access_token: TokenSecret,
	/// Roles the member should hold afterwards.
	pub desired_roles: DesiredRoleSet,
	/// Nickname the member should carry afterwards.
	pub nickname: String,
}

/// What a completed reconciliation changed; also the audit notification payload.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReconcileReport {
	/// Member the run targeted.
	pub member_id: MemberId,
	/// Nickname the member holds after the run.
	pub nickname: String,
	/// Whether the member was newly joined to the directory.
	pub joined: bool,
	/// Instant the run completed.
	#[serde(with = "time::serde::rfc3339")]
	pub joined_at: OffsetDateTime,
	/// Whether the nickname write was performed.
	pub nickname_updated: bool,
	/// Managed roles granted by this run.
	pub roles_added: Vec<Role>,
	/// Managed roles revoked by this run.
	pub roles_removed: Vec<Role>,
}
impl ReconcileReport {
	/// Returns `true` when the run performed no directory writes at all.
	pub fn is_noop(&self) -> bool {
		!self.joined
			&& !self.nickname_updated
			&& self.roles_added.is_empty()
			&& self.roles_removed.is_empty()
	}
}

/// Reconciliation engine over an injected directory and audit sink.
pub struct Reconciler {
	directory: Arc<dyn GroupDirectory>,
	audit: Arc<dyn AuditSink>,
	member_guards: Mutex<HashMap<MemberId, Arc<AsyncMutex<()>>>>,
}
impl Reconciler {
	/// Creates a reconciler over the given collaborators.
	pub fn new(directory: Arc<dyn GroupDirectory>, audit: Arc<dyn AuditSink>) -> Self {
		Self { directory, audit, member_guards: Mutex::new(HashMap::new()) }
	}

	/// Brings the member to the desired roles and nickname.
	///
	/// Idempotent: a member already at the desired state produces zero writes. Write
	/// order is join/fetch, nickname, role additions, role removals, so a run that
	/// fails partway leaves the member at least correctly joined and named. Partial
	/// writes are never rolled back. The audit notification at the end is best-effort:
	/// its failure is logged and does not fail the call.
	pub async fn reconcile(
		&self,
		request: ReconcileRequest,
	) -> Result<ReconcileReport, DirectoryError> {
		let guard = self.member_guard(&request.member_id);
		let _serialized = guard.lock().await;
		let (member, joined) = self.fetch_or_join(&request).await?;
		let current = member.managed_roles();
		let to_add: Vec<Role> = request
			.desired_roles
			.roles()
			.iter()
			.copied()
			.filter(|role| !current.contains(role))
			.collect();
		let to_remove: Vec<Role> = Role::ALL
			.into_iter()
			.filter(|role| !request.desired_roles.contains(*role) && current.contains(role))
			.collect();
		let nickname_updated = member.nickname.as_deref() != Some(request.nickname.as_str());

		if nickname_updated {
			self.directory.set_nickname(&request.member_id, &request.nickname).await?;
		}
		if !to_add.is_empty() {
			self.directory.add_roles(&request.member_id, &to_add).await?;
		}
		if !to_remove.is_empty() {
			self.directory.remove_roles(&request.member_id, &to_remove).await?;
		}

		let report = ReconcileReport {
			member_id: request.member_id,
			nickname: request.nickname,
			joined,
			joined_at: OffsetDateTime::now_utc(),
			nickname_updated,
			roles_added: to_add,
			roles_removed: to_remove,
		};

		if let Err(err) = self.audit.notify(&report).await {
			obs::record_audit_failure(&err);
		}

		Ok(report)
	}

	async fn fetch_or_join(
		&self,
		request: &ReconcileRequest,
	) -> Result<(GroupMember, bool), DirectoryError> {
		match self.directory.fetch_member(&request.member_id).await? {
			Some(member) => Ok((member, false)),
			None => {
				let member = self
					.directory
					.join(
						&request.member_id,
						request.access_token.expose(),
						&request.nickname,
					)
					.await?;

				Ok((member, true))
			},
		}
	}

	// Returns (and creates on demand) the serialization guard for a member id.
	fn member_guard(&self, member: &MemberId) -> Arc<AsyncMutex<()>> {
		let mut guards = self.member_guards.lock();

		guards.entry(member.clone()).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone()
	}
}
impl Debug for Reconciler {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("Reconciler(..)")
	}
}
