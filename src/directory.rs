//! Group-directory contracts: the managed role universe, member snapshots, and the
//! [`GroupDirectory`] trait the reconciler drives.

pub mod rest;

pub use rest::RestDirectory;

// self
use crate::{_prelude::*, eligibility::{EligibilityDecision, EligibilityReason}, session::MemberId};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Boxed future returned by [`GroupDirectory`] operations.
pub type DirectoryFuture<'a, T> =
	Pin<Box<dyn Future<Output = Result<T, DirectoryError>> + 'a + Send>>;

/// The full fixed universe of roles this system manages.
///
/// Roles outside this universe are never granted and never removed, so the reconciler
/// can never strip a role it does not itself manage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
	/// Base role every eligible member receives.
	#[serde(rename = "Verified")]
	Verified,
	/// Granted to accounts carrying the partner tier flag.
	#[serde(rename = "Twitch Partner")]
	Partner,
	/// Granted to accounts carrying the staff tier flag.
	#[serde(rename = "Twitch Staff")]
	Staff,
}
impl Role {
	/// Every role this system manages, in grant order.
	pub const ALL: [Role; 3] = [Role::Verified, Role::Partner, Role::Staff];

	/// Directory-side name identifying the role.
	pub const fn name(self) -> &'static str {
		match self {
			Role::Verified => "Verified",
			Role::Partner => "Twitch Partner",
			Role::Staff => "Twitch Staff",
		}
	}

	/// Resolves a directory role name into the managed universe, if it belongs there.
	pub fn from_name(name: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|role| role.name() == name)
	}
}
impl Display for Role {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.name())
	}
}

/// Ordered, deduplicated set of roles a member should hold.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesiredRoleSet(Vec<Role>);
impl DesiredRoleSet {
	/// Computes the target role set for a decision.
	///
	/// An eligible member always receives [`Role::Verified`]; the tier roles follow the
	/// decision's tier flags. An ineligible decision yields the empty set, though the
	/// orchestrator never reconciles one.
	pub fn for_decision(decision: &EligibilityDecision) -> Self {
		let mut set = Self::default();

		if !decision.eligible {
			return set;
		}

		set.insert(Role::Verified);

		if let EligibilityReason::TierFlag { staff, partner } = decision.reason {
			if partner {
				set.insert(Role::Partner);
			}
			if staff {
				set.insert(Role::Staff);
			}
		}

		set
	}

	/// Adds a role, keeping insertion order and ignoring duplicates.
	pub fn insert(&mut self, role: Role) {
		if !self.0.contains(&role) {
			self.0.push(role);
		}
	}

	/// Returns `true` when the set contains `role`.
	pub fn contains(&self, role: Role) -> bool {
		self.0.contains(&role)
	}

	/// Returns the roles in insertion order.
	pub fn roles(&self) -> &[Role] {
		&self.0
	}

	/// Returns `true` when no roles are desired.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl FromIterator<Role> for DesiredRoleSet {
	fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
		let mut set = Self::default();

		for role in iter {
			set.insert(role);
		}

		set
	}
}

/// Current snapshot of a directory member. External entity; this system only reads it
/// and conditionally writes the managed parts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMember {
	/// Directory member identifier.
	pub id: MemberId,
	/// Current nickname, when one is set.
	pub nickname: Option<String>,
	/// Raw role names currently held, managed or not.
	pub roles: Vec<String>,
}
impl GroupMember {
	/// Returns the subset of held roles that fall inside the managed universe.
	pub fn managed_roles(&self) -> Vec<Role> {
		self.roles.iter().filter_map(|name| Role::from_name(name)).collect()
	}
}

/// Error type produced by [`GroupDirectory`] implementations.
#[derive(Debug, ThisError)]
pub enum DirectoryError {
	/// The member was absent and the join attempt was rejected.
	#[error("Directory join was rejected with HTTP {status}.")]
	JoinFailed {
		/// HTTP status returned by the join call.
		status: u16,
	},
	/// The directory rejected a nickname or role write. Writes already applied stand.
	#[error("Directory rejected the {action} write with HTTP {status}.")]
	WriteRejected {
		/// Write label (member fetch, nickname, role add, role removal).
		action: &'static str,
		/// HTTP status returned by the write.
		status: u16,
	},
	/// The directory answered with JSON that could not be decoded.
	#[error("Directory returned malformed JSON.")]
	ResponseParse {
		/// Structured parsing failure carrying the failing JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// The directory could not be reached. No retry is attempted here; the
	/// orchestrator decides the user-facing behavior.
	#[error("Directory API is unavailable.")]
	Unavailable {
		/// Transport-specific failure.
		#[source]
		source: BoxError,
	},
}
impl DirectoryError {
	/// Wraps a transport-specific failure.
	pub fn unavailable(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Unavailable { source: Box::new(src) }
	}
}

/// Directory operations the reconciler drives, keyed by member id.
///
/// Implementations must be `Send + Sync`; the reconciler shares them behind
/// `Arc<dyn GroupDirectory>` across concurrent linking runs.
pub trait GroupDirectory
where
	Self: Send + Sync,
{
	/// Fetches the member's current snapshot, or `None` if they have not joined.
	fn fetch_member<'a>(&'a self, member: &'a MemberId)
	-> DirectoryFuture<'a, Option<GroupMember>>;

	/// Adds the identity to the directory using their own access token, with the
	/// desired nickname applied at join time.
	fn join<'a>(
		&'a self,
		member: &'a MemberId,
		access_token: &'a str,
		nickname: &'a str,
	) -> DirectoryFuture<'a, GroupMember>;

	/// Replaces the member's nickname.
	fn set_nickname<'a>(
		&'a self,
		member: &'a MemberId,
		nickname: &'a str,
	) -> DirectoryFuture<'a, ()>;

	/// Grants the listed managed roles.
	fn add_roles<'a>(&'a self, member: &'a MemberId, roles: &'a [Role])
	-> DirectoryFuture<'a, ()>;

	/// Revokes the listed managed roles.
	fn remove_roles<'a>(
		&'a self,
		member: &'a MemberId,
		roles: &'a [Role],
	) -> DirectoryFuture<'a, ()>;
}
