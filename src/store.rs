//! Session persistence contract.

pub mod memory;
pub use memory::MemoryStore;

// self
use crate::{_prelude::*, session::{LinkingSession, SessionId}};

/// Boxed future returned by [`SessionStore`] operations.
pub type StoreFuture<'a, T> =
	Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Failures raised by a session store backend.
#[derive(Debug, ThisError)]
pub enum StoreError {
	/// The backend itself failed.
	#[error("[store] backend failure, {message}")]
	Backend {
		/// Backend-specific description.
		message: String,
	},
	/// A stored session could not be encoded or decoded.
	#[error("[store] serialization failure, {message}")]
	Serialization {
		/// Decoder-specific description.
		message: String,
	},
}

/// Persistence seam for [`LinkingSession`] state.
///
/// Callers always read, mutate, and write back whole sessions; the store never
/// interprets their contents. Implementations must be safe to share across tasks.
pub trait SessionStore
where
	Self: Send + Sync,
{
	/// Loads the session with the given id, if any.
	fn load<'a>(&'a self, id: &'a SessionId) -> StoreFuture<'a, Option<LinkingSession>>;

	/// Inserts or replaces the session keyed by its own id.
	fn save<'a>(&'a self, session: &'a LinkingSession) -> StoreFuture<'a, ()>;

	/// Removes the session with the given id; removing an absent id is not an error.
	fn remove<'a>(&'a self, id: &'a SessionId) -> StoreFuture<'a, ()>;
}
