//! Process-local [`SessionStore`] backend.

// self
use crate::{
	_prelude::*,
	session::{LinkingSession, SessionId},
	store::{SessionStore, StoreFuture},
};

/// In-memory session store backed by a [`RwLock`]ed map.
///
/// Sessions live for the process lifetime only; there is no eviction. Suitable for
/// single-instance deployments and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
	sessions: RwLock<HashMap<SessionId, LinkingSession>>,
}
impl MemoryStore {
	/// Creates an empty store.
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of sessions currently held.
	pub fn len(&self) -> usize {
		self.sessions.read().len()
	}

	/// Whether the store holds no sessions.
	pub fn is_empty(&self) -> bool {
		self.sessions.read().is_empty()
	}
}
impl SessionStore for MemoryStore {
	fn load<'a>(&'a self, id: &'a SessionId) -> StoreFuture<'a, Option<LinkingSession>> {
		Box::pin(async move { Ok(self.sessions.read().get(id).cloned()) })
	}

	fn save<'a>(&'a self, session: &'a LinkingSession) -> StoreFuture<'a, ()> {
		Box::pin(async move {
			self.sessions.write().insert(session.id.clone(), session.clone());

			Ok(())
		})
	}

	fn remove<'a>(&'a self, id: &'a SessionId) -> StoreFuture<'a, ()> {
		Box::pin(async move {
			self.sessions.write().remove(id);

			Ok(())
		})
	}
}
