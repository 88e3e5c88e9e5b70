//! Optimistic sync
//!
//! Two explicit caches (structure and data), the remote store contract, and
//! the coordinator that wraps every write in snapshot → optimistic patch →
//! remote call → promote-or-rollback → invalidate.

mod cache;
mod home;
mod remote;
mod coordinator;

#[cfg(test)]
mod tests;

pub use cache::{CacheSnapshot, CacheStore, ReadTicket, TimelineCaches};
pub use home::{CacheHome, Cached, DataHome, HomeSnapshot, ProjectMember, StructureHome, StructureMember};
pub use remote::{RemoteCollection, TimelineApi};
pub use coordinator::{ChildPolicy, MutationCoordinator};
